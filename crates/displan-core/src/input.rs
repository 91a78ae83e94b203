//! Input events and the gesture state machine.
//!
//! The host translates its raw pointer, wheel and keyboard events into these
//! types and hands them to the board editor. [`Gesture`] is the gesture being
//! tracked between pointer-down and pointer-up, or the modal sub-state (text
//! editing, comment composing) that suppresses canvas pointer handling.

use crate::elements::ElementId;
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    /// Whether the wheel should zoom rather than scroll.
    pub fn zoom(&self) -> bool {
        self.ctrl || self.meta
    }

    /// Whether a shortcut modifier (Ctrl, or Cmd on macOS) is held.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// Pointer event type for unified mouse/touch handling.
///
/// Positions are in screen pixels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PointerEvent {
    Down {
        position: Point,
        button: MouseButton,
    },
    Up {
        position: Point,
        button: MouseButton,
    },
    Move {
        position: Point,
    },
    Wheel {
        position: Point,
        delta: Vec2,
        modifiers: Modifiers,
    },
}

/// Keyboard event type.
///
/// The key name follows the browser convention (`"Delete"`, `"Escape"`,
/// `"Enter"`, `"z"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    pub key: String,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            modifiers: Modifiers::default(),
        }
    }

    pub fn with_modifiers(key: impl Into<String>, modifiers: Modifiers) -> Self {
        Self {
            key: key.into(),
            modifiers,
        }
    }

    /// Case-insensitive key name comparison.
    pub fn is(&self, name: &str) -> bool {
        self.key.eq_ignore_ascii_case(name)
    }
}

/// The gesture or modal sub-state currently active on the board.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Gesture {
    /// Waiting for the next pointer-down.
    #[default]
    Idle,
    /// Hand-tool drag moving the viewport.
    Panning {
        /// Screen position at pointer-down.
        start_pointer: Point,
        /// Viewport pan offset at pointer-down.
        start_pan: Vec2,
    },
    /// Select-tool drag moving one element.
    DraggingElement {
        id: ElementId,
        /// Canvas-space offset from the element's top-left corner to the grab point.
        grab_offset: Vec2,
        /// Element position at pointer-down, used to tell whether anything moved.
        start_position: Point,
    },
    /// Pen-tool freehand capture.
    DrawingPath {
        /// Captured canvas-space points.
        points: Vec<Point>,
    },
    /// Inline editing of a text element.
    EditingText { id: ElementId },
    /// Floating comment composer.
    ComposingComment {
        /// Screen position the composer is anchored to.
        screen: Point,
        /// Canvas position the comment will be pinned at.
        canvas: Point,
        /// Text typed so far.
        draft: String,
    },
}

impl Gesture {
    pub fn is_idle(&self) -> bool {
        matches!(self, Gesture::Idle)
    }

    /// Whether the state captures keyboard input and blocks canvas pointer handling.
    pub fn is_modal(&self) -> bool {
        matches!(self, Gesture::EditingText { .. } | Gesture::ComposingComment { .. })
    }

    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Gesture::Idle => "idle",
            Gesture::Panning { .. } => "panning",
            Gesture::DraggingElement { .. } => "dragging-element",
            Gesture::DrawingPath { .. } => "drawing-path",
            Gesture::EditingText { .. } => "editing-text",
            Gesture::ComposingComment { .. } => "composing-comment",
        }
    }
}
