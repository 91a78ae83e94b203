//! Tool system for the design board.

use crate::config::EditorConfig;
use crate::elements::{CanvasElement, ElementColor};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    #[default]
    Select,
    Hand,
    Pen,
    Rectangle,
    Circle,
    Text,
    Comment,
}

impl ToolKind {
    pub const ALL: [ToolKind; 7] = [
        ToolKind::Select,
        ToolKind::Hand,
        ToolKind::Pen,
        ToolKind::Rectangle,
        ToolKind::Circle,
        ToolKind::Text,
        ToolKind::Comment,
    ];

    /// Whether a single click with this tool places an element.
    pub fn places_element(self) -> bool {
        matches!(self, ToolKind::Rectangle | ToolKind::Circle | ToolKind::Text)
    }

    /// CSS cursor name the host should show over the canvas.
    pub fn cursor(self) -> &'static str {
        match self {
            ToolKind::Select => "default",
            ToolKind::Hand => "grab",
            ToolKind::Text => "text",
            ToolKind::Pen | ToolKind::Rectangle | ToolKind::Circle | ToolKind::Comment => "crosshair",
        }
    }
}

/// Holds the active tool and the style applied to new elements.
#[derive(Debug, Clone)]
pub struct ToolManager {
    /// Currently selected tool.
    pub current_tool: ToolKind,
    /// Fill and stroke color for new elements.
    pub current_color: ElementColor,
    /// Stroke width for new elements.
    pub stroke_width: f64,
}

impl Default for ToolManager {
    fn default() -> Self {
        Self::from_config(&EditorConfig::default())
    }
}

impl ToolManager {
    /// Create a new tool manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a tool manager using the config's default color and stroke.
    pub fn from_config(config: &EditorConfig) -> Self {
        Self {
            current_tool: ToolKind::default(),
            current_color: config.default_color,
            stroke_width: config.stroke_width,
        }
    }

    /// Set the current tool.
    pub fn set_tool(&mut self, tool: ToolKind) {
        self.current_tool = tool;
    }

    /// Set the color for new elements.
    pub fn set_color(&mut self, color: ElementColor) {
        self.current_color = color;
    }

    /// Build the element a click with the current tool places at `point`.
    ///
    /// Rectangles and circles are centered on the click, text boxes hang
    /// from it. Other tools place nothing.
    pub fn place(&self, point: Point, config: &EditorConfig) -> Option<CanvasElement> {
        match self.current_tool {
            ToolKind::Rectangle => Some(CanvasElement::rectangle(
                point,
                config.shape_size,
                self.current_color,
                self.stroke_width,
            )),
            ToolKind::Circle => Some(CanvasElement::circle(
                point,
                config.shape_size,
                self.current_color,
                self.stroke_width,
            )),
            ToolKind::Text => Some(CanvasElement::text(
                point,
                (config.text_width, config.text_height),
                config.text_placeholder.clone(),
                self.current_color,
                self.stroke_width,
            )),
            ToolKind::Select | ToolKind::Hand | ToolKind::Pen | ToolKind::Comment => None,
        }
    }

    /// Turn captured freehand points into a path element.
    /// Returns None when fewer than two points were captured.
    pub fn finish_path(&self, points: Vec<Point>) -> Option<CanvasElement> {
        CanvasElement::path(points, self.current_color, self.stroke_width)
    }
}
