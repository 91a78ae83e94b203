//! Viewport pan/zoom transforms and hit-testing.

use crate::config::{MAX_ZOOM, MIN_ZOOM, ZOOM_IN_FACTOR, ZOOM_OUT_FACTOR};
use crate::elements::CanvasElement;
use crate::input::Modifiers;
use kurbo::{Affine, Point, Vec2};
use serde::{Deserialize, Serialize};

/// Pan offset and zoom factor mapping canvas space to screen space.
///
/// `x` / `y` are the pan offset in screen pixels. The origin offset (where
/// the canvas surface sits on screen) is not part of the viewport; it is
/// supplied by the host on every conversion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub x: f64,
    pub y: f64,
    pub zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            zoom: 1.0,
        }
    }
}

impl Viewport {
    /// The identity viewport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pan offset as a vector.
    pub fn pan(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Set the pan offset.
    pub fn set_pan(&mut self, pan: Vec2) {
        self.x = pan.x;
        self.y = pan.y;
    }

    /// Canvas-to-screen transform for a surface at `origin`.
    pub fn transform(&self, origin: Vec2) -> Affine {
        Affine::translate(origin + self.pan()) * Affine::scale(self.zoom)
    }

    /// Convert a screen point to canvas coordinates.
    pub fn screen_to_canvas(&self, screen: Point, origin: Vec2) -> Point {
        Point::new(
            (screen.x - origin.x - self.x) / self.zoom,
            (screen.y - origin.y - self.y) / self.zoom,
        )
    }

    /// Convert a canvas point to screen coordinates.
    pub fn canvas_to_screen(&self, canvas: Point, origin: Vec2) -> Point {
        Point::new(
            canvas.x * self.zoom + self.x + origin.x,
            canvas.y * self.zoom + self.y + origin.y,
        )
    }

    /// Multiply zoom by `factor`, clamped to `[min, max]`.
    /// Returns true if the zoom changed.
    pub fn zoom_by(&mut self, factor: f64, min: f64, max: f64) -> bool {
        let zoom = (self.zoom * factor).clamp(min, max);
        if (zoom - self.zoom).abs() < f64::EPSILON {
            return false;
        }
        self.zoom = zoom;
        true
    }

    /// Apply one wheel tick with the default zoom factors and bounds.
    ///
    /// Only zooms while Ctrl or Meta is held; scrolling down zooms out,
    /// scrolling up zooms in. Returns true if the zoom changed.
    pub fn apply_zoom(&mut self, wheel_dy: f64, modifiers: Modifiers) -> bool {
        match wheel_zoom_factor(wheel_dy, modifiers, ZOOM_IN_FACTOR, ZOOM_OUT_FACTOR) {
            Some(factor) => self.zoom_by(factor, MIN_ZOOM, MAX_ZOOM),
            None => false,
        }
    }
}

/// Zoom multiplier for a wheel event, or `None` if the event should not zoom.
pub fn wheel_zoom_factor(wheel_dy: f64, modifiers: Modifiers, zoom_in: f64, zoom_out: f64) -> Option<f64> {
    if !modifiers.zoom() {
        return None;
    }
    if wheel_dy > 0.0 {
        Some(zoom_out)
    } else if wheel_dy < 0.0 {
        Some(zoom_in)
    } else {
        None
    }
}

/// Find the topmost element whose bounding box contains `point`.
///
/// Elements are in paint order, so the search runs back to front.
pub fn hit_test(point: Point, elements: &[CanvasElement]) -> Option<&CanvasElement> {
    elements.iter().rev().find(|element| element.contains(point))
}
