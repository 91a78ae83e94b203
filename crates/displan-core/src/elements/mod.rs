//! Drawable board elements.

mod color;

pub use color::{ColorParseError, ElementColor};

use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for elements.
pub type ElementId = Uuid;

/// The kind of a board element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Rectangle,
    Circle,
    Text,
    Path,
}

/// A drawable element on the board.
///
/// All kinds share the axis-aligned bounding box and presentation fields.
/// `text` is only set for [`ElementKind::Text`] and `path` only for
/// [`ElementKind::Path`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasElement {
    pub id: ElementId,
    #[serde(rename = "type")]
    pub kind: ElementKind,
    /// Left edge of the bounding box in canvas space.
    pub x: f64,
    /// Top edge of the bounding box in canvas space.
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub fill: ElementColor,
    pub stroke: ElementColor,
    pub stroke_width: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<Point>>,
}

impl CanvasElement {
    fn boxed(kind: ElementKind, bounds: Rect, color: ElementColor, stroke_width: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            x: bounds.x0,
            y: bounds.y0,
            width: bounds.width(),
            height: bounds.height(),
            fill: color,
            stroke: color,
            stroke_width,
            text: None,
            path: None,
        }
    }

    /// Create a rectangle of `size` x `size` centered on `center`.
    pub fn rectangle(center: Point, size: f64, color: ElementColor, stroke_width: f64) -> Self {
        let bounds = Rect::from_center_size(center, (size, size));
        Self::boxed(ElementKind::Rectangle, bounds, color, stroke_width)
    }

    /// Create a circle inscribed in a `size` x `size` box centered on `center`.
    pub fn circle(center: Point, size: f64, color: ElementColor, stroke_width: f64) -> Self {
        let bounds = Rect::from_center_size(center, (size, size));
        Self::boxed(ElementKind::Circle, bounds, color, stroke_width)
    }

    /// Create a text box with its top-left corner at `origin`.
    pub fn text(
        origin: Point,
        size: (f64, f64),
        content: impl Into<String>,
        color: ElementColor,
        stroke_width: f64,
    ) -> Self {
        let bounds = Rect::from_origin_size(origin, size);
        let mut element = Self::boxed(ElementKind::Text, bounds, color, stroke_width);
        element.text = Some(content.into());
        element
    }

    /// Create a freehand path from captured points.
    ///
    /// Returns `None` for fewer than two points. The bounding box is the
    /// min/max of the points.
    pub fn path(points: Vec<Point>, color: ElementColor, stroke_width: f64) -> Option<Self> {
        if points.len() < 2 {
            return None;
        }
        let bounds = points_bounds(&points)?;
        let mut element = Self::boxed(ElementKind::Path, bounds, color, stroke_width);
        element.path = Some(points);
        Some(element)
    }

    /// Bounding box in canvas space.
    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }

    /// Whether the bounding box contains `point` (edges included).
    ///
    /// Circles and paths are tested against their box, not their outline.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }

    /// Top-left corner of the bounding box.
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Move the bounding box so its top-left corner is at `position`.
    ///
    /// Path points move with the box.
    pub fn move_to(&mut self, position: Point) {
        let delta = Vec2::new(position.x - self.x, position.y - self.y);
        self.x = position.x;
        self.y = position.y;
        if let Some(points) = self.path.as_mut() {
            for point in points.iter_mut() {
                *point += delta;
            }
        }
    }

    /// Resize the bounding box, keeping its top-left corner.
    ///
    /// Path points are scaled along with the box. A path with no extent on
    /// an axis cannot be scaled along it, so that axis keeps its size.
    fn resize(&mut self, width: f64, height: f64) {
        let origin = self.position();
        match self.path.as_mut() {
            Some(points) => {
                let sx = if self.width > 0.0 { Some(width / self.width) } else { None };
                let sy = if self.height > 0.0 { Some(height / self.height) } else { None };
                for point in points.iter_mut() {
                    if let Some(sx) = sx {
                        point.x = origin.x + (point.x - origin.x) * sx;
                    }
                    if let Some(sy) = sy {
                        point.y = origin.y + (point.y - origin.y) * sy;
                    }
                }
                if sx.is_some() {
                    self.width = width;
                }
                if sy.is_some() {
                    self.height = height;
                }
            }
            None => {
                self.width = width;
                self.height = height;
            }
        }
    }

    /// Apply the present fields of a patch.
    pub fn apply(&mut self, patch: &ElementPatch) {
        if patch.x.is_some() || patch.y.is_some() {
            let target = Point::new(patch.x.unwrap_or(self.x), patch.y.unwrap_or(self.y));
            self.move_to(target);
        }
        if patch.width.is_some() || patch.height.is_some() {
            self.resize(patch.width.unwrap_or(self.width), patch.height.unwrap_or(self.height));
        }
        if let Some(fill) = patch.fill {
            self.fill = fill;
        }
        if let Some(stroke) = patch.stroke {
            self.stroke = stroke;
        }
        if let Some(stroke_width) = patch.stroke_width {
            self.stroke_width = stroke_width;
        }
        if let Some(ref text) = patch.text {
            if self.kind == ElementKind::Text {
                self.text = Some(text.clone());
            }
        }
    }
}

/// Sparse update for an element. Only present fields are applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<ElementColor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke: Option<ElementColor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f64>,
    /// Ignored for elements that are not text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl ElementPatch {
    /// A patch that moves an element's top-left corner.
    pub fn position(position: Point) -> Self {
        Self {
            x: Some(position.x),
            y: Some(position.y),
            ..Default::default()
        }
    }

    /// A patch that replaces text content.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    /// Whether the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Min/max box of a point set.
pub fn points_bounds(points: &[Point]) -> Option<Rect> {
    let (first, rest) = points.split_first()?;
    let mut bounds = Rect::from_points(*first, *first);
    for point in rest {
        bounds = bounds.union_pt(*point);
    }
    Some(bounds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rectangle_centered_on_click() {
        let rect = CanvasElement::rectangle(Point::new(200.0, 200.0), 100.0, ElementColor::black(), 2.0);
        assert_eq!(rect.kind, ElementKind::Rectangle);
        assert_eq!(rect.bounds(), Rect::new(150.0, 150.0, 250.0, 250.0));
        assert!(rect.text.is_none());
        assert!(rect.path.is_none());
    }

    #[test]
    fn test_text_anchored_at_click() {
        let text = CanvasElement::text(Point::new(10.0, 20.0), (200.0, 40.0), "hi", ElementColor::black(), 2.0);
        assert_eq!(text.bounds(), Rect::new(10.0, 20.0, 210.0, 60.0));
        assert_eq!(text.text.as_deref(), Some("hi"));
    }

    #[test]
    fn test_path_needs_two_points() {
        let color = ElementColor::black();
        assert!(CanvasElement::path(vec![], color, 2.0).is_none());
        assert!(CanvasElement::path(vec![Point::new(1.0, 1.0)], color, 2.0).is_none());

        let points = vec![Point::new(5.0, 9.0), Point::new(-3.0, 4.0), Point::new(12.0, 1.0)];
        let path = CanvasElement::path(points.clone(), color, 2.0).unwrap();
        assert_eq!(path.bounds(), Rect::new(-3.0, 1.0, 12.0, 9.0));
        assert_eq!(path.path, Some(points));
    }

    #[test]
    fn test_contains_uses_bounding_box() {
        let circle = CanvasElement::circle(Point::new(50.0, 50.0), 100.0, ElementColor::black(), 2.0);
        // Corner lies outside the circle itself but inside its box.
        assert!(circle.contains(Point::new(1.0, 1.0)));
        assert!(circle.contains(Point::new(100.0, 100.0)));
        assert!(!circle.contains(Point::new(100.1, 50.0)));
    }

    #[test]
    fn test_move_path_moves_points() {
        let points = vec![Point::new(0.0, 0.0), Point::new(10.0, 10.0)];
        let mut path = CanvasElement::path(points, ElementColor::black(), 2.0).unwrap();
        path.move_to(Point::new(5.0, -5.0));
        assert_eq!(path.position(), Point::new(5.0, -5.0));
        assert_eq!(path.path, Some(vec![Point::new(5.0, -5.0), Point::new(15.0, 5.0)]));
    }

    #[test]
    fn test_patch_ignores_text_on_shapes() {
        let mut rect = CanvasElement::rectangle(Point::ZERO, 10.0, ElementColor::black(), 2.0);
        rect.apply(&ElementPatch::text("nope"));
        assert!(rect.text.is_none());

        rect.apply(&ElementPatch {
            fill: Some(ElementColor::white()),
            x: Some(1.0),
            ..Default::default()
        });
        assert_eq!(rect.fill, ElementColor::white());
        assert_eq!(rect.position(), Point::new(1.0, -5.0));
    }

    #[test]
    fn test_element_json_shape() {
        let text = CanvasElement::text(Point::ZERO, (200.0, 40.0), "note", ElementColor::black(), 2.0);
        let json = serde_json::to_value(&text).unwrap();
        assert_eq!(json["type"], "text");
        assert_eq!(json["strokeWidth"], 2.0);
        assert_eq!(json["fill"], "#000000");
        assert!(json.get("path").is_none());

        let back: CanvasElement = serde_json::from_value(json).unwrap();
        assert_eq!(back, text);
    }

    #[test]
    fn test_resize_path_scales_points() {
        let points = vec![Point::new(10.0, 10.0), Point::new(20.0, 30.0), Point::new(30.0, 20.0)];
        let mut path = CanvasElement::path(points, ElementColor::black(), 2.0).unwrap();
        path.apply(&ElementPatch {
            width: Some(40.0),
            height: Some(10.0),
            ..ElementPatch::default()
        });

        assert_eq!(path.bounds(), Rect::new(10.0, 10.0, 50.0, 20.0));
        let points = path.path.as_deref().unwrap();
        assert_eq!(points_bounds(points), Some(path.bounds()));
        assert_eq!(points[1], Point::new(30.0, 20.0));
    }

    #[test]
    fn test_resize_flat_path_keeps_flat_axis() {
        let points = vec![Point::new(0.0, 5.0), Point::new(10.0, 5.0)];
        let mut path = CanvasElement::path(points, ElementColor::black(), 2.0).unwrap();
        path.apply(&ElementPatch {
            width: Some(20.0),
            height: Some(50.0),
            ..ElementPatch::default()
        });

        assert_eq!(path.bounds(), Rect::new(0.0, 5.0, 20.0, 5.0));
        assert_eq!(points_bounds(path.path.as_deref().unwrap()), Some(path.bounds()));
    }

    #[test]
    fn test_empty_patch() {
        assert!(ElementPatch::default().is_empty());
        assert!(!ElementPatch::position(Point::ZERO).is_empty());
    }
}
