//! Canvas state: the unit of persistence and undo.

use crate::elements::{CanvasElement, ElementId, ElementPatch};
use crate::viewport::{self, Viewport};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// All elements on a board plus the viewport they are shown through.
///
/// Element order is paint order: the last element is drawn on top and wins
/// hit-tests. Every save is a full copy of this struct.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CanvasState {
    #[serde(default)]
    pub elements: Vec<CanvasElement>,
    #[serde(default)]
    pub viewport: Viewport,
}

impl CanvasState {
    /// Create an empty state with the identity viewport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an element on top of everything else.
    pub fn add_element(&mut self, element: CanvasElement) {
        self.elements.push(element);
    }

    /// Apply a patch to an element.
    /// Returns false if no element has that id.
    pub fn update_element(&mut self, id: ElementId, patch: &ElementPatch) -> bool {
        match self.get_mut(id) {
            Some(element) => {
                element.apply(patch);
                true
            }
            None => false,
        }
    }

    /// Remove every element whose id is listed.
    /// Returns how many were removed.
    pub fn remove_elements(&mut self, ids: &[ElementId]) -> usize {
        let before = self.elements.len();
        self.elements.retain(|element| !ids.contains(&element.id));
        before - self.elements.len()
    }

    /// Get an element by ID.
    pub fn get(&self, id: ElementId) -> Option<&CanvasElement> {
        self.elements.iter().find(|element| element.id == id)
    }

    /// Get a mutable reference to an element by ID.
    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut CanvasElement> {
        self.elements.iter_mut().find(|element| element.id == id)
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.get(id).is_some()
    }

    /// Topmost element at a canvas-space point.
    pub fn element_at(&self, point: Point) -> Option<&CanvasElement> {
        viewport::hit_test(point, &self.elements)
    }

    /// Bounding box of all elements.
    pub fn bounds(&self) -> Option<Rect> {
        self.elements
            .iter()
            .map(CanvasElement::bounds)
            .reduce(|acc, bounds| acc.union(bounds))
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Serialize the state to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize a state from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
