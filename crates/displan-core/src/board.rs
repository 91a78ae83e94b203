//! Board editor: the interactive runtime of one open design board.
//!
//! [`BoardEditor`] owns the live [`CanvasState`], the undo history, the
//! active tool and the current [`Gesture`]. Pointer, wheel and keyboard
//! handlers update the state synchronously. Each committed mutation appends a
//! snapshot to the history and queues one full-state write in the outbox;
//! the host drains the outbox through
//! [`PersistenceBridge::flush`](crate::bridge::PersistenceBridge::flush)
//! without blocking the handlers.

use crate::comments::{CommentOverlay, NewComment};
use crate::config::EditorConfig;
use crate::document::CanvasState;
use crate::elements::{CanvasElement, ElementColor, ElementId, ElementKind, ElementPatch};
use crate::history::HistoryStack;
use crate::input::{Gesture, KeyEvent, Modifiers, MouseButton, PointerEvent};
use crate::session::Session;
use crate::tools::{ToolKind, ToolManager};
use crate::viewport::{self, Viewport};
use kurbo::{Point, Vec2};

/// A write the persistence bridge still has to perform.
#[derive(Debug, Clone, PartialEq)]
pub enum PendingWrite {
    /// Save this full snapshot as the board's state.
    SaveState(CanvasState),
    /// Create this comment on the board.
    CreateComment(NewComment),
}

/// Runtime state of an open board (not persisted as a whole).
#[derive(Debug, Clone)]
pub struct BoardEditor {
    board_id: String,
    session: Session,
    config: EditorConfig,
    /// The live canvas state.
    state: CanvasState,
    history: HistoryStack,
    tools: ToolManager,
    gesture: Gesture,
    /// Currently selected element IDs.
    selection: Vec<ElementId>,
    /// Screen position of the canvas surface's top-left corner.
    origin: Vec2,
    comments: CommentOverlay,
    outbox: Vec<PendingWrite>,
}

impl BoardEditor {
    /// Open an empty board.
    pub fn new(board_id: impl Into<String>, session: Session, config: EditorConfig) -> Self {
        Self::with_state(board_id, session, config, CanvasState::new())
    }

    /// Open a board with a previously saved state.
    ///
    /// The loaded state becomes the first history entry.
    pub fn with_state(board_id: impl Into<String>, session: Session, config: EditorConfig, state: CanvasState) -> Self {
        let history = HistoryStack::with_limit(state.clone(), config.history_limit);
        let tools = ToolManager::from_config(&config);
        let comments = CommentOverlay::new(config.comment_poll_interval(), config.comment_marker_size);
        Self {
            board_id: board_id.into(),
            session,
            config,
            state,
            history,
            tools,
            gesture: Gesture::Idle,
            selection: Vec::new(),
            origin: Vec2::ZERO,
            comments,
            outbox: Vec::new(),
        }
    }

    // --- Queries ---

    pub fn board_id(&self) -> &str {
        &self.board_id
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// The live canvas state.
    pub fn state(&self) -> &CanvasState {
        &self.state
    }

    pub fn viewport(&self) -> Viewport {
        self.state.viewport
    }

    /// Elements in paint order.
    pub fn elements(&self) -> &[CanvasElement] {
        &self.state.elements
    }

    /// Look up an element by ID.
    pub fn element(&self, id: ElementId) -> Option<&CanvasElement> {
        self.state.get(id)
    }

    pub fn selection(&self) -> &[ElementId] {
        &self.selection
    }

    /// Selected elements in paint order.
    pub fn selected_elements(&self) -> impl Iterator<Item = &CanvasElement> {
        self.state
            .elements
            .iter()
            .filter(|element| self.selection.contains(&element.id))
    }

    pub fn is_selected(&self, id: ElementId) -> bool {
        self.selection.contains(&id)
    }

    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    pub fn tool(&self) -> ToolKind {
        self.tools.current_tool
    }

    pub fn color(&self) -> ElementColor {
        self.tools.current_color
    }

    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    /// Points of the freehand stroke being drawn, for live preview.
    pub fn path_preview(&self) -> Option<&[Point]> {
        match &self.gesture {
            Gesture::DrawingPath { points } => Some(points),
            _ => None,
        }
    }

    /// The element whose text is being edited.
    pub fn editing_element(&self) -> Option<ElementId> {
        match self.gesture {
            Gesture::EditingText { id } => Some(id),
            _ => None,
        }
    }

    /// Text typed into the open comment composer.
    pub fn comment_draft(&self) -> Option<&str> {
        match &self.gesture {
            Gesture::ComposingComment { draft, .. } => Some(draft),
            _ => None,
        }
    }

    /// Check if undo is available.
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Check if redo is available.
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn history(&self) -> &HistoryStack {
        &self.history
    }

    pub fn comments(&self) -> &CommentOverlay {
        &self.comments
    }

    pub fn comments_mut(&mut self) -> &mut CommentOverlay {
        &mut self.comments
    }

    /// Convert a screen point to canvas space with the current viewport.
    pub fn screen_to_canvas(&self, screen: Point) -> Point {
        self.state.viewport.screen_to_canvas(screen, self.origin)
    }

    // --- Outbox ---

    pub fn has_pending_writes(&self) -> bool {
        !self.outbox.is_empty()
    }

    /// Queued writes, oldest first.
    pub fn pending_writes(&self) -> &[PendingWrite] {
        &self.outbox
    }

    /// Drain the queued writes, oldest first.
    pub fn take_pending_writes(&mut self) -> Vec<PendingWrite> {
        std::mem::take(&mut self.outbox)
    }

    /// Record the live state as a new history entry and queue its save.
    fn commit(&mut self, what: &str) {
        self.history.commit(self.state.clone());
        self.outbox.push(PendingWrite::SaveState(self.state.clone()));
        log::debug!(
            "board {}: committed {} ({} elements, history {}/{})",
            self.board_id,
            what,
            self.state.len(),
            self.history.index() + 1,
            self.history.len()
        );
    }

    /// Replace the live state with a history snapshot and queue its save.
    fn restore(&mut self, snapshot: CanvasState) {
        self.state = snapshot;
        let state = &self.state;
        self.selection.retain(|id| state.contains(*id));
        if let Gesture::EditingText { id } = self.gesture {
            if !self.state.contains(id) {
                self.gesture = Gesture::Idle;
            }
        }
        self.outbox.push(PendingWrite::SaveState(self.state.clone()));
    }

    // --- Mutations ---

    /// Append an element on top and commit.
    pub fn add_element(&mut self, element: CanvasElement) -> ElementId {
        let id = element.id;
        self.state.add_element(element);
        self.commit("add");
        id
    }

    /// Apply a patch to an element and commit.
    /// Returns false, committing nothing, if the id is unknown or the patch
    /// leaves the element unchanged.
    pub fn update_element(&mut self, id: ElementId, patch: &ElementPatch) -> bool {
        if patch.is_empty() {
            return false;
        }
        let Some(before) = self.state.get(id).cloned() else {
            return false;
        };
        self.state.update_element(id, patch);
        if self.state.get(id) == Some(&before) {
            return false;
        }
        self.commit("update");
        true
    }

    /// Delete every selected element and clear the selection.
    /// Returns how many elements were removed.
    pub fn delete_selected(&mut self) -> usize {
        let selected = std::mem::take(&mut self.selection);
        if selected.is_empty() {
            return 0;
        }
        let removed = self.state.remove_elements(&selected);
        if removed > 0 {
            self.commit("delete");
        }
        removed
    }

    /// Step back one history entry.
    /// Returns false at the start of history.
    pub fn undo(&mut self) -> bool {
        if !self.history.can_undo() {
            return false;
        }
        self.cancel_pointer_gesture();
        let Some(snapshot) = self.history.undo().cloned() else {
            return false;
        };
        self.restore(snapshot);
        log::debug!("board {}: undo to {}", self.board_id, self.history.index());
        true
    }

    /// Step forward one history entry.
    /// Returns false at the end of history.
    pub fn redo(&mut self) -> bool {
        if !self.history.can_redo() {
            return false;
        }
        self.cancel_pointer_gesture();
        let Some(snapshot) = self.history.redo().cloned() else {
            return false;
        };
        self.restore(snapshot);
        log::debug!("board {}: redo to {}", self.board_id, self.history.index());
        true
    }

    // --- Tool / selection ---

    /// Set the current tool, dropping any gesture in progress.
    pub fn set_tool(&mut self, tool: ToolKind) {
        self.cancel_gesture();
        self.tools.set_tool(tool);
    }

    /// Set the color for new elements.
    pub fn set_color(&mut self, color: ElementColor) {
        self.tools.set_color(color);
    }

    /// Set where the canvas surface sits on screen.
    pub fn set_origin(&mut self, origin: Vec2) {
        self.origin = origin;
    }

    /// Select a single element (clears previous selection).
    pub fn select(&mut self, id: ElementId) {
        self.selection.clear();
        if self.state.contains(id) {
            self.selection.push(id);
        }
    }

    /// Clear selection.
    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Abandon the current gesture without committing it.
    ///
    /// A drag in progress snaps back; a pan in progress returns to where it
    /// started.
    pub fn cancel_gesture(&mut self) {
        match std::mem::take(&mut self.gesture) {
            Gesture::Panning { start_pan, .. } => self.state.viewport.set_pan(start_pan),
            Gesture::DraggingElement { id, start_position, .. } => {
                if let Some(element) = self.state.get_mut(id) {
                    element.move_to(start_position);
                }
            }
            _ => {}
        }
    }

    /// Abandon a pointer gesture; text editing and comment drafts stay open.
    fn cancel_pointer_gesture(&mut self) {
        if !self.gesture.is_modal() {
            self.cancel_gesture();
        }
    }

    // --- Pointer input ---

    /// Dispatch a pointer event. Returns true if the board reacted.
    pub fn handle_pointer_event(&mut self, event: PointerEvent) -> bool {
        match event {
            PointerEvent::Down { position, button } => self.pointer_down(position, button),
            PointerEvent::Move { position } => self.pointer_move(position),
            PointerEvent::Up { position, button } => self.pointer_up(position, button),
            PointerEvent::Wheel { delta, modifiers, .. } => self.wheel(delta.y, modifiers),
        }
    }

    /// Start a gesture with the current tool.
    pub fn pointer_down(&mut self, screen: Point, button: MouseButton) -> bool {
        if button != MouseButton::Left || self.gesture.is_modal() {
            return false;
        }
        if !self.gesture.is_idle() {
            // The pointer-up of the previous gesture never arrived.
            self.finish_gesture();
        }

        let canvas = self.screen_to_canvas(screen);
        match self.tools.current_tool {
            ToolKind::Select => {
                let hit = self
                    .state
                    .element_at(canvas)
                    .map(|element| (element.id, element.position()));
                match hit {
                    Some((id, position)) => {
                        self.selection = vec![id];
                        self.gesture = Gesture::DraggingElement {
                            id,
                            grab_offset: canvas - position,
                            start_position: position,
                        };
                    }
                    None => self.selection.clear(),
                }
            }
            ToolKind::Hand => {
                self.gesture = Gesture::Panning {
                    start_pointer: screen,
                    start_pan: self.state.viewport.pan(),
                };
            }
            ToolKind::Pen => {
                self.gesture = Gesture::DrawingPath { points: vec![canvas] };
            }
            ToolKind::Rectangle | ToolKind::Circle => {
                if let Some(element) = self.tools.place(canvas, &self.config) {
                    self.add_element(element);
                }
            }
            ToolKind::Text => {
                if let Some(element) = self.tools.place(canvas, &self.config) {
                    let id = self.add_element(element);
                    self.selection = vec![id];
                    self.gesture = Gesture::EditingText { id };
                }
            }
            ToolKind::Comment => {
                self.gesture = Gesture::ComposingComment {
                    screen,
                    canvas,
                    draft: String::new(),
                };
            }
        }
        log::trace!("pointer down with {:?} -> {}", self.tools.current_tool, self.gesture.name());
        true
    }

    /// Update the gesture in progress.
    /// Returns true if anything visible changed.
    pub fn pointer_move(&mut self, screen: Point) -> bool {
        let canvas = self.screen_to_canvas(screen);
        match &mut self.gesture {
            Gesture::Panning { start_pointer, start_pan } => {
                let pan = *start_pan + (screen - *start_pointer);
                self.state.viewport.set_pan(pan);
                true
            }
            Gesture::DraggingElement { id, grab_offset, .. } => {
                let target = canvas - *grab_offset;
                match self.state.get_mut(*id) {
                    Some(element) => {
                        element.move_to(target);
                        true
                    }
                    None => {
                        self.gesture = Gesture::Idle;
                        false
                    }
                }
            }
            Gesture::DrawingPath { points } => {
                points.push(canvas);
                true
            }
            _ => false,
        }
    }

    /// Commit the gesture in progress and return to idle.
    pub fn pointer_up(&mut self, _screen: Point, button: MouseButton) -> bool {
        if button != MouseButton::Left || self.gesture.is_idle() || self.gesture.is_modal() {
            return false;
        }
        self.finish_gesture();
        true
    }

    /// Commit a pointer gesture. Modal states are left alone.
    fn finish_gesture(&mut self) {
        if self.gesture.is_modal() {
            return;
        }
        match std::mem::take(&mut self.gesture) {
            Gesture::Panning { start_pan, .. } => {
                if self.state.viewport.pan() != start_pan {
                    self.commit("pan");
                }
            }
            Gesture::DraggingElement { id, start_position, .. } => {
                let moved = self
                    .state
                    .get(id)
                    .is_some_and(|element| element.position() != start_position);
                if moved {
                    self.commit("move");
                }
            }
            Gesture::DrawingPath { points } => {
                let count = points.len();
                match self.tools.finish_path(points) {
                    Some(path) => {
                        self.add_element(path);
                    }
                    None => log::debug!("discarding freehand stroke with {} point(s)", count),
                }
            }
            _ => {}
        }
    }

    /// Zoom on a wheel tick while Ctrl/Meta is held.
    /// Ignored unless idle. Returns true if the zoom changed.
    pub fn wheel(&mut self, delta_y: f64, modifiers: Modifiers) -> bool {
        if !self.gesture.is_idle() {
            return false;
        }
        let Some(factor) =
            viewport::wheel_zoom_factor(delta_y, modifiers, self.config.zoom_in_factor, self.config.zoom_out_factor)
        else {
            return false;
        };
        if !self
            .state
            .viewport
            .zoom_by(factor, self.config.min_zoom, self.config.max_zoom)
        {
            return false;
        }
        self.commit("zoom");
        true
    }

    /// Start editing an existing text element at a screen point.
    pub fn double_click(&mut self, screen: Point) -> bool {
        if !self.gesture.is_idle() {
            return false;
        }
        let canvas = self.screen_to_canvas(screen);
        let Some(id) = self
            .state
            .element_at(canvas)
            .filter(|element| element.kind == ElementKind::Text)
            .map(|element| element.id)
        else {
            return false;
        };
        self.selection = vec![id];
        self.gesture = Gesture::EditingText { id };
        true
    }

    // --- Keyboard input ---

    /// Handle a key press. Returns true if the board consumed it.
    pub fn key_down(&mut self, event: &KeyEvent) -> bool {
        match &self.gesture {
            Gesture::EditingText { .. } => {
                if (event.is("Enter") && !event.modifiers.shift) || event.is("Escape") {
                    self.finish_text_edit();
                    return true;
                }
                false
            }
            Gesture::ComposingComment { .. } => {
                if event.is("Enter") {
                    self.submit_comment();
                    return true;
                }
                if event.is("Escape") {
                    return self.cancel_comment();
                }
                false
            }
            Gesture::Idle => {
                if event.is("Delete") {
                    return self.delete_selected() > 0;
                }
                if event.is("Escape") && !self.selection.is_empty() {
                    self.selection.clear();
                    return true;
                }
                if event.modifiers.command() && event.is("z") {
                    return if event.modifiers.shift { self.redo() } else { self.undo() };
                }
                if event.modifiers.command() && event.is("y") {
                    return self.redo();
                }
                false
            }
            _ => false,
        }
    }

    /// Leave any modal state: text edits are kept, comment drafts dropped.
    pub fn blur(&mut self) {
        match self.gesture {
            Gesture::EditingText { .. } => self.finish_text_edit(),
            Gesture::ComposingComment { .. } => {
                self.cancel_comment();
            }
            _ => {}
        }
    }

    // --- Text editing ---

    /// Replace the content of the element being edited and commit.
    pub fn edit_text(&mut self, text: impl Into<String>) -> bool {
        let Some(id) = self.editing_element() else {
            return false;
        };
        let text = text.into();
        if self.state.get(id).and_then(|element| element.text.as_deref()) == Some(text.as_str()) {
            return false;
        }
        self.update_element(id, &ElementPatch::text(text))
    }

    /// Leave text editing.
    pub fn finish_text_edit(&mut self) {
        if matches!(self.gesture, Gesture::EditingText { .. }) {
            self.gesture = Gesture::Idle;
        }
    }

    // --- Comment composing ---

    /// Replace the text in the open comment composer.
    pub fn set_comment_draft(&mut self, text: impl Into<String>) -> bool {
        match &mut self.gesture {
            Gesture::ComposingComment { draft, .. } => {
                *draft = text.into();
                true
            }
            _ => false,
        }
    }

    /// Queue the drafted comment for creation and close the composer.
    ///
    /// A blank draft keeps the composer open and queues nothing.
    pub fn submit_comment(&mut self) -> bool {
        let Gesture::ComposingComment { canvas, draft, .. } = &self.gesture else {
            return false;
        };
        let text = draft.trim();
        if text.is_empty() {
            return false;
        }
        let comment = NewComment {
            x: canvas.x,
            y: canvas.y,
            text: text.to_string(),
            author_email: self.session.email.clone(),
        };
        self.outbox.push(PendingWrite::CreateComment(comment));
        self.gesture = Gesture::Idle;
        true
    }

    /// Close the comment composer without creating anything.
    pub fn cancel_comment(&mut self) -> bool {
        if matches!(self.gesture, Gesture::ComposingComment { .. }) {
            self.gesture = Gesture::Idle;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Rect;

    fn editor() -> BoardEditor {
        BoardEditor::new(
            "board-1",
            Session::new("u1", "ana@example.com"),
            EditorConfig::default(),
        )
    }

    fn click(editor: &mut BoardEditor, x: f64, y: f64) -> bool {
        let p = Point::new(x, y);
        let handled = editor.pointer_down(p, MouseButton::Left);
        editor.pointer_up(p, MouseButton::Left);
        handled
    }

    fn drag(editor: &mut BoardEditor, from: (f64, f64), to: &[(f64, f64)]) {
        editor.pointer_down(Point::new(from.0, from.1), MouseButton::Left);
        for &(x, y) in to {
            editor.pointer_move(Point::new(x, y));
        }
        let end = to.last().copied().unwrap_or(from);
        editor.pointer_up(Point::new(end.0, end.1), MouseButton::Left);
    }

    fn ctrl() -> Modifiers {
        Modifiers {
            ctrl: true,
            ..Modifiers::default()
        }
    }

    fn saved_states(editor: &mut BoardEditor) -> Vec<CanvasState> {
        editor
            .take_pending_writes()
            .into_iter()
            .filter_map(|write| match write {
                PendingWrite::SaveState(state) => Some(state),
                PendingWrite::CreateComment(_) => None,
            })
            .collect()
    }

    #[test]
    fn test_place_rectangle_scenario() {
        let mut editor = editor();
        editor.set_tool(ToolKind::Rectangle);
        assert!(click(&mut editor, 200.0, 200.0));

        assert_eq!(editor.elements().len(), 1);
        let rect = &editor.elements()[0];
        assert_eq!(rect.kind, ElementKind::Rectangle);
        assert_eq!(rect.bounds(), Rect::new(150.0, 150.0, 250.0, 250.0));
        assert!(editor.gesture().is_idle());

        let saved = saved_states(&mut editor);
        assert_eq!(saved.len(), 1);
        assert_eq!(&saved[0], editor.state());
    }

    #[test]
    fn test_drag_rectangle_scenario() {
        let mut editor = editor();
        editor.set_tool(ToolKind::Rectangle);
        click(&mut editor, 200.0, 200.0);
        let id = editor.elements()[0].id;

        editor.set_tool(ToolKind::Select);
        editor.pointer_down(Point::new(250.0, 250.0), MouseButton::Left);
        assert!(editor.is_selected(id));
        assert!(matches!(editor.gesture(), Gesture::DraggingElement { .. }));

        editor.pointer_move(Point::new(300.0, 300.0));
        editor.pointer_up(Point::new(300.0, 300.0), MouseButton::Left);

        assert_eq!(editor.element(id).map(|e| e.position()), Some(Point::new(200.0, 200.0)));
        assert!(editor.gesture().is_idle());
        // One save for the placement, one for the move.
        assert_eq!(saved_states(&mut editor).len(), 2);
    }

    #[test]
    fn test_drag_keeps_grab_offset_under_zoom() {
        let mut editor = editor();
        editor.set_origin(Vec2::new(10.0, 10.0));
        editor.add_element(CanvasElement::rectangle(Point::new(50.0, 50.0), 100.0, ElementColor::black(), 2.0));
        editor.wheel(-1.0, ctrl());
        let zoom = editor.viewport().zoom;

        // Grab the element at canvas (20, 30) and move the pointer 22 screen px right.
        let grab = editor.viewport().canvas_to_screen(Point::new(20.0, 30.0), editor.origin());
        drag(&mut editor, (grab.x, grab.y), &[(grab.x + 22.0, grab.y)]);

        let position = editor.elements()[0].position();
        assert!((position.x - 22.0 / zoom).abs() < 1e-9);
        assert!(position.y.abs() < 1e-9);
    }

    #[test]
    fn test_click_without_move_commits_nothing() {
        let mut editor = editor();
        editor.add_element(CanvasElement::rectangle(Point::ZERO, 10.0, ElementColor::black(), 2.0));
        editor.take_pending_writes();

        click(&mut editor, 0.0, 0.0);
        assert_eq!(editor.selection().len(), 1);
        assert!(!editor.has_pending_writes());
    }

    #[test]
    fn test_select_miss_clears_selection() {
        let mut editor = editor();
        let id = editor.add_element(CanvasElement::rectangle(Point::ZERO, 10.0, ElementColor::black(), 2.0));
        editor.select(id);

        click(&mut editor, 500.0, 500.0);
        assert!(editor.selection().is_empty());
    }

    #[test]
    fn test_select_picks_topmost() {
        let mut editor = editor();
        editor.add_element(CanvasElement::rectangle(Point::ZERO, 100.0, ElementColor::black(), 2.0));
        let top = editor.add_element(CanvasElement::circle(Point::new(40.0, 40.0), 100.0, ElementColor::black(), 2.0));

        click(&mut editor, 20.0, 20.0);
        assert_eq!(editor.selection(), &[top]);
    }

    #[test]
    fn test_pen_single_point_discarded() {
        let mut editor = editor();
        editor.set_tool(ToolKind::Pen);
        click(&mut editor, 5.0, 5.0);

        assert!(editor.elements().is_empty());
        assert!(!editor.has_pending_writes());
        assert!(!editor.can_undo());
    }

    #[test]
    fn test_pen_stroke_commits_one_path() {
        let mut editor = editor();
        editor.set_tool(ToolKind::Pen);
        editor.pointer_down(Point::new(10.0, 10.0), MouseButton::Left);
        assert_eq!(editor.path_preview().map(<[Point]>::len), Some(1));
        editor.pointer_move(Point::new(40.0, -5.0));
        editor.pointer_move(Point::new(25.0, 30.0));
        editor.pointer_up(Point::new(25.0, 30.0), MouseButton::Left);

        assert_eq!(editor.elements().len(), 1);
        let path = &editor.elements()[0];
        assert_eq!(path.kind, ElementKind::Path);
        assert_eq!(path.bounds(), Rect::new(10.0, -5.0, 40.0, 30.0));
        assert_eq!(path.path.as_ref().map(Vec::len), Some(3));
        assert_eq!(saved_states(&mut editor).len(), 1);
    }

    #[test]
    fn test_hand_tool_pans_and_commits_once() {
        let mut editor = editor();
        editor.set_tool(ToolKind::Hand);
        drag(&mut editor, (100.0, 100.0), &[(110.0, 95.0), (130.0, 80.0)]);

        assert_eq!(editor.viewport().pan(), Vec2::new(30.0, -20.0));
        assert_eq!(saved_states(&mut editor).len(), 1);
        assert!(editor.undo());
        assert_eq!(editor.viewport().pan(), Vec2::ZERO);
    }

    #[test]
    fn test_wheel_zoom_needs_modifier() {
        let mut editor = editor();
        assert!(!editor.wheel(-1.0, Modifiers::default()));
        assert!(!editor.has_pending_writes());

        assert!(editor.wheel(-1.0, ctrl()));
        assert!((editor.viewport().zoom - 1.1).abs() < 1e-12);
        assert_eq!(saved_states(&mut editor).len(), 1);
    }

    #[test]
    fn test_wheel_at_limit_commits_nothing() {
        let mut editor = editor();
        for _ in 0..40 {
            editor.wheel(-1.0, ctrl());
        }
        editor.take_pending_writes();
        assert!(!editor.wheel(-1.0, ctrl()));
        assert!(!editor.has_pending_writes());
        assert!((editor.viewport().zoom - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_wheel_ignored_mid_drag() {
        let mut editor = editor();
        let id = editor.add_element(CanvasElement::rectangle(Point::new(50.0, 50.0), 100.0, ElementColor::black(), 2.0));
        editor.take_pending_writes();

        editor.pointer_down(Point::new(50.0, 50.0), MouseButton::Left);
        editor.pointer_move(Point::new(80.0, 80.0));
        assert!(!editor.wheel(-1.0, ctrl()));
        assert!((editor.viewport().zoom - 1.0).abs() < f64::EPSILON);
        assert!(!editor.has_pending_writes());

        editor.set_tool(ToolKind::Pen);
        assert_eq!(editor.element(id).map(|e| e.position()), Some(Point::ZERO));
        assert_eq!(editor.history().current(), editor.state());
    }

    #[test]
    fn test_text_tool_enters_editing() {
        let mut editor = editor();
        editor.set_tool(ToolKind::Text);
        editor.pointer_down(Point::new(30.0, 40.0), MouseButton::Left);

        let id = editor.editing_element().unwrap();
        let text = editor.element(id).unwrap();
        assert_eq!(text.bounds(), Rect::new(30.0, 40.0, 230.0, 80.0));
        assert_eq!(text.text.as_deref(), Some("Double click to edit"));

        // Switching tools ends the edit.
        editor.set_tool(ToolKind::Rectangle);
        assert!(editor.editing_element().is_none());
    }

    #[test]
    fn test_text_editing_suppresses_pointer() {
        let mut editor = editor();
        editor.set_tool(ToolKind::Text);
        editor.pointer_down(Point::new(0.0, 0.0), MouseButton::Left);
        editor.pointer_up(Point::new(0.0, 0.0), MouseButton::Left);
        let id = editor.editing_element().unwrap();

        assert!(!editor.pointer_down(Point::new(400.0, 400.0), MouseButton::Left));
        assert_eq!(editor.elements().len(), 1);

        assert!(editor.edit_text("Kickoff agenda"));
        assert!(!editor.edit_text("Kickoff agenda"));
        assert!(editor.key_down(&KeyEvent::new("Enter")));
        assert!(editor.gesture().is_idle());
        assert_eq!(editor.element(id).and_then(|e| e.text.as_deref()), Some("Kickoff agenda"));
        // Placement plus one edit.
        assert_eq!(saved_states(&mut editor).len(), 2);
    }

    #[test]
    fn test_double_click_edits_existing_text() {
        let mut editor = editor();
        let id = editor.add_element(CanvasElement::text(
            Point::ZERO,
            (200.0, 40.0),
            "note",
            ElementColor::black(),
            2.0,
        ));
        editor.add_element(CanvasElement::rectangle(Point::new(500.0, 500.0), 10.0, ElementColor::black(), 2.0));

        assert!(!editor.double_click(Point::new(500.0, 500.0)));
        assert!(editor.double_click(Point::new(10.0, 10.0)));
        assert_eq!(editor.editing_element(), Some(id));

        editor.blur();
        assert!(editor.gesture().is_idle());
    }

    #[test]
    fn test_comment_submit() {
        let mut editor = editor();
        editor.set_tool(ToolKind::Comment);
        editor.set_origin(Vec2::new(100.0, 0.0));
        editor.pointer_down(Point::new(150.0, 60.0), MouseButton::Left);

        assert!(matches!(
            editor.gesture(),
            Gesture::ComposingComment { screen, .. } if *screen == Point::new(150.0, 60.0)
        ));
        assert!(!editor.pointer_down(Point::new(0.0, 0.0), MouseButton::Left));

        // Blank drafts stay open.
        editor.set_comment_draft("   ");
        assert!(!editor.submit_comment());
        assert_eq!(editor.comment_draft(), Some("   "));

        editor.set_comment_draft(" Move the logo up ");
        assert!(editor.key_down(&KeyEvent::new("Enter")));
        assert!(editor.gesture().is_idle());

        let writes = editor.take_pending_writes();
        assert_eq!(
            writes,
            vec![PendingWrite::CreateComment(NewComment {
                x: 50.0,
                y: 60.0,
                text: "Move the logo up".to_string(),
                author_email: "ana@example.com".to_string(),
            })]
        );
        // Comments are not part of the canvas history.
        assert!(!editor.can_undo());
    }

    #[test]
    fn test_comment_cancel() {
        let mut editor = editor();
        editor.set_tool(ToolKind::Comment);
        editor.pointer_down(Point::new(10.0, 10.0), MouseButton::Left);
        editor.set_comment_draft("never mind");

        assert!(editor.key_down(&KeyEvent::new("Escape")));
        assert!(editor.gesture().is_idle());
        assert!(!editor.has_pending_writes());

        editor.pointer_down(Point::new(10.0, 10.0), MouseButton::Left);
        editor.blur();
        assert!(editor.gesture().is_idle());
        assert!(!editor.has_pending_writes());
    }

    #[test]
    fn test_delete_key_removes_selection() {
        let mut editor = editor();
        let keep = editor.add_element(CanvasElement::rectangle(Point::new(500.0, 0.0), 10.0, ElementColor::black(), 2.0));
        let gone = editor.add_element(CanvasElement::rectangle(Point::ZERO, 10.0, ElementColor::black(), 2.0));
        click(&mut editor, 0.0, 0.0);
        editor.take_pending_writes();

        assert!(editor.key_down(&KeyEvent::new("Delete")));
        assert!(editor.element(gone).is_none());
        assert!(editor.element(keep).is_some());
        assert!(editor.selection().is_empty());
        assert_eq!(saved_states(&mut editor).len(), 1);

        // Nothing selected: nothing to do.
        assert!(!editor.key_down(&KeyEvent::new("Delete")));
        assert!(!editor.has_pending_writes());
    }

    #[test]
    fn test_delete_ignored_while_editing_text() {
        let mut editor = editor();
        editor.set_tool(ToolKind::Text);
        editor.pointer_down(Point::ZERO, MouseButton::Left);

        assert!(!editor.key_down(&KeyEvent::new("Delete")));
        assert_eq!(editor.elements().len(), 1);
    }

    #[test]
    fn test_update_missing_element_is_noop() {
        let mut editor = editor();
        assert!(!editor.update_element(uuid::Uuid::new_v4(), &ElementPatch::text("x")));
        assert!(!editor.has_pending_writes());
        assert!(!editor.can_undo());
    }

    #[test]
    fn test_add_then_undo_scenario() {
        let mut editor = editor();
        editor.set_tool(ToolKind::Rectangle);
        click(&mut editor, 100.0, 100.0);
        let after_first = editor.state().clone();
        editor.set_tool(ToolKind::Circle);
        click(&mut editor, 300.0, 300.0);
        assert_eq!(editor.elements().len(), 2);
        editor.take_pending_writes();

        assert!(editor.undo());
        assert_eq!(editor.elements().len(), 1);
        assert_eq!(editor.state(), &after_first);
        // The restored state is pushed to storage.
        assert_eq!(saved_states(&mut editor), vec![after_first]);
    }

    #[test]
    fn test_undo_at_start_is_noop() {
        let mut editor = editor();
        assert!(!editor.can_undo());
        assert!(!editor.undo());
        assert!(!editor.has_pending_writes());
    }

    #[test]
    fn test_undo_at_start_keeps_comment_draft() {
        let mut editor = editor();
        editor.set_tool(ToolKind::Comment);
        editor.pointer_down(Point::new(10.0, 10.0), MouseButton::Left);
        editor.set_comment_draft("half typed");

        assert!(!editor.undo());
        assert!(!editor.redo());
        assert_eq!(editor.comment_draft(), Some("half typed"));
    }

    #[test]
    fn test_undo_keeps_text_edit_on_surviving_element() {
        let mut editor = editor();
        editor.add_element(CanvasElement::rectangle(Point::new(500.0, 500.0), 10.0, ElementColor::black(), 2.0));
        editor.set_tool(ToolKind::Text);
        editor.pointer_down(Point::ZERO, MouseButton::Left);
        let id = editor.editing_element().unwrap();
        editor.edit_text("draft");

        // Back to the placeholder text: the element still exists.
        assert!(editor.undo());
        assert_eq!(editor.editing_element(), Some(id));

        // Back before the placement: nothing left to edit.
        assert!(editor.undo());
        assert!(editor.editing_element().is_none());
        assert!(editor.gesture().is_idle());
    }

    #[test]
    fn test_text_patch_on_shape_commits_nothing() {
        let mut editor = editor();
        let id = editor.add_element(CanvasElement::rectangle(Point::ZERO, 10.0, ElementColor::black(), 2.0));
        editor.take_pending_writes();

        assert!(!editor.update_element(id, &ElementPatch::text("ignored")));
        assert!(!editor.update_element(id, &ElementPatch::position(Point::new(-5.0, -5.0))));
        assert!(!editor.has_pending_writes());
        assert_eq!(editor.history().index(), 1);

        assert!(editor.update_element(id, &ElementPatch::position(Point::new(1.0, 1.0))));
        assert_eq!(saved_states(&mut editor).len(), 1);
    }

    #[test]
    fn test_undo_prunes_selection_and_redo_restores() {
        let mut editor = editor();
        let id = editor.add_element(CanvasElement::rectangle(Point::ZERO, 10.0, ElementColor::black(), 2.0));
        editor.select(id);

        assert!(editor.undo());
        assert!(editor.selection().is_empty());
        assert!(editor.can_redo());

        assert!(editor.key_down(&KeyEvent::with_modifiers(
            "z",
            Modifiers {
                ctrl: true,
                shift: true,
                ..Modifiers::default()
            }
        )));
        assert!(editor.element(id).is_some());
        assert!(!editor.can_redo());
    }

    #[test]
    fn test_new_commit_after_undo_drops_redo() {
        let mut editor = editor();
        editor.add_element(CanvasElement::rectangle(Point::ZERO, 10.0, ElementColor::black(), 2.0));
        editor.undo();
        editor.add_element(CanvasElement::circle(Point::ZERO, 10.0, ElementColor::black(), 2.0));

        assert!(!editor.can_redo());
        assert_eq!(editor.elements()[0].kind, ElementKind::Circle);
    }

    #[test]
    fn test_set_tool_cancels_drag() {
        let mut editor = editor();
        let id = editor.add_element(CanvasElement::rectangle(Point::new(50.0, 50.0), 100.0, ElementColor::black(), 2.0));
        editor.take_pending_writes();

        editor.pointer_down(Point::new(50.0, 50.0), MouseButton::Left);
        editor.pointer_move(Point::new(80.0, 80.0));
        editor.set_tool(ToolKind::Pen);

        assert_eq!(editor.element(id).map(|e| e.position()), Some(Point::ZERO));
        assert!(!editor.has_pending_writes());
    }

    #[test]
    fn test_missed_pointer_up_commits_previous_stroke() {
        let mut editor = editor();
        editor.set_tool(ToolKind::Pen);
        editor.pointer_down(Point::new(0.0, 0.0), MouseButton::Left);
        editor.pointer_move(Point::new(10.0, 10.0));
        editor.pointer_down(Point::new(50.0, 50.0), MouseButton::Left);

        assert_eq!(editor.elements().len(), 1);
        assert_eq!(editor.path_preview().map(<[Point]>::len), Some(1));
    }

    #[test]
    fn test_secondary_button_ignored() {
        let mut editor = editor();
        editor.set_tool(ToolKind::Rectangle);
        assert!(!editor.pointer_down(Point::ZERO, MouseButton::Right));
        assert!(editor.elements().is_empty());
    }

    #[test]
    fn test_handle_pointer_event_dispatch() {
        let mut editor = editor();
        editor.set_tool(ToolKind::Circle);
        assert!(editor.handle_pointer_event(PointerEvent::Down {
            position: Point::new(0.0, 0.0),
            button: MouseButton::Left,
        }));
        assert!(editor.handle_pointer_event(PointerEvent::Wheel {
            position: Point::ZERO,
            delta: Vec2::new(0.0, 3.0),
            modifiers: ctrl(),
        }));
        assert_eq!(editor.elements().len(), 1);
        assert!((editor.viewport().zoom - 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_loaded_state_is_history_floor() {
        let mut state = CanvasState::new();
        state.add_element(CanvasElement::rectangle(Point::ZERO, 10.0, ElementColor::black(), 2.0));
        let mut editor = BoardEditor::with_state(
            "b",
            Session::new("u1", "ana@example.com"),
            EditorConfig::default(),
            state.clone(),
        );

        assert!(!editor.can_undo());
        assert_eq!(editor.state(), &state);
        editor.select(state.elements[0].id);
        editor.delete_selected();
        assert!(editor.undo());
        assert_eq!(editor.state(), &state);
    }
}
