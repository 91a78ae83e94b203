//! Persistence bridge between a board editor and its stores.
//!
//! Writes are optimistic: the editor has already applied every change by the
//! time [`PersistenceBridge::flush`] runs. A failed write is logged and
//! dropped; the live state is never rolled back and the write is not retried.

use crate::board::{BoardEditor, PendingWrite};
use crate::config::EditorConfig;
use crate::document::CanvasState;
use crate::session::Session;
use crate::storage::{BoardStore, CommentStore};
use std::sync::Arc;
use std::time::Instant;

/// Outcome of one [`PersistenceBridge::flush`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushReport {
    pub states_saved: usize,
    pub comments_created: usize,
    pub failed: usize,
}

impl FlushReport {
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

/// Loads boards from a store and flushes their queued writes back to it.
pub struct PersistenceBridge<S: BoardStore + CommentStore> {
    storage: Arc<S>,
}

impl<S: BoardStore + CommentStore> Clone for PersistenceBridge<S> {
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
        }
    }
}

impl<S: BoardStore + CommentStore> PersistenceBridge<S> {
    pub fn new(storage: Arc<S>) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &Arc<S> {
        &self.storage
    }

    /// Open a board: load its saved state and its comments.
    ///
    /// A board that was never saved opens empty. A failed load also opens
    /// empty, after logging the error.
    pub async fn mount(&self, board_id: &str, session: Session, config: EditorConfig) -> BoardEditor {
        let state = match self.storage.load_canvas_state(board_id).await {
            Ok(state) => {
                log::info!("loaded board {} ({} elements)", board_id, state.len());
                state
            }
            Err(e) if e.is_not_found() => {
                log::debug!("board {} has no saved state, starting empty", board_id);
                CanvasState::new()
            }
            Err(e) => {
                log::warn!("failed to load board {}: {}", board_id, e);
                CanvasState::new()
            }
        };

        let mut editor = BoardEditor::with_state(board_id, session, config, state);
        editor.comments_mut().mount();
        self.refresh_comments(&mut editor, Instant::now()).await;
        editor
    }

    /// Perform every write the editor has queued, oldest first.
    pub async fn flush(&self, editor: &mut BoardEditor) -> FlushReport {
        let mut report = FlushReport::default();
        let board_id = editor.board_id().to_string();

        for write in editor.take_pending_writes() {
            match write {
                PendingWrite::SaveState(state) => match self.storage.save_canvas_state(&board_id, &state).await {
                    Ok(()) => report.states_saved += 1,
                    Err(e) => {
                        log::warn!("failed to save board {}: {}", board_id, e);
                        report.failed += 1;
                    }
                },
                PendingWrite::CreateComment(comment) => match self.storage.create_comment(&board_id, comment).await {
                    Ok(created) => {
                        editor.comments_mut().insert(created);
                        report.comments_created += 1;
                    }
                    Err(e) => {
                        log::warn!("failed to create comment on board {}: {}", board_id, e);
                        report.failed += 1;
                    }
                },
            }
        }

        if report.states_saved + report.comments_created + report.failed > 0 {
            log::debug!("flushed board {}: {:?}", board_id, report);
        }
        report
    }

    /// Fetch the comment list if a poll is due.
    /// Returns true if the list was replaced.
    pub async fn refresh_comments(&self, editor: &mut BoardEditor, now: Instant) -> bool {
        if !editor.comments().needs_refresh(now) {
            return false;
        }
        let board_id = editor.board_id().to_string();
        match self.storage.list_comments(&board_id).await {
            Ok(comments) => {
                editor.comments_mut().replace(comments, now);
                true
            }
            Err(e) => {
                log::warn!("failed to fetch comments for board {}: {}", board_id, e);
                editor.comments_mut().mark_polled(now);
                false
            }
        }
    }
}
