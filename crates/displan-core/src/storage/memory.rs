//! In-memory storage implementation.

use super::{BoardStore, BoxFuture, CommentStore, StorageError, StorageResult};
use crate::comments::{Comment, NewComment};
use crate::document::CanvasState;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory storage for testing and ephemeral use.
#[derive(Default)]
pub struct MemoryStorage {
    boards: RwLock<HashMap<String, CanvasState>>,
    comments: RwLock<HashMap<String, Vec<Comment>>>,
}

fn lock_error(e: impl std::fmt::Display) -> StorageError {
    StorageError::Other(format!("Lock error: {}", e))
}

impl MemoryStorage {
    /// Create a new empty memory storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ids of every board with a saved state.
    pub fn board_ids(&self) -> StorageResult<Vec<String>> {
        let boards = self.boards.read().map_err(lock_error)?;
        Ok(boards.keys().cloned().collect())
    }

    fn load_sync(&self, board_id: &str) -> StorageResult<CanvasState> {
        let boards = self.boards.read().map_err(lock_error)?;
        boards
            .get(board_id)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(board_id.to_string()))
    }

    fn save_sync(&self, board_id: &str, state: &CanvasState) -> StorageResult<()> {
        let mut boards = self.boards.write().map_err(lock_error)?;
        boards.insert(board_id.to_string(), state.clone());
        Ok(())
    }

    fn list_sync(&self, board_id: &str) -> StorageResult<Vec<Comment>> {
        let comments = self.comments.read().map_err(lock_error)?;
        Ok(comments.get(board_id).cloned().unwrap_or_default())
    }

    fn create_sync(&self, board_id: &str, new: NewComment) -> StorageResult<Comment> {
        let comment = Comment::new(board_id, new);
        let mut comments = self.comments.write().map_err(lock_error)?;
        comments
            .entry(board_id.to_string())
            .or_default()
            .push(comment.clone());
        Ok(comment)
    }
}

impl BoardStore for MemoryStorage {
    fn load_canvas_state(&self, board_id: &str) -> BoxFuture<'_, StorageResult<CanvasState>> {
        let result = self.load_sync(board_id);
        Box::pin(async move { result })
    }

    fn save_canvas_state(&self, board_id: &str, state: &CanvasState) -> BoxFuture<'_, StorageResult<()>> {
        let result = self.save_sync(board_id, state);
        Box::pin(async move { result })
    }
}

impl CommentStore for MemoryStorage {
    fn list_comments(&self, board_id: &str) -> BoxFuture<'_, StorageResult<Vec<Comment>>> {
        let result = self.list_sync(board_id);
        Box::pin(async move { result })
    }

    fn create_comment(&self, board_id: &str, comment: NewComment) -> BoxFuture<'_, StorageResult<Comment>> {
        let result = self.create_sync(board_id, comment);
        Box::pin(async move { result })
    }
}
