//! Storage abstraction for boards and comments.
//!
//! The board editor never talks to a backend directly; the host constructs a
//! store and hands it to the [`PersistenceBridge`](crate::bridge::PersistenceBridge)
//! (or to the reference server). Two backends ship with the crate: an
//! in-memory store and a JSON file store.

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use crate::comments::{Comment, NewComment};
use crate::document::CanvasState;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

impl StorageError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound(_))
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Boxed future for storage operations.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Persists the canvas state of each board.
pub trait BoardStore: Send + Sync {
    /// Load the last saved state of a board.
    /// Fails with [`StorageError::NotFound`] if the board was never saved.
    fn load_canvas_state(&self, board_id: &str) -> BoxFuture<'_, StorageResult<CanvasState>>;

    /// Replace the saved state of a board with a full snapshot.
    fn save_canvas_state(&self, board_id: &str, state: &CanvasState) -> BoxFuture<'_, StorageResult<()>>;
}

/// Persists comments, independently of canvas state.
pub trait CommentStore: Send + Sync {
    /// All comments of a board, oldest first.
    fn list_comments(&self, board_id: &str) -> BoxFuture<'_, StorageResult<Vec<Comment>>>;

    /// Create a comment and return it with its assigned id and timestamp.
    fn create_comment(&self, board_id: &str, comment: NewComment) -> BoxFuture<'_, StorageResult<Comment>>;
}

/// Make a board id safe to use as a file name or map key.
pub fn sanitize_id(id: &str) -> String {
    id.chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}
