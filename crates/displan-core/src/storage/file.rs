//! File-based storage implementation.

use super::{BoardStore, BoxFuture, CommentStore, StorageError, StorageResult, sanitize_id};
use crate::comments::{Comment, NewComment};
use crate::document::CanvasState;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// File-based storage.
///
/// Stores each board's canvas state as `boards/<id>.json` and its comments
/// as `comments/<id>.json` under a base directory.
pub struct FileStorage {
    /// Base directory for board storage.
    base_path: PathBuf,
    /// Serializes read-modify-write of comment files.
    comment_lock: Mutex<()>,
}

impl FileStorage {
    /// Create a new file storage with the given base directory.
    ///
    /// Creates the directory layout if it doesn't exist.
    pub fn new(base_path: PathBuf) -> StorageResult<Self> {
        for dir in [base_path.join("boards"), base_path.join("comments")] {
            if !dir.exists() {
                fs::create_dir_all(&dir).map_err(|e| {
                    StorageError::Io(format!("Failed to create storage directory {}: {}", dir.display(), e))
                })?;
            }
        }
        Ok(Self {
            base_path,
            comment_lock: Mutex::new(()),
        })
    }

    /// Create file storage in the default location.
    ///
    /// On Unix: `~/.local/share/displan/`
    /// On Windows: `%LOCALAPPDATA%\displan\`
    pub fn default_location() -> StorageResult<Self> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| StorageError::Io("Could not determine home directory".to_string()))?;

        Self::new(base.join("displan"))
    }

    /// Get the base path.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn board_path(&self, board_id: &str) -> PathBuf {
        self.base_path.join("boards").join(format!("{}.json", sanitize_id(board_id)))
    }

    fn comments_path(&self, board_id: &str) -> PathBuf {
        self.base_path.join("comments").join(format!("{}.json", sanitize_id(board_id)))
    }

    fn load_sync(&self, board_id: &str) -> StorageResult<CanvasState> {
        let path = self.board_path(board_id);
        if !path.exists() {
            return Err(StorageError::NotFound(board_id.to_string()));
        }

        let json = fs::read_to_string(&path)
            .map_err(|e| StorageError::Io(format!("Failed to read {}: {}", path.display(), e)))?;

        CanvasState::from_json(&json)
            .map_err(|e| StorageError::Serialization(format!("Failed to parse {}: {}", path.display(), e)))
    }

    fn save_sync(&self, board_id: &str, state: &CanvasState) -> StorageResult<()> {
        let path = self.board_path(board_id);
        let json = state
            .to_json()
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        fs::write(&path, json).map_err(|e| StorageError::Io(format!("Failed to write {}: {}", path.display(), e)))
    }

    fn read_comments(path: &Path) -> StorageResult<Vec<Comment>> {
        if !path.exists() {
            return Ok(Vec::new());
        }
        let json = fs::read_to_string(path)
            .map_err(|e| StorageError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
        serde_json::from_str(&json)
            .map_err(|e| StorageError::Serialization(format!("Failed to parse {}: {}", path.display(), e)))
    }

    fn list_sync(&self, board_id: &str) -> StorageResult<Vec<Comment>> {
        Self::read_comments(&self.comments_path(board_id))
    }

    fn create_sync(&self, board_id: &str, new: NewComment) -> StorageResult<Comment> {
        let _guard = self
            .comment_lock
            .lock()
            .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;

        let path = self.comments_path(board_id);
        let mut comments = Self::read_comments(&path)?;
        let comment = Comment::new(board_id, new);
        comments.push(comment.clone());

        let json = serde_json::to_string_pretty(&comments).map_err(|e| StorageError::Serialization(e.to_string()))?;
        fs::write(&path, json).map_err(|e| StorageError::Io(format!("Failed to write {}: {}", path.display(), e)))?;
        Ok(comment)
    }
}

impl BoardStore for FileStorage {
    fn load_canvas_state(&self, board_id: &str) -> BoxFuture<'_, StorageResult<CanvasState>> {
        let result = self.load_sync(board_id);
        Box::pin(async move { result })
    }

    fn save_canvas_state(&self, board_id: &str, state: &CanvasState) -> BoxFuture<'_, StorageResult<()>> {
        let result = self.save_sync(board_id, state);
        Box::pin(async move { result })
    }
}

impl CommentStore for FileStorage {
    fn list_comments(&self, board_id: &str) -> BoxFuture<'_, StorageResult<Vec<Comment>>> {
        let result = self.list_sync(board_id);
        Box::pin(async move { result })
    }

    fn create_comment(&self, board_id: &str, comment: NewComment) -> BoxFuture<'_, StorageResult<Comment>> {
        let result = self.create_sync(board_id, comment);
        Box::pin(async move { result })
    }
}
