//! DisPlan Core Library
//!
//! Platform-agnostic data structures and interaction logic for the DisPlan
//! design board: the canvas document, the board editor state machine, undo
//! history, comments, and the storage seams the host plugs a backend into.

pub mod board;
pub mod bridge;
pub mod comments;
pub mod config;
pub mod document;
pub mod elements;
pub mod history;
pub mod input;
pub mod session;
pub mod storage;
pub mod tools;
pub mod viewport;

pub use board::{BoardEditor, PendingWrite};
pub use bridge::{FlushReport, PersistenceBridge};
pub use comments::{Comment, CommentMarker, CommentOverlay, NewComment};
pub use config::{ConfigError, EditorConfig};
pub use document::CanvasState;
pub use elements::{CanvasElement, ColorParseError, ElementColor, ElementId, ElementKind, ElementPatch};
pub use history::HistoryStack;
pub use input::{Gesture, KeyEvent, Modifiers, MouseButton, PointerEvent};
pub use session::Session;
pub use storage::{BoardStore, CommentStore, FileStorage, MemoryStorage, StorageError, StorageResult};
pub use tools::{ToolKind, ToolManager};
pub use viewport::{Viewport, hit_test};
