//! Routes, handlers and shared state.

use axum::{
    Json, Router,
    extract::{
        Path, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use dashmap::DashMap;
use displan_core::{BoardStore, CanvasState, Comment, CommentStore, NewComment, StorageError};
use futures_util::{SinkExt, StreamExt};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::broadcast;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, info, warn};
use uuid::Uuid;

const CHANNEL_CAPACITY: usize = 64;

/// Shared application state
pub struct AppState {
    boards: Arc<dyn BoardStore>,
    comments: Arc<dyn CommentStore>,
    /// Comment push channels, one per watched board
    channels: DashMap<String, broadcast::Sender<Comment>>,
}

impl AppState {
    pub fn new(boards: Arc<dyn BoardStore>, comments: Arc<dyn CommentStore>) -> Self {
        Self {
            boards,
            comments,
            channels: DashMap::new(),
        }
    }

    /// Subscribe to new comments on a board, creating its channel if needed.
    fn subscribe(&self, board_id: &str) -> broadcast::Receiver<Comment> {
        self.channels
            .entry(board_id.to_string())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe()
    }

    /// Drop a board's channel once nobody listens to it.
    fn release(&self, board_id: &str) {
        self.channels.remove_if(board_id, |_, tx| tx.receiver_count() == 0);
    }

    fn publish(&self, board_id: &str, comment: &Comment) {
        if let Some(tx) = self.channels.get(board_id) {
            let _ = tx.send(comment.clone());
        }
    }

    fn watched_boards(&self) -> usize {
        self.channels.len()
    }
}

/// Handler error, rendered as `{"error": "..."}`.
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Storage(StorageError),
}

impl From<StorageError> for ApiError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::NotFound(what) => ApiError::NotFound(what),
            other => ApiError::Storage(other),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            ApiError::NotFound(what) => (StatusCode::NOT_FOUND, format!("not found: {}", what)),
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::Storage(e) => {
                warn!("storage failure: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        };
        (status, Json(ErrorBody { error })).into_response()
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/boards/{id}/state", get(get_state).put(put_state))
        .route("/boards/{id}/comments", get(list_comments).post(create_comment))
        .route("/boards/{id}/comments/ws", get(comments_ws))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check
async fn health() -> &'static str {
    "ok"
}

async fn get_state(
    State(state): State<Arc<AppState>>,
    Path(board_id): Path<String>,
) -> Result<Json<CanvasState>, ApiError> {
    let canvas = state.boards.load_canvas_state(&board_id).await?;
    Ok(Json(canvas))
}

async fn put_state(
    State(state): State<Arc<AppState>>,
    Path(board_id): Path<String>,
    Json(canvas): Json<CanvasState>,
) -> Result<StatusCode, ApiError> {
    state.boards.save_canvas_state(&board_id, &canvas).await?;
    debug!("saved board {} ({} elements)", board_id, canvas.len());
    Ok(StatusCode::NO_CONTENT)
}

async fn list_comments(
    State(state): State<Arc<AppState>>,
    Path(board_id): Path<String>,
) -> Result<Json<Vec<Comment>>, ApiError> {
    let comments = state.comments.list_comments(&board_id).await?;
    Ok(Json(comments))
}

async fn create_comment(
    State(state): State<Arc<AppState>>,
    Path(board_id): Path<String>,
    Json(mut new): Json<NewComment>,
) -> Result<(StatusCode, Json<Comment>), ApiError> {
    new.text = new.text.trim().to_string();
    if new.text.is_empty() {
        return Err(ApiError::BadRequest("comment text is empty".to_string()));
    }
    let comment = state.comments.create_comment(&board_id, new).await?;
    info!("comment {} added to board {}", comment.id, board_id);
    state.publish(&board_id, &comment);
    Ok((StatusCode::CREATED, Json(comment)))
}

/// WebSocket upgrade handler
async fn comments_ws(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Path(board_id): Path<String>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state, board_id))
}

/// Stream new comments to one watcher until it disconnects.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>, board_id: String) {
    let watcher = Uuid::new_v4();
    info!("watcher {} subscribed to board {}", watcher, board_id);

    let (mut sender, mut receiver) = socket.split();
    let mut rx = state.subscribe(&board_id);
    debug!("{} boards watched", state.watched_boards());

    loop {
        tokio::select! {
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {} // Watchers only listen
                    Some(Err(e)) => {
                        warn!("WebSocket error for {}: {}", watcher, e);
                        break;
                    }
                }
            }
            comment = rx.recv() => {
                match comment {
                    Ok(comment) => {
                        let json = match serde_json::to_string(&comment) {
                            Ok(json) => json,
                            Err(e) => {
                                warn!("failed to encode comment {}: {}", comment.id, e);
                                continue;
                            }
                        };
                        if sender.send(Message::Text(json.into())).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!("watcher {} missed {} comments", watcher, skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    drop(rx);
    state.release(&board_id);
    info!("watcher {} left board {}", watcher, board_id);
}
