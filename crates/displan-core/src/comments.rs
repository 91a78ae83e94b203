//! Comment pins and the overlay that shows them over the canvas.
//!
//! Comments are stored apart from the canvas state: they are never part of a
//! snapshot, are never undone, and are fetched on their own schedule. The
//! overlay keeps the last fetched list and decides when the next poll is due.

use crate::viewport::Viewport;
use chrono::{DateTime, Utc};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use uuid::Uuid;

/// A point annotation pinned to a board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Uuid,
    pub board_id: String,
    pub author_email: String,
    pub text: String,
    /// Canvas-space pin position.
    pub x: f64,
    pub y: f64,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    /// Build a comment with a fresh id and the current time.
    pub fn new(board_id: impl Into<String>, new: NewComment) -> Self {
        Self {
            id: Uuid::new_v4(),
            board_id: board_id.into(),
            author_email: new.author_email,
            text: new.text,
            x: new.x,
            y: new.y,
            created_at: Utc::now(),
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// A comment waiting to be created by the comment store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComment {
    pub x: f64,
    pub y: f64,
    pub text: String,
    pub author_email: String,
}

/// Where a comment marker lands on screen for the current viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CommentMarker {
    pub comment_id: Uuid,
    /// Screen position of the pin.
    pub center: Point,
    /// Screen-space box of the marker, `size` x `size` around `center`.
    pub bounds: Rect,
}

/// The fetched comments for a board plus the polling schedule.
#[derive(Debug, Clone)]
pub struct CommentOverlay {
    comments: Vec<Comment>,
    mounted: bool,
    panel_open: bool,
    poll_interval: Duration,
    last_poll: Option<Instant>,
    marker_size: f64,
}

impl CommentOverlay {
    pub fn new(poll_interval: Duration, marker_size: f64) -> Self {
        Self {
            comments: Vec::new(),
            mounted: false,
            panel_open: false,
            poll_interval,
            last_poll: None,
            marker_size,
        }
    }

    /// Start tracking a board. The first poll is due immediately.
    pub fn mount(&mut self) {
        self.mounted = true;
        self.last_poll = None;
    }

    /// Stop polling. Fetched comments stay readable.
    pub fn unmount(&mut self) {
        self.mounted = false;
        self.panel_open = false;
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn open_panel(&mut self) {
        self.panel_open = true;
    }

    pub fn close_panel(&mut self) {
        self.panel_open = false;
    }

    pub fn is_panel_open(&self) -> bool {
        self.panel_open
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Whether the host should fetch the comment list now.
    ///
    /// Once on mount, then every poll interval while the panel is open.
    pub fn needs_refresh(&self, now: Instant) -> bool {
        if !self.mounted {
            return false;
        }
        match self.last_poll {
            None => true,
            Some(last) => self.panel_open && now.saturating_duration_since(last) >= self.poll_interval,
        }
    }

    /// Record a poll attempt, successful or not.
    pub fn mark_polled(&mut self, now: Instant) {
        self.last_poll = Some(now);
    }

    /// Replace the list with a freshly fetched one.
    pub fn replace(&mut self, comments: Vec<Comment>, now: Instant) {
        self.comments = comments;
        self.mark_polled(now);
    }

    /// Add a comment the store just created, unless it is already listed.
    pub fn insert(&mut self, comment: Comment) {
        if !self.comments.iter().any(|c| c.id == comment.id) {
            self.comments.push(comment);
        }
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    pub fn len(&self) -> usize {
        self.comments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.comments.is_empty()
    }

    /// Marker placement for every comment under the given viewport.
    pub fn markers(&self, viewport: &Viewport, origin: Vec2) -> Vec<CommentMarker> {
        self.comments
            .iter()
            .map(|comment| {
                let center = viewport.canvas_to_screen(comment.position(), origin);
                CommentMarker {
                    comment_id: comment.id,
                    center,
                    bounds: Rect::from_center_size(center, (self.marker_size, self.marker_size)),
                }
            })
            .collect()
    }

    /// The comment whose marker covers a screen point, newest first.
    pub fn comment_at(&self, screen: Point, viewport: &Viewport, origin: Vec2) -> Option<&Comment> {
        let hit = self
            .markers(viewport, origin)
            .into_iter()
            .rev()
            .find(|marker| marker.bounds.contains(screen))?;
        self.comments.iter().find(|c| c.id == hit.comment_id)
    }
}
