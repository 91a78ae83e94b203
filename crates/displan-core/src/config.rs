//! Editor configuration.
//!
//! Every field has a default matching the board's stock behavior, so a JSON
//! config only needs to name the values it overrides.

use crate::elements::ElementColor;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Minimum zoom factor.
pub const MIN_ZOOM: f64 = 0.1;
/// Maximum zoom factor.
pub const MAX_ZOOM: f64 = 5.0;
/// Zoom multiplier applied per wheel tick when scrolling up.
pub const ZOOM_IN_FACTOR: f64 = 1.1;
/// Zoom multiplier applied per wheel tick when scrolling down.
pub const ZOOM_OUT_FACTOR: f64 = 0.9;
/// Side length of rectangles and circles placed by a click.
pub const DEFAULT_SHAPE_SIZE: f64 = 100.0;
/// Width of a freshly placed text box.
pub const DEFAULT_TEXT_WIDTH: f64 = 200.0;
/// Height of a freshly placed text box.
pub const DEFAULT_TEXT_HEIGHT: f64 = 40.0;
/// Content of a freshly placed text box.
pub const TEXT_PLACEHOLDER: &str = "Double click to edit";
/// Stroke width applied to new elements.
pub const DEFAULT_STROKE_WIDTH: f64 = 2.0;
/// How often the open comments panel refreshes.
pub const COMMENT_POLL_INTERVAL_MS: u64 = 2000;
/// Size of a comment marker in screen pixels.
pub const COMMENT_MARKER_SIZE: f64 = 24.0;
/// Maximum number of snapshots kept in the undo history.
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid config value: {0}")]
    Invalid(String),
}

/// Tunables for a board editor session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub zoom_in_factor: f64,
    pub zoom_out_factor: f64,
    pub shape_size: f64,
    pub text_width: f64,
    pub text_height: f64,
    pub text_placeholder: String,
    pub stroke_width: f64,
    /// Color selected when a session starts.
    pub default_color: ElementColor,
    pub comment_poll_interval_ms: u64,
    pub comment_marker_size: f64,
    pub history_limit: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
            zoom_in_factor: ZOOM_IN_FACTOR,
            zoom_out_factor: ZOOM_OUT_FACTOR,
            shape_size: DEFAULT_SHAPE_SIZE,
            text_width: DEFAULT_TEXT_WIDTH,
            text_height: DEFAULT_TEXT_HEIGHT,
            text_placeholder: TEXT_PLACEHOLDER.to_string(),
            stroke_width: DEFAULT_STROKE_WIDTH,
            default_color: ElementColor::black(),
            comment_poll_interval_ms: COMMENT_POLL_INTERVAL_MS,
            comment_marker_size: COMMENT_MARKER_SIZE,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

impl EditorConfig {
    /// Parse a config from JSON, then validate it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Check that the values describe a usable editor.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.min_zoom > 0.0 && self.min_zoom <= self.max_zoom) {
            return Err(ConfigError::Invalid(format!(
                "zoom bounds [{}, {}]",
                self.min_zoom, self.max_zoom
            )));
        }
        if self.zoom_in_factor <= 1.0 || self.zoom_out_factor <= 0.0 || self.zoom_out_factor >= 1.0 {
            return Err(ConfigError::Invalid("zoom factors".to_string()));
        }
        if self.history_limit == 0 {
            return Err(ConfigError::Invalid("history limit must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Comment polling interval as a duration.
    pub fn comment_poll_interval(&self) -> Duration {
        Duration::from_millis(self.comment_poll_interval_ms)
    }
}
