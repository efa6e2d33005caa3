use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::TrackOrder;
use crate::views::TimelineLayout;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Tunables for layout and interaction. Every field is optional in the
/// JSON form; missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineConfig {
    pub layout: TimelineLayout,
    /// Scale multiplier applied per wheel notch while zooming.
    pub zoom_step: f64,
    pub track_order: TrackOrder,
    pub show_time_axis: bool,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            layout: TimelineLayout::default(),
            zoom_step: 1.1,
            track_order: TrackOrder::FirstSeen,
            show_time_axis: true,
        }
    }
}

impl TimelineConfig {
    pub fn from_json(data: &[u8]) -> Result<Self, ConfigError> {
        Ok(serde_json::from_slice(data)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let data = std::fs::read(path)?;
        Self::from_json(&data)
    }
}
