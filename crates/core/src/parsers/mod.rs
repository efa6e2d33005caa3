pub mod chrome;

use thiserror::Error;

pub use chrome::{decode_events, normalize_document, parse_chrome_trace};

/// Why a trace document could not be loaded.
///
/// Every variant is terminal for that load attempt only; callers keep their
/// previous state and may retry with another document.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid trace format: expected an array of events or an object with a `traceEvents` array")]
    InvalidFormat,
    #[error("invalid trace event at index {index}: {reason}")]
    InvalidEvent { index: usize, reason: String },
}

impl ParseError {
    /// Whether the document shape itself (rather than an individual event)
    /// was rejected.
    pub fn is_invalid_format(&self) -> bool {
        matches!(self, Self::Json(_) | Self::InvalidFormat)
    }
}
