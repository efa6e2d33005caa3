use std::fmt;

use serde::{Deserialize, Serialize};
use tracelane_protocol::SharedStr;

use super::track::TrackKey;

/// Free-form event arguments, in document order.
pub type Args = serde_json::Map<String, serde_json::Value>;

/// Position of an event in the normalized event sequence.
///
/// Tracks and the selection refer to events through this index; the
/// sequence itself is the only owner of [`TraceEvent`] values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventId(pub usize);

impl EventId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

impl From<EventId> for u64 {
    fn from(id: EventId) -> u64 {
        id.0 as u64
    }
}

/// Chrome trace event phase (`ph`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Phase {
    Complete,
    Begin,
    End,
    Instant,
    Counter,
    AsyncBegin,
    AsyncInstant,
    AsyncEnd,
    FlowStart,
    FlowStep,
    FlowEnd,
    Sample,
    ObjectCreated,
    ObjectSnapshot,
    ObjectDestroyed,
    Metadata,
    Mark,
    /// Any code this crate does not know about, kept verbatim.
    Unknown(SharedStr),
}

impl Phase {
    pub fn from_code(code: &str) -> Self {
        match code {
            "X" => Self::Complete,
            "B" => Self::Begin,
            "E" => Self::End,
            // "I" is the deprecated spelling of the instant phase.
            "i" | "I" => Self::Instant,
            "C" => Self::Counter,
            "b" => Self::AsyncBegin,
            "n" => Self::AsyncInstant,
            "e" => Self::AsyncEnd,
            "s" => Self::FlowStart,
            "t" => Self::FlowStep,
            "f" => Self::FlowEnd,
            "P" => Self::Sample,
            "N" => Self::ObjectCreated,
            "O" => Self::ObjectSnapshot,
            "D" => Self::ObjectDestroyed,
            "M" => Self::Metadata,
            "R" => Self::Mark,
            other => Self::Unknown(SharedStr::from(other)),
        }
    }

    pub fn code(&self) -> &str {
        match self {
            Self::Complete => "X",
            Self::Begin => "B",
            Self::End => "E",
            Self::Instant => "i",
            Self::Counter => "C",
            Self::AsyncBegin => "b",
            Self::AsyncInstant => "n",
            Self::AsyncEnd => "e",
            Self::FlowStart => "s",
            Self::FlowStep => "t",
            Self::FlowEnd => "f",
            Self::Sample => "P",
            Self::ObjectCreated => "N",
            Self::ObjectSnapshot => "O",
            Self::ObjectDestroyed => "D",
            Self::Metadata => "M",
            Self::Mark => "R",
            Self::Unknown(code) => code.as_str(),
        }
    }

    /// Whether the event carries its own span (`ts` .. `ts + dur`).
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// One normalized trace event. Times are microseconds.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceEvent {
    pub name: SharedStr,
    pub category: SharedStr,
    pub phase: Phase,
    pub timestamp: f64,
    pub duration: Option<f64>,
    pub pid: u64,
    pub tid: u64,
    pub args: Option<Args>,
    pub id: Option<String>,
}

impl TraceEvent {
    pub fn new(
        name: impl Into<SharedStr>,
        phase: Phase,
        timestamp: f64,
        pid: u64,
        tid: u64,
    ) -> Self {
        Self {
            name: name.into(),
            category: SharedStr::default(),
            phase,
            timestamp,
            duration: None,
            pid,
            tid,
            args: None,
            id: None,
        }
    }

    /// A complete (`X`) event.
    pub fn complete(
        name: impl Into<SharedStr>,
        timestamp: f64,
        duration: f64,
        pid: u64,
        tid: u64,
    ) -> Self {
        Self {
            duration: Some(duration),
            ..Self::new(name, Phase::Complete, timestamp, pid, tid)
        }
    }

    pub fn track_key(&self) -> TrackKey {
        TrackKey::new(self.pid, self.tid)
    }

    /// Duration used for layout; a missing `dur` lays out as zero width.
    #[inline]
    pub fn layout_duration(&self) -> f64 {
        self.duration.unwrap_or(0.0)
    }

    /// End of the drawn bar and of the hit-testable interval.
    #[inline]
    pub fn layout_end(&self) -> f64 {
        self.timestamp + self.layout_duration()
    }

    /// End used for track bounds. Only complete events contribute a span;
    /// every other phase contributes its point timestamp.
    #[inline]
    pub fn bounds_end(&self) -> f64 {
        if self.phase.is_complete() {
            self.layout_end()
        } else {
            self.timestamp
        }
    }
}
