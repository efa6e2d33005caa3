use serde::{Deserialize, Serialize};

use super::event::{EventId, TraceEvent};
use super::track::{Track, TrackOrder, group_events};

/// Half-open time interval in microseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: f64,
    pub end: f64,
}

impl TimeRange {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// A loaded trace: the normalized event sequence plus its tracks.
///
/// Rebuilt wholesale on every load; there is no incremental update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trace {
    events: Vec<TraceEvent>,
    tracks: Vec<Track>,
}

impl Trace {
    pub fn from_events(events: Vec<TraceEvent>, order: TrackOrder) -> Self {
        let tracks = group_events(&events, order);
        Self { events, tracks }
    }

    pub fn events(&self) -> &[TraceEvent] {
        &self.events
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn event(&self, id: EventId) -> Option<&TraceEvent> {
        self.events.get(id.index())
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Union of all track bounds, or `None` for an empty trace.
    pub fn bounds(&self) -> Option<TimeRange> {
        self.tracks.iter().fold(None, |acc, track| {
            let range = TimeRange::new(track.min_time(), track.max_time());
            Some(match acc {
                None => range,
                Some(acc) => TimeRange::new(acc.start.min(range.start), acc.end.max(range.end)),
            })
        })
    }
}
