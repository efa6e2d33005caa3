use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracelane_protocol::SharedStr;

use super::event::{EventId, Phase, TraceEvent};

/// Identity of a track: one (process id, thread id) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TrackKey {
    pub pid: u64,
    pub tid: u64,
}

impl TrackKey {
    pub fn new(pid: u64, tid: u64) -> Self {
        Self { pid, tid }
    }
}

/// Row order of the grouped tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrackOrder {
    /// Order in which each (pid, tid) is first seen in the input.
    #[default]
    FirstSeen,
    /// Ascending by (pid, tid).
    ByKey,
}

/// The events of one (pid, tid) pair, sorted by timestamp.
///
/// A track is only ever created from its first event, so it is never empty
/// and `min_time <= max_time` always holds.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub key: TrackKey,
    pub thread_name: Option<SharedStr>,
    pub process_name: Option<SharedStr>,
    events: Vec<EventId>,
    min_time: f64,
    max_time: f64,
}

impl Track {
    fn new(id: EventId, event: &TraceEvent) -> Self {
        Self {
            key: event.track_key(),
            thread_name: None,
            process_name: None,
            events: vec![id],
            min_time: event.timestamp,
            max_time: event.bounds_end(),
        }
    }

    fn push(&mut self, id: EventId, event: &TraceEvent) {
        self.events.push(id);
        self.min_time = self.min_time.min(event.timestamp);
        self.max_time = self.max_time.max(event.bounds_end());
    }

    /// Events in timestamp order (ties keep input order).
    pub fn events(&self) -> &[EventId] {
        &self.events
    }

    /// Paint order of this track's events, paired with each event's slot
    /// (its position within the track, which picks the palette color).
    ///
    /// The renderer walks this forward and the hit tester walks it in
    /// reverse, so the event found by a click is always the one painted last
    /// at that spot.
    pub fn draw_order(
        &self,
    ) -> impl DoubleEndedIterator<Item = (usize, EventId)> + ExactSizeIterator + '_ {
        self.events.iter().copied().enumerate()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn min_time(&self) -> f64 {
        self.min_time
    }

    pub fn max_time(&self) -> f64 {
        self.max_time
    }

    /// Identity label drawn at the left edge of the row.
    pub fn label(&self) -> String {
        let mut label = format!("PID: {} TID: {}", self.key.pid, self.key.tid);
        match (&self.process_name, &self.thread_name) {
            (Some(process), Some(thread)) => label.push_str(&format!(" · {process} / {thread}")),
            (Some(name), None) | (None, Some(name)) => label.push_str(&format!(" · {name}")),
            (None, None) => {}
        }
        label
    }
}

/// Partition `events` into one track per (pid, tid).
///
/// Each track's events are stably sorted by timestamp after grouping, and
/// `thread_name` / `process_name` metadata events name the tracks they
/// belong to. Metadata events stay in their track like any other event.
pub fn group_events(events: &[TraceEvent], order: TrackOrder) -> Vec<Track> {
    let mut tracks: Vec<Track> = Vec::new();
    let mut index_by_key: HashMap<TrackKey, usize> = HashMap::new();
    let mut thread_names: HashMap<TrackKey, SharedStr> = HashMap::new();
    let mut process_names: HashMap<u64, SharedStr> = HashMap::new();

    for (index, event) in events.iter().enumerate() {
        let id = EventId(index);
        let key = event.track_key();
        match index_by_key.get(&key) {
            Some(&slot) => tracks[slot].push(id, event),
            None => {
                index_by_key.insert(key, tracks.len());
                tracks.push(Track::new(id, event));
            }
        }

        if event.phase == Phase::Metadata
            && let Some(name) = metadata_name(event)
        {
            match event.name.as_str() {
                "thread_name" => {
                    thread_names.insert(key, name);
                }
                "process_name" => {
                    process_names.insert(event.pid, name);
                }
                _ => {}
            }
        }
    }

    for track in &mut tracks {
        // `sort_by` is stable: equal timestamps keep input order, which fixes
        // the paint order of overlapping events.
        track.events.sort_by(|a, b| {
            events[a.index()]
                .timestamp
                .total_cmp(&events[b.index()].timestamp)
        });
        track.thread_name = thread_names.get(&track.key).cloned();
        track.process_name = process_names.get(&track.key.pid).cloned();
    }

    if order == TrackOrder::ByKey {
        tracks.sort_by_key(|t| t.key);
    }

    tracks
}

fn metadata_name(event: &TraceEvent) -> Option<SharedStr> {
    event
        .args
        .as_ref()?
        .get("name")?
        .as_str()
        .map(SharedStr::from)
}
