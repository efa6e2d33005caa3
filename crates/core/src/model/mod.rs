pub mod event;
pub mod trace;
pub mod track;

pub use event::{Args, EventId, Phase, TraceEvent};
pub use trace::{TimeRange, Trace};
pub use track::{Track, TrackKey, TrackOrder, group_events};
