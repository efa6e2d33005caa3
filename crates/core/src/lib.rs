//! Chrome trace timeline core: normalize trace documents into per-thread
//! tracks, map time to pixels under pan and zoom, render frames as
//! [`RenderCommand`](tracelane_protocol::RenderCommand) lists and resolve
//! pointer positions back to events.

pub mod config;
pub mod details;
pub mod hit_test;
pub mod model;
pub mod parsers;
pub mod selection;
pub mod state;
pub mod svg;
pub mod viewport;
pub mod views;

pub use config::{ConfigError, TimelineConfig};
pub use details::{DetailField, EventDetails};
pub use hit_test::{HitResult, hit_test};
pub use parsers::ParseError;
pub use selection::Selection;
pub use state::{TimelineState, WheelInput};
pub use viewport::Viewport;
