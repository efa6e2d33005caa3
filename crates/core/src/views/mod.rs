pub mod time_axis;
pub mod timeline;

pub use timeline::{BarGeometry, TimelineLayout, TimelineScene, render_timeline};
