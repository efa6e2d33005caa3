use serde::{Deserialize, Serialize};
use tracelane_protocol::{Point, Rect, RenderCommand, SharedStr, Surface, TextAlign, ThemeToken};

use crate::config::TimelineConfig;
use crate::model::{TimeRange, Trace, TraceEvent, Track};
use crate::selection::Selection;
use crate::viewport::Viewport;
use crate::views::time_axis::render_time_axis;

/// Bars never get narrower than this, so zero-length events stay visible.
pub const MIN_BAR_WIDTH: f64 = 1.0;

/// Fixed row geometry shared by rendering and hit-testing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineLayout {
    /// Height of one track row.
    pub row_height: f64,
    /// Gap between a bar and its row's top and bottom edges.
    pub row_padding: f64,
    /// Band above the first row, reserved for the time axis.
    pub header_height: f64,
    /// Bars at most this wide get no name label.
    pub label_min_width: f64,
    /// Width of the track identity label at the left of each row.
    pub track_label_width: f64,
    pub font_size: f64,
    /// Horizontal inset of a bar's name from the bar's left edge.
    pub label_inset: f64,
}

impl Default for TimelineLayout {
    fn default() -> Self {
        Self {
            row_height: 40.0,
            row_padding: 4.0,
            header_height: 30.0,
            label_min_width: 20.0,
            track_label_width: 150.0,
            font_size: 12.0,
            label_inset: 2.0,
        }
    }
}

impl TimelineLayout {
    /// Top edge of row `index` on the surface.
    pub fn row_top(&self, index: usize, scroll_y: f64) -> f64 {
        self.header_height + index as f64 * self.row_height - scroll_y
    }

    pub fn bar_height(&self) -> f64 {
        (self.row_height - 2.0 * self.row_padding).max(1.0)
    }

    /// Row index under surface coordinate `y`, before checking it against the
    /// number of tracks. `None` above the first row or over the header.
    pub fn row_at(&self, y: f64, scroll_y: f64) -> Option<usize> {
        if y < self.header_height || self.row_height <= 0.0 {
            return None;
        }
        let row = ((y - self.header_height + scroll_y) / self.row_height).floor();
        (row >= 0.0).then_some(row as usize)
    }

    /// Height of the header plus every row.
    pub fn content_height(&self, track_count: usize) -> f64 {
        self.header_height + track_count as f64 * self.row_height
    }
}

/// Horizontal extent of one event's bar, in surface pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarGeometry {
    pub x: f64,
    pub width: f64,
}

impl BarGeometry {
    pub fn for_event(event: &TraceEvent, viewport: &Viewport) -> Self {
        Self {
            x: viewport.to_pixel(event.timestamp),
            width: (event.layout_duration() * viewport.scale()).max(MIN_BAR_WIDTH),
        }
    }

    /// Closed on both edges.
    pub fn contains_x(&self, x: f64) -> bool {
        x >= self.x && x <= self.x + self.width
    }
}

/// Everything a frame is a pure function of.
///
/// Rendering and hit-testing both read one scene, so they agree on which
/// events are visible, where each bar sits and which bar is on top.
#[derive(Debug, Clone, Copy)]
pub struct TimelineScene<'a> {
    pub trace: &'a Trace,
    pub viewport: Viewport,
    pub surface: Surface,
    pub scroll_y: f64,
    pub selection: Selection,
}

impl TimelineScene<'_> {
    pub fn visible_time(&self) -> TimeRange {
        self.viewport.visible_range(self.surface.width)
    }

    /// Bar geometry for `event`, or `None` when it lies entirely outside the
    /// visible time range and is culled.
    pub fn bar(&self, event: &TraceEvent) -> Option<BarGeometry> {
        let visible = self.visible_time();
        if event.layout_end() < visible.start || event.timestamp > visible.end {
            return None;
        }
        Some(BarGeometry::for_event(event, &self.viewport))
    }

    /// Whether row `index` overlaps the part of the surface below the header.
    pub fn row_visible(&self, layout: &TimelineLayout, index: usize) -> bool {
        let top = layout.row_top(index, self.scroll_y);
        top + layout.row_height > layout.header_height && top < self.surface.height
    }
}

/// Render a full timeline frame.
///
/// Per visible track row: an alternating background, the event bars in the
/// track's draw order (each later bar painting over earlier ones), a name
/// label clipped to every bar wider than `label_min_width`, and finally the
/// track identity label on a semi-opaque backing. The header band is drawn
/// last so rows scrolled beneath it stay hidden.
pub fn render_timeline(scene: &TimelineScene<'_>, config: &TimelineConfig) -> Vec<RenderCommand> {
    let layout = &config.layout;
    let surface = scene.surface;
    let tracks = scene.trace.tracks();

    let mut commands = Vec::with_capacity(scene.trace.events().len() / 2 + tracks.len() * 6 + 16);
    commands.push(RenderCommand::DrawRect {
        rect: surface.bounds(),
        color: ThemeToken::Background,
        event_id: None,
    });

    if tracks.is_empty() {
        commands.push(RenderCommand::DrawText {
            position: Point::new(surface.width / 2.0, surface.height / 2.0),
            text: SharedStr::from("No trace loaded"),
            color: ThemeToken::AxisText,
            font_size: layout.font_size,
            align: TextAlign::Center,
        });
        return commands;
    }

    for (index, track) in tracks.iter().enumerate() {
        if !scene.row_visible(layout, index) {
            continue;
        }
        render_track(&mut commands, scene, layout, index, track);
    }

    commands.push(RenderCommand::BeginGroup {
        id: SharedStr::from("header"),
        label: None,
    });
    commands.push(RenderCommand::DrawRect {
        rect: Rect::new(0.0, 0.0, surface.width, layout.header_height),
        color: ThemeToken::AxisBackground,
        event_id: None,
    });
    if config.show_time_axis {
        commands.extend(render_time_axis(
            &scene.viewport,
            surface.width,
            layout.header_height,
        ));
    }
    commands.push(RenderCommand::EndGroup);

    commands
}

fn render_track(
    commands: &mut Vec<RenderCommand>,
    scene: &TimelineScene<'_>,
    layout: &TimelineLayout,
    index: usize,
    track: &Track,
) {
    let top = layout.row_top(index, scene.scroll_y);
    let bar_y = top + layout.row_padding;
    let bar_height = layout.bar_height();
    let label = track.label();

    commands.push(RenderCommand::BeginGroup {
        id: SharedStr::from(format!("track-{}-{}", track.key.pid, track.key.tid)),
        label: Some(SharedStr::from(label.as_str())),
    });

    if index % 2 == 0 {
        commands.push(RenderCommand::DrawRect {
            rect: Rect::new(0.0, top, scene.surface.width, layout.row_height),
            color: ThemeToken::RowBackground,
            event_id: None,
        });
    }

    for (slot, id) in track.draw_order() {
        let Some(event) = scene.trace.event(id) else {
            continue;
        };
        let Some(bar) = scene.bar(event) else {
            continue;
        };

        let rect = Rect::new(bar.x, bar_y, bar.width, bar_height);
        let color = if scene.selection.is_selected(id) {
            ThemeToken::SelectionHighlight
        } else {
            ThemeToken::palette(slot)
        };
        commands.push(RenderCommand::DrawRect {
            rect,
            color,
            event_id: Some(id.into()),
        });

        if bar.width > layout.label_min_width {
            commands.push(RenderCommand::SetClip { rect });
            commands.push(RenderCommand::DrawText {
                position: Point::new(bar.x + layout.label_inset, bar_y + bar_height / 1.5),
                text: event.name.clone(),
                color: ThemeToken::EventLabelText,
                font_size: layout.font_size,
                align: TextAlign::Left,
            });
            commands.push(RenderCommand::ClearClip);
        }
    }

    commands.push(RenderCommand::DrawRect {
        rect: Rect::new(0.0, top, layout.track_label_width, layout.row_height),
        color: ThemeToken::TrackLabelBackground,
        event_id: None,
    });
    commands.push(RenderCommand::DrawText {
        position: Point::new(5.0, top + layout.row_height / 1.5),
        text: SharedStr::from(label),
        color: ThemeToken::TrackLabelText,
        font_size: layout.font_size,
        align: TextAlign::Left,
    });

    commands.push(RenderCommand::EndGroup);
}
