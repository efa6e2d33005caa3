//! Application state: the loaded trace, its viewport, the selection and the
//! surface it is drawn on, with the mutators a frontend drives.
//!
//! Every frame is a pure function of this struct; see [`TimelineState::render`].

use log::{debug, info, warn};
use serde_json::Value;
use tracelane_protocol::{Point, RenderCommand, Surface};

use crate::config::TimelineConfig;
use crate::details::EventDetails;
use crate::hit_test::{HitResult, hit_test};
use crate::model::{EventId, Trace, TraceEvent};
use crate::parsers::{ParseError, decode_events, normalize_document, parse_chrome_trace};
use crate::selection::Selection;
use crate::viewport::Viewport;
use crate::views::{TimelineScene, render_timeline};

/// One wheel notch or trackpad scroll step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelInput {
    /// Pointer x on the surface.
    pub x: f64,
    pub delta_y: f64,
    /// Zoom modifier (ctrl/cmd) held: zoom around `x` instead of panning.
    pub zoom_modifier: bool,
}

#[derive(Debug, Clone)]
pub struct TimelineState {
    config: TimelineConfig,
    trace: Trace,
    source_name: Option<String>,
    viewport: Viewport,
    selection: Selection,
    surface: Surface,
    scroll_y: f64,
}

impl Default for TimelineState {
    fn default() -> Self {
        Self::new(TimelineConfig::default())
    }
}

impl TimelineState {
    pub fn new(config: TimelineConfig) -> Self {
        Self {
            config,
            trace: Trace::default(),
            source_name: None,
            viewport: Viewport::default(),
            selection: Selection::default(),
            surface: Surface::default(),
            scroll_y: 0.0,
        }
    }

    pub fn config(&self) -> &TimelineConfig {
        &self.config
    }

    pub fn trace(&self) -> &Trace {
        &self.trace
    }

    pub fn source_name(&self) -> Option<&str> {
        self.source_name.as_deref()
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn selection(&self) -> Option<EventId> {
        self.selection.get()
    }

    pub fn surface(&self) -> Surface {
        self.surface
    }

    pub fn scroll_y(&self) -> f64 {
        self.scroll_y
    }

    /// Parse `data` and swap it in as the current trace.
    ///
    /// On error nothing changes: the previous trace, viewport and selection
    /// stay as they were.
    pub fn load_trace(&mut self, data: &[u8], name: impl Into<String>) -> Result<(), ParseError> {
        let name = name.into();
        debug!("loading {name} ({} bytes)", data.len());
        let events = parse_chrome_trace(data)
            .inspect_err(|err| warn!("rejected {name}: {err}"))?;
        self.load_events(events, name);
        Ok(())
    }

    /// Like [`load_trace`](Self::load_trace) for a document that is already
    /// decoded.
    pub fn load_document(
        &mut self,
        document: Value,
        name: impl Into<String>,
    ) -> Result<(), ParseError> {
        let name = name.into();
        let events = normalize_document(document)
            .and_then(decode_events)
            .inspect_err(|err| warn!("rejected {name}: {err}"))?;
        self.load_events(events, name);
        Ok(())
    }

    /// Replace the current trace with `events`.
    ///
    /// Event ids are indices into the new sequence, so the selection is
    /// cleared. The viewport is refitted only when the global bounds differ
    /// from the previous trace's.
    pub fn load_events(&mut self, events: Vec<TraceEvent>, name: impl Into<String>) {
        let name = name.into();
        let trace = Trace::from_events(events, self.config.track_order);
        info!(
            "loaded {name}: {} events in {} tracks",
            trace.events().len(),
            trace.tracks().len()
        );

        let bounds_changed = trace.bounds() != self.trace.bounds();
        self.trace = trace;
        self.source_name = Some(name);
        self.selection.clear();
        self.scroll_y = 0.0;
        if bounds_changed {
            self.fit();
        }
    }

    /// Reseed the viewport so the whole trace fits the surface width.
    pub fn fit(&mut self) {
        self.viewport = Viewport::fit(self.trace.bounds(), self.surface.width);
        debug!(
            "fitted viewport: origin={} scale={}",
            self.viewport.origin(),
            self.viewport.scale()
        );
    }

    /// Set the surface size. The first resize to a non-zero width refits the
    /// viewport, since a trace loaded before it was fitted to no width.
    pub fn resize(&mut self, width: f64, height: f64) {
        let first_width = self.surface.width <= 0.0;
        self.surface = Surface::new(width.max(0.0), height.max(0.0));
        self.scroll_y = self.clamp_scroll(self.scroll_y);
        if first_width && self.surface.width > 0.0 {
            self.fit();
        }
    }

    pub fn pan(&mut self, delta_px: f64) {
        self.viewport = self.viewport.pan(delta_px);
    }

    pub fn zoom_at(&mut self, pixel_x: f64, factor: f64) {
        self.viewport = self.viewport.zoom_at(pixel_x, factor);
    }

    pub fn wheel(&mut self, input: WheelInput) {
        if input.zoom_modifier {
            let step = self.config.zoom_step;
            let factor = if input.delta_y < 0.0 {
                step
            } else if input.delta_y > 0.0 {
                step.recip()
            } else {
                return;
            };
            self.zoom_at(input.x, factor);
        } else {
            self.pan(input.delta_y);
        }
    }

    /// Scroll the track rows vertically, clamped to the content height.
    pub fn scroll_by(&mut self, delta_px: f64) {
        self.scroll_y = self.clamp_scroll(self.scroll_y + delta_px);
    }

    fn clamp_scroll(&self, scroll_y: f64) -> f64 {
        let content = self.config.layout.content_height(self.trace.tracks().len());
        let max = (content - self.surface.height).max(0.0);
        if scroll_y.is_finite() {
            scroll_y.clamp(0.0, max)
        } else {
            0.0
        }
    }

    /// Hit-test without changing the selection.
    pub fn hit(&self, point: Point) -> Option<HitResult> {
        hit_test(&self.scene(), &self.config.layout, point)
    }

    /// Select the event under `point`. A click that finds no event clears the
    /// selection.
    pub fn click(&mut self, point: Point) -> Option<EventId> {
        let hit = self.hit(point).and_then(|hit| hit.event);
        debug!("click at ({}, {}) -> {hit:?}", point.x, point.y);
        self.selection.set(hit);
        hit
    }

    /// Select `id` directly. Ids that do not name an event in the current
    /// trace are ignored and return `false`.
    pub fn select(&mut self, id: Option<EventId>) -> bool {
        if let Some(id) = id
            && self.trace.event(id).is_none()
        {
            return false;
        }
        self.selection.set(id);
        true
    }

    pub fn scene(&self) -> TimelineScene<'_> {
        TimelineScene {
            trace: &self.trace,
            viewport: self.viewport,
            surface: self.surface,
            scroll_y: self.scroll_y,
            selection: self.selection,
        }
    }

    pub fn render(&self) -> Vec<RenderCommand> {
        render_timeline(&self.scene(), &self.config)
    }

    pub fn selected_event(&self) -> Option<&TraceEvent> {
        self.trace.event(self.selection.get()?)
    }

    pub fn selected_details(&self) -> Option<EventDetails> {
        self.selected_event().map(EventDetails::from_event)
    }
}
