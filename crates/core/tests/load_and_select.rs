//! Integration test: load Chrome trace fixtures through `TimelineState` and
//! check grouping, bounds, fitting, selection and rendering end to end.

use std::collections::HashSet;

use tracelane_core::TimelineState;
use tracelane_core::model::{EventId, TrackKey};
use tracelane_core::svg::render_svg;
use tracelane_protocol::{Point, RenderCommand, ThemeToken};

const SAMPLE: &[u8] = include_bytes!("fixtures/chrome-trace-sample.json");
const UNTERMINATED: &[u8] = include_bytes!("fixtures/unterminated-array.json");
const SINGLE_INSTANT: &[u8] = include_bytes!("fixtures/single-instant.json");

fn load(data: &[u8], name: &str) -> TimelineState {
    let mut state = TimelineState::default();
    state.resize(1_200.0, 400.0);
    state
        .load_trace(data, name)
        .unwrap_or_else(|err| panic!("failed to load {name}: {err}"));
    state
}

#[test]
fn every_event_lands_in_exactly_one_matching_track() {
    let state = load(SAMPLE, "sample");
    let trace = state.trace();
    assert_eq!(trace.events().len(), 13);

    let mut seen = HashSet::new();
    for track in trace.tracks() {
        for id in track.events() {
            assert!(seen.insert(*id), "{id:?} appears twice");
            let event = trace.event(*id).unwrap();
            assert_eq!(event.track_key(), track.key);
        }
    }
    assert_eq!(seen.len(), trace.events().len());

    let keys: Vec<_> = trace.tracks().iter().map(|t| t.key).collect();
    assert_eq!(
        keys,
        vec![
            TrackKey::new(4120, 0),
            TrackKey::new(4120, 1),
            TrackKey::new(4120, 7),
            TrackKey::new(3001, 3),
        ]
    );
}

#[test]
fn track_bounds_are_tight() {
    let state = load(SAMPLE, "sample");
    let trace = state.trace();
    for track in trace.tracks() {
        let events: Vec<_> = track
            .events()
            .iter()
            .map(|id| trace.event(*id).unwrap())
            .collect();
        assert!(events.iter().all(|e| e.timestamp >= track.min_time()));
        assert!(events.iter().all(|e| e.bounds_end() <= track.max_time()));
        assert!(events.iter().any(|e| e.timestamp == track.min_time()));
        assert!(events.iter().any(|e| e.bounds_end() == track.max_time()));

        let sorted = events.windows(2).all(|w| w[0].timestamp <= w[1].timestamp);
        assert!(sorted, "track {:?} is not sorted", track.key);
    }

    let main = &trace.tracks()[1];
    assert_eq!((main.min_time(), main.max_time()), (0.0, 5_200.0));
    assert_eq!(main.label(), "PID: 4120 TID: 1 · Renderer / CrRendererMain");

    let bounds = trace.bounds().unwrap();
    assert_eq!((bounds.start, bounds.end), (0.0, 6_450.0));
}

#[test]
fn click_selects_topmost_event_and_render_highlights_it() {
    let mut state = load(SAMPLE, "sample");
    // Row 1 (CrRendererMain) spans y 70..110. At 1250µs, RunTask,
    // FunctionCall and ParseHTML all overlap; ParseHTML is drawn last.
    let x = state.viewport().to_pixel(1_250.0);
    let selected = state.click(Point::new(x, 90.0)).unwrap();
    assert_eq!(selected, EventId(12));

    let details = state.selected_details().unwrap();
    assert_eq!(details.get("Name"), Some("ParseHTML"));
    assert_eq!(details.get("Duration"), Some("90 µs"));

    let commands = state.render();
    let highlighted: Vec<_> = commands
        .iter()
        .filter_map(|cmd| match cmd {
            RenderCommand::DrawRect {
                color: ThemeToken::SelectionHighlight,
                event_id,
                ..
            } => *event_id,
            _ => None,
        })
        .collect();
    assert_eq!(highlighted, vec![12]);

    let topmost = commands.iter().rev().find_map(|cmd| match cmd {
        RenderCommand::DrawRect {
            rect,
            event_id: Some(id),
            ..
        } if rect.contains(Point::new(x, 90.0)) => Some(*id),
        _ => None,
    });
    assert_eq!(topmost, Some(12));
}

#[test]
fn unterminated_array_is_loaded() {
    let state = load(UNTERMINATED, "unterminated");
    assert_eq!(state.trace().events().len(), 3);
    assert_eq!(state.trace().tracks().len(), 2);
}

#[test]
fn single_zero_duration_event_fits_and_renders() {
    let state = load(SINGLE_INSTANT, "instant");
    let vp = state.viewport();
    assert!(vp.scale().is_finite() && vp.scale() > 0.0);

    let x = vp.to_pixel(500.0);
    assert!(x > 0.0 && x < state.surface().width);

    let bars: Vec<_> = state
        .render()
        .into_iter()
        .filter_map(|cmd| match cmd {
            RenderCommand::DrawRect {
                rect,
                event_id: Some(_),
                ..
            } => Some(rect),
            _ => None,
        })
        .collect();
    assert_eq!(bars.len(), 1);
    assert!(bars[0].w >= 1.0);
}

#[test]
fn failed_reload_keeps_previous_trace() {
    let mut state = load(SAMPLE, "sample");
    let before = state.trace().clone();
    assert!(state.load_trace(br#"{"foo": 1}"#, "bad").is_err());
    assert!(state.load_trace(b"{not json", "bad").is_err());
    assert_eq!(state.trace(), &before);
    assert_eq!(state.source_name(), Some("sample"));
}

#[test]
fn svg_export_contains_track_labels() {
    let state = load(SAMPLE, "sample");
    let svg = render_svg(&state.render(), state.surface(), true);
    assert!(svg.contains("CrRendererMain"));
    assert!(svg.contains("Compositor"));
    assert!(svg.ends_with("</svg>"));
}
