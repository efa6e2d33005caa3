use std::fmt::Display;
use std::sync::{Mutex, MutexGuard};

use serde::Serialize;
use tracelane_core::TimelineState;
use tracelane_core::model::EventId;
use tracelane_protocol::Point;
use wasm_bindgen::prelude::*;

static STATE: Mutex<Option<TimelineState>> = Mutex::new(None);

fn lock_state() -> MutexGuard<'static, Option<TimelineState>> {
    STATE.lock().unwrap_or_else(|e| e.into_inner())
}

/// Run `f` against the shared state, creating it on first use.
fn with_state<T>(f: impl FnOnce(&mut TimelineState) -> T) -> T {
    let mut guard = lock_state();
    f(guard.get_or_insert_with(TimelineState::default))
}

fn read_state<T>(f: impl FnOnce(&TimelineState) -> T) -> T {
    let mut guard = lock_state();
    f(guard.get_or_insert_with(TimelineState::default))
}

fn js_err(err: impl Display) -> JsError {
    JsError::new(&err.to_string())
}

/// What the page shows after a load.
#[derive(Debug, Serialize)]
struct TraceSummary<'a> {
    name: Option<&'a str>,
    events: usize,
    tracks: usize,
    start: Option<f64>,
    end: Option<f64>,
}

fn summary(state: &TimelineState) -> TraceSummary<'_> {
    let bounds = state.trace().bounds();
    TraceSummary {
        name: state.source_name(),
        events: state.trace().events().len(),
        tracks: state.trace().tracks().len(),
        start: bounds.map(|b| b.start),
        end: bounds.map(|b| b.end),
    }
}

/// Load a trace from bytes (JSON) and return a summary as JSON.
///
/// On error the previously loaded trace stays in place.
#[wasm_bindgen]
pub fn load_trace(data: &[u8], name: &str) -> Result<String, JsError> {
    with_state(|state| {
        state.load_trace(data, name).map_err(js_err)?;
        serde_json::to_string(&summary(state)).map_err(js_err)
    })
}

/// Set the canvas size in CSS pixels.
#[wasm_bindgen]
pub fn resize(width: f64, height: f64) {
    with_state(|state| state.resize(width, height));
}

#[wasm_bindgen]
pub fn fit() {
    with_state(TimelineState::fit);
}

#[wasm_bindgen]
pub fn pan(delta_px: f64) {
    with_state(|state| state.pan(delta_px));
}

#[wasm_bindgen]
pub fn zoom_at(pixel_x: f64, factor: f64) {
    with_state(|state| state.zoom_at(pixel_x, factor));
}

/// Forward a wheel event. `zoom` is true while ctrl/cmd is held.
#[wasm_bindgen]
pub fn wheel(x: f64, delta_y: f64, zoom: bool) {
    with_state(|state| {
        state.wheel(tracelane_core::WheelInput {
            x,
            delta_y,
            zoom_modifier: zoom,
        });
    });
}

#[wasm_bindgen]
pub fn scroll_by(delta_px: f64) {
    with_state(|state| state.scroll_by(delta_px));
}

/// Select the event under the pointer; returns its id, or `undefined` when
/// the click cleared the selection.
#[wasm_bindgen]
pub fn click(x: f64, y: f64) -> Option<u32> {
    with_state(|state| state.click(Point::new(x, y)))
        .and_then(|id| u32::try_from(id.index()).ok())
}

/// Select an event by id, or clear the selection with `undefined`.
#[wasm_bindgen]
pub fn select(id: Option<u32>) -> bool {
    with_state(|state| state.select(id.map(|id| EventId(id as usize))))
}

/// Render the current frame, returning render commands as JSON.
#[wasm_bindgen]
pub fn render() -> Result<String, JsError> {
    read_state(render_json).map_err(js_err)
}

/// Details of the selected event as JSON, or `null`.
#[wasm_bindgen]
pub fn selected_details() -> Result<String, JsError> {
    read_state(details_json).map_err(js_err)
}

fn render_json(state: &TimelineState) -> Result<String, serde_json::Error> {
    serde_json::to_string(&state.render())
}

fn details_json(state: &TimelineState) -> Result<String, serde_json::Error> {
    serde_json::to_string(&state.selected_details())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRACE: &[u8] = br#"{"traceEvents":[
        {"name":"A","ph":"X","ts":0,"dur":100,"pid":1,"tid":1,"args":{"k":"v"}},
        {"name":"B","ph":"X","ts":50,"dur":100,"pid":1,"tid":1}
    ]}"#;

    fn loaded() -> TimelineState {
        let mut state = TimelineState::default();
        state.resize(800.0, 300.0);
        state.load_trace(TRACE, "trace.json").unwrap();
        state
    }

    #[test]
    fn summary_reports_counts_and_bounds() {
        let state = loaded();
        let json = serde_json::to_value(summary(&state)).unwrap();
        assert_eq!(json["name"], "trace.json");
        assert_eq!(json["events"], 2);
        assert_eq!(json["tracks"], 1);
        assert_eq!(json["start"], 0.0);
        assert_eq!(json["end"], 150.0);
    }

    #[test]
    fn render_json_carries_event_ids() {
        let state = loaded();
        let commands: Vec<serde_json::Value> =
            serde_json::from_str(&render_json(&state).unwrap()).unwrap();
        let ids: Vec<_> = commands
            .iter()
            .filter_map(|c| c.get("DrawRect")?.get("event_id")?.as_u64())
            .collect();
        assert_eq!(ids, vec![0, 1]);
    }

    #[test]
    fn details_json_is_null_without_selection() {
        let mut state = loaded();
        assert_eq!(details_json(&state).unwrap(), "null");

        state.select(Some(EventId(0)));
        let details: serde_json::Value =
            serde_json::from_str(&details_json(&state).unwrap()).unwrap();
        assert_eq!(details["fields"][0]["label"], "Name");
        assert_eq!(details["fields"][0]["value"], "A");
        assert!(details["args"].as_str().unwrap().contains("\"k\""));
    }
}
