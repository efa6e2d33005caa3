use std::collections::HashSet;

use log::debug;
use serde::Deserialize;
use serde_json::Value;
use tracelane_protocol::SharedStr;

use super::ParseError;
use crate::model::{Args, Phase, TraceEvent};

/// Object-form container field holding the event array.
pub const TRACE_EVENTS_KEY: &str = "traceEvents";

/// Raw Chrome trace event as found in DevTools / `chrome://tracing` exports.
#[derive(Debug, Deserialize)]
struct RawEvent {
    #[serde(default)]
    name: String,
    #[serde(default)]
    cat: String,
    #[serde(default)]
    ph: String,
    #[serde(default)]
    ts: Option<f64>,
    #[serde(default)]
    dur: Option<f64>,
    #[serde(default)]
    pid: u64,
    #[serde(default)]
    tid: u64,
    #[serde(default)]
    args: Option<Args>,
    #[serde(default)]
    id: Option<RawId>,
}

/// Event ids appear both as strings (`"0x1f"`) and as bare numbers.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(serde_json::Number),
}

impl RawId {
    fn into_text(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::Number(n) => n.to_string(),
        }
    }
}

/// Deduplicates names and categories so repeated strings share one allocation.
#[derive(Default)]
struct Interner {
    strings: HashSet<SharedStr>,
}

impl Interner {
    fn intern(&mut self, s: &str) -> SharedStr {
        if let Some(existing) = self.strings.get(s) {
            return existing.clone();
        }
        let shared = SharedStr::from(s);
        self.strings.insert(shared.clone());
        shared
    }
}

impl RawEvent {
    fn into_event(self, interner: &mut Interner) -> Result<TraceEvent, String> {
        let phase = Phase::from_code(&self.ph);
        // Metadata events carry no timestamp in the format; they sit at 0.
        let ts = match self.ts {
            Some(ts) => ts,
            None if phase == Phase::Metadata => 0.0,
            None => return Err("missing field `ts`".to_string()),
        };
        if !ts.is_finite() || ts < 0.0 {
            return Err(format!("`ts` must be a finite, non-negative number (got {ts})"));
        }
        if let Some(dur) = self.dur
            && (!dur.is_finite() || dur < 0.0)
        {
            return Err(format!("`dur` must be a finite, non-negative number (got {dur})"));
        }

        Ok(TraceEvent {
            name: interner.intern(&self.name),
            category: interner.intern(&self.cat),
            phase,
            timestamp: ts,
            duration: self.dur,
            pid: self.pid,
            tid: self.tid,
            args: self.args,
            id: self.id.map(RawId::into_text),
        })
    }
}

/// Parse a Chrome trace document from raw bytes into the normalized event
/// sequence.
pub fn parse_chrome_trace(data: &[u8]) -> Result<Vec<TraceEvent>, ParseError> {
    let document = parse_document(data)?;
    let raw = normalize_document(document)?;
    decode_events(raw)
}

/// Extract the event array from a decoded document.
///
/// Accepts a bare array of events, or an object holding the array under
/// `traceEvents`. Anything else is [`ParseError::InvalidFormat`]. Individual
/// events are not inspected here.
pub fn normalize_document(document: Value) -> Result<Vec<Value>, ParseError> {
    match document {
        Value::Array(events) => Ok(events),
        Value::Object(mut root) => match root.remove(TRACE_EVENTS_KEY) {
            Some(Value::Array(events)) => Ok(events),
            _ => Err(ParseError::InvalidFormat),
        },
        _ => Err(ParseError::InvalidFormat),
    }
}

/// Decode and validate each raw event, in input order.
pub fn decode_events(raw: Vec<Value>) -> Result<Vec<TraceEvent>, ParseError> {
    let mut interner = Interner::default();
    raw.into_iter()
        .enumerate()
        .map(|(index, value)| {
            let event: RawEvent =
                serde_json::from_value(value).map_err(|err| ParseError::InvalidEvent {
                    index,
                    reason: err.to_string(),
                })?;
            event
                .into_event(&mut interner)
                .map_err(|reason| ParseError::InvalidEvent { index, reason })
        })
        .collect()
}

fn parse_document(data: &[u8]) -> Result<Value, ParseError> {
    match serde_json::from_slice::<Value>(data) {
        Ok(document) => Ok(document),
        Err(err) => {
            let Some(repaired) = close_unterminated_array(data) else {
                return Err(err.into());
            };
            debug!("retrying trace as an unterminated JSON array");
            serde_json::from_slice(&repaired).map_err(|_| err.into())
        }
    }
}

/// The array form of the trace format allows the closing `]` to be missing
/// (tracers that crash mid-write leave it off, often after a trailing comma).
fn close_unterminated_array(data: &[u8]) -> Option<Vec<u8>> {
    let text = std::str::from_utf8(data).ok()?.trim();
    if !text.starts_with('[') || text.ends_with(']') {
        return None;
    }
    let body = text.trim_end_matches(|c: char| c == ',' || c.is_whitespace());
    Some(format!("{body}]").into_bytes())
}
