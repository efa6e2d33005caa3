use serde::Serialize;

use crate::model::TraceEvent;

/// Labelled fields of one event, ready for a details panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventDetails {
    pub fields: Vec<DetailField>,
    /// Pretty-printed `args`, present only when the event has any.
    pub args: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailField {
    pub label: &'static str,
    pub value: String,
}

impl EventDetails {
    pub fn from_event(event: &TraceEvent) -> Self {
        let mut fields = vec![
            field("Name", event.name.to_string()),
            field("Category", event.category.to_string()),
            field("Phase", event.phase.to_string()),
            field("Timestamp", format!("{} µs", event.timestamp)),
        ];
        if let Some(dur) = event.duration {
            fields.push(field("Duration", format!("{dur} µs")));
        }
        fields.push(field("PID / TID", format!("{} / {}", event.pid, event.tid)));
        if let Some(id) = &event.id {
            fields.push(field("Id", id.clone()));
        }

        let args = event
            .args
            .as_ref()
            .filter(|args| !args.is_empty())
            .and_then(|args| serde_json::to_string_pretty(args).ok());

        Self { fields, args }
    }

    pub fn get(&self, label: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.label == label)
            .map(|f| f.value.as_str())
    }
}

fn field(label: &'static str, value: String) -> DetailField {
    DetailField { label, value }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Phase;

    #[test]
    fn complete_event_fields() {
        let mut event = TraceEvent::complete("RunTask", 1_000.0, 250.5, 4, 9);
        event.category = "toplevel".into();
        let details = EventDetails::from_event(&event);
        assert_eq!(details.get("Name"), Some("RunTask"));
        assert_eq!(details.get("Category"), Some("toplevel"));
        assert_eq!(details.get("Phase"), Some("X"));
        assert_eq!(details.get("Timestamp"), Some("1000 µs"));
        assert_eq!(details.get("Duration"), Some("250.5 µs"));
        assert_eq!(details.get("PID / TID"), Some("4 / 9"));
        assert_eq!(details.get("Id"), None);
        assert_eq!(details.args, None);
    }

    #[test]
    fn instant_without_duration_omits_the_field() {
        let event = TraceEvent::new("mark", Phase::Instant, 5.0, 1, 1);
        let details = EventDetails::from_event(&event);
        assert_eq!(details.get("Duration"), None);
    }

    #[test]
    fn args_are_pretty_printed_in_order() {
        let mut event = TraceEvent::complete("a", 0.0, 1.0, 1, 1);
        event.args = serde_json::json!({"url": "https://example.com", "size": 3})
            .as_object()
            .cloned();
        event.id = Some("0x2a".into());
        let details = EventDetails::from_event(&event);
        assert_eq!(details.get("Id"), Some("0x2a"));
        let args = details.args.as_deref().unwrap();
        assert!(args.contains('\n'));
        assert!(args.find("url").unwrap() < args.find("size").unwrap());
    }

    #[test]
    fn empty_args_are_omitted() {
        let mut event = TraceEvent::complete("a", 0.0, 1.0, 1, 1);
        event.args = Some(Default::default());
        assert_eq!(EventDetails::from_event(&event).args, None);
    }
}
