//! JSONL layer: one JSON object per event.
//!
//! Every line carries `timestamp` (RFC 3339, microseconds), `level`,
//! `service`, `pid`, `target` and `message`. Event fields go under `fields`
//! and the names of the enclosing spans, outermost first, under `spans`.

use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::Context;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;

/// A single structured log line.
#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    pub timestamp: String,
    pub level: &'static str,
    pub service: String,
    pub pid: u32,
    /// Module path of the call site.
    pub target: String,
    pub message: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub spans: Vec<String>,
}

impl LogEntry {
    /// Serialize as one newline-terminated line.
    fn to_line(&self) -> serde_json::Result<Vec<u8>> {
        let mut line = serde_json::to_vec(self)?;
        line.push(b'\n');
        Ok(line)
    }
}

/// Collects an event's fields; `message` is kept apart.
#[derive(Default)]
struct FieldVisitor {
    message: String,
    fields: BTreeMap<String, Value>,
}

impl FieldVisitor {
    fn put(&mut self, field: &Field, value: Value) {
        match (field.name(), value) {
            ("message", Value::String(message)) => self.message = message,
            (name, value) => {
                self.fields.insert(name.to_string(), value);
            }
        }
    }
}

impl Visit for FieldVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.put(field, Value::String(format!("{value:?}")));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.put(field, Value::String(value.to_string()));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.put(field, value.into());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.put(field, value.into());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.put(field, value.into());
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        // NaN and infinities have no JSON number form.
        let value = serde_json::Number::from_f64(value)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(value.to_string()));
        self.put(field, value);
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.put(field, Value::String(value.to_string()));
    }
}

/// Layer writing each event as a JSON line to `make_writer`.
pub struct JsonLayer<W> {
    service_name: String,
    pid: u32,
    make_writer: W,
}

impl<W> JsonLayer<W> {
    pub fn new(service_name: String, make_writer: W) -> Self {
        Self {
            service_name,
            pid: std::process::id(),
            make_writer,
        }
    }
}

impl<S, W> Layer<S> for JsonLayer<W>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'writer> MakeWriter<'writer> + 'static,
{
    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        let spans = ctx
            .event_scope(event)
            .map(|scope| scope.from_root().map(|span| span.name().to_string()).collect())
            .unwrap_or_default();

        let metadata = event.metadata();
        let entry = LogEntry {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
            level: metadata.level().as_str(),
            service: self.service_name.clone(),
            pid: self.pid,
            target: metadata.target().to_string(),
            message: visitor.message,
            fields: visitor.fields,
            spans,
        };

        // One write per line so concurrent writers never interleave.
        if let Ok(line) = entry.to_line() {
            let _ = self.make_writer.make_writer().write_all(&line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use tracing_subscriber::layer::SubscriberExt;

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl Capture {
        fn lines(&self) -> Vec<Value> {
            String::from_utf8(self.0.lock().clone())
                .unwrap()
                .lines()
                .map(|line| serde_json::from_str(line).unwrap())
                .collect()
        }
    }

    impl Write for Capture {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Capture {
        type Writer = Capture;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn capture(f: impl FnOnce()) -> Vec<Value> {
        let capture = Capture::default();
        let subscriber = tracing_subscriber::registry()
            .with(JsonLayer::new("race-agent".to_string(), capture.clone()));
        tracing::subscriber::with_default(subscriber, f);
        capture.lines()
    }

    #[test]
    fn empty_collections_are_omitted() {
        let entry = LogEntry {
            timestamp: "2026-01-15T10:30:00.000000Z".to_string(),
            level: "INFO",
            service: "race-agent".to_string(),
            pid: 12345,
            target: "auth_session::listener".to_string(),
            message: "Interaction finished".to_string(),
            fields: BTreeMap::new(),
            spans: Vec::new(),
        };

        let line = entry.to_line().unwrap();
        assert_eq!(line.last(), Some(&b'\n'));
        let json = String::from_utf8(line).unwrap();
        assert!(json.contains("\"pid\":12345"));
        assert!(!json.contains("\"fields\""));
        assert!(!json.contains("\"spans\""));
    }

    #[test]
    fn event_fields_and_message() {
        let lines = capture(|| {
            tracing::warn!(uid = 1000u64, cached = false, "No passwd entry for uid");
        });

        assert_eq!(lines.len(), 1);
        let line = &lines[0];
        assert_eq!(line["level"], "WARN");
        assert_eq!(line["service"], "race-agent");
        assert_eq!(line["message"], "No passwd entry for uid");
        assert_eq!(line["fields"]["uid"], 1000);
        assert_eq!(line["fields"]["cached"], false);
        assert!(line["fields"].get("message").is_none());
    }

    #[test]
    fn span_scope_is_recorded_outermost_first() {
        let lines = capture(|| {
            let outer = tracing::info_span!("request");
            let _outer = outer.enter();
            let inner = tracing::info_span!("choose");
            let _inner = inner.enter();
            tracing::info!("prompting");
        });

        assert_eq!(lines[0]["spans"], serde_json::json!(["request", "choose"]));
    }

    #[test]
    fn debug_formatted_fields_are_strings() {
        let lines = capture(|| {
            tracing::debug!(state = ?Some(3), "transition");
        });

        assert_eq!(lines[0]["fields"]["state"], "Some(3)");
    }
}
