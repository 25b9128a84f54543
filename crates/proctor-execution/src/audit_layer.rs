//! Tracing layer that tees audit events into a channel.
//!
//! Events emitted with `target: "proctor::audit"` are turned into
//! [`AuditRecord`]s and forwarded to an unbounded channel, from which the
//! host persists the proctoring trail. All other events pass through
//! untouched.

use serde_json::Value;
use std::collections::BTreeMap;
use tokio::sync::mpsc;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;

/// Target shared by every audit-relevant event.
pub const AUDIT_TARGET: &str = "proctor::audit";

/// One entry of the audit trail.
#[derive(Debug, Clone, serde::Serialize)]
pub struct AuditRecord {
    pub target: String,
    /// Log level (INFO, WARN, ...)
    pub level: String,
    pub message: String,
    /// Structured fields, `message` excluded
    pub fields: BTreeMap<String, Value>,
    /// RFC 3339
    pub timestamp: String,
}

pub struct AuditLayer {
    sender: mpsc::UnboundedSender<AuditRecord>,
}

impl AuditLayer {
    pub fn new(sender: mpsc::UnboundedSender<AuditRecord>) -> Self {
        Self { sender }
    }

    /// Creates a layer together with the receiving end of its channel.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<AuditRecord>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }
}

impl<S> Layer<S> for AuditLayer
where
    S: Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if metadata.target() != AUDIT_TARGET {
            return;
        }

        let mut collector = FieldCollector::default();
        event.record(&mut collector);
        let message = match collector.fields.remove("message") {
            Some(Value::String(text)) => text,
            Some(other) => other.to_string(),
            None => String::new(),
        };

        let record = AuditRecord {
            target: metadata.target().to_string(),
            level: metadata.level().to_string(),
            message,
            fields: collector.fields,
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        // Receiver gone means nobody is persisting the trail any more
        let _ = self.sender.send(record);
    }
}

#[derive(Default)]
struct FieldCollector {
    fields: BTreeMap<String, Value>,
}

impl FieldCollector {
    fn insert(&mut self, field: &Field, value: Value) {
        self.fields.insert(field.name().to_string(), value);
    }
}

impl Visit for FieldCollector {
    fn record_f64(&mut self, field: &Field, value: f64) {
        self.insert(field, Value::from(value));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field, Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field, Value::from(value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.insert(field, Value::from(value));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.insert(field, Value::from(format!("{:?}", value)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::layer::SubscriberExt;

    #[test]
    fn test_only_audit_events_are_forwarded() {
        let (layer, mut rx) = AuditLayer::channel();
        let subscriber = tracing_subscriber::registry().with(layer);

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("[Test] ordinary log line");
            tracing::warn!(
                target: AUDIT_TARGET,
                exam_id = "SEM-APR-2024",
                count = 2u64,
                "[SessionEngine] Violation recorded"
            );
        });

        let record = rx.try_recv().expect("audit record");
        assert_eq!(record.level, "WARN");
        assert_eq!(record.message, "[SessionEngine] Violation recorded");
        assert_eq!(record.fields["exam_id"], Value::from("SEM-APR-2024"));
        assert_eq!(record.fields["count"], Value::from(2u64));
        assert!(!record.fields.contains_key("message"));
        assert!(rx.try_recv().is_err());
    }
}
