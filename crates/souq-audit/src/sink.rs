//! Audit sink backends.
//!
//! This module provides the [`AuditSink`] trait and default
//! implementations. Implement the trait to forward events to a database,
//! queue, or external service.

use parking_lot::Mutex;

use crate::events::AuditEvent;

/// Trait for audit event destinations.
///
/// `record` must not panic and must not block the caller for long;
/// delivery failures are the sink's own concern.
pub trait AuditSink: Send + Sync {
    /// Records one audit event.
    fn record(&self, event: &AuditEvent);
}

/// Audit sink that writes events through the `tracing` infrastructure
/// as structured JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditSink;

impl TracingAuditSink {
    /// Creates a new tracing-backed sink.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl AuditSink for TracingAuditSink {
    fn record(&self, event: &AuditEvent) {
        let json = event.to_json().unwrap_or_else(|_| "{}".to_string());
        tracing::info!(
            target: "souq_audit",
            event_id = %event.event_id,
            category = %event.category,
            action = %event.action,
            subject = %event.subject,
            event_json = %json,
            "audit event"
        );
    }
}

/// A no-op sink for disabled scenarios.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAuditSink;

impl NoopAuditSink {
    /// Creates a new no-op sink.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl AuditSink for NoopAuditSink {
    fn record(&self, _event: &AuditEvent) {
        // Intentionally does nothing
    }
}

/// An in-memory sink that retains every event, for tests and local
/// inspection.
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    events: Mutex<Vec<AuditEvent>>,
}

impl MemoryAuditSink {
    /// Creates a new empty memory sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().clone()
    }

    /// Number of events recorded so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// Whether no events have been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl AuditSink for MemoryAuditSink {
    fn record(&self, event: &AuditEvent) {
        self.events.lock().push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::AuditCategory;
    use std::sync::Arc;

    fn sample() -> AuditEvent {
        AuditEvent::new(AuditCategory::Order, "order.transition", "subject")
    }

    #[test]
    fn tracing_sink_does_not_panic() {
        let sink = TracingAuditSink::new();
        sink.record(&sample());
    }

    #[test]
    fn noop_sink_does_nothing() {
        let sink = NoopAuditSink::new();
        sink.record(&sample());
    }

    #[test]
    fn memory_sink_retains_events() {
        let sink = MemoryAuditSink::new();
        assert!(sink.is_empty());

        sink.record(&sample());
        sink.record(&sample());

        assert_eq!(sink.len(), 2);
        assert_eq!(sink.events()[0].action, "order.transition");
    }

    #[test]
    fn sink_usable_through_arc_dyn() {
        let sink: Arc<dyn AuditSink> = Arc::new(MemoryAuditSink::new());
        sink.record(&sample());
    }

    #[test]
    fn sinks_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TracingAuditSink>();
        assert_send_sync::<NoopAuditSink>();
        assert_send_sync::<MemoryAuditSink>();
    }
}
