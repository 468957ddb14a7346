//! Telemetry utilities for handler timing and message correlation.

use crate::resolve::OutcomeKind;
use std::time::Instant;

/// Guard for timing handler execution and recording metrics.
///
/// Records handler latency when dropped, including when the handler future
/// is cancelled by a timeout.
pub struct HandlerTimer {
    kind: OutcomeKind,
    start: Instant,
}

impl HandlerTimer {
    /// Start timing a handler for `kind`.
    pub fn new(kind: OutcomeKind) -> Self {
        Self {
            kind,
            start: Instant::now(),
        }
    }
}

impl Drop for HandlerTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        crate::metrics::record_handler_latency(self.kind, duration);
    }
}

/// Standardized span constructors.
pub mod spans {
    use tracing::{Span, info_span};
    use uuid::Uuid;

    /// Span for one message travelling through a worker.
    pub fn message(entry_id: Uuid, origin: &str, worker: usize, queue_wait_ms: u64) -> Span {
        info_span!("message", entry_id = %entry_id, origin = %origin, worker, queue_wait_ms)
    }

    /// Span for a handler invocation.
    pub fn handler(command: &str, kind: &str, pattern: &str) -> Span {
        info_span!("handler", command = %command, kind = %kind, pattern = %pattern)
    }
}
