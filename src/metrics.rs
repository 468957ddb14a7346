//! Prometheus metrics collection for cmdagent.
//!
//! Metrics are exposed on the optional HTTP endpoint (see [`crate::http`]).
//! Recording is a no-op until [`init`] has run, so library users that never
//! call it pay nothing.
//!
//! - `cmdagent_messages_total{origin}` - Messages accepted into the queue
//! - `cmdagent_outcomes_total{kind, handled}` - Resolutions by outcome kind
//! - `cmdagent_handler_duration_seconds{kind}` - Handler latency histogram
//! - `cmdagent_queue_wait_seconds` - Time entries spent queued before a worker took them
//! - `cmdagent_rejected_total{origin}` - Submissions refused on a full queue
//! - `cmdagent_handler_faults_total{fault}` - Handler panics and timeouts
//! - `cmdagent_no_match_total` - Messages no command matched

use crate::resolve::OutcomeKind;
use prometheus::{
    Encoder, Histogram, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry,
    TextEncoder,
};
use std::sync::OnceLock;

/// Global Prometheus registry for all metrics.
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

pub fn registry() -> &'static Registry {
    REGISTRY.get_or_init(Registry::new)
}

// ========================================================================
// Pipeline
// ========================================================================

/// Messages accepted into the ingestion queue, by origin.
pub static MESSAGES: OnceLock<IntCounterVec> = OnceLock::new();

/// Submissions refused because the queue was full, by origin.
pub static REJECTED: OnceLock<IntCounterVec> = OnceLock::new();

/// Handler panics and timeouts.
pub static HANDLER_FAULTS: OnceLock<IntCounterVec> = OnceLock::new();

/// Messages that matched no top-level command.
pub static NO_MATCH: OnceLock<IntCounter> = OnceLock::new();

/// Time from an entry's `received_at` until a worker dequeued it.
pub static QUEUE_WAIT: OnceLock<Histogram> = OnceLock::new();

// ========================================================================
// Resolution and dispatch
// ========================================================================

/// Resolutions by outcome kind and whether a handler ran.
pub static OUTCOMES: OnceLock<IntCounterVec> = OnceLock::new();

/// Handler latency by outcome kind.
pub static HANDLER_LATENCY: OnceLock<HistogramVec> = OnceLock::new();

/// Initialize the Prometheus metrics registry.
///
/// Call once at startup before any metrics are recorded. Later calls keep
/// the first registration.
pub fn init() {
    let r = registry();

    // Helper macro to register metric
    macro_rules! register {
        ($metric:ident, $init:expr) => {
            match $init {
                Ok(m) => {
                    if let Err(e) = r.register(Box::new(m.clone())) {
                        tracing::warn!(error = %e, concat!("Failed to register metric ", stringify!($metric)));
                    }
                    let _ = $metric.set(m);
                }
                Err(e) => {
                    tracing::error!(error = %e, concat!("Failed to create metric ", stringify!($metric)));
                }
            }
        };
    }

    register!(MESSAGES, IntCounterVec::new(Opts::new("cmdagent_messages_total", "Messages accepted by origin"), &["origin"]));
    register!(REJECTED, IntCounterVec::new(Opts::new("cmdagent_rejected_total", "Submissions refused on a full queue"), &["origin"]));
    register!(HANDLER_FAULTS, IntCounterVec::new(Opts::new("cmdagent_handler_faults_total", "Handler panics and timeouts"), &["fault"]));
    register!(NO_MATCH, IntCounter::new("cmdagent_no_match_total", "Messages that matched no command"));
    register!(QUEUE_WAIT, Histogram::with_opts(
        HistogramOpts::new("cmdagent_queue_wait_seconds", "Time entries spent queued before a worker took them")
            .buckets(vec![0.0001, 0.001, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 30.0])
    ));
    register!(OUTCOMES, IntCounterVec::new(Opts::new("cmdagent_outcomes_total", "Resolutions by outcome kind"), &["kind", "handled"]));
    register!(HANDLER_LATENCY, HistogramVec::new(
        HistogramOpts::new("cmdagent_handler_duration_seconds", "Handler latency by outcome kind")
            .buckets(vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]),
        &["kind"]
    ));
}

/// Gather all metrics and encode them in Prometheus text format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = registry().gather();
    let mut buffer = vec![];
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode Prometheus metrics");
        return String::new();
    }
    match String::from_utf8(buffer) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Prometheus metrics were not valid UTF-8");
            String::new()
        }
    }
}

// ============================================================================
// Recording helpers
// ============================================================================

#[inline]
pub fn record_message(origin: &str) {
    if let Some(c) = MESSAGES.get() {
        c.with_label_values(&[origin]).inc();
    }
}

#[inline]
pub fn record_rejected(origin: &str) {
    if let Some(c) = REJECTED.get() {
        c.with_label_values(&[origin]).inc();
    }
}

/// Record a handler fault (`"panic"` or `"timeout"`).
#[inline]
pub fn record_fault(fault: &str) {
    if let Some(c) = HANDLER_FAULTS.get() {
        c.with_label_values(&[fault]).inc();
    }
}

#[inline]
pub fn record_no_match() {
    if let Some(c) = NO_MATCH.get() {
        c.inc();
    }
}

#[inline]
pub fn record_queue_wait(wait_secs: f64) {
    if let Some(h) = QUEUE_WAIT.get() {
        h.observe(wait_secs);
    }
}

/// Record a resolution outcome and whether a handler was registered for it.
#[inline]
pub fn record_outcome(kind: OutcomeKind, handled: bool) {
    if let Some(c) = OUTCOMES.get() {
        let handled = if handled { "true" } else { "false" };
        c.with_label_values(&[kind.as_str(), handled]).inc();
    }
}

#[inline]
pub fn record_handler_latency(kind: OutcomeKind, duration_secs: f64) {
    if let Some(h) = HANDLER_LATENCY.get() {
        h.with_label_values(&[kind.as_str()]).observe(duration_secs);
    }
}
