//! Pipeline events and listen statistics.

use crate::error::{PipelineError, ResolveError};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

/// Something the pipeline could not route to a handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineEvent {
    /// No top-level command matched the message.
    NoCommandMatch {
        entry_id: Uuid,
        origin: String,
        error: ResolveError,
    },
    /// The handler panicked; the worker moved on.
    HandlerPanicked {
        entry_id: Uuid,
        origin: String,
        message: String,
    },
    /// The handler missed its deadline and was cancelled.
    HandlerTimedOut {
        entry_id: Uuid,
        origin: String,
        timeout: Duration,
    },
    /// A submission was refused by the overflow policy.
    Rejected {
        entry_id: Uuid,
        origin: String,
        error: PipelineError,
    },
}

impl PipelineEvent {
    pub fn entry_id(&self) -> Uuid {
        match self {
            Self::NoCommandMatch { entry_id, .. }
            | Self::HandlerPanicked { entry_id, .. }
            | Self::HandlerTimedOut { entry_id, .. }
            | Self::Rejected { entry_id, .. } => *entry_id,
        }
    }
}

/// Optional event collector. Delivery is best-effort: a full or closed
/// collector drops the event.
#[derive(Debug, Clone, Default)]
pub(crate) struct EventSink {
    tx: Option<mpsc::Sender<PipelineEvent>>,
}

impl EventSink {
    pub(crate) fn new(tx: mpsc::Sender<PipelineEvent>) -> Self {
        Self { tx: Some(tx) }
    }

    pub(crate) fn emit(&self, event: PipelineEvent) {
        let Some(tx) = &self.tx else {
            return;
        };
        if let Err(e) = tx.try_send(event) {
            debug!(error = %e, "Event collector unavailable, event dropped");
        }
    }
}

/// Counters for one `listen` call.
#[derive(Debug, Default)]
pub(crate) struct Stats {
    pub processed: AtomicUsize,
    pub no_match: AtomicUsize,
    pub panicked: AtomicUsize,
    pub timed_out: AtomicUsize,
    pub rejected: AtomicUsize,
    pub discarded: AtomicUsize,
}

impl Stats {
    pub(crate) fn bump(counter: &AtomicUsize) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn report(self: &Arc<Self>) -> ListenReport {
        let processed = self.processed.load(Ordering::Relaxed);
        let discarded = self.discarded.load(Ordering::Relaxed);
        ListenReport {
            received: processed + discarded,
            processed,
            no_match: self.no_match.load(Ordering::Relaxed),
            panicked: self.panicked.load(Ordering::Relaxed),
            timed_out: self.timed_out.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            discarded,
        }
    }
}

/// Summary returned when a `listen` call finishes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListenReport {
    /// Messages accepted into the queue.
    pub received: usize,
    /// Messages a worker took off the queue and finished, faults included.
    pub processed: usize,
    pub no_match: usize,
    pub panicked: usize,
    pub timed_out: usize,
    /// Submissions refused on a full queue.
    pub rejected: usize,
    /// Queued messages dropped by `stop`.
    pub discarded: usize,
}
