//! Worker tasks: dequeue, resolve, dispatch.

use super::ShutdownHandle;
use super::events::{EventSink, PipelineEvent, Stats};
use crate::command::CommandRegistry;
use crate::error::ResolveError;
use crate::handlers::{Dispatched, Dispatcher};
use crate::io::InputEntry;
use crate::resolve::resolve;
use crate::telemetry::spans;
use chrono::Utc;
use futures_util::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, mpsc};
use tracing::{Instrument, debug, error, warn};

pub(crate) struct Worker {
    pub id: usize,
    pub queue: Arc<Mutex<mpsc::Receiver<InputEntry>>>,
    pub registry: Arc<CommandRegistry>,
    pub dispatcher: Dispatcher,
    pub stats: Arc<Stats>,
    pub events: EventSink,
    pub handler_timeout: Option<Duration>,
    pub shutdown: ShutdownHandle,
}

impl Worker {
    /// Process entries until the queue closes or the agent stops.
    pub async fn run(self) {
        let mut draining = false;
        loop {
            let entry = {
                let mut queue = self.queue.lock().await;
                tokio::select! {
                    biased;
                    _ = self.shutdown.stop.cancelled() => break,
                    entry = queue.recv() => entry,
                    _ = self.shutdown.drain.cancelled(), if !draining => {
                        // Closing keeps buffered entries receivable.
                        queue.close();
                        draining = true;
                        continue;
                    }
                }
            };
            let Some(entry) = entry else {
                break;
            };
            let waited = entry.queue_wait(Utc::now());
            crate::metrics::record_queue_wait(waited.as_secs_f64());
            let span = spans::message(entry.id, &entry.origin, self.id, waited.as_millis() as u64);
            self.process(entry).instrument(span).await;
        }
        debug!(worker = self.id, "Worker exiting");
    }

    async fn process(&self, entry: InputEntry) {
        let guarded = AssertUnwindSafe(self.resolve_and_dispatch(&entry)).catch_unwind();
        let result = match self.handler_timeout {
            Some(limit) => tokio::time::timeout(limit, guarded).await.ok(),
            None => Some(guarded.await),
        };
        Stats::bump(&self.stats.processed);

        match result {
            Some(Ok(Ok(dispatched))) => {
                debug!(?dispatched, "Entry processed");
            }
            Some(Ok(Err(e))) => {
                Stats::bump(&self.stats.no_match);
                crate::metrics::record_no_match();
                debug!(error = %e, "No command matched");
                self.events.emit(PipelineEvent::NoCommandMatch {
                    entry_id: entry.id,
                    origin: entry.origin,
                    error: e,
                });
            }
            Some(Err(payload)) => {
                let message = panic_message(payload.as_ref());
                Stats::bump(&self.stats.panicked);
                crate::metrics::record_fault("panic");
                error!(panic = %message, "Handler panicked");
                self.events.emit(PipelineEvent::HandlerPanicked {
                    entry_id: entry.id,
                    origin: entry.origin,
                    message,
                });
            }
            None => {
                let timeout = self.handler_timeout.unwrap_or_default();
                Stats::bump(&self.stats.timed_out);
                crate::metrics::record_fault("timeout");
                warn!(timeout_ms = timeout.as_millis() as u64, "Handler timed out");
                self.events.emit(PipelineEvent::HandlerTimedOut {
                    entry_id: entry.id,
                    origin: entry.origin,
                    timeout,
                });
            }
        }
    }

    async fn resolve_and_dispatch(&self, entry: &InputEntry) -> Result<Dispatched, ResolveError> {
        let commands = self.registry.snapshot();
        let resolution = resolve(&commands, &entry.query, &entry.general)?;
        debug!(
            command = %resolution.command.canonical(),
            kind = %resolution.kind,
            "Resolved"
        );
        Ok(self.dispatcher.dispatch(&resolution, entry).await)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
