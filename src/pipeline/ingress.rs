//! Submission side of the ingestion queue.

use super::events::{EventSink, PipelineEvent, Stats};
use crate::config::OverflowPolicy;
use crate::error::PipelineError;
use crate::io::InputEntry;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Handle inputs use to push entries into a listening agent. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Ingress {
    tx: mpsc::Sender<InputEntry>,
    overflow: OverflowPolicy,
    stats: Arc<Stats>,
    events: EventSink,
    drain: CancellationToken,
    reply_timeout: Duration,
}

impl Ingress {
    pub(crate) fn new(
        tx: mpsc::Sender<InputEntry>,
        overflow: OverflowPolicy,
        stats: Arc<Stats>,
        events: EventSink,
        drain: CancellationToken,
        reply_timeout: Duration,
    ) -> Self {
        Self {
            tx,
            overflow,
            stats,
            events,
            drain,
            reply_timeout,
        }
    }

    /// Queue `entry` for processing.
    ///
    /// With [`OverflowPolicy::Block`] this waits for room; with
    /// [`OverflowPolicy::Reject`] a full queue fails with
    /// [`PipelineError::QueueFull`]. Once the agent drains or stops every
    /// submission fails with [`PipelineError::Closed`].
    pub async fn submit(&self, entry: InputEntry) -> Result<(), PipelineError> {
        if self.drain.is_cancelled() {
            return Err(PipelineError::Closed);
        }
        let origin = entry.origin.clone();

        match self.overflow {
            OverflowPolicy::Block => {
                tokio::select! {
                    sent = self.tx.send(entry) => sent.map_err(|_| PipelineError::Closed)?,
                    _ = self.drain.cancelled() => return Err(PipelineError::Closed),
                }
            }
            OverflowPolicy::Reject => match self.tx.try_send(entry) {
                Ok(()) => {}
                Err(TrySendError::Full(entry)) => {
                    Stats::bump(&self.stats.rejected);
                    crate::metrics::record_rejected(&origin);
                    warn!(origin = %origin, entry_id = %entry.id, "Ingestion queue full, submission rejected");
                    self.events.emit(PipelineEvent::Rejected {
                        entry_id: entry.id,
                        origin,
                        error: PipelineError::QueueFull,
                    });
                    return Err(PipelineError::QueueFull);
                }
                Err(TrySendError::Closed(_)) => return Err(PipelineError::Closed),
            },
        }

        crate::metrics::record_message(&origin);
        debug!(origin = %origin, "Entry queued");
        Ok(())
    }

    /// How long request/response inputs should wait on a
    /// [`PendingReply`](crate::io::PendingReply) before falling back.
    pub fn reply_timeout(&self) -> Duration {
        self.reply_timeout
    }

    /// True once the agent accepts no more entries.
    pub fn is_closed(&self) -> bool {
        self.drain.is_cancelled() || self.tx.is_closed()
    }
}
