//! Reply channel for request/response adapters.
//!
//! Webhook-style platforms expect the answer in the HTTP response of the
//! request that carried the message. The adapter attaches a [`ReplyHandle`]
//! to the entry, hands it to the pipeline and awaits [`PendingReply::wait`].
//! [`ReplyOutput`] is the sink that routes handler messages back into it.

use super::{InputContext, Metadata, Output, OutputKind};
use crate::error::OutputError;
use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Text returned when no reply arrives before the deadline.
pub const TIMEOUT_FALLBACK: &str = "response could not be delivered in time";

/// Room for a reply plus one late message; anything beyond is dropped.
const REPLY_BUFFER: usize = 2;

/// Sending half, carried inside an entry's [`InputContext`].
#[derive(Debug, Clone)]
pub struct ReplyHandle {
    tx: mpsc::Sender<String>,
}

/// Receiving half, owned by the adapter that is waiting to answer.
#[derive(Debug)]
pub struct PendingReply {
    rx: mpsc::Receiver<String>,
}

/// Create a connected reply pair.
pub fn reply_channel() -> (ReplyHandle, PendingReply) {
    let (tx, rx) = mpsc::channel(REPLY_BUFFER);
    (ReplyHandle { tx }, PendingReply { rx })
}

impl ReplyHandle {
    /// Deliver a reply without blocking.
    pub fn deliver(&self, text: &str) -> Result<(), OutputError> {
        self.tx.try_send(text.to_string()).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => {
                OutputError::Delivery("reply buffer full".to_string())
            }
            mpsc::error::TrySendError::Closed(_) => OutputError::ReplyClosed,
        })
    }
}

impl PendingReply {
    /// Wait for the first reply, or return [`TIMEOUT_FALLBACK`].
    ///
    /// The channel is closed on return, so late deliveries fail with
    /// [`OutputError::ReplyClosed`] instead of piling up.
    pub async fn wait(mut self, timeout: Duration) -> String {
        let reply = match tokio::time::timeout(timeout, self.rx.recv()).await {
            Ok(Some(text)) => text,
            Ok(None) => {
                debug!("Reply channel dropped before answering");
                TIMEOUT_FALLBACK.to_string()
            }
            Err(_) => {
                warn!(timeout_ms = timeout.as_millis() as u64, "Reply wait timed out");
                TIMEOUT_FALLBACK.to_string()
            }
        };
        self.rx.close();
        reply
    }
}

/// Sink that answers through the entry's reply channel.
#[derive(Debug, Default)]
pub struct ReplyOutput;

#[async_trait]
impl Output for ReplyOutput {
    fn name(&self) -> &str {
        "reply"
    }

    async fn send(
        &self,
        _kind: OutputKind,
        text: &str,
        input: &InputContext,
        _output: &Metadata,
    ) -> Result<(), OutputError> {
        let handle = input.reply.as_ref().ok_or(OutputError::MissingReplyChannel)?;
        handle.deliver(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reply_arrives_in_time() {
        let (handle, pending) = reply_channel();
        let input = InputContext {
            metadata: Metadata::new(),
            reply: Some(handle),
        };
        ReplyOutput
            .send(OutputKind::Default, "pong", &input, &Metadata::new())
            .await
            .unwrap();
        assert_eq!(pending.wait(Duration::from_secs(1)).await, "pong");
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_yields_fallback() {
        let (handle, pending) = reply_channel();
        let reply = pending.wait(Duration::from_secs(5)).await;
        assert_eq!(reply, TIMEOUT_FALLBACK);
        // Late replies are refused once the requester gave up.
        assert_eq!(handle.deliver("late"), Err(OutputError::ReplyClosed));
    }

    #[tokio::test]
    async fn test_missing_reply_channel() {
        let err = ReplyOutput
            .send(
                OutputKind::Default,
                "x",
                &InputContext::default(),
                &Metadata::new(),
            )
            .await
            .unwrap_err();
        assert_eq!(err, OutputError::MissingReplyChannel);
    }

    #[tokio::test]
    async fn test_buffer_overflow_is_reported() {
        let (handle, _pending) = reply_channel();
        handle.deliver("one").unwrap();
        handle.deliver("two").unwrap();
        assert!(matches!(handle.deliver("three"), Err(OutputError::Delivery(_))));
    }
}
