//! Input and output contracts shared by adapters and the pipeline.
//!
//! Adapters (chat platforms, consoles, webhooks) own their protocol
//! concerns. The core only sees [`InputEntry`] values coming in and talks
//! back through [`Output`] sinks.

pub mod console;
pub mod reply;

use crate::error::OutputError;
use crate::pipeline::Ingress;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

pub use reply::{PendingReply, ReplyHandle, ReplyOutput, TIMEOUT_FALLBACK, reply_channel};

/// Per-message attribute mapping.
pub type Metadata = HashMap<String, Value>;

// General context field names. Adapters normalize their platform fields
// into these so restrictions work the same across origins.
pub const FIELD_USER_ID: &str = "userID";
pub const FIELD_USERNAME: &str = "username";
pub const FIELD_WHERE: &str = "where";
pub const FIELD_THREAD: &str = "thread";

/// Output metadata key holding the message tags.
pub const FIELD_TAGS: &str = "Tags";

/// Merge two metadata maps. Values from `overrides` win on duplicate keys.
pub fn merge_metadata(base: &Metadata, overrides: &Metadata) -> Metadata {
    let mut merged = base.clone();
    for (key, value) in overrides {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

/// Build output metadata carrying the given tags.
pub fn tags_metadata<S: AsRef<str>>(tags: &[S]) -> Metadata {
    let tags = tags
        .iter()
        .map(|t| Value::String(t.as_ref().to_string()))
        .collect();
    Metadata::from([(FIELD_TAGS.to_string(), Value::Array(tags))])
}

/// Metadata as it came from the origin, plus the optional reply channel of
/// request/response adapters.
#[derive(Debug, Clone, Default)]
pub struct InputContext {
    pub metadata: Metadata,
    pub reply: Option<ReplyHandle>,
}

/// One arriving message.
#[derive(Debug, Clone)]
pub struct InputEntry {
    /// Correlation id for logs and events.
    pub id: Uuid,
    pub origin: String,
    pub query: String,
    pub input: InputContext,
    /// Normalized subset of the input metadata (see the `FIELD_*` constants).
    pub general: Metadata,
    /// When the input built the entry. Workers measure queue wait from it.
    pub received_at: DateTime<Utc>,
}

impl InputEntry {
    pub fn new(origin: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            origin: origin.into(),
            query: query.into(),
            input: InputContext::default(),
            general: Metadata::new(),
            received_at: Utc::now(),
        }
    }

    pub fn with_input_metadata(mut self, metadata: Metadata) -> Self {
        self.input.metadata = metadata;
        self
    }

    /// Set one general context field.
    pub fn with_general(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.general.insert(field.into(), value.into());
        self
    }

    pub fn with_reply(mut self, reply: ReplyHandle) -> Self {
        self.input.reply = Some(reply);
        self
    }

    /// Time between `received_at` and `now`, zero if the clock went back.
    pub fn queue_wait(&self, now: DateTime<Utc>) -> Duration {
        (now - self.received_at).to_std().unwrap_or_default()
    }
}

/// Kind of message handed to a sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputKind {
    Default,
    /// Preformatted block (code fence, box, ...), rendered by the sink.
    Framed,
}

/// A producer of [`InputEntry`] values.
///
/// `listen` pushes entries through the given [`Ingress`] until the source
/// is exhausted or the ingress reports the pipeline closed.
#[async_trait]
pub trait Input: Send + Sync {
    fn origin(&self) -> &str;

    async fn listen(&self, ingress: Ingress) -> anyhow::Result<()>;
}

/// A consumer of outgoing messages.
#[async_trait]
pub trait Output: Send + Sync {
    fn name(&self) -> &str;

    async fn send(
        &self,
        kind: OutputKind,
        text: &str,
        input: &InputContext,
        output: &Metadata,
    ) -> Result<(), OutputError>;
}

/// Result of a broadcast over every registered sink.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Delivery {
    pub delivered: usize,
    pub failed: usize,
}

/// The set of registered sinks. Cheap to clone.
#[derive(Clone, Default)]
pub struct Outputs {
    sinks: Arc<Vec<Arc<dyn Output>>>,
}

impl Outputs {
    pub fn new(sinks: Vec<Arc<dyn Output>>) -> Self {
        Self {
            sinks: Arc::new(sinks),
        }
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    /// Send to every sink concurrently. A failing sink is logged and does
    /// not hold back delivery to the others.
    pub async fn send(
        &self,
        kind: OutputKind,
        text: &str,
        input: &InputContext,
        output: &Metadata,
    ) -> Delivery {
        let results = join_all(
            self.sinks
                .iter()
                .map(|sink| async move { (sink.name(), sink.send(kind, text, input, output).await) }),
        )
        .await;

        let mut delivery = Delivery::default();
        for (name, result) in results {
            match result {
                Ok(()) => delivery.delivered += 1,
                Err(e) => {
                    delivery.failed += 1;
                    warn!(sink = %name, error = %e, code = e.error_code(), "Output delivery failed");
                }
            }
        }
        debug!(
            delivered = delivery.delivered,
            failed = delivery.failed,
            "Broadcast complete"
        );
        delivery
    }

    pub async fn broadcast(&self, text: &str, input: &InputContext, output: &Metadata) -> Delivery {
        self.send(OutputKind::Default, text, input, output).await
    }

    pub async fn broadcast_framed(
        &self,
        text: &str,
        input: &InputContext,
        output: &Metadata,
    ) -> Delivery {
        self.send(OutputKind::Framed, text, input, output).await
    }

    /// Send the standard "not understood" reply for `content`.
    pub async fn dont_understand<S: AsRef<str>>(
        &self,
        content: &str,
        tags: &[S],
        input: &InputContext,
    ) -> Delivery {
        self.broadcast(&dont_understand_message(content), input, &tags_metadata(tags))
            .await
    }
}

pub fn dont_understand_message(content: &str) -> String {
    format!("Hmmm, I don't understand what do you mean by '{content}'")
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    struct Recorder {
        name: &'static str,
        fail: bool,
        seen: Mutex<Vec<(OutputKind, String)>>,
    }

    #[async_trait]
    impl Output for Recorder {
        fn name(&self) -> &str {
            self.name
        }

        async fn send(
            &self,
            kind: OutputKind,
            text: &str,
            _input: &InputContext,
            _output: &Metadata,
        ) -> Result<(), OutputError> {
            if self.fail {
                return Err(OutputError::Delivery("down".into()));
            }
            self.seen.lock().push((kind, text.to_string()));
            Ok(())
        }
    }

    fn recorder(name: &'static str, fail: bool) -> Arc<Recorder> {
        Arc::new(Recorder {
            name,
            fail,
            seen: Mutex::new(Vec::new()),
        })
    }

    #[test]
    fn test_merge_metadata_overrides_win() {
        let base = Metadata::from([
            ("a".to_string(), Value::from(1)),
            ("b".to_string(), Value::from(2)),
        ]);
        let overrides = Metadata::from([
            ("b".to_string(), Value::from(20)),
            ("c".to_string(), Value::from(30)),
        ]);
        let merged = merge_metadata(&base, &overrides);
        assert_eq!(merged.len(), 3);
        assert_eq!(merged["a"], Value::from(1));
        assert_eq!(merged["b"], Value::from(20));
        assert_eq!(merged["c"], Value::from(30));
    }

    #[test]
    fn test_tags_metadata() {
        let md = tags_metadata(&["error", "help"]);
        assert_eq!(md[FIELD_TAGS], serde_json::json!(["error", "help"]));
    }

    #[tokio::test]
    async fn test_failing_sink_does_not_block_others() {
        let good = recorder("good", false);
        let bad = recorder("bad", true);
        let other = recorder("other", false);
        let sinks: Vec<Arc<dyn Output>> = vec![good.clone(), bad, other.clone()];
        let outputs = Outputs::new(sinks);

        let delivery = outputs
            .broadcast("hi", &InputContext::default(), &Metadata::new())
            .await;

        assert_eq!(delivery, Delivery { delivered: 2, failed: 1 });
        assert_eq!(good.seen.lock().as_slice(), &[(OutputKind::Default, "hi".to_string())]);
        assert_eq!(other.seen.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_dont_understand() {
        let sink = recorder("sink", false);
        let sinks: Vec<Arc<dyn Output>> = vec![sink.clone()];
        let outputs = Outputs::new(sinks);
        outputs
            .dont_understand("dance", &["error"], &InputContext::default())
            .await;
        assert_eq!(
            sink.seen.lock()[0].1,
            "Hmmm, I don't understand what do you mean by 'dance'"
        );
    }

    #[test]
    fn test_entry_builder() {
        let entry = InputEntry::new("console", "agent version")
            .with_general(FIELD_USER_ID, "u1")
            .with_general(FIELD_WHERE, "room");
        assert_eq!(entry.origin, "console");
        assert_eq!(entry.general[FIELD_USER_ID], Value::from("u1"));
        assert!(entry.input.reply.is_none());
    }

    #[test]
    fn test_queue_wait_since_received() {
        let entry = InputEntry::new("console", "ping");
        let later = entry.received_at + chrono::Duration::milliseconds(250);
        assert_eq!(entry.queue_wait(later), Duration::from_millis(250));

        let earlier = entry.received_at - chrono::Duration::seconds(1);
        assert_eq!(entry.queue_wait(earlier), Duration::ZERO);
    }
}
