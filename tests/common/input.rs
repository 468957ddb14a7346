//! Test inputs.

use async_trait::async_trait;
use cmdagent::io::InputEntry;
use cmdagent::{Ingress, Input, PipelineError};
use parking_lot::Mutex;
use tokio::sync::mpsc;

/// Submits a fixed list of entries, then finishes.
pub struct VecInput {
    origin: String,
    entries: Mutex<Vec<InputEntry>>,
    /// Submission results, in order.
    pub results: Mutex<Vec<Result<(), PipelineError>>>,
}

#[allow(dead_code)]
impl VecInput {
    pub fn new(origin: &str, entries: Vec<InputEntry>) -> Self {
        Self {
            origin: origin.to_string(),
            entries: Mutex::new(entries),
            results: Mutex::new(Vec::new()),
        }
    }

    /// One entry per query, all from `origin`.
    pub fn queries<S: AsRef<str>>(origin: &str, queries: &[S]) -> Self {
        let entries = queries
            .iter()
            .map(|q| InputEntry::new(origin, q.as_ref()))
            .collect();
        Self::new(origin, entries)
    }
}

#[async_trait]
impl Input for VecInput {
    fn origin(&self) -> &str {
        &self.origin
    }

    async fn listen(&self, ingress: Ingress) -> anyhow::Result<()> {
        let entries = std::mem::take(&mut *self.entries.lock());
        for entry in entries {
            let result = ingress.submit(entry).await;
            self.results.lock().push(result);
        }
        Ok(())
    }
}

/// Forwards entries sent on a channel until the sender is dropped.
pub struct ChannelInput {
    origin: String,
    rx: tokio::sync::Mutex<mpsc::Receiver<InputEntry>>,
}

#[allow(dead_code)]
impl ChannelInput {
    pub fn new(origin: &str) -> (mpsc::Sender<InputEntry>, Self) {
        let (tx, rx) = mpsc::channel(64);
        let input = Self {
            origin: origin.to_string(),
            rx: tokio::sync::Mutex::new(rx),
        };
        (tx, input)
    }
}

#[async_trait]
impl Input for ChannelInput {
    fn origin(&self) -> &str {
        &self.origin
    }

    async fn listen(&self, ingress: Ingress) -> anyhow::Result<()> {
        let mut rx = self.rx.lock().await;
        while let Some(entry) = rx.recv().await {
            ingress.submit(entry).await?;
        }
        Ok(())
    }
}
