//! Integration test common infrastructure.
//!
//! Provides recording sinks, scripted and channel-fed inputs, and handlers
//! that count or stall, for driving an [`Agent`](cmdagent::Agent) end to end.

pub mod input;
pub mod output;

#[allow(unused_imports)]
pub use input::{ChannelInput, VecInput};
#[allow(unused_imports)]
pub use output::RecordingOutput;

use async_trait::async_trait;
use cmdagent::{Context, Handler};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Counts invocations and remembers the query of each entry it handled.
#[derive(Default)]
pub struct CountingHandler {
    pub calls: AtomicUsize,
    pub seen: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl CountingHandler {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Handler for CountingHandler {
    async fn handle(&self, ctx: &Context<'_>) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().push(ctx.content.to_string());
    }
}

/// Sleeps before finishing, to hold a worker busy.
pub struct SlowHandler {
    pub delay: Duration,
    pub started: AtomicUsize,
    pub finished: AtomicUsize,
}

#[allow(dead_code)]
impl SlowHandler {
    pub fn shared(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            delay,
            started: AtomicUsize::new(0),
            finished: AtomicUsize::new(0),
        })
    }

    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    pub fn finished(&self) -> usize {
        self.finished.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Handler for SlowHandler {
    async fn handle(&self, _ctx: &Context<'_>) {
        self.started.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.finished.fetch_add(1, Ordering::SeqCst);
    }
}

/// Replies with the content it received.
#[allow(dead_code)]
pub struct EchoHandler;

#[async_trait]
impl Handler for EchoHandler {
    async fn handle(&self, ctx: &Context<'_>) {
        ctx.reply_tagged(ctx.content, &["echo"]).await;
    }
}

/// Poll `cond` every millisecond until it holds or `limit` elapses.
#[allow(dead_code)]
pub async fn wait_until(limit: Duration, cond: impl Fn() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + limit;
    while tokio::time::Instant::now() < deadline {
        if cond() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
    cond()
}
