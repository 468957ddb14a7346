//! Concurrent dispatch pipeline.
//!
//! Inputs push [`InputEntry`](crate::io::InputEntry) values through an
//! [`Ingress`] into one bounded FIFO queue. A fixed pool of workers takes
//! entries off the queue, resolves them against a registry snapshot and
//! dispatches the outcome. Each worker finishes one entry before taking the
//! next; completion order across workers is not guaranteed.
//!
//! ```text
//!   Input ─┐                       ┌─ worker 0 ─┐
//!   Input ─┼─► Ingress ─► queue ───┼─ worker 1 ─┼─► resolve ─► dispatch ─► Outputs
//!   Input ─┘   (overflow policy)   └─ worker N ─┘
//! ```

mod events;
mod ingress;
mod worker;

pub use events::{ListenReport, PipelineEvent};
pub use ingress::Ingress;

use crate::command::{Command, CommandRegistry};
use crate::config::PipelineConfig;
use crate::error::{PipelineError, RegistryError};
use crate::handlers::Dispatcher;
use crate::io::{Input, Outputs};
use events::{EventSink, Stats};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};
use worker::Worker;

/// Controls shutdown of an [`Agent`]. Cheap to clone.
///
/// A drained or stopped agent stays shut down: later `listen` calls return
/// immediately and submissions fail with [`PipelineError::Closed`].
#[derive(Debug, Clone, Default)]
pub struct ShutdownHandle {
    pub(crate) drain: CancellationToken,
    pub(crate) stop: CancellationToken,
}

impl ShutdownHandle {
    /// Stop accepting input and finish everything already queued.
    pub fn drain(&self) {
        info!("Pipeline draining");
        self.drain.cancel();
    }

    /// Stop accepting input; workers exit after their current entry and
    /// queued entries are discarded.
    pub fn stop(&self) {
        info!("Pipeline stopping");
        self.stop.cancel();
        self.drain.cancel();
    }

    pub fn is_shut_down(&self) -> bool {
        self.drain.is_cancelled()
    }
}

struct ListenGuard<'a>(&'a AtomicBool);

impl<'a> ListenGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self, PipelineError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| PipelineError::AlreadyListening)?;
        Ok(Self(flag))
    }
}

impl Drop for ListenGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// The command agent: registry, inputs, sinks and the worker pool.
pub struct Agent {
    registry: Arc<CommandRegistry>,
    dispatcher: Dispatcher,
    inputs: Vec<Arc<dyn Input>>,
    config: PipelineConfig,
    events: EventSink,
    shutdown: ShutdownHandle,
    listening: AtomicBool,
}

impl Agent {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            registry: Arc::new(CommandRegistry::new()),
            dispatcher: Dispatcher::default(),
            inputs: Vec::new(),
            config,
            events: EventSink::default(),
            shutdown: ShutdownHandle::default(),
            listening: AtomicBool::new(false),
        }
    }

    /// Share an existing registry instead of the agent's own.
    pub fn with_registry(mut self, registry: Arc<CommandRegistry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_input(self, input: impl Input + 'static) -> Self {
        self.with_shared_input(Arc::new(input))
    }

    pub fn with_shared_input(mut self, input: Arc<dyn Input>) -> Self {
        self.inputs.push(input);
        self
    }

    pub fn with_outputs(mut self, outputs: Outputs) -> Self {
        self.dispatcher = Dispatcher::new(outputs);
        self
    }

    /// Attach a collector for [`PipelineEvent`]s.
    pub fn with_events(mut self, tx: mpsc::Sender<PipelineEvent>) -> Self {
        self.events = EventSink::new(tx);
        self
    }

    /// Register a top-level command. Safe while listening; entries already
    /// being resolved keep seeing the previous set.
    pub fn add_command(&self, command: Command) -> Result<(), RegistryError> {
        self.registry.add_command(command)
    }

    pub fn registry(&self) -> &Arc<CommandRegistry> {
        &self.registry
    }

    pub fn outputs(&self) -> &Outputs {
        self.dispatcher.outputs()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    pub fn is_listening(&self) -> bool {
        self.listening.load(Ordering::Acquire)
    }

    /// Run the pipeline until every input finishes or the agent is drained
    /// or stopped, then wait for the workers.
    ///
    /// Only one `listen` may run at a time; a second concurrent call fails
    /// with [`PipelineError::AlreadyListening`] and leaves the first alone.
    #[instrument(skip(self), fields(workers = self.config.workers, inputs = self.inputs.len()))]
    pub async fn listen(&self) -> Result<ListenReport, PipelineError> {
        let _guard = ListenGuard::acquire(&self.listening)?;
        info!("Agent listening");

        let (tx, rx) = mpsc::channel(self.config.queue_capacity.max(1));
        let queue = Arc::new(Mutex::new(rx));
        let stats = Arc::new(Stats::default());

        let mut workers = JoinSet::new();
        for id in 0..self.config.workers.max(1) {
            let worker = Worker {
                id,
                queue: Arc::clone(&queue),
                registry: Arc::clone(&self.registry),
                dispatcher: self.dispatcher.clone(),
                stats: Arc::clone(&stats),
                events: self.events.clone(),
                handler_timeout: self.config.handler_timeout(),
                shutdown: self.shutdown.clone(),
            };
            workers.spawn(worker.run());
        }

        let ingress = Ingress::new(
            tx,
            self.config.overflow,
            Arc::clone(&stats),
            self.events.clone(),
            self.shutdown.drain.clone(),
            self.config.reply_timeout(),
        );
        let mut inputs = JoinSet::new();
        for input in &self.inputs {
            let input = Arc::clone(input);
            let ingress = ingress.clone();
            inputs.spawn(async move {
                let origin = input.origin().to_string();
                (origin, input.listen(ingress).await)
            });
        }
        // Workers see the end of the queue once every input has released
        // its ingress.
        drop(ingress);

        loop {
            tokio::select! {
                joined = inputs.join_next() => match joined {
                    Some(Ok((origin, Ok(())))) => debug!(origin = %origin, "Input finished"),
                    Some(Ok((origin, Err(e)))) => warn!(origin = %origin, error = %e, "Input failed"),
                    Some(Err(e)) => error!(error = %e, "Input task panicked"),
                    None => break,
                },
                _ = self.shutdown.drain.cancelled() => {
                    inputs.abort_all();
                    break;
                }
            }
        }
        while inputs.join_next().await.is_some() {}

        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                error!(error = %e, "Worker task failed");
            }
        }

        // Anything still queued was left behind by `stop`.
        let mut queue = queue.lock().await;
        queue.close();
        while queue.try_recv().is_ok() {
            Stats::bump(&stats.discarded);
        }

        let report = stats.report();
        info!(
            received = report.received,
            processed = report.processed,
            no_match = report.no_match,
            panicked = report.panicked,
            timed_out = report.timed_out,
            rejected = report.rejected,
            discarded = report.discarded,
            "Agent stopped listening"
        );
        Ok(report)
    }
}
