//! Outcome-to-handler dispatch.
//!
//! Looks up the handler registered for the resolution's kind on the matched
//! command and invokes it with a fresh [`Context`].

use super::context::Context;
use crate::io::{InputEntry, Outputs};
use crate::resolve::Resolution;
use crate::telemetry::{HandlerTimer, spans};
use tracing::{Instrument, debug};

/// What the dispatcher did with a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatched {
    Handled,
    /// The command has no handler for this kind; nothing ran.
    NoHandler,
}

/// Routes resolutions to command handlers.
#[derive(Clone, Default)]
pub struct Dispatcher {
    outputs: Outputs,
}

impl Dispatcher {
    pub fn new(outputs: Outputs) -> Self {
        Self { outputs }
    }

    pub fn outputs(&self) -> &Outputs {
        &self.outputs
    }

    /// Invoke the handler for `resolution`, if the command registered one.
    pub async fn dispatch(&self, resolution: &Resolution<'_>, entry: &InputEntry) -> Dispatched {
        let kind = resolution.kind;
        let command = resolution.command.canonical();

        let Some(handler) = resolution.command.handlers().get(kind) else {
            debug!(command = %command, kind = %kind, "No handler registered; skipping");
            crate::metrics::record_outcome(kind, false);
            return Dispatched::NoHandler;
        };

        let ctx = Context::new(resolution, entry, &self.outputs);
        let span = spans::handler(command, kind.as_str(), resolution.matched_pattern.as_str());

        let _timer = HandlerTimer::new(kind);
        handler.handle(&ctx).instrument(span).await;
        crate::metrics::record_outcome(kind, true);

        Dispatched::Handled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{Command, CommandRegistry};
    use crate::handlers::Handler;
    use crate::error::OutputError;
    use crate::io::{FIELD_TAGS, InputContext, Metadata, Output, OutputKind};
    use crate::resolve::{OutcomeKind, resolve};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Default)]
    struct Seen {
        calls: Mutex<Vec<(OutcomeKind, String, String)>>,
    }

    struct Recording(Arc<Seen>);

    #[async_trait]
    impl Handler for Recording {
        async fn handle(&self, ctx: &Context<'_>) {
            self.0.calls.lock().push((
                ctx.kind,
                ctx.command.canonical().to_string(),
                ctx.content.to_string(),
            ));
        }
    }

    #[tokio::test]
    async fn test_dispatches_to_kind_handler() {
        let seen = Arc::new(Seen::default());
        let registry = CommandRegistry::new();
        registry
            .add_command(
                Command::word(["agent"])
                    .on(OutcomeKind::Default, Recording(seen.clone()))
                    .on(OutcomeKind::Error, Recording(seen.clone())),
            )
            .unwrap();
        let commands = registry.snapshot();
        let dispatcher = Dispatcher::default();

        let entry = InputEntry::new("test", "agent what");
        let resolution = resolve(&commands, &entry.query, &Metadata::new()).unwrap();
        assert_eq!(dispatcher.dispatch(&resolution, &entry).await, Dispatched::Handled);

        let calls = seen.calls.lock();
        assert_eq!(
            calls.as_slice(),
            &[(OutcomeKind::Error, "agent".to_string(), "what".to_string())]
        );
    }

    #[tokio::test]
    async fn test_missing_handler_is_noop() {
        let registry = CommandRegistry::new();
        registry.add_command(Command::word(["quiet"])).unwrap();
        let commands = registry.snapshot();

        let entry = InputEntry::new("test", "quiet");
        let resolution = resolve(&commands, &entry.query, &Metadata::new()).unwrap();
        let dispatched = Dispatcher::default().dispatch(&resolution, &entry).await;
        assert_eq!(dispatched, Dispatched::NoHandler);
    }

    struct Listing;

    #[async_trait]
    impl Handler for Listing {
        async fn handle(&self, ctx: &Context<'_>) {
            ctx.reply_framed("web-1  up\nweb-2  down", &["status"]).await;
        }
    }

    #[derive(Default)]
    struct Sink {
        sent: Mutex<Vec<(OutputKind, String, Metadata)>>,
    }

    #[async_trait]
    impl Output for Sink {
        fn name(&self) -> &str {
            "sink"
        }

        async fn send(
            &self,
            kind: OutputKind,
            text: &str,
            _input: &InputContext,
            output: &Metadata,
        ) -> Result<(), OutputError> {
            self.sent.lock().push((kind, text.to_string(), output.clone()));
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_framed_reply_reaches_sink_as_framed() {
        let sink = Arc::new(Sink::default());
        let sinks: Vec<Arc<dyn Output>> = vec![sink.clone()];
        let dispatcher = Dispatcher::new(Outputs::new(sinks));

        let registry = CommandRegistry::new();
        registry
            .add_command(Command::word(["status"]).on(OutcomeKind::Default, Listing))
            .unwrap();
        let commands = registry.snapshot();

        let entry = InputEntry::new("test", "status");
        let resolution = resolve(&commands, &entry.query, &Metadata::new()).unwrap();
        assert_eq!(dispatcher.dispatch(&resolution, &entry).await, Dispatched::Handled);

        let sent = sink.sent.lock();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, OutputKind::Framed);
        assert_eq!(sent[0].1, "web-1  up\nweb-2  down");
        assert_eq!(sent[0].2[FIELD_TAGS], serde_json::json!(["status"]));
    }
}
