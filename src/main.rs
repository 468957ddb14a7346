//! cmdagent - console demo of the chat command agent.
//!
//! Reads messages from stdin, answers on stdout. Registers one `agent`
//! command with a `version` sub-command.

use async_trait::async_trait;
use cmdagent::config::{self, Config};
use cmdagent::handlers::CommonHandlers;
use cmdagent::io::console::{ConsoleInput, ConsoleOutput};
use cmdagent::io::Output;
use cmdagent::{Agent, Command, Context, Handler, OutcomeKind, Outputs, http, metrics};
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const AGENT_ALIASES: [&str; 4] = ["agent", "agent,", "@agent", "@agent,"];

struct VersionHandler {
    name: String,
}

#[async_trait]
impl Handler for VersionHandler {
    async fn handle(&self, ctx: &Context<'_>) {
        let text = format!("{} version {}", self.name, env!("CARGO_PKG_VERSION"));
        ctx.reply_tagged(&text, &["version"]).await;
    }
}

fn agent_command(config: &Config) -> Command {
    let common = CommonHandlers::from_config(&config.help);
    let version = common.install(
        Command::word(["version"])
            .description("Show the agent version")
            .on(
                OutcomeKind::Default,
                VersionHandler {
                    name: config.agent.name.clone(),
                },
            ),
        &["version", "error"],
    );
    common.install(
        Command::word(AGENT_ALIASES)
            .description("Talk to the agent")
            .sub_command(version),
        &["agent", "error"],
    )
}

fn load_config() -> anyhow::Result<Config> {
    let config = match std::env::args().nth(1) {
        Some(path) => Config::load(&path).map_err(|e| {
            error!(path = %path, error = %e, "Failed to load config");
            e
        })?,
        None if Path::new("config.toml").exists() => Config::load("config.toml")?,
        None => Config::default(),
    };

    if let Err(errors) = config::validate(&config) {
        for e in &errors {
            error!(error = %e, "Invalid configuration");
        }
        anyhow::bail!("configuration has {} error(s)", errors.len());
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing. Logs go to stderr so replies on stdout stay clean.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);
    if std::env::var("CMDAGENT_LOG_FORMAT").is_ok_and(|f| f == "json") {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    let config = load_config()?;
    info!(
        agent = %config.agent.name,
        workers = config.pipeline.workers,
        queue_capacity = config.pipeline.queue_capacity,
        "Starting cmdagent"
    );

    // Convention: metrics.port = 0 disables the HTTP endpoint.
    let http_shutdown = CancellationToken::new();
    if config.metrics.port != 0 {
        metrics::init();
        let port = config.metrics.port;
        let token = http_shutdown.clone();
        tokio::spawn(async move {
            http::run_http_server(port, token).await;
        });
    }

    let sinks: Vec<Arc<dyn Output>> = vec![Arc::new(ConsoleOutput)];
    let agent = Agent::new(config.pipeline.clone())
        .with_input(ConsoleInput::stdin())
        .with_outputs(Outputs::new(sinks));
    agent.add_command(agent_command(&config))?;

    let shutdown = agent.shutdown_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received");
            shutdown.drain();
        }
    });

    let report = agent.listen().await?;
    http_shutdown.cancel();
    info!(processed = report.processed, "Shutdown complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cmdagent::io::Metadata;
    use cmdagent::resolve;

    #[test]
    fn test_demo_tree_resolves() {
        let registry = cmdagent::CommandRegistry::new();
        registry.add_command(agent_command(&Config::default())).unwrap();
        let commands = registry.snapshot();

        let r = resolve(&commands, "@agent, version", &Metadata::new()).unwrap();
        assert_eq!(r.command.canonical(), "version");
        assert_eq!(r.kind, OutcomeKind::Default);

        let r = resolve(&commands, "Agent help", &Metadata::new()).unwrap();
        assert_eq!(r.command.canonical(), "agent");
        assert_eq!(r.kind, OutcomeKind::Error);
        assert_eq!(r.remaining, "help");
    }
}
