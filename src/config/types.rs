//! Core configuration types and loading.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use super::defaults::*;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Agent configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub help: HelpConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

/// Agent identity.
#[derive(Debug, Clone, Deserialize)]
pub struct AgentConfig {
    /// Name shown by the demo commands and logs.
    #[serde(default = "default_agent_name")]
    pub name: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
        }
    }
}

/// What a full ingestion queue does to new submissions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverflowPolicy {
    /// The submitting input waits for room.
    #[default]
    Block,
    /// The submission fails immediately with `QueueFull`.
    Reject,
}

/// Concurrent pipeline settings.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Number of worker tasks processing messages.
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Bounded ingestion queue size.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    #[serde(default)]
    pub overflow: OverflowPolicy,
    /// Per-message handler deadline. Unset means no deadline.
    #[serde(default)]
    pub handler_timeout_ms: Option<u64>,
    /// How long request/response adapters wait for a reply.
    #[serde(default = "default_reply_timeout_ms")]
    pub reply_timeout_ms: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            queue_capacity: default_queue_capacity(),
            overflow: OverflowPolicy::default(),
            handler_timeout_ms: None,
            reply_timeout_ms: default_reply_timeout_ms(),
        }
    }
}

impl PipelineConfig {
    pub fn handler_timeout(&self) -> Option<Duration> {
        self.handler_timeout_ms.map(Duration::from_millis)
    }

    pub fn reply_timeout(&self) -> Duration {
        Duration::from_millis(self.reply_timeout_ms)
    }
}

/// Help request settings used by the common handlers.
#[derive(Debug, Clone, Deserialize)]
pub struct HelpConfig {
    /// Leftover content that asks for help, e.g. `agent help`.
    #[serde(default = "default_help_command")]
    pub command: String,
    /// Tag attached to help replies.
    #[serde(default = "default_tag_help")]
    pub tag_help: String,
    /// Tag replaced by `tag_help` when help is sent.
    #[serde(default = "default_tag_error")]
    pub tag_error: String,
}

impl Default for HelpConfig {
    fn default() -> Self {
        Self {
            command: default_help_command(),
            tag_help: default_tag_help(),
            tag_error: default_tag_error(),
        }
    }
}

/// Prometheus endpoint settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetricsConfig {
    /// Port for the `/metrics` endpoint. `0` disables it.
    #[serde(default)]
    pub port: u16,
}
