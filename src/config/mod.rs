//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: Config struct definitions and loading
//! - [`defaults`]: serde default value functions
//! - [`validation`]: startup checks returning every problem found

mod defaults;
mod types;
mod validation;

pub use types::{
    AgentConfig, Config, ConfigError, HelpConfig, MetricsConfig, OverflowPolicy, PipelineConfig,
};
pub use validation::{ValidationError, validate};
