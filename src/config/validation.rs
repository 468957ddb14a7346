//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::Config;
use thiserror::Error;

/// Validation errors for configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("agent.name is required")]
    MissingAgentName,
    #[error("pipeline.workers must be at least 1")]
    NoWorkers,
    #[error("pipeline.queue_capacity must be at least 1")]
    NoQueueCapacity,
    #[error("pipeline.handler_timeout_ms must be greater than 0")]
    ZeroHandlerTimeout,
    #[error("pipeline.reply_timeout_ms must be greater than 0")]
    ZeroReplyTimeout,
    #[error("help.command is required")]
    MissingHelpCommand,
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.agent.name.trim().is_empty() {
        errors.push(ValidationError::MissingAgentName);
    }

    let pipeline = &config.pipeline;
    if pipeline.workers == 0 {
        errors.push(ValidationError::NoWorkers);
    }
    if pipeline.queue_capacity == 0 {
        errors.push(ValidationError::NoQueueCapacity);
    }
    if pipeline.handler_timeout_ms == Some(0) {
        errors.push(ValidationError::ZeroHandlerTimeout);
    }
    if pipeline.reply_timeout_ms == 0 {
        errors.push(ValidationError::ZeroReplyTimeout);
    }

    if config.help.command.trim().is_empty() {
        errors.push(ValidationError::MissingHelpCommand);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_valid_config() -> String {
        r#"
[agent]
name = "xyz"

[pipeline]
workers = 2
queue_capacity = 16
"#
        .to_string()
    }

    #[test]
    fn test_valid_config_passes() {
        let config: Config = toml::from_str(&minimal_valid_config()).unwrap();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_defaults_pass() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_empty_agent_name_fails() {
        let toml = r#"
[agent]
name = "  "
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let errors = validate(&config).unwrap_err();
        assert!(errors.iter().any(|e| matches!(e, ValidationError::MissingAgentName)));
    }

    #[test]
    fn test_zero_sizes_report_every_error() {
        let toml = r#"
[pipeline]
workers = 0
queue_capacity = 0
handler_timeout_ms = 0
reply_timeout_ms = 0

[help]
command = ""
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let errors = validate(&config).unwrap_err();
        assert_eq!(errors.len(), 5);
        assert!(errors.iter().any(|e| matches!(e, ValidationError::NoWorkers)));
        assert!(errors.iter().any(|e| matches!(e, ValidationError::NoQueueCapacity)));
        assert!(errors.iter().any(|e| matches!(e, ValidationError::ZeroHandlerTimeout)));
        assert!(errors.iter().any(|e| matches!(e, ValidationError::ZeroReplyTimeout)));
        assert!(errors.iter().any(|e| matches!(e, ValidationError::MissingHelpCommand)));
    }
}
