//! Unified error handling for cmdagent.
//!
//! Only registration-time and concurrency-control problems are faults.
//! Restriction denials and parameter problems are expected outcomes and
//! travel as data inside a [`Resolution`](crate::resolve::Resolution).

use thiserror::Error;

// ============================================================================
// Registry Errors (command registration)
// ============================================================================

/// Errors returned by [`CommandRegistry::add_command`](crate::command::CommandRegistry::add_command).
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("invalid pattern '{pattern}': {source}")]
    PatternCompile {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

impl RegistryError {
    /// Get a static error code string for metrics labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::PatternCompile { .. } => "pattern_compile",
        }
    }
}

// ============================================================================
// Resolve Errors
// ============================================================================

/// No registered command matched the input at the top level.
///
/// There is no command to route this to, so the pipeline reports it through
/// its event collector instead of invoking a handler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("no commands for '{0}'")]
    NoCommandMatch(String),
}

impl ResolveError {
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NoCommandMatch(_) => "no_command_match",
        }
    }
}

// ============================================================================
// Pipeline Errors (listening, ingestion)
// ============================================================================

/// Errors raised by the concurrent pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    /// A listening loop is already running on this agent.
    #[error("agent is already listening")]
    AlreadyListening,

    /// The ingestion queue is full and the overflow policy is `reject`.
    #[error("ingestion queue is full")]
    QueueFull,

    /// The pipeline is draining or stopped and accepts no new input.
    #[error("ingestion queue is closed")]
    Closed,
}

impl PipelineError {
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::AlreadyListening => "already_listening",
            Self::QueueFull => "queue_full",
            Self::Closed => "closed",
        }
    }
}

// ============================================================================
// Output Errors (sink delivery)
// ============================================================================

/// Errors returned by an [`Output`](crate::io::Output) sink.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OutputError {
    #[error("delivery failed: {0}")]
    Delivery(String),

    /// The entry carries no reply channel to answer on.
    #[error("input context has no reply channel")]
    MissingReplyChannel,

    /// The requester stopped waiting (timed out) or already got its answer.
    #[error("reply channel closed")]
    ReplyClosed,
}

impl OutputError {
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Delivery(_) => "delivery",
            Self::MissingReplyChannel => "missing_reply_channel",
            Self::ReplyClosed => "reply_closed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(PipelineError::AlreadyListening.error_code(), "already_listening");
        assert_eq!(PipelineError::QueueFull.error_code(), "queue_full");
        assert_eq!(
            ResolveError::NoCommandMatch("x".into()).error_code(),
            "no_command_match"
        );
        assert_eq!(OutputError::ReplyClosed.error_code(), "reply_closed");
    }

    #[test]
    fn test_pattern_compile_message_names_pattern() {
        let source = regex::Regex::new("(unclosed").unwrap_err();
        let err = RegistryError::PatternCompile {
            pattern: "(unclosed".into(),
            source,
        };
        assert!(err.to_string().starts_with("invalid pattern '(unclosed'"));
        assert_eq!(err.error_code(), "pattern_compile");
    }

    #[test]
    fn test_no_command_match_display() {
        let err = ResolveError::NoCommandMatch("dance".into());
        assert_eq!(err.to_string(), "no commands for 'dance'");
    }
}
