//! Default value functions for configuration.
//!
//! Separated into its own module for clarity and reuse.

// =============================================================================
// Agent Defaults
// =============================================================================

pub fn default_agent_name() -> String {
    "agent".to_string()
}

// =============================================================================
// Pipeline Defaults
// =============================================================================

pub fn default_workers() -> usize {
    10
}

pub fn default_queue_capacity() -> usize {
    500
}

pub fn default_reply_timeout_ms() -> u64 {
    5000
}

// =============================================================================
// Help Defaults
// =============================================================================

pub fn default_help_command() -> String {
    "help".to_string()
}

pub fn default_tag_help() -> String {
    "help".to_string()
}

pub fn default_tag_error() -> String {
    "error".to_string()
}
