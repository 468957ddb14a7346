//! Top-level command registry.
//!
//! Registration is copy-on-write: resolutions work on an immutable
//! [`snapshot`](CommandRegistry::snapshot), so adding a command while
//! workers are resolving never exposes a half-built list.

use super::Command;
use crate::error::RegistryError;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{info, warn};

/// Ordered list of top-level commands. Registration order is match priority.
#[derive(Debug, Default)]
pub struct CommandRegistry {
    commands: RwLock<Arc<Vec<Command>>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and append a top-level command.
    ///
    /// WORD aliases are lower-cased and REGEX patterns compiled for the whole
    /// tree. On error nothing is registered.
    pub fn add_command(&self, mut command: Command) -> Result<(), RegistryError> {
        if let Err(e) = command.prepare() {
            warn!(command = %command.canonical(), error = %e, "Command rejected");
            return Err(e);
        }

        info!(
            command = %command.canonical(),
            aliases = command.patterns().len(),
            sub_commands = command.sub_commands().len(),
            "Command registered"
        );

        let mut guard = self.commands.write();
        Arc::make_mut(&mut *guard).push(command);
        Ok(())
    }

    /// Current command list. Cheap; later registrations do not affect it.
    pub fn snapshot(&self) -> Arc<Vec<Command>> {
        Arc::clone(&self.commands.read())
    }

    pub fn len(&self) -> usize {
        self.commands.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registration_order_preserved() {
        let registry = CommandRegistry::new();
        registry.add_command(Command::word(["first"])).unwrap();
        registry.add_command(Command::word(["second"])).unwrap();
        let snapshot = registry.snapshot();
        let names: Vec<_> = snapshot.iter().map(Command::canonical).collect();
        assert_eq!(names, ["first", "second"]);
    }

    #[test]
    fn test_bad_regex_is_not_registered() {
        let registry = CommandRegistry::new();
        let err = registry
            .add_command(Command::regex(["^ok$", "([unclosed"]))
            .unwrap_err();
        assert_eq!(err.error_code(), "pattern_compile");
        assert!(registry.is_empty());
    }

    #[test]
    fn test_snapshot_is_isolated_from_later_registration() {
        let registry = CommandRegistry::new();
        registry.add_command(Command::word(["one"])).unwrap();
        let before = registry.snapshot();
        registry.add_command(Command::word(["two"])).unwrap();
        assert_eq!(before.len(), 1);
        assert_eq!(registry.len(), 2);
    }
}
