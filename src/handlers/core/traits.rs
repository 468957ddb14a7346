//! Handler trait and per-command handler table.
//!
//! Each command maps every [`OutcomeKind`] to at most one handler. A kind
//! with no handler is a no-op: handlers are optional.

use super::context::Context;
use crate::resolve::OutcomeKind;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// A command handler.
///
/// Handlers produce side effects only, usually by replying through
/// `ctx.outputs`. Anything left to validate about bound parameters is the
/// handler's job.
///
/// # Example
///
/// ```ignore
/// pub struct VersionHandler;
///
/// #[async_trait]
/// impl Handler for VersionHandler {
///     async fn handle(&self, ctx: &Context<'_>) {
///         ctx.reply_tagged("Agent XYZ version 1", &["version"]).await;
///     }
/// }
/// ```
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, ctx: &Context<'_>);
}

/// Handlers of one command, indexed by outcome kind.
#[derive(Clone, Default)]
pub struct HandlerSet {
    slots: [Option<Arc<dyn Handler>>; OutcomeKind::COUNT],
}

impl HandlerSet {
    pub fn set(&mut self, kind: OutcomeKind, handler: Arc<dyn Handler>) {
        self.slots[kind.index()] = Some(handler);
    }

    pub fn get(&self, kind: OutcomeKind) -> Option<&Arc<dyn Handler>> {
        self.slots[kind.index()].as_ref()
    }

    pub fn contains(&self, kind: OutcomeKind) -> bool {
        self.get(kind).is_some()
    }
}

impl fmt::Debug for HandlerSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set()
            .entries(OutcomeKind::ALL.iter().filter(|k| self.contains(**k)))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Noop;

    #[async_trait]
    impl Handler for Noop {
        async fn handle(&self, _ctx: &Context<'_>) {}
    }

    #[test]
    fn test_slots_are_independent() {
        let mut set = HandlerSet::default();
        set.set(OutcomeKind::MissingParams, Arc::new(Noop));
        assert!(set.contains(OutcomeKind::MissingParams));
        assert!(!set.contains(OutcomeKind::Default));
        assert_eq!(format!("{set:?}"), "{MissingParams}");
    }
}
