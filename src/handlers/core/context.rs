//! Handler context.
//!
//! Defines the `Context<'a>` struct passed to every handler. It borrows the
//! resolution and the input entry for the duration of one handler call.

use crate::command::{BoundParams, Command};
use crate::io::{Delivery, InputContext, InputEntry, Metadata, Outputs, tags_metadata};
use crate::resolve::{ExtraData, OutcomeKind, Resolution};
use uuid::Uuid;

/// Handler context passed to each command handler.
pub struct Context<'a> {
    /// The command that matched.
    pub command: &'a Command,
    /// Exact alias (or regex source) that matched.
    pub pattern: &'a str,
    /// Content after the matched token.
    pub content: &'a str,
    /// Outcome payload (bad parameter, missing parameters, ...).
    pub extra: &'a ExtraData,
    pub kind: OutcomeKind,
    /// Values bound to the command's parameters for this message.
    pub params: &'a BoundParams,
    /// Metadata exactly as it came from the origin.
    pub input: &'a InputContext,
    /// Normalized metadata (user, where, thread).
    pub general: &'a Metadata,
    /// Every registered sink.
    pub outputs: &'a Outputs,
    /// Correlation id of the entry being handled.
    pub entry_id: Uuid,
    pub origin: &'a str,
}

impl<'a> Context<'a> {
    pub fn new(resolution: &'a Resolution<'a>, entry: &'a InputEntry, outputs: &'a Outputs) -> Self {
        Self {
            command: resolution.command,
            pattern: &resolution.matched_pattern,
            content: &resolution.remaining,
            extra: &resolution.extra,
            kind: resolution.kind,
            params: &resolution.bound,
            input: &entry.input,
            general: &entry.general,
            outputs,
            entry_id: entry.id,
            origin: &entry.origin,
        }
    }

    /// Send `text` to every sink.
    #[inline]
    pub async fn reply(&self, text: &str) -> Delivery {
        self.outputs.broadcast(text, self.input, &Metadata::new()).await
    }

    /// Send `text` to every sink, tagged.
    pub async fn reply_tagged<S: AsRef<str>>(&self, text: &str, tags: &[S]) -> Delivery {
        self.outputs
            .broadcast(text, self.input, &tags_metadata(tags))
            .await
    }

    pub async fn reply_framed<S: AsRef<str>>(&self, text: &str, tags: &[S]) -> Delivery {
        self.outputs
            .broadcast_framed(text, self.input, &tags_metadata(tags))
            .await
    }
}
