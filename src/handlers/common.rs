//! Ready-made handlers for input-related outcomes.
//!
//! These produce the user-facing reply for each expected problem: leftover
//! text (or a help request), wrong parameter types, missing or extra
//! parameters, and restriction denials.

use super::core::{Context, Handler};
use super::help::render_help;
use crate::command::Command;
use crate::config::HelpConfig;
use crate::resolve::{ExtraData, OutcomeKind};
use async_trait::async_trait;
use std::fmt::Write;
use std::sync::Arc;
use tracing::{error, warn};

pub const RESTRICTED_MESSAGE: &str = "Sorry, this action cannot be executed because a restriction";

/// Factory for the common handlers, sharing the help settings.
#[derive(Debug, Clone)]
pub struct CommonHandlers {
    help_command: String,
    tag_help: String,
    tag_error: String,
}

impl Default for CommonHandlers {
    fn default() -> Self {
        Self::from_config(&HelpConfig::default())
    }
}

impl CommonHandlers {
    pub fn from_config(config: &HelpConfig) -> Self {
        Self {
            help_command: config.command.clone(),
            tag_help: config.tag_help.clone(),
            tag_error: config.tag_error.clone(),
        }
    }

    pub fn error(&self, tags: &[&str]) -> ErrorHandler {
        ErrorHandler {
            help_command: self.help_command.clone(),
            tag_help: self.tag_help.clone(),
            tag_error: self.tag_error.clone(),
            tags: owned(tags),
        }
    }

    pub fn wrong_type(&self, tags: &[&str]) -> WrongTypeHandler {
        WrongTypeHandler { tags: owned(tags) }
    }

    pub fn missing(&self, tags: &[&str]) -> MissingParamsHandler {
        MissingParamsHandler { tags: owned(tags) }
    }

    pub fn extra(&self, tags: &[&str]) -> ExtraParamsHandler {
        ExtraParamsHandler { tags: owned(tags) }
    }

    pub fn restricted(&self, tags: &[&str]) -> RestrictedHandler {
        RestrictedHandler { tags: owned(tags) }
    }

    /// Install every common handler on `command` (the node itself, not its
    /// sub-commands), keeping whatever it already has for other kinds.
    pub fn install(&self, command: Command, tags: &[&str]) -> Command {
        command
            .on_shared(OutcomeKind::Error, Arc::new(self.error(tags)))
            .on_shared(OutcomeKind::WrongTypeParam, Arc::new(self.wrong_type(tags)))
            .on_shared(OutcomeKind::MissingParams, Arc::new(self.missing(tags)))
            .on_shared(OutcomeKind::ExtraParams, Arc::new(self.extra(tags)))
            .on_shared(OutcomeKind::Restricted, Arc::new(self.restricted(tags)))
    }
}

fn owned(tags: &[&str]) -> Vec<String> {
    tags.iter().map(|t| t.to_string()).collect()
}

/// Leftover content: sends help when the content is the help command,
/// otherwise the "not understood" reply.
#[derive(Debug, Clone)]
pub struct ErrorHandler {
    help_command: String,
    tag_help: String,
    tag_error: String,
    tags: Vec<String>,
}

#[async_trait]
impl Handler for ErrorHandler {
    async fn handle(&self, ctx: &Context<'_>) {
        if ctx.content != self.help_command {
            ctx.outputs
                .dont_understand(ctx.content, &self.tags, ctx.input)
                .await;
            return;
        }

        let mut tags: Vec<&str> = self
            .tags
            .iter()
            .map(String::as_str)
            .filter(|t| *t != self.tag_error)
            .collect();
        tags.push(&self.tag_help);

        let text = format!(
            "`{} {}:`\n{}",
            ctx.command.canonical(),
            self.tag_help,
            render_help(ctx.command, &self.tag_help)
        );
        ctx.reply_tagged(&text, &tags).await;
    }
}

#[derive(Debug, Clone)]
pub struct WrongTypeHandler {
    tags: Vec<String>,
}

#[async_trait]
impl Handler for WrongTypeHandler {
    async fn handle(&self, ctx: &Context<'_>) {
        let mut text = String::from("Incorrect parameter's type");
        match ctx.extra {
            ExtraData::WrongType(pv) => {
                let _ = write!(
                    text,
                    ":\nparameter: '{}'\nvalue: {}\nexpected type: {}",
                    pv.param.id, pv.value, pv.param.param_type
                );
            }
            other => error!(extra = ?other, "Unexpected payload for wrong-type outcome"),
        }
        ctx.reply_tagged(&text, &self.tags).await;
    }
}

#[derive(Debug, Clone)]
pub struct MissingParamsHandler {
    tags: Vec<String>,
}

#[async_trait]
impl Handler for MissingParamsHandler {
    async fn handle(&self, ctx: &Context<'_>) {
        let mut text = String::from("Missing parameters");
        match ctx.extra {
            ExtraData::Missing(params) => {
                text.push(':');
                for param in params {
                    let _ = write!(
                        text,
                        "\nparameter: '{}'\nexpected type: {}",
                        param.id, param.param_type
                    );
                }
            }
            other => error!(extra = ?other, "Unexpected payload for missing-params outcome"),
        }
        ctx.reply_tagged(&text, &self.tags).await;
    }
}

#[derive(Debug, Clone)]
pub struct ExtraParamsHandler {
    tags: Vec<String>,
}

#[async_trait]
impl Handler for ExtraParamsHandler {
    async fn handle(&self, ctx: &Context<'_>) {
        let mut text = String::from("There are some extra parameters, I don't know what to do with them");
        match ctx.extra {
            ExtraData::Extra(values) => {
                text.push(':');
                for value in values {
                    let _ = write!(text, "\nvalue: {value}");
                }
            }
            other => error!(extra = ?other, "Unexpected payload for extra-params outcome"),
        }
        ctx.reply_tagged(&text, &self.tags).await;
    }
}

/// Logs the denial and sends a generic refusal; the explanation itself is
/// not shown to the user.
#[derive(Debug, Clone)]
pub struct RestrictedHandler {
    tags: Vec<String>,
}

#[async_trait]
impl Handler for RestrictedHandler {
    async fn handle(&self, ctx: &Context<'_>) {
        if let ExtraData::Restriction(explanation) = ctx.extra {
            warn!(
                command = %ctx.command.canonical(),
                origin = %ctx.origin,
                explanation = %explanation,
                "Command denied by restriction"
            );
        }
        ctx.reply_tagged(RESTRICTED_MESSAGE, &self.tags).await;
    }
}
