//! Command tree definitions.
//!
//! A [`Command`] is one node of the registry tree. Any node may hold
//! sub-commands, parameters, restrictions and handlers; sub-commands and
//! parameters are never both applied to the same match.
//!
//! Commands are specs: nothing on a node changes after registration, so a
//! registered tree can be shared by any number of concurrent resolutions.

mod params;
mod registry;
mod restriction;

pub use params::{BoundParam, BoundParams, Binding, ParamType, ParamValue, Parameter, bind};
pub use registry::CommandRegistry;
pub use restriction::{Concept, Restriction, check_restrictions};

use crate::error::RegistryError;
use crate::handlers::{Handler, HandlerSet};
use crate::resolve::OutcomeKind;
use regex::Regex;
use std::sync::Arc;

/// How a command's patterns are matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatternType {
    /// Case-insensitive match on the first whitespace-delimited token.
    Word,
    /// Compiled regular expression searched over the whole trimmed text.
    Regex,
}

/// Name of the capture group that marks the remaining content of a REGEX match.
pub const REST_GROUP: &str = "rest";

/// A node in the command tree.
#[derive(Debug, Clone)]
pub struct Command {
    pattern_type: PatternType,
    patterns: Vec<String>,
    description: String,
    parameters: Vec<Parameter>,
    sub_commands: Vec<Command>,
    restrictions: Vec<Restriction>,
    handlers: HandlerSet,
    compiled: Vec<Regex>,
}

/// A successful pattern match against one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PatternMatch<'c> {
    /// The alias (or regex source) that matched.
    pub pattern: &'c str,
    /// Text left over for sub-commands or parameters, already trimmed.
    pub remaining: String,
}

impl Command {
    /// A command matched on its first word by any of `patterns`.
    pub fn word<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(PatternType::Word, patterns)
    }

    /// A command matched by any of the regular expressions in `patterns`.
    pub fn regex<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(PatternType::Regex, patterns)
    }

    fn new<I, S>(pattern_type: PatternType, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            pattern_type,
            patterns: patterns.into_iter().map(Into::into).collect(),
            description: String::new(),
            parameters: Vec::new(),
            sub_commands: Vec::new(),
            restrictions: Vec::new(),
            handlers: HandlerSet::default(),
            compiled: Vec::new(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Append a parameter. Declaration order is binding order.
    pub fn param(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn sub_command(mut self, command: Command) -> Self {
        self.sub_commands.push(command);
        self
    }

    pub fn restriction(mut self, restriction: Restriction) -> Self {
        self.restrictions.push(restriction);
        self
    }

    /// Register the handler invoked for outcomes of `kind`.
    pub fn on(mut self, kind: OutcomeKind, handler: impl Handler + 'static) -> Self {
        self.handlers.set(kind, Arc::new(handler));
        self
    }

    /// Like [`Command::on`], sharing an existing handler.
    pub fn on_shared(mut self, kind: OutcomeKind, handler: Arc<dyn Handler>) -> Self {
        self.handlers.set(kind, handler);
        self
    }

    pub fn pattern_type(&self) -> PatternType {
        self.pattern_type
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// First alias, used for help and sorting.
    pub fn canonical(&self) -> &str {
        self.patterns.first().map(String::as_str).unwrap_or_default()
    }

    pub fn describe(&self) -> &str {
        &self.description
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn sub_commands(&self) -> &[Command] {
        &self.sub_commands
    }

    pub fn restrictions(&self) -> &[Restriction] {
        &self.restrictions
    }

    pub fn handlers(&self) -> &HandlerSet {
        &self.handlers
    }

    pub fn is_composite(&self) -> bool {
        !self.sub_commands.is_empty()
    }

    /// Look up a parameter spec by id.
    pub fn param_by_id(&self, id: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.id == id)
    }

    pub fn param_at(&self, index: usize) -> Option<&Parameter> {
        self.parameters.get(index)
    }

    /// Normalize the tree for matching: lower-case WORD aliases and compile
    /// REGEX patterns, recursively. Any bad pattern rejects the whole tree.
    pub(crate) fn prepare(&mut self) -> Result<(), RegistryError> {
        match self.pattern_type {
            PatternType::Word => {
                for pattern in &mut self.patterns {
                    *pattern = pattern.to_lowercase();
                }
            }
            PatternType::Regex => {
                self.compiled = self
                    .patterns
                    .iter()
                    .map(|pattern| {
                        Regex::new(pattern).map_err(|source| RegistryError::PatternCompile {
                            pattern: pattern.clone(),
                            source,
                        })
                    })
                    .collect::<Result<_, _>>()?;
            }
        }

        for sub in &mut self.sub_commands {
            sub.prepare()?;
        }
        Ok(())
    }

    /// Try this command's patterns against `text`.
    /// The first matching alias wins.
    pub(crate) fn match_text<'c>(&'c self, text: &str) -> Option<PatternMatch<'c>> {
        let text = text.trim();
        match self.pattern_type {
            PatternType::Word => {
                let first = text.split_whitespace().next()?;
                let lowered = first.to_lowercase();
                let pattern = self.patterns.iter().find(|p| **p == lowered)?;
                Some(PatternMatch {
                    pattern,
                    remaining: text[first.len()..].trim().to_string(),
                })
            }
            PatternType::Regex => self
                .compiled
                .iter()
                .zip(&self.patterns)
                .find_map(|(regex, pattern)| {
                    let caps = regex.captures(text)?;
                    let rest = caps
                        .name(REST_GROUP)
                        .or_else(|| caps.get(1))
                        .map(|m| m.as_str().trim().to_string())
                        .unwrap_or_default();
                    Some(PatternMatch {
                        pattern,
                        remaining: rest,
                    })
                }),
        }
    }
}
