//! Resolution outcome model.

use crate::command::{BoundParams, Command, ParamValue, Parameter};
use std::fmt;

/// Discriminator selecting which handler a resolved message routes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutcomeKind {
    /// Clean match with nothing left over.
    Default,
    /// Matched, but leftover content had nothing to consume it.
    Error,
    /// A restriction denied the matched command.
    Restricted,
    /// At least one parameter was bound.
    Params,
    WrongTypeParam,
    MissingParams,
    ExtraParams,
}

impl OutcomeKind {
    pub const COUNT: usize = 7;

    pub const ALL: [OutcomeKind; Self::COUNT] = [
        Self::Default,
        Self::Error,
        Self::Restricted,
        Self::Params,
        Self::WrongTypeParam,
        Self::MissingParams,
        Self::ExtraParams,
    ];

    #[inline]
    pub(crate) fn index(self) -> usize {
        self as usize
    }

    /// Static label for logs and metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Error => "error",
            Self::Restricted => "restricted",
            Self::Params => "params",
            Self::WrongTypeParam => "params_wrong_type",
            Self::MissingParams => "params_missing",
            Self::ExtraParams => "params_extra",
        }
    }
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload attached to an outcome. Closed set of shapes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ExtraData {
    #[default]
    None,
    /// Explanation of the denying restriction.
    Restriction(String),
    /// The parameter whose value failed its type check.
    WrongType(ParamValue),
    Missing(Vec<Parameter>),
    /// Words left after every declared parameter was bound.
    Extra(Vec<String>),
}

/// The single outcome of resolving one message.
///
/// Borrows the matched command from the registry snapshot it was resolved
/// against; bound values live here, never on the command.
#[derive(Debug, Clone)]
pub struct Resolution<'r> {
    pub command: &'r Command,
    pub matched_pattern: String,
    pub kind: OutcomeKind,
    /// Text after the matched token at the level that produced this outcome.
    pub remaining: String,
    pub extra: ExtraData,
    pub bound: BoundParams,
}

impl<'r> Resolution<'r> {
    pub(crate) fn new(
        command: &'r Command,
        matched_pattern: &str,
        kind: OutcomeKind,
        remaining: String,
    ) -> Self {
        Self {
            command,
            matched_pattern: matched_pattern.to_string(),
            kind,
            remaining,
            extra: ExtraData::None,
            bound: BoundParams::default(),
        }
    }

    pub(crate) fn with_extra(mut self, extra: ExtraData) -> Self {
        self.extra = extra;
        self
    }

    pub(crate) fn with_bound(mut self, bound: BoundParams) -> Self {
        self.bound = bound;
        self
    }
}

/// Same command node (by identity) and same outcome data.
impl PartialEq for Resolution<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.command, other.command)
            && self.matched_pattern == other.matched_pattern
            && self.kind == other.kind
            && self.remaining == other.remaining
            && self.extra == other.extra
            && self.bound == other.bound
    }
}
