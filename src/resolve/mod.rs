//! Command resolution.
//!
//! Walks the command tree against the input text and classifies the result
//! into exactly one [`Resolution`]. The first registered command whose
//! pattern matches wins; there is no scoring and no backtracking.
//!
//! Per matched level:
//! 1. restrictions are checked against the general context,
//! 2. composites recurse into their sub-commands; a sub-level miss falls
//!    back to this level's remaining content without binding parameters,
//! 3. leaves with parameters bind the remaining words,
//! 4. otherwise the outcome is `Default` (nothing left) or `Error`.

mod outcome;

pub use outcome::{ExtraData, OutcomeKind, Resolution};

use crate::command::{Binding, Command, PatternMatch, bind, check_restrictions};
use crate::error::ResolveError;
use crate::io::Metadata;
use tracing::trace;

/// Resolve `text` against `commands`.
///
/// Fails with [`ResolveError::NoCommandMatch`] when the text is blank or no
/// command at this level matches.
pub fn resolve<'r>(
    commands: &'r [Command],
    text: &str,
    general: &Metadata,
) -> Result<Resolution<'r>, ResolveError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ResolveError::NoCommandMatch(String::new()));
    }

    commands
        .iter()
        .find_map(|command| command.match_text(text).map(|m| (command, m)))
        .map(|(command, m)| resolve_matched(command, m, general))
        .ok_or_else(|| ResolveError::NoCommandMatch(text.to_string()))
}

fn resolve_matched<'r>(
    command: &'r Command,
    matched: PatternMatch<'r>,
    general: &Metadata,
) -> Resolution<'r> {
    let PatternMatch { pattern, remaining } = matched;
    trace!(command = %command.canonical(), pattern, remaining = %remaining, "Pattern matched");

    if let Err(explanation) = check_restrictions(command.restrictions(), general) {
        return Resolution::new(command, pattern, OutcomeKind::Restricted, remaining)
            .with_extra(ExtraData::Restriction(explanation));
    }

    if command.is_composite() {
        match resolve(command.sub_commands(), &remaining, general) {
            Ok(resolution) => return resolution,
            Err(e) => {
                trace!(command = %command.canonical(), reason = %e, "No sub-command matched");
            }
        }
    } else if !command.parameters().is_empty() {
        let words: Vec<&str> = remaining.split_whitespace().collect();
        match bind(command.parameters(), &words) {
            Binding::Bound(bound) if !bound.is_empty() => {
                return Resolution::new(command, pattern, OutcomeKind::Params, remaining)
                    .with_bound(bound);
            }
            Binding::Bound(_) => {}
            Binding::WrongType(value) => {
                return Resolution::new(command, pattern, OutcomeKind::WrongTypeParam, remaining)
                    .with_extra(ExtraData::WrongType(value));
            }
            Binding::Missing(param) => {
                return Resolution::new(command, pattern, OutcomeKind::MissingParams, remaining)
                    .with_extra(ExtraData::Missing(vec![param]));
            }
            Binding::Extra(words) => {
                return Resolution::new(command, pattern, OutcomeKind::ExtraParams, remaining)
                    .with_extra(ExtraData::Extra(words));
            }
        }
    }

    let kind = if remaining.is_empty() {
        OutcomeKind::Default
    } else {
        OutcomeKind::Error
    };
    Resolution::new(command, pattern, kind, remaining)
}
