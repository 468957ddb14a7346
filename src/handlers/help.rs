//! Help text rendering.

use crate::command::Command;
use std::fmt::Write;

/// Aliases of a command joined for display, e.g. `agent / @agent`.
pub fn joined_patterns(command: &Command) -> String {
    command.patterns().join(" / ")
}

/// Render the help listing for `command`.
///
/// Composites list their sub-commands sorted by canonical alias, preceded
/// by a line describing `help_tag`. Leaves describe themselves. Every entry
/// lists its parameters with type, required/optional and description.
pub fn render_help(command: &Command, help_tag: &str) -> String {
    let mut entries: Vec<&Command> = if command.is_composite() {
        command.sub_commands().iter().collect()
    } else {
        vec![command]
    };
    entries.sort_by(|a, b| a.canonical().cmp(b.canonical()));

    let labels: Vec<String> = entries.iter().map(|c| joined_patterns(c)).collect();
    let width = labels.iter().map(String::len).max().unwrap_or(0);

    let mut out = String::new();
    if command.is_composite() {
        let _ = write!(
            out,
            "\n\t{help_tag:<width$}\t\tAdd {help_tag} after any command to list its subcommands and description"
        );
    }

    for (entry, label) in entries.iter().zip(&labels) {
        let _ = write!(out, "\n\t{label:<width$}\t\t{}", entry.describe());
        for param in entry.parameters() {
            let requirement = if param.required { "required" } else { "optional" };
            let _ = write!(
                out,
                "\n{:width$}\t\t\t {} ({} - {}) ==> {}",
                "", param.id, param.param_type, requirement, param.description
            );
        }
    }
    out
}
