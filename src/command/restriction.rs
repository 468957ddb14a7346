//! Access restrictions evaluated against the general context.

use crate::io::Metadata;
use serde_json::Value;
use std::fmt;

/// How a restriction treats its value list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Concept {
    /// Passes only when the field's value is listed.
    Include,
    /// Passes unless the field's value is listed.
    Exclude,
}

impl fmt::Display for Concept {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Include => f.write_str("include"),
            Self::Exclude => f.write_str("exclude"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Restriction {
    pub id: String,
    pub concept: Concept,
    /// Key into the general context.
    pub field: String,
    pub values: Vec<Value>,
}

impl Restriction {
    pub fn include<I, V>(id: impl Into<String>, field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::new(id, Concept::Include, field, values)
    }

    pub fn exclude<I, V>(id: impl Into<String>, field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::new(id, Concept::Exclude, field, values)
    }

    pub fn new<I, V>(id: impl Into<String>, concept: Concept, field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self {
            id: id.into(),
            concept,
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Check this restriction, returning the denial message on failure.
    ///
    /// A field missing from `context` always denies.
    pub fn check(&self, context: &Metadata) -> Result<(), String> {
        let Some(current) = context.get(&self.field) else {
            return Err(format!(
                "Missing context field '{}'. Restriction '{}' cannot be checked.",
                self.field, self.id
            ));
        };

        let listed = self.values.contains(current);
        let passes = match self.concept {
            Concept::Include => listed,
            Concept::Exclude => !listed,
        };

        if passes {
            Ok(())
        } else {
            Err(format!(
                "Context['{}'] does not meet restriction '{}' with concept '{}'.\nCurrent value: {}",
                self.field, self.id, self.concept, current
            ))
        }
    }
}

/// Evaluate `restrictions` in order; the first failure short-circuits.
pub fn check_restrictions(restrictions: &[Restriction], context: &Metadata) -> Result<(), String> {
    restrictions.iter().try_for_each(|r| r.check(context))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::{FIELD_USER_ID, FIELD_WHERE};

    fn context(user: &str) -> Metadata {
        Metadata::from([(FIELD_USER_ID.to_string(), Value::from(user))])
    }

    #[test]
    fn test_include() {
        let r = Restriction::include("admins", FIELD_USER_ID, ["alice", "bob"]);
        assert!(r.check(&context("alice")).is_ok());
        let msg = r.check(&context("mallory")).unwrap_err();
        assert!(msg.contains("'admins'"));
        assert!(msg.contains("include"));
        assert!(msg.contains("\"mallory\""));
    }

    #[test]
    fn test_exclude() {
        let r = Restriction::exclude("banned", FIELD_USER_ID, ["mallory"]);
        assert!(r.check(&context("alice")).is_ok());
        assert!(r.check(&context("mallory")).is_err());
    }

    #[test]
    fn test_missing_field_fails_closed() {
        let include = Restriction::include("room", FIELD_WHERE, ["ops"]);
        let exclude = Restriction::exclude("not-lobby", FIELD_WHERE, ["lobby"]);
        let ctx = context("alice");
        assert!(include.check(&ctx).unwrap_err().contains("Missing context field 'where'"));
        assert!(exclude.check(&ctx).is_err());
    }

    #[test]
    fn test_values_compare_by_type() {
        let r = Restriction::include("team", "team_id", [7]);
        let numeric = Metadata::from([("team_id".to_string(), Value::from(7))]);
        let textual = Metadata::from([("team_id".to_string(), Value::from("7"))]);
        assert!(r.check(&numeric).is_ok());
        assert!(r.check(&textual).is_err());
    }

    #[test]
    fn test_first_failure_short_circuits() {
        let restrictions = vec![
            Restriction::exclude("first", FIELD_USER_ID, ["mallory"]),
            Restriction::include("second", FIELD_WHERE, ["ops"]),
        ];
        let msg = check_restrictions(&restrictions, &context("mallory")).unwrap_err();
        assert!(msg.contains("'first'"));
        assert!(check_restrictions(&[], &context("anyone")).is_ok());
    }
}
