//! Positional parameter binding.
//!
//! Binding never touches the [`Parameter`] specs on the command tree. Each
//! call produces its own [`BoundParams`], keyed by parameter id.

use std::fmt;
use std::num::ParseIntError;

/// Declared type of a parameter value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ParamType {
    /// No type declared; any word is accepted.
    #[default]
    Unset,
    String,
    /// Base-10 integer.
    Integer,
}

impl ParamType {
    pub fn accepts(self, value: &str) -> bool {
        match self {
            Self::Unset | Self::String => true,
            Self::Integer => value.parse::<i64>().is_ok(),
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unset | Self::String => f.write_str("string"),
            Self::Integer => f.write_str("int"),
        }
    }
}

/// Parameter spec declared on a command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parameter {
    pub id: String,
    pub description: String,
    pub param_type: ParamType,
    pub required: bool,
}

impl Parameter {
    pub fn new(id: impl Into<String>, param_type: ParamType) -> Self {
        Self {
            id: id.into(),
            param_type,
            ..Self::default()
        }
    }

    pub fn string(id: impl Into<String>) -> Self {
        Self::new(id, ParamType::String)
    }

    pub fn integer(id: impl Into<String>) -> Self {
        Self::new(id, ParamType::Integer)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// A parameter spec together with the word offered for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamValue {
    pub param: Parameter,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundParam {
    pub id: String,
    pub value: String,
}

/// Values bound during one resolution, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoundParams {
    values: Vec<BoundParam>,
}

impl BoundParams {
    pub fn get(&self, id: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|b| b.id == id)
            .map(|b| b.value.as_str())
    }

    /// Integer value of `id`, `None` if it was not supplied.
    pub fn get_int(&self, id: &str) -> Option<Result<i64, ParseIntError>> {
        self.get(id).map(str::parse)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BoundParam> {
        self.values.iter()
    }

    fn push(&mut self, id: &str, value: &str) {
        self.values.push(BoundParam {
            id: id.to_string(),
            value: value.to_string(),
        });
    }
}

/// Result of binding words to a command's parameter specs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    /// Every supplied word was bound; may be empty when no words were given.
    Bound(BoundParams),
    /// A word failed its parameter's type check.
    WrongType(ParamValue),
    /// A required parameter had no word.
    Missing(Parameter),
    /// More words than declared parameters; holds the unconsumed words.
    Extra(Vec<String>),
}

/// Bind `words` to `params` left to right.
///
/// The first type mismatch or missing required parameter stops binding.
/// Surplus words are reported only after every declared parameter passed.
pub fn bind(params: &[Parameter], words: &[&str]) -> Binding {
    let mut bound = BoundParams::default();

    for (index, param) in params.iter().enumerate() {
        match words.get(index) {
            Some(word) => {
                if !param.param_type.accepts(word) {
                    return Binding::WrongType(ParamValue {
                        param: param.clone(),
                        value: (*word).to_string(),
                    });
                }
                bound.push(&param.id, word);
            }
            None if param.required => return Binding::Missing(param.clone()),
            None => {}
        }
    }

    if words.len() > params.len() {
        return Binding::Extra(words[params.len()..].iter().map(|w| w.to_string()).collect());
    }

    Binding::Bound(bound)
}
