//! Shared deterministic types for the configuration engine.
//!
//! These types define the contracts between the resolver, the session and the
//! composer. They carry no I/O and compare by value so snapshots can be checked
//! for equality in tests.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Top-level answer naming the working directory.
pub const FIELD_FOLDER: &str = "folder";
/// Top-level answer naming the pipeline phase.
pub const FIELD_PHASE: &str = "phase";
/// Top-level answer naming the module to configure next.
pub const FIELD_MODULE: &str = "module";
/// Pseudo-field of the terminal save question.
pub const FIELD_SAVE: &str = "save";
/// Argument injected ahead of every analyse-phase module's own arguments.
pub const ELEMENTS_IN: &str = "elements_in";
/// Reserved module name used for composed documents. Never selectable.
pub const META_MODULE: &str = "meta";

/// Pipeline stage a workflow document targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Select,
    Analyse,
}

impl Phase {
    pub const ALL: [Phase; 2] = [Phase::Select, Phase::Analyse];

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Select => "select",
            Phase::Analyse => "analyse",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Phase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "select" => Ok(Phase::Select),
            "analyse" => Ok(Phase::Analyse),
            other => Err(format!("unknown phase '{other}' (expected select or analyse)")),
        }
    }
}

/// Declared input type of a module argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArgType {
    String,
    Folder,
    Date,
    Int,
    Whitelist,
    Bool,
}

impl ArgType {
    pub fn as_str(self) -> &'static str {
        match self {
            ArgType::String => "string",
            ArgType::Folder => "folder",
            ArgType::Date => "date",
            ArgType::Int => "int",
            ArgType::Whitelist => "whitelist",
            ArgType::Bool => "bool",
        }
    }
}

impl fmt::Display for ArgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One argument descriptor from a module's schema file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arg {
    pub name: String,
    #[serde(rename = "input")]
    pub arg_type: ArgType,
    pub required: bool,
}

impl Arg {
    pub fn new(name: impl Into<String>, arg_type: ArgType, required: bool) -> Self {
        Self {
            name: name.into(),
            arg_type,
            required,
        }
    }
}

/// A validated, coerced answer.
///
/// Variant order matters for untagged deserialization: `true` must not be read
/// back as text, nor `12` as text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Int(i64),
    Text(String),
    List(Vec<String>),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(value) => Some(value),
            _ => None,
        }
    }

    /// Whether this value has the shape produced by validating `arg_type`.
    pub fn matches(&self, arg_type: ArgType) -> bool {
        match (self, arg_type) {
            (FieldValue::Int(_), ArgType::Int) => true,
            (FieldValue::Bool(_), ArgType::Bool) => true,
            (FieldValue::List(_), ArgType::Whitelist) => true,
            (FieldValue::Text(_), ArgType::String | ArgType::Folder | ArgType::Date) => true,
            _ => false,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Bool(value) => write!(f, "{value}"),
            FieldValue::Int(value) => write!(f, "{value}"),
            FieldValue::Text(value) => write!(f, "{value}"),
            FieldValue::List(values) => write!(f, "[{}]", values.join(", ")),
        }
    }
}

/// Answers for one module, keyed by argument name.
pub type FieldMap = BTreeMap<String, FieldValue>;

/// The next question the engine wants answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Question {
    /// Pick one of a fixed, ordered list of values.
    Choice { field: String, options: Vec<String> },
    /// Free text, validated against `arg_type` before it is accepted.
    TextInput {
        field: String,
        prompt: String,
        arg_type: ArgType,
    },
    /// Terminal step. `composable` permits adding another module instead of saving.
    Save { composable: bool },
}

impl Question {
    /// Field name an answer to this question is recorded under.
    pub fn field(&self) -> &str {
        match self {
            Question::Choice { field, .. } | Question::TextInput { field, .. } => field,
            Question::Save { .. } => FIELD_SAVE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_parses_both_values_only() {
        assert_eq!("select".parse::<Phase>(), Ok(Phase::Select));
        assert_eq!("analyse".parse::<Phase>(), Ok(Phase::Analyse));
        let err = "analyze".parse::<Phase>().expect_err("unknown phase");
        assert!(err.contains("analyze"));
    }

    #[test]
    fn arg_reads_input_key_from_yaml() {
        let args: Vec<Arg> =
            serde_yaml::from_str("- name: path\n  input: folder\n  required: true\n")
                .expect("parse args");
        assert_eq!(args, vec![Arg::new("path", ArgType::Folder, true)]);
    }

    #[test]
    fn field_value_deserializes_to_narrowest_variant() {
        let values: Vec<FieldValue> =
            serde_yaml::from_str("[true, 12, hello, [a, b]]").expect("parse values");
        assert_eq!(
            values,
            vec![
                FieldValue::Bool(true),
                FieldValue::Int(12),
                FieldValue::text("hello"),
                FieldValue::List(vec!["a".to_string(), "b".to_string()]),
            ]
        );
    }

    #[test]
    fn save_question_uses_save_field() {
        assert_eq!(Question::Save { composable: false }.field(), FIELD_SAVE);
    }
}
