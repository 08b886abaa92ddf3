//! Session snapshots.
//!
//! `Answers` is what the user has told us so far. `SessionState` pairs it with
//! the question derived from it; the only way to build one is through the
//! resolver, so a stored question can never drift from its answers.

use anyhow::Result;

use crate::core::resolver::next_question;
use crate::core::schema::SchemaProvider;
use crate::core::types::{FieldMap, Phase, Question};

/// Per-module answers, kept in the order modules were first selected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleConfigs {
    entries: Vec<(String, FieldMap)>,
}

impl ModuleConfigs {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, module: &str) -> bool {
        self.get(module).is_some()
    }

    pub fn get(&self, module: &str) -> Option<&FieldMap> {
        self.entries
            .iter()
            .find(|(name, _)| name == module)
            .map(|(_, fields)| fields)
    }

    pub fn get_mut(&mut self, module: &str) -> Option<&mut FieldMap> {
        self.entries
            .iter_mut()
            .find(|(name, _)| name == module)
            .map(|(_, fields)| fields)
    }

    /// Insert or replace a module's fields. A replaced module keeps its position.
    pub fn insert(&mut self, module: impl Into<String>, fields: FieldMap) {
        let module = module.into();
        match self.get_mut(&module) {
            Some(existing) => *existing = fields,
            None => self.entries.push((module, fields)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldMap)> {
        self.entries
            .iter()
            .map(|(name, fields)| (name.as_str(), fields))
    }
}

/// Everything answered so far in a session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Answers {
    pub phase: Option<Phase>,
    pub folder: Option<String>,
    /// Module currently being configured; `None` between modules.
    pub current_module: Option<String>,
    pub configs: ModuleConfigs,
}

/// Immutable snapshot stored in the session history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    answers: Answers,
    question: Question,
}

impl SessionState {
    /// Build a snapshot, deriving its question from `answers`.
    pub fn resolve(answers: Answers, schema: &dyn SchemaProvider) -> Result<Self> {
        let question = next_question(&answers, schema)?;
        Ok(Self { answers, question })
    }

    pub fn answers(&self) -> &Answers {
        &self.answers
    }

    pub fn question(&self) -> &Question {
        &self.question
    }
}
