//! Session and undo history.
//!
//! A [`Session`] owns an append-only stack of [`SessionState`] snapshots. Every
//! accepted answer clones the current answers, applies the change and pushes a
//! new snapshot, so earlier entries are never touched and undo is a pop.

use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow, bail};
use tracing::{debug, info, warn};

use crate::core::compose::{WorkflowDocument, compose};
use crate::core::invariants::validate_invariants;
use crate::core::schema::SchemaProvider;
use crate::core::state::{Answers, SessionState};
use crate::core::types::{
    FIELD_FOLDER, FIELD_MODULE, FIELD_PHASE, FieldMap, FieldValue, Phase, Question,
};
use crate::io::workflow_store::write_workflow;
use crate::validate::{Rejection, Validator};

/// Result of submitting a raw answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerOutcome {
    /// The answer was applied and a new snapshot pushed.
    Accepted,
    /// The answer failed validation; the session is unchanged.
    Rejected(Rejection),
}

/// One interactive configuration run.
pub struct Session<P: SchemaProvider> {
    schema: P,
    history: Vec<SessionState>,
}

impl<P: SchemaProvider> Session<P> {
    /// Start a session with empty answers.
    pub fn start(schema: P) -> Result<Self> {
        let initial = SessionState::resolve(Answers::default(), &schema)?;
        debug!(question = ?initial.question(), "session started");
        Ok(Self {
            schema,
            history: vec![initial],
        })
    }

    pub fn current(&self) -> &SessionState {
        // `history` is never empty: it starts with one entry and undo keeps it.
        &self.history[self.history.len() - 1]
    }

    pub fn question(&self) -> &Question {
        self.current().question()
    }

    pub fn history(&self) -> &[SessionState] {
        &self.history
    }

    pub fn depth(&self) -> usize {
        self.history.len()
    }

    /// Validate `raw` against the pending question and apply it.
    ///
    /// Validation failures are returned as [`AnswerOutcome::Rejected`]. An
    /// answer for a field other than the pending one is a caller error.
    pub fn answer(
        &mut self,
        validator: &Validator,
        field: &str,
        raw: &str,
    ) -> Result<AnswerOutcome> {
        let value = match self.question() {
            Question::TextInput {
                field: pending,
                arg_type,
                ..
            } => {
                ensure_pending(pending, field)?;
                match validator.validate(*arg_type, raw) {
                    Ok(value) => value,
                    Err(rejection) => {
                        warn!(field, input = raw, %rejection, "answer rejected");
                        return Ok(AnswerOutcome::Rejected(rejection));
                    }
                }
            }
            Question::Choice { .. } => FieldValue::text(raw),
            Question::Save { .. } => {
                bail!("save question cannot be answered with a value (got '{field}')")
            }
        };
        self.apply(field, value)?;
        Ok(AnswerOutcome::Accepted)
    }

    /// Apply an already-coerced answer to the pending question.
    ///
    /// With no module selected, `folder`, `phase` and `module` are top-level
    /// answers; choosing a module starts an empty field map for it. Otherwise
    /// the value is recorded in the current module's fields.
    pub fn apply(&mut self, field: &str, value: FieldValue) -> Result<&SessionState> {
        match self.question() {
            Question::Choice {
                field: pending,
                options,
            } => {
                ensure_pending(pending, field)?;
                let chosen = value
                    .as_text()
                    .ok_or_else(|| anyhow!("choice for '{field}' must be text (got {value:?})"))?;
                if !options.iter().any(|option| option == chosen) {
                    bail!("'{chosen}' is not one of the options for '{field}'");
                }
            }
            Question::TextInput { field: pending, .. } => ensure_pending(pending, field)?,
            Question::Save { .. } => {
                bail!("save question cannot be answered with a value (got '{field}')")
            }
        }

        let mut answers = self.current().answers().clone();
        match answers.current_module.clone() {
            Some(module) => {
                answers
                    .configs
                    .get_mut(&module)
                    .ok_or_else(|| anyhow!("current module '{module}' has no config entry"))?
                    .insert(field.to_string(), value);
            }
            None => {
                let text = value
                    .as_text()
                    .ok_or_else(|| anyhow!("'{field}' must be text (got {value:?})"))?
                    .to_string();
                match field {
                    FIELD_FOLDER => answers.folder = Some(text),
                    FIELD_PHASE => {
                        answers.phase = Some(text.parse::<Phase>().map_err(|err| anyhow!(err))?);
                    }
                    FIELD_MODULE => {
                        answers.configs.insert(text.clone(), FieldMap::new());
                        answers.current_module = Some(text);
                    }
                    other => bail!("'{other}' answered with no module selected"),
                }
            }
        }
        debug!(field, "answer applied");
        self.push(answers)
    }

    /// Leave the current module and return to module selection.
    ///
    /// Only valid while the pending question is a composable save.
    pub fn add_another(&mut self) -> Result<&SessionState> {
        if !matches!(self.question(), Question::Save { composable: true }) {
            bail!(
                "cannot add another module while the pending question is {:?}",
                self.question()
            );
        }
        let mut answers = self.current().answers().clone();
        let finished = answers.current_module.take();
        debug!(module = ?finished, "adding another module");
        self.push(answers)
    }

    /// Drop the most recent snapshot. The initial snapshot is never dropped.
    ///
    /// Returns whether anything was undone.
    pub fn undo(&mut self) -> bool {
        if self.history.len() <= 1 {
            debug!("nothing to undo");
            return false;
        }
        self.history.pop();
        debug!(depth = self.history.len(), "undo");
        true
    }

    /// Compose the workflow document from the current answers.
    pub fn compose(&self) -> Result<WorkflowDocument> {
        compose(self.current().answers()).map_err(|err| anyhow!(err))
    }

    /// Compose and write the workflow as `<workflows_dir>/<name>.yaml`.
    ///
    /// Only valid while the pending question is a save. A failed write leaves
    /// the session as it was so the caller can retry with another name.
    pub fn save(&self, workflows_dir: &Path, name: &str) -> Result<PathBuf> {
        if !matches!(self.question(), Question::Save { .. }) {
            bail!(
                "cannot save while the pending question is {:?}",
                self.question()
            );
        }
        let doc = self.compose()?;
        let path = write_workflow(workflows_dir, name, &doc)?;
        info!(path = %path.display(), depth = self.depth(), "session saved");
        Ok(path)
    }

    fn push(&mut self, answers: Answers) -> Result<&SessionState> {
        let errors = validate_invariants(&answers);
        if !errors.is_empty() {
            bail!("session invariants failed: {}", errors.join("; "));
        }
        let next = SessionState::resolve(answers, &self.schema)?;
        debug!(depth = self.history.len() + 1, question = ?next.question(), "state pushed");
        self.history.push(next);
        Ok(self.current())
    }
}

fn ensure_pending(pending: &str, field: &str) -> Result<()> {
    if pending != field {
        bail!("answer for '{field}' does not match pending question '{pending}'");
    }
    Ok(())
}
