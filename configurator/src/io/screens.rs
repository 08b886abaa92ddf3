//! Text screens for the line presenter.

use std::path::Path;

use anyhow::{Context, Result};
use minijinja::{Environment, context};
use serde::Serialize;

use crate::core::state::Answers;
use crate::core::types::Question;

const CHOICE_TEMPLATE: &str = include_str!("screens/choice.txt");
const TEXT_INPUT_TEMPLATE: &str = include_str!("screens/text_input.txt");
const SAVE_TEMPLATE: &str = include_str!("screens/save.txt");
const SUMMARY_TEMPLATE: &str = include_str!("screens/summary.txt");

#[derive(Debug, Clone, Serialize)]
struct ModuleSummary<'a> {
    name: &'a str,
    answered: usize,
    current: bool,
}

/// Template engine wrapper around minijinja.
pub struct Screens {
    env: Environment<'static>,
}

impl Screens {
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        env.add_template("choice", CHOICE_TEMPLATE)
            .context("load choice template")?;
        env.add_template("text_input", TEXT_INPUT_TEMPLATE)
            .context("load text input template")?;
        env.add_template("save", SAVE_TEMPLATE)
            .context("load save template")?;
        env.add_template("summary", SUMMARY_TEMPLATE)
            .context("load summary template")?;
        Ok(Self { env })
    }

    /// One-line overview of the answers so far. Empty before anything is answered.
    pub fn render_summary(&self, answers: &Answers) -> Result<String> {
        let modules: Vec<ModuleSummary<'_>> = answers
            .configs
            .iter()
            .map(|(name, fields)| ModuleSummary {
                name,
                answered: fields.len(),
                current: answers.current_module.as_deref() == Some(name),
            })
            .collect();
        let template = self.env.get_template("summary")?;
        let rendered = template.render(context! {
            folder => answers.folder.as_deref(),
            phase => answers.phase.map(|phase| phase.as_str()),
            modules => modules,
        })?;
        Ok(rendered)
    }

    /// Render the screen for `question`.
    pub fn render_question(&self, question: &Question, workflows_dir: &Path) -> Result<String> {
        let rendered = match question {
            Question::Choice { field, options } => {
                self.env.get_template("choice")?.render(context! {
                    title => format!("please choose a {field}"),
                    field => field,
                    options => options,
                })?
            }
            Question::TextInput {
                prompt, arg_type, ..
            } => self.env.get_template("text_input")?.render(context! {
                prompt => prompt,
                arg_type => arg_type.as_str(),
            })?,
            Question::Save { composable } => self.env.get_template("save")?.render(context! {
                workflows_dir => workflows_dir.display().to_string(),
                composable => composable,
            })?,
        };
        Ok(rendered)
    }
}
