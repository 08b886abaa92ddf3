//! Deterministic next-question resolution.

use anyhow::{Result, anyhow};

use crate::core::schema::{SchemaProvider, effective_args};
use crate::core::state::Answers;
use crate::core::types::{
    ArgType, FIELD_FOLDER, FIELD_MODULE, FIELD_PHASE, META_MODULE, Phase, Question,
};

const FOLDER_PROMPT: &str = "please enter the path to your working directory";

/// Compute the question to ask given `answers`.
///
/// The first unmet condition wins: folder, then phase, then module, then the
/// module's first unanswered argument. With every argument answered the
/// session is ready to save. Same answers and schema give the same question.
pub fn next_question(answers: &Answers, schema: &dyn SchemaProvider) -> Result<Question> {
    if answers.folder.is_none() {
        return Ok(Question::TextInput {
            field: FIELD_FOLDER.to_string(),
            prompt: FOLDER_PROMPT.to_string(),
            arg_type: ArgType::Folder,
        });
    }

    let Some(phase) = answers.phase else {
        return Ok(Question::Choice {
            field: FIELD_PHASE.to_string(),
            options: Phase::ALL.iter().map(|phase| phase.to_string()).collect(),
        });
    };

    let Some(module) = answers.current_module.as_deref() else {
        let options = schema
            .modules(phase)?
            .into_iter()
            .filter(|name| name != META_MODULE && !answers.configs.contains(name))
            .collect();
        return Ok(Question::Choice {
            field: FIELD_MODULE.to_string(),
            options,
        });
    };

    let fields = answers
        .configs
        .get(module)
        .ok_or_else(|| anyhow!("current module '{module}' has no config entry"))?;
    let args = effective_args(schema, module, phase)?;
    let pending = args.into_iter().find(|arg| !fields.contains_key(&arg.name));
    Ok(match pending {
        Some(arg) => Question::TextInput {
            prompt: arg_prompt(&arg.name, arg.arg_type, arg.required),
            field: arg.name,
            arg_type: arg.arg_type,
        },
        None => Question::Save {
            composable: phase == Phase::Analyse,
        },
    })
}

fn arg_prompt(name: &str, arg_type: ArgType, required: bool) -> String {
    let optional = if required { "" } else { " (optional)" };
    format!("please enter a {arg_type} for argument: {name}{optional}")
}
