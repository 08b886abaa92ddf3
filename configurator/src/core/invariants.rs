//! Structural invariants of session answers.

use crate::core::state::Answers;
use crate::core::types::{META_MODULE, Phase};

/// Check invariants the type system does not already enforce:
/// - A current module has a config entry
/// - Modules are only configured once a phase is chosen
/// - Only the analyse phase holds more than one module
/// - No configured module uses the reserved `meta` name
pub fn validate_invariants(answers: &Answers) -> Vec<String> {
    let mut errors = Vec::new();

    let orphaned = answers
        .current_module
        .as_deref()
        .filter(|module| !answers.configs.contains(module));
    if let Some(module) = orphaned {
        errors.push(format!("current module '{module}' has no config entry"));
    }

    if answers.phase.is_none() && !answers.configs.is_empty() {
        errors.push("modules configured before a phase was chosen".to_string());
    }

    if answers.configs.len() > 1 && answers.phase != Some(Phase::Analyse) {
        errors.push(format!(
            "{} modules configured but only the analyse phase composes modules",
            answers.configs.len()
        ));
    }

    if answers.configs.contains(META_MODULE) {
        errors.push(format!("module name '{META_MODULE}' is reserved"));
    }

    errors
}
