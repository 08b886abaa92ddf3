//! Checks for saved workflow documents (`configurator check`).

use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use crate::core::compose::{DocumentConfig, WorkflowDocument};
use crate::core::schema::{SchemaProvider, effective_args};
use crate::core::types::{ELEMENTS_IN, FieldMap, META_MODULE, Phase};
use crate::io::workflow_store::load_workflow;

/// Load `path` and check it against the module library.
///
/// Returns the list of problems found; an empty list means the document is
/// ready to run. Unreadable or malformed files are errors.
pub fn check_workflow_file(path: &Path, schema: &dyn SchemaProvider) -> Result<Vec<String>> {
    let doc = load_workflow(path)?;
    check_workflow(&doc, schema).with_context(|| format!("check {}", path.display()))
}

/// Check a document against the module library.
pub fn check_workflow(doc: &WorkflowDocument, schema: &dyn SchemaProvider) -> Result<Vec<String>> {
    let mut problems = Vec::new();

    if doc.module == META_MODULE {
        check_meta(doc, &mut problems);
        debug!(problems = problems.len(), "meta workflow checked");
        return Ok(problems);
    }

    let modules = schema.modules(doc.phase)?;
    if !modules.iter().any(|name| name == &doc.module) {
        problems.push(format!("no {} module named '{}'", doc.phase, doc.module));
        return Ok(problems);
    }

    match &doc.config {
        DocumentConfig::Module(fields) => {
            check_fields(schema, &doc.module, doc.phase, fields, &mut problems)?;
        }
        DocumentConfig::Meta { .. } => problems.push(format!(
            "module '{}' has a children config but is not '{META_MODULE}'",
            doc.module
        )),
    }
    debug!(module = %doc.module, problems = problems.len(), "workflow checked");
    Ok(problems)
}

fn check_meta(doc: &WorkflowDocument, problems: &mut Vec<String>) {
    if doc.phase != Phase::Analyse {
        problems.push(format!(
            "'{META_MODULE}' workflows must use the analyse phase (got {})",
            doc.phase
        ));
    }
    let children = match &doc.config {
        DocumentConfig::Meta { children } => children,
        DocumentConfig::Module(_) => {
            problems.push(format!("'{META_MODULE}' config must contain children"));
            return;
        }
    };
    if children.is_empty() {
        problems.push(format!("'{META_MODULE}' config has no children"));
    }
    for (index, child) in children.iter().enumerate() {
        if !child.contains_key(ELEMENTS_IN) {
            problems.push(format!("child {index} is missing '{ELEMENTS_IN}'"));
        }
    }
}

fn check_fields(
    schema: &dyn SchemaProvider,
    module: &str,
    phase: Phase,
    fields: &FieldMap,
    problems: &mut Vec<String>,
) -> Result<()> {
    let args = effective_args(schema, module, phase)?;
    for arg in &args {
        match fields.get(&arg.name) {
            None if arg.required => problems.push(format!(
                "missing required argument '{}' for {phase} module '{module}'",
                arg.name
            )),
            None => {}
            Some(value) if !value.matches(arg.arg_type) => problems.push(format!(
                "argument '{}' should be a {} (got {value})",
                arg.name, arg.arg_type
            )),
            Some(_) => {}
        }
    }
    for key in fields.keys() {
        if !args.iter().any(|arg| &arg.name == key) {
            problems.push(format!("unknown argument '{key}' for {phase} module '{module}'"));
        }
    }
    Ok(())
}
