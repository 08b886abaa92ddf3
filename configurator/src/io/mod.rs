//! I/O helpers: configuration, module library, folder probes and persistence.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use jsonschema::validator_for;
use serde_json::Value;

pub mod config;
pub mod folder;
pub mod library;
pub mod screens;
pub mod workflow_store;

/// Write `contents` next to `path` and rename it into place.
///
/// A failure before the rename leaves any previous file untouched and removes
/// the temp file.
pub(crate) fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = path
        .parent()
        .with_context(|| format!("path missing parent {}", path.display()))?;
    if !parent.as_os_str().is_empty() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    let mut tmp_name = path
        .file_name()
        .with_context(|| format!("path missing file name {}", path.display()))?
        .to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);
    if let Err(err) = fs::write(&tmp_path, contents) {
        let _ = fs::remove_file(&tmp_path);
        return Err(err).with_context(|| format!("write temp file {}", tmp_path.display()));
    }
    if let Err(err) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(err).with_context(|| format!("replace {}", path.display()));
    }
    Ok(())
}

/// Check `value` against the JSON Schema in `schema_text`.
///
/// `what` names the document kind in error messages. Every violation is
/// reported, joined with `; `.
pub(crate) fn validate_against_schema(schema_text: &str, what: &str, value: &Value) -> Result<()> {
    let schema: Value =
        serde_json::from_str(schema_text).with_context(|| format!("parse {what} schema"))?;
    let compiled =
        validator_for(&schema).map_err(|err| anyhow!("invalid {what} schema: {}", err))?;
    if compiled.is_valid(value) {
        return Ok(());
    }
    let messages = compiled
        .iter_errors(value)
        .map(|err| err.to_string())
        .collect::<Vec<_>>();
    Err(anyhow!(
        "{what} schema validation failed: {}",
        messages.join("; ")
    ))
}
