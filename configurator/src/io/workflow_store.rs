//! Workflow document persistence (YAML).
//!
//! Documents are read by YAML 1.1 loaders downstream, so text is written
//! quoted whenever such a loader would resolve it to a bool, null, number or
//! timestamp. Loading goes through `serde_yaml`.

use std::borrow::Cow;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result, anyhow};
use regex::Regex;
use serde_json::Value;
use tracing::{debug, info};

use crate::core::compose::{DocumentConfig, WorkflowDocument};
use crate::core::types::{FieldMap, FieldValue};
use crate::io::validate_against_schema;

const WORKFLOW_SCHEMA: &str = include_str!("../../schemas/workflow.schema.json");
const WORKFLOW_EXTENSION: &str = "yaml";
const INDENT: usize = 2;

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*$").unwrap());

// Cannot start like a number, timestamp, indicator or alias.
static PLAIN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_/][A-Za-z0-9_./-]*$").unwrap());

/// Words YAML 1.1 resolves to bools or null.
const RESERVED_WORDS: &[&str] = &[
    "y", "Y", "yes", "Yes", "YES", "n", "N", "no", "No", "NO", "true", "True", "TRUE", "false",
    "False", "FALSE", "on", "On", "ON", "off", "Off", "OFF", "null", "Null", "NULL",
];

/// Render a document as block YAML.
///
/// Field maps are written in key order and sequences sit at their key's
/// indentation, matching what `serde_yaml` emits.
pub fn to_yaml(doc: &WorkflowDocument) -> String {
    let mut out = String::new();
    push_line(&mut out, 0, &format!("phase: {}", doc.phase));
    push_line(&mut out, 0, &format!("folder: {}", scalar(&doc.folder)));
    push_line(&mut out, 0, &format!("module: {}", scalar(&doc.module)));
    match &doc.config {
        DocumentConfig::Module(fields) => push_fields(&mut out, 0, "config", fields),
        DocumentConfig::Meta { children } => {
            push_line(&mut out, 0, "config:");
            if children.is_empty() {
                push_line(&mut out, INDENT, "children: []");
            } else {
                push_line(&mut out, INDENT, "children:");
                for child in children {
                    push_child(&mut out, INDENT, child);
                }
            }
        }
    }
    out
}

fn push_line(out: &mut String, indent: usize, line: &str) {
    let _ = writeln!(out, "{:indent$}{line}", "");
}

fn push_fields(out: &mut String, indent: usize, key: &str, fields: &FieldMap) {
    if fields.is_empty() {
        push_line(out, indent, &format!("{key}: {{}}"));
        return;
    }
    push_line(out, indent, &format!("{key}:"));
    push_entries(out, indent + INDENT, fields);
}

fn push_entries(out: &mut String, indent: usize, fields: &FieldMap) {
    for (key, value) in fields {
        let key = scalar(key);
        match value {
            FieldValue::Bool(value) => push_line(out, indent, &format!("{key}: {value}")),
            FieldValue::Int(value) => push_line(out, indent, &format!("{key}: {value}")),
            FieldValue::Text(text) => push_line(out, indent, &format!("{key}: {}", scalar(text))),
            FieldValue::List(items) if items.is_empty() => {
                push_line(out, indent, &format!("{key}: []"));
            }
            FieldValue::List(items) => {
                push_line(out, indent, &format!("{key}:"));
                for item in items {
                    push_line(out, indent, &format!("- {}", scalar(item)));
                }
            }
        }
    }
}

/// One `- ` sequence item holding a field map, entries aligned after the dash.
fn push_child(out: &mut String, indent: usize, child: &FieldMap) {
    if child.is_empty() {
        push_line(out, indent, "- {}");
        return;
    }
    let mut body = String::new();
    push_entries(&mut body, indent + INDENT, child);
    let _ = write!(out, "{:indent$}- {}", "", &body[indent + INDENT..]);
}

/// `text` as a YAML scalar that every loader reads back as the same string.
fn scalar(text: &str) -> Cow<'_, str> {
    if PLAIN_RE.is_match(text) && !RESERVED_WORDS.contains(&text) {
        return Cow::Borrowed(text);
    }
    if text.chars().any(char::is_control) {
        return Cow::Owned(double_quoted(text));
    }
    Cow::Owned(format!("'{}'", text.replace('\'', "''")))
}

fn double_quoted(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if c.is_control() => {
                let _ = write!(out, "\\u{:04x}", u32::from(c));
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Path a workflow named `name` is saved under in `dir`.
///
/// A trailing `.yaml` typed by the user is not doubled.
pub fn workflow_path(dir: &Path, name: &str) -> Result<PathBuf> {
    let stem = name
        .strip_suffix(&format!(".{WORKFLOW_EXTENSION}"))
        .unwrap_or(name);
    validate_name(stem)?;
    Ok(dir.join(format!("{stem}.{WORKFLOW_EXTENSION}")))
}

/// Validate that a workflow name is a plain file stem.
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(anyhow!("workflow name must not be empty"));
    }
    if !NAME_RE.is_match(name) {
        return Err(anyhow!(
            "workflow name must start with a letter or digit and use [A-Za-z0-9._-] only (got '{name}')"
        ));
    }
    Ok(())
}

/// Atomically write `doc` to `<dir>/<name>.yaml`, replacing any previous file.
pub fn write_workflow(dir: &Path, name: &str, doc: &WorkflowDocument) -> Result<PathBuf> {
    let path = workflow_path(dir, name)?;
    let yaml = to_yaml(doc);
    super::write_atomic(&path, &yaml)?;
    info!(path = %path.display(), module = %doc.module, "workflow saved");
    Ok(path)
}

/// Load and shape-check a saved workflow document.
pub fn load_workflow(path: &Path) -> Result<WorkflowDocument> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("read workflow {}", path.display()))?;
    let value: Value = serde_yaml::from_str(&contents)
        .with_context(|| format!("parse workflow {}", path.display()))?;
    validate_against_schema(WORKFLOW_SCHEMA, "workflow", &value)
        .with_context(|| format!("validate workflow {}", path.display()))?;
    let doc: WorkflowDocument = serde_json::from_value(value)
        .with_context(|| format!("deserialize workflow {}", path.display()))?;
    debug!(path = %path.display(), module = %doc.module, "workflow loaded");
    Ok(doc)
}
