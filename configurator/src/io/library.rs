//! File-backed module library.
//!
//! Layout: `<library_root>/<phase dir>/<module>/<schema file>`, where the
//! schema file is a YAML list of `{name, input, required}` records.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::debug;

use crate::core::schema::SchemaProvider;
use crate::core::types::{Arg, Phase};
use crate::io::config::ConfiguratorConfig;
use crate::io::validate_against_schema;

const ARGS_SCHEMA: &str = include_str!("../../schemas/args.schema.json");

/// Module library rooted in a directory on disk.
#[derive(Debug, Clone)]
pub struct ModuleLibrary {
    selectors_dir: PathBuf,
    analysers_dir: PathBuf,
    schema_file: String,
}

impl ModuleLibrary {
    pub fn from_config(cfg: &ConfiguratorConfig) -> Self {
        Self {
            selectors_dir: cfg.phase_dir(Phase::Select),
            analysers_dir: cfg.phase_dir(Phase::Analyse),
            schema_file: cfg.schema_file.clone(),
        }
    }

    pub fn phase_dir(&self, phase: Phase) -> &Path {
        match phase {
            Phase::Select => &self.selectors_dir,
            Phase::Analyse => &self.analysers_dir,
        }
    }

    /// Path of the schema file describing `module` in `phase`.
    pub fn schema_path(&self, module: &str, phase: Phase) -> PathBuf {
        self.phase_dir(phase).join(module).join(&self.schema_file)
    }
}

impl SchemaProvider for ModuleLibrary {
    /// Every subdirectory of the phase directory, sorted by name.
    fn modules(&self, phase: Phase) -> Result<Vec<String>> {
        let dir = self.phase_dir(phase);
        let entries = fs::read_dir(dir)
            .with_context(|| format!("read {phase} modules in {}", dir.display()))?;
        let mut modules = Vec::new();
        for entry in entries {
            let entry = entry.with_context(|| format!("read entry in {}", dir.display()))?;
            let file_type = entry
                .file_type()
                .with_context(|| format!("stat {}", entry.path().display()))?;
            if !file_type.is_dir() {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) => modules.push(name),
                Err(name) => debug!(?name, "skipping module with non-utf8 name"),
            }
        }
        modules.sort();
        debug!(%phase, count = modules.len(), "modules listed");
        Ok(modules)
    }

    fn args(&self, module: &str, phase: Phase) -> Result<Vec<Arg>> {
        let path = self.schema_path(module, phase);
        let contents = fs::read_to_string(&path).with_context(|| {
            format!(
                "read schema for {phase} module '{module}' at {}",
                path.display()
            )
        })?;
        let args =
            parse_args(&contents).with_context(|| format!("invalid schema {}", path.display()))?;
        debug!(%phase, module, count = args.len(), "module args loaded");
        Ok(args)
    }
}

/// Parse and validate a schema file body. An empty document declares no args.
pub fn parse_args(contents: &str) -> Result<Vec<Arg>> {
    if contents.trim().is_empty() {
        return Ok(Vec::new());
    }
    let value: Value = serde_yaml::from_str(contents).context("parse schema yaml")?;
    let value = match value {
        Value::Null => Value::Array(Vec::new()),
        other => other,
    };
    validate_against_schema(ARGS_SCHEMA, "args", &value)?;
    serde_json::from_value(value).context("deserialize schema args")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::ArgType;
    use crate::test_support::TestLibrary;

    #[test]
    fn lists_module_directories_sorted() {
        let lib = TestLibrary::new().expect("library");
        lib.add_module(Phase::Analyse, "ranking", "[]").expect("module");
        lib.add_module(Phase::Analyse, "frames", "[]").expect("module");
        lib.add_module(Phase::Analyse, "meta", "[]").expect("module");
        fs::write(lib.config.phase_dir(Phase::Analyse).join("README.md"), "x").expect("file");

        let modules = lib.library().modules(Phase::Analyse).expect("modules");
        assert_eq!(modules, vec!["frames", "meta", "ranking"]);
    }

    #[test]
    fn missing_phase_dir_is_an_error() {
        let lib = TestLibrary::new().expect("library");
        let err = lib.library().modules(Phase::Select).expect_err("no dir");
        assert!(format!("{err:#}").contains("select modules"));
    }

    #[test]
    fn reads_args_in_declared_order() {
        let lib = TestLibrary::new().expect("library");
        lib.add_module(
            Phase::Select,
            "local",
            "- name: source\n  input: folder\n  required: true\n- name: limit\n  input: int\n  required: false\n",
        )
        .expect("module");

        let args = lib.library().args("local", Phase::Select).expect("args");
        assert_eq!(
            args,
            vec![
                Arg::new("source", ArgType::Folder, true),
                Arg::new("limit", ArgType::Int, false),
            ]
        );
    }

    #[test]
    fn empty_schema_file_declares_no_args() {
        assert!(parse_args("").expect("parse").is_empty());
    }

    #[test]
    fn unknown_input_type_is_rejected() {
        let err = parse_args("- name: when\n  input: datetime\n  required: true\n")
            .expect_err("bad input");
        assert!(err.to_string().contains("schema validation failed"));
    }

    #[test]
    fn missing_required_key_is_rejected() {
        assert!(parse_args("- name: when\n  input: date\n").is_err());
    }

    #[test]
    fn missing_schema_file_is_an_error() {
        let lib = TestLibrary::new().expect("library");
        let err = lib.library().args("ghost", Phase::Analyse).expect_err("missing");
        assert!(format!("{err:#}").contains("'ghost'"));
    }
}
