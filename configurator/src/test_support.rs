//! Test-only helpers: an in-memory schema and an on-disk module library.

use std::collections::BTreeMap;
use std::fs;

use anyhow::{Context, Result, anyhow};
use tempfile::TempDir;

use crate::core::schema::SchemaProvider;
use crate::core::types::{Arg, Phase};
use crate::io::config::ConfiguratorConfig;
use crate::io::library::ModuleLibrary;

/// In-memory schema. Modules are listed in the order they were added.
#[derive(Debug, Clone, Default)]
pub struct StaticSchema {
    modules: BTreeMap<Phase, Vec<(String, Vec<Arg>)>>,
}

impl StaticSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a module declaring `args` for `phase`.
    pub fn module(mut self, phase: Phase, name: &str, args: Vec<Arg>) -> Self {
        self.modules
            .entry(phase)
            .or_default()
            .push((name.to_string(), args));
        self
    }
}

impl SchemaProvider for StaticSchema {
    fn modules(&self, phase: Phase) -> Result<Vec<String>> {
        Ok(self
            .modules
            .get(&phase)
            .map(|modules| modules.iter().map(|(name, _)| name.clone()).collect())
            .unwrap_or_default())
    }

    fn args(&self, module: &str, phase: Phase) -> Result<Vec<Arg>> {
        self.modules
            .get(&phase)
            .and_then(|modules| modules.iter().find(|(name, _)| name == module))
            .map(|(_, args)| args.clone())
            .ok_or_else(|| anyhow!("no {phase} module named '{module}'"))
    }
}

/// A temporary directory holding a module library, workflows dir and config.
pub struct TestLibrary {
    pub temp: TempDir,
    pub config: ConfiguratorConfig,
}

impl TestLibrary {
    /// Create an empty library. Phase directories appear as modules are added.
    pub fn new() -> Result<Self> {
        let temp = tempfile::tempdir().context("create tempdir")?;
        let root = temp.path();
        let config = ConfiguratorConfig {
            library_root: root.join("lib"),
            workflows_dir: root.join("workflows"),
            folder_root: root.to_path_buf(),
            ..ConfiguratorConfig::default()
        };
        Ok(Self { temp, config })
    }

    /// Write a module directory with `schema_yaml` as its schema file.
    pub fn add_module(&self, phase: Phase, name: &str, schema_yaml: &str) -> Result<()> {
        let dir = self.config.phase_dir(phase).join(name);
        fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
        let path = dir.join(&self.config.schema_file);
        fs::write(&path, schema_yaml).with_context(|| format!("write {}", path.display()))
    }

    pub fn library(&self) -> ModuleLibrary {
        ModuleLibrary::from_config(&self.config)
    }

    /// Write the config as TOML and return its path.
    pub fn write_config(&self) -> Result<std::path::PathBuf> {
        let path = self.temp.path().join("configurator.toml");
        crate::io::config::write_config(&path, &self.config)?;
        Ok(path)
    }
}
