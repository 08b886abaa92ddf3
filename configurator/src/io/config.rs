//! Configurator settings stored in `configurator.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::types::Phase;

/// Configurator configuration (TOML).
///
/// Relative paths are resolved against the process working directory. Missing
/// fields default to the layout the module library ships with.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ConfiguratorConfig {
    /// Root of the module library (contains one directory per phase).
    pub library_root: PathBuf,

    /// Directory under `library_root` holding select-phase modules.
    pub selectors_dir: String,

    /// Directory under `library_root` holding analyse-phase modules.
    pub analysers_dir: String,

    /// Schema file name inside each module directory.
    pub schema_file: String,

    /// Where saved workflow documents are written.
    pub workflows_dir: PathBuf,

    /// Base directory that `folder` answers are resolved against.
    pub folder_root: PathBuf,
}

impl Default for ConfiguratorConfig {
    fn default() -> Self {
        Self {
            library_root: PathBuf::from("lib"),
            selectors_dir: "selectors".to_string(),
            analysers_dir: "analysers".to_string(),
            schema_file: "args.yaml".to_string(),
            workflows_dir: PathBuf::from("workflows"),
            folder_root: PathBuf::from("."),
        }
    }
}

impl ConfiguratorConfig {
    pub fn validate(&self) -> Result<()> {
        if self.library_root.as_os_str().is_empty() {
            return Err(anyhow!("library_root must not be empty"));
        }
        if self.workflows_dir.as_os_str().is_empty() {
            return Err(anyhow!("workflows_dir must not be empty"));
        }
        if self.folder_root.as_os_str().is_empty() {
            return Err(anyhow!("folder_root must not be empty"));
        }
        for (key, value) in [
            ("selectors_dir", &self.selectors_dir),
            ("analysers_dir", &self.analysers_dir),
            ("schema_file", &self.schema_file),
        ] {
            if value.trim().is_empty() {
                return Err(anyhow!("{key} must not be empty"));
            }
            if value.contains('/') {
                return Err(anyhow!("{key} must be a single path component (got '{value}')"));
            }
        }
        Ok(())
    }

    /// Directory holding the modules of `phase`.
    pub fn phase_dir(&self, phase: Phase) -> PathBuf {
        let name = match phase {
            Phase::Select => &self.selectors_dir,
            Phase::Analyse => &self.analysers_dir,
        };
        self.library_root.join(name)
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `ConfiguratorConfig::default()`.
pub fn load_config(path: &Path) -> Result<ConfiguratorConfig> {
    if !path.exists() {
        debug!(path = %path.display(), "config missing, using defaults");
        let cfg = ConfiguratorConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: ConfiguratorConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("invalid config {}", path.display()))?;
    debug!(path = %path.display(), library_root = %cfg.library_root.display(), "config loaded");
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &ConfiguratorConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    super::write_atomic(path, &buf)
}
