use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Project-relative location of the config file.
pub const CONFIG_PATH: &str = ".tangle/config.toml";

/// Environment variable overriding the configured view mode.
pub const VIEW_ENV: &str = "TANGLE_VIEW";

/// Threshold policy used to partition groups.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViewMode {
    /// Threshold at the largest cyclic group.
    #[default]
    CorePeriphery,
    /// Threshold at the median file.
    Median,
}

impl ViewMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CorePeriphery => "core-periphery",
            Self::Median => "median",
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rejected view mode string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("view must be either 'core-periphery' or 'median', got '{0}'")]
pub struct UnknownViewMode(pub String);

impl FromStr for ViewMode {
    type Err = UnknownViewMode;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "core-periphery" | "core_periphery" | "coreperiphery" => Ok(Self::CorePeriphery),
            "median" => Ok(Self::Median),
            _ => Err(UnknownViewMode(raw.to_string())),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub view: ViewMode,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    #[serde(default = "default_true")]
    pub trim_common_prefix: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            trim_common_prefix: default_true(),
        }
    }
}

/// Path of the project config under `project_root`.
#[must_use]
pub fn config_path(project_root: &Path) -> PathBuf {
    project_root.join(CONFIG_PATH)
}

/// Load `.tangle/config.toml` under `project_root`; defaults if absent.
pub fn load_project_config(project_root: &Path) -> Result<ProjectConfig> {
    load_config_file(&config_path(project_root), false)
}

/// Load a config file. A missing file yields defaults unless `required`.
pub fn load_config_file(path: &Path, required: bool) -> Result<ProjectConfig> {
    if !path.exists() {
        if required {
            anyhow::bail!("config file {} does not exist", path.display());
        }
        return Ok(ProjectConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<ProjectConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Resolve the view mode: flag, then `TANGLE_VIEW`, then config.
pub fn resolve_view(flag: Option<ViewMode>, config: &ProjectConfig) -> Result<ViewMode> {
    resolve_view_inner(flag, env::var(VIEW_ENV).ok().as_deref(), config)
}

fn resolve_view_inner(
    flag: Option<ViewMode>,
    env_view: Option<&str>,
    config: &ProjectConfig,
) -> Result<ViewMode> {
    if let Some(view) = flag {
        return Ok(view);
    }

    if let Some(raw) = env_view.filter(|v| !v.trim().is_empty()) {
        return raw
            .parse::<ViewMode>()
            .with_context(|| format!("invalid {VIEW_ENV}"));
    }

    Ok(config.analysis.view)
}

const fn default_true() -> bool {
    true
}
