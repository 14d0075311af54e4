use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::load::EdgePolicy;

/// File name looked up in the working directory.
pub const PROJECT_CONFIG_FILE: &str = "markov.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub validation: ValidationConfig,
    #[serde(default)]
    pub power: PowerConfig,
    #[serde(default)]
    pub reduction: ReductionConfig,
    #[serde(default)]
    pub load: LoadConfig,
}

/// Tolerance band for the row-sum check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationConfig {
    #[serde(default = "default_lo")]
    pub lo: f64,
    #[serde(default = "default_hi")]
    pub hi: f64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            lo: default_lo(),
            hi: default_hi(),
        }
    }
}

/// Power-iteration stopping rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerConfig {
    /// Stop when the L1 distance between successive powers is at most this.
    #[serde(default = "default_epsilon")]
    pub epsilon: f64,
    /// Give up after this many multiplications.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
}

impl Default for PowerConfig {
    fn default() -> Self {
        Self {
            epsilon: default_epsilon(),
            max_iterations: default_max_iterations(),
        }
    }
}

/// Which transitive reduction to apply to the class links.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReductionMode {
    /// Drop `A → C` only when some `A → B → C` exists.
    #[default]
    OneHop,
    /// Drop `A → C` whenever another path connects `A` to `C`.
    Full,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReductionConfig {
    #[serde(default)]
    pub mode: ReductionMode,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoadConfig {
    #[serde(default)]
    pub edge_policy: EdgePolicy,
}

/// Parse the config file at `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not valid TOML for
/// [`AnalysisConfig`].
pub fn load_config(path: &Path) -> Result<AnalysisConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<AnalysisConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Path of the per-user config file, if the platform has a config dir.
#[must_use]
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("markov/config.toml"))
}

/// Resolve the effective configuration.
///
/// Precedence (highest wins):
/// 1. `explicit` path (must exist)
/// 2. `markov.toml` in `project_root`
/// 3. `<config_dir>/markov/config.toml`
/// 4. built-in defaults
///
/// Returns the config and the file it came from, if any.
///
/// # Errors
///
/// Returns an error if a selected file cannot be read or parsed.
pub fn resolve_config(
    project_root: &Path,
    explicit: Option<&Path>,
) -> Result<(AnalysisConfig, Option<PathBuf>)> {
    if let Some(path) = explicit {
        return Ok((load_config(path)?, Some(path.to_path_buf())));
    }

    let candidates = std::iter::once(project_root.join(PROJECT_CONFIG_FILE))
        .chain(user_config_path());

    for path in candidates {
        if path.exists() {
            debug!(path = %path.display(), "using config file");
            return Ok((load_config(&path)?, Some(path)));
        }
    }

    Ok((AnalysisConfig::default(), None))
}

const fn default_lo() -> f64 {
    0.99
}

const fn default_hi() -> f64 {
    1.0
}

const fn default_epsilon() -> f64 {
    0.01
}

const fn default_max_iterations() -> usize {
    1000
}
