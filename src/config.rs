//! Configuration
//!
//! Layered the usual way: `buildor.toml` next to the invocation, then the
//! user config under the platform config directory, then environment
//! overrides (`BUILDOR_*`). Command-line flags win over all of it.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{BuildorError, BuildorResult};
use crate::index::DuplicatePolicy;

/// Project-local configuration file name
pub const CONFIG_FILE_NAME: &str = "buildor.toml";

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub scan: ScanConfig,

    #[serde(default)]
    pub index: IndexConfig,
}

/// Scan configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ScanConfig {
    /// Top of the source tree to scan for descriptors.
    #[serde(default)]
    pub root: Option<PathBuf>,
}

/// Index configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct IndexConfig {
    /// What to do when two projects claim the same artifact.
    #[serde(default)]
    pub duplicates: DuplicatePolicy,
}

/// Non-fatal configuration warning surfaced to CLI users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub key: String,
    pub file: PathBuf,
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown key '{}' in {}", self.key, self.file.display())
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> BuildorResult<Config> {
        Ok(Self::load_with_warnings(path)?.0)
    }

    /// Load configuration and collect non-fatal warnings (unknown keys).
    pub fn load_with_warnings(path: &Path) -> BuildorResult<(Config, Vec<ConfigWarning>)> {
        let content = std::fs::read_to_string(path)?;

        let mut unknown_keys: Vec<String> = Vec::new();
        let deserializer = toml::de::Deserializer::new(&content);
        let config: Config = serde_ignored::deserialize(deserializer, |p| {
            unknown_keys.push(p.to_string());
        })
        .map_err(|e| BuildorError::InvalidConfig {
            file: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let warnings = unknown_keys
            .into_iter()
            .map(|key| ConfigWarning {
                key,
                file: path.to_path_buf(),
            })
            .collect();

        Ok((config, warnings))
    }

    /// Load from the working directory's config, the user config, or
    /// defaults, then apply environment overrides.
    pub fn load_or_default(working_dir: &Path) -> Config {
        let project_config = working_dir.join(CONFIG_FILE_NAME);
        if project_config.exists() {
            if let Ok(config) = Config::load(&project_config) {
                return with_env_overrides(config);
            }
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("buildor/config.toml");
            if user_config.exists() {
                if let Ok(config) = Config::load(&user_config) {
                    return with_env_overrides(config);
                }
            }
        }

        with_env_overrides(Config::default())
    }
}

/// Apply environment variable overrides (BUILDOR_* prefix)
pub fn with_env_overrides(mut config: Config) -> Config {
    // BUILDOR_ROOT
    if let Ok(root) = std::env::var("BUILDOR_ROOT") {
        if !root.is_empty() {
            config.scan.root = Some(PathBuf::from(root));
        }
    }

    // BUILDOR_DUPLICATES
    if let Ok(policy) = std::env::var("BUILDOR_DUPLICATES") {
        config.index.duplicates = match policy.to_lowercase().as_str() {
            "first-wins" | "first" => DuplicatePolicy::FirstWins,
            "error" => DuplicatePolicy::Error,
            _ => DuplicatePolicy::LastWins,
        };
    }

    config
}
