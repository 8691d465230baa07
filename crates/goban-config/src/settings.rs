//! Ambient settings read from an optional `goban-build.toml`.
//!
//! Nothing here changes the shape of a target descriptor. The file only
//! controls where the toolchain lives, how targets are scheduled and how
//! chatty the logs are. The process environment is never consulted.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

use crate::{ConfigError, Result};

pub const SETTINGS_FILE: &str = "goban-build.toml";

const LOG_LEVELS: &[&str] = &["off", "error", "warn", "info", "debug", "trace"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolchainSettings {
    /// TypeScript compiler used for type checking.
    pub tsc: PathBuf,
    /// Bundler executable.
    pub esbuild: PathBuf,
}

impl Default for ToolchainSettings {
    fn default() -> Self {
        Self {
            tsc: PathBuf::from("node_modules/.bin/tsc"),
            esbuild: PathBuf::from("node_modules/.bin/esbuild"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionSettings {
    /// Compile independent targets concurrently.
    pub parallel: bool,
    /// Upper bound on concurrently compiling targets. `None` means one per
    /// target.
    pub max_parallel: Option<usize>,
}

impl Default for ExecutionSettings {
    fn default() -> Self {
        Self {
            parallel: true,
            max_parallel: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchSettings {
    pub debounce_ms: u64,
}

impl Default for WatchSettings {
    fn default() -> Self {
        Self { debounce_ms: 100 }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildSettings {
    pub log_level: Option<String>,
    pub toolchain: ToolchainSettings,
    pub build: ExecutionSettings,
    pub dev: WatchSettings,
}

impl BuildSettings {
    /// Load `goban-build.toml` from `root`, falling back to defaults for
    /// anything the file does not set. A missing file is not an error.
    pub fn load(root: &Path) -> Result<Self> {
        Self::load_from(&root.join(SETTINGS_FILE))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let settings: BuildSettings = Figment::from(Serialized::defaults(BuildSettings::default()))
            .merge(Toml::file(path))
            .extract()
            .map_err(|e| ConfigError::Settings {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(level) = &self.log_level {
            if !LOG_LEVELS.contains(&level.to_ascii_lowercase().as_str()) {
                return Err(ConfigError::InvalidValue(format!(
                    "log_level `{}` (expected one of {})",
                    level,
                    LOG_LEVELS.join(", ")
                )));
            }
        }
        if self.build.max_parallel == Some(0) {
            return Err(ConfigError::InvalidValue(
                "build.max_parallel must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Resolve a toolchain path against the project root.
    pub fn tool_path(&self, root: &Path, tool: &Path) -> PathBuf {
        if tool.is_absolute() {
            tool.to_path_buf()
        } else {
            root.join(tool)
        }
    }
}
