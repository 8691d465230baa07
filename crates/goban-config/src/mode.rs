//! Build mode selection.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The mode a build invocation runs in.
///
/// Selects minification, the environment constants, how many targets are
/// built and whether the dev server is attached. Fixed for the lifetime of
/// one invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    #[default]
    Development,
    Production,
}

impl BuildMode {
    /// Interpret a raw `--mode` argument.
    ///
    /// Only the exact string `production` selects production. Anything else,
    /// including a missing value, falls back to development. This never fails.
    ///
    /// ```
    /// use goban_config::BuildMode;
    ///
    /// assert_eq!(BuildMode::from_arg(Some("production")), BuildMode::Production);
    /// assert_eq!(BuildMode::from_arg(Some("prod")), BuildMode::Development);
    /// assert_eq!(BuildMode::from_arg(None), BuildMode::Development);
    /// ```
    pub fn from_arg(arg: Option<&str>) -> Self {
        match arg {
            Some("production") => BuildMode::Production,
            Some(other) => {
                if other != "development" {
                    tracing::debug!(mode = other, "unrecognized mode, using development");
                }
                BuildMode::Development
            }
            None => BuildMode::Development,
        }
    }

    pub fn is_production(self) -> bool {
        matches!(self, BuildMode::Production)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BuildMode::Development => "development",
            BuildMode::Production => "production",
        }
    }

    /// Value substituted for `process.env.NODE_ENV`.
    pub fn node_env(self) -> &'static str {
        self.as_str()
    }
}

impl fmt::Display for BuildMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_arg_production() {
        assert_eq!(BuildMode::from_arg(Some("production")), BuildMode::Production);
    }

    #[test]
    fn test_from_arg_fails_open() {
        for raw in ["development", "", "Production", "PRODUCTION", "prod", "staging"] {
            assert_eq!(BuildMode::from_arg(Some(raw)), BuildMode::Development, "{raw}");
        }
        assert_eq!(BuildMode::from_arg(None), BuildMode::Development);
    }

    #[test]
    fn test_node_env() {
        assert_eq!(BuildMode::Production.node_env(), "production");
        assert_eq!(BuildMode::Development.node_env(), "development");
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&BuildMode::Production).unwrap();
        assert_eq!(json, "\"production\"");
    }
}
