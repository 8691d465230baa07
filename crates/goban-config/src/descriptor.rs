//! The full specification of one compilation target.

use indexmap::IndexMap;
use serde::Serialize;

use crate::assets::{AssetRule, Resolution};
use crate::dev::DevServerSettings;
use crate::env::EnvironmentConstants;
use crate::externals::Externals;
use crate::minify::MinifierSettings;
use crate::output::OutputSpec;
use crate::plugins::Plugin;
use crate::{BuildMode, ConfigError, Platform, Result};

/// Entry present in every target.
pub const ENGINE_ENTRY: &str = "engine";
/// Entries that only exist in the browser bundle.
pub const WEB_ONLY_ENTRIES: &[&str] = &["goban", "test"];

/// One compilation target.
///
/// Built once by [`crate::ConfigFactory`] and never mutated afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct TargetDescriptor {
    pub platform: Platform,
    pub mode: BuildMode,
    /// Entry name to source path, relative to the project root.
    pub entries: IndexMap<String, String>,
    pub output: OutputSpec,
    pub asset_rules: Vec<AssetRule>,
    pub resolution: Resolution,
    pub externals: Externals,
    pub environment: EnvironmentConstants,
    pub plugins: Vec<Plugin>,
    pub minifier: MinifierSettings,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dev_server: Option<DevServerSettings>,
}

impl TargetDescriptor {
    /// The artifact named after the target itself: the library bundle for web,
    /// the engine module for node.
    pub fn primary_artifact(&self) -> String {
        let entry = match self.platform {
            Platform::Web => crate::output::LIBRARY_NAME,
            Platform::Node => ENGINE_ENTRY,
        };
        self.output.filename_for(entry)
    }

    /// Output filename of every entry, in entry order.
    pub fn artifact_names(&self) -> Vec<String> {
        self.entries
            .keys()
            .map(|name| self.output.filename_for(name))
            .collect()
    }

    pub fn banner(&self) -> Option<&str> {
        self.plugins.iter().find_map(|p| match p {
            Plugin::Banner { text } => Some(text.as_str()),
            _ => None,
        })
    }

    /// Check the structural invariants every descriptor must hold.
    pub fn validate(&self) -> Result<()> {
        let client = self.environment.is_client();
        let server = self.environment.is_server();
        if client == server {
            return Err(self.invariant(format!(
                "exactly one of CLIENT/SERVER must be true (CLIENT={client}, SERVER={server})"
            )));
        }
        if client != (self.platform == Platform::Web) {
            return Err(self.invariant("CLIENT/SERVER do not match the platform".to_string()));
        }

        if !self.entries.contains_key(ENGINE_ENTRY) {
            return Err(self.invariant(format!("missing `{ENGINE_ENTRY}` entry")));
        }
        if self.platform != Platform::Web {
            if let Some(name) = WEB_ONLY_ENTRIES
                .iter()
                .find(|name| self.entries.contains_key(**name))
            {
                return Err(self.invariant(format!("`{name}` entry is web only")));
            }
        }

        let substitutes = self
            .plugins
            .iter()
            .any(|p| matches!(p, Plugin::ConstantSubstitution { .. }));
        if !substitutes {
            return Err(self.invariant("constant substitution plugin missing".to_string()));
        }

        if self.dev_server.is_some()
            && (self.platform != Platform::Web || self.mode.is_production())
        {
            return Err(self.invariant(
                "dev server is only attached to the web target in development".to_string(),
            ));
        }
        if self.dev_server.as_ref().is_some_and(|dev| dev.hot) {
            return Err(self.invariant(
                "hot module replacement is not supported, changes trigger a full reload"
                    .to_string(),
            ));
        }

        Ok(())
    }

    fn invariant(&self, message: String) -> ConfigError {
        ConfigError::Invariant {
            platform: self.platform.to_string(),
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ConfigFactory;

    fn web_dev() -> TargetDescriptor {
        ConfigFactory::new(BuildMode::Development)
            .build()
            .unwrap()
            .remove(0)
    }

    #[test]
    fn test_primary_artifact_names() {
        let targets = ConfigFactory::new(BuildMode::Production).build().unwrap();
        assert_eq!(targets[0].primary_artifact(), "goban.min.js");
        assert_eq!(targets[1].primary_artifact(), "engine.js");
        assert_eq!(web_dev().primary_artifact(), "goban.js");
    }

    #[test]
    fn test_validate_rejects_hot_reload() {
        let mut d = web_dev();
        d.validate().unwrap();
        if let Some(dev) = d.dev_server.as_mut() {
            dev.hot = true;
        }
        let err = d.validate().unwrap_err();
        assert!(err.to_string().contains("hot module replacement"));
    }

    #[test]
    fn test_validate_rejects_missing_engine() {
        let mut d = web_dev();
        d.entries.shift_remove(ENGINE_ENTRY);
        let err = d.validate().unwrap_err();
        assert!(err.to_string().contains("engine"));
    }

    #[test]
    fn test_validate_rejects_web_entries_on_node() {
        let mut node = ConfigFactory::new(BuildMode::Production)
            .build()
            .unwrap()
            .remove(1);
        node.entries
            .insert("goban".to_string(), "./src/goban/index.ts".to_string());
        assert!(node.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_missing_substitution() {
        let mut d = web_dev();
        d.plugins
            .retain(|p| !matches!(p, Plugin::ConstantSubstitution { .. }));
        assert!(d.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_platform_mismatch() {
        let mut d = web_dev();
        d.environment = crate::env::inject(BuildMode::Development, Platform::Node);
        assert!(d.validate().is_err());
    }

    #[test]
    fn test_banner_lookup() {
        let d = web_dev();
        assert!(d.banner().unwrap().starts_with("Copyright (C)  Online-Go.com"));
    }
}
