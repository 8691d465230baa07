//! Assembles the ordered descriptor list for one invocation.

use indexmap::IndexMap;

use crate::assets::{self, Resolution};
use crate::descriptor::{ENGINE_ENTRY, TargetDescriptor};
use crate::dev::DevServerSettings;
use crate::plugins::{self, Plugin};
use crate::{BuildMode, Platform, Result, env, externals, minify, output};

const WEB_ENTRIES: &[(&str, &str)] = &[
    ("goban", "./src/goban/index.ts"),
    (ENGINE_ENTRY, "./src/engine/index.ts"),
    ("test", "./src/test.tsx"),
];

const NODE_ENTRIES: &[(&str, &str)] = &[(ENGINE_ENTRY, "./src/engine/index.ts")];

/// Builds target descriptors from a [`BuildMode`].
///
/// Development yields `[web]` with the dev server attached. Production yields
/// `[web, node]`, both minified, without a dev server.
#[derive(Debug, Clone)]
pub struct ConfigFactory {
    mode: BuildMode,
    base_plugins: Vec<Plugin>,
}

impl ConfigFactory {
    pub fn new(mode: BuildMode) -> Self {
        Self {
            mode,
            base_plugins: plugins::base_plugins(),
        }
    }

    pub fn mode(&self) -> BuildMode {
        self.mode
    }

    /// Platforms built under this mode, in build order.
    pub fn platforms(&self) -> &'static [Platform] {
        if self.mode.is_production() {
            &[Platform::Web, Platform::Node]
        } else {
            &[Platform::Web]
        }
    }

    pub fn build(&self) -> Result<Vec<TargetDescriptor>> {
        let targets = self
            .platforms()
            .iter()
            .map(|&platform| self.descriptor(platform))
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(
            mode = %self.mode,
            targets = targets.len(),
            "assembled target descriptors"
        );
        Ok(targets)
    }

    /// Descriptor for a single platform.
    pub fn descriptor(&self, platform: Platform) -> Result<TargetDescriptor> {
        let entries = match platform {
            Platform::Web => WEB_ENTRIES,
            Platform::Node => NODE_ENTRIES,
        };
        let environment = env::inject(self.mode, platform);
        let dev_server = (platform == Platform::Web && !self.mode.is_production())
            .then(DevServerSettings::default);

        let descriptor = TargetDescriptor {
            platform,
            mode: self.mode,
            entries: entries
                .iter()
                .map(|(name, path)| (name.to_string(), path.to_string()))
                .collect::<IndexMap<_, _>>(),
            output: output::package(self.mode, platform),
            asset_rules: assets::pipeline(platform)?,
            resolution: Resolution::default(),
            externals: externals::resolve(platform),
            plugins: plugins::for_target(&self.base_plugins, &environment),
            environment,
            minifier: minify::settings(self.mode, platform),
            dev_server,
        };

        descriptor.validate()?;
        Ok(descriptor)
    }
}

/// Shorthand for `ConfigFactory::new(mode).build()`.
pub fn build_descriptors(mode: BuildMode) -> Result<Vec<TargetDescriptor>> {
    ConfigFactory::new(mode).build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_development_has_single_web_target() {
        let targets = build_descriptors(BuildMode::Development).unwrap();
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].platform, Platform::Web);
        assert!(targets[0].dev_server.is_some());
        assert!(!targets[0].minifier.enabled);
    }

    #[test]
    fn test_production_is_web_then_node() {
        let targets = build_descriptors(BuildMode::Production).unwrap();
        let platforms: Vec<_> = targets.iter().map(|t| t.platform).collect();
        assert_eq!(platforms, vec![Platform::Web, Platform::Node]);
        assert!(targets.iter().all(|t| t.minifier.enabled));
        assert!(targets.iter().all(|t| t.dev_server.is_none()));
    }

    #[test]
    fn test_web_entry_order() {
        let web = ConfigFactory::new(BuildMode::Production)
            .descriptor(Platform::Web)
            .unwrap();
        let names: Vec<_> = web.entries.keys().cloned().collect();
        assert_eq!(names, vec!["goban", "engine", "test"]);
    }

    #[test]
    fn test_node_descriptor_available_in_any_mode() {
        // descriptor() is a building block; only build() applies the mode rule.
        let node = ConfigFactory::new(BuildMode::Development)
            .descriptor(Platform::Node)
            .unwrap();
        assert_eq!(node.platform, Platform::Node);
        assert!(node.dev_server.is_none());
    }
}
