//! Minification and size budget settings.

use serde::Serialize;

use crate::{BuildMode, Platform};

/// Soft per-file limit, 2.5 MiB.
pub const DEFAULT_BUDGET_BYTES: u64 = 1024 * 1024 * 5 / 2;

/// Syntax level the minifier is allowed to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Compat {
    /// Newer syntax permitted.
    Modern,
    /// Avoid syntax that trips Safari 10 era runtimes.
    Legacy,
}

impl Compat {
    /// Engine target string understood by the compiler, if any.
    pub fn engine_target(self) -> Option<&'static str> {
        match self {
            Compat::Modern => None,
            Compat::Legacy => Some("safari10"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SizeBudget {
    pub max_asset_bytes: u64,
    pub max_entrypoint_bytes: u64,
}

impl Default for SizeBudget {
    fn default() -> Self {
        Self {
            max_asset_bytes: DEFAULT_BUDGET_BYTES,
            max_entrypoint_bytes: DEFAULT_BUDGET_BYTES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MinifierSettings {
    pub enabled: bool,
    pub compat: Compat,
    pub source_maps: bool,
    pub budget: SizeBudget,
}

/// Minifier settings for `platform` under `mode`.
pub fn settings(mode: BuildMode, platform: Platform) -> MinifierSettings {
    MinifierSettings {
        enabled: mode.is_production(),
        compat: match platform {
            Platform::Web => Compat::Modern,
            Platform::Node => Compat::Legacy,
        },
        source_maps: true,
        budget: SizeBudget::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_is_two_and_a_half_mib() {
        assert_eq!(DEFAULT_BUDGET_BYTES, 2_621_440);
    }

    #[test]
    fn test_minify_only_in_production() {
        assert!(!settings(BuildMode::Development, Platform::Web).enabled);
        assert!(settings(BuildMode::Production, Platform::Web).enabled);
        assert!(settings(BuildMode::Production, Platform::Node).enabled);
    }

    #[test]
    fn test_source_maps_always_on() {
        for mode in [BuildMode::Development, BuildMode::Production] {
            assert!(settings(mode, Platform::Web).source_maps);
        }
    }

    #[test]
    fn test_node_uses_legacy_compat() {
        let node = settings(BuildMode::Production, Platform::Node);
        assert_eq!(node.compat, Compat::Legacy);
        assert_eq!(node.compat.engine_target(), Some("safari10"));
        let web = settings(BuildMode::Production, Platform::Web);
        assert_eq!(web.compat.engine_target(), None);
    }
}
