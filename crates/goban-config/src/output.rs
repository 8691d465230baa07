//! Output directory, filename pattern and module wrapping per target.

use std::path::PathBuf;

use serde::Serialize;

use crate::{BuildMode, Platform};

/// Name the browser bundle is exposed under.
pub const LIBRARY_NAME: &str = "goban";

const NAME_PLACEHOLDER: &str = "[name]";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ModuleWrapping {
    /// Consumable as a global, an AMD module, or CommonJS (both styles).
    Umd { library_name: String },
    /// Plain `module.exports`.
    CommonJs,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputSpec {
    /// Relative to the project root.
    pub directory: PathBuf,
    pub filename_pattern: String,
    pub wrapping: ModuleWrapping,
}

impl OutputSpec {
    /// Output filename for the entry called `entry`.
    pub fn filename_for(&self, entry: &str) -> String {
        self.filename_pattern.replace(NAME_PLACEHOLDER, entry)
    }
}

/// Output spec for `platform` under `mode`.
pub fn package(mode: BuildMode, platform: Platform) -> OutputSpec {
    match platform {
        Platform::Web => OutputSpec {
            directory: PathBuf::from("lib"),
            filename_pattern: if mode.is_production() {
                "[name].min.js".to_string()
            } else {
                "[name].js".to_string()
            },
            wrapping: ModuleWrapping::Umd {
                library_name: LIBRARY_NAME.to_string(),
            },
        },
        Platform::Node => OutputSpec {
            directory: PathBuf::from("node"),
            filename_pattern: "[name].js".to_string(),
            wrapping: ModuleWrapping::CommonJs,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_web_filenames() {
        let dev = package(BuildMode::Development, Platform::Web);
        assert_eq!(dev.filename_for("goban"), "goban.js");
        let prod = package(BuildMode::Production, Platform::Web);
        assert_eq!(prod.filename_for("goban"), "goban.min.js");
        assert_eq!(prod.directory, PathBuf::from("lib"));
    }

    #[test]
    fn test_node_output_is_plain() {
        let node = package(BuildMode::Production, Platform::Node);
        assert_eq!(node.filename_for("engine"), "engine.js");
        assert_eq!(node.directory, PathBuf::from("node"));
        assert_eq!(node.wrapping, ModuleWrapping::CommonJs);
    }
}
