//! Source file rules: which files get which transform chain.

use std::path::Path;

use regex::Regex;
use serde::{Serialize, Serializer};

use crate::{ConfigError, Platform, Result};

/// Directory whose contents are never type-checked or transpiled as first-party
/// source.
pub const THIRD_PARTY_DIR: &str = "node_modules";

/// Module shape a TypeScript profile emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleShape {
    /// Shape suitable for wrapping as a browser library.
    Browser,
    /// Plain server module.
    Server,
}

/// A TypeScript compiler profile (the tsconfig a target compiles against).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompilerProfile {
    pub config_file: String,
    pub module_shape: ModuleShape,
}

impl CompilerProfile {
    pub fn for_platform(platform: Platform) -> Self {
        match platform {
            Platform::Web => Self {
                config_file: "tsconfig.json".to_string(),
                module_shape: ModuleShape::Browser,
            },
            Platform::Node => Self {
                config_file: "tsconfig.node.json".to_string(),
                module_shape: ModuleShape::Server,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransformChain {
    /// Type-checked transpile with the given profile.
    TypeScript { profile: CompilerProfile },
    /// Embed file contents as a string literal.
    InlineText,
}

/// One `(file pattern -> transform chain)` entry.
#[derive(Debug, Clone, Serialize)]
pub struct AssetRule {
    #[serde(serialize_with = "serialize_regex")]
    pub test: Regex,
    #[serde(serialize_with = "serialize_opt_regex")]
    pub exclude: Option<Regex>,
    pub transform: TransformChain,
    /// File extensions the rule covers, in the form the compiler expects
    /// (`.ts`).
    pub extensions: Vec<String>,
}

impl AssetRule {
    pub fn new(
        test: &str,
        exclude: Option<&str>,
        transform: TransformChain,
        extensions: &[&str],
    ) -> Result<Self> {
        let test = compile(test)?;
        let exclude = exclude.map(compile).transpose()?;
        Ok(Self {
            test,
            exclude,
            transform,
            extensions: extensions.iter().map(|e| e.to_string()).collect(),
        })
    }

    /// True when the rule applies to `path`.
    pub fn matches(&self, path: &Path) -> bool {
        let s = path.to_string_lossy();
        self.test.is_match(&s) && !self.is_excluded(path)
    }

    pub fn is_excluded(&self, path: &Path) -> bool {
        let s = path.to_string_lossy();
        self.exclude.as_ref().is_some_and(|re| re.is_match(&s))
    }

    pub fn profile(&self) -> Option<&CompilerProfile> {
        match &self.transform {
            TransformChain::TypeScript { profile } => Some(profile),
            TransformChain::InlineText => None,
        }
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| ConfigError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })
}

fn serialize_regex<S: Serializer>(re: &Regex, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_str(re.as_str())
}

fn serialize_opt_regex<S: Serializer>(
    re: &Option<Regex>,
    s: S,
) -> std::result::Result<S::Ok, S::Error> {
    match re {
        Some(re) => s.serialize_some(re.as_str()),
        None => s.serialize_none(),
    }
}

/// Module resolution shared by every target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub modules: Vec<String>,
    pub extensions: Vec<String>,
}

impl Default for Resolution {
    fn default() -> Self {
        Self {
            modules: vec!["src".to_string(), THIRD_PARTY_DIR.to_string()],
            extensions: [".webpack.js", ".web.js", ".ts", ".tsx", ".js"]
                .iter()
                .map(|e| e.to_string())
                .collect(),
        }
    }
}

/// Ordered rule list for `platform`.
pub fn pipeline(platform: Platform) -> Result<Vec<AssetRule>> {
    let third_party = regex::escape(THIRD_PARTY_DIR);
    let mut rules = vec![AssetRule::new(
        r"\.tsx?$",
        Some(&third_party),
        TransformChain::TypeScript {
            profile: CompilerProfile::for_platform(platform),
        },
        &[".ts", ".tsx"],
    )?];

    if platform == Platform::Web {
        rules.push(AssetRule::new(
            r"\.svg$",
            None,
            TransformChain::InlineText,
            &[".svg"],
        )?);
    }

    Ok(rules)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_web_pipeline_has_ts_then_svg() {
        let rules = pipeline(Platform::Web).unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(
            rules[0].profile().map(|p| p.config_file.as_str()),
            Some("tsconfig.json")
        );
        assert_eq!(rules[1].transform, TransformChain::InlineText);
    }

    #[test]
    fn test_node_pipeline_uses_node_profile() {
        let rules = pipeline(Platform::Node).unwrap();
        assert_eq!(rules.len(), 1);
        let profile = rules[0].profile().unwrap();
        assert_eq!(profile.config_file, "tsconfig.node.json");
        assert_eq!(profile.module_shape, ModuleShape::Server);
    }

    #[test]
    fn test_third_party_excluded_from_compile() {
        let rules = pipeline(Platform::Web).unwrap();
        let ts = &rules[0];
        assert!(ts.matches(Path::new("src/engine/index.ts")));
        assert!(ts.matches(Path::new("src/test.tsx")));
        assert!(!ts.matches(Path::new("node_modules/pkg/index.ts")));
        assert!(ts.is_excluded(Path::new("node_modules/pkg/index.ts")));
        assert!(!ts.matches(Path::new("src/goban/index.js")));
    }

    #[test]
    fn test_svg_rule_matches_only_svg() {
        let rules = pipeline(Platform::Web).unwrap();
        let svg = &rules[1];
        assert!(svg.matches(Path::new("assets/stone.svg")));
        assert!(!svg.matches(Path::new("assets/stone.svg.ts")));
    }

    #[test]
    fn test_invalid_pattern_is_reported() {
        let err = AssetRule::new("(", None, TransformChain::InlineText, &[]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPattern { .. }));
    }

    #[test]
    fn test_rule_serializes_patterns_as_strings() {
        let rules = pipeline(Platform::Web).unwrap();
        let json = serde_json::to_value(&rules[0]).unwrap();
        assert_eq!(json["test"], serde_json::json!(r"\.tsx?$"));
        assert_eq!(json["exclude"], serde_json::json!("node_modules"));
        assert_eq!(json["transform"]["kind"], serde_json::json!("type_script"));
    }
}
