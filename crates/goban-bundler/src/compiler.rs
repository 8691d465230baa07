//! The seam between descriptors and whatever actually compiles them.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use goban_config::{AssetRule, BuildMode, ModuleShape, Platform, TargetDescriptor, TransformChain};

use crate::packager::{Wrapper, render_wrapper};
use crate::{Error, Result};

/// How the compiler should load files with a given extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Loader {
    Ts,
    Tsx,
    /// File contents become a string literal.
    Text,
}

impl Loader {
    pub fn as_str(self) -> &'static str {
        match self {
            Loader::Ts => "ts",
            Loader::Tsx => "tsx",
            Loader::Text => "text",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryRequest {
    pub name: String,
    /// Absolute source path.
    pub source: PathBuf,
    /// Final filename inside the output directory.
    pub output_name: String,
}

/// Everything needed to compile one target, resolved against the project
/// root.
#[derive(Debug, Clone)]
pub struct CompileRequest {
    pub platform: Platform,
    pub mode: BuildMode,
    pub root: PathBuf,
    pub entries: Vec<EntryRequest>,
    /// Type-check profile, absolute.
    pub tsconfig: Option<PathBuf>,
    pub module_shape: ModuleShape,
    /// `(expression, literal)` constant substitutions.
    pub defines: Vec<(String, String)>,
    pub externals: Vec<String>,
    pub loaders: Vec<(String, Loader)>,
    pub rules: Vec<AssetRule>,
    pub resolve_extensions: Vec<String>,
    /// First-party module directories searched for bare specifiers.
    pub module_dirs: Vec<PathBuf>,
    pub wrapper: Wrapper,
    pub minify: bool,
    pub engine_target: Option<String>,
    pub source_maps: bool,
}

impl CompileRequest {
    pub fn from_descriptor(descriptor: &TargetDescriptor, root: &Path) -> Result<Self> {
        let entries = descriptor
            .entries
            .iter()
            .map(|(name, source)| EntryRequest {
                name: name.clone(),
                source: root.join(source.trim_start_matches("./")),
                output_name: descriptor.output.filename_for(name),
            })
            .collect();

        let profile = descriptor
            .asset_rules
            .iter()
            .find_map(|rule| rule.profile())
            .ok_or_else(|| {
                Error::InvalidConfig(format!(
                    "{} target has no TypeScript rule",
                    descriptor.platform
                ))
            })?;

        let mut loaders = Vec::new();
        for rule in &descriptor.asset_rules {
            for ext in &rule.extensions {
                let loader = match &rule.transform {
                    TransformChain::TypeScript { .. } if ext == ".tsx" => Loader::Tsx,
                    TransformChain::TypeScript { .. } => Loader::Ts,
                    TransformChain::InlineText => Loader::Text,
                };
                loaders.push((ext.clone(), loader));
            }
        }

        let module_dirs = descriptor
            .resolution
            .modules
            .iter()
            .filter(|dir| dir.as_str() != goban_config::assets::THIRD_PARTY_DIR)
            .map(|dir| root.join(dir))
            .collect();

        let wrapper = render_wrapper(
            &descriptor.output.wrapping,
            &descriptor.externals,
            descriptor.banner(),
        );

        Ok(Self {
            platform: descriptor.platform,
            mode: descriptor.mode,
            root: root.to_path_buf(),
            entries,
            tsconfig: Some(root.join(&profile.config_file)),
            module_shape: profile.module_shape,
            defines: descriptor.environment.defines(),
            externals: descriptor.externals.keys().cloned().collect(),
            loaders,
            rules: descriptor.asset_rules.clone(),
            resolve_extensions: descriptor.resolution.extensions.clone(),
            module_dirs,
            wrapper,
            minify: descriptor.minifier.enabled,
            engine_target: descriptor
                .minifier
                .compat
                .engine_target()
                .map(str::to_string),
            source_maps: descriptor.minifier.source_maps,
        })
    }

    /// True when `path` is excluded from every rule that would otherwise
    /// compile it (third-party code).
    pub fn is_excluded(&self, path: &Path) -> bool {
        self.rules.iter().any(|rule| rule.is_excluded(path))
    }
}

/// One emitted file, held in memory until the whole build succeeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub file_name: String,
    pub contents: Vec<u8>,
}

impl Artifact {
    pub fn new(file_name: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            contents: contents.into(),
        }
    }

    pub fn size(&self) -> u64 {
        self.contents.len() as u64
    }

    pub fn is_source_map(&self) -> bool {
        self.file_name.ends_with(".map")
    }

    pub fn content_type(&self) -> &'static str {
        if self.is_source_map() {
            "application/json"
        } else if self.file_name.ends_with(".js") {
            "application/javascript"
        } else {
            "application/octet-stream"
        }
    }
}

/// Black-box executor for a single target.
///
/// Implementations must either return every artifact for the target or an
/// error; a partial result is never acceptable. Constant substitution has to
/// happen before any minification so dead platform branches are dropped.
#[async_trait]
pub trait Compiler: Send + Sync {
    async fn compile(&self, request: &CompileRequest) -> Result<Vec<Artifact>>;
}
