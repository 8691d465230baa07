//! # goban-bundler
//!
//! Executes the target descriptors produced by `goban-config`.
//!
//! The compiler itself is a black box behind the [`Compiler`] trait. The
//! default implementation, [`ToolchainCompiler`], drives `tsc` for type
//! checking and `esbuild` for bundling. Everything around it lives here:
//!
//! - [`packager`] renders the module wrapper and license banner
//! - [`budget`] flags artifacts over the soft size limit
//! - [`orchestrator`] schedules targets, collects failures and only writes
//!   once every target compiled
//! - [`output::writer`] writes artifacts atomically
//!
//! ```no_run
//! use std::sync::Arc;
//! use goban_bundler::{ExecutionMode, Orchestrator, ToolchainCompiler};
//! use goban_config::{BuildMode, build_descriptors};
//!
//! # async fn run() -> goban_bundler::Result<()> {
//! let root = std::path::PathBuf::from(".");
//! let compiler = Arc::new(ToolchainCompiler::new(
//!     "node_modules/.bin/tsc",
//!     "node_modules/.bin/esbuild",
//! ));
//! let targets = build_descriptors(BuildMode::Production)?;
//! let report = Orchestrator::new(root, compiler, ExecutionMode::parallel())
//!     .run(&targets)
//!     .await?;
//! assert_eq!(report.targets.len(), 2);
//! # Ok(()) }
//! ```

pub mod budget;
pub mod compiler;
pub mod orchestrator;
pub mod output;
pub mod packager;
pub mod toolchain;

use std::path::PathBuf;

use goban_config::Platform;

pub use budget::{BudgetKind, SizeBudgetWarning, check_budget};
pub use compiler::{Artifact, CompileRequest, Compiler, EntryRequest, Loader};
pub use orchestrator::{BuildReport, ExecutionMode, Orchestrator, TargetBuild};
pub use packager::{Wrapper, render_wrapper};
pub use toolchain::ToolchainCompiler;

/// Which step of compiling a target failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompileStage {
    TypeCheck,
    Bundle,
}

impl std::fmt::Display for CompileStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompileStage::TypeCheck => write!(f, "type check"),
            CompileStage::Bundle => write!(f, "bundle"),
        }
    }
}

/// One target that did not compile.
#[derive(Debug)]
pub struct TargetFailure {
    pub platform: Platform,
    pub error: Error,
}

/// Error types for goban-bundler operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A type or syntax error in first-party source.
    #[error("{platform} {stage} failed{}:\n{diagnostics}", entry_suffix(.entry))]
    CompileError {
        platform: Platform,
        stage: CompileStage,
        entry: Option<String>,
        diagnostics: String,
    },

    /// One or more targets failed. Nothing was written.
    #[error("{}", format_failures(.0))]
    TargetsFailed(Vec<TargetFailure>),

    /// A toolchain executable could not be started.
    #[error("{tool} not found at {}", .path.display())]
    ToolNotFound { tool: String, path: PathBuf },

    /// Descriptor could not be turned into a compile request.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Config(#[from] goban_config::ConfigError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// I/O error with context message.
    #[error("{message}")]
    IoError {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Invalid output path (e.g., directory traversal attempt).
    #[error("Invalid output path: {0}")]
    InvalidOutputPath(String),

    /// File write operation failed.
    #[error("Write failure: {0}")]
    WriteFailure(String),

    /// A build task panicked.
    #[error("Build task panicked: {0}")]
    TaskPanicked(String),
}

/// Result type alias for goban-bundler operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// True when the failure comes from the source being compiled rather than
    /// from the environment.
    pub fn is_compile_error(&self) -> bool {
        match self {
            Error::CompileError { .. } => true,
            Error::TargetsFailed(failures) => {
                failures.iter().all(|f| f.error.is_compile_error())
            }
            _ => false,
        }
    }

    /// Platforms that failed, in the order they were reported.
    pub fn failed_platforms(&self) -> Vec<Platform> {
        match self {
            Error::CompileError { platform, .. } => vec![*platform],
            Error::TargetsFailed(failures) => failures.iter().map(|f| f.platform).collect(),
            _ => Vec::new(),
        }
    }
}

fn entry_suffix(entry: &Option<String>) -> String {
    entry
        .as_ref()
        .map(|e| format!(" for entry `{}`", e))
        .unwrap_or_default()
}

fn format_failures(failures: &[TargetFailure]) -> String {
    match failures {
        [] => "build failed".to_string(),
        [only] => only.error.to_string(),
        many => format!(
            "{} targets failed:\n{}",
            many.len(),
            many.iter()
                .map(|f| format!("[{}] {}", f.platform, f.error))
                .collect::<Vec<_>>()
                .join("\n")
        ),
    }
}

impl miette::Diagnostic for Error {
    fn code(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        Some(Box::new(match self {
            Error::CompileError { .. } => "COMPILE_ERROR",
            Error::TargetsFailed(_) => "TARGETS_FAILED",
            Error::ToolNotFound { .. } => "TOOL_NOT_FOUND",
            Error::InvalidConfig(_) => "INVALID_CONFIG",
            Error::Config(_) => "CONFIG_ERROR",
            Error::Io(_) | Error::IoError { .. } => "IO_ERROR",
            Error::InvalidOutputPath(_) => "INVALID_OUTPUT_PATH",
            Error::WriteFailure(_) => "WRITE_FAILURE",
            Error::TaskPanicked(_) => "TASK_PANICKED",
        }))
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(miette::Severity::Error)
    }

    fn help(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        match self {
            Error::CompileError { stage: CompileStage::TypeCheck, .. } => Some(Box::new(
                "Fix the type errors above; no artifact is written for a target that fails.",
            )),
            Error::TargetsFailed(failures) if failures.len() > 1 => Some(Box::new(
                "Every target must compile before anything is written. See details below.",
            )),
            Error::ToolNotFound { tool, .. } => Some(Box::new(format!(
                "Install {} (npm install) or point [toolchain] in goban-build.toml at it.",
                tool
            ))),
            Error::InvalidOutputPath(path) => Some(Box::new(format!(
                "The output path '{}' is invalid. Ensure it stays within the output directory.",
                path
            ))),
            Error::WriteFailure(msg) => Some(Box::new(format!(
                "Failed to write file. Check disk space and permissions.\nError: {}",
                msg
            ))),
            Error::TaskPanicked(_) => Some(Box::new("This is a bug in goban-build.")),
            _ => None,
        }
    }

    fn related(&self) -> Option<Box<dyn Iterator<Item = &dyn miette::Diagnostic> + '_>> {
        match self {
            Error::TargetsFailed(failures) if failures.len() > 1 => Some(Box::new(
                failures.iter().map(|f| &f.error as &dyn miette::Diagnostic),
            )),
            _ => None,
        }
    }
}
