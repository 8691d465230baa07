//! Command implementations.
//!
//! Each command takes its parsed arguments plus the shared [`Context`].

pub mod build;
pub mod dev;
pub mod inspect;

use std::path::PathBuf;
use std::sync::Arc;

use goban_bundler::{ExecutionMode, Orchestrator, ToolchainCompiler};
use goban_config::{BuildSettings, SETTINGS_FILE};

pub use build::execute as build_execute;
pub use dev::execute as dev_execute;
pub use inspect::execute as inspect_execute;

/// What every command needs besides its own arguments.
#[derive(Debug, Clone)]
pub struct Context {
    /// Absolute project root.
    pub root: PathBuf,
    pub settings: BuildSettings,
    /// `--quiet`: no spinner or summary.
    pub quiet: bool,
}

impl Context {
    /// Called once logging is installed, so the settings load is reported.
    pub fn new(root: PathBuf, settings: BuildSettings, quiet: bool) -> Self {
        tracing::debug!(
            root = %root.display(),
            settings_file = root.join(SETTINGS_FILE).is_file(),
            log_level = settings.log_level.as_deref().unwrap_or("info"),
            "loaded build settings"
        );
        Self {
            root,
            settings,
            quiet,
        }
    }

    /// An orchestrator driving the configured toolchain.
    pub fn orchestrator(&self) -> Orchestrator {
        let compiler = ToolchainCompiler::from_settings(&self.settings, &self.root);
        Orchestrator::new(
            self.root.clone(),
            Arc::new(compiler),
            ExecutionMode::from_settings(&self.settings.build),
        )
    }
}
