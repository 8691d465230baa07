//! Command-line interface definition.
//!
//! - `goban-build build --mode <MODE>` - compile every target for a mode
//! - `goban-build dev` - serve the web target and rebuild on change
//! - `goban-build inspect --mode <MODE>` - print the target descriptors

mod commands;

use std::path::PathBuf;

use clap::Parser;

pub use commands::{BuildArgs, Command, DevArgs, InspectArgs};

use crate::error::{CliError, Result, ResultExt};

/// goban-build - builds the goban rendering library and rules engine
#[derive(Parser, Debug)]
#[command(
    name = "goban-build",
    version,
    about = "Build the goban web and node bundles",
    long_about = "Builds the goban rendering library for browsers and the rules engine\n\
                  for node from one TypeScript source tree. Development builds produce the\n\
                  web bundle only; production builds produce both."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Project root containing `src/` and `goban-build.toml`
    ///
    /// Defaults to the current directory.
    #[arg(long, global = true, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// The project root as an absolute path.
    pub fn project_root(&self) -> Result<PathBuf> {
        let root = match &self.root {
            Some(root) if root.is_absolute() => root.clone(),
            Some(root) => std::env::current_dir()?.join(root),
            None => std::env::current_dir()?,
        };
        let metadata = std::fs::metadata(&root).with_path(&root)?;
        if !metadata.is_dir() {
            return Err(CliError::InvalidArgument(format!(
                "--root {} is not a directory",
                root.display()
            )));
        }
        Ok(root)
    }
}
