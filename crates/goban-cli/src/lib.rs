//! Command-line front end for the goban build.
//!
//! - [`cli`] - argument definitions
//! - [`commands`] - `build`, `dev` and `inspect`
//! - [`dev`] - development server, file watcher and rebuild loop
//! - [`error`] - CLI error type with actionable hints
//! - [`logger`] - tracing subscriber setup
//! - [`ui`] - status lines, spinner and build summary
//!
//! Descriptor construction lives in `goban-config`; compiling and writing in
//! `goban-bundler`. This crate only wires them to a terminal and a socket.

pub mod cli;
pub mod commands;
pub mod dev;
pub mod error;
pub mod logger;
pub mod ui;

pub use error::{CliError, Result, ResultExt};
