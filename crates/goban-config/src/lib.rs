//! # goban-config
//!
//! Pure construction of the target descriptors for the goban build.
//!
//! A build invocation picks a [`BuildMode`]; [`ConfigFactory`] turns it into
//! an ordered list of [`TargetDescriptor`]s (web first, then node in
//! production). Each descriptor is assembled from small, independent
//! producers:
//!
//! - [`env`] computes the compile-time constants
//! - [`assets`] maps file patterns to transform chains
//! - [`externals`] lists modules the host supplies
//! - [`minify`] holds compression and size budget settings
//! - [`output`] picks the output directory, filename pattern and wrapping
//! - [`dev`] describes the development server
//!
//! Nothing in this crate touches the filesystem except [`BuildSettings`],
//! which reads the optional ambient settings file.
//!
//! ```
//! use goban_config::{BuildMode, ConfigFactory, Platform};
//!
//! let targets = ConfigFactory::new(BuildMode::Production).build().unwrap();
//! assert_eq!(targets[0].platform, Platform::Web);
//! assert_eq!(targets[1].primary_artifact(), "engine.js");
//! ```

pub mod assets;
pub mod banner;
pub mod descriptor;
pub mod dev;
pub mod env;
pub mod error;
pub mod externals;
pub mod factory;
pub mod minify;
pub mod mode;
pub mod output;
pub mod platform;
pub mod plugins;
pub mod settings;

pub use assets::{AssetRule, CompilerProfile, ModuleShape, Resolution, TransformChain};
pub use descriptor::{ENGINE_ENTRY, TargetDescriptor, WEB_ONLY_ENTRIES};
pub use dev::{AllowedHosts, DevServerSettings};
pub use env::{ConstScope, ConstValue, EnvConstant, EnvironmentConstants};
pub use error::{ConfigError, Result};
pub use externals::Externals;
pub use factory::{ConfigFactory, build_descriptors};
pub use minify::{Compat, MinifierSettings, SizeBudget};
pub use mode::BuildMode;
pub use output::{LIBRARY_NAME, ModuleWrapping, OutputSpec};
pub use platform::Platform;
pub use plugins::Plugin;
pub use settings::{BuildSettings, ExecutionSettings, SETTINGS_FILE, ToolchainSettings, WatchSettings};
