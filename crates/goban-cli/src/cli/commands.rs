use clap::{Args, Subcommand};

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compile every target for a build mode
    ///
    /// Development builds the web bundle only. Production builds the web
    /// bundle and the node engine, and writes nothing unless both compile.
    Build(BuildArgs),

    /// Serve the web target and rebuild on every source change
    ///
    /// Always uses development mode. Rebuilds are written to disk and
    /// connected browsers reload in full; there is no hot module replacement.
    Dev(DevArgs),

    /// Print the target descriptors for a build mode as JSON
    Inspect(InspectArgs),
}

/// Arguments for the build command
#[derive(Args, Debug, Default)]
pub struct BuildArgs {
    /// Build mode
    ///
    /// Only `production` selects a production build; any other value,
    /// or none, builds for development.
    #[arg(short, long, value_name = "MODE")]
    pub mode: Option<String>,
}

/// Arguments for the dev command
#[derive(Args, Debug, Default)]
pub struct DevArgs {
    /// Override the listening port
    #[arg(short, long)]
    pub port: Option<u16>,
}

/// Arguments for the inspect command
#[derive(Args, Debug, Default)]
pub struct InspectArgs {
    /// Build mode, interpreted like `build --mode`
    #[arg(short, long, value_name = "MODE")]
    pub mode: Option<String>,
}
