//! goban-build - builds the goban web and node bundles.
//!
//! Parses arguments, loads the optional settings file, installs logging and
//! dispatches to the selected command.

use clap::Parser;
use goban_cli::{cli, commands, error, logger, ui};
use miette::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    let root = args.project_root().map_err(error::cli_error_to_miette)?;
    let settings = goban_config::BuildSettings::load(&root)
        .map_err(|e| error::cli_error_to_miette(e.into()))?;

    logger::init_logger(
        args.verbose,
        args.quiet,
        args.no_color,
        settings.log_level.as_deref(),
    );
    ui::init_colors(args.no_color);

    let ctx = commands::Context::new(root, settings, args.quiet);
    let result = match args.command {
        cli::Command::Build(build_args) => commands::build_execute(build_args, &ctx).await,
        cli::Command::Dev(dev_args) => commands::dev_execute(dev_args, &ctx).await,
        cli::Command::Inspect(inspect_args) => commands::inspect_execute(inspect_args, &ctx),
    };

    result.map_err(error::cli_error_to_miette)
}
