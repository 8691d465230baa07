//! `build`: compile every target for one mode.

use goban_config::{BuildMode, ConfigFactory};

use crate::cli::BuildArgs;
use crate::commands::Context;
use crate::error::Result;
use crate::ui;

pub async fn execute(args: BuildArgs, ctx: &Context) -> Result<()> {
    let mode = BuildMode::from_arg(args.mode.as_deref());
    let descriptors = ConfigFactory::new(mode).build()?;
    let targets: Vec<String> = descriptors.iter().map(|d| d.platform.to_string()).collect();
    tracing::debug!(root = %ctx.root.display(), "project root");

    let spinner = if ctx.quiet {
        ui::Spinner::hidden()
    } else {
        ui::Spinner::new(&format!("Building {} ({})", targets.join(" + "), mode))
    };

    match ctx.orchestrator().run(&descriptors).await {
        Ok(report) => {
            spinner.finish(&format!("Built {} target(s)", report.targets.len()));
            if !ctx.quiet {
                ui::print_build_summary(&report, &ctx.root);
            }
            for warning in report.warnings() {
                ui::warning(&warning.to_string());
            }
            Ok(())
        }
        Err(e) => {
            spinner.fail("Build failed, nothing was written");
            Err(e.into())
        }
    }
}
