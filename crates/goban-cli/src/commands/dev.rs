//! `dev`: serve the web target and rebuild on change.
//!
//! 1. resolve the development descriptors and the web dev-server settings
//! 2. build once (a failure is reported, the server still starts)
//! 3. watch `src/`, serve, and rebuild through the [`RebuildLoop`]
//! 4. stop on Ctrl+C

use std::sync::Arc;
use std::time::Duration;

use goban_config::{BuildMode, ConfigFactory, Platform};
use tokio::signal;

use crate::cli::DevArgs;
use crate::commands::Context;
use crate::dev::{DevBuilder, DevServer, DevServerState, FileWatcher, RebuildLoop, watcher};
use crate::error::{CliError, Result, ResultExt};
use crate::ui;

pub async fn execute(args: DevArgs, ctx: &Context) -> Result<()> {
    let descriptors = ConfigFactory::new(BuildMode::Development).build()?;
    let mut settings = descriptors
        .iter()
        .find(|d| d.platform == Platform::Web)
        .and_then(|d| d.dev_server.clone())
        .ok_or_else(|| CliError::Custom("no web dev server in development mode".into()))?;
    if let Some(port) = args.port {
        settings.port = port;
    }

    let state = Arc::new(DevServerState::new(ctx.root.clone(), settings));
    let builder = Arc::new(DevBuilder::new(
        ctx.orchestrator(),
        descriptors,
        Arc::clone(&state),
    ));

    ui::info("Performing initial build...");
    match builder.build().await {
        Ok(ms) => ui::success(&format!("Initial build completed in {}ms", ms)),
        Err(error) => ui::error(&format!("Initial build failed:\n{}", error)),
    }

    let ignores = watcher::DEFAULT_IGNORES
        .iter()
        .map(|s| s.to_string())
        .collect();
    let (file_watcher, changes) = FileWatcher::new(ctx.root.join("src"), ctx.root.clone(), ignores)
        .context("Failed to watch sources")?;
    ui::info(&format!("Watching {}", file_watcher.watched().display()));

    let mut server = tokio::spawn(DevServer::new(Arc::clone(&state)).start());

    let rebuilds = RebuildLoop::new(Duration::from_millis(ctx.settings.dev.debounce_ms));
    let rebuild_builder = Arc::clone(&builder);
    let mut rebuild_task = tokio::spawn(async move {
        rebuilds.run(changes, rebuild_builder.as_ref()).await
    });

    ui::info("Press Ctrl+C to stop");

    let outcome = tokio::select! {
        _ = signal::ctrl_c() => {
            ui::info("Shutting down development server...");
            Ok(())
        }
        joined = &mut server => match joined {
            Ok(Ok(())) => Err(CliError::Server("server stopped unexpectedly".into())),
            Ok(Err(e)) => Err(e),
            Err(e) => Err(CliError::Server(e.to_string())),
        },
        _ = &mut rebuild_task => Err(CliError::Custom("file watcher stopped".into())),
    };

    server.abort();
    rebuild_task.abort();
    drop(file_watcher);

    if outcome.is_ok() {
        ui::success("Development server stopped");
    }
    outcome
}
