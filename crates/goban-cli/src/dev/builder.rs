//! One development rebuild, start to finish.

use std::path::PathBuf;
use std::time::Instant;

use async_trait::async_trait;
use goban_bundler::{Orchestrator, TargetBuild};
use goban_config::{Platform, TargetDescriptor};

use crate::dev::{BundleCache, DevEvent, Rebuild, SharedState};
use crate::ui;

/// Compiles the development descriptors, writes them to disk and publishes
/// the web bundle to the server.
pub struct DevBuilder {
    orchestrator: Orchestrator,
    descriptors: Vec<TargetDescriptor>,
    state: SharedState,
}

impl DevBuilder {
    pub fn new(
        orchestrator: Orchestrator,
        descriptors: Vec<TargetDescriptor>,
        state: SharedState,
    ) -> Self {
        Self {
            orchestrator,
            descriptors,
            state,
        }
    }

    /// Build once. On failure the previous bundle stays on disk and in the
    /// cache.
    pub async fn build(&self) -> Result<u64, String> {
        let start = Instant::now();
        self.state.start_build();
        self.state.broadcast(&DevEvent::BuildStarted);

        match self.compile_and_write().await {
            Ok(targets) => {
                let duration_ms = start.elapsed().as_millis() as u64;
                let web = targets
                    .iter()
                    .find(|t| t.platform == Platform::Web)
                    .map(|t| BundleCache::from_artifacts(&t.artifacts))
                    .unwrap_or_default();
                for warning in targets.iter().flat_map(|t| t.warnings.iter()) {
                    ui::warning(&warning.to_string());
                }
                self.state.complete_build(duration_ms, web);
                self.state
                    .broadcast(&DevEvent::BuildCompleted { duration_ms });
                Ok(duration_ms)
            }
            Err(e) => {
                let error = e.to_string();
                self.state.fail_build(error.clone());
                self.state.broadcast(&DevEvent::BuildFailed {
                    error: error.clone(),
                });
                Err(error)
            }
        }
    }

    async fn compile_and_write(&self) -> goban_bundler::Result<Vec<TargetBuild>> {
        let targets = self.orchestrator.compile(&self.descriptors).await?;
        if self.state.settings.write_to_disk {
            self.orchestrator.write(&targets)?;
        }
        Ok(targets)
    }
}

#[async_trait]
impl Rebuild for DevBuilder {
    async fn rebuild(&self, changed: &[PathBuf]) -> bool {
        match changed {
            [one] => ui::info(&format!("Changed: {}", one.display())),
            many => ui::info(&format!("{} files changed", many.len())),
        }
        match self.build().await {
            Ok(ms) => {
                ui::success(&format!("Rebuilt in {}ms", ms));
                true
            }
            Err(error) => {
                ui::error(&format!("Rebuild failed, serving previous build:\n{}", error));
                false
            }
        }
    }
}
