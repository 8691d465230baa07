//! Runs every target of one invocation and decides whether anything is
//! written.
//!
//! Targets share nothing but read-only source, so they may compile
//! concurrently. Whether they do is an explicit [`ExecutionMode`], never
//! inferred. Each target additionally sits behind its own lock, so the same
//! target never compiles twice at once even when two builds overlap (a dev
//! rebuild racing a manual one, for example).
//!
//! A build is valid only if every target compiled. All failures are
//! collected and reported together, and in that case nothing is written.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use goban_config::{BuildMode, Platform, TargetDescriptor};
use rustc_hash::FxHashMap;
use tokio::sync::{Mutex, Semaphore};
use tokio::task::JoinSet;

use crate::budget::{SizeBudgetWarning, check_budget};
use crate::compiler::{Artifact, CompileRequest, Compiler};
use crate::output::write_targets;
use crate::{Error, Result, TargetFailure};

/// How independent targets are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    /// Compile targets concurrently, at most `max` at a time.
    Parallel { max: usize },
    /// Compile targets one after another, in descriptor order.
    Sequential,
}

impl ExecutionMode {
    /// Parallel, bounded by the number of CPUs.
    pub fn parallel() -> Self {
        ExecutionMode::Parallel {
            max: num_cpus::get().max(1),
        }
    }

    pub fn from_settings(settings: &goban_config::ExecutionSettings) -> Self {
        if settings.parallel {
            match settings.max_parallel {
                Some(max) => ExecutionMode::Parallel { max: max.max(1) },
                None => ExecutionMode::parallel(),
            }
        } else {
            ExecutionMode::Sequential
        }
    }
}

/// Output of one target that compiled.
#[derive(Debug, Clone)]
pub struct TargetBuild {
    pub platform: Platform,
    /// Absolute output directory.
    pub out_dir: PathBuf,
    pub artifacts: Vec<Artifact>,
    pub duration: Duration,
    pub warnings: Vec<SizeBudgetWarning>,
}

impl TargetBuild {
    pub fn artifact(&self, file_name: &str) -> Option<&Artifact> {
        self.artifacts.iter().find(|a| a.file_name == file_name)
    }
}

#[derive(Debug, Clone)]
pub struct BuildReport {
    pub mode: BuildMode,
    /// In descriptor order.
    pub targets: Vec<TargetBuild>,
    pub duration: Duration,
}

impl BuildReport {
    pub fn warnings(&self) -> impl Iterator<Item = &SizeBudgetWarning> {
        self.targets.iter().flat_map(|t| t.warnings.iter())
    }
}

type Slots = FxHashMap<Platform, Arc<Mutex<()>>>;

pub struct Orchestrator {
    root: PathBuf,
    compiler: Arc<dyn Compiler>,
    execution: ExecutionMode,
    slots: Arc<Slots>,
}

impl Orchestrator {
    pub fn new(root: PathBuf, compiler: Arc<dyn Compiler>, execution: ExecutionMode) -> Self {
        let slots = [Platform::Web, Platform::Node]
            .into_iter()
            .map(|p| (p, Arc::new(Mutex::new(()))))
            .collect();
        Self {
            root,
            compiler,
            execution,
            slots: Arc::new(slots),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn execution(&self) -> ExecutionMode {
        self.execution
    }

    /// Compile every descriptor and write the result if all succeeded.
    pub async fn run(&self, descriptors: &[TargetDescriptor]) -> Result<BuildReport> {
        let start = Instant::now();
        let targets = self.compile(descriptors).await?;
        self.write(&targets)?;

        let mode = descriptors
            .first()
            .map(|d| d.mode)
            .unwrap_or_default();
        tracing::info!(
            mode = %mode,
            targets = targets.len(),
            "build finished in {:?}",
            start.elapsed()
        );
        Ok(BuildReport {
            mode,
            targets,
            duration: start.elapsed(),
        })
    }

    /// Compile every descriptor without writing.
    ///
    /// Returns the builds in descriptor order, or [`Error::TargetsFailed`]
    /// listing every target that failed.
    pub async fn compile(&self, descriptors: &[TargetDescriptor]) -> Result<Vec<TargetBuild>> {
        let mut jobs = Vec::with_capacity(descriptors.len());
        for descriptor in descriptors {
            let request = CompileRequest::from_descriptor(descriptor, &self.root)?;
            let slot = self.slot(descriptor.platform)?;
            jobs.push(Job {
                request,
                slot,
                out_dir: self.root.join(&descriptor.output.directory),
                entry_files: descriptor.artifact_names(),
                budget: descriptor.minifier.budget,
            });
        }

        let results = match self.execution {
            ExecutionMode::Sequential => {
                let mut results = Vec::with_capacity(jobs.len());
                for job in jobs {
                    let platform = job.request.platform;
                    results.push((platform, job.run(Arc::clone(&self.compiler)).await));
                }
                results
            }
            ExecutionMode::Parallel { max } => self.compile_concurrent(jobs, max).await,
        };

        merge_results(results)
    }

    /// Write compiled targets as one atomic batch.
    pub fn write(&self, targets: &[TargetBuild]) -> Result<()> {
        let batch: Vec<(PathBuf, &[Artifact])> = targets
            .iter()
            .map(|t| (t.out_dir.clone(), t.artifacts.as_slice()))
            .collect();
        write_targets(&batch)
    }

    fn slot(&self, platform: Platform) -> Result<Arc<Mutex<()>>> {
        self.slots
            .get(&platform)
            .cloned()
            .ok_or_else(|| Error::InvalidConfig(format!("no build slot for {}", platform)))
    }

    async fn compile_concurrent(
        &self,
        jobs: Vec<Job>,
        max: usize,
    ) -> Vec<(Platform, Result<TargetBuild>)> {
        let semaphore = Arc::new(Semaphore::new(max.max(1)));
        let mut join_set = JoinSet::new();
        let order: Vec<Platform> = jobs.iter().map(|j| j.request.platform).collect();

        for (index, job) in jobs.into_iter().enumerate() {
            let compiler = Arc::clone(&self.compiler);
            let permits = Arc::clone(&semaphore);
            join_set.spawn(async move {
                let platform = job.request.platform;
                let result = match permits.acquire_owned().await {
                    Ok(_permit) => job.run(compiler).await,
                    Err(_) => Err(Error::TaskPanicked("build semaphore closed".to_string())),
                };
                (index, platform, result)
            });
        }

        let mut slots: Vec<Option<(Platform, Result<TargetBuild>)>> =
            order.iter().map(|_| None).collect();
        let mut panics = Vec::new();
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((index, platform, result)) => slots[index] = Some((platform, result)),
                Err(join_err) => panics.push(join_err.to_string()),
            }
        }

        // Any slot left empty belonged to a task that panicked.
        let mut panics = panics.into_iter();
        slots
            .into_iter()
            .zip(order)
            .map(|(slot, platform)| {
                slot.unwrap_or_else(|| {
                    let message = panics.next().unwrap_or_else(|| "unknown".to_string());
                    (platform, Err(Error::TaskPanicked(message)))
                })
            })
            .collect()
    }
}

struct Job {
    request: CompileRequest,
    slot: Arc<Mutex<()>>,
    out_dir: PathBuf,
    entry_files: Vec<String>,
    budget: goban_config::SizeBudget,
}

impl Job {
    async fn run(self, compiler: Arc<dyn Compiler>) -> Result<TargetBuild> {
        let platform = self.request.platform;
        let _guard = self.slot.lock().await;
        let start = Instant::now();
        tracing::info!(platform = %platform, "compiling target");

        let artifacts = compiler.compile(&self.request).await?;
        let warnings = check_budget(platform, &artifacts, &self.entry_files, &self.budget);

        Ok(TargetBuild {
            platform,
            out_dir: self.out_dir,
            artifacts,
            duration: start.elapsed(),
            warnings,
        })
    }
}

fn merge_results(results: Vec<(Platform, Result<TargetBuild>)>) -> Result<Vec<TargetBuild>> {
    let mut builds = Vec::with_capacity(results.len());
    let mut failures = Vec::new();

    for (platform, result) in results {
        match result {
            Ok(build) => builds.push(build),
            Err(error) => {
                tracing::error!(platform = %platform, "target failed: {}", error);
                failures.push(TargetFailure { platform, error });
            }
        }
    }

    if failures.is_empty() {
        Ok(builds)
    } else {
        Err(Error::TargetsFailed(failures))
    }
}
