//! [`Compiler`] backed by the project's own `tsc` and `esbuild`.
//!
//! A target compiles in two steps, both run to completion before anything
//! is returned:
//!
//! 1. `tsc --noEmit -p <profile>` type-checks the first-party tree. Any
//!    diagnostic outside third-party code fails the target.
//! 2. `esbuild --bundle` runs once per entry into a scratch directory. The
//!    environment constants go in as `--define`, so they are substituted
//!    before `--minify` gets to eliminate dead branches. The module wrapper
//!    and banner go in as `--banner:js` / `--footer:js` so source maps stay
//!    aligned.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Output;

use async_trait::async_trait;
use goban_config::{BuildSettings, Platform};
use tokio::process::Command;

use crate::compiler::{Artifact, CompileRequest, Compiler, EntryRequest};
use crate::{CompileStage, Error, Result};

/// One `tsc` diagnostic, possibly spanning several lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TscDiagnostic {
    pub file: Option<String>,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct ToolchainCompiler {
    tsc: PathBuf,
    esbuild: PathBuf,
}

impl ToolchainCompiler {
    pub fn new(tsc: impl Into<PathBuf>, esbuild: impl Into<PathBuf>) -> Self {
        Self {
            tsc: tsc.into(),
            esbuild: esbuild.into(),
        }
    }

    /// Tool paths from `goban-build.toml`, resolved against `root`.
    pub fn from_settings(settings: &BuildSettings, root: &Path) -> Self {
        Self::new(
            settings.tool_path(root, &settings.toolchain.tsc),
            settings.tool_path(root, &settings.toolchain.esbuild),
        )
    }

    async fn type_check(&self, request: &CompileRequest) -> Result<()> {
        let Some(tsconfig) = &request.tsconfig else {
            return Ok(());
        };

        let mut cmd = Command::new(&self.tsc);
        cmd.arg("--noEmit")
            .arg("--pretty")
            .arg("false")
            .arg("-p")
            .arg(tsconfig)
            .current_dir(&request.root);

        let output = run(&mut cmd, "tsc", &self.tsc).await?;
        if output.status.success() {
            return Ok(());
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let diagnostics: Vec<_> = parse_tsc_diagnostics(&stdout)
            .into_iter()
            .filter(|d| {
                d.file
                    .as_deref()
                    .is_none_or(|file| !request.is_excluded(Path::new(file)))
            })
            .collect();

        if diagnostics.is_empty() && !stdout.trim().is_empty() {
            tracing::debug!(
                platform = %request.platform,
                "ignoring type errors reported only in third-party code"
            );
            return Ok(());
        }

        let text = if diagnostics.is_empty() {
            String::from_utf8_lossy(&output.stderr).trim().to_string()
        } else {
            diagnostics
                .iter()
                .map(|d| d.text.as_str())
                .collect::<Vec<_>>()
                .join("\n")
        };

        Err(Error::CompileError {
            platform: request.platform,
            stage: CompileStage::TypeCheck,
            entry: None,
            diagnostics: text,
        })
    }

    async fn bundle_entry(
        &self,
        request: &CompileRequest,
        entry: &EntryRequest,
        scratch: &Path,
    ) -> Result<Vec<Artifact>> {
        let outfile = scratch.join(&entry.output_name);

        let mut cmd = Command::new(&self.esbuild);
        cmd.args(esbuild_args(request, entry, &outfile))
            .current_dir(&request.root);
        if !request.module_dirs.is_empty() {
            let node_path = std::env::join_paths(&request.module_dirs).map_err(|e| {
                Error::InvalidConfig(format!("invalid module directory: {}", e))
            })?;
            cmd.env("NODE_PATH", node_path);
        }

        let output = run(&mut cmd, "esbuild", &self.esbuild).await?;
        if !output.status.success() {
            return Err(Error::CompileError {
                platform: request.platform,
                stage: CompileStage::Bundle,
                entry: Some(entry.name.clone()),
                diagnostics: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let mut artifacts = vec![Artifact::new(
            entry.output_name.clone(),
            read(&outfile).await?,
        )];
        if request.source_maps {
            let map_name = format!("{}.map", entry.output_name);
            artifacts.push(Artifact::new(
                map_name.clone(),
                read(&scratch.join(&map_name)).await?,
            ));
        }
        Ok(artifacts)
    }
}

#[async_trait]
impl Compiler for ToolchainCompiler {
    async fn compile(&self, request: &CompileRequest) -> Result<Vec<Artifact>> {
        self.type_check(request).await?;

        let scratch = tempfile::Builder::new()
            .prefix(&format!("goban-{}-", request.platform))
            .tempdir()
            .map_err(|e| Error::IoError {
                message: "Failed to create scratch directory".to_string(),
                source: e,
            })?;

        let mut artifacts = Vec::new();
        for entry in &request.entries {
            tracing::debug!(
                platform = %request.platform,
                entry = %entry.name,
                "bundling entry"
            );
            artifacts.extend(self.bundle_entry(request, entry, scratch.path()).await?);
        }
        Ok(artifacts)
    }
}

async fn run(cmd: &mut Command, tool: &str, path: &Path) -> Result<Output> {
    cmd.kill_on_drop(true);
    cmd.output().await.map_err(|e| {
        if e.kind() == ErrorKind::NotFound {
            Error::ToolNotFound {
                tool: tool.to_string(),
                path: path.to_path_buf(),
            }
        } else {
            Error::IoError {
                message: format!("Failed to run {}", tool),
                source: e,
            }
        }
    })
}

async fn read(path: &Path) -> Result<Vec<u8>> {
    tokio::fs::read(path).await.map_err(|e| Error::IoError {
        message: format!("Failed to read compiler output '{}'", path.display()),
        source: e,
    })
}

/// Command line for bundling `entry` into `outfile`.
pub fn esbuild_args(request: &CompileRequest, entry: &EntryRequest, outfile: &Path) -> Vec<String> {
    let mut args = vec![
        entry.source.to_string_lossy().into_owned(),
        "--bundle".to_string(),
        "--format=cjs".to_string(),
        format!(
            "--platform={}",
            match request.platform {
                Platform::Web => "browser",
                Platform::Node => "node",
            }
        ),
        format!("--outfile={}", outfile.display()),
        format!("--resolve-extensions={}", request.resolve_extensions.join(",")),
    ];

    if let Some(tsconfig) = &request.tsconfig {
        args.push(format!("--tsconfig={}", tsconfig.display()));
    }
    for (expr, literal) in &request.defines {
        args.push(format!("--define:{}={}", expr, literal));
    }
    for module in &request.externals {
        args.push(format!("--external:{}", module));
    }
    for (ext, loader) in &request.loaders {
        args.push(format!("--loader:{}={}", ext, loader.as_str()));
    }
    if !request.wrapper.prologue.is_empty() {
        args.push(format!("--banner:js={}", request.wrapper.prologue));
    }
    if !request.wrapper.epilogue.is_empty() {
        args.push(format!("--footer:js={}", request.wrapper.epilogue));
    }
    if request.source_maps {
        args.push("--sourcemap".to_string());
    }
    if request.minify {
        args.push("--minify".to_string());
    }
    if let Some(target) = &request.engine_target {
        args.push(format!("--target={}", target));
    }
    args
}

/// Split `tsc --pretty false` output into diagnostics. Continuation lines
/// (indented) belong to the diagnostic above them.
pub fn parse_tsc_diagnostics(output: &str) -> Vec<TscDiagnostic> {
    let mut diagnostics: Vec<TscDiagnostic> = Vec::new();

    for line in output.lines() {
        if line.trim().is_empty() {
            continue;
        }
        if line.starts_with(char::is_whitespace) {
            if let Some(last) = diagnostics.last_mut() {
                last.text.push('\n');
                last.text.push_str(line);
                continue;
            }
        }

        let file = line
            .find("): error")
            .and_then(|end| line[..end].rfind('(').map(|start| line[..start].to_string()));
        diagnostics.push(TscDiagnostic {
            file,
            text: line.to_string(),
        });
    }

    diagnostics
}
