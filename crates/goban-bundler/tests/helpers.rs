//! Shared test utilities for goban-bundler tests.
//!
//! `StubCompiler` stands in for the real toolchain: it "type-checks" by
//! looking for a `@type-error` marker in entry sources, substitutes the
//! defines textually, squeezes whitespace when minifying and wraps the
//! result. Enough to exercise everything around the compiler.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use goban_bundler::{
    Artifact, CompileRequest, CompileStage, Compiler, Error, ExecutionMode, Orchestrator, Result,
};
use tempfile::TempDir;

pub const TYPE_ERROR_MARKER: &str = "@type-error";

pub struct StubCompiler;

#[async_trait]
impl Compiler for StubCompiler {
    async fn compile(&self, request: &CompileRequest) -> Result<Vec<Artifact>> {
        let mut sources = Vec::new();
        for entry in &request.entries {
            let source = tokio::fs::read_to_string(&entry.source).await?;
            if source.contains(TYPE_ERROR_MARKER) {
                return Err(Error::CompileError {
                    platform: request.platform,
                    stage: CompileStage::TypeCheck,
                    entry: Some(entry.name.clone()),
                    diagnostics: format!(
                        "{}(1,1): error TS2322: Type 'string' is not assignable to type 'number'.",
                        entry.source.display()
                    ),
                });
            }
            sources.push((entry, source));
        }

        let mut artifacts = Vec::new();
        for (entry, source) in sources {
            let mut body = source;
            for (expr, literal) in &request.defines {
                body = body.replace(expr.as_str(), literal);
            }
            if request.minify {
                body = body
                    .lines()
                    .map(str::trim)
                    .filter(|l| !l.is_empty())
                    .collect::<Vec<_>>()
                    .join("");
            }
            artifacts.push(Artifact::new(
                entry.output_name.clone(),
                format!("{}{}{}", request.wrapper.prologue, body, request.wrapper.epilogue),
            ));
            if request.source_maps {
                artifacts.push(Artifact::new(
                    format!("{}.map", entry.output_name),
                    r#"{"version":3,"sources":[],"mappings":""}"#,
                ));
            }
        }
        Ok(artifacts)
    }
}

/// A throwaway project with the three first-party entry points.
pub struct Project {
    pub dir: TempDir,
}

impl Project {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let project = Self { dir };
        project.write(
            "src/goban/index.ts",
            "import { engine } from \"../engine\";\n\
             export function render(): string {\n    \
                 if (CLIENT) {\n        return \"browser\";\n    }\n    \
                 return engine();\n}\n",
        );
        project.write(
            "src/engine/index.ts",
            "export function engine(): string {\n    \
                 return process.env.NODE_ENV;\n}\n",
        );
        project.write(
            "src/test.tsx",
            "export const harness = SERVER ? null : \"test\";\n",
        );
        project
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }

    pub fn write(&self, relative: &str, contents: &str) {
        let path = self.path(relative);
        std::fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        std::fs::write(path, contents).expect("write");
    }

    pub fn read(&self, relative: &str) -> String {
        std::fs::read_to_string(self.path(relative)).expect("read")
    }

    pub fn break_engine(&self) {
        self.write(
            "src/engine/index.ts",
            &format!("// {}\nexport const engine: number = \"oops\";\n", TYPE_ERROR_MARKER),
        );
    }

    pub fn orchestrator(&self, execution: ExecutionMode) -> Orchestrator {
        Orchestrator::new(
            self.root().to_path_buf(),
            Arc::new(StubCompiler),
            execution,
        )
    }

    /// Files directly under `relative`, sorted. Empty if it does not exist.
    pub fn files_in(&self, relative: &str) -> Vec<String> {
        let Ok(entries) = std::fs::read_dir(self.path(relative)) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}
