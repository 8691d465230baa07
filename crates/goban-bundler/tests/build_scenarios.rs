//! End-to-end build scenarios through the orchestrator.

mod helpers;

use goban_bundler::{Error, ExecutionMode};
use goban_config::{BuildMode, Platform, build_descriptors};
use helpers::Project;

fn execution_modes() -> Vec<ExecutionMode> {
    vec![ExecutionMode::Parallel { max: 2 }, ExecutionMode::Sequential]
}

#[tokio::test]
async fn production_build_emits_both_targets() {
    for execution in execution_modes() {
        let project = Project::new();
        let targets = build_descriptors(BuildMode::Production).unwrap();

        let report = project.orchestrator(execution).run(&targets).await.unwrap();

        assert_eq!(report.targets.len(), 2);
        let primaries: Vec<_> = targets.iter().map(|t| t.primary_artifact()).collect();
        assert_eq!(primaries, vec!["goban.min.js", "engine.js"]);
        assert!(project.path("lib/goban.min.js").is_file());
        assert!(project.path("node/engine.js").is_file());
        assert_eq!(project.files_in("node"), vec!["engine.js", "engine.js.map"]);
        assert!(
            project
                .files_in("lib")
                .iter()
                .filter(|f| !f.ends_with(".map"))
                .all(|f| f.ends_with(".min.js"))
        );
    }
}

#[tokio::test]
async fn type_error_in_shared_engine_fails_both_and_writes_nothing() {
    for execution in execution_modes() {
        let project = Project::new();
        project.break_engine();
        let targets = build_descriptors(BuildMode::Production).unwrap();

        let err = project
            .orchestrator(execution)
            .run(&targets)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::TargetsFailed(_)));
        assert!(err.is_compile_error());
        assert_eq!(err.failed_platforms(), vec![Platform::Web, Platform::Node]);
        assert!(project.files_in("lib").is_empty());
        assert!(project.files_in("node").is_empty());
    }
}

#[tokio::test]
async fn development_build_is_web_only_and_readable() {
    let project = Project::new();
    let targets = build_descriptors(BuildMode::Development).unwrap();

    project
        .orchestrator(ExecutionMode::parallel())
        .run(&targets)
        .await
        .unwrap();

    assert!(!project.path("node").exists());
    let goban = project.read("lib/goban.js");
    assert!(goban.contains("export function render(): string {\n    if (true) {"));
    assert!(project.read("lib/engine.js").contains("return \"development\";"));
    assert!(goban.starts_with("/*!\n * Copyright (C)  Online-Go.com\n"));
    assert!(goban.contains("webpackUniversalModuleDefinition"));
    assert!(project.path("lib/goban.js.map").is_file());
}

#[tokio::test]
async fn platform_constants_are_substituted_per_target() {
    let project = Project::new();
    let targets = build_descriptors(BuildMode::Production).unwrap();
    let report = project
        .orchestrator(ExecutionMode::Sequential)
        .run(&targets)
        .await
        .unwrap();

    let web_test = report.targets[0].artifact("test.min.js").unwrap();
    let web_test = String::from_utf8_lossy(&web_test.contents);
    assert!(web_test.contains("false ? null : \"test\""));

    let node_engine = report.targets[1].artifact("engine.js").unwrap();
    let node_engine = String::from_utf8_lossy(&node_engine.contents);
    assert!(node_engine.contains("return \"production\";"));
    assert!(!node_engine.contains("webpackUniversalModuleDefinition"));
    assert!(node_engine.starts_with("/*!\n"));
}

#[tokio::test]
async fn failed_rebuild_keeps_previous_artifacts() {
    let project = Project::new();
    let targets = build_descriptors(BuildMode::Production).unwrap();
    let orchestrator = project.orchestrator(ExecutionMode::parallel());

    orchestrator.run(&targets).await.unwrap();
    let before = project.read("lib/goban.min.js");

    project.break_engine();
    assert!(orchestrator.run(&targets).await.is_err());

    assert_eq!(project.read("lib/goban.min.js"), before);
    assert!(project.path("node/engine.js").is_file());
}

#[tokio::test]
async fn oversized_artifact_warns_but_succeeds() {
    let project = Project::new();
    let filler = "x".repeat(3 * 1024 * 1024);
    project.write(
        "src/test.tsx",
        &format!("export const blob = \"{}\";\n", filler),
    );
    let targets = build_descriptors(BuildMode::Development).unwrap();

    let report = project
        .orchestrator(ExecutionMode::Sequential)
        .run(&targets)
        .await
        .unwrap();

    let warnings: Vec<_> = report.warnings().collect();
    assert!(!warnings.is_empty());
    assert!(warnings.iter().all(|w| w.file_name == "test.js"));
    assert!(project.path("lib/test.js").is_file());
}

#[tokio::test]
async fn compile_without_write_leaves_disk_untouched() {
    let project = Project::new();
    let targets = build_descriptors(BuildMode::Production).unwrap();

    let builds = project
        .orchestrator(ExecutionMode::parallel())
        .compile(&targets)
        .await
        .unwrap();

    assert_eq!(builds.len(), 2);
    assert!(!project.path("lib").exists());
}
