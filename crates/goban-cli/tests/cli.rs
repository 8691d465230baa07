//! Smoke tests for the goban-build binary.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

fn goban_build() -> Command {
    cargo_bin_cmd!("goban-build")
}

/// A checkout with sources but no installed toolchain.
fn project() -> TempDir {
    let temp = TempDir::new().unwrap();
    for (path, contents) in [
        ("src/goban/index.ts", "export const goban = 1;\n"),
        ("src/engine/index.ts", "export const engine = 1;\n"),
        ("src/test.tsx", "export const test = 1;\n"),
    ] {
        let path = temp.path().join(path);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }
    temp
}

fn inspect(mode: Option<&str>) -> serde_json::Value {
    let temp = project();
    let mut cmd = goban_build();
    cmd.arg("--root").arg(temp.path()).arg("inspect");
    if let Some(mode) = mode {
        cmd.args(["--mode", mode]);
    }
    let output = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&output).unwrap()
}

#[test]
fn help_lists_commands() {
    goban_build()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("build"))
        .stdout(predicate::str::contains("dev"))
        .stdout(predicate::str::contains("inspect"));
}

#[test]
fn inspect_production_has_web_and_node() {
    let descriptors = inspect(Some("production"));
    let descriptors = descriptors.as_array().unwrap();
    assert_eq!(descriptors.len(), 2);
    assert_eq!(descriptors[0]["platform"], "web");
    assert_eq!(descriptors[1]["platform"], "node");
    assert_eq!(descriptors[0]["output"]["filename_pattern"], "[name].min.js");
}

#[test]
fn inspect_unknown_mode_falls_back_to_development() {
    for mode in [Some("bogus"), Some("Production"), None] {
        let descriptors = inspect(mode);
        let descriptors = descriptors.as_array().unwrap();
        assert_eq!(descriptors.len(), 1, "mode {:?}", mode);
        assert_eq!(descriptors[0]["mode"], "development");
        assert_eq!(descriptors[0]["dev_server"]["hot"], false);
    }
}

#[test]
fn build_without_toolchain_fails_and_writes_nothing() {
    let temp = project();

    goban_build()
        .arg("--root")
        .arg(temp.path())
        .args(["--no-color", "build", "--mode", "production"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));

    assert!(!temp.path().join("lib").exists());
    assert!(!temp.path().join("node").exists());
}

#[test]
fn missing_root_is_reported() {
    goban_build()
        .args(["--root", "/definitely/not/a/goban/checkout", "inspect"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("File not found"));
}

#[test]
fn verbose_logs_settings_load() {
    let temp = project();

    goban_build()
        .arg("--root")
        .arg(temp.path())
        .args(["--verbose", "--no-color", "inspect"])
        .assert()
        .success()
        .stderr(predicate::str::contains("loaded build settings"));
}

#[test]
fn root_must_be_a_directory() {
    let temp = project();
    let file = temp.path().join("src/test.tsx");

    goban_build()
        .arg("--root")
        .arg(&file)
        .arg("inspect")
        .assert()
        .failure()
        .stderr(predicate::str::contains("is not a directory"));
}

#[test]
fn invalid_settings_file_is_reported() {
    let temp = project();
    std::fs::write(temp.path().join("goban-build.toml"), "log_level = \"loud\"\n").unwrap();

    goban_build()
        .arg("--root")
        .arg(temp.path())
        .arg("inspect")
        .assert()
        .failure()
        .stderr(predicate::str::contains("log_level"));
}
