//! Integration tests for the `kiln` binary: discovery, dispatch, help,
//! aliases, and option validation against real plugin manifests.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Writes a plugin manifest into the directory `KILN_PATH` points at.
fn write_plugin(temp_dir: &TempDir, stem: &str, contents: &str) {
    fs::write(temp_dir.path().join(format!("{}.toml", stem)), contents).unwrap();
}

fn kiln(temp_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("kiln").unwrap();
    cmd.current_dir(temp_dir.path())
        .env("KILN_PATH", temp_dir.path())
        .env("KILN_LOG", "error");
    cmd
}

const WEBPACK_MANIFEST: &str = r#"
description = "Builds the project with webpack"
template = "echo webpack mode={{mode}}"
version = "1.0.0"

[options.mode]
describe = "build mode"
type = "string"
choices = ["dev", "production"]
required = true
alias = ["m"]

[[aliases]]
name = "ship"
description = "production build"
options = [{ option = "mode", value = "production" }]
"#;

const ROLLUP_MANIFEST: &str = r#"
description = "Builds the project with rollup"
template = "echo rollup {{args}}"
version = "2.0.0"
"#;

#[test]
fn test_no_args_prints_root_help() {
    let temp_dir = TempDir::new().unwrap();
    write_plugin(&temp_dir, "kiln-build-webpack", WEBPACK_MANIFEST);

    kiln(&temp_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage: kiln"))
        .stdout(predicate::str::contains("Project commands:"))
        .stdout(predicate::str::contains("webpack"))
        // Built-ins are global.
        .stdout(predicate::str::contains("Global commands:"))
        .stdout(predicate::str::contains("version"));
}

#[test]
fn test_named_subcommand_runs_template() {
    let temp_dir = TempDir::new().unwrap();
    write_plugin(&temp_dir, "kiln-build-webpack", WEBPACK_MANIFEST);

    kiln(&temp_dir)
        .args(["build", "webpack", "--mode", "dev"])
        .assert()
        .success()
        .stdout(predicate::str::contains("webpack mode=dev"));
}

#[test]
fn test_bare_group_runs_default_command() {
    let temp_dir = TempDir::new().unwrap();
    // Glob enumeration is lexicographic, so rollup loads first and
    // becomes the group default.
    write_plugin(&temp_dir, "kiln-build-rollup", ROLLUP_MANIFEST);
    write_plugin(&temp_dir, "kiln-build-webpack", WEBPACK_MANIFEST);

    kiln(&temp_dir)
        .arg("build")
        .assert()
        .success()
        .stdout(predicate::str::contains("rollup"));
}

#[test]
fn test_missing_required_option_blocks_run() {
    let temp_dir = TempDir::new().unwrap();
    write_plugin(&temp_dir, "kiln-build-webpack", WEBPACK_MANIFEST);

    kiln(&temp_dir)
        .args(["build", "webpack"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error(s):"))
        .stderr(predicate::str::contains("Required option 'mode' not provided"))
        .stdout(predicate::str::contains("webpack mode=").not());
}

#[test]
fn test_alias_pins_option_value_over_invoker() {
    let temp_dir = TempDir::new().unwrap();
    write_plugin(&temp_dir, "kiln-build-webpack", WEBPACK_MANIFEST);

    kiln(&temp_dir)
        .args(["ship", "--mode", "dev"])
        .assert()
        .success()
        .stdout(predicate::str::contains("webpack mode=production"));
}

#[test]
fn test_group_help_lists_commands_and_default_options() {
    let temp_dir = TempDir::new().unwrap();
    write_plugin(&temp_dir, "kiln-build-rollup", ROLLUP_MANIFEST);
    write_plugin(&temp_dir, "kiln-build-webpack", WEBPACK_MANIFEST);

    kiln(&temp_dir)
        .args(["build", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("There are 2 build commands: rollup, webpack"))
        .stdout(predicate::str::contains("rollup (Default)"));
}

#[test]
fn test_command_help_shows_option_annotations() {
    let temp_dir = TempDir::new().unwrap();
    write_plugin(&temp_dir, "kiln-build-webpack", WEBPACK_MANIFEST);

    kiln(&temp_dir)
        .args(["build", "webpack", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("-m, --mode"))
        .stdout(predicate::str::contains("[choices: dev, production]"))
        .stdout(predicate::str::contains("[required]"));
}

#[test]
fn test_unknown_group_fails_with_root_help() {
    let temp_dir = TempDir::new().unwrap();
    write_plugin(&temp_dir, "kiln-build-webpack", WEBPACK_MANIFEST);

    kiln(&temp_dir)
        .arg("deploy")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown command: deploy"))
        .stdout(predicate::str::contains("Usage: kiln"));
}

#[test]
fn test_version_command_lists_installed_plugins() {
    let temp_dir = TempDir::new().unwrap();
    write_plugin(&temp_dir, "kiln-build-webpack", WEBPACK_MANIFEST);

    kiln(&temp_dir)
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("You are currently running kiln"))
        .stdout(predicate::str::contains("build webpack 1.0.0"));
}

#[test]
fn test_malformed_plugin_fails_discovery() {
    let temp_dir = TempDir::new().unwrap();
    write_plugin(&temp_dir, "kiln-build-broken", "not toml [");

    kiln(&temp_dir)
        .arg("version")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid command manifest"));
}

#[test]
fn test_failing_template_reports_error() {
    let temp_dir = TempDir::new().unwrap();
    write_plugin(
        &temp_dir,
        "kiln-release-tag",
        "description = \"Tags a release\"\ntemplate = \"sh -c 'exit 3'\"\n",
    );

    kiln(&temp_dir)
        .args(["release", "tag"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}
