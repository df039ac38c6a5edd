//! End-to-end tests of the edgestack binary.
//!
//! Every command runs inside a temporary project with an isolated home
//! directory, so no user configuration leaks into the results.

mod common;

use assert_cmd::Command;
use common::*;
use predicates::prelude::*;

const ISSUED_AT: &str = "2024-01-01T00:00:00Z";

fn edgestack_cmd(project: &TempProject) -> Command {
    let mut cmd = Command::cargo_bin("edgestack").unwrap();
    cmd.current_dir(project.path())
        .env("HOME", project.path())
        .env("NO_COLOR", "1")
        .env_remove("EDGESTACK_CONFIG")
        .env_remove("EDGESTACK_STACK")
        .env_remove("EDGESTACK_PROJECT_DIR")
        .env_remove("EDGESTACK_OUTPUT")
        .env_remove("RUST_LOG");
    cmd
}

// ============================================================================
// Argument Parsing
// ============================================================================

#[test]
fn test_help() {
    let project = StackFixture::new("dev").write_project();
    edgestack_cmd(&project)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("render"))
        .stdout(predicate::str::contains("diff"))
        .stdout(predicate::str::contains("names"));
}

#[test]
fn test_version() {
    let project = StackFixture::new("dev").write_project();
    edgestack_cmd(&project)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_missing_stack_selection() {
    let project = StackFixture::new("dev").write_project();
    edgestack_cmd(&project)
        .arg("render")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No stack selected"));
}

// ============================================================================
// Render and Diff
// ============================================================================

#[test]
fn test_render_to_stdout() {
    let project = StackFixture::new("staging").write_project();
    edgestack_cmd(&project)
        .args(["--stack", "staging", "render", "--issued-at", ISSUED_AT])
        .assert()
        .success()
        .stdout(predicate::str::contains("runtime: yaml"))
        .stdout(predicate::str::contains("rg-acme-staging"))
        .stdout(predicate::str::contains("2024-01-01T00:00:00.000Z"));
}

#[test]
fn test_render_json_from_extension() {
    let project = StackFixture::new("staging").write_project();
    let out = project.join("program.json");

    edgestack_cmd(&project)
        .args(["-s", "staging", "render", "--out"])
        .arg(&out)
        .assert()
        .success();

    let text = std::fs::read_to_string(&out).unwrap();
    let doc: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(doc["runtime"], "yaml");
}

#[test]
fn test_stack_from_environment() {
    let project = StackFixture::new("dev").write_project();
    edgestack_cmd(&project)
        .env("EDGESTACK_STACK", "dev")
        .arg("render")
        .assert()
        .success()
        .stdout(predicate::str::contains("rg-acme-dev"));
}

#[test]
fn test_diff_after_render() {
    let project = StackFixture::new("staging").write_project();
    let out = project.join("Pulumi.rendered.yaml");

    edgestack_cmd(&project)
        .args(["-s", "staging", "render", "-o"])
        .arg(&out)
        .assert()
        .success();

    // the SAS start is taken from the rendered file
    edgestack_cmd(&project)
        .args(["-s", "staging", "diff", "--against"])
        .arg(&out)
        .assert()
        .code(0)
        .stdout(predicate::str::contains("No changes"));

    let mut changed = StackFixture::new("staging");
    changed.set("waf:params", "allowedIpRanges: [203.0.113.0/24]");
    project.add_stack(&changed);

    edgestack_cmd(&project)
        .args(["-s", "staging", "diff", "--against"])
        .arg(&out)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("203.0.113.0/24"))
        .stdout(predicate::str::contains("wafPolicy"));
}

#[test]
fn test_diff_without_rendered_file() {
    let project = StackFixture::new("dev").write_project();
    edgestack_cmd(&project)
        .args(["-s", "dev", "diff", "--against", "missing.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing.yaml"));
}

// ============================================================================
// Validation
// ============================================================================

#[test]
fn test_config_env_file_layers_over_home_file() {
    let project = StackFixture::new("staging").write_project();
    std::fs::write(
        project.join(".edgestack.toml"),
        "[defaults]\nstack = \"staging\"\n",
    )
    .unwrap();
    let extra = project.join("extra.toml");
    std::fs::write(&extra, "[colors]\nenabled = false\n").unwrap();

    edgestack_cmd(&project)
        .env("EDGESTACK_CONFIG", &extra)
        .arg("names")
        .assert()
        .success()
        .stdout(predicate::str::contains("saacmestaging"));
}

#[test]
fn test_missing_required_key() {
    let mut fixture = StackFixture::new("dev");
    fixture.remove("azure-native:location");
    let project = fixture.write_project();

    edgestack_cmd(&project)
        .args(["-s", "dev", "render"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("azure-native:location"));
}

#[test]
fn test_missing_stack_file() {
    let project = StackFixture::new("dev").write_project();
    edgestack_cmd(&project)
        .args(["-s", "prod", "render"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("Pulumi.prod.yaml"));
}

#[test]
fn test_check_reports_findings() {
    let project = StackFixture::new("staging").write_project();
    edgestack_cmd(&project)
        .args(["-s", "staging", "check"])
        .assert()
        .success()
        .stdout(predicate::str::contains("KV001"))
        .stdout(predicate::str::contains("ST001"))
        .stderr(predicate::str::contains("KV001").not());
}

#[test]
fn test_check_strict_fails_on_errors() {
    let project = StackFixture::new("staging").write_project();
    edgestack_cmd(&project)
        .args(["-s", "staging", "check", "--strict"])
        .assert()
        .code(2);

    edgestack_cmd(&project)
        .args(["-s", "staging", "check", "--strict", "--skip", "KV001"])
        .assert()
        .code(0);
}

#[test]
fn test_check_json_output() {
    let project = StackFixture::new("staging").write_project();
    let output = edgestack_cmd(&project)
        .args(["-s", "staging", "--output", "json", "check"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let result: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(result["issues"].as_array().unwrap().len() >= 2);
}

// ============================================================================
// Inspection
// ============================================================================

#[test]
fn test_names() {
    let project = StackFixture::new("prod").write_project();
    edgestack_cmd(&project)
        .args(["-s", "prod", "names"])
        .assert()
        .success()
        .stdout(predicate::str::contains("saacmeprod"))
        .stdout(predicate::str::contains("cdn.beopenit.io"))
        .stdout(predicate::str::contains("Override"));
}

#[test]
fn test_graph_dot() {
    let project = StackFixture::new("dev").write_project();
    edgestack_cmd(&project)
        .args(["-s", "dev", "graph", "--dot"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("digraph declarations {"))
        .stdout(predicate::str::contains("\"origin\" -> \"route\""));
}

#[test]
fn test_graph_order() {
    let project = StackFixture::new("dev").write_project();
    edgestack_cmd(&project)
        .args(["-s", "dev", "graph"])
        .assert()
        .success()
        .stdout(predicate::str::contains("resourceGroup"))
        .stdout(predicate::str::contains("declarations"));
}
