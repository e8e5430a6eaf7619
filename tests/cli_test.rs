//! Integration tests for the planflow binary.
// The cargo_bin function is marked deprecated in favor of cargo_bin! macro,
// but both work correctly. Suppressing until assert_cmd stabilizes the new API.
#![allow(deprecated)]

use assert_cmd::cargo::cargo_bin;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const COMMIT: &str = r#"
name: commit
input: { sha: abc123 }
finalize: true
actions:
  - name: ci
  - name: review
    input: { reviewer: Neo }
  - name: merge
    depends_on: [ci, review]
"#;

fn setup_project() -> TempDir {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("commit.yml"), COMMIT).unwrap();
    temp
}

fn planflow(temp: &TempDir) -> Command {
    let mut cmd = Command::new(cargo_bin("planflow"));
    cmd.current_dir(temp.path()).env_remove("PLANFLOW_STORE_DIR");
    cmd
}

/// Plan `commit.yml` quietly and return the new plan id.
fn plan_commit(temp: &TempDir) -> String {
    let output = planflow(temp)
        .args(["--quiet", "plan", "commit.yml"])
        .output()
        .unwrap();
    assert!(output.status.success());
    String::from_utf8(output.stdout)
        .unwrap()
        .lines()
        .next()
        .unwrap()
        .to_string()
}

#[test]
fn cli_shows_help() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    planflow(&temp)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Crash-recoverable execution plans"));
    Ok(())
}

#[test]
fn cli_requires_a_command() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    planflow(&temp).assert().failure();
    Ok(())
}

#[test]
fn plan_prints_id_and_flows() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project();
    planflow(&temp)
        .args(["plan", "commit.yml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Planned 'commit'"))
        .stdout(predicate::str::contains("Run flow:"))
        .stdout(predicate::str::contains("7: merge (pending)"))
        .stdout(predicate::str::contains("8: commit (pending)"));

    assert!(temp.path().join(".planflow").join("plans").is_dir());
    Ok(())
}

#[test]
fn plan_rejects_invalid_definitions() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    fs::write(
        temp.path().join("bad.yml"),
        "name: bad\nactions:\n  - name: a\n    depends_on: [missing]\n",
    )?;

    planflow(&temp)
        .args(["plan", "bad.yml"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("missing"));
    Ok(())
}

#[test]
fn show_renders_a_persisted_plan() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project();
    let plan_id = plan_commit(&temp);

    planflow(&temp)
        .args(["show", &plan_id])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("Plan: {}", plan_id)))
        .stdout(predicate::str::contains("Result: pending"))
        .stdout(predicate::str::contains("State: planned"))
        .stdout(predicate::str::contains("Ready: 3, 5"));
    Ok(())
}

#[test]
fn show_json_is_machine_readable() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project();
    let plan_id = plan_commit(&temp);

    let output = planflow(&temp).args(["show", &plan_id, "--json"]).output()?;
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(value["plan"]["id"], serde_json::json!(plan_id));
    assert_eq!(value["steps"].as_array().map(Vec::len), Some(8));
    Ok(())
}

#[test]
fn show_unknown_plan_exits_2() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    planflow(&temp)
        .args(["show", "does-not-exist"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("No plan with id"));
    Ok(())
}

#[test]
fn step_transitions_are_gated() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project();
    let plan_id = plan_commit(&temp);

    planflow(&temp)
        .args(["step", &plan_id, "7", "running"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("predecessors have not finished"));

    planflow(&temp)
        .args(["step", &plan_id, "3", "running"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Step 3 is running"));

    planflow(&temp)
        .args(["step", &plan_id, "3", "error", "--message", "red build"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Plan result: error"));

    planflow(&temp)
        .args(["show", &plan_id])
        .assert()
        .success()
        .stderr(predicate::str::contains("Step 3 failed: red build"));
    Ok(())
}

#[test]
fn retry_resets_a_failed_step() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project();
    let plan_id = plan_commit(&temp);
    planflow(&temp)
        .args(["step", &plan_id, "5", "running"])
        .assert()
        .success();
    planflow(&temp)
        .args(["step", &plan_id, "5", "error"])
        .assert()
        .success();

    planflow(&temp)
        .args(["retry", &plan_id, "5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Plan result: pending"));

    planflow(&temp)
        .args(["retry", &plan_id, "5"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid state transition"));
    Ok(())
}

#[test]
fn cancel_skips_pending_steps() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project();
    let plan_id = plan_commit(&temp);

    planflow(&temp)
        .args(["cancel", &plan_id])
        .assert()
        .success()
        .stdout(predicate::str::contains("Skipped steps 3, 5, 7, 8"))
        .stdout(predicate::str::contains("Plan state: stopped"));
    Ok(())
}

#[test]
fn list_filters_by_result() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project();
    let plan_id = plan_commit(&temp);

    planflow(&temp)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains(plan_id.as_str()))
        .stdout(predicate::str::contains("Page 1 of 1 (1 plans)"));

    planflow(&temp)
        .args(["list", "--result", "error"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No plans found."));
    Ok(())
}

#[test]
fn store_flag_and_env_choose_the_store() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project();

    planflow(&temp)
        .args(["--store", "custom", "plan", "commit.yml"])
        .assert()
        .success();
    assert!(temp.path().join("custom").join("plans").is_dir());

    planflow(&temp)
        .env("PLANFLOW_STORE_DIR", "from-env")
        .args(["plan", "commit.yml"])
        .assert()
        .success();
    assert!(temp.path().join("from-env").join("plans").is_dir());
    Ok(())
}

#[test]
fn settings_file_sets_page_size() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project();
    fs::write(temp.path().join("planflow.yml"), "per_page: 1\n")?;
    plan_commit(&temp);
    plan_commit(&temp);

    planflow(&temp)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Page 1 of 2 (2 plans)"));
    Ok(())
}

#[test]
fn invalid_settings_file_fails() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project();
    fs::write(temp.path().join("planflow.yml"), "per_page: [\n")?;

    planflow(&temp)
        .arg("list")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("planflow.yml"));
    Ok(())
}

#[test]
fn schema_describes_definitions() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    planflow(&temp)
        .arg("schema")
        .assert()
        .success()
        .stdout(predicate::str::contains("finalize_depends_on"));
    Ok(())
}

#[test]
fn completions_generate_scripts() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    planflow(&temp)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("planflow"));
    Ok(())
}
