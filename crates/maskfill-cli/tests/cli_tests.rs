//! CLI integration tests using assert_cmd.

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// The binary, isolated from the caller's home config and store overrides.
fn maskfill(home: &Path) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("maskfill").unwrap();
    cmd.env("HOME", home)
        .env_remove("MASKFILL_SUPABASE_URL")
        .env_remove("MASKFILL_SUPABASE_ANON_KEY")
        .env_remove("RUST_LOG");
    cmd
}

fn initialized_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    maskfill(dir.path())
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success();
    dir
}

#[test]
fn help_lists_commands() {
    let dir = TempDir::new().unwrap();
    maskfill(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("sentences"))
        .stdout(predicate::str::contains("init"));
}

#[test]
fn version_flag() {
    let dir = TempDir::new().unwrap();
    maskfill(dir.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("maskfill"));
}

#[test]
fn init_creates_files() {
    let dir = TempDir::new().unwrap();

    maskfill(dir.path())
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created maskfill.toml"))
        .stdout(predicate::str::contains("Created sentences.toml"));

    assert!(dir.path().join("maskfill.toml").exists());
    assert!(dir.path().join("sentences.toml").exists());
}

#[test]
fn init_skips_existing() {
    let dir = initialized_dir();

    maskfill(dir.path())
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn sentences_lists_dataset() {
    let dir = initialized_dir();

    maskfill(dir.path())
        .current_dir(dir.path())
        .arg("sentences")
        .assert()
        .success()
        .stdout(predicate::str::contains("The [MASK] sat on the [MASK]."))
        .stdout(predicate::str::contains("3 sentence(s) in dataset 'toy'"));
}

#[test]
fn sentences_as_json() {
    let dir = initialized_dir();

    let output = maskfill(dir.path())
        .current_dir(dir.path())
        .args(["sentences", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let rows: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(rows.as_array().unwrap().len(), 3);
    assert_eq!(rows[0]["id"], 1);
}

#[test]
fn without_store_config_fails() {
    let dir = TempDir::new().unwrap();

    maskfill(dir.path())
        .current_dir(dir.path())
        .arg("sentences")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no store configured"));
}

#[test]
fn full_session_records_responses() {
    let dir = initialized_dir();

    maskfill(dir.path())
        .current_dir(dir.path())
        .arg("run")
        .write_stdin("\n\ncat\nmat\neggs\nParis\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("(1/3) The [1] sat on the [2]."))
        .stdout(predicate::str::contains("Thanks so much for participating!"));

    let written = std::fs::read_to_string(dir.path().join("responses.json")).unwrap();
    let responses: serde_json::Value = serde_json::from_str(&written).unwrap();
    let responses = responses.as_array().unwrap();
    assert_eq!(responses.len(), 3);
    assert_eq!(responses[0]["round"], "anonymous");
    assert_eq!(responses[0]["dataset"], "toy");
    assert_eq!(responses[0]["response_values"], serde_json::json!(["cat", "mat"]));
    assert_eq!(responses[2]["response_values"], serde_json::json!(["Paris"]));
}

#[test]
fn labels_from_flags_skip_prompts() {
    let dir = initialized_dir();

    maskfill(dir.path())
        .current_dir(dir.path())
        .args(["run", "--round", "pilot", "--dataset", "toy", "--quota", "1"])
        .write_stdin("dog\nrug\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("(1/1)"))
        .stdout(predicate::str::contains("Thanks so much for participating!"));

    let written = std::fs::read_to_string(dir.path().join("responses.json")).unwrap();
    let responses: serde_json::Value = serde_json::from_str(&written).unwrap();
    assert_eq!(responses.as_array().unwrap().len(), 1);
    assert_eq!(responses[0]["round"], "pilot");
}

#[test]
fn unknown_dataset_is_unavailable() {
    let dir = initialized_dir();

    maskfill(dir.path())
        .current_dir(dir.path())
        .args(["run", "--round", "r1", "--dataset", "missing"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Sentence data is unavailable"))
        .stderr(predicate::str::contains("unavailable for dataset 'missing'"));

    assert!(!dir.path().join("responses.json").exists());
}

#[test]
fn input_closed_mid_session_fails() {
    let dir = initialized_dir();

    maskfill(dir.path())
        .current_dir(dir.path())
        .args(["run", "--round", "r1", "--dataset", "toy"])
        .write_stdin("cat\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("input closed"));
}

#[test]
fn fixture_flag_overrides_config() {
    let dir = TempDir::new().unwrap();
    let fixture = dir.path().join("extra.toml");
    std::fs::write(
        &fixture,
        "[[sentences]]\ndataset = \"extra\"\nid = \"e-1\"\nmasked = \"[MASK] and [MASK].\"\n",
    )
    .unwrap();

    maskfill(dir.path())
        .current_dir(dir.path())
        .args(["sentences", "--dataset", "extra", "--fixture"])
        .arg(&fixture)
        .assert()
        .success()
        .stdout(predicate::str::contains("e-1"))
        .stdout(predicate::str::contains("1 sentence(s) in dataset 'extra'"));
}

#[test]
fn zero_quota_is_rejected() {
    let dir = initialized_dir();

    maskfill(dir.path())
        .current_dir(dir.path())
        .args(["run", "--quota", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("quota must be at least 1"));
}

#[test]
fn zero_quota_in_config_is_rejected() {
    let dir = initialized_dir();
    let config = dir.path().join("maskfill.toml");
    let mut content = std::fs::read_to_string(&config).unwrap();
    content.push_str("quota = 0\n");
    std::fs::write(&config, content).unwrap();

    maskfill(dir.path())
        .current_dir(dir.path())
        .args(["run", "--round", "r1", "--dataset", "toy"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("quota must be at least 1"))
        .stderr(predicate::str::contains("unavailable").not());
}
