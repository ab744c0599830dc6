#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn erk(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("erk-plan").unwrap();
    cmd.current_dir(dir.path()).env("ERK_ROOT", dir.path());
    cmd
}

const QUEUED: &str = "Queued for implementation.

<!-- erk:metadata-block:submission-queued -->
<details>
<summary><code>submission-queued</code></summary>

```yaml
queued_at: '2024-01-01T00:00:00Z'
submitted_by: alice
```
</details>
<!-- /erk:metadata-block -->
";

const BAD_HEADER: &str = "<!-- erk:metadata-block:plan-header -->
```yaml
schema_version: '2'
created_at: soon
```
<!-- /erk:metadata-block -->
";

// ---------------------------------------------------------------------------
// erk-plan render
// ---------------------------------------------------------------------------

#[test]
fn render_prints_block_envelope() {
    let dir = TempDir::new().unwrap();
    erk(&dir)
        .args([
            "render",
            "submission-queued",
            "-f",
            "queued_at=2024-01-01T00:00:00Z",
            "-f",
            "submitted_by=alice",
        ])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "<!-- erk:metadata-block:submission-queued -->\n<details>",
        ))
        .stdout(predicate::str::contains("submitted_by: alice"))
        .stdout(predicate::str::contains("<!-- /erk:metadata-block -->"));
}

#[test]
fn render_refuses_invalid_payload() {
    let dir = TempDir::new().unwrap();
    erk(&dir)
        .args(["render", "workflow-started", "-f", "started_at=later"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("started_at"))
        .stderr(predicate::str::contains("workflow_run_id: is required"));
}

#[test]
fn render_rejects_bad_kind() {
    let dir = TempDir::new().unwrap();
    erk(&dir)
        .args(["render", "Not_A_Kind"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid block kind"));
}

// ---------------------------------------------------------------------------
// erk-plan blocks
// ---------------------------------------------------------------------------

#[test]
fn blocks_reads_stdin() {
    let dir = TempDir::new().unwrap();
    erk(&dir)
        .arg("blocks")
        .write_stdin(QUEUED)
        .assert()
        .success()
        .stdout(predicate::str::contains("[submission-queued]"))
        .stdout(predicate::str::contains("submitted_by: alice"));
}

#[test]
fn blocks_json_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("comment.md");
    std::fs::write(&path, format!("{QUEUED}\n{BAD_HEADER}")).unwrap();

    let output = erk(&dir)
        .args(["--json", "blocks", "--file"])
        .arg(&path)
        .output()
        .unwrap();
    assert!(output.status.success());
    let blocks: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let kinds: Vec<&str> = blocks
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["kind"].as_str().unwrap())
        .collect();
    assert_eq!(kinds, ["submission-queued", "plan-header"]);
}

#[test]
fn blocks_on_prose_only() {
    let dir = TempDir::new().unwrap();
    erk(&dir)
        .arg("blocks")
        .write_stdin("just words <!-- not a block -->")
        .assert()
        .success()
        .stdout(predicate::str::contains("No metadata blocks found."));
}

// ---------------------------------------------------------------------------
// erk-plan validate
// ---------------------------------------------------------------------------

#[test]
fn validate_accepts_valid_blocks() {
    let dir = TempDir::new().unwrap();
    erk(&dir)
        .arg("validate")
        .write_stdin(QUEUED)
        .assert()
        .success()
        .stdout(predicate::str::contains("submission-queued"))
        .stdout(predicate::str::contains("ok"));
}

#[test]
fn validate_reports_every_field_error() {
    let dir = TempDir::new().unwrap();
    erk(&dir)
        .arg("validate")
        .write_stdin(BAD_HEADER)
        .assert()
        .failure()
        .stdout(predicate::str::contains("INVALID"))
        .stdout(predicate::str::contains("created_at"))
        .stdout(predicate::str::contains("created_by: is required"))
        .stdout(predicate::str::contains("base_commit: is required"))
        .stdout(predicate::str::contains("branch_name: is required"))
        .stderr(predicate::str::contains("1 invalid metadata block(s)"));
}

// ---------------------------------------------------------------------------
// tracker-backed commands
// ---------------------------------------------------------------------------

#[test]
fn history_rejects_bad_completion_timestamp() {
    let dir = TempDir::new().unwrap();
    erk(&dir)
        .args(["history", "1", "--completed-at", "tomorrow"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not an ISO-8601 timestamp"));
}

#[test]
fn invalid_config_file_is_reported() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join(".erk")).unwrap();
    std::fs::write(dir.path().join(".erk/config.yaml"), "tracker: [").unwrap();
    erk(&dir)
        .args(["get", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("config.yaml"));
}

#[test]
fn missing_gh_binary_is_a_provider_error() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join(".erk")).unwrap();
    std::fs::write(
        dir.path().join(".erk/config.yaml"),
        "tracker:\n  gh_binary: no-such-gh-binary-for-tests\n",
    )
    .unwrap();
    erk(&dir)
        .args(["list", "--label", "erk-plan"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("github error"));
}
