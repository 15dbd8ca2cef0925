use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const INACTIVE_FLEET: &str = r#"
acme:
  options:
    active: false
  repositories:
    lib:
      active: true
"#;

fn devkit(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("devkit").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("GITHUB_OAUTH_TOKEN")
        .env("GITHUB_API_URL", "http://127.0.0.1:9")
        .env("RUST_LOG", "info");
    cmd
}

fn workspace_with_config(contents: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("config")).unwrap();
    fs::write(dir.path().join("config/projects.yml"), contents).unwrap();
    fs::create_dir_all(dir.path().join("etc/bundle-skeleton")).unwrap();
    fs::write(
        dir.path().join("etc/bundle-skeleton/.travis.yml"),
        "url: {{ github_url }}\n",
    )
    .unwrap();
    dir
}

#[test]
fn inactive_organizations_are_skipped() {
    let dir = workspace_with_config(INACTIVE_FLEET);
    devkit(&dir)
        .arg("dispatch")
        .assert()
        .success()
        .stdout(predicate::str::contains("No active repository selected."))
        .stderr(predicate::str::contains("acme disabled in config"))
        .stderr(predicate::str::contains("Dry run"));
    assert!(!dir.path().join(".tmp").exists(), "nothing cloned");
}

#[test]
fn missing_config_fails() {
    let dir = TempDir::new().unwrap();
    devkit(&dir)
        .arg("pr-auto-merge")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load fleet config"));
}

#[test]
fn malformed_bundle_selector_fails() {
    let dir = workspace_with_config(INACTIVE_FLEET);
    devkit(&dir)
        .args(["pr-auto-close", "acme-lib"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid bundle argument"));
}

#[test]
fn missing_skeleton_fails_before_any_clone() {
    let dir = workspace_with_config(INACTIVE_FLEET);
    devkit(&dir)
        .args(["dispatch", "--skeleton", "does/not/exist"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load skeleton"));
}

#[test]
fn failing_repository_keeps_exit_status_zero() {
    // The API endpoint refuses connections, so the repository fails.
    let dir = workspace_with_config(INACTIVE_FLEET);
    devkit(&dir)
        .args(["pr-auto-close", "acme::lib", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"failures\": 1"))
        .stdout(predicate::str::contains("\"repository\": \"acme/lib\""));
}

#[test]
fn auto_merge_dry_run_makes_no_request() {
    let dir = workspace_with_config(INACTIVE_FLEET);
    devkit(&dir)
        .args(["auto-merge", "acme::lib"])
        .assert()
        .success()
        .stdout(predicate::str::contains("skipped (dry run)"));
}
