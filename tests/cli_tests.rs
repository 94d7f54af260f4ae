use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn missing_token_is_a_fatal_startup_error() {
    let mut cmd = Command::cargo_bin("cr-review").unwrap();
    cmd.env_remove("GITLAB_TOKEN")
        .arg("https://gitlab.com/group/project/-/merge_requests/1")
        .assert()
        .failure()
        .stderr(predicate::str::contains("GITLAB_TOKEN"));
}

#[test]
fn malformed_merge_request_url_is_rejected() {
    let mut cmd = Command::cargo_bin("cr-review").unwrap();
    cmd.env("GITLAB_TOKEN", "dummy")
        .arg("https://gitlab.com/group/project/issues/1")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid merge request URL"));
}

#[test]
fn missing_argument_shows_usage() {
    let mut cmd = Command::cargo_bin("cr-review").unwrap();
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn empty_tree_exits_cleanly_before_any_network_call() {
    let dir = tempfile::tempdir().unwrap();
    let mut cmd = Command::cargo_bin("cr-review").unwrap();
    cmd.env("GITLAB_TOKEN", "dummy")
        .arg("https://gitlab.com/group/project/-/merge_requests/1")
        .arg("--root")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("No CR comments found"));
}
