use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

#[test]
fn test_help_shows_all_commands() {
    cargo_bin_cmd!("biolock")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("config"))
        .stdout(predicate::str::contains("store"))
        .stdout(predicate::str::contains("biometrics"))
        .stdout(predicate::str::contains("--ephemeral"))
        .stdout(predicate::str::contains("--dev"));
}

#[test]
fn test_store_help_shows_subcommands() {
    cargo_bin_cmd!("biolock")
        .args(["store", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("show"))
        .stdout(predicate::str::contains("clear"));
}

#[test]
fn test_biometrics_help_shows_subcommands() {
    cargo_bin_cmd!("biolock")
        .args(["biometrics", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("check"))
        .stdout(predicate::str::contains("verify"));
}

#[test]
fn test_unknown_command_fails() {
    cargo_bin_cmd!("biolock")
        .arg("unlock-everything")
        .assert()
        .failure();
}

#[test]
fn test_login_screen_requires_terminal() {
    let dir = tempfile::tempdir().unwrap();

    cargo_bin_cmd!("biolock")
        .env("BIOLOCK_HOME", dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("requires a terminal"));
}
