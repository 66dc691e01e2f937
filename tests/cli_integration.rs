//! Integration tests for the Templatte CLI.
//!
//! These tests exercise the binary end-to-end using `assert_cmd`.
//! `press`/`pour` need an external cipher, so they are only checked on
//! the paths that fail before the cipher is invoked.

use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;

/// Helper: get a Command pointing at the templatte binary.
fn templatte() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("templatte").expect("binary should exist")
}

const APP: &str = "[db]\nhost = \"localhost\"\nport = 5432\n";

#[test]
fn help_flag_lists_commands() {
    templatte()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("genelatte"))
        .stdout(predicate::str::contains("press"))
        .stdout(predicate::str::contains("pour"))
        .stdout(predicate::str::contains("grind"))
        .stdout(predicate::str::contains("deploy"));
}

#[test]
fn version_flag_shows_version() {
    templatte()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("templatte"));
}

#[test]
fn no_args_shows_usage() {
    templatte()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn genelatte_grind_deploy_round_trip() {
    let tmp = TempDir::new().unwrap();
    tmp.child("app.toml").write_str(APP).unwrap();

    templatte()
        .arg("genelatte")
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("app.toml"));

    tmp.child("app.toml.latte")
        .assert("db.host = {{db.host}}\ndb.port = {{db.port}}\n");
    tmp.child("templatte.toml")
        .assert(predicate::str::contains("app.toml_db.port"));

    templatte()
        .args(["grind", "--force"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Removing file"));
    tmp.child("app.toml").assert(predicate::path::missing());

    templatte()
        .arg("deploy")
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("app.toml"));

    tmp.child("app.toml.latte").assert(predicate::path::missing());
    tmp.child("app.toml")
        .assert(predicate::str::contains("host = \"localhost\""))
        .assert(predicate::str::contains("port = 5432"));
}

#[test]
fn root_flag_selects_workspace() {
    let tmp = TempDir::new().unwrap();
    tmp.child("conf/app.toml").write_str(APP).unwrap();

    templatte()
        .args(["genelatte", "--root"])
        .arg(tmp.child("conf").path())
        .assert()
        .success();

    tmp.child("conf/templatte.toml")
        .assert(predicate::str::contains("app.toml_db.host"));
}

#[test]
fn unsupported_config_type_fails() {
    let tmp = TempDir::new().unwrap();

    templatte()
        .args(["genelatte", "--config-type", "yaml"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported config type"));
}

#[test]
fn genelatte_reports_broken_file() {
    let tmp = TempDir::new().unwrap();
    tmp.child("app.toml").write_str(APP).unwrap();
    tmp.child("broken.toml").write_str("x = [\n").unwrap();

    templatte()
        .arg("genelatte")
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("broken.toml"));

    // The good file is still templated.
    tmp.child("app.toml.latte").assert(predicate::path::exists());
}

#[test]
fn press_without_value_store_fails() {
    let tmp = TempDir::new().unwrap();

    templatte()
        .arg("press")
        .current_dir(tmp.path())
        .env("TEMPLATTE_PASSPHRASE", "unused")
        .assert()
        .failure()
        .stderr(predicate::str::contains("templatte.toml does not exist"));
}

#[test]
fn pour_without_encrypted_store_fails() {
    let tmp = TempDir::new().unwrap();

    templatte()
        .arg("pour")
        .current_dir(tmp.path())
        .env("TEMPLATTE_PASSPHRASE", "unused")
        .assert()
        .failure()
        .stderr(predicate::str::contains("templatte.toml.gpg does not exist"));
}

#[test]
fn deploy_without_value_store_fails() {
    let tmp = TempDir::new().unwrap();
    tmp.child("app.toml.latte")
        .write_str("db.host = {{db.host}}\n")
        .unwrap();

    templatte()
        .arg("deploy")
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));

    tmp.child("app.toml.latte").assert(predicate::path::exists());
}

#[test]
fn deploy_with_missing_value_fails_without_writing() {
    let tmp = TempDir::new().unwrap();
    tmp.child("app.toml.latte")
        .write_str("db.host = {{db.host}}\n")
        .unwrap();
    tmp.child("templatte.toml").write_str("").unwrap();

    templatte()
        .arg("deploy")
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("app.toml_db.host"));

    tmp.child("app.toml").assert(predicate::path::missing());
}

#[test]
fn completions_for_bash() {
    templatte()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("templatte"));
}
