//! Integration tests for the FishVault CLI.
//!
//! These tests exercise the binary end-to-end using `assert_cmd`.  The
//! master password comes from `FISHVAULT_PASSWORD` and every test writes a
//! `.fishvault.toml` with the cheapest accepted KDF settings.

use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;

const PASSWORD: &str = "integration-pass-1";

const FAST_CONFIG: &str = r#"
user = "tester"
argon2_memory_kib = 8192
argon2_iterations = 1
argon2_parallelism = 1
"#;

/// Helper: get a Command pointing at the fishvault binary.
fn fishvault() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("fishvault").expect("binary should exist")
}

/// Helper: a temp project dir with the fast config written.
fn project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    tmp.child(".fishvault.toml").write_str(FAST_CONFIG).unwrap();
    tmp
}

/// Helper: a command rooted in `dir` with the password in the environment.
fn in_dir(dir: &TempDir) -> Command {
    let mut cmd = fishvault();
    cmd.current_dir(dir.path())
        .env("FISHVAULT_PASSWORD", PASSWORD)
        .env_remove("FISHVAULT_LOG");
    cmd
}

fn init(dir: &TempDir) {
    in_dir(dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Vault created for user 'tester'"));
}

/// Add an item with `secret` on stdin; returns the new id.
fn add(dir: &TempDir, title: &str, secret: &str) -> String {
    let out = in_dir(dir)
        .args(["add", title, "-n", "me@example.com", "--url", "https://example.com"])
        .write_stdin(format!("{secret}\n"))
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let out = String::from_utf8(out).unwrap();
    let start = out.rfind('(').expect("id in output") + 1;
    let end = out.rfind(')').expect("id in output");
    out[start..end].to_string()
}

// ---------------------------------------------------------------------------
// Non-vault commands
// ---------------------------------------------------------------------------

#[test]
fn help_flag_shows_usage() {
    fishvault()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Zero-knowledge password vault"))
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("add"))
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("copy"))
        .stdout(predicate::str::contains("search"))
        .stdout(predicate::str::contains("generate"));
}

#[test]
fn no_args_shows_help() {
    fishvault()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn generate_prints_password_of_requested_length() {
    let dir = project();
    let out = in_dir(&dir)
        .args(["generate", "--length", "24"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let out = String::from_utf8(out).unwrap();
    assert_eq!(out.lines().next().unwrap().chars().count(), 24);
}

#[test]
fn generate_rejects_tiny_length() {
    let dir = project();
    in_dir(&dir)
        .args(["generate", "--length", "4"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("between 8 and 256"));
}

#[test]
fn invalid_config_is_reported() {
    let tmp = TempDir::new().unwrap();
    tmp.child(".fishvault.toml")
        .write_str("auto_lock_minutes = 0\n")
        .unwrap();
    in_dir(&tmp)
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("auto_lock_minutes"));
}

// ---------------------------------------------------------------------------
// Vault lifecycle
// ---------------------------------------------------------------------------

#[test]
fn init_creates_store_without_plaintext() {
    let dir = project();
    init(&dir);

    let store = dir.child(".fishvault/store.json");
    store.assert(predicate::path::exists());
    store.assert(predicate::str::contains(PASSWORD).not());
    store.assert(predicate::str::contains("argon2id"));
}

#[test]
fn init_twice_fails() {
    let dir = project();
    init(&dir);
    in_dir(&dir)
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn list_without_vault_suggests_init() {
    let dir = project();
    in_dir(&dir)
        .arg("list")
        .assert()
        .failure()
        .stdout(predicate::str::contains("fishvault init"))
        .stderr(predicate::str::contains("No vault profile"));
}

#[test]
fn add_list_show_roundtrip() {
    let dir = project();
    init(&dir);
    let id = add(&dir, "Gmail", "hunter2-secret");

    in_dir(&dir)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Gmail"))
        .stdout(predicate::str::contains("me@example.com"))
        .stdout(predicate::str::contains(&id[..8]));

    in_dir(&dir)
        .args(["show", &id[..8]])
        .assert()
        .success()
        .stdout(predicate::str::contains("https://example.com"))
        .stdout(predicate::str::contains("hunter2-secret").not());

    in_dir(&dir)
        .args(["show", &id, "--reveal"])
        .assert()
        .success()
        .stdout(predicate::str::contains("hunter2-secret"));

    dir.child(".fishvault/store.json")
        .assert(predicate::str::contains("hunter2-secret").not());
}

#[test]
fn wrong_password_is_rejected() {
    let dir = project();
    init(&dir);
    add(&dir, "Gmail", "hunter2-secret");

    fishvault()
        .current_dir(dir.path())
        .env("FISHVAULT_PASSWORD", "not-the-password")
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Wrong master password"));
}

#[test]
fn update_search_delete() {
    let dir = project();
    init(&dir);
    let id = add(&dir, "Gmail", "hunter2-secret");
    add(&dir, "Bank", "money-secret");

    in_dir(&dir)
        .args(["update", &id, "--title", "Work Mail", "--category", "Work"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated 'Work Mail'"));

    in_dir(&dir)
        .args(["search", "work"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 item(s) match"))
        .stdout(predicate::str::contains("Work Mail"));

    in_dir(&dir)
        .args(["delete", &id, "--force"])
        .assert()
        .success();

    in_dir(&dir)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Work Mail").not())
        .stdout(predicate::str::contains("Bank"));
}

#[test]
fn update_without_fields_fails() {
    let dir = project();
    init(&dir);
    let id = add(&dir, "Gmail", "hunter2-secret");

    in_dir(&dir)
        .args(["update", &id])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nothing to update"));
}

#[test]
fn users_are_isolated_in_one_store() {
    let dir = project();
    init(&dir);
    add(&dir, "Gmail", "hunter2-secret");

    in_dir(&dir)
        .args(["--user", "other", "init"])
        .assert()
        .success();
    in_dir(&dir)
        .args(["--user", "other", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No items"));
}
