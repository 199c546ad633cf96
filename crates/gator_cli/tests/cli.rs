use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn write_config(dir: &Path, current_user: &str) -> std::path::PathBuf {
    let config = dir.join(".gatorconfig.json");
    let db = dir.join("gator.db");
    fs::write(
        &config,
        format!(
            r#"{{"db_url":"sqlite://{}","current_user_name":"{}"}}"#,
            db.display(),
            current_user
        ),
    )
    .unwrap();
    config
}

fn gator(config: &Path) -> Command {
    let mut cmd = Command::cargo_bin("gator").unwrap();
    cmd.arg("--config").arg(config);
    cmd
}

#[test]
fn register_then_users_through_the_binary() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path(), "");

    gator(&config)
        .args(["register", "alice"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("User created: alice"));

    let raw = fs::read_to_string(&config).unwrap();
    assert!(raw.contains(r#""current_user_name":"alice""#), "{raw}");

    gator(&config)
        .arg("users")
        .assert()
        .success()
        .stdout("* alice (current)\n");
}

#[test]
fn login_unknown_user_exits_non_zero() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path(), "carol");
    let before = fs::read_to_string(&config).unwrap();

    gator(&config)
        .args(["login", "bob"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Error: account bob doesn't exist"));

    assert_eq!(fs::read_to_string(&config).unwrap(), before);
}

#[test]
fn unknown_command_exits_non_zero() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path(), "");

    gator(&config)
        .arg("follow")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown command: follow"));
}

#[test]
fn no_command_is_a_usage_error() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path(), "");

    gator(&config)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("not enough arguments were provided"));
}

#[test]
fn missing_config_file_is_reported() {
    let temp = TempDir::new().unwrap();

    gator(&temp.path().join("absent.json"))
        .arg("users")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error: loading config"));
}
