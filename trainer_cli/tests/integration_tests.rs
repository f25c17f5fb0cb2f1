//! Integration tests for the ptrainer binary.
//!
//! These tests verify end-to-end behavior including:
//! - Database initialization and login
//! - Connection, booking and schedule workflow
//! - Rating input validation
//! - Program purchases

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Temp dir holding an initialized demo database
fn setup_demo() -> (TempDir, PathBuf) {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db = temp_dir.path().join("trainer.db");

    cli(temp_dir.path())
        .arg("init")
        .arg("--demo")
        .arg("--database")
        .arg(&db)
        .assert()
        .success()
        .stdout(predicate::str::contains("demo data"));

    (temp_dir, db)
}

/// The binary, isolated from the user's real config file
fn cli(config_home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("ptrainer").expect("Failed to find ptrainer binary");
    cmd.env("XDG_CONFIG_HOME", config_home);
    cmd.env_remove("RUST_LOG");
    cmd
}

fn as_user(dir: &TempDir, db: &Path, user: &str) -> Command {
    let mut cmd = cli(dir.path());
    cmd.arg("--database").arg(db).arg("--user").arg(user);
    cmd
}

#[test]
fn test_cli_help() {
    let temp_dir = tempfile::tempdir().unwrap();
    cli(temp_dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Personal trainer bookings, ratings and programs",
        ));
}

#[test]
fn test_init_creates_database() {
    let (_dir, db) = setup_demo();
    assert!(db.exists());
}

#[test]
fn test_unknown_user_is_rejected() {
    let (dir, db) = setup_demo();
    as_user(&dir, &db, "mallory")
        .arg("trainers")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown username"));
}

#[test]
fn test_missing_user_is_rejected() {
    let (dir, db) = setup_demo();
    cli(dir.path())
        .arg("--database")
        .arg(&db)
        .arg("trainers")
        .assert()
        .failure();
}

#[test]
fn test_connect_moves_trainer_between_lists() {
    let (dir, db) = setup_demo();

    as_user(&dir, &db, "alice")
        .args(["trainers", "--unconnected"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Tom Nguyen"));

    as_user(&dir, &db, "alice")
        .args(["connect", "7"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Connected with Tom Nguyen"));

    as_user(&dir, &db, "alice")
        .arg("trainers")
        .assert()
        .success()
        .stdout(predicate::str::contains("Tom Nguyen"));

    as_user(&dir, &db, "alice")
        .args(["trainers", "--unconnected"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Tom Nguyen").not());

    // Connecting again does not create a second row
    as_user(&dir, &db, "alice")
        .args(["connect", "7"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Already connected"));

    as_user(&dir, &db, "alice")
        .args(["disconnect", "7"])
        .assert()
        .success();

    as_user(&dir, &db, "alice")
        .args(["trainers", "--unconnected"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Tom Nguyen"));
}

#[test]
fn test_trainers_json_output() {
    let (dir, db) = setup_demo();
    let output = as_user(&dir, &db, "ben")
        .args(["trainers", "--unconnected", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let trainers: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let ids: Vec<i64> = trainers
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, [2, 7, 9]);
}

#[test]
fn test_booking_requires_connection() {
    let (dir, db) = setup_demo();
    as_user(&dir, &db, "alice")
        .args(["book", "7", "Monday", "14"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("MissingConnection"));
}

#[test]
fn test_booking_seen_by_self_and_others() {
    let (dir, db) = setup_demo();
    for user in ["alice", "ben"] {
        as_user(&dir, &db, user).args(["connect", "7"]).assert().success();
    }

    as_user(&dir, &db, "alice")
        .args(["book", "7", "Monday", "14"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Booked Tom on Monday at 07:00"));

    as_user(&dir, &db, "alice")
        .args(["schedule", "7"])
        .assert()
        .success()
        .stdout(predicate::str::contains("14 07:00   *"));

    as_user(&dir, &db, "ben")
        .args(["schedule", "7"])
        .assert()
        .success()
        .stdout(predicate::str::contains("14 07:00   x"));

    as_user(&dir, &db, "ben")
        .args(["book", "7", "mon", "14"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already taken"));
}

#[test]
fn test_invalid_day_and_index_rejected() {
    let (dir, db) = setup_demo();
    as_user(&dir, &db, "alice").args(["connect", "7"]).assert().success();

    as_user(&dir, &db, "alice")
        .args(["book", "7", "Someday", "3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown day"));

    as_user(&dir, &db, "alice")
        .args(["book", "7", "Monday", "48"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("InvalidTimeslot"));
}

#[test]
fn test_rating_prompt_reprompts_until_valid() {
    let (dir, db) = setup_demo();
    as_user(&dir, &db, "alice").args(["connect", "2"]).assert().success();

    as_user(&dir, &db, "alice")
        .args(["rate", "2"])
        .write_stdin("7\nexcellent\n4\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Rated Priya 4/5"));

    as_user(&dir, &db, "alice")
        .args(["info", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("rated 4.0/5"));

    as_user(&dir, &db, "alice")
        .args(["rate", "2", "--value", "5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already rated"));
}

#[test]
fn test_out_of_range_rating_never_stored() {
    let (dir, db) = setup_demo();
    as_user(&dir, &db, "ben").args(["connect", "9"]).assert().success();

    as_user(&dir, &db, "ben")
        .args(["rate", "9", "--value", "6"])
        .assert()
        .failure();

    as_user(&dir, &db, "ben")
        .args(["info", "9"])
        .assert()
        .success()
        .stdout(predicate::str::contains("has been rated").not());

    // Closing the prompt stores nothing either
    as_user(&dir, &db, "ben")
        .args(["rate", "9"])
        .write_stdin("0\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Rating cancelled"));
}

#[test]
fn test_purchase_unlocks_exercises() {
    let (dir, db) = setup_demo();
    as_user(&dir, &db, "alice").args(["connect", "7"]).assert().success();

    as_user(&dir, &db, "alice")
        .args(["programs", "7"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Strength Foundations"))
        .stdout(predicate::str::contains("Back Squat").not());

    as_user(&dir, &db, "alice")
        .args(["purchase", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Purchased Strength Foundations"));

    as_user(&dir, &db, "alice")
        .args(["programs", "7"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(purchased)"))
        .stdout(predicate::str::contains("Exercise 1: Back Squat"));

    as_user(&dir, &db, "alice")
        .args(["purchase", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already own"));
}

#[test]
fn test_info_shows_program_count() {
    let (dir, db) = setup_demo();
    as_user(&dir, &db, "cara")
        .args(["info", "7"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Tom has 2 programs available"));
}

#[test]
fn test_uninitialized_database_fails_login() {
    let temp_dir = tempfile::tempdir().unwrap();
    let db = temp_dir.path().join("empty.db");

    as_user(&temp_dir, &db, "alice")
        .arg("trainers")
        .assert()
        .failure();
}
