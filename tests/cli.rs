#![forbid(unsafe_code)]
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const SETTINGS: &str = r#"{
  "calendar": {
    "first": { "start": "2025-09-01", "end": "2026-01-31" },
    "second": { "start": "2026-02-01", "end": "2026-07-31" }
  },
  "eligible_grades": [5, 6]
}"#;

fn cli(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("permanence-cli").unwrap();
    cmd.env_remove("PERMANENCE_ROSTER")
        .env_remove("PERMANENCE_CONFIG")
        .arg("--roster")
        .arg(dir.join("roster.json"))
        .arg("--config")
        .arg(dir.join("settings.json"));
    cmd
}

fn seed(dir: &Path) {
    fs::write(dir.join("settings.json"), SETTINGS).unwrap();
    fs::write(
        dir.join("members.csv"),
        "id,name,grade,class,role\n1,Alice,5,5-A,chair\n2,Bob,6,6-B,\n3,Junior,4,4-C,member\n",
    )
    .unwrap();
    fs::write(dir.join("rooms.csv"), "id,name,capacity\n1,Library,1\n2,Reading Room,1\n").unwrap();

    cli(dir)
        .args(["import-members", "--csv"])
        .arg(dir.join("members.csv"))
        .assert()
        .success()
        .stdout(predicate::str::contains("3 member(s) imported"));
    cli(dir)
        .args(["import-rooms", "--csv"])
        .arg(dir.join("rooms.csv"))
        .assert()
        .success();
}

#[test]
fn generate_verify_export_roundtrip() {
    let dir = tempdir().unwrap();
    seed(dir.path());

    cli(dir.path())
        .args(["generate", "--term", "FIRST_TERM", "--start", "2025-09-01", "--end", "2025-09-05"])
        .assert()
        .success()
        .stdout(predicate::str::contains("10 assignment(s) created"));

    cli(dir.path())
        .args(["verify", "--term", "FIRST_TERM"])
        .assert()
        .code(0)
        .stdout(predicate::str::contains("[ok] COMPLETENESS"));

    cli(dir.path())
        .args(["export", "--term", "FIRST_TERM"])
        .assert()
        .success()
        .stdout(predicate::str::contains("FIRST_TERM,Monday,Library,5,5-A,Alice"))
        .stdout(predicate::str::contains("Junior").not());

    cli(dir.path())
        .args(["publish", "--term", "FIRST_TERM"])
        .assert()
        .success()
        .stdout(predicate::str::contains("FIRST_TERM published"));
}

#[test]
fn rejected_edit_reports_conflict_code() {
    let dir = tempdir().unwrap();
    seed(dir.path());
    cli(dir.path())
        .args(["generate", "--start", "2025-09-01", "--end", "2025-09-05", "--members", "1,2"])
        .assert()
        .success();
    let before = fs::read(dir.path().join("roster.json")).unwrap();

    cli(dir.path())
        .args(["update", "--id", "2", "--member", "2", "--room", "1", "--weekday", "1", "--term", "FIRST_TERM"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("ROOM_CAPACITY_EXCEEDED"));
    assert_eq!(fs::read(dir.path().join("roster.json")).unwrap(), before);

    cli(dir.path())
        .args(["update", "--id", "2", "--member", "2", "--room", "2", "--weekday", "9", "--term", "FIRST_TERM"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("weekday must be between 1 and 5"));
}

#[test]
fn gaps_exit_with_warning_code() {
    let dir = tempdir().unwrap();
    seed(dir.path());
    fs::write(dir.path().join("exclusions.csv"), "member_id,date,reason\n1,2025-09-01,dentist\n").unwrap();

    cli(dir.path())
        .args(["generate", "--start", "2025-09-01", "--end", "2025-09-05", "--exclusions"])
        .arg(dir.path().join("exclusions.csv"))
        .assert()
        .code(2)
        .stdout(predicate::str::contains("gap: FIRST_TERM / Monday / Reading Room"));

    cli(dir.path())
        .args(["verify", "--term", "FIRST_TERM"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("[warning] COMPLETENESS: Reading Room has nobody on Monday"));
}

#[test]
fn missing_config_announces_the_inferred_calendar() {
    let dir = tempdir().unwrap();
    Command::cargo_bin("permanence-cli")
        .unwrap()
        .env_remove("PERMANENCE_ROSTER")
        .env_remove("PERMANENCE_CONFIG")
        .arg("--roster")
        .arg(dir.path().join("roster.json"))
        .arg("list")
        .assert()
        .success()
        .stderr(predicate::str::contains("academic year inferred from today"));
}
