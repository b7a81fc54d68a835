//! Integration tests for the acl CLI commands.

#![allow(deprecated)] // Command::cargo_bin – macro replacement not yet stable

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// A temp directory with a script and a library it uses.
fn test_script() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("game.acl"),
        r#"&use(std)
// The only room.
room: {
    title: "Test Room";
    look: {
        say: "A plain test room.";
    };
};
"#,
    )
    .unwrap();
    fs::write(dir.path().join("std.acl"), "verb: { say: \"You wait.\"; };\n").unwrap();
    dir
}

fn acl() -> Command {
    let mut cmd = Command::cargo_bin("acl").unwrap();
    cmd.env("NO_COLOR", "1").env_remove("ACL_LOG");
    cmd
}

#[test]
fn parse_prints_the_tree() {
    let dir = test_script();
    acl()
        .args(["parse", dir.path().join("game.acl").to_str().unwrap()])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("0 (grouping)")
                .and(predicate::str::contains("verb(grouping_command)"))
                .and(predicate::str::contains("room(grouping_command)"))
                .and(predicate::str::contains("say(command)")),
        );
}

#[test]
fn parse_uses_explicit_library_dir() {
    let dir = test_script();
    let libs = TempDir::new().unwrap();
    fs::write(libs.path().join("std.acl"), "item: Lamp;").unwrap();
    acl()
        .args([
            "parse",
            dir.path().join("game.acl").to_str().unwrap(),
            "--lib",
            libs.path().to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("item(command)").and(predicate::str::contains("verb").not()));
}

#[test]
fn check_passes_valid_script() {
    let dir = test_script();
    acl()
        .args(["check", dir.path().join("game.acl").to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("All checks passed").and(predicate::str::contains("statements")));
}

#[test]
fn check_reports_warnings_without_failing() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("stray.acl");
    fs::write(&file, "room: Hall;\n};\n").unwrap();
    acl()
        .args(["check", file.to_str().unwrap()])
        .assert()
        .success()
        .stderr(predicate::str::contains("unmatched `}`").and(predicate::str::contains("1 warning")));
}

#[test]
fn check_fails_on_lexer_errors() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("broken.acl");
    fs::write(&file, "say: \"never closed;\n").unwrap();
    acl()
        .args(["check", file.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unterminated string literal"));
}

#[test]
fn check_fails_on_missing_library() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("game.acl");
    fs::write(&file, "&use(nope)\nroom: Hall;").unwrap();
    acl()
        .args(["check", file.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("library \"nope\" not found"));
}

#[test]
fn parse_fails_on_missing_file() {
    acl()
        .args(["parse", "/definitely/not/here.acl"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot read"));
}

#[test]
fn sample_then_inspect() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("test.acl");
    acl()
        .args(["sample", "-o", out.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Compiled 'test' successfully"));

    let bytes = fs::read(&out).unwrap();
    assert!(bytes.starts_with(b"ACLANGv0.1.0"));

    acl()
        .args(["inspect", out.to_str().unwrap()])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Test Room")
                .and(predicate::str::contains("v0.1.0+"))
                .and(predicate::str::contains("This is just a test game lol"))
                .and(predicate::str::contains("1 records")),
        );
}

#[test]
fn sample_refuses_incompatible_compiler_version() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("test.acl");
    acl()
        .args([
            "sample",
            "-o",
            out.to_str().unwrap(),
            "--compiler-version",
            "v0.0.0",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not match"));
    assert!(!out.exists());
}

#[test]
fn sample_rejects_malformed_version() {
    acl()
        .args(["sample", "--compiler-version", "1.2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}

#[test]
fn inspect_rejects_garbage() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("junk.acl");
    fs::write(&file, b"not an artifact").unwrap();
    acl()
        .args(["inspect", file.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}
