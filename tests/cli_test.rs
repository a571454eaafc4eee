// tests/cli_test.rs
use assert_cmd::cargo;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn bin(name: &str) -> assert_cmd::Command {
    match name {
        "fw-release" => assert_cmd::Command::new(cargo::cargo_bin!("fw-release")),
        "fw-builder" => assert_cmd::Command::new(cargo::cargo_bin!("fw-builder")),
        _ => assert_cmd::Command::new(cargo::cargo_bin!("fw-gendocs")),
    }
}

#[test]
fn test_help() {
    bin("fw-release")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--write-changelog"));
    bin("fw-gendocs")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--with-source"));
    bin("fw-builder")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--rebuild-toolchain"));
}

#[test]
fn test_no_action_prints_usage() {
    let dir = TempDir::new().unwrap();
    bin("fw-release")
        .current_dir(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"));
    bin("fw-builder")
        .current_dir(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"));
}

#[test]
fn test_missing_git_exits_non_zero() {
    let dir = TempDir::new().unwrap();
    bin("fw-release")
        .current_dir(dir.path())
        .env("PATH", "")
        .arg("--latest")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("git required"));
    bin("fw-builder")
        .current_dir(dir.path())
        .env("PATH", "")
        .arg("--firmware-version")
        .assert()
        .failure()
        .code(1);
}

#[test]
fn test_builder_firmware_version_without_build() {
    let git_available = std::process::Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false);
    if !git_available {
        return;
    }
    let dir = TempDir::new().unwrap();
    bin("fw-builder")
        .current_dir(dir.path())
        .args(["--work-dir", "work", "--firmware-version"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("fw-builder: firmware version ERROR:"))
        .stderr(predicate::str::contains("no existing firmware build found"));
}

#[test]
fn test_gendocs_writes_pages() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("blink.py"),
        "\"\"\"Blink an LED.\"\"\"\n\ndef blink(pin):\n    pass\n",
    )
    .unwrap();

    bin("fw-gendocs")
        .current_dir(dir.path())
        .args(["blink", "docs", "--format", "markdown"])
        .assert()
        .success()
        .stdout(predicate::str::contains("fw-gendocs: docs: wrote"));
    let page = fs::read_to_string(dir.path().join("docs/blink.md")).unwrap();
    assert!(page.contains("def blink(pin)"));
}

#[test]
fn test_gendocs_unknown_module_fails() {
    let dir = TempDir::new().unwrap();
    bin("fw-gendocs")
        .current_dir(dir.path())
        .args(["missing", "docs"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("fw-gendocs: docs ERROR:"));
}

#[test]
fn test_release_on_repository() {
    let dir = TempDir::new().unwrap();
    let repo = git2::Repository::init(dir.path()).unwrap();
    {
        let mut config = repo.config().unwrap();
        config.set_str("user.name", "Test User").unwrap();
        config.set_str("user.email", "test@example.com").unwrap();
    }
    fs::write(dir.path().join("main.py"), "pass\n").unwrap();
    let mut index = repo.index().unwrap();
    index.add_path(std::path::Path::new("main.py")).unwrap();
    index.write().unwrap();
    let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
    let sig = git2::Signature::now("Test User", "test@example.com").unwrap();
    repo.commit(Some("HEAD"), &sig, &sig, "feat: first", &tree, &[])
        .unwrap();

    let git_available = std::process::Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false);
    if !git_available {
        return;
    }

    bin("fw-release")
        .args(["--repo", dir.path().to_str().unwrap(), "--latest", "--next"])
        .assert()
        .success()
        .stdout(predicate::str::contains("fw-release: no release yet."))
        .stdout(predicate::str::contains("fw-release: next release: 0.1.0"));
}
