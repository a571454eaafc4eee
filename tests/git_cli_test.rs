// tests/git_cli_test.rs
//
// Exercises GitCli against real repositories built with git2. Tests return
// early when no git executable is installed.
use firmware_buildtools::config::ReleaseConfig;
use firmware_buildtools::git::{GitCli, Repository as _};
use firmware_buildtools::release::ReleaseStatus;
use firmware_buildtools::BuildToolsError;
use git2::{Oid, Repository, Signature};
use semver::Version;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

struct Fixture {
    dir: TempDir,
    repo: Repository,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().expect("Could not create temp dir");
        let repo = Repository::init(dir.path()).expect("Could not init git repo");
        {
            let mut config = repo.config().expect("Could not get config");
            config.set_str("user.name", "Test User").unwrap();
            config.set_str("user.email", "test@example.com").unwrap();
        }
        Fixture { dir, repo }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn commit(&self, file: &str, content: &str, message: &str) -> Oid {
        fs::write(self.path().join(file), content).unwrap();
        let mut index = self.repo.index().unwrap();
        index.add_path(Path::new(file)).unwrap();
        index.write().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = self.repo.find_tree(tree_id).unwrap();
        let sig = Signature::now("Test User", "test@example.com").unwrap();

        let parent = self
            .repo
            .head()
            .ok()
            .and_then(|h| h.target())
            .map(|oid| self.repo.find_commit(oid).unwrap());
        let parents: Vec<&git2::Commit> = parent.iter().collect();

        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .unwrap()
    }

    fn tag(&self, name: &str, oid: Oid) {
        let object = self.repo.find_object(oid, None).unwrap();
        self.repo.tag_lightweight(name, &object, false).unwrap();
    }

    fn git(&self) -> GitCli {
        GitCli::new(self.path())
    }
}

#[test]
fn test_ensure_available_reports_version() {
    if !git_available() {
        return;
    }
    let dir = TempDir::new().unwrap();
    let version = GitCli::new(dir.path()).ensure_available().unwrap();
    assert!(version.starts_with("git version"));
}

#[test]
fn test_not_a_repository() {
    if !git_available() {
        return;
    }
    let dir = TempDir::new().unwrap();
    let git = GitCli::new(dir.path());
    assert!(matches!(
        git.short_head(),
        Err(BuildToolsError::NotARepository)
    ));
}

#[test]
fn test_empty_repository() {
    if !git_available() {
        return;
    }
    let fixture = Fixture::new();
    let git = fixture.git();
    assert_eq!(git.describe("v[0-9]*").unwrap(), None);
    assert!(matches!(
        git.short_head(),
        Err(BuildToolsError::EmptyRepository)
    ));
}

#[test]
fn test_describe_and_head_version() {
    if !git_available() {
        return;
    }
    let fixture = Fixture::new();
    let first = fixture.commit("main.py", "print(1)\n", "feat: initial firmware");
    fixture.tag("v1.0.0", first);

    let status = ReleaseStatus::new(fixture.git(), ReleaseConfig::default());
    assert_eq!(status.head().unwrap().to_string(), "1.0.0");

    let second = fixture.commit("main.py", "print(2)\n", "fix: blink led");
    let short = &second.to_string()[..7];
    let head = status.head().unwrap().to_string();
    assert!(head.starts_with("1.0.0+1."));
    assert!(head.contains(short));
    assert!(head.ends_with(".clean"));

    fs::write(fixture.path().join("main.py"), "print(3)\n").unwrap();
    assert!(fixture.git().is_dirty().unwrap());
    assert!(status.head().unwrap().to_string().ends_with(".dirty"));
}

#[test]
fn test_untagged_history() {
    if !git_available() {
        return;
    }
    let fixture = Fixture::new();
    fixture.commit("a.txt", "a", "chore: one");
    fixture.commit("a.txt", "b", "chore: two");

    let git = fixture.git();
    assert_eq!(git.commit_count().unwrap(), 2);
    let status = ReleaseStatus::new(git, ReleaseConfig::default());
    let head = status.head().unwrap();
    assert!(head.to_string().starts_with("0.0.0+2."));
    assert_eq!(status.latest().unwrap().version, Version::new(0, 0, 0));
}

#[test]
fn test_log_and_tags() {
    if !git_available() {
        return;
    }
    let fixture = Fixture::new();
    let first = fixture.commit("a.txt", "a", "feat: one");
    fixture.tag("v0.1.0", first);
    fixture.commit("a.txt", "b", "fix(io): two\n\nLonger body.");
    fixture.commit("a.txt", "c", "feat: three");

    let git = fixture.git();
    let log = git.log(Some("v0.1.0"), "HEAD").unwrap();
    assert_eq!(log.len(), 2);
    assert_eq!(log[0].message.trim(), "feat: three");
    assert!(log[1].message.contains("Longer body."));
    assert_eq!(git.log(None, "HEAD").unwrap().len(), 3);

    assert_eq!(git.tags().unwrap(), vec!["v0.1.0"]);
    let date = git.tag_date("v0.1.0").unwrap().unwrap();
    assert_eq!(date.len(), 10);

    let status = ReleaseStatus::new(git, ReleaseConfig::default());
    assert_eq!(status.next().unwrap(), Some(Version::new(0, 2, 0)));
}
