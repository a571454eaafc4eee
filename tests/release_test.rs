// tests/release_test.rs
use firmware_buildtools::config::ReleaseConfig;
use firmware_buildtools::git::MockRepository;
use firmware_buildtools::release::{ReleaseStatus, UNRELEASED};
use regex::Regex;
use semver::Version;

const SEMVER_PATTERN: &str = r"^(0|[1-9]\d*)\.(0|[1-9]\d*)\.(0|[1-9]\d*)(?:-((?:0|[1-9]\d*|\d*[a-zA-Z-][0-9a-zA-Z-]*)(?:\.(?:0|[1-9]\d*|\d*[a-zA-Z-][0-9a-zA-Z-]*))*))?(?:\+([0-9a-zA-Z-]+(?:\.[0-9a-zA-Z-]+)*))?$";

fn history() -> MockRepository {
    let mut repo = MockRepository::new();
    repo.add_commit("a000000001", "feat: first board support");
    repo.add_dated_tag("v0.1.0", "2023-01-10");
    repo.add_commit("a000000002", "fix(wifi): reconnect after sleep");
    repo.add_dated_tag("v0.1.1", "2023-02-01");
    repo.add_commit("a000000003", "feat: runner api");
    repo.add_commit("a000000004", "Merge branch 'dev'");
    repo.add_dated_tag("v0.2.0", "2023-03-15");
    repo.add_commit("a000000005", "feat(net)!: new connection api");
    repo
}

fn status(repo: MockRepository) -> ReleaseStatus<MockRepository> {
    ReleaseStatus::new(repo, ReleaseConfig::default())
}

#[test]
fn test_head_version_matches_semver_pattern() {
    let pattern = Regex::new(SEMVER_PATTERN).unwrap();

    let head = status(history()).head().unwrap();
    assert_eq!(head.to_string(), "0.2.0+1.a000000.clean");
    assert!(pattern.is_match(&head.to_string()));

    let mut tagged = history();
    tagged.add_tag("v0.3.0");
    let head = status(tagged).head().unwrap();
    assert_eq!(head.to_string(), "0.3.0");
    assert!(head.is_release());
    assert!(pattern.is_match(&head.to_string()));
}

#[test]
fn test_breaking_change_before_1_0_bumps_minor() {
    let release = status(history());
    assert_eq!(release.latest().unwrap().version, Version::new(0, 2, 0));
    assert_eq!(release.next().unwrap(), Some(Version::new(0, 3, 0)));
}

#[test]
fn test_breaking_change_after_1_0_bumps_major() {
    let mut repo = MockRepository::new();
    repo.add_commit("b000000001", "feat: stable");
    repo.add_tag("v1.4.2");
    repo.add_commit(
        "b000000002",
        "refactor: drop legacy api\n\nBREAKING CHANGE: removed v1 endpoints",
    );
    assert_eq!(status(repo).next().unwrap(), Some(Version::new(2, 0, 0)));
}

#[test]
fn test_changelog_is_reverse_chronological() {
    let changelog = status(history()).changelog_history().unwrap();
    let versions: Vec<String> = changelog
        .entries()
        .iter()
        .map(|e| e.version.to_string())
        .collect();
    assert_eq!(versions, vec!["0.3.0", "0.2.0", "0.1.1", "0.1.0"]);

    let dates: Vec<Option<&str>> = changelog
        .entries()
        .iter()
        .map(|e| e.date.as_deref())
        .collect();
    assert_eq!(
        dates,
        vec![
            Some(UNRELEASED),
            Some("2023-03-15"),
            Some("2023-02-01"),
            Some("2023-01-10"),
        ]
    );

    let markdown = changelog.render_markdown();
    let pending = markdown.find("## 0.3.0 (unreleased)").unwrap();
    let oldest = markdown.find("## 0.1.0 (2023-01-10)").unwrap();
    assert!(pending < oldest);
    assert!(markdown.contains("**BREAKING:** **net:** new connection api (a0000000)"));
    assert!(markdown.contains("**wifi:** reconnect after sleep"));
}

#[test]
fn test_changelog_without_pending_release() {
    let mut repo = history();
    repo.add_tag("v0.3.0");
    let changelog = status(repo).changelog_history().unwrap();
    assert_eq!(changelog.entries()[0].version, Version::new(0, 3, 0));
    assert_ne!(changelog.entries()[0].date.as_deref(), Some(UNRELEASED));
}

#[test]
fn test_non_release_tags_are_ignored() {
    let mut repo = history();
    repo.add_tag("nightly");
    let release = status(repo);
    assert_eq!(release.latest().unwrap().tag.as_deref(), Some("v0.2.0"));
    assert_eq!(release.changelog_history().unwrap().entries().len(), 4);
}

#[test]
fn test_custom_tag_prefix() {
    let mut repo = MockRepository::new();
    repo.add_commit("c000000001", "feat: one");
    repo.add_tag("fw-1.0.0");
    repo.add_commit("c000000002", "fix: two");
    let config = ReleaseConfig {
        tag_prefix: "fw-".to_string(),
        ..ReleaseConfig::default()
    };
    let release = ReleaseStatus::new(repo, config);
    assert_eq!(release.latest().unwrap().tag.as_deref(), Some("fw-1.0.0"));
    assert_eq!(release.next().unwrap(), Some(Version::new(1, 0, 1)));
}

#[test]
fn test_not_a_repository() {
    let release = status(MockRepository::not_a_repository());
    assert!(release.head().is_err());
    assert!(release.latest().is_err());
}
