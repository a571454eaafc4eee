//! Release status of a repository.
//!
//! [ReleaseStatus] answers the questions the release tooling asks: which
//! version is checked out, what the last release was, whether a new release
//! is needed and what changed in each release.

pub mod version_file;
pub mod warning;

pub use version_file::{render_version_file, write_version_file};
pub use warning::ReleaseWarning;

use std::path::Path;

use regex::Regex;
use semver::Version;

use crate::analyzer::VersionAnalyzer;
use crate::config::ReleaseConfig;
use crate::domain::changelog::group_by_type;
use crate::domain::{
    Changelog, ConventionalCommit, HeadVersion, ParsedCommit, ReleaseEntry, Section, TagPattern,
    TreeState, VersionBump,
};
use crate::error::{BuildToolsError, Result};
use crate::git::{CommitInfo, Repository};

/// Date shown for the pending release in the changelog
pub const UNRELEASED: &str = "unreleased";

/// The most recent release reachable from HEAD
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatestRelease {
    pub version: Version,
    /// Tag of the release, `None` before the first release
    pub tag: Option<String>,
}

impl LatestRelease {
    pub fn is_released(&self) -> bool {
        self.tag.is_some()
    }
}

/// Parsed `git describe` result
struct Described {
    tag: String,
    version: Version,
    distance: u64,
    hash: Option<String>,
    state: TreeState,
}

pub struct ReleaseStatus<R: Repository> {
    repo: R,
    config: ReleaseConfig,
    pattern: TagPattern,
    analyzer: VersionAnalyzer,
}

impl<R: Repository> ReleaseStatus<R> {
    pub fn new(repo: R, config: ReleaseConfig) -> Self {
        let pattern = TagPattern::new(config.tag_prefix.clone());
        ReleaseStatus {
            repo,
            config,
            pattern,
            analyzer: VersionAnalyzer::new(),
        }
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    pub fn config(&self) -> &ReleaseConfig {
        &self.config
    }

    fn describe(&self) -> Result<Option<Described>> {
        let Some(text) = self.repo.describe(&self.pattern.describe_glob())? else {
            return Ok(None);
        };
        if text.ends_with("-broken") {
            return Err(BuildToolsError::BrokenRepository);
        }

        let (rest, state) = match text.strip_suffix("-dirty") {
            Some(rest) => (rest, TreeState::Dirty),
            None => (text.as_str(), TreeState::Clean),
        };

        let past_tag = Regex::new(r"^(.+)-(\d+)-g([0-9a-fA-F]+)$")
            .map_err(|e| BuildToolsError::git(e.to_string()))?;
        let (tag, distance, hash) = match past_tag.captures(rest) {
            Some(caps) => {
                let distance = caps[2].parse::<u64>().map_err(|_| {
                    BuildToolsError::git(format!("unexpected describe output '{}'", text))
                })?;
                (caps[1].to_string(), distance, Some(caps[3].to_string()))
            }
            None => (rest.to_string(), 0, None),
        };

        let version = self
            .pattern
            .version_of(&tag)
            .ok_or_else(|| BuildToolsError::TagNotSemVer(tag.clone()))?;

        Ok(Some(Described {
            tag,
            version,
            distance,
            hash,
            state,
        }))
    }

    /// Version of the checked-out commit.
    pub fn head(&self) -> Result<HeadVersion> {
        match self.describe()? {
            Some(described) => match (described.distance, described.hash) {
                (0, _) | (_, None) => Ok(HeadVersion::on_tag(&described.version, described.state)),
                (distance, Some(hash)) => Ok(HeadVersion::past_tag(
                    &described.version,
                    distance,
                    &hash,
                    described.state,
                )),
            },
            None => {
                let hash = self.repo.short_head()?;
                let count = self.repo.commit_count()?;
                let state = if self.repo.is_dirty()? {
                    TreeState::Dirty
                } else {
                    TreeState::Clean
                };
                Ok(HeadVersion::untagged(count, &hash, state))
            }
        }
    }

    /// The last release, `0.0.0` when nothing has been released.
    pub fn latest(&self) -> Result<LatestRelease> {
        Ok(match self.describe()? {
            Some(described) => LatestRelease {
                version: described.version,
                tag: Some(described.tag),
            },
            None => LatestRelease {
                version: Version::new(0, 0, 0),
                tag: None,
            },
        })
    }

    /// Conventional commits since the last release, newest first.
    pub fn commits(&self) -> Result<Vec<ConventionalCommit>> {
        let latest = self.latest()?;
        let commits = self.conventional(self.repo.log(latest.tag.as_deref(), "HEAD")?)?;

        if let (Some(tag), true) = (&latest.tag, commits.is_empty()) {
            if let Ok(hash) = self.repo.short_head() {
                log::info!(
                    "{}",
                    ReleaseWarning::NoNewCommits {
                        latest_tag: tag.clone(),
                        current_commit_hash: hash,
                    }
                );
            }
        }
        Ok(commits)
    }

    /// Bump implied by the commits since the last release.
    pub fn bump(&self) -> Result<VersionBump> {
        Ok(self.analyzer.analyze(&self.commits()?))
    }

    /// The next release version, `None` when no release is needed.
    pub fn next(&self) -> Result<Option<Version>> {
        let latest = self.latest()?;
        let next = self.bump()?.apply(&latest.version);
        Ok(if next != latest.version {
            Some(next)
        } else {
            None
        })
    }

    /// Commits since the last release grouped by type, in the order given.
    pub fn group_commits(&self, types: &[String]) -> Result<Vec<Section>> {
        Ok(group_by_type(&self.commits()?, types, &self.config))
    }

    /// Full release history, including the pending release if one is
    /// needed.
    pub fn changelog_history(&self) -> Result<Changelog> {
        let releases = self.release_tags()?;
        let mut changelog = Changelog::new();

        for (i, (tag, version)) in releases.iter().enumerate() {
            let previous = releases.get(i + 1).map(|(t, _)| t.as_str());
            let commits = self.conventional(self.repo.log(previous, tag)?)?;
            changelog.insert(ReleaseEntry {
                version: version.clone(),
                date: self.repo.tag_date(tag)?,
                sections: group_by_type(&commits, &self.config.changelog_types, &self.config),
            });
        }

        if let Some(next) = self.next()? {
            changelog.insert(ReleaseEntry {
                version: next,
                date: Some(UNRELEASED.to_string()),
                sections: self.group_commits(&self.config.changelog_types)?,
            });
        }

        Ok(changelog)
    }

    /// Write `version` to a version file in the format matching its
    /// extension.
    pub fn write_version_file(&self, path: &Path, version: &Version) -> Result<()> {
        write_version_file(path, version, &self.config.version_macro)
    }

    /// Release tags, newest first. Tags that look like releases but are not
    /// valid semver are logged and skipped.
    fn release_tags(&self) -> Result<Vec<(String, Version)>> {
        let tags = self.repo.tags()?;
        for tag in tags.iter().filter(|t| self.pattern.looks_like_release(t)) {
            let version_part = &tag[self.pattern.prefix.len()..];
            if let Err(e) = Version::parse(version_part) {
                log::warn!(
                    "{}",
                    ReleaseWarning::UnparsableTag {
                        tag: tag.clone(),
                        reason: e.to_string(),
                    }
                );
            }
        }
        Ok(self.pattern.sort_release_tags(&tags))
    }

    fn conventional(&self, commits: Vec<CommitInfo>) -> Result<Vec<ConventionalCommit>> {
        let mut parsed = Vec::with_capacity(commits.len());
        for commit in commits {
            match ParsedCommit::parse_with_indicators(
                &commit.message,
                &self.config.breaking_change_indicators,
            ) {
                Some(p) => parsed.push(ConventionalCommit {
                    hash: commit.hash,
                    parsed: p,
                }),
                None if self.config.strict => {
                    return Err(BuildToolsError::CommitNotConventional(commit.hash));
                }
                None => {
                    let header = commit.message.lines().next().unwrap_or("").trim().to_string();
                    log::warn!(
                        "{}",
                        ReleaseWarning::NonConventionalCommit {
                            hash: commit.hash,
                            header,
                        }
                    );
                }
            }
        }
        Ok(parsed)
    }
}
