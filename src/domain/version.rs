use semver::{BuildMetadata, Version};
use std::fmt;

use crate::error::{BuildToolsError, Result};

/// Version bump type decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum VersionBump {
    None,
    Patch,
    Minor,
    Major,
}

impl VersionBump {
    /// Bump version according to bump type
    ///
    /// While the major version is zero, breaking changes bump the minor
    /// version. A pre-release is promoted to its release for any bump.
    pub fn apply(&self, version: &Version) -> Version {
        if *self == VersionBump::None {
            return version.clone();
        }

        if !version.pre.is_empty() {
            return Version::new(version.major, version.minor, version.patch);
        }

        match self {
            VersionBump::Major if version.major > 0 => Version::new(version.major + 1, 0, 0),
            VersionBump::Major | VersionBump::Minor => {
                Version::new(version.major, version.minor + 1, 0)
            }
            VersionBump::Patch => Version::new(version.major, version.minor, version.patch + 1),
            VersionBump::None => version.clone(),
        }
    }
}

/// Working tree state recorded in development versions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeState {
    Clean,
    Dirty,
}

impl fmt::Display for TreeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeState::Clean => write!(f, "clean"),
            TreeState::Dirty => write!(f, "dirty"),
        }
    }
}

/// Version of the checked-out commit.
///
/// On a clean, release-tagged commit this is the tagged version itself.
/// Otherwise build metadata records the distance from the tag:
///
/// - `1.1.0+0.dirty` - local changes on the tagged commit
/// - `1.1.0+12.2dfee1f.dirty` - 12 commits past the tag, with local changes
/// - `0.0.0+3.8d99ee4.clean` - no release tag yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadVersion(Version);

impl HeadVersion {
    /// HEAD is exactly on a release tag.
    pub fn on_tag(version: &Version, state: TreeState) -> Self {
        let mut head = strip_build(version);
        if state == TreeState::Dirty {
            head.build = build_metadata("0.dirty");
        }
        HeadVersion(head)
    }

    /// HEAD is `distance` commits past the release tag.
    pub fn past_tag(version: &Version, distance: u64, hash: &str, state: TreeState) -> Self {
        let mut head = strip_build(version);
        head.build = build_metadata(&format!("{}.{}.{}", distance, hash, state));
        HeadVersion(head)
    }

    /// No release tag describes HEAD.
    pub fn untagged(commit_count: u64, hash: &str, state: TreeState) -> Self {
        Self::past_tag(&Version::new(0, 0, 0), commit_count, hash, state)
    }

    /// Parse a previously produced head version string.
    pub fn parse(s: &str) -> Result<Self> {
        Version::parse(s.trim())
            .map(HeadVersion)
            .map_err(|e| BuildToolsError::version(format!("'{}' is not valid semver: {}", s, e)))
    }

    /// True when this is a clean, tagged release.
    pub fn is_release(&self) -> bool {
        self.0.build.is_empty()
    }

    /// The release version this head is based on.
    pub fn base(&self) -> Version {
        strip_build(&self.0)
    }

    pub fn as_version(&self) -> &Version {
        &self.0
    }
}

impl fmt::Display for HeadVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Parse a bare semantic version (no prefix).
pub fn parse_version(s: &str) -> Result<Version> {
    Version::parse(s.trim())
        .map_err(|e| BuildToolsError::version(format!("'{}' is not valid semver: {}", s, e)))
}

fn strip_build(version: &Version) -> Version {
    Version {
        major: version.major,
        minor: version.minor,
        patch: version.patch,
        pre: version.pre.clone(),
        build: BuildMetadata::EMPTY,
    }
}

// Only ever fed dot-separated alphanumerics built above.
fn build_metadata(s: &str) -> BuildMetadata {
    BuildMetadata::new(s).unwrap_or(BuildMetadata::EMPTY)
}
