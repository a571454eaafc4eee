use crate::domain::{ConventionalCommit, VersionBump};

/// Analyzes commits to determine version bump type
#[derive(Debug, Default)]
pub struct VersionAnalyzer;

impl VersionAnalyzer {
    /// Create a new version analyzer
    pub fn new() -> Self {
        VersionAnalyzer
    }

    /// Determine the bump implied by a set of commits.
    ///
    /// Breaking changes win over features, features over fixes. Any other
    /// commit type does not call for a release.
    pub fn analyze(&self, commits: &[ConventionalCommit]) -> VersionBump {
        commits
            .iter()
            .map(|commit| {
                if commit.parsed.is_breaking_change {
                    VersionBump::Major
                } else {
                    match commit.parsed.r#type.as_str() {
                        "feat" => VersionBump::Minor,
                        "fix" => VersionBump::Patch,
                        _ => VersionBump::None,
                    }
                }
            })
            .max()
            .unwrap_or(VersionBump::None)
    }
}
