use std::fmt;

/// Non-fatal issues found while reading the release history.
/// These are logged and the offending item is skipped.
#[derive(Debug, Clone, PartialEq)]
pub enum ReleaseWarning {
    /// Commit message does not follow conventional commits
    NonConventionalCommit { hash: String, header: String },
    /// Tag looks like a release tag but is not a semantic version
    UnparsableTag { tag: String, reason: String },
    /// HEAD is the latest release tag
    NoNewCommits {
        latest_tag: String,
        current_commit_hash: String,
    },
}

impl fmt::Display for ReleaseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReleaseWarning::NonConventionalCommit { hash, header } => {
                write!(
                    f,
                    "skipping commit {}: '{}' is not a conventional commit",
                    short(hash),
                    header
                )
            }
            ReleaseWarning::UnparsableTag { tag, reason } => {
                write!(f, "Cannot parse tag '{}': {}", tag, reason)
            }
            ReleaseWarning::NoNewCommits {
                latest_tag,
                current_commit_hash,
            } => {
                write!(
                    f,
                    "No new commits since tag '{}' (current: {})",
                    latest_tag,
                    short(current_commit_hash)
                )
            }
        }
    }
}

fn short(hash: &str) -> &str {
    if hash.len() > 8 {
        &hash[..8]
    } else {
        hash
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_conventional_display() {
        let warning = ReleaseWarning::NonConventionalCommit {
            hash: "2dfee1f0c0ffee".to_string(),
            header: "Random commit".to_string(),
        };
        assert_eq!(
            warning.to_string(),
            "skipping commit 2dfee1f0: 'Random commit' is not a conventional commit"
        );
    }

    #[test]
    fn test_unparsable_tag_display() {
        let warning = ReleaseWarning::UnparsableTag {
            tag: "v1-beta".to_string(),
            reason: "unexpected end of input".to_string(),
        };
        let msg = warning.to_string();
        assert!(msg.contains("Cannot parse tag"));
        assert!(msg.contains("v1-beta"));
    }

    #[test]
    fn test_no_new_commits_display() {
        let warning = ReleaseWarning::NoNewCommits {
            latest_tag: "v1.0.0".to_string(),
            current_commit_hash: "abc1234".to_string(),
        };
        assert_eq!(
            warning.to_string(),
            "No new commits since tag 'v1.0.0' (current: abc1234)"
        );
    }
}
