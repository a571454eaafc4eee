//! Changelog model and rendering.
//!
//! A changelog is a list of release entries, newest first. Each entry groups
//! the conventional commits of one release by commit type.

use semver::Version;

use crate::config::ReleaseConfig;
use crate::domain::commit::ConventionalCommit;

/// One changelog line derived from a commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangelogLine {
    pub hash: String,
    pub scope: Option<String>,
    pub summary: String,
    pub breaking: bool,
}

impl From<&ConventionalCommit> for ChangelogLine {
    fn from(commit: &ConventionalCommit) -> Self {
        ChangelogLine {
            hash: commit.short_hash().to_string(),
            scope: commit.parsed.scope.clone(),
            summary: commit.parsed.summary.clone(),
            breaking: commit.parsed.is_breaking_change,
        }
    }
}

/// Commits of a single type within a release
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub commit_type: String,
    pub title: String,
    pub lines: Vec<ChangelogLine>,
}

/// Group commits by type, keeping the order of `types` and, within a type,
/// the order of `commits` (newest first). Every requested type gets a
/// section, possibly empty.
pub fn group_by_type(
    commits: &[ConventionalCommit],
    types: &[String],
    config: &ReleaseConfig,
) -> Vec<Section> {
    types
        .iter()
        .map(|commit_type| Section {
            commit_type: commit_type.clone(),
            title: config.section_title(commit_type),
            lines: commits
                .iter()
                .filter(|c| &c.parsed.r#type == commit_type)
                .map(ChangelogLine::from)
                .collect(),
        })
        .collect()
}

/// Changes released under one version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseEntry {
    pub version: Version,
    /// Release date, or a marker such as "unreleased"
    pub date: Option<String>,
    pub sections: Vec<Section>,
}

impl ReleaseEntry {
    pub fn is_empty(&self) -> bool {
        self.sections.iter().all(|s| s.lines.is_empty())
    }
}

/// Ordered changelog document, newest release first
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Changelog {
    entries: Vec<ReleaseEntry>,
}

impl Changelog {
    pub fn new() -> Self {
        Changelog {
            entries: Vec::new(),
        }
    }

    /// Add an entry, keeping entries sorted newest version first.
    pub fn insert(&mut self, entry: ReleaseEntry) {
        let position = self
            .entries
            .iter()
            .position(|existing| existing.version < entry.version)
            .unwrap_or(self.entries.len());
        self.entries.insert(position, entry);
    }

    pub fn entries(&self) -> &[ReleaseEntry] {
        &self.entries
    }

    /// Render the changelog as a markdown document.
    pub fn render_markdown(&self) -> String {
        let mut out = String::from("# Changelog\n");

        for entry in &self.entries {
            out.push('\n');
            match &entry.date {
                Some(date) => out.push_str(&format!("## {} ({})\n", entry.version, date)),
                None => out.push_str(&format!("## {}\n", entry.version)),
            }

            for section in entry.sections.iter().filter(|s| !s.lines.is_empty()) {
                out.push_str(&format!("\n### {}\n\n", section.title));
                for line in &section.lines {
                    out.push_str("- ");
                    if line.breaking {
                        out.push_str("**BREAKING:** ");
                    }
                    if let Some(scope) = &line.scope {
                        out.push_str(&format!("**{}:** ", scope));
                    }
                    out.push_str(&format!("{} ({})\n", line.summary, line.hash));
                }
            }
        }

        out
    }
}

/// Render grouped commits for the terminal:
///
/// ```text
/// feat:
///  - BREAKING: [wifi] new connection api (2dfee1f0)
///
/// ```
pub fn render_summary(sections: &[Section]) -> String {
    let mut out = String::new();
    for section in sections.iter().filter(|s| !s.lines.is_empty()) {
        out.push_str(&format!("{}:\n", section.commit_type));
        for line in &section.lines {
            out.push_str(" - ");
            if line.breaking {
                out.push_str("BREAKING: ");
            }
            if let Some(scope) = &line.scope {
                out.push_str(&format!("[{}] ", scope));
            }
            out.push_str(&format!("{} ({})\n", line.summary, line.hash));
        }
        out.push('\n');
    }
    out
}

/// Count line, e.g. "2 feat commit(s), 0 fix commit(s) since last release".
pub fn render_aggregate(sections: &[Section]) -> String {
    let counts: Vec<String> = sections
        .iter()
        .map(|s| format!("{} {} commit(s)", s.lines.len(), s.commit_type))
        .collect();
    format!("{} since last release", counts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::commit::ParsedCommit;

    fn commit(hash: &str, message: &str) -> ConventionalCommit {
        ConventionalCommit {
            hash: hash.to_string(),
            parsed: ParsedCommit::parse(message).unwrap(),
        }
    }

    fn types(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_group_by_type_keeps_requested_order() {
        let commits = vec![
            commit("aaaaaaaaaa", "fix: one"),
            commit("bbbbbbbbbb", "feat(net): two"),
            commit("cccccccccc", "docs: three"),
        ];
        let sections = group_by_type(&commits, &types(&["feat", "fix"]), &ReleaseConfig::default());
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].commit_type, "feat");
        assert_eq!(sections[0].title, "Features");
        assert_eq!(sections[0].lines[0].hash, "bbbbbbbb");
        assert_eq!(sections[1].lines[0].summary, "one");
    }

    #[test]
    fn test_render_summary() {
        let commits = vec![
            commit("2dfee1f0aa", "feat(wifi)!: new connection api"),
            commit("8d99ee4bbb", "fix: watchdog reset"),
        ];
        let sections = group_by_type(&commits, &types(&["feat", "fix"]), &ReleaseConfig::default());
        assert_eq!(
            render_summary(&sections),
            "feat:\n - BREAKING: [wifi] new connection api (2dfee1f0)\n\nfix:\n - watchdog reset (8d99ee4b)\n\n"
        );
    }

    #[test]
    fn test_render_summary_skips_empty_sections() {
        let commits = vec![commit("8d99ee4bbb", "fix: watchdog reset")];
        let sections = group_by_type(&commits, &types(&["feat", "fix"]), &ReleaseConfig::default());
        assert!(!render_summary(&sections).contains("feat:"));
    }

    #[test]
    fn test_render_aggregate() {
        let commits = vec![commit("8d99ee4bbb", "fix: watchdog reset")];
        let sections = group_by_type(&commits, &types(&["feat", "fix"]), &ReleaseConfig::default());
        assert_eq!(
            render_aggregate(&sections),
            "0 feat commit(s), 1 fix commit(s) since last release"
        );
    }

    #[test]
    fn test_insert_keeps_newest_first() {
        let mut changelog = Changelog::new();
        for version in ["1.0.0", "1.2.0", "0.9.0", "1.1.0"] {
            changelog.insert(ReleaseEntry {
                version: Version::parse(version).unwrap(),
                date: None,
                sections: Vec::new(),
            });
        }
        let versions: Vec<String> = changelog
            .entries()
            .iter()
            .map(|e| e.version.to_string())
            .collect();
        assert_eq!(versions, vec!["1.2.0", "1.1.0", "1.0.0", "0.9.0"]);
    }

    #[test]
    fn test_render_markdown() {
        let config = ReleaseConfig::default();
        let mut changelog = Changelog::new();
        changelog.insert(ReleaseEntry {
            version: Version::new(1, 0, 0),
            date: Some("2024-03-01".to_string()),
            sections: group_by_type(
                &[commit("1111111111", "fix(adc): clamp readings")],
                &types(&["feat", "fix"]),
                &config,
            ),
        });
        changelog.insert(ReleaseEntry {
            version: Version::new(1, 1, 0),
            date: Some("unreleased".to_string()),
            sections: group_by_type(
                &[commit("2222222222", "feat!: new boot sequence")],
                &types(&["feat", "fix"]),
                &config,
            ),
        });

        let expected = "# Changelog\n\
            \n## 1.1.0 (unreleased)\n\
            \n### Features\n\n\
            - **BREAKING:** new boot sequence (22222222)\n\
            \n## 1.0.0 (2024-03-01)\n\
            \n### Fixes\n\n\
            - **adc:** clamp readings (11111111)\n";
        assert_eq!(changelog.render_markdown(), expected);
    }

    #[test]
    fn test_entry_is_empty() {
        let entry = ReleaseEntry {
            version: Version::new(0, 1, 0),
            date: None,
            sections: group_by_type(&[], &types(&["feat"]), &ReleaseConfig::default()),
        };
        assert!(entry.is_empty());
    }
}
