use crate::error::{BuildToolsError, Result};
use crate::git::{CommitInfo, Repository};
use std::collections::HashMap;

/// Mock repository for testing without actual git operations
///
/// History is linear. Commits are added oldest first and tags point at the
/// most recently added commit.
pub struct MockRepository {
    commits: Vec<CommitInfo>,
    tags: HashMap<String, usize>,
    tag_dates: HashMap<String, String>,
    dirty: bool,
    broken: bool,
    is_repository: bool,
}

impl MockRepository {
    /// Create a new empty mock repository
    pub fn new() -> Self {
        MockRepository {
            commits: Vec::new(),
            tags: HashMap::new(),
            tag_dates: HashMap::new(),
            dirty: false,
            broken: false,
            is_repository: true,
        }
    }

    /// A directory that is not under version control
    pub fn not_a_repository() -> Self {
        MockRepository {
            is_repository: false,
            ..Self::new()
        }
    }

    /// Add a commit on top of the current head
    pub fn add_commit(&mut self, hash: impl Into<String>, message: impl Into<String>) {
        self.commits.push(CommitInfo {
            hash: hash.into(),
            message: message.into(),
        });
    }

    /// Tag the current head
    pub fn add_tag(&mut self, name: impl Into<String>) {
        if let Some(head) = self.commits.len().checked_sub(1) {
            self.tags.insert(name.into(), head);
        }
    }

    /// Tag the current head with a commit date
    pub fn add_dated_tag(&mut self, name: impl Into<String>, date: impl Into<String>) {
        let name = name.into();
        self.add_tag(name.clone());
        self.tag_dates.insert(name, date.into());
    }

    pub fn set_dirty(&mut self, dirty: bool) {
        self.dirty = dirty;
    }

    pub fn set_broken(&mut self, broken: bool) {
        self.broken = broken;
    }

    fn check(&self) -> Result<()> {
        if self.is_repository {
            Ok(())
        } else {
            Err(BuildToolsError::NotARepository)
        }
    }

    fn head(&self) -> Result<usize> {
        self.commits
            .len()
            .checked_sub(1)
            .ok_or(BuildToolsError::EmptyRepository)
    }

    fn resolve(&self, rev: &str) -> Result<usize> {
        if rev == "HEAD" {
            return self.head();
        }
        if let Some(index) = self.tags.get(rev) {
            return Ok(*index);
        }
        self.commits
            .iter()
            .position(|c| c.hash == rev)
            .ok_or_else(|| BuildToolsError::git(format!("unknown revision '{}'", rev)))
    }
}

impl Default for MockRepository {
    fn default() -> Self {
        Self::new()
    }
}

/// Minimal `git describe --match` glob support: a literal prefix, optionally
/// followed by `[0-9]*`.
fn matches_glob(pattern: &str, tag: &str) -> bool {
    match pattern.strip_suffix("[0-9]*") {
        Some(prefix) => tag
            .strip_prefix(prefix)
            .map(|rest| rest.starts_with(|c: char| c.is_ascii_digit()))
            .unwrap_or(false),
        None => pattern == tag,
    }
}

impl Repository for MockRepository {
    fn describe(&self, pattern: &str) -> Result<Option<String>> {
        self.check()?;
        let head = match self.head() {
            Ok(head) => head,
            Err(_) => return Ok(None),
        };

        let nearest = self
            .tags
            .iter()
            .filter(|(name, _)| matches_glob(pattern, name))
            .max_by(|a, b| a.1.cmp(b.1).then_with(|| a.0.cmp(b.0)));

        let Some((tag, index)) = nearest else {
            return Ok(None);
        };

        let distance = head - index;
        let mut described = if distance == 0 {
            tag.clone()
        } else {
            let hash = &self.commits[head].hash;
            format!("{}-{}-g{}", tag, distance, &hash[..hash.len().min(7)])
        };
        if self.broken {
            described.push_str("-broken");
        } else if self.dirty {
            described.push_str("-dirty");
        }
        Ok(Some(described))
    }

    fn short_head(&self) -> Result<String> {
        self.check()?;
        let hash = &self.commits[self.head()?].hash;
        Ok(hash[..hash.len().min(7)].to_string())
    }

    fn commit_count(&self) -> Result<u64> {
        self.check()?;
        Ok(self.commits.len() as u64)
    }

    fn is_dirty(&self) -> Result<bool> {
        self.check()?;
        Ok(self.dirty)
    }

    fn log(&self, from: Option<&str>, to: &str) -> Result<Vec<CommitInfo>> {
        self.check()?;
        let end = self.resolve(to)?;
        let start = match from {
            Some(from) => self.resolve(from)? + 1,
            None => 0,
        };
        if start > end {
            return Ok(Vec::new());
        }
        Ok(self.commits[start..=end].iter().rev().cloned().collect())
    }

    fn tags(&self) -> Result<Vec<String>> {
        self.check()?;
        let mut names: Vec<String> = self.tags.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    fn tag_date(&self, tag: &str) -> Result<Option<String>> {
        self.check()?;
        self.resolve(tag)?;
        Ok(self.tag_dates.get(tag).cloned())
    }
}
