use semver::Version;

/// Release tag naming: a fixed prefix followed by a semantic version
/// (e.g. "v1.2.3", "v2.0.0-rc.1").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagPattern {
    pub prefix: String,
}

impl TagPattern {
    /// Create a new tag pattern
    pub fn new(prefix: impl Into<String>) -> Self {
        TagPattern {
            prefix: prefix.into(),
        }
    }

    /// Format a version according to pattern
    /// Example: prefix="v", version=1.2.3 -> "v1.2.3"
    pub fn format(&self, version: &Version) -> String {
        format!("{}{}", self.prefix, version)
    }

    /// Glob passed to `git describe --match` to select release tags.
    pub fn describe_glob(&self) -> String {
        format!("{}[0-9]*", self.prefix)
    }

    /// True when the tag looks like a release tag (prefix then a digit),
    /// whether or not the rest is valid semver.
    pub fn looks_like_release(&self, tag: &str) -> bool {
        tag.strip_prefix(self.prefix.as_str())
            .map(|rest| rest.starts_with(|c: char| c.is_ascii_digit()))
            .unwrap_or(false)
    }

    /// Extract the version of a release tag, `None` for any other tag.
    pub fn version_of(&self, tag: &str) -> Option<Version> {
        if !self.looks_like_release(tag) {
            return None;
        }
        Version::parse(&tag[self.prefix.len()..]).ok()
    }

    /// Release tags sorted newest (highest precedence) first.
    ///
    /// Tags that do not carry a version are dropped.
    pub fn sort_release_tags(&self, tags: &[String]) -> Vec<(String, Version)> {
        let mut releases: Vec<(String, Version)> = tags
            .iter()
            .filter_map(|tag| self.version_of(tag).map(|version| (tag.clone(), version)))
            .collect();
        releases.sort_by(|a, b| b.1.cmp(&a.1));
        releases
    }
}

impl Default for TagPattern {
    fn default() -> Self {
        TagPattern::new("v")
    }
}
