use regex::Regex;

const DEFAULT_BREAKING_INDICATORS: [&str; 2] = ["BREAKING CHANGE", "BREAKING-CHANGE"];

/// Parsed representation of a conventional commit message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommit {
    pub r#type: String,
    pub scope: Option<String>,
    pub is_breaking_change: bool,
    /// Header text after the colon
    pub summary: String,
    /// Rest of the message, if any
    pub description: Option<String>,
}

impl ParsedCommit {
    /// Parse a commit message in the Conventional Commits format
    /// Supports formats:
    /// - type(scope)!: summary
    /// - type(scope): summary
    /// - type!: summary
    /// - type: summary
    ///
    /// Returns `None` for messages that are not conventional.
    pub fn parse(message: &str) -> Option<Self> {
        Self::parse_with_indicators(message, &DEFAULT_BREAKING_INDICATORS)
    }

    /// Same as [`ParsedCommit::parse`], with custom breaking change footers.
    pub fn parse_with_indicators<S: AsRef<str>>(message: &str, indicators: &[S]) -> Option<Self> {
        let mut lines = message.trim_start().lines();
        let header = lines.next()?.trim();

        let re = Regex::new(r"^([A-Za-z0-9._-]+)(?:\(([A-Za-z0-9._-]+)\))?(!)?:\s(.*)$").ok()?;
        let captures = re.captures(header)?;

        let r#type = captures.get(1)?.as_str().to_string();
        let scope = captures.get(2).map(|m| m.as_str().to_string());
        let has_exclamation = captures.get(3).is_some();
        let summary = captures
            .get(4)
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_default();

        let body: Vec<&str> = lines.map(str::trim).collect();
        let has_breaking_footer = body.iter().any(|line| {
            indicators
                .iter()
                .any(|indicator| line.starts_with(indicator.as_ref()))
        });

        let description = body
            .iter()
            .filter(|line| !line.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join("\n");

        Some(ParsedCommit {
            r#type,
            scope,
            is_breaking_change: has_exclamation || has_breaking_footer,
            summary,
            description: if description.is_empty() {
                None
            } else {
                Some(description.to_string())
            },
        })
    }
}

/// A conventional commit together with its revision hash
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConventionalCommit {
    pub hash: String,
    pub parsed: ParsedCommit,
}

impl ConventionalCommit {
    /// First eight characters of the hash, as shown in changelogs.
    pub fn short_hash(&self) -> &str {
        let end = self
            .hash
            .char_indices()
            .nth(8)
            .map(|(i, _)| i)
            .unwrap_or(self.hash.len());
        &self.hash[..end]
    }
}
