//! Git operations abstraction layer
//!
//! This module provides a trait-based abstraction over the version-control
//! queries the release tooling needs, allowing for multiple implementations
//! including the real `git` executable and an in-memory mock for testing.
//!
//! # Overview
//!
//! The primary abstraction is the [Repository] trait. The concrete
//! implementations include:
//!
//! - [cli::GitCli]: runs the `git` executable found on `PATH`
//! - [mock::MockRepository]: an in-memory history for tests
//!
//! # Usage
//!
//! Most code should depend on the [Repository] trait rather than concrete
//! implementations to enable easy testing.
//!
//! ```rust
//! # use firmware_buildtools::git::Repository;
//! # fn example<R: Repository>(repo: &R) -> firmware_buildtools::Result<()> {
//! let described = repo.describe("v[0-9]*")?;
//! let commits = repo.log(None, "HEAD")?;
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod mock;

pub use cli::GitCli;
pub use mock::MockRepository;

use crate::error::Result;

/// Commit information for analysis
#[derive(Debug, Clone, PartialEq)]
pub struct CommitInfo {
    /// The full commit hash
    pub hash: String,
    /// The full commit message (header and body)
    pub message: String,
}

/// Read-only version-control queries used by the release tooling
///
/// ## Error Handling
///
/// All methods return [crate::error::Result<T>]. Implementations map their
/// failures to the matching [crate::error::BuildToolsError] variants:
/// `GitNotFound`, `NotARepository`, `EmptyRepository` or `Git`.
pub trait Repository {
    /// Describe HEAD relative to the nearest tag matching `pattern`
    ///
    /// Equivalent to `git describe --tags --match <pattern> --dirty --broken`.
    ///
    /// # Returns
    /// * `Ok(Some(text))` - e.g. `v1.2.0`, `v1.2.0-dirty`, `v1.2.0-3-g8d99ee4`
    /// * `Ok(None)` - no matching tag can describe HEAD
    /// * `Err` - if git fails for another reason
    fn describe(&self, pattern: &str) -> Result<Option<String>>;

    /// Abbreviated hash of HEAD
    ///
    /// Fails with `EmptyRepository` when there are no commits.
    fn short_head(&self) -> Result<String>;

    /// Number of commits reachable from HEAD
    fn commit_count(&self) -> Result<u64>;

    /// Whether tracked files differ from HEAD
    fn is_dirty(&self) -> Result<bool>;

    /// Commits reachable from `to` but not from `from`, newest first
    ///
    /// # Arguments
    /// * `from` - Exclusive lower bound (a tag or revision), or `None` for the
    ///   whole history
    /// * `to` - Inclusive upper bound, usually `HEAD` or a tag
    fn log(&self, from: Option<&str>, to: &str) -> Result<Vec<CommitInfo>>;

    /// All tag names in the repository
    fn tags(&self) -> Result<Vec<String>>;

    /// Commit date (YYYY-MM-DD) of the commit a tag points at
    fn tag_date(&self, tag: &str) -> Result<Option<String>>;
}
