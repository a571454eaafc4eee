//! Domain logic - pure release rules independent of git operations

pub mod changelog;
pub mod commit;
pub mod tag;
pub mod version;

pub use changelog::{Changelog, ChangelogLine, ReleaseEntry, Section};
pub use commit::{ConventionalCommit, ParsedCommit};
pub use tag::TagPattern;
pub use version::{HeadVersion, TreeState, VersionBump};
