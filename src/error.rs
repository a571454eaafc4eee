use std::path::PathBuf;

use thiserror::Error;

/// Unified error type for the build tools
#[derive(Error, Debug)]
pub enum BuildToolsError {
    #[error("git required, but not found on the system (see https://git-scm.com/)")]
    GitNotFound,

    #[error("not a git repository")]
    NotARepository,

    #[error("git repository has no commits yet")]
    EmptyRepository,

    #[error("git working tree is broken")]
    BrokenRepository,

    #[error("Git operation failed: {0}")]
    Git(String),

    #[error("version tag is not valid semver: {0}")]
    TagNotSemVer(String),

    #[error("commit {0} does not follow conventional commits")]
    CommitNotConventional(String),

    #[error("Version error: {0}")]
    Version(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Documentation error: {0}")]
    Docs(String),

    #[error("{component}: {message}")]
    Toolchain {
        component: String,
        message: String,
        log: Option<PathBuf>,
    },

    #[error("'{0}' required, but not found on the system")]
    ToolNotFound(String),

    #[error("'{program}' exited with code {code}")]
    Subprocess { program: String, code: i32 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Convenience type alias for Results in the build tools
pub type Result<T> = std::result::Result<T, BuildToolsError>;

impl BuildToolsError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        BuildToolsError::Config(msg.into())
    }

    /// Create a version error with context
    pub fn version(msg: impl Into<String>) -> Self {
        BuildToolsError::Version(msg.into())
    }

    /// Create a documentation error with context
    pub fn docs(msg: impl Into<String>) -> Self {
        BuildToolsError::Docs(msg.into())
    }

    /// Create an unexpected git error with context
    pub fn git(msg: impl Into<String>) -> Self {
        BuildToolsError::Git(msg.into())
    }

    /// Create a toolchain step failure
    pub fn toolchain(
        component: impl Into<String>,
        message: impl Into<String>,
        log: Option<PathBuf>,
    ) -> Self {
        BuildToolsError::Toolchain {
            component: component.into(),
            message: message.into(),
            log,
        }
    }

    /// Log file the user should inspect, if the failure produced one
    pub fn log_file(&self) -> Option<&PathBuf> {
        match self {
            BuildToolsError::Toolchain { log, .. } => log.as_ref(),
            _ => None,
        }
    }
}
