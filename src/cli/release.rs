//! `fw-release` workflow: version and changelog queries against a repository.
//!
//! The workflow produces the lines to print instead of printing them, so it
//! can be driven by a [MockRepository](crate::git::MockRepository) in tests.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use semver::Version;

use crate::config::load_config;
use crate::domain::changelog::{render_aggregate, render_summary};
use crate::git::{GitCli, Repository};
use crate::release::ReleaseStatus;
use crate::ui::{format_status, Reporter};

/// Arguments for the release workflow
///
/// Mirrors the CLI flags without depending on clap.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReleaseWorkflowArgs {
    /// Path to custom config file
    pub config_path: Option<PathBuf>,

    /// Repository to inspect
    pub repo_dir: PathBuf,

    /// Latest, next, describe and changelog together
    pub all: bool,
    pub latest: bool,
    pub next: bool,
    pub describe: bool,

    /// Commit types to summarise; empty means the configured types
    pub changelog: Option<Vec<String>>,

    /// Write the full markdown changelog to this file
    pub write_changelog: Option<PathBuf>,

    /// Write the next (or latest) version to this file
    pub version_file: Option<PathBuf>,

    /// Print bare values only
    pub plain: bool,
}

impl ReleaseWorkflowArgs {
    /// True when at least one action was requested.
    pub fn has_action(&self) -> bool {
        self.all
            || self.latest
            || self.next
            || self.describe
            || self.changelog.is_some()
            || self.write_changelog.is_some()
            || self.version_file.is_some()
    }
}

/// Run the release workflow against the git repository in `args.repo_dir`.
///
/// # Returns
/// * `Ok(lines)` - Output lines in action order
/// * `Err` - If git is missing, the repository is unusable, or a file cannot
///   be written
pub fn run_release_workflow(args: &ReleaseWorkflowArgs, reporter: &Reporter) -> Result<Vec<String>> {
    let config = load_config(args.config_path.as_deref(), &args.repo_dir)
        .context("cannot load configuration")?;

    let git = GitCli::new(&args.repo_dir);
    let git_version = git.ensure_available()?;
    log::debug!("using {}", git_version);

    let status = ReleaseStatus::new(git, config.release);
    release_report(args, &status, reporter)
}

/// Perform the requested actions on `status`.
pub fn release_report<R: Repository>(
    args: &ReleaseWorkflowArgs,
    status: &ReleaseStatus<R>,
    reporter: &Reporter,
) -> Result<Vec<String>> {
    let mut out = Vec::new();
    let line = |stage: &str, message: &str| format_status(reporter.tool(), stage, message);

    if args.all || args.latest {
        let latest = status.latest()?;
        out.push(match (args.plain, latest.is_released()) {
            (true, _) => latest.version.to_string(),
            (false, true) => line("last release", &latest.version.to_string()),
            (false, false) => format!("{}: no release yet.", reporter.tool()),
        });
    }

    if args.all || args.next {
        let next = status.next()?;
        match (args.plain, next) {
            (true, Some(version)) => out.push(version.to_string()),
            (true, None) => {}
            (false, Some(version)) => out.push(line("next release", &version.to_string())),
            (false, None) => out.push(format!("{}: next release not needed.", reporter.tool())),
        }
    }

    if args.all || args.describe {
        let head = status.head()?;
        out.push(if args.plain {
            head.to_string()
        } else {
            line("head commit version", &head.to_string())
        });
    }

    if args.all || args.changelog.is_some() {
        let types = match &args.changelog {
            Some(types) if !types.is_empty() => types.clone(),
            _ => status.config().changelog_types.clone(),
        };
        let sections = status.group_commits(&types)?;
        let summary = render_summary(&sections);
        if !summary.is_empty() {
            out.push(summary.trim_end().to_string());
        }
        if !args.plain {
            out.push(format!("{}: {}", reporter.tool(), render_aggregate(&sections)));
        }
    }

    if let Some(path) = &args.write_changelog {
        let changelog = status.changelog_history()?;
        fs::write(path, changelog.render_markdown())
            .with_context(|| format!("cannot write '{}'", path.display()))?;
        log::info!("changelog written to {}", path.display());
        if !args.plain {
            out.push(line("changelog", &format!("written to '{}'", path.display())));
        }
    }

    if let Some(path) = &args.version_file {
        let version = match status.next()? {
            Some(next) => next,
            None => status.latest().map(|l| l.version).unwrap_or_else(|_| Version::new(0, 0, 0)),
        };
        status.write_version_file(path, &version)?;
        if !args.plain {
            out.push(line(
                "version file",
                &format!("{} written to '{}'", version, path.display()),
            ));
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReleaseConfig;
    use crate::git::MockRepository;

    fn status(repo: MockRepository) -> ReleaseStatus<MockRepository> {
        ReleaseStatus::new(repo, ReleaseConfig::default())
    }

    fn released_repo() -> MockRepository {
        let mut repo = MockRepository::new();
        repo.add_commit("1111111111", "feat: initial");
        repo.add_tag("v1.0.0");
        repo.add_commit("2222222222", "fix(net): reconnect");
        repo
    }

    #[test]
    fn test_has_action() {
        assert!(!ReleaseWorkflowArgs::default().has_action());
        let args = ReleaseWorkflowArgs {
            changelog: Some(Vec::new()),
            ..Default::default()
        };
        assert!(args.has_action());
    }

    #[test]
    fn test_latest_and_next() {
        let args = ReleaseWorkflowArgs {
            latest: true,
            next: true,
            ..Default::default()
        };
        let out = release_report(&args, &status(released_repo()), &Reporter::new("fw-release"))
            .unwrap();
        assert_eq!(
            out,
            vec![
                "fw-release: last release: 1.0.0",
                "fw-release: next release: 1.0.1",
            ]
        );
    }

    #[test]
    fn test_no_release_yet() {
        let mut repo = MockRepository::new();
        repo.add_commit("1111111111", "chore: setup");
        let args = ReleaseWorkflowArgs {
            latest: true,
            next: true,
            ..Default::default()
        };
        let out = release_report(&args, &status(repo), &Reporter::new("fw-release")).unwrap();
        assert_eq!(
            out,
            vec![
                "fw-release: no release yet.",
                "fw-release: next release not needed.",
            ]
        );
    }

    #[test]
    fn test_plain_describe() {
        let args = ReleaseWorkflowArgs {
            describe: true,
            plain: true,
            ..Default::default()
        };
        let out = release_report(&args, &status(released_repo()), &Reporter::new("fw-release"))
            .unwrap();
        assert_eq!(out, vec!["1.0.0+1.2222222.clean"]);
    }

    #[test]
    fn test_changelog_summary() {
        let args = ReleaseWorkflowArgs {
            changelog: Some(Vec::new()),
            ..Default::default()
        };
        let out = release_report(&args, &status(released_repo()), &Reporter::new("fw-release"))
            .unwrap();
        assert_eq!(out[0], "fix:\n - [net] reconnect (22222222)");
        assert_eq!(
            out[1],
            "fw-release: 0 feat commit(s), 1 fix commit(s) since last release"
        );
    }

    #[test]
    fn test_version_file_falls_back_to_latest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("version.txt");
        let mut repo = MockRepository::new();
        repo.add_commit("1111111111", "feat: initial");
        repo.add_tag("v2.1.0");
        let args = ReleaseWorkflowArgs {
            version_file: Some(path.clone()),
            plain: true,
            ..Default::default()
        };
        release_report(&args, &status(repo), &Reporter::new("fw-release")).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "2.1.0\n");
    }
}
