use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use crate::error::{BuildToolsError, Result};
use crate::git::{CommitInfo, Repository};

const FIELD_SEP: char = '\x1f';
const RECORD_SEP: char = '\x1e';

/// [Repository] backed by the `git` executable.
#[derive(Debug, Clone)]
pub struct GitCli {
    program: String,
    work_dir: PathBuf,
}

impl GitCli {
    /// Creates a git runner operating in `work_dir`.
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        GitCli {
            program: "git".to_string(),
            work_dir: work_dir.into(),
        }
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Checks that git can be executed.
    ///
    /// # Returns
    /// * `Ok(version)` - Output of `git --version`
    /// * `Err(GitNotFound)` - If the executable is missing
    pub fn ensure_available(&self) -> Result<String> {
        let output = self.run(&["--version"])?;
        if !output.status.success() {
            return Err(BuildToolsError::GitNotFound);
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn run(&self, args: &[&str]) -> Result<Output> {
        log::debug!(
            "running {} {} in {}",
            self.program,
            args.join(" "),
            self.work_dir.display()
        );

        Command::new(&self.program)
            .args(args)
            .current_dir(&self.work_dir)
            .output()
            .map_err(|e| {
                if e.kind() == ErrorKind::NotFound {
                    BuildToolsError::GitNotFound
                } else {
                    BuildToolsError::Io(e)
                }
            })
    }

    /// Runs git and returns stdout, mapping failures to errors.
    fn run_checked(&self, args: &[&str]) -> Result<String> {
        let output = self.run(args)?;
        if output.status.success() {
            return Ok(String::from_utf8_lossy(&output.stdout).into_owned());
        }
        Err(classify_failure(&String::from_utf8_lossy(&output.stderr)))
    }
}

fn classify_failure(stderr: &str) -> BuildToolsError {
    let lower = stderr.to_lowercase();
    if lower.contains("not a git repository") {
        BuildToolsError::NotARepository
    } else if lower.contains("does not have any commits yet")
        || lower.contains("ambiguous argument 'head'")
        || lower.contains("needed a single revision")
    {
        BuildToolsError::EmptyRepository
    } else {
        BuildToolsError::git(stderr.trim())
    }
}

impl Repository for GitCli {
    fn describe(&self, pattern: &str) -> Result<Option<String>> {
        let output = self.run(&[
            "describe", "--tags", "--match", pattern, "--dirty", "--broken",
        ])?;

        if output.status.success() {
            let described = String::from_utf8_lossy(&output.stdout).trim().to_string();
            return Ok(Some(described));
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let lower = stderr.to_lowercase();
        if lower.contains("no names found")
            || lower.contains("no tags can describe")
            || lower.contains("cannot describe")
            || lower.contains("not a valid object name")
        {
            // no version tag yet, or nothing to describe
            return Ok(None);
        }
        Err(classify_failure(&stderr))
    }

    fn short_head(&self) -> Result<String> {
        let stdout = self.run_checked(&["rev-parse", "--short", "HEAD"])?;
        Ok(stdout.trim().to_string())
    }

    fn commit_count(&self) -> Result<u64> {
        let stdout = self.run_checked(&["rev-list", "--count", "HEAD"])?;
        stdout.trim().parse::<u64>().map_err(|_| {
            BuildToolsError::git(format!("unexpected commit count '{}'", stdout.trim()))
        })
    }

    fn is_dirty(&self) -> Result<bool> {
        let output = self.run(&["diff", "--quiet", "HEAD"])?;
        match output.status.code() {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => Err(classify_failure(&String::from_utf8_lossy(&output.stderr))),
        }
    }

    fn log(&self, from: Option<&str>, to: &str) -> Result<Vec<CommitInfo>> {
        let range = match from {
            Some(from) => format!("{}..{}", from, to),
            None => to.to_string(),
        };
        let format = format!("--format=%H{}%B{}", "%x1f", "%x1e");
        let stdout = self.run_checked(&["log", "--no-decorate", &format, &range, "--"])?;
        Ok(parse_log(&stdout))
    }

    fn tags(&self) -> Result<Vec<String>> {
        let stdout = self.run_checked(&["tag", "--list"])?;
        Ok(stdout
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect())
    }

    fn tag_date(&self, tag: &str) -> Result<Option<String>> {
        let stdout = self.run_checked(&["log", "-1", "--format=%cs", tag, "--"])?;
        let date = stdout.trim();
        Ok(if date.is_empty() {
            None
        } else {
            Some(date.to_string())
        })
    }
}

/// Parse `git log` output produced with `%H%x1f%B%x1e` records.
pub fn parse_log(output: &str) -> Vec<CommitInfo> {
    output
        .split(RECORD_SEP)
        .filter_map(|record| {
            let record = record.trim_start_matches(['\n', '\r']);
            let (hash, message) = record.split_once(FIELD_SEP)?;
            let hash = hash.trim();
            if hash.is_empty() {
                return None;
            }
            Some(CommitInfo {
                hash: hash.to_string(),
                message: message.trim_end().to_string(),
            })
        })
        .collect()
}
