//! External command execution.
//!
//! Everything the builder runs (git, make, the flashing tool) goes through
//! [CommandRunner], so the orchestration can be tested with a recording
//! runner instead of real toolchains.

use std::env;
use std::ffi::OsString;
use std::fmt;
use std::fs::File;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;

use crate::error::{BuildToolsError, Result};
use crate::ui::{Reporter, Spinner};

const POLL_INTERVAL: Duration = Duration::from_millis(120);

/// A command line to run in a directory
#[derive(Debug, Clone, PartialEq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
    /// Directories put in front of `PATH`
    pub path_prepend: Vec<PathBuf>,
    /// Progress text shown while the command runs with a log file
    pub label: Option<(String, String)>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>, cwd: impl Into<PathBuf>) -> Self {
        CommandSpec {
            program: program.into(),
            args: Vec::new(),
            cwd: cwd.into(),
            path_prepend: Vec::new(),
            label: None,
        }
    }

    /// Build from a configured argv (`["make", "BOARD=X"]`).
    pub fn from_argv(argv: &[String], cwd: impl Into<PathBuf>) -> Result<Self> {
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| BuildToolsError::config("empty command"))?;
        Ok(CommandSpec::new(program.clone(), cwd).args(args.iter().cloned()))
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn path_prepend(mut self, dirs: Vec<PathBuf>) -> Self {
        self.path_prepend = dirs;
        self
    }

    /// Show `tool: stage: message [-*-]` while the command runs.
    pub fn label(mut self, stage: impl Into<String>, message: impl Into<String>) -> Self {
        self.label = Some((stage.into(), message.into()));
        self
    }

    /// `PATH` value with the prepended directories, if any.
    pub fn search_path(&self) -> Result<Option<OsString>> {
        if self.path_prepend.is_empty() {
            return Ok(None);
        }
        let current = env::var_os("PATH").unwrap_or_default();
        let dirs = self
            .path_prepend
            .iter()
            .cloned()
            .chain(env::split_paths(&current));
        env::join_paths(dirs)
            .map(Some)
            .map_err(|e| BuildToolsError::config(format!("invalid PATH entry: {}", e)))
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Exit status of a finished command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOutcome {
    /// Exit code, `None` when killed by a signal
    pub code: Option<i32>,
}

impl RunOutcome {
    pub fn success() -> Self {
        RunOutcome { code: Some(0) }
    }

    pub fn failure(code: i32) -> Self {
        RunOutcome { code: Some(code) }
    }

    pub fn is_success(&self) -> bool {
        self.code == Some(0)
    }

    /// Turn a non-zero exit into a `Subprocess` error.
    pub fn check(self, spec: &CommandSpec) -> Result<()> {
        if self.is_success() {
            Ok(())
        } else {
            Err(BuildToolsError::Subprocess {
                program: spec.program.clone(),
                code: self.code.unwrap_or(-1),
            })
        }
    }
}

/// Runs external commands
pub trait CommandRunner {
    /// Run `spec` to completion.
    ///
    /// With `log`, stdout and stderr are written to that file; otherwise
    /// they are inherited from the current process.
    ///
    /// # Returns
    /// * `Ok(outcome)` - The command ran, successfully or not
    /// * `Err(ToolNotFound)` - If the program does not exist
    fn run(&self, spec: &CommandSpec, log: Option<&Path>) -> Result<RunOutcome>;
}

/// [CommandRunner] spawning real processes
#[derive(Debug, Clone)]
pub struct SystemRunner {
    reporter: Reporter,
}

impl SystemRunner {
    pub fn new(reporter: Reporter) -> Self {
        SystemRunner { reporter }
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, spec: &CommandSpec, log: Option<&Path>) -> Result<RunOutcome> {
        log::debug!("running {} in {}", spec, spec.cwd.display());

        let mut command = Command::new(&spec.program);
        command.args(&spec.args).current_dir(&spec.cwd);
        if let Some(path) = spec.search_path()? {
            command.env("PATH", path);
        }

        if let Some(log_path) = log {
            let stdout = File::create(log_path)?;
            let stderr = stdout.try_clone()?;
            command.stdout(Stdio::from(stdout)).stderr(Stdio::from(stderr));
        }

        let mut child = command.spawn().map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                BuildToolsError::ToolNotFound(spec.program.clone())
            } else {
                BuildToolsError::Io(e)
            }
        })?;

        let status = match (&spec.label, log) {
            (Some((stage, message)), Some(_)) => {
                let mut spinner = Spinner::new();
                loop {
                    if let Some(status) = child.try_wait()? {
                        let line = format!("{} {}", message, spinner.clear());
                        self.reporter.status_done(stage, &line);
                        break status;
                    }
                    let frame = format!("{} {}", message, spinner.tick());
                    self.reporter.status_inline(stage, &frame);
                    thread::sleep(POLL_INTERVAL);
                }
            }
            _ => child.wait()?,
        };

        log::debug!("{} finished with {}", spec.program, status);
        Ok(RunOutcome {
            code: status.code(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_argv() {
        let argv = vec!["make".to_string(), "BOARD=CUSTOM".to_string()];
        let spec = CommandSpec::from_argv(&argv, "/tmp").unwrap();
        assert_eq!(spec.program, "make");
        assert_eq!(spec.args, vec!["BOARD=CUSTOM"]);
        assert_eq!(spec.to_string(), "make BOARD=CUSTOM");
        assert!(CommandSpec::from_argv(&[], "/tmp").is_err());
    }

    #[test]
    fn test_search_path_prepends() {
        let spec = CommandSpec::new("make", "/tmp")
            .path_prepend(vec![PathBuf::from("/opt/xtensa/bin")]);
        let path = spec.search_path().unwrap().unwrap();
        let first = env::split_paths(&path).next().unwrap();
        assert_eq!(first, PathBuf::from("/opt/xtensa/bin"));
        assert_eq!(CommandSpec::new("make", "/tmp").search_path().unwrap(), None);
    }

    #[test]
    fn test_outcome_check() {
        let spec = CommandSpec::new("make", "/tmp");
        assert!(RunOutcome::success().check(&spec).is_ok());
        let err = RunOutcome::failure(2).check(&spec).unwrap_err();
        assert_eq!(err.to_string(), "'make' exited with code 2");
    }

    #[test]
    fn test_system_runner_missing_program() {
        let runner = SystemRunner::new(Reporter::new("fw-test"));
        let spec = CommandSpec::new("definitely-not-a-real-tool", std::env::temp_dir());
        assert!(matches!(
            runner.run(&spec, None),
            Err(BuildToolsError::ToolNotFound(name)) if name == "definitely-not-a-real-tool"
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_system_runner_writes_log() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("step.log");
        let runner = SystemRunner::new(Reporter::new("fw-test"));
        let spec = CommandSpec::new("sh", dir.path())
            .args(["-c", "echo built; echo oops >&2; exit 3"])
            .label("test", "running ...");
        let outcome = runner.run(&spec, Some(&log)).unwrap();
        assert_eq!(outcome.code, Some(3));
        let text = std::fs::read_to_string(&log).unwrap();
        assert!(text.contains("built"));
        assert!(text.contains("oops"));
    }
}
