use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::builder::{CommandRunner, FirmwareBuild, SystemRunner, Toolchain, Workspace};
use crate::config::{load_config, BuilderConfig};
use crate::error::BuildToolsError;
use crate::git::{GitCli, Repository};
use crate::release::ReleaseStatus;
use crate::ui::{confirm_overwrite, Reporter};

/// Arguments for the firmware builder workflow
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BuilderWorkflowArgs {
    pub config_path: Option<PathBuf>,

    /// Firmware project directory
    pub project_dir: PathBuf,

    /// Overrides `builder.work_dir`
    pub work_dir: Option<PathBuf>,

    /// Bootstrap the toolchain
    pub init: bool,

    pub build: bool,

    /// Serial port to flash
    pub upload: Option<String>,

    /// Skip erasing the flash before writing
    pub no_erase: bool,

    /// Flash this image instead of the built firmware
    pub file: Option<PathBuf>,

    /// Print the version of the last firmware build
    pub firmware_version: bool,

    /// Export the built firmware into this directory
    pub output: Option<PathBuf>,

    /// Overwrite an exported file without asking
    pub yes: bool,

    /// Toolchain components to rebuild from scratch
    pub rebuild: Vec<String>,

    pub rebuild_toolchain: bool,
}

impl BuilderWorkflowArgs {
    pub fn has_action(&self) -> bool {
        self.init
            || self.build
            || self.upload.is_some()
            || self.firmware_version
            || self.output.is_some()
            || !self.rebuild.is_empty()
            || self.rebuild_toolchain
    }
}

/// A failed builder action, tagged with the stage it belongs to.
#[derive(Debug)]
pub struct StageFailure {
    pub stage: &'static str,
    pub error: anyhow::Error,
}

impl StageFailure {
    /// Log file the user should inspect, if the failure produced one
    pub fn log_file(&self) -> Option<&Path> {
        self.error
            .downcast_ref::<BuildToolsError>()
            .and_then(|e| e.log_file())
            .map(PathBuf::as_path)
    }
}

impl fmt::Display for StageFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#}", self.error)
    }
}

impl std::error::Error for StageFailure {}

trait InStage<T> {
    fn in_stage(self, stage: &'static str) -> Result<T>;
}

impl<T, E: Into<anyhow::Error>> InStage<T> for std::result::Result<T, E> {
    fn in_stage(self, stage: &'static str) -> Result<T> {
        self.map_err(|e| {
            StageFailure {
                stage,
                error: e.into(),
            }
            .into()
        })
    }
}

/// Run the builder actions against the real toolchain and git.
pub fn run_builder_workflow(args: &BuilderWorkflowArgs, reporter: &Reporter) -> Result<()> {
    let config = load_config(args.config_path.as_deref(), &args.project_dir)
        .context("cannot load configuration")
        .in_stage("config")?;

    let git = GitCli::new(&args.project_dir);
    let git_version = git.ensure_available().in_stage("git")?;
    log::debug!("using {}", git_version);

    let work_dir = match &args.work_dir {
        Some(dir) => dir.clone(),
        None => config.builder.resolve_work_dir().in_stage("config")?,
    };
    let workspace = Workspace::new(work_dir);
    let runner = SystemRunner::new(*reporter);
    let release = ReleaseStatus::new(git, config.release);

    execute_builder(args, &config.builder, &workspace, &runner, &release, reporter)
}

/// Perform the requested actions in order: init, firmware version,
/// rebuilds, build, upload, export.
///
/// Errors are [`StageFailure`]s naming the action that failed.
pub fn execute_builder<R: CommandRunner, G: Repository>(
    args: &BuilderWorkflowArgs,
    config: &BuilderConfig,
    workspace: &Workspace,
    runner: &R,
    release: &ReleaseStatus<G>,
    reporter: &Reporter,
) -> Result<()> {
    let toolchain = Toolchain::new(&config.toolchain, workspace, runner, *reporter);
    let firmware = FirmwareBuild::new(config, workspace, runner, *reporter, &args.project_dir);

    if args.init {
        bootstrap(&toolchain, reporter).in_stage("toolchain")?;
    }

    if args.firmware_version {
        let version = workspace
            .firmware_version()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                BuildToolsError::toolchain("firmware", "no existing firmware build found", None)
            })
            .in_stage("firmware version")?;
        reporter.status(
            "firmware version",
            &format!("existing firmware build version is '{}'", version),
        );
    }

    if !args.rebuild.is_empty() {
        toolchain.rebuild(&args.rebuild).in_stage("toolchain")?;
        reporter.status("toolchain", &format!("rebuilt {}", args.rebuild.join(", ")));
    }

    if args.rebuild_toolchain {
        toolchain.bootstrap(true).in_stage("toolchain")?;
        reporter.status("toolchain", "rebuilt");
    }

    if args.build {
        bootstrap(&toolchain, reporter).in_stage("toolchain")?;
        let version = firmware.run(release).in_stage("build")?;
        reporter.status("build", &format!("firmware {} built", version));
    }

    if let Some(port) = &args.upload {
        let image = firmware
            .flash(port, args.file.as_deref(), !args.no_erase)
            .in_stage("upload")?;
        reporter.status("upload", &format!("'{}' flashed to {}", image.display(), port));
    }

    if let Some(dir) = &args.output {
        let exported = firmware
            .export(dir, |path| {
                args.yes || confirm_overwrite(reporter, path).unwrap_or(false)
            })
            .in_stage("export")?;
        match exported {
            Some(path) => reporter.status("export", &format!("'{}' written", path.display())),
            None => reporter.status("export", "skipped"),
        }
    }

    Ok(())
}

fn bootstrap<R: CommandRunner>(toolchain: &Toolchain<'_, R>, reporter: &Reporter) -> Result<()> {
    if toolchain.is_ready() {
        log::debug!("toolchain already bootstrapped");
        return Ok(());
    }
    reporter.status("toolchain", "bootstrapping (this may take a while) ...");
    toolchain.bootstrap(false)?;
    reporter.status("toolchain", "ready");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_action() {
        assert!(!BuilderWorkflowArgs::default().has_action());
        let args = BuilderWorkflowArgs {
            rebuild: vec!["micropython".to_string()],
            ..Default::default()
        };
        assert!(args.has_action());
        let args = BuilderWorkflowArgs {
            no_erase: true,
            yes: true,
            ..Default::default()
        };
        assert!(!args.has_action());
    }
}
