use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use semver::Version;

use crate::builder::fsutil::{copy_tree, remove_tree};
use crate::builder::runner::{CommandRunner, CommandSpec};
use crate::builder::workspace::Workspace;
use crate::config::BuilderConfig;
use crate::domain::HeadVersion;
use crate::error::{BuildToolsError, Result};
use crate::git::Repository;
use crate::release::version_file::write_version_file;
use crate::release::ReleaseStatus;
use crate::ui::Reporter;

const FIRMWARE: &str = "firmware";

fn not_found(path: &Path) -> BuildToolsError {
    BuildToolsError::Io(io::Error::new(
        io::ErrorKind::NotFound,
        format!("'{}' not found", path.display()),
    ))
}

fn expand(template: &str, placeholders: &[(&str, &str)]) -> String {
    placeholders
        .iter()
        .fold(template.to_string(), |s, (key, value)| s.replace(key, value))
}

/// Board configuration, firmware build, export and flashing for one project.
pub struct FirmwareBuild<'a, R: CommandRunner> {
    config: &'a BuilderConfig,
    workspace: &'a Workspace,
    runner: &'a R,
    reporter: Reporter,
    project_dir: PathBuf,
}

impl<'a, R: CommandRunner> FirmwareBuild<'a, R> {
    pub fn new(
        config: &'a BuilderConfig,
        workspace: &'a Workspace,
        runner: &'a R,
        reporter: Reporter,
        project_dir: impl Into<PathBuf>,
    ) -> Self {
        FirmwareBuild {
            config,
            workspace,
            runner,
            reporter,
            project_dir: project_dir.into(),
        }
    }

    fn port_dir(&self) -> PathBuf {
        self.workspace.root().join(&self.config.firmware.port_dir)
    }

    /// `<port>/boards/<board>`
    pub fn board_dir(&self) -> PathBuf {
        self.port_dir()
            .join("boards")
            .join(&self.config.firmware.board)
    }

    pub fn build_dir(&self) -> PathBuf {
        let firmware = &self.config.firmware;
        self.port_dir()
            .join(expand(&firmware.build_dir, &[("{board}", firmware.board.as_str())]))
    }

    pub fn binary(&self) -> PathBuf {
        self.build_dir().join(&self.config.firmware.binary)
    }

    /// Build the firmware for the project at the version `release` reports.
    ///
    /// # Returns
    /// * `Ok(version)` - The version baked into the firmware
    /// * `Err` - If the project, board setup or build command fails
    pub fn run<G: Repository>(&self, release: &ReleaseStatus<G>) -> Result<HeadVersion> {
        let firmware = &self.config.firmware;
        let marker = self.project_dir.join(&firmware.project_marker);
        if !marker.exists() {
            return Err(BuildToolsError::config(format!(
                "'{}' is not a firmware project ('{}' missing)",
                self.project_dir.display(),
                firmware.project_marker.display()
            )));
        }

        let version = release.head()?;
        if version.is_release() {
            self.reporter
                .status("build", &format!("release build {}", version));
        } else {
            self.reporter
                .status("build", &format!("development build {}", version));
        }

        self.workspace.clear_firmware_version()?;
        self.configure_board(&version, &release.config().version_macro)?;

        let build_dir = self.build_dir();
        if build_dir.exists() {
            log::debug!("removing {}", build_dir.display());
            remove_tree(&build_dir)?;
        }

        let argv: Vec<String> = firmware
            .command
            .iter()
            .map(|arg| expand(arg, &[("{board}", firmware.board.as_str())]))
            .collect();
        let spec = CommandSpec::from_argv(&argv, self.port_dir())?
            .path_prepend(
                firmware
                    .path_prepend
                    .iter()
                    .map(|p| self.workspace.root().join(p))
                    .collect(),
            )
            .label("build", "building firmware ...");

        let log = self.workspace.firmware_log();
        let outcome = self.runner.run(&spec, Some(&log))?;
        if !outcome.is_success() {
            return Err(BuildToolsError::toolchain(
                FIRMWARE,
                "build failed",
                Some(log),
            ));
        }

        let binary = self.binary();
        if !binary.is_file() {
            return Err(BuildToolsError::toolchain(
                FIRMWARE,
                format!("build did not produce '{}'", binary.display()),
                Some(log),
            ));
        }

        self.workspace.set_firmware_version(&version.to_string())?;
        log::info!("firmware {} built at {}", version, binary.display());
        Ok(version)
    }

    fn configure_board(&self, version: &HeadVersion, version_macro: &str) -> Result<()> {
        let firmware = &self.config.firmware;
        let port = self.port_dir();
        let board = self.board_dir();
        let modules = board.join("modules");

        if board.exists() {
            remove_tree(&board)?;
        }

        let base = port.join("boards").join(&firmware.base_board);
        if !base.is_dir() {
            return Err(not_found(&base));
        }
        copy_tree(&base, &board)?;

        if let Some(frozen) = &firmware.frozen_modules_dir {
            let frozen = port.join(frozen);
            if frozen.is_dir() {
                copy_tree(&frozen, &modules)?;
            }
        }

        let source = self.project_dir.join(&firmware.source_dir);
        if !source.is_dir() {
            return Err(not_found(&source));
        }
        copy_tree(&source, &modules)?;

        if let Some(manifest) = &firmware.manifest {
            let manifest = self.project_dir.join(manifest);
            let name = manifest.file_name().ok_or_else(|| {
                BuildToolsError::config(format!("invalid manifest '{}'", manifest.display()))
            })?;
            if !manifest.is_file() {
                return Err(not_found(&manifest));
            }
            fs::copy(&manifest, board.join(name))?;
        }

        for entry in &firmware.remove {
            let path = board.join(entry);
            if path.is_dir() {
                remove_tree(&path)?;
            } else if path.exists() {
                fs::remove_file(&path)?;
            }
        }

        write_version_file(
            &board.join(&firmware.version_file),
            version.as_version(),
            version_macro,
        )?;
        log::info!("board {} configured", firmware.board);
        Ok(())
    }

    /// Version and path of the last successful build, if its binary is
    /// still there.
    pub fn built_firmware(&self) -> Option<(Version, PathBuf)> {
        let version = Version::parse(&self.workspace.firmware_version()?).ok()?;
        let binary = self.binary();
        binary.is_file().then_some((version, binary))
    }

    fn require_built(&self) -> Result<(Version, PathBuf)> {
        self.built_firmware().ok_or_else(|| {
            BuildToolsError::toolchain(FIRMWARE, "no firmware built yet (run with --build)", None)
        })
    }

    /// Copy the built firmware to `<dir>/<firmware_name>-v<version>.bin`.
    ///
    /// `overwrite` is asked when the destination exists.
    ///
    /// # Returns
    /// * `Ok(Some(path))` - The exported file
    /// * `Ok(None)` - Overwriting was declined
    pub fn export<F>(&self, dir: &Path, overwrite: F) -> Result<Option<PathBuf>>
    where
        F: FnOnce(&Path) -> bool,
    {
        if !dir.exists() {
            return Err(not_found(dir));
        }
        if !dir.is_dir() {
            return Err(BuildToolsError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("'{}' is not a directory", dir.display()),
            )));
        }

        let (version, binary) = self.require_built()?;
        let target = dir.join(format!("{}-v{}.bin", self.config.firmware_name, version));
        if target.exists() && !overwrite(&target) {
            return Ok(None);
        }
        fs::copy(&binary, &target)?;
        log::info!("exported {}", target.display());
        Ok(Some(target))
    }

    /// Flash `file`, or the built firmware, to the device on `port`.
    pub fn flash(&self, port: &str, file: Option<&Path>, erase: bool) -> Result<PathBuf> {
        let image = match file {
            Some(file) if file.is_file() => file.to_path_buf(),
            Some(file) => return Err(not_found(file)),
            None => self.require_built()?.1,
        };
        let image_arg = image.to_string_lossy().to_string();
        let placeholders = [("{port}", port), ("{file}", image_arg.as_str())];
        let cwd = self.project_dir.clone();

        let flash = &self.config.flash;
        let mut commands = Vec::new();
        if erase {
            commands.push(("erasing flash ...", &flash.erase));
        }
        commands.push(("writing firmware ...", &flash.write));

        for (message, template) in commands {
            let argv: Vec<String> = template.iter().map(|a| expand(a, &placeholders)).collect();
            let spec = CommandSpec::from_argv(&argv, &cwd)?;
            self.reporter.status("upload", message);
            self.runner.run(&spec, None)?.check(&spec)?;
        }
        log::info!("flashed {} to {}", image.display(), port);
        Ok(image)
    }
}
