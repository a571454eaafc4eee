use std::fs;
use std::path::{Path, PathBuf};

use crate::builder::fsutil::remove_tree;
use crate::error::Result;

const FIRMWARE_STEP: &str = "firmware-build";

/// The builder's work directory: toolchain clones, step markers and logs.
///
/// A marker `<component>-<step>.done` records a completed step; its output
/// goes to `<component>-<step>.log`.
#[derive(Debug, Clone, PartialEq)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Workspace { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the work directory if needed.
    pub fn ensure(&self) -> Result<()> {
        fs::create_dir_all(&self.root)?;
        Ok(())
    }

    pub fn component_dir(&self, component: &str) -> PathBuf {
        self.root.join(component)
    }

    pub fn marker(&self, component: &str, step: &str) -> PathBuf {
        self.root.join(format!("{}-{}.done", component, step))
    }

    pub fn step_log(&self, component: &str, step: &str) -> PathBuf {
        self.root.join(format!("{}-{}.log", component, step))
    }

    pub fn is_done(&self, component: &str, step: &str) -> bool {
        self.marker(component, step).is_file()
    }

    pub fn mark_done(&self, component: &str, step: &str) -> Result<()> {
        fs::write(self.marker(component, step), "")?;
        Ok(())
    }

    /// Remove the clone of `component` and the markers of `steps`.
    pub fn reset_component(&self, component: &str, steps: &[&str]) -> Result<()> {
        let dir = self.component_dir(component);
        if dir.exists() {
            log::info!("removing {}", dir.display());
            remove_tree(&dir)?;
        }
        for step in steps {
            let marker = self.marker(component, step);
            if marker.exists() {
                fs::remove_file(marker)?;
            }
        }
        Ok(())
    }

    pub fn firmware_marker(&self) -> PathBuf {
        self.root.join(format!("{}.done", FIRMWARE_STEP))
    }

    pub fn firmware_log(&self) -> PathBuf {
        self.root.join(format!("{}.log", FIRMWARE_STEP))
    }

    /// Version recorded by the last successful firmware build.
    pub fn firmware_version(&self) -> Option<String> {
        fs::read_to_string(self.firmware_marker())
            .ok()
            .map(|s| s.trim().to_string())
    }

    pub fn set_firmware_version(&self, version: &str) -> Result<()> {
        fs::write(self.firmware_marker(), version)?;
        Ok(())
    }

    pub fn clear_firmware_version(&self) -> Result<()> {
        let marker = self.firmware_marker();
        if marker.exists() {
            fs::remove_file(marker)?;
        }
        Ok(())
    }
}
