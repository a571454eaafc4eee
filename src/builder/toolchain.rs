use std::fs;
use std::path::Path;

use crate::builder::fsutil::remove_tree;
use crate::builder::runner::{CommandRunner, CommandSpec};
use crate::builder::workspace::Workspace;
use crate::config::{ToolchainComponent, ToolchainStep};
use crate::error::{BuildToolsError, Result};
use crate::ui::Reporter;

const CLONE_STEP: &str = "clone";

/// Clones and builds the toolchain components into the work directory.
///
/// Every completed step leaves a marker, so a second bootstrap with all
/// markers present runs nothing.
pub struct Toolchain<'a, R: CommandRunner> {
    components: &'a [ToolchainComponent],
    workspace: &'a Workspace,
    runner: &'a R,
    reporter: Reporter,
}

impl<'a, R: CommandRunner> Toolchain<'a, R> {
    pub fn new(
        components: &'a [ToolchainComponent],
        workspace: &'a Workspace,
        runner: &'a R,
        reporter: Reporter,
    ) -> Self {
        Toolchain {
            components,
            workspace,
            runner,
            reporter,
        }
    }

    /// Make sure every component is cloned and built.
    ///
    /// With `force`, existing clones and markers are removed first.
    pub fn bootstrap(&self, force: bool) -> Result<()> {
        self.workspace.ensure()?;
        for component in self.components {
            self.component(component, force)?;
        }
        Ok(())
    }

    /// Rebuild the named components from scratch.
    pub fn rebuild(&self, names: &[String]) -> Result<()> {
        let selected = names
            .iter()
            .map(|name| {
                self.components
                    .iter()
                    .find(|c| &c.name == name)
                    .ok_or_else(|| {
                        BuildToolsError::config(format!("unknown toolchain component '{}'", name))
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        self.workspace.ensure()?;
        for component in selected {
            self.component(component, true)?;
        }
        Ok(())
    }

    /// True when every component has all its step markers.
    pub fn is_ready(&self) -> bool {
        self.components.iter().all(|c| {
            self.workspace.component_dir(&c.name).is_dir()
                && c.steps.iter().all(|s| self.workspace.is_done(&c.name, &s.name))
        })
    }

    fn component(&self, component: &ToolchainComponent, force: bool) -> Result<()> {
        if force {
            let steps: Vec<&str> = component.steps.iter().map(|s| s.name.as_str()).collect();
            self.workspace.reset_component(&component.name, &steps)?;
        }

        if !self.workspace.component_dir(&component.name).is_dir() {
            self.clone_component(component)?;
        }

        for step in &component.steps {
            if self.workspace.is_done(&component.name, &step.name) {
                log::debug!("{}: {} already done", component.name, step.name);
                continue;
            }
            self.run_step(component, step)?;
        }
        Ok(())
    }

    fn clone_component(&self, component: &ToolchainComponent) -> Result<()> {
        let name = &component.name;
        let root = self.workspace.root();
        let dir = self.workspace.component_dir(name);
        let log = self.workspace.step_log(name, CLONE_STEP);

        let mut commands = vec![
            CommandSpec::new("git", root)
                .args(["clone", component.url.as_str(), name.as_str()])
                .label(name.as_str(), format!("cloning {} ...", component.url)),
            CommandSpec::new("git", &dir)
                .args(["checkout", component.rev.as_str()])
                .label(name.as_str(), format!("checking out {} ...", component.rev)),
        ];
        if component.submodules {
            commands.push(
                CommandSpec::new("git", &dir)
                    .args(["submodule", "update", "--init", "--recursive"])
                    .label(name.as_str(), "updating submodules ..."),
            );
        }

        for spec in &commands {
            let outcome = self.runner.run(spec, Some(&log))?;
            if !outcome.is_success() {
                // a partial clone would be mistaken for a finished one
                if dir.exists() {
                    remove_tree(&dir)?;
                }
                return Err(BuildToolsError::toolchain(
                    name.as_str(),
                    format!("'{}' failed", spec),
                    Some(log),
                ));
            }
        }
        log::info!("{}: cloned at {}", name, component.rev);
        Ok(())
    }

    fn run_step(&self, component: &ToolchainComponent, step: &ToolchainStep) -> Result<()> {
        let name = &component.name;
        let clone = self.workspace.component_dir(name);
        let log = self.workspace.step_log(name, &step.name);

        let spec = CommandSpec::from_argv(&step.command, clone.join(&step.dir))?
            .path_prepend(
                step.path_prepend
                    .iter()
                    .map(|p| self.workspace.root().join(p))
                    .collect(),
            )
            .label(name.as_str(), format!("building {} ...", step.name));

        let outcome = self.runner.run(&spec, Some(&log))?;
        let failure = |message: String| {
            BuildToolsError::toolchain(name.as_str(), message, Some(log.clone()))
        };

        if !outcome.is_success() {
            return Err(failure(format!("{} failed", step.name)));
        }
        if let Some(expected) = &step.success.log_contains {
            if !log_contains(&log, expected) {
                return Err(failure(format!("{} did not complete", step.name)));
            }
        }
        if let Some(created) = &step.success.creates {
            if !clone.join(created).exists() {
                return Err(failure(format!(
                    "{} did not create '{}'",
                    step.name,
                    created.display()
                )));
            }
        }

        self.workspace.mark_done(name, &step.name)?;
        self.reporter
            .status(name, &format!("{} done", step.name));
        log::info!("{}: {} done", name, step.name);
        Ok(())
    }
}

fn log_contains(log: &Path, expected: &str) -> bool {
    fs::read(log)
        .map(|bytes| String::from_utf8_lossy(&bytes).contains(expected))
        .unwrap_or(false)
}
