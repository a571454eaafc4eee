//! Workflows behind the command line tools.
//!
//! Each binary parses its flags with clap, converts them into a
//! `*WorkflowArgs` struct and hands off to the matching `run_*_workflow`
//! function, so the workflows can be driven without clap.

pub mod builder;
pub mod docs;
pub mod release;

pub use builder::{execute_builder, run_builder_workflow, BuilderWorkflowArgs, StageFailure};
pub use docs::{docs_options, run_docs_workflow, DocsWorkflowArgs};
pub use release::{release_report, run_release_workflow, ReleaseWorkflowArgs};
