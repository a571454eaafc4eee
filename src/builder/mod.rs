//! Firmware build orchestration.
//!
//! The toolchain components are cloned and built once into a work
//! directory ([Workspace]); the firmware build then configures a board from
//! the project sources and runs the port's build command. All external
//! programs are started through a [CommandRunner].

pub mod firmware;
pub mod fsutil;
pub mod runner;
pub mod toolchain;
pub mod workspace;

pub use firmware::FirmwareBuild;
pub use runner::{CommandRunner, CommandSpec, RunOutcome, SystemRunner};
pub use toolchain::Toolchain;
pub use workspace::Workspace;
