pub mod analyzer;
pub mod builder;
pub mod cli;
pub mod config;
pub mod docs;
pub mod domain;
pub mod error;
pub mod git;
pub mod release;
pub mod ui;

pub use error::{BuildToolsError, Result};
