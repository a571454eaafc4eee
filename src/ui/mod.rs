//! User interface module - interaction (prompts) and formatting.
//!
//! Separates concerns:
//! - `formatter` - Pure formatting functions
//! - This module - Printing, colouring and user input handling

use std::io::{self, Write};
use std::path::Path;

use anyhow::Result;
use console::style;

pub mod formatter;

pub use formatter::{
    format_error, format_status, parse_confirmation, spinner_done, spinner_frame, Spinner,
};

/// Prints status lines prefixed with the name of the running tool.
#[derive(Debug, Clone, Copy)]
pub struct Reporter {
    tool: &'static str,
}

impl Reporter {
    pub fn new(tool: &'static str) -> Self {
        Reporter { tool }
    }

    pub fn tool(&self) -> &'static str {
        self.tool
    }

    /// Print `tool: stage: message`.
    pub fn status(&self, stage: &str, message: &str) {
        println!("{}", format_status(self.tool, stage, message));
    }

    /// Rewrite the current line in place, used for spinner frames.
    pub fn status_inline(&self, stage: &str, message: &str) {
        print!("{}", spinner_frame(&format_status(self.tool, stage, message)));
        let _ = io::stdout().flush();
    }

    /// Replace the current spinner frame with a final status line.
    pub fn status_done(&self, stage: &str, message: &str) {
        print!("{}", spinner_done(&format_status(self.tool, stage, message)));
        let _ = io::stdout().flush();
    }

    /// Print an error line to stderr in red.
    pub fn error(&self, stage: &str, message: &str, log: Option<&Path>) {
        eprintln!(
            "{}",
            style(format_error(self.tool, stage, message, log)).red()
        );
    }
}

/// Asks whether an existing file may be overwritten.
///
/// Default is Y; end of input (e.g. Ctrl-D or a closed pipe) declines.
pub fn confirm_overwrite(reporter: &Reporter, path: &Path) -> Result<bool> {
    print!(
        "{}",
        format_status(
            reporter.tool(),
            "export",
            &format!("'{}' exists. overwrite? (Y/n): ", path.display())
        )
    );
    io::stdout().flush()?;

    let mut input = String::new();
    let read = io::stdin().read_line(&mut input)?;
    if read == 0 {
        println!();
        return Ok(false);
    }

    Ok(parse_confirmation(&input))
}
