//! Pure formatting functions for UI output.
//!
//! Everything here returns plain strings so it can be tested; colouring and
//! printing happens in the parent module.

use std::path::Path;

const SPINNER_FRAMES: [&str; 8] = [
    "[-  ]", "[*- ]", "[-*-]", "[ -*]", "[  -]", "[ -*]", "[-*-]", "[*- ]",
];

/// Format a status line: `tool: stage: message`.
pub fn format_status(tool: &str, stage: &str, message: &str) -> String {
    format!("{}: {}: {}", tool, stage, message)
}

/// Format an error line, pointing at a log file when one is involved.
///
/// # Example
/// ```ignore
/// assert_eq!(
///     format_error("fw-builder", "build", "cannot build firmware.", None),
///     "fw-builder: build ERROR: cannot build firmware."
/// );
/// ```
pub fn format_error(tool: &str, stage: &str, message: &str, log: Option<&Path>) -> String {
    match log {
        Some(path) => format!(
            "{}: {} ERROR: {} (check file '{}')",
            tool,
            stage,
            message,
            path.display()
        ),
        None => format!("{}: {} ERROR: {}", tool, stage, message),
    }
}

/// Single-line progress indicator for long-running subprocesses.
#[derive(Debug, Default)]
pub struct Spinner {
    val: usize,
}

impl Spinner {
    pub fn new() -> Self {
        Spinner { val: 0 }
    }

    /// Advance one frame and return it.
    pub fn tick(&mut self) -> &'static str {
        self.val += 1;
        SPINNER_FRAMES[self.val % SPINNER_FRAMES.len()]
    }

    /// Reset and return blank padding the width of a frame.
    pub fn clear(&mut self) -> &'static str {
        self.val = 0;
        "     "
    }
}

/// An in-place spinner frame: return to the line start, no newline.
pub fn spinner_frame(line: &str) -> String {
    format!("\r{}", line)
}

/// The line that replaces the last spinner frame and ends it.
pub fn spinner_done(line: &str) -> String {
    format!("\r{}\n", line)
}

/// Interpret a Y/n answer where an empty answer means yes.
pub fn parse_confirmation(input: &str) -> bool {
    let answer = input.trim().to_uppercase();
    answer.is_empty() || answer == "Y" || answer == "YES"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spinner_lines() {
        let mut spinner = Spinner::new();
        let frame = spinner_frame(&format!("fw-builder: make: building {}", spinner.tick()));
        assert!(frame.starts_with('\r'));
        assert!(!frame.contains('\n'));

        let done = spinner_done(&format!("fw-builder: make: building {}", spinner.clear()));
        assert_eq!(done, "\rfw-builder: make: building      \n");
    }

    #[test]
    fn test_format_status() {
        assert_eq!(
            format_status("fw-release", "last release", "1.2.0"),
            "fw-release: last release: 1.2.0"
        );
    }

    #[test]
    fn test_format_error_with_log() {
        let msg = format_error(
            "fw-builder",
            "esp-open-sdk",
            "cannot build.",
            Some(Path::new("/w/esp-open-sdk-build.log")),
        );
        assert_eq!(
            msg,
            "fw-builder: esp-open-sdk ERROR: cannot build. (check file '/w/esp-open-sdk-build.log')"
        );
    }

    #[test]
    fn test_format_error_without_log() {
        assert_eq!(
            format_error("fw-gendocs", "docs", "module not found", None),
            "fw-gendocs: docs ERROR: module not found"
        );
    }

    #[test]
    fn test_spinner_cycles_and_clears() {
        let mut spinner = Spinner::new();
        assert_eq!(spinner.tick(), "[*- ]");
        for _ in 0..7 {
            spinner.tick();
        }
        assert_eq!(spinner.tick(), "[*- ]");
        assert_eq!(spinner.clear(), "     ");
        assert_eq!(spinner.tick(), "[*- ]");
    }

    #[test]
    fn test_parse_confirmation() {
        assert!(parse_confirmation(""));
        assert!(parse_confirmation("y\n"));
        assert!(parse_confirmation("Yes"));
        assert!(!parse_confirmation("n"));
        assert!(!parse_confirmation("nope"));
    }
}
