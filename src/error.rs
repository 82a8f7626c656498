// Copyright (c) 2024-2025 Jesse Morgan / Morgan Forge
// SPDX-License-Identifier: MIT

//! Error types and the single top-level failure handler.
//!
//! Every failure in this crate is fatal for the input session: a malformed rule
//! source, a terminal that stops answering, a completion that no longer fits on
//! the line, or an explicit Ctrl+C. Library code propagates them as [`Error`];
//! [`exit_on_error`] is the one place that turns them into a diagnostic on
//! standard error and a process exit code.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Exit codes following sysexits.h conventions.
pub mod exit_codes {
    /// Internal software error - a completion overflowed the line budget
    pub const SOFTWARE: i32 = 70;
    /// Data error - malformed rule source
    pub const DATA_ERR: i32 = 65;
    /// Input file missing or unreadable
    pub const NO_INPUT: i32 = 66;
    /// I/O error - terminal driver failure
    pub const IO_ERR: i32 = 74;
    /// Terminated by Ctrl+C (128 + SIGINT)
    pub const INTERRUPTED: i32 = 130;
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can end an input session abnormally.
#[derive(Debug, Error)]
pub enum Error {
    /// The rule source is structurally invalid.
    #[error(transparent)]
    ConfigFormat(#[from] ConfigFormatError),

    /// The rule source could not be read at all.
    #[error("failed to read rule source {}: {source}", .path.display())]
    RuleSource {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A terminal driver operation failed (raw mode, cursor query, write).
    #[error("terminal I/O failed: {0}")]
    Io(#[from] io::Error),

    /// Accepting a completion would push the line past the render width.
    #[error("completed line needs {needed} columns but the terminal budget is {budget}")]
    Overflow { needed: usize, budget: usize },

    /// The user pressed Ctrl+C.
    #[error("interrupted")]
    Interrupted,
}

/// A structural problem in the rule source, tied to its 1-based line number.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {kind}")]
pub struct ConfigFormatError {
    pub line: usize,
    pub kind: ConfigErrorKind,
}

impl ConfigFormatError {
    pub fn new(line: usize, kind: ConfigErrorKind) -> Self {
        Self { line, kind }
    }
}

/// What exactly is wrong with a rule source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigErrorKind {
    /// A tab character appears on the line.
    TabCharacter,
    /// Indentation is not a multiple of the inferred tab size.
    IndentMismatch { spaces: usize, tab_size: usize },
    /// The line is nested under a depth that has no parent token.
    Orphan { depth: usize },
    /// The token itself contains a space.
    SpaceInToken,
    /// The source has no tokens at all.
    EmptySource,
}

impl fmt::Display for ConfigErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigErrorKind::TabCharacter => {
                write!(f, "tab character detected, use a sequence of spaces")
            }
            ConfigErrorKind::IndentMismatch { spaces, tab_size } => write!(
                f,
                "indentation of {} spaces is not a multiple of the tab size {}",
                spaces, tab_size
            ),
            ConfigErrorKind::Orphan { depth } => {
                write!(f, "token at depth {} does not belong to any token", depth)
            }
            ConfigErrorKind::SpaceInToken => write!(f, "token must not contain spaces"),
            ConfigErrorKind::EmptySource => write!(f, "rule source contains no tokens"),
        }
    }
}

impl Error {
    /// Process exit code for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::ConfigFormat(_) => exit_codes::DATA_ERR,
            Error::RuleSource { .. } => exit_codes::NO_INPUT,
            Error::Io(_) => exit_codes::IO_ERR,
            Error::Overflow { .. } => exit_codes::SOFTWARE,
            Error::Interrupted => exit_codes::INTERRUPTED,
        }
    }

    /// Human-readable diagnostic for standard error, or `None` when the
    /// failure should terminate silently (Ctrl+C).
    pub fn diagnostic(&self) -> Option<String> {
        let builder = match self {
            Error::Interrupted => return None,
            Error::ConfigFormat(err) => {
                let builder = ErrorBuilder::new(format!("Malformed rule source at {}", err));
                match err.kind {
                    ConfigErrorKind::TabCharacter => builder
                        .cause("Editor inserted a literal tab")
                        .fix("Re-indent the line with spaces only"),
                    ConfigErrorKind::IndentMismatch { tab_size, .. } => builder
                        .cause(format!(
                            "The first indented line set the tab size to {} spaces",
                            tab_size
                        ))
                        .fix(format!("Indent every line by a multiple of {} spaces", tab_size)),
                    ConfigErrorKind::Orphan { .. } => builder
                        .cause("The line is indented deeper than its previous sibling allows")
                        .fix("Indent children exactly one level below their parent"),
                    ConfigErrorKind::SpaceInToken => builder
                        .cause("Each line holds exactly one word")
                        .fix("Split multi-word rules into nested lines"),
                    ConfigErrorKind::EmptySource => {
                        builder.fix("Add at least one top-level token")
                    }
                }
            }
            Error::RuleSource { path, source } => {
                ErrorBuilder::new(format!("Can't open rule source {}", path.display()))
                    .cause(source.to_string())
                    .fix("Check the path passed to --rules")
            }
            Error::Io(err) => ErrorBuilder::new("Terminal I/O failed")
                .cause(err.to_string())
                .cause("Input is not attached to an interactive terminal")
                .fix("Run the program directly from a terminal, not through a pipe"),
            Error::Overflow { needed, budget } => {
                ErrorBuilder::new("Input string longer than terminal width")
                    .cause(format!("{} columns needed, {} available", needed, budget))
                    .fix("Widen the terminal window")
            }
        };
        Some(builder.build())
    }
}

/// Formats an error message with title, causes and fixes.
pub fn format_error(title: &str, causes: &[&str], fixes: &[&str]) -> String {
    let mut output = String::new();

    output.push_str(&format!("[✗] {}\n", title));

    if !causes.is_empty() {
        output.push_str("\nPossible causes:\n");
        for cause in causes {
            output.push_str(&format!("  - {}\n", cause));
        }
    }

    if !fixes.is_empty() {
        output.push_str("\nTry these fixes:\n");
        for (i, fix) in fixes.iter().enumerate() {
            output.push_str(&format!("  {}. {}\n", i + 1, fix));
        }
    }

    output
}

/// Builder for constructing formatted error messages.
#[derive(Debug, Clone)]
pub struct ErrorBuilder {
    title: String,
    causes: Vec<String>,
    fixes: Vec<String>,
}

impl ErrorBuilder {
    /// Create a new error builder with the given title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            causes: Vec::new(),
            fixes: Vec::new(),
        }
    }

    /// Add a possible cause.
    pub fn cause(mut self, cause: impl Into<String>) -> Self {
        self.causes.push(cause.into());
        self
    }

    /// Add a suggested fix.
    pub fn fix(mut self, fix: impl Into<String>) -> Self {
        self.fixes.push(fix.into());
        self
    }

    /// Build the formatted error message.
    pub fn build(self) -> String {
        let causes: Vec<&str> = self.causes.iter().map(|s| s.as_str()).collect();
        let fixes: Vec<&str> = self.fixes.iter().map(|s| s.as_str()).collect();
        format_error(&self.title, &causes, &fixes)
    }
}

/// Report `err` on standard error and terminate the process.
///
/// Must only be called once every terminal guard has been dropped, so the
/// user's shell gets its cooked mode back before the process goes away.
pub fn exit_on_error(err: Error) -> ! {
    tracing::debug!(error = %err, code = err.exit_code(), "input session aborted");
    if let Some(diagnostic) = err.diagnostic() {
        eprintln!("\n{}", diagnostic);
    }
    std::process::exit(err.exit_code())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_error() {
        let error = format_error("Test Error", &["Cause 1", "Cause 2"], &["Fix 1", "Fix 2"]);

        assert!(error.contains("[✗] Test Error"));
        assert!(error.contains("Possible causes:"));
        assert!(error.contains("  - Cause 1"));
        assert!(error.contains("  - Cause 2"));
        assert!(error.contains("Try these fixes:"));
        assert!(error.contains("  1. Fix 1"));
        assert!(error.contains("  2. Fix 2"));
    }

    #[test]
    fn test_empty_causes_and_fixes() {
        let error = format_error("Empty test", &[], &[]);
        assert!(error.contains("[✗] Empty test"));
        assert!(!error.contains("Possible causes:"));
        assert!(!error.contains("Try these fixes:"));
    }

    #[test]
    fn test_config_error_names_line() {
        let err = Error::from(ConfigFormatError::new(3, ConfigErrorKind::TabCharacter));
        assert_eq!(err.exit_code(), exit_codes::DATA_ERR);
        assert_eq!(
            err.to_string(),
            "line 3: tab character detected, use a sequence of spaces"
        );

        let diagnostic = err.diagnostic().unwrap();
        assert!(diagnostic.contains("line 3"));
        assert!(diagnostic.contains("spaces only"));
    }

    #[test]
    fn test_indent_mismatch_diagnostic_mentions_tab_size() {
        let err = Error::from(ConfigFormatError::new(
            7,
            ConfigErrorKind::IndentMismatch { spaces: 6, tab_size: 4 },
        ));
        let diagnostic = err.diagnostic().unwrap();
        assert!(diagnostic.contains("line 7"));
        assert!(diagnostic.contains("multiple of 4 spaces"));
    }

    #[test]
    fn test_interrupt_is_silent() {
        let err = Error::Interrupted;
        assert!(err.diagnostic().is_none());
        assert_eq!(err.exit_code(), exit_codes::INTERRUPTED);
    }

    #[test]
    fn test_overflow_and_io_codes() {
        let overflow = Error::Overflow { needed: 90, budget: 80 };
        assert_eq!(overflow.exit_code(), exit_codes::SOFTWARE);
        assert!(overflow.diagnostic().unwrap().contains("90 columns needed"));

        let io = Error::from(io::Error::new(io::ErrorKind::BrokenPipe, "gone"));
        assert_eq!(io.exit_code(), exit_codes::IO_ERR);
    }
}
