// Copyright (c) 2024-2025 Jesse Morgan / Morgan Forge
// SPDX-License-Identifier: MIT

//! cli-autocomplete - rule-driven completion for interactive prompts
//!
//! Type a command, press Tab, get the rest of the word.
//!
//! Completions come from a plain-text rule file where indentation describes
//! which words may follow which:
//!
//! ```text
//! git
//!     commit
//!     checkout
//!         [branch]
//! ```
//!
//! # Core Modules
//!
//! - [`rules`] - Rule source parsing and the rule tree
//! - [`predict`] - Exact / fuzzy completion prediction
//! - [`cli`] - Raw-mode line editor, key decoding and terminal drivers
//! - [`colors`] - ANSI color tokens for the prompt
//! - [`error`] - Error types, exit codes and the top-level failure handler
//!
//! # Quick Start
//!
//! ```no_run
//! use cli_autocomplete::{complete, EditorOptions};
//!
//! let options = EditorOptions::new().with_title("git").with_markers("[{<");
//! let line = complete("rules.txt", &options);
//! println!("\n{}", line);
//! ```

use std::path::Path;

pub mod cli;
pub mod colors;
pub mod error;
pub mod predict;
pub mod rules;

// Re-export the session surface
pub use cli::{
    CrosstermTerminal, EditBuffer, EditSession, EditorOptions, Key, LineEditor, RawModeGuard,
    ScriptedTerminal, Step, Terminal,
};

// Re-export rule and prediction types
pub use predict::{predict, Classification, OptionalMarkers, PredictionResult};
pub use rules::{ConfigLine, Dictionary, NodeId, NodeRef, RuleTree, Token};

pub use colors::{ColorScheme, ColorToken};
pub use error::{exit_on_error, ConfigErrorKind, ConfigFormatError, Error, Result};

/// Load `rule_source` and run one input session on the real terminal.
pub fn try_complete(rule_source: impl AsRef<Path>, options: &EditorOptions) -> Result<String> {
    let tree = RuleTree::from_file(rule_source)?;
    LineEditor::new(&tree, options.clone()).read_line(&mut CrosstermTerminal::new())
}

/// Load `rule_source`, read one line with completion and return it.
///
/// Any failure ends the process through [`exit_on_error`].
pub fn complete(rule_source: impl AsRef<Path>, options: &EditorOptions) -> String {
    try_complete(rule_source, options).unwrap_or_else(|err| exit_on_error(err))
}

/// [`complete`] with the default title, colors and no placeholder markers.
pub fn complete_default(rule_source: impl AsRef<Path>) -> String {
    complete(rule_source, &EditorOptions::default())
}

/// Read one line against an already loaded tree.
///
/// Use this for repeated prompts so the rule file is parsed once.
pub fn complete_with_tree(tree: &RuleTree, options: &EditorOptions) -> String {
    LineEditor::new(tree, options.clone())
        .read_line(&mut CrosstermTerminal::new())
        .unwrap_or_else(|err| exit_on_error(err))
}
