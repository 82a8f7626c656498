// Copyright (c) 2024-2025 Jesse Morgan / Morgan Forge
// SPDX-License-Identifier: MIT

//! Interactive input with rule-driven completion.
//!
//! This module provides:
//! - A raw-mode line editor with inline completion hints
//! - Key decoding for crossterm events and raw byte streams
//! - The terminal driver seam, with a real and a scripted implementation
//!
//! ## Keys
//!
//! - **Tab**: accept the highlighted completion
//! - **Up/Down**: cycle through completions
//! - **Left/Right**: move the cursor
//! - **Backspace/Delete**: erase left of / under the cursor
//! - **Enter**: submit the line
//! - **Ctrl+C**: abort
//!
//! ## Example
//!
//! ```no_run
//! use cli_autocomplete::cli::{CrosstermTerminal, EditorOptions, LineEditor};
//! use cli_autocomplete::rules::RuleTree;
//!
//! let tree = RuleTree::from_file("rules.txt")?;
//! let options = EditorOptions::new().with_title("git").with_markers("[{<");
//! let editor = LineEditor::new(&tree, options);
//!
//! let line = editor.read_line(&mut CrosstermTerminal::new())?;
//! println!("\n{}", line);
//! # Ok::<(), cli_autocomplete::Error>(())
//! ```

pub mod editor;
pub mod keys;
pub mod terminal;

pub use editor::{EditBuffer, EditSession, EditorOptions, LineEditor, Step, FUZZY_HINT};
pub use keys::Key;
pub use terminal::{CrosstermTerminal, RawModeGuard, ScriptedTerminal, Terminal};
