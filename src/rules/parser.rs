// Copyright (c) 2024-2025 Jesse Morgan / Morgan Forge
// SPDX-License-Identifier: MIT

//! Rule source parsing.
//!
//! A rule source is plain text with one token per line. Leading spaces encode
//! nesting depth; the indentation unit is whatever the first indented line
//! uses, and every later indentation must be a whole multiple of it.
//!
//! ```text
//! git
//!     commit
//!         --amend
//!     checkout
//!         [branch]
//! ```

use indexmap::IndexMap;

use crate::error::{ConfigErrorKind, ConfigFormatError};

use super::RuleTree;

/// Parent token -> tokens that may follow it, in tree order.
///
/// The root entry uses the empty string as its key. Children of every node that
/// shares a parent token are merged under that one key.
pub type Dictionary = IndexMap<String, Vec<String>>;

/// One validated, non-blank line of a rule source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigLine {
    /// 1-based physical line number in the source.
    pub number: usize,
    /// Indentation divided by the inferred tab size.
    pub depth: usize,
    pub token: String,
}

impl ConfigLine {
    pub fn new(number: usize, depth: usize, token: impl Into<String>) -> Self {
        Self {
            number,
            depth,
            token: token.into(),
        }
    }
}

/// Validate a rule source line by line.
///
/// Blank lines are skipped but still counted, so reported line numbers match
/// what an editor shows.
pub fn parse_lines(source: &str) -> Result<Vec<ConfigLine>, ConfigFormatError> {
    let mut lines = Vec::new();
    let mut tab_size = 0usize;
    let mut line_count = 0usize;

    for (index, raw) in source.lines().enumerate() {
        let number = index + 1;
        line_count = number;
        let raw = raw.strip_suffix('\r').unwrap_or(raw);

        if raw.contains('\t') {
            return Err(ConfigFormatError::new(number, ConfigErrorKind::TabCharacter));
        }

        let content = raw.trim_end_matches(' ');
        if content.is_empty() {
            continue;
        }

        let token = content.trim_start_matches(' ');
        let spaces = content.len() - token.len();

        if spaces != 0 && tab_size == 0 {
            tab_size = spaces;
        }

        if tab_size != 0 && spaces % tab_size != 0 {
            return Err(ConfigFormatError::new(
                number,
                ConfigErrorKind::IndentMismatch { spaces, tab_size },
            ));
        }

        if token.contains(' ') {
            return Err(ConfigFormatError::new(number, ConfigErrorKind::SpaceInToken));
        }

        let depth = if tab_size == 0 { 0 } else { spaces / tab_size };
        lines.push(ConfigLine::new(number, depth, token));
    }

    if lines.is_empty() {
        return Err(ConfigFormatError::new(
            line_count.max(1),
            ConfigErrorKind::EmptySource,
        ));
    }

    tracing::debug!(tab_size, lines = lines.len(), "rule source validated");
    Ok(lines)
}

/// Parse a rule source straight into its dictionary form.
pub fn parse_dictionary(source: &str) -> Result<Dictionary, ConfigFormatError> {
    Ok(RuleTree::parse(source)?.to_dictionary())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depths_follow_first_indent() {
        let lines = parse_lines("git\n  commit\n    --amend\n  checkout\n").unwrap();
        assert_eq!(
            lines,
            vec![
                ConfigLine::new(1, 0, "git"),
                ConfigLine::new(2, 1, "commit"),
                ConfigLine::new(3, 2, "--amend"),
                ConfigLine::new(4, 1, "checkout"),
            ]
        );
    }

    #[test]
    fn test_tab_character_reports_line() {
        let err = parse_lines("default\n\tcommand_1\n\tcommand_2\n").unwrap_err();
        assert_eq!(err, ConfigFormatError::new(2, ConfigErrorKind::TabCharacter));
    }

    #[test]
    fn test_tab_inside_token_is_rejected() {
        let err = parse_lines("git\n    com\tmit\n").unwrap_err();
        assert_eq!(err.line, 2);
        assert_eq!(err.kind, ConfigErrorKind::TabCharacter);
    }

    #[test]
    fn test_indent_mismatch() {
        let err = parse_lines("default\n    command_1\n  command_2\n").unwrap_err();
        assert_eq!(
            err,
            ConfigFormatError::new(
                3,
                ConfigErrorKind::IndentMismatch { spaces: 2, tab_size: 4 }
            )
        );
    }

    #[test]
    fn test_space_inside_token() {
        let err = parse_lines("git\n    commit now\n").unwrap_err();
        assert_eq!(err, ConfigFormatError::new(2, ConfigErrorKind::SpaceInToken));
    }

    #[test]
    fn test_blank_lines_are_counted_not_parsed() {
        let lines = parse_lines("git\n\n   \n    commit\r\n").unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], ConfigLine::new(4, 1, "commit"));
    }

    #[test]
    fn test_trailing_spaces_are_trimmed() {
        let lines = parse_lines("git   \n    push  \n").unwrap();
        assert_eq!(lines[0].token, "git");
        assert_eq!(lines[1].token, "push");
    }

    #[test]
    fn test_empty_source() {
        let err = parse_lines("").unwrap_err();
        assert_eq!(err.kind, ConfigErrorKind::EmptySource);

        let err = parse_lines("\n\n  \n").unwrap_err();
        assert_eq!(err, ConfigFormatError::new(3, ConfigErrorKind::EmptySource));
    }

    #[test]
    fn test_dictionary_view() {
        let source = "default\n    command_1\n        command_2\n            command_3\n    command_4\n";
        let dict = parse_dictionary(source).unwrap();

        assert_eq!(dict[""], vec!["default"]);
        assert_eq!(dict["default"], vec!["command_1", "command_4"]);
        assert_eq!(dict["command_1"], vec!["command_2"]);
        assert_eq!(dict["command_2"], vec!["command_3"]);
        assert!(!dict.contains_key("command_3"));
    }
}
