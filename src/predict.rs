// Copyright (c) 2024-2025 Jesse Morgan / Morgan Forge
// SPDX-License-Identifier: MIT

//! Completion prediction for a partially typed line.
//!
//! [`predict`] is a pure function of the rule tree, the current buffer and the
//! optional-marker set. Every word but the last must already be a confirmed
//! path through the tree; the last word is matched against the children at the
//! end of that path:
//!
//! - **Exact**: children that start with the typed prefix
//! - **Fuzzy**: when nothing starts with it, children that differ from it in at
//!   most one position
//! - **None**: neither, or the path itself is unknown
//!
//! Candidates always come back in rule-file order so that cycling through them
//! with Up/Down is stable from one keystroke to the next.

use std::fmt;

use crate::rules::{RuleTree, Token};

/// Word delimiter of the input line.
pub const DELIMITER: char = ' ';

/// How many mismatching positions disqualify a fuzzy candidate.
const FUZZY_MISS_LIMIT: usize = 2;

/// How confident a prediction is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Classification {
    /// Nothing to suggest.
    #[default]
    None,
    /// Candidates literally start with the typed word.
    Exact,
    /// Candidates are one typo away from the typed word.
    Fuzzy,
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Classification::None => "none",
            Classification::Exact => "exact",
            Classification::Fuzzy => "fuzzy",
        };
        f.write_str(label)
    }
}

/// Classified candidate list for one buffer state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PredictionResult {
    pub classification: Classification,
    pub candidates: Vec<Token>,
}

impl PredictionResult {
    pub fn none() -> Self {
        Self::default()
    }

    fn classified(classification: Classification, candidates: Vec<Token>) -> Self {
        if candidates.is_empty() {
            return Self::none();
        }
        Self {
            classification,
            candidates,
        }
    }

    pub fn is_none(&self) -> bool {
        self.classification == Classification::None
    }

    /// Candidate picked by the hint index, wrapping in both directions.
    pub fn selected(&self, hint_index: isize) -> Option<&Token> {
        if self.candidates.is_empty() {
            return None;
        }
        let len = self.candidates.len() as isize;
        self.candidates.get(hint_index.rem_euclid(len) as usize)
    }
}

/// Characters that mark a token as a placeholder, e.g. `[branch]`.
///
/// Placeholders are shown as hints but never inserted by Tab.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OptionalMarkers(Vec<char>);

impl OptionalMarkers {
    pub fn new(markers: &str) -> Self {
        let mut chars: Vec<char> = markers.chars().collect();
        chars.sort_unstable();
        chars.dedup();
        Self(chars)
    }

    /// `true` if `text` contains any marker character.
    pub fn marks(&self, text: &str) -> bool {
        !self.0.is_empty() && text.chars().any(|c| self.0.contains(&c))
    }
}

impl From<&str> for OptionalMarkers {
    fn from(markers: &str) -> Self {
        Self::new(markers)
    }
}

/// Split the buffer into words.
///
/// Runs of delimiters collapse. If the buffer is empty or ends with a
/// delimiter an empty trailing word is appended: the word being typed, with
/// nothing typed yet.
pub fn split_tokens(buffer: &str) -> Vec<&str> {
    let mut tokens: Vec<&str> = buffer
        .split(DELIMITER)
        .filter(|word| !word.is_empty())
        .collect();

    if buffer.is_empty() || buffer.ends_with(DELIMITER) {
        tokens.push("");
    }

    tokens
}

/// Predict completions for `buffer`.
pub fn predict(tree: &RuleTree, buffer: &str, markers: &OptionalMarkers) -> PredictionResult {
    let tokens = split_tokens(buffer);
    let Some((&last, confirmed)) = tokens.split_last() else {
        return PredictionResult::none();
    };

    // Editing inside a placeholder: nothing useful to suggest.
    if markers.marks(last) {
        return PredictionResult::none();
    }

    let Some(node) = tree.traverse(confirmed) else {
        return PredictionResult::none();
    };

    let exact: Vec<Token> = node
        .children()
        .map(|child| child.token())
        .filter(|token| token.starts_with(last))
        .cloned()
        .collect();

    if !exact.is_empty() {
        return PredictionResult::classified(Classification::Exact, exact);
    }

    let fuzzy: Vec<Token> = node
        .children()
        .map(|child| child.token())
        .filter(|token| !markers.marks(token))
        .filter(|token| mismatches(last, token) < FUZZY_MISS_LIMIT)
        .cloned()
        .collect();

    PredictionResult::classified(Classification::Fuzzy, fuzzy)
}

/// Count positions where `candidate` differs from `typed`, over the length of
/// `typed`. Positions past the end of `candidate` count as mismatches.
/// Stops counting at the fuzzy limit.
fn mismatches(typed: &str, candidate: &str) -> usize {
    let mut candidate = candidate.chars();
    let mut misses = 0;

    for expected in typed.chars() {
        if candidate.next() != Some(expected) {
            misses += 1;
            if misses == FUZZY_MISS_LIMIT {
                break;
            }
        }
    }

    misses
}
