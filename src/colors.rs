// Copyright (c) 2024-2025 Jesse Morgan / Morgan Forge
// SPDX-License-Identifier: MIT

//! ANSI color tokens for the prompt.
//!
//! A [`ColorToken`] is the SGR parameter string that goes between `ESC[` and
//! `m` (for example `"0;30;102"`). The line editor never looks inside a token,
//! it only hands it to the terminal driver together with the text to paint.
//!
//! Color usage conventions:
//! - title = the prompt label in front of the input
//! - prediction = completion suffix and "maybe you mean" hints
//! - default = the text the user typed

use std::fmt;

/// Reset all formatting
pub const RESET: &str = "\x1b[0m";

/// Black text on a bright green background (default title)
pub const TITLE_BLACK_ON_GREEN: &str = "0;30;102";

/// Bright black (gray) for subtle prediction text
pub const GRAY: &str = "90";

/// Terminal default attributes
pub const DEFAULT: &str = "0";

/// An opaque SGR color parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColorToken(String);

impl ColorToken {
    pub fn new(sgr: impl Into<String>) -> Self {
        Self(sgr.into())
    }

    /// The raw SGR parameters.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Wrap `text` in this color followed by a reset.
    pub fn paint(&self, text: &str) -> String {
        format!("\x1b[{}m{}{}", self.0, text, RESET)
    }
}

impl From<&str> for ColorToken {
    fn from(sgr: &str) -> Self {
        Self::new(sgr)
    }
}

impl fmt::Display for ColorToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The three colors used when rendering a prompt line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorScheme {
    pub title: ColorToken,
    pub prediction: ColorToken,
    pub default: ColorToken,
}

impl ColorScheme {
    pub fn new(
        title: impl Into<ColorToken>,
        prediction: impl Into<ColorToken>,
        default: impl Into<ColorToken>,
    ) -> Self {
        Self {
            title: title.into(),
            prediction: prediction.into(),
            default: default.into(),
        }
    }

    /// Title on green, gray predictions, untouched input text.
    pub fn platform_default() -> Self {
        Self::new(TITLE_BLACK_ON_GREEN, GRAY, DEFAULT)
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::platform_default()
    }
}
