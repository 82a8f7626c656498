// Copyright (c) 2024-2025 Jesse Morgan / Morgan Forge
// SPDX-License-Identifier: MIT

//! The raw-mode line editor.
//!
//! One call to [`LineEditor::read_line`] is one input session. Each loop
//! iteration predicts completions for the buffer, redraws the whole line
//! (title, typed text, then the suggestion), puts the cursor back where the
//! user is editing and blocks on a single key.
//!
//! Key handling lives in [`EditSession`] so it can be driven without any
//! terminal at all.

use tracing::{debug, trace};
use unicode_width::UnicodeWidthStr;

use crate::colors::ColorScheme;
use crate::error::{Error, Result};
use crate::predict::{predict, Classification, OptionalMarkers, PredictionResult, DELIMITER};
use crate::rules::RuleTree;

use super::keys::Key;
use super::terminal::{RawModeGuard, Terminal};

/// Shown between the typed text and a fuzzy suggestion.
pub const FUZZY_HINT: &str = "  maybe you mean: ";

/// Presentation settings for an input session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditorOptions {
    pub title: String,
    pub colors: ColorScheme,
    pub markers: OptionalMarkers,
}

impl EditorOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_colors(mut self, colors: ColorScheme) -> Self {
        self.colors = colors;
        self
    }

    pub fn with_markers(mut self, markers: impl Into<OptionalMarkers>) -> Self {
        self.markers = markers.into();
        self
    }

    /// Columns taken by the title and its separating space.
    pub fn title_width(&self) -> usize {
        if self.title.is_empty() {
            0
        } else {
            self.title.width() + 1
        }
    }
}

/// Text being edited plus a cursor.
///
/// The cursor is kept as `offset`, the distance from the end of the text, so
/// that appending at the end is the common case with `offset == 0`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditBuffer {
    chars: Vec<char>,
    offset: usize,
}

impl EditBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Insertion index.
    pub fn cursor(&self) -> usize {
        self.chars.len() - self.offset
    }

    pub fn text(&self) -> String {
        self.chars.iter().collect()
    }

    pub fn insert(&mut self, c: char) {
        let at = self.cursor();
        self.chars.insert(at, c);
    }

    /// Remove the character left of the cursor.
    pub fn backspace(&mut self) -> bool {
        let cursor = self.cursor();
        if cursor == 0 {
            return false;
        }
        self.chars.remove(cursor - 1);
        true
    }

    /// Remove the character under the cursor.
    pub fn delete(&mut self) -> bool {
        if self.offset == 0 {
            return false;
        }
        let at = self.cursor();
        self.chars.remove(at);
        self.offset -= 1;
        true
    }

    pub fn move_left(&mut self) {
        self.offset = (self.offset + 1).min(self.chars.len());
    }

    pub fn move_right(&mut self) {
        self.offset = self.offset.saturating_sub(1);
    }

    /// Index where the trailing partial word starts.
    pub fn partial_word_start(&self) -> usize {
        self.chars
            .iter()
            .rposition(|&c| c == DELIMITER)
            .map_or(0, |space| space + 1)
    }

    /// Text after the last delimiter.
    pub fn partial_word(&self) -> String {
        self.chars[self.partial_word_start()..].iter().collect()
    }

    /// Swap the partial word for `word`, add a delimiter and park the cursor
    /// at the end.
    pub fn replace_partial_word(&mut self, word: &str) {
        self.chars.truncate(self.partial_word_start());
        self.chars.extend(word.chars());
        self.chars.push(DELIMITER);
        self.offset = 0;
    }
}

/// What the session loop should do after a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue,
    Submit,
}

/// Key handling state of one input session.
#[derive(Debug, Clone)]
pub struct EditSession {
    buffer: EditBuffer,
    hint_index: isize,
    width_budget: usize,
    markers: OptionalMarkers,
}

impl EditSession {
    /// `width_budget` is how many columns the buffer may use; its length
    /// always stays strictly below it.
    pub fn new(width_budget: usize, markers: OptionalMarkers) -> Self {
        Self {
            buffer: EditBuffer::new(),
            hint_index: 0,
            width_budget,
            markers,
        }
    }

    pub fn buffer(&self) -> &EditBuffer {
        &self.buffer
    }

    pub fn hint_index(&self) -> isize {
        self.hint_index
    }

    pub fn text(&self) -> String {
        self.buffer.text()
    }

    pub fn into_text(self) -> String {
        self.buffer.text()
    }

    /// Apply one key. `prediction` must be the one computed for the current
    /// buffer, since Tab accepts from it and Up/Down cycle through it.
    pub fn apply(&mut self, key: Key, prediction: &PredictionResult) -> Result<Step> {
        match key {
            Key::Enter => return Ok(Step::Submit),
            Key::Interrupt => return Err(Error::Interrupted),
            Key::Tab => self.accept(prediction)?,
            Key::Char(c) => self.insert(c),
            Key::Backspace => {
                self.buffer.backspace();
            }
            Key::Delete => {
                self.buffer.delete();
            }
            Key::Left => self.buffer.move_left(),
            Key::Right => self.buffer.move_right(),
            Key::Up => self.hint_index = self.hint_index.wrapping_add(1),
            Key::Down => self.hint_index = self.hint_index.wrapping_sub(1),
            Key::Ignored => {}
        }
        Ok(Step::Continue)
    }

    fn insert(&mut self, c: char) {
        if self.buffer.len() + 1 >= self.width_budget {
            debug!(len = self.buffer.len(), budget = self.width_budget, "input refused at line budget");
            return;
        }
        self.buffer.insert(c);
        if c == DELIMITER {
            self.hint_index = 0;
        }
    }

    fn accept(&mut self, prediction: &PredictionResult) -> Result<()> {
        if prediction.is_none() {
            return Ok(());
        }
        let Some(candidate) = prediction.selected(self.hint_index) else {
            return Ok(());
        };
        if self.markers.marks(candidate) {
            trace!(%candidate, "placeholder not inserted");
            return Ok(());
        }

        let needed = self.buffer.partial_word_start() + candidate.chars().count() + 1;
        if needed >= self.width_budget {
            debug!(needed, budget = self.width_budget, "completion overflows the line");
            return Err(Error::Overflow {
                needed,
                budget: self.width_budget,
            });
        }

        debug!(%candidate, classification = %prediction.classification, "completion accepted");
        self.buffer.replace_partial_word(candidate);
        self.hint_index = 0;
        Ok(())
    }
}

/// Interactive line reader completing against a rule tree.
#[derive(Debug, Clone)]
pub struct LineEditor<'t> {
    tree: &'t RuleTree,
    options: EditorOptions,
}

impl<'t> LineEditor<'t> {
    pub fn new(tree: &'t RuleTree, options: EditorOptions) -> Self {
        Self { tree, options }
    }

    /// Run one input session and return the submitted line.
    ///
    /// Raw mode is held for the duration of the call and restored on every
    /// exit, including errors.
    pub fn read_line<T: Terminal + ?Sized>(&self, terminal: &mut T) -> Result<String> {
        let mut terminal = RawModeGuard::acquire(terminal)?;

        let width = usize::from(terminal.terminal_width()?);
        let budget = width.saturating_sub(self.options.title_width());
        let mut session = EditSession::new(budget, self.options.markers.clone());
        debug!(width, budget, title = %self.options.title, "input session started");

        loop {
            let prediction = predict(self.tree, &session.text(), &self.options.markers);
            self.render(&mut *terminal, &session, &prediction)?;

            let key = terminal.read_key()?;
            trace!(?key, classification = %prediction.classification, "key");

            if session.apply(key, &prediction)? == Step::Submit {
                self.render(&mut *terminal, &session, &PredictionResult::none())?;
                break;
            }
        }

        terminal.release()?;
        Ok(session.into_text())
    }

    fn render<T: Terminal + ?Sized>(
        &self,
        terminal: &mut T,
        session: &EditSession,
        prediction: &PredictionResult,
    ) -> Result<()> {
        let colors = &self.options.colors;
        let buffer = session.buffer();

        terminal.clear_line()?;
        if !self.options.title.is_empty() {
            terminal.write_colored(&self.options.title, &colors.title)?;
            terminal.write_colored(" ", &colors.default)?;
        }
        terminal.write_colored(&buffer.text(), &colors.default)?;

        if let Some(candidate) = prediction.selected(session.hint_index()) {
            match prediction.classification {
                Classification::Exact => {
                    let partial = buffer.partial_word();
                    let rest = candidate.strip_prefix(partial.as_str()).unwrap_or_default();
                    if !rest.is_empty() {
                        terminal.write_colored(rest, &colors.prediction)?;
                    }
                }
                Classification::Fuzzy => {
                    terminal.write_colored(FUZZY_HINT, &colors.prediction)?;
                    terminal.write_colored(candidate, &colors.prediction)?;
                }
                Classification::None => {}
            }
        }

        let column = buffer.len() + self.options.title_width() - buffer.offset() + 1;
        terminal.set_cursor_column(u16::try_from(column).unwrap_or(u16::MAX))?;
        terminal.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(text: &str) -> EditBuffer {
        let mut buffer = EditBuffer::new();
        text.chars().for_each(|c| buffer.insert(c));
        buffer
    }

    fn exact(words: &[&str]) -> PredictionResult {
        PredictionResult {
            classification: Classification::Exact,
            candidates: words.iter().map(|w| (*w).into()).collect(),
        }
    }

    fn session_with(text: &str) -> EditSession {
        let mut session = EditSession::new(80, OptionalMarkers::new("[{<"));
        for c in text.chars() {
            session.apply(Key::Char(c), &PredictionResult::none()).unwrap();
        }
        session
    }

    #[test]
    fn test_insert_at_cursor() {
        let mut buffer = typed("gt");
        buffer.move_left();
        buffer.insert('i');
        assert_eq!(buffer.text(), "git");
        assert_eq!(buffer.offset(), 1);
    }

    #[test]
    fn test_cursor_is_clamped() {
        let mut buffer = typed("ab");
        for _ in 0..5 {
            buffer.move_left();
        }
        assert_eq!(buffer.offset(), 2);
        assert_eq!(buffer.cursor(), 0);
        for _ in 0..5 {
            buffer.move_right();
        }
        assert_eq!(buffer.offset(), 0);
    }

    #[test]
    fn test_backspace_at_start_is_noop() {
        let mut buffer = typed("ab");
        buffer.move_left();
        buffer.move_left();
        assert!(!buffer.backspace());
        assert_eq!(buffer.text(), "ab");

        buffer.move_right();
        assert!(buffer.backspace());
        assert_eq!(buffer.text(), "b");
        assert!(buffer.backspace());
        assert!(buffer.is_empty());
        assert!(!EditBuffer::new().backspace());
    }

    #[test]
    fn test_delete_under_cursor() {
        let mut buffer = typed("gitx");
        assert!(!buffer.delete(), "nothing under an end-of-line cursor");
        buffer.move_left();
        assert!(buffer.delete());
        assert_eq!(buffer.text(), "git");
        assert_eq!(buffer.offset(), 0);
    }

    #[test]
    fn test_partial_word() {
        assert_eq!(typed("git comm").partial_word(), "comm");
        assert_eq!(typed("git ").partial_word(), "");
        assert_eq!(typed("gi").partial_word(), "gi");
    }

    #[test]
    fn test_tab_replaces_partial_word() {
        let mut session = session_with("git comm");
        session.apply(Key::Tab, &exact(&["commit"])).unwrap();
        assert_eq!(session.text(), "git commit ");
        assert_eq!(session.buffer().offset(), 0);
    }

    #[test]
    fn test_tab_from_mid_line_parks_cursor_at_end() {
        let mut session = session_with("git ch");
        session.apply(Key::Left, &PredictionResult::none()).unwrap();
        session.apply(Key::Tab, &exact(&["checkout"])).unwrap();
        assert_eq!(session.text(), "git checkout ");
        assert_eq!(session.buffer().offset(), 0);
    }

    #[test]
    fn test_tab_uses_hint_and_resets_it() {
        let prediction = exact(&["commit", "checkout"]);
        let mut session = session_with("git c");
        session.apply(Key::Up, &prediction).unwrap();
        assert_eq!(session.hint_index(), 1);
        session.apply(Key::Tab, &prediction).unwrap();
        assert_eq!(session.text(), "git checkout ");
        assert_eq!(session.hint_index(), 0);
    }

    #[test]
    fn test_down_wraps_to_last() {
        let prediction = exact(&["commit", "checkout"]);
        let mut session = session_with("git c");
        session.apply(Key::Down, &prediction).unwrap();
        assert_eq!(session.hint_index(), -1);
        session.apply(Key::Tab, &prediction).unwrap();
        assert_eq!(session.text(), "git checkout ");
    }

    #[test]
    fn test_space_resets_hint() {
        let mut session = session_with("git");
        session.apply(Key::Up, &PredictionResult::none()).unwrap();
        session.apply(Key::Char(' '), &PredictionResult::none()).unwrap();
        assert_eq!(session.hint_index(), 0);
    }

    #[test]
    fn test_tab_without_prediction_is_noop() {
        let mut session = session_with("git xyz");
        session.apply(Key::Tab, &PredictionResult::none()).unwrap();
        assert_eq!(session.text(), "git xyz");
    }

    #[test]
    fn test_tab_never_inserts_placeholder() {
        let mut session = session_with("git checkout ");
        session.apply(Key::Tab, &exact(&["[branch]"])).unwrap();
        assert_eq!(session.text(), "git checkout ");
    }

    #[test]
    fn test_tab_overflow_is_fatal() {
        let mut session = EditSession::new(10, OptionalMarkers::default());
        for c in "git ".chars() {
            session.apply(Key::Char(c), &PredictionResult::none()).unwrap();
        }
        let err = session.apply(Key::Tab, &exact(&["checkout"])).unwrap_err();
        assert!(matches!(err, Error::Overflow { needed: 13, budget: 10 }));
        assert_eq!(session.text(), "git ", "buffer is never truncated");
    }

    #[test]
    fn test_insert_refused_at_budget() {
        let mut session = EditSession::new(4, OptionalMarkers::default());
        for c in "abcdef".chars() {
            session.apply(Key::Char(c), &PredictionResult::none()).unwrap();
        }
        assert_eq!(session.text(), "abc");
    }

    #[test]
    fn test_enter_and_interrupt() {
        let mut session = session_with("git");
        assert_eq!(
            session.apply(Key::Enter, &PredictionResult::none()).unwrap(),
            Step::Submit
        );
        let err = session
            .apply(Key::Interrupt, &PredictionResult::none())
            .unwrap_err();
        assert!(matches!(err, Error::Interrupted));
    }

    #[test]
    fn test_ignored_changes_nothing() {
        let mut session = session_with("git");
        let before = session.buffer().clone();
        assert_eq!(
            session.apply(Key::Ignored, &exact(&["commit"])).unwrap(),
            Step::Continue
        );
        assert_eq!(session.buffer(), &before);
        assert_eq!(session.hint_index(), 0);
    }

    #[test]
    fn test_title_width() {
        assert_eq!(EditorOptions::new().title_width(), 0);
        assert_eq!(EditorOptions::new().with_title("git [0]").title_width(), 8);
    }
}
