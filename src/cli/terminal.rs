// Copyright (c) 2024-2025 Jesse Morgan / Morgan Forge
// SPDX-License-Identifier: MIT

//! Terminal driver abstraction.
//!
//! The line editor only ever talks to a [`Terminal`]: read a key, query the
//! geometry, paint colored text, move the cursor. [`CrosstermTerminal`] is the
//! real thing; [`ScriptedTerminal`] replays a byte script and records what
//! was drawn, which is how sessions are tested without a TTY.

use std::collections::VecDeque;
use std::io::{self, Write};
use std::ops::{Deref, DerefMut};

use crossterm::{cursor, event, queue, style::Print, terminal};

use crate::colors::ColorToken;

use super::keys::{self, Key};

/// Capabilities the line editor needs from a terminal.
pub trait Terminal {
    /// Block until the next key press.
    fn read_key(&mut self) -> io::Result<Key>;

    /// Width in columns.
    fn terminal_width(&mut self) -> io::Result<u16>;

    /// Current cursor row.
    fn cursor_row(&mut self) -> io::Result<u16>;

    /// Move the cursor to `column` (1-based) on the current row.
    fn set_cursor_column(&mut self, column: u16) -> io::Result<()>;

    /// Erase the current line and return to its first column.
    fn clear_line(&mut self) -> io::Result<()>;

    fn write_colored(&mut self, text: &str, color: &ColorToken) -> io::Result<()>;

    fn flush(&mut self) -> io::Result<()>;

    fn enable_raw_mode(&mut self) -> io::Result<()>;

    fn disable_raw_mode(&mut self) -> io::Result<()>;
}

/// Raw mode for as long as the guard lives.
///
/// Dereferences to the wrapped terminal. Cooked mode comes back on drop, so
/// every early return and `?` restores the user's shell. [`release`] does the
/// same but reports a failure instead of only logging it.
///
/// [`release`]: RawModeGuard::release
pub struct RawModeGuard<'a, T: Terminal + ?Sized> {
    terminal: &'a mut T,
    active: bool,
}

impl<'a, T: Terminal + ?Sized> RawModeGuard<'a, T> {
    pub fn acquire(terminal: &'a mut T) -> io::Result<Self> {
        terminal.enable_raw_mode()?;
        Ok(Self {
            terminal,
            active: true,
        })
    }

    pub fn release(mut self) -> io::Result<()> {
        self.active = false;
        self.terminal.disable_raw_mode()
    }
}

impl<T: Terminal + ?Sized> Deref for RawModeGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.terminal
    }
}

impl<T: Terminal + ?Sized> DerefMut for RawModeGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        self.terminal
    }
}

impl<T: Terminal + ?Sized> Drop for RawModeGuard<'_, T> {
    fn drop(&mut self) {
        if !self.active {
            return;
        }
        if let Err(err) = self.terminal.disable_raw_mode() {
            tracing::warn!(error = %err, "failed to restore cooked mode");
        }
    }
}

/// Terminal on stdin/stdout via crossterm.
pub struct CrosstermTerminal {
    out: io::Stdout,
}

impl CrosstermTerminal {
    pub fn new() -> Self {
        Self { out: io::stdout() }
    }
}

impl Default for CrosstermTerminal {
    fn default() -> Self {
        Self::new()
    }
}

impl Terminal for CrosstermTerminal {
    fn read_key(&mut self) -> io::Result<Key> {
        loop {
            if let event::Event::Key(key_event) = event::read()? {
                if let Some(key) = Key::from_event(key_event) {
                    return Ok(key);
                }
            }
        }
    }

    fn terminal_width(&mut self) -> io::Result<u16> {
        terminal::size().map(|(columns, _)| columns)
    }

    fn cursor_row(&mut self) -> io::Result<u16> {
        cursor::position().map(|(_, row)| row)
    }

    fn set_cursor_column(&mut self, column: u16) -> io::Result<()> {
        let row = self.cursor_row()?;
        queue!(self.out, cursor::MoveTo(column.saturating_sub(1), row))
    }

    fn clear_line(&mut self) -> io::Result<()> {
        queue!(
            self.out,
            terminal::Clear(terminal::ClearType::CurrentLine),
            cursor::MoveToColumn(0)
        )
    }

    fn write_colored(&mut self, text: &str, color: &ColorToken) -> io::Result<()> {
        queue!(self.out, Print(color.paint(text)))
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    fn enable_raw_mode(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()
    }

    fn disable_raw_mode(&mut self) -> io::Result<()> {
        terminal::disable_raw_mode()
    }
}

/// In-memory terminal driven by a byte script.
///
/// `line()` holds the plain text of the current line as last rendered;
/// `transcript()` holds every escape sequence and colored write in order.
#[derive(Debug, Clone)]
pub struct ScriptedTerminal {
    input: VecDeque<u8>,
    width: u16,
    row: u16,
    column: u16,
    line: String,
    transcript: String,
    raw_mode: bool,
    raw_mode_toggles: usize,
}

impl ScriptedTerminal {
    pub const DEFAULT_WIDTH: u16 = 80;

    pub fn new(script: impl AsRef<[u8]>) -> Self {
        Self {
            input: script.as_ref().iter().copied().collect(),
            width: Self::DEFAULT_WIDTH,
            row: 0,
            column: 1,
            line: String::new(),
            transcript: String::new(),
            raw_mode: false,
            raw_mode_toggles: 0,
        }
    }

    pub fn with_width(mut self, width: u16) -> Self {
        self.width = width;
        self
    }

    /// Queue more input behind whatever is left of the script.
    pub fn push_input(&mut self, script: impl AsRef<[u8]>) {
        self.input.extend(script.as_ref().iter().copied());
    }

    pub fn line(&self) -> &str {
        &self.line
    }

    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    /// 1-based cursor column after the last move.
    pub fn cursor_column(&self) -> u16 {
        self.column
    }

    pub fn is_raw_mode(&self) -> bool {
        self.raw_mode
    }

    /// How many times raw mode was switched on or off.
    pub fn raw_mode_toggles(&self) -> usize {
        self.raw_mode_toggles
    }

    pub fn remaining_input(&self) -> usize {
        self.input.len()
    }
}

impl Terminal for ScriptedTerminal {
    fn read_key(&mut self) -> io::Result<Key> {
        let input = &mut self.input;
        keys::decode(|| {
            input.pop_front().ok_or_else(|| {
                io::Error::new(io::ErrorKind::UnexpectedEof, "key script exhausted")
            })
        })
    }

    fn terminal_width(&mut self) -> io::Result<u16> {
        Ok(self.width)
    }

    fn cursor_row(&mut self) -> io::Result<u16> {
        Ok(self.row)
    }

    fn set_cursor_column(&mut self, column: u16) -> io::Result<()> {
        self.column = column;
        Ok(())
    }

    fn clear_line(&mut self) -> io::Result<()> {
        self.line.clear();
        self.column = 1;
        self.transcript.push_str("\x1b[2K\r");
        Ok(())
    }

    fn write_colored(&mut self, text: &str, color: &ColorToken) -> io::Result<()> {
        self.line.push_str(text);
        self.transcript.push_str(&color.paint(text));
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn enable_raw_mode(&mut self) -> io::Result<()> {
        self.raw_mode = true;
        self.raw_mode_toggles += 1;
        Ok(())
    }

    fn disable_raw_mode(&mut self) -> io::Result<()> {
        self.raw_mode = false;
        self.raw_mode_toggles += 1;
        Ok(())
    }
}
