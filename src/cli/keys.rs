// Copyright (c) 2024-2025 Jesse Morgan / Morgan Forge
// SPDX-License-Identifier: MIT

//! Key classification.
//!
//! Two sources feed the line editor: crossterm key events on a real terminal
//! and raw byte streams (what a POSIX terminal delivers in raw mode), which
//! is what scripted sessions replay. Both end up as a [`Key`].

use std::io;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// A key press as the line editor sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Enter,
    Tab,
    Backspace,
    Delete,
    Left,
    Right,
    Up,
    Down,
    /// Ctrl+C
    Interrupt,
    /// A chord or function key with no binding.
    Ignored,
}

/// Raw byte values.
pub mod codes {
    pub const CTRL_C: u8 = 3;
    pub const CTRL_H: u8 = 8;
    pub const TAB: u8 = 9;
    pub const LINE_FEED: u8 = 10;
    pub const ENTER: u8 = 13;
    pub const ESCAPE: u8 = 27;
    pub const BACKSPACE: u8 = 127;

    /// Second byte of a CSI sequence.
    pub const CSI: u8 = b'[';
    pub const UP: u8 = b'A';
    pub const DOWN: u8 = b'B';
    pub const RIGHT: u8 = b'C';
    pub const LEFT: u8 = b'D';
    /// `ESC [ 3 ~`
    pub const DELETE: u8 = b'3';
    pub const DELETE_TAIL: u8 = b'~';
}

/// Ctrl chords swallowed without touching the buffer.
#[cfg(windows)]
pub const IGNORED_CONTROL_CODES: &[u8] = &[1, 2, 19, 24, 26];

/// Ctrl chords swallowed without touching the buffer.
#[cfg(not(windows))]
pub const IGNORED_CONTROL_CODES: &[u8] = &[1, 2, 4, 24];

impl Key {
    /// Classify a crossterm key event.
    ///
    /// Returns `None` for key releases: Windows reports both edges and only
    /// the press should act.
    pub fn from_event(event: KeyEvent) -> Option<Key> {
        if event.kind == KeyEventKind::Release {
            return None;
        }

        let key = match event.code {
            KeyCode::Char(c) if event.modifiers.contains(KeyModifiers::CONTROL) => {
                control_key(control_code(c))
            }
            KeyCode::Char(_) if event.modifiers.contains(KeyModifiers::ALT) => Key::Ignored,
            KeyCode::Char(c) => Key::Char(c),
            KeyCode::Enter => Key::Enter,
            KeyCode::Tab => Key::Tab,
            KeyCode::Backspace => Key::Backspace,
            KeyCode::Delete => Key::Delete,
            KeyCode::Left => Key::Left,
            KeyCode::Right => Key::Right,
            KeyCode::Up => Key::Up,
            KeyCode::Down => Key::Down,
            other => {
                tracing::trace!(code = ?other, "unbound key");
                Key::Ignored
            }
        };

        Some(key)
    }
}

/// Control byte produced by Ctrl plus `c`, if `c` is a letter.
fn control_code(c: char) -> Option<u8> {
    c.is_ascii_alphabetic()
        .then(|| c.to_ascii_lowercase() as u8 - b'a' + 1)
}

fn control_key(code: Option<u8>) -> Key {
    match code {
        Some(codes::CTRL_C) => Key::Interrupt,
        Some(code) if IGNORED_CONTROL_CODES.contains(&code) => Key::Ignored,
        other => {
            tracing::trace!(code = ?other, "unbound control chord");
            Key::Ignored
        }
    }
}

/// Decode one key from a raw byte source.
///
/// Multi-byte keys (escape sequences, UTF-8 characters) pull their
/// continuation bytes from the same source. Errors from the source pass
/// through untouched.
pub fn decode(mut next_byte: impl FnMut() -> io::Result<u8>) -> io::Result<Key> {
    let byte = next_byte()?;

    let key = match byte {
        codes::CTRL_C => Key::Interrupt,
        codes::ENTER | codes::LINE_FEED => Key::Enter,
        codes::TAB => Key::Tab,
        codes::BACKSPACE | codes::CTRL_H => Key::Backspace,
        codes::ESCAPE => decode_escape(&mut next_byte)?,
        code if code.is_ascii_control() => control_key(Some(code)),
        code if code.is_ascii() => Key::Char(char::from(code)),
        lead => decode_utf8(lead, &mut next_byte)?,
    };

    Ok(key)
}

fn decode_escape(next_byte: &mut impl FnMut() -> io::Result<u8>) -> io::Result<Key> {
    if next_byte()? != codes::CSI {
        return Ok(Key::Ignored);
    }

    let key = match next_byte()? {
        codes::UP => Key::Up,
        codes::DOWN => Key::Down,
        codes::RIGHT => Key::Right,
        codes::LEFT => Key::Left,
        codes::DELETE if next_byte()? == codes::DELETE_TAIL => Key::Delete,
        _ => Key::Ignored,
    };

    Ok(key)
}

fn decode_utf8(lead: u8, next_byte: &mut impl FnMut() -> io::Result<u8>) -> io::Result<Key> {
    let width = match lead {
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF7 => 4,
        // stray continuation byte
        _ => return Ok(Key::Ignored),
    };

    let mut bytes = [lead, 0, 0, 0];
    for slot in bytes.iter_mut().take(width).skip(1) {
        *slot = next_byte()?;
    }

    Ok(std::str::from_utf8(&bytes[..width])
        .ok()
        .and_then(|s| s.chars().next())
        .map_or(Key::Ignored, Key::Char))
}
