// SPDX-License-Identifier: MIT
//
// Vim key notation.
//
// Turns a script like `yi(` or `<C-c>a"` into key events. Plain
// characters are one press each; `<...>` names a special key or a
// modified key:
//
//   <Esc> <CR> <Enter> <Tab> <BS> <Del> <Space> <lt>
//   <Shift> <Ctrl> <Alt> <Meta> <Super>      bare modifier presses
//   <C-x> <A-x> <M-x> <S-x> <D-x>            x with Ctrl/Alt/Meta/Shift/Super
//
// Names are case-insensitive. A literal `<` is written `<lt>`; a `<`
// that never closes is an error rather than a silent literal.

use thiserror::Error;

use crate::key::{KeyCode, KeyEvent, ModifierKey, Modifiers};

/// Why a key script failed to parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotationError {
    #[error("unterminated key name starting at byte {0}")]
    Unterminated(usize),
    #[error("unknown key name <{0}>")]
    UnknownKey(String),
}

/// Parse a key script into a sequence of press events.
///
/// # Errors
///
/// Returns [`NotationError`] for an unclosed `<` or an unrecognized name.
pub fn parse_keys(script: &str) -> Result<Vec<KeyEvent>, NotationError> {
    let mut keys = Vec::new();
    let mut rest = script;
    let mut consumed = 0;

    while let Some(ch) = rest.chars().next() {
        if ch == '<' {
            let close = rest.find('>').ok_or(NotationError::Unterminated(consumed))?;
            keys.push(parse_named(&rest[1..close])?);
            consumed += close + 1;
            rest = &rest[close + 1..];
        } else {
            keys.push(KeyEvent::char(ch));
            consumed += ch.len_utf8();
            rest = &rest[ch.len_utf8()..];
        }
    }

    Ok(keys)
}

/// Parse the inside of a `<...>` group.
fn parse_named(name: &str) -> Result<KeyEvent, NotationError> {
    let unknown = || NotationError::UnknownKey(name.to_string());

    // Modified key: <C-x>, <A-x>, ... The key part is a single char or a
    // named key (<C-Esc>).
    if let Some((prefix, key)) = name.split_once('-') {
        if !key.is_empty() {
            let modifier = match prefix.to_ascii_lowercase().as_str() {
                "c" => Modifiers::CTRL,
                "a" => Modifiers::ALT,
                "m" => Modifiers::META,
                "s" => Modifiers::SHIFT,
                "d" => Modifiers::SUPER,
                _ => return Err(unknown()),
            };
            let mut inner = if key.chars().count() == 1 {
                key.chars().next().map(KeyEvent::char).ok_or_else(unknown)?
            } else {
                parse_named(key)?
            };
            inner.modifiers |= modifier;
            return Ok(inner);
        }
    }

    let code = match name.to_ascii_lowercase().as_str() {
        "esc" => KeyCode::Escape,
        "cr" | "enter" | "return" => KeyCode::Enter,
        "tab" => KeyCode::Tab,
        "bs" => KeyCode::Backspace,
        "del" => KeyCode::Delete,
        "space" => KeyCode::Char(' '),
        "lt" => KeyCode::Char('<'),
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "pageup" => KeyCode::PageUp,
        "pagedown" => KeyCode::PageDown,
        "shift" => KeyCode::Modifier(ModifierKey::Shift),
        "ctrl" => KeyCode::Modifier(ModifierKey::Control),
        "alt" => KeyCode::Modifier(ModifierKey::Alt),
        "meta" => KeyCode::Modifier(ModifierKey::Meta),
        "super" => KeyCode::Modifier(ModifierKey::Super),
        other => match other.strip_prefix('f').and_then(|n| n.parse::<u8>().ok()) {
            Some(n @ 1..=24) => KeyCode::F(n),
            _ => return Err(unknown()),
        },
    };

    Ok(KeyEvent::press(code))
}

// ─── Tests ──────────────────────────────────────────────────────────────────
