// SPDX-License-Identifier: MIT
//
// Key events.
//
// A host's keydown notification carries a key identity and the modifier
// flags held at the time. Pure modifier presses (pressing Shift on its
// own) arrive as events too, with their own `KeyCode::Modifier` identity,
// so the chord guard can drop them without ever seeing them as chord keys.

use std::fmt;

use bitflags::bitflags;

// ─── Event Types ────────────────────────────────────────────────────────────

/// A keyboard event with key identity, modifiers, and press state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// Which key was pressed.
    pub code: KeyCode,
    /// Active modifier keys (Shift, Alt, Ctrl, etc.).
    pub modifiers: Modifiers,
    /// Press, repeat, or release.
    pub kind: KeyEventKind,
}

impl KeyEvent {
    /// A plain press with no modifiers held.
    #[must_use]
    pub const fn press(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::empty(),
            kind: KeyEventKind::Press,
        }
    }

    /// A plain character press.
    #[must_use]
    pub const fn char(ch: char) -> Self {
        Self::press(KeyCode::Char(ch))
    }

    /// The same event with `modifiers` held.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// The same event with a different press state.
    #[must_use]
    pub const fn with_kind(mut self, kind: KeyEventKind) -> Self {
        self.kind = kind;
        self
    }

    /// True if Ctrl is held.
    #[inline]
    #[must_use]
    pub const fn ctrl(&self) -> bool {
        self.modifiers.contains(Modifiers::CTRL)
    }
}

/// Key press / repeat / release distinction.
///
/// Hosts that cannot tell the difference report everything as
/// [`Press`](KeyEventKind::Press).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyEventKind {
    /// Initial key press.
    #[default]
    Press,
    /// Key held down long enough to trigger auto-repeat.
    Repeat,
    /// Key released.
    Release,
}

/// A key that only modifies other keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModifierKey {
    Shift,
    Control,
    Alt,
    Meta,
    Super,
}

impl ModifierKey {
    /// Canonical name, matching the key notation (`<Shift>`, `<Ctrl>`, ...).
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Shift => "Shift",
            Self::Control => "Ctrl",
            Self::Alt => "Alt",
            Self::Meta => "Meta",
            Self::Super => "Super",
        }
    }
}

/// Identity of a key.
///
/// Printable characters use [`Char`](KeyCode::Char); everything a chord
/// could plausibly meet in practice has a named variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCode {
    /// A Unicode character (printable).
    Char(char),
    // ── Named keys ──────────────────────────────────────────────
    Enter,
    Tab,
    Backspace,
    Escape,
    Delete,
    // ── Navigation ──────────────────────────────────────────────
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    /// F1 through F24.
    F(u8),
    /// A bare modifier press.
    Modifier(ModifierKey),
}

impl KeyCode {
    /// True for a bare modifier press (Shift, Ctrl, ... on their own).
    #[inline]
    #[must_use]
    pub const fn is_modifier(self) -> bool {
        matches!(self, Self::Modifier(_))
    }

    /// The character for [`Char`](KeyCode::Char) keys.
    #[inline]
    #[must_use]
    pub const fn as_char(self) -> Option<char> {
        match self {
            Self::Char(ch) => Some(ch),
            _ => None,
        }
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Char(' ') => f.write_str("<Space>"),
            Self::Char('<') => f.write_str("<lt>"),
            Self::Char(ch) => write!(f, "{ch}"),
            Self::Enter => f.write_str("<CR>"),
            Self::Tab => f.write_str("<Tab>"),
            Self::Backspace => f.write_str("<BS>"),
            Self::Escape => f.write_str("<Esc>"),
            Self::Delete => f.write_str("<Del>"),
            Self::Up => f.write_str("<Up>"),
            Self::Down => f.write_str("<Down>"),
            Self::Left => f.write_str("<Left>"),
            Self::Right => f.write_str("<Right>"),
            Self::Home => f.write_str("<Home>"),
            Self::End => f.write_str("<End>"),
            Self::PageUp => f.write_str("<PageUp>"),
            Self::PageDown => f.write_str("<PageDown>"),
            Self::F(n) => write!(f, "<F{n}>"),
            Self::Modifier(m) => write!(f, "<{}>", m.name()),
        }
    }
}

bitflags! {
    /// Keyboard modifier flags held during a key event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0000_0001;
        const ALT   = 0b0000_0010;
        const CTRL  = 0b0000_0100;
        const SUPER = 0b0000_1000;
        const META  = 0b0010_0000;
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_has_no_modifiers() {
        let k = KeyEvent::char('i');
        assert_eq!(k.code, KeyCode::Char('i'));
        assert!(k.modifiers.is_empty());
        assert_eq!(k.kind, KeyEventKind::Press);
        assert!(!k.ctrl());
    }

    #[test]
    fn ctrl_detection() {
        let k = KeyEvent::char('c').with_modifiers(Modifiers::CTRL | Modifiers::SHIFT);
        assert!(k.ctrl());
        let k = KeyEvent::char('C').with_modifiers(Modifiers::SHIFT);
        assert!(!k.ctrl());
    }

    #[test]
    fn modifier_keys_are_modifiers() {
        assert!(KeyCode::Modifier(ModifierKey::Shift).is_modifier());
        assert!(KeyCode::Modifier(ModifierKey::Meta).is_modifier());
        assert!(!KeyCode::Char('a').is_modifier());
        assert!(!KeyCode::Escape.is_modifier());
    }

    #[test]
    fn as_char() {
        assert_eq!(KeyCode::Char('(').as_char(), Some('('));
        assert_eq!(KeyCode::Enter.as_char(), None);
    }

    #[test]
    fn display_uses_key_notation() {
        assert_eq!(KeyCode::Char('x').to_string(), "x");
        assert_eq!(KeyCode::Char('<').to_string(), "<lt>");
        assert_eq!(KeyCode::Char(' ').to_string(), "<Space>");
        assert_eq!(KeyCode::Escape.to_string(), "<Esc>");
        assert_eq!(KeyCode::F(5).to_string(), "<F5>");
        assert_eq!(
            KeyCode::Modifier(ModifierKey::Control).to_string(),
            "<Ctrl>"
        );
    }
}
