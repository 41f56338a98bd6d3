// SPDX-License-Identifier: MIT
//
// yank-input — Keyboard event model for textyank.
//
// Hosts translate whatever their platform delivers (browser keydown,
// terminal bytes, a test script) into these types before handing them
// to the chord machine. The types carry exactly what the chord guard
// needs: key identity, held modifiers, and press/repeat/release.

pub mod key;
pub mod notation;

pub use key::{KeyCode, KeyEvent, KeyEventKind, ModifierKey, Modifiers};
pub use notation::{parse_keys, NotationError};
