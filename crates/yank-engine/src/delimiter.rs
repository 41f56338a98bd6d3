//! Selectors and delimiters — the two halves of a chord.
//!
//! ```text
//! selector + delimiter = yank
//! i        + (         = inside parentheses
//! a        + "         = around double quotes
//! i        + s         = the whole block of text
//! ```
//!
//! | Typed key   | Left | Right |
//! |-------------|------|-------|
//! | `(` or `)`  | `(`  | `)`   |
//! | `[` or `]`  | `[`  | `]`   |
//! | `{` or `}`  | `{`  | `}`   |
//! | `'`         | `'`  | `'`   |
//! | `"`         | `"`  | `"`   |
//! | selector    | `"`  | `"`   |
//! | line key    | whole-line mode   |

use std::fmt;

use yank_input::KeyCode;

use crate::error::YankError;
use crate::options::Options;

/// Known delimiter pairs, keyed by their left character.
const PAIRS: [(char, char); 5] = [('(', ')'), ('[', ']'), ('{', '}'), ('\'', '\''), ('"', '"')];

/// True if `ch` names a delimiter pair from either side.
#[must_use]
pub fn is_pair_char(ch: char) -> bool {
    PAIRS.iter().any(|&(left, right)| ch == left || ch == right)
}

/// The pair a bare selector (`ii`, `aa`, `ia`, ...) stands for.
const DEFAULT_PAIR: (char, char) = ('"', '"');

// ---------------------------------------------------------------------------
// Selector
// ---------------------------------------------------------------------------

/// Whether the yanked span keeps its delimiters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Selector {
    /// `i` — delimiters excluded.
    Inside,
    /// `a` — delimiters included.
    Around,
}

impl Selector {
    /// The selector bound to `ch` under `options`, if any.
    #[must_use]
    pub fn from_key(ch: char, options: &Options) -> Option<Self> {
        if ch == options.inside {
            Some(Self::Inside)
        } else if ch == options.around {
            Some(Self::Around)
        } else {
            None
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inside => f.write_str("inside"),
            Self::Around => f.write_str("around"),
        }
    }
}

// ---------------------------------------------------------------------------
// Delimiter
// ---------------------------------------------------------------------------

/// What the boundary search looks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Delimiter {
    /// Nearest `left` before the cursor, nearest `right` after it.
    Pair { left: char, right: char },
    /// The entire flat text view; no scan.
    Line,
}

impl Delimiter {
    #[must_use]
    pub const fn pair(left: char, right: char) -> Self {
        Self::Pair { left, right }
    }
}

/// Resolve the second key of a chord to a delimiter.
///
/// Either side of a bracket pair names the same pair. A selector key in
/// the delimiter position means the double-quote pair.
///
/// # Errors
///
/// [`YankError::InvalidDelimiter`] for any key outside the table.
pub fn resolve(key: KeyCode, options: &Options) -> Result<Delimiter, YankError> {
    let invalid = || YankError::InvalidDelimiter(key.to_string());
    let ch = key.as_char().ok_or_else(invalid)?;

    if ch == options.line_key {
        return Ok(Delimiter::Line);
    }
    if Selector::from_key(ch, options).is_some() {
        return Ok(Delimiter::pair(DEFAULT_PAIR.0, DEFAULT_PAIR.1));
    }

    PAIRS
        .iter()
        .find(|(left, right)| ch == *left || ch == *right)
        .map(|&(left, right)| Delimiter::pair(left, right))
        .ok_or_else(invalid)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve_char(ch: char) -> Result<Delimiter, YankError> {
        resolve(KeyCode::Char(ch), &Options::default())
    }

    // -- Pairs --------------------------------------------------------------

    #[test]
    fn brackets_resolve_from_either_side() {
        for (l, r) in [('(', ')'), ('[', ']'), ('{', '}')] {
            assert_eq!(resolve_char(l), Ok(Delimiter::pair(l, r)));
            assert_eq!(resolve_char(r), Ok(Delimiter::pair(l, r)));
        }
    }

    #[test]
    fn quotes_are_symmetric() {
        assert_eq!(resolve_char('\''), Ok(Delimiter::pair('\'', '\'')));
        assert_eq!(resolve_char('"'), Ok(Delimiter::pair('"', '"')));
    }

    #[test]
    fn selector_key_means_double_quote() {
        assert_eq!(resolve_char('i'), Ok(Delimiter::pair('"', '"')));
        assert_eq!(resolve_char('a'), Ok(Delimiter::pair('"', '"')));
    }

    #[test]
    fn line_key() {
        assert_eq!(resolve_char('s'), Ok(Delimiter::Line));
    }

    // -- Invalid ------------------------------------------------------------

    #[test]
    fn unknown_chars_are_invalid() {
        for ch in ['x', '<', '>', '`', 'S', ' ', '0'] {
            assert_eq!(
                resolve_char(ch),
                Err(YankError::InvalidDelimiter(KeyCode::Char(ch).to_string()))
            );
        }
    }

    #[test]
    fn named_keys_are_invalid() {
        assert_eq!(
            resolve(KeyCode::Escape, &Options::default()),
            Err(YankError::InvalidDelimiter("<Esc>".into()))
        );
        assert!(resolve(KeyCode::Enter, &Options::default()).is_err());
    }

    // -- Configured keys ----------------------------------------------------

    #[test]
    fn remapped_keys_follow_options() {
        let mut options = Options::default();
        options.set("inside=I around=A linekey=l").unwrap();
        assert_eq!(resolve(KeyCode::Char('l'), &options), Ok(Delimiter::Line));
        assert_eq!(resolve(KeyCode::Char('I'), &options), Ok(Delimiter::pair('"', '"')));
        // The old defaults are now ordinary (invalid) keys.
        assert!(resolve(KeyCode::Char('s'), &options).is_err());
        assert!(resolve(KeyCode::Char('i'), &options).is_err());
    }

    #[test]
    fn selector_from_key() {
        let options = Options::default();
        assert_eq!(Selector::from_key('i', &options), Some(Selector::Inside));
        assert_eq!(Selector::from_key('a', &options), Some(Selector::Around));
        assert_eq!(Selector::from_key('y', &options), None);
    }

    #[test]
    fn pair_chars() {
        for ch in ['(', ')', '[', ']', '{', '}', '\'', '"'] {
            assert!(is_pair_char(ch), "{ch}");
        }
        assert!(!is_pair_char('i'));
        assert!(!is_pair_char('s'));
    }

    #[test]
    fn selector_display() {
        assert_eq!(Selector::Inside.to_string(), "inside");
        assert_eq!(Selector::Around.to_string(), "around");
    }
}
