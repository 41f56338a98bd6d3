//! Boundary search — find the delimiters around a selection.
//!
//! The scan walks outward from both ends of the selection at once, one
//! step per side per iteration. The left side stops at the first `left`
//! character it meets, the right side at the first `right` character:
//!
//! ```text
//! the (quick) fox
//!     ^ ←←←  →→^      left scan from 'q', right scan from ')'
//! ```
//!
//! There is no depth tracking. In `f(a(b)c)` with the cursor on `a`, the
//! left side finds the outer `(` and the right side finds the inner `)`,
//! yielding `a(b`. Nearest occurrence wins on each side.
//!
//! Identical delimiters (quotes) are searched the same way. When both
//! scans start on the same index and that index holds the delimiter, the
//! left side claims it and the right side keeps going.

use crate::delimiter::{Delimiter, Selector};
use crate::error::YankError;
use crate::flatten::FlatText;

/// Yank the span around `cursor` from the flat text view.
///
/// `cursor` holds the selection's start and end offsets local to the
/// anchor node; the view's offset correction turns them into flat indices.
/// The start must not exceed the end.
///
/// # Errors
///
/// [`YankError::BoundaryNotFound`] when either delimiter is missing.
pub fn search(
    flat: &FlatText,
    cursor: (usize, usize),
    delimiter: Delimiter,
    selector: Selector,
) -> Result<String, YankError> {
    let (left, right) = match delimiter {
        Delimiter::Line => return Ok(flat.text.clone()),
        Delimiter::Pair { left, right } => (left, right),
    };

    let chars: Vec<char> = flat.text.chars().collect();
    let start = flat.to_flat(cursor.0);
    let end = flat.to_flat(cursor.1);

    let (open, close) = find_boundaries(&chars, start, end, left, right)
        .ok_or(YankError::BoundaryNotFound { left, right })?;

    let span = match selector {
        Selector::Inside => &chars[open + 1..close],
        Selector::Around => &chars[open..=close],
    };
    Ok(span.iter().collect())
}

/// Find the `(open, close)` indices of the nearest `left` at or before
/// `start` and the nearest `right` at or after `end`.
///
/// Both scans advance in lockstep and stop independently. The search
/// gives up once each side has either found its character or run off
/// its end of `text`. The returned indices always satisfy `open < close`.
#[must_use]
pub fn find_boundaries(
    text: &[char],
    start: usize,
    end: usize,
    left: char,
    right: char,
) -> Option<(usize, usize)> {
    let len = text.len();
    let mut down = Some(start);
    let mut up = end.max(start);
    let mut open: Option<usize> = None;
    let mut close: Option<usize> = None;

    loop {
        let left_done = open.is_some() || down.is_none();
        let right_done = close.is_some() || up >= len;
        if left_done && right_done {
            break;
        }

        if open.is_none() {
            if let Some(i) = down {
                if text.get(i) == Some(&left) {
                    open = Some(i);
                }
                down = i.checked_sub(1);
            }
        }

        if close.is_none() && up < len {
            if text[up] == right && open != Some(up) {
                close = Some(up);
            }
            up += 1;
        }
    }

    open.zip(close)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
