//! The host's current selection.
//!
//! Mirrors what a DOM selection reports: its type, the anchor node, and two
//! offsets local to that node (anchor and focus). A backward selection has
//! its focus before its anchor; [`Selection::bounds`] orders them.

/// Selection type as a DOM reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionKind {
    /// Nothing selected.
    #[default]
    None,
    /// A zero-width insertion point.
    Caret,
    /// A non-empty range.
    Range,
}

/// A selection anchored in one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection<N> {
    pub kind: SelectionKind,
    pub anchor: N,
    pub anchor_offset: usize,
    pub focus_offset: usize,
}

impl<N: Copy> Selection<N> {
    /// A range from `start` to `end` inside `anchor`. Equal offsets make a caret.
    pub fn new(anchor: N, start: usize, end: usize) -> Self {
        let kind = if start == end {
            SelectionKind::Caret
        } else {
            SelectionKind::Range
        };
        Self {
            kind,
            anchor,
            anchor_offset: start,
            focus_offset: end,
        }
    }

    /// A caret at `offset` inside `anchor`.
    pub fn caret(anchor: N, offset: usize) -> Self {
        Self::new(anchor, offset, offset)
    }

    /// True for a zero-width caret.
    #[must_use]
    pub fn is_caret(&self) -> bool {
        self.kind == SelectionKind::Caret
    }

    /// `(start, end)` local offsets, smallest first.
    #[must_use]
    pub fn bounds(&self) -> (usize, usize) {
        let (a, f) = (self.anchor_offset, self.focus_offset);
        (a.min(f), a.max(f))
    }
}
