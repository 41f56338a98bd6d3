//! Text reconstruction — one flat string from a fragmented subtree.
//!
//! Markup splits text into many adjacent leaves: `the (<b>quick</b>) fox`
//! is three text nodes. The selection only knows one of them and an
//! offset local to it. To match delimiters across fragments we:
//!
//! 1. Walk up from the anchor to the nearest block element (the scan root).
//! 2. Concatenate every text leaf under the root, in document order.
//! 3. Count the characters of leaf text that precede the anchor. That
//!    count is the offset correction: local offset + correction = index
//!    into the flat view.
//!
//! The view is rebuilt on every chord; nothing here is cached.

use crate::document::DocumentTree;

/// The flat text view of a scan root plus the anchor's offset correction.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FlatText {
    /// Concatenated leaf text of the scan root.
    pub text: String,
    /// Characters of leaf text before the anchor node.
    pub offset: usize,
}

impl FlatText {
    /// Translate an offset local to the anchor into a flat index.
    #[inline]
    #[must_use]
    pub const fn to_flat(&self, local: usize) -> usize {
        self.offset.saturating_add(local)
    }

    /// Length of the view in characters.
    #[must_use]
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Depth-first, pre-order traversal of a subtree with an explicit stack.
///
/// The iterator is lazy: dropping it stops the walk.
pub struct DocumentOrder<'d, D: DocumentTree + ?Sized> {
    doc: &'d D,
    stack: Vec<D::NodeId>,
}

impl<'d, D: DocumentTree + ?Sized> DocumentOrder<'d, D> {
    /// Walk `root` and all of its descendants.
    pub fn new(doc: &'d D, root: D::NodeId) -> Self {
        Self {
            doc,
            stack: vec![root],
        }
    }
}

impl<D: DocumentTree + ?Sized> Iterator for DocumentOrder<'_, D> {
    type Item = D::NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        // Reverse so the first child is popped first.
        self.stack
            .extend(self.doc.children(node).iter().rev().copied());
        Some(node)
    }
}

/// The nearest ancestor of `node` (itself included) whose tag satisfies
/// `is_block`. Falls back to the topmost ancestor.
pub fn scan_root<D, F>(doc: &D, node: D::NodeId, is_block: F) -> D::NodeId
where
    D: DocumentTree + ?Sized,
    F: Fn(&str) -> bool,
{
    let mut current = node;
    loop {
        if doc.node_name(current).tag().is_some_and(&is_block) {
            return current;
        }
        match doc.parent(current) {
            Some(parent) => current = parent,
            None => return current,
        }
    }
}

/// Build the flat text view around `anchor`.
///
/// The view always holds the whole scan root, since the right-hand scan
/// needs the text after the anchor. Offset accumulation stops the moment
/// the anchor is reached; an element anchor counts the text before it.
pub fn flatten<D, F>(doc: &D, anchor: D::NodeId, is_block: F) -> FlatText
where
    D: DocumentTree + ?Sized,
    F: Fn(&str) -> bool,
{
    let root = scan_root(doc, anchor, is_block);
    let mut flat = FlatText::default();
    let mut reached = false;

    for node in DocumentOrder::new(doc, root) {
        reached |= node == anchor;
        if !doc.children(node).is_empty() {
            continue;
        }
        let Some(text) = doc.leaf_text(node) else {
            continue;
        };
        if !reached {
            flat.offset += text.chars().count();
        }
        flat.text.push_str(text);
    }

    tracing::debug!(
        target: "textyank::flatten",
        len = flat.text.len(),
        offset = flat.offset,
        "flattened scan root"
    );
    flat
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
