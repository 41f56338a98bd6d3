//! Document trees — what the flat text view is reconstructed from.
//!
//! Hosts expose their document through [`DocumentTree`]: parent links,
//! ordered children, a node name, and leaf text. The engine never mutates
//! a document and never holds node handles across keystrokes.
//!
//! [`Document`] is an arena implementation for hosts that build their own
//! tree (the reference binary, the markup loader, tests).

use std::fmt;

/// Read-only access to a tree of elements and text leaves.
pub trait DocumentTree {
    /// Handle to one node. Cheap to copy and compare.
    type NodeId: Copy + Eq + fmt::Debug;

    /// The parent of `node`, `None` at the root.
    fn parent(&self, node: Self::NodeId) -> Option<Self::NodeId>;

    /// Children of `node` in document order.
    fn children(&self, node: Self::NodeId) -> &[Self::NodeId];

    /// What kind of node this is.
    fn node_name(&self, node: Self::NodeId) -> NodeName<'_>;

    /// Textual content of a text leaf. `None` for nodes with no text.
    fn leaf_text(&self, node: Self::NodeId) -> Option<&str>;
}

/// The name of a node, as a DOM would report it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeName<'a> {
    /// An element, by tag name (`div`, `span`, ...).
    Element(&'a str),
    /// `#text`
    Text,
    /// `#comment`
    Comment,
}

impl<'a> NodeName<'a> {
    /// The element tag, if this is an element.
    #[must_use]
    pub const fn tag(self) -> Option<&'a str> {
        match self {
            Self::Element(tag) => Some(tag),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Arena document
// ---------------------------------------------------------------------------

/// Index of a node inside a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
enum NodeData {
    Element(String),
    Text(String),
    Comment(String),
}

#[derive(Debug, Clone)]
struct Node {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// An owned, append-only document tree.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Document {
    /// A document holding a single root element.
    #[must_use]
    pub fn new(root_tag: &str) -> Self {
        Self {
            nodes: vec![Node {
                data: NodeData::Element(root_tag.to_ascii_lowercase()),
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// The root element.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Number of nodes, root included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always `false`: a document has at least its root.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    fn push(&mut self, parent: NodeId, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            data,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Append an element as the last child of `parent`.
    pub fn append_element(&mut self, parent: NodeId, tag: &str) -> NodeId {
        self.push(parent, NodeData::Element(tag.to_ascii_lowercase()))
    }

    /// Append a text leaf as the last child of `parent`.
    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        self.push(parent, NodeData::Text(text.to_string()))
    }

    /// Append a comment as the last child of `parent`.
    pub fn append_comment(&mut self, parent: NodeId, text: &str) -> NodeId {
        self.push(parent, NodeData::Comment(text.to_string()))
    }

    /// Build a `body` of paragraphs from plain text.
    ///
    /// Blank lines separate paragraphs; each paragraph is a `div` holding
    /// one text leaf per line. Line breaks inside a paragraph stay on the
    /// end of their line's leaf.
    #[must_use]
    pub fn from_plain_text(text: &str) -> Self {
        let mut paragraphs: Vec<Vec<&str>> = Vec::new();
        let mut current = Vec::new();
        for line in text.split_inclusive('\n') {
            if line.trim().is_empty() {
                if !current.is_empty() {
                    paragraphs.push(std::mem::take(&mut current));
                }
            } else {
                current.push(line);
            }
        }
        if !current.is_empty() {
            paragraphs.push(current);
        }

        let mut doc = Self::new("body");
        let root = doc.root();
        for lines in paragraphs {
            let div = doc.append_element(root, "div");
            let last = lines.len() - 1;
            for (i, line) in lines.into_iter().enumerate() {
                // A paragraph's last line keeps no trailing newline.
                let line = if i == last {
                    line.trim_end_matches(['\n', '\r'])
                } else {
                    line
                };
                doc.append_text(div, line);
            }
        }
        doc
    }

    /// Content of a comment node.
    #[must_use]
    pub fn comment_text(&self, node: NodeId) -> Option<&str> {
        match self.nodes.get(node.0).map(|n| &n.data) {
            Some(NodeData::Comment(text)) => Some(text),
            _ => None,
        }
    }

    /// All text leaves in document order.
    #[must_use]
    pub fn text_leaves(&self) -> Vec<NodeId> {
        crate::flatten::DocumentOrder::new(self, self.root())
            .filter(|&id| matches!(self.nodes[id.0].data, NodeData::Text(_)))
            .collect()
    }
}

impl DocumentTree for Document {
    type NodeId = NodeId;

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node.0).and_then(|n| n.parent)
    }

    fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes.get(node.0).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    fn node_name(&self, node: NodeId) -> NodeName<'_> {
        match self.nodes.get(node.0).map(|n| &n.data) {
            Some(NodeData::Element(tag)) => NodeName::Element(tag),
            Some(NodeData::Comment(_)) => NodeName::Comment,
            Some(NodeData::Text(_)) | None => NodeName::Text,
        }
    }

    fn leaf_text(&self, node: NodeId) -> Option<&str> {
        match self.nodes.get(node.0).map(|n| &n.data) {
            Some(NodeData::Text(text)) => Some(text),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
