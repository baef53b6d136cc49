#![forbid(unsafe_code)]

//! Node identity, content, and flags for the document tree.

use ahash::AHashMap;
use bitflags::bitflags;
use smallvec::SmallVec;
use std::fmt;

/// Handle to a node in a [`Document`](crate::Document).
///
/// Handles are never reused; a handle whose node has been removed simply
/// stops resolving.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct NodeId(pub(crate) u64);

impl NodeId {
    /// Raw identifier value.
    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

bitflags! {
    /// Per-node state bits.
    #[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
    pub struct NodeFlags: u8 {
        /// Node (and its subtree) is not presented.
        const HIDDEN = 1 << 0;
        /// Form control is disabled: never focusable, never serialized.
        const DISABLED = 1 << 1;
    }
}

/// What a node holds: an element with a tag and attributes, or raw text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeContent {
    Element {
        tag: String,
        attrs: AHashMap<String, String>,
    },
    Text(String),
}

#[derive(Clone, Debug)]
pub(crate) struct Node {
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: SmallVec<[NodeId; 4]>,
    pub(crate) content: NodeContent,
    pub(crate) flags: NodeFlags,
}

impl Node {
    pub(crate) fn tag(&self) -> Option<&str> {
        match &self.content {
            NodeContent::Element { tag, .. } => Some(tag),
            NodeContent::Text(_) => None,
        }
    }

    pub(crate) fn attr(&self, name: &str) -> Option<&str> {
        match &self.content {
            NodeContent::Element { attrs, .. } => attrs.get(name).map(String::as_str),
            NodeContent::Text(_) => None,
        }
    }

    /// Whether this node can receive focus (tag-based, like the host DOM).
    pub(crate) fn is_focusable(&self) -> bool {
        if self.flags.intersects(NodeFlags::DISABLED | NodeFlags::HIDDEN) {
            return false;
        }
        matches!(
            self.tag(),
            Some("input" | "textarea" | "select" | "button")
        )
    }
}
