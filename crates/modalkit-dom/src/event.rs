#![forbid(unsafe_code)]

//! Event vocabulary and listener identity.
//!
//! Listeners are tagged with a [`Namespace`] so every handler belonging to
//! one dialog instance can be removed in a single call, without touching
//! unrelated handlers. Namespaces are process-unique and never reused.

use crate::node::NodeId;
use std::sync::atomic::{AtomicU64, Ordering};

/// Kinds of events the document dispatches.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum EventKind {
    /// Activation of an element (mouse click or keyboard activation).
    Click,
    /// A key pressed while the document has input.
    KeyDown,
    /// A form-like container was submitted.
    Submit,
}

/// Keys the document can report. Only [`Key::Escape`] carries dialog
/// semantics; the rest exist for embedders and tests.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Key {
    Escape,
    Enter,
    Tab,
    Char(char),
}

/// Where a listener is attached.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum EventTarget {
    /// Document level: sees every event of its kind.
    Document,
    /// A specific node; also sees events bubbling up from descendants.
    Node(NodeId),
}

/// Payload handed to listeners.
#[derive(Clone, Copy, Debug)]
pub struct EventCtx {
    /// Originating node, when the event has one.
    pub target: Option<NodeId>,
    /// Key for [`EventKind::KeyDown`] events.
    pub key: Option<Key>,
}

static NEXT_NAMESPACE: AtomicU64 = AtomicU64::new(1);

/// Removal group tag for listeners.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Namespace(u64);

impl Namespace {
    /// Allocate a process-unique namespace.
    pub fn fresh() -> Self {
        Self(NEXT_NAMESPACE.fetch_add(1, Ordering::Relaxed))
    }

    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Handle to a single registered listener.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ListenerId(pub(crate) u64);
