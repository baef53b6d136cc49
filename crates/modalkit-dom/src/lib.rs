#![forbid(unsafe_code)]

//! In-memory host document for modalkit.
//!
//! This crate plays the part of the page a dialog library runs against: a
//! retained element tree, a tiny markup dialect for building fragments,
//! synthetic input events with bubbling, namespaced listener registration,
//! and focus with trap support.
//!
//! It is deliberately small. There is no layout, no styling, and no real
//! input source; events enter through the synthetic [`Document::click`],
//! [`Document::key_down`], and [`Document::submit`] calls a test or
//! embedder makes. What it does model, it models strictly, because the
//! dialog layer's guarantees (single active dialog, exactly-once
//! settlement, no leaked handlers) lean on this crate's invariants:
//!
//! - Node handles are process-unique and never reused.
//! - Removing a subtree removes its listeners and traps with it.
//! - [`Document::off_namespace`] detaches a whole listener group
//!   atomically, and in-flight dispatch respects the detachment.
//! - An installed focus trap makes it impossible for focus to land
//!   outside the trap root.

pub mod document;
pub mod event;
pub mod markup;
pub mod node;

pub use document::{Document, FocusOutcome, TrapId};
pub use event::{EventCtx, EventKind, EventTarget, Key, ListenerId, Namespace};
pub use markup::{MAX_DEPTH, MarkupError, MarkupNode, escape_text, parse_element, parse_fragment};
pub use node::{NodeContent, NodeFlags, NodeId};
