#![forbid(unsafe_code)]

//! Namespaced listener registration for one dialog instance.
//!
//! Every listener a dialog installs, on its own nodes or at document
//! level, goes through one [`EventBinder`] carrying a fresh
//! [`Namespace`]. Teardown is then a single [`EventBinder::detach_all`]
//! call that removes the whole group atomically, leaving unrelated
//! listeners (other embedder code on the same document) untouched.

use modalkit_dom::{Document, EventCtx, EventKind, EventTarget, ListenerId, Namespace, NodeId};
use smallvec::SmallVec;

pub struct EventBinder {
    document: Document,
    ns: Namespace,
    handles: SmallVec<[ListenerId; 4]>,
}

impl EventBinder {
    /// Bind against `document` under a fresh namespace.
    pub fn new(document: Document) -> Self {
        Self {
            document,
            ns: Namespace::fresh(),
            handles: SmallVec::new(),
        }
    }

    /// The namespace all registrations share.
    pub fn namespace(&self) -> Namespace {
        self.ns
    }

    /// Register a handler on a node (sees bubbled events too).
    pub fn on_node(
        &mut self,
        node: NodeId,
        kind: EventKind,
        handler: impl Fn(&EventCtx) + 'static,
    ) {
        let id = self
            .document
            .on(EventTarget::Node(node), kind, self.ns, handler);
        self.handles.push(id);
    }

    /// Register a document-level handler.
    pub fn on_document(&mut self, kind: EventKind, handler: impl Fn(&EventCtx) + 'static) {
        let id = self.document.on(EventTarget::Document, kind, self.ns, handler);
        self.handles.push(id);
    }

    /// Remove every listener in this namespace in one call.
    pub fn detach_all(&mut self) {
        self.document.off_namespace(self.ns);
        self.handles.clear();
    }

    /// How many of this binder's listeners are still registered.
    pub fn live_count(&self) -> usize {
        self.document.namespace_listener_count(self.ns)
    }
}

impl Drop for EventBinder {
    fn drop(&mut self) {
        self.document.off_namespace(self.ns);
    }
}
