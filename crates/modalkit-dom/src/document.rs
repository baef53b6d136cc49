#![forbid(unsafe_code)]

//! The in-memory host document.
//!
//! [`Document`] is a cheap-to-clone handle (`Rc` inside) to a retained node
//! tree plus the ambient state dialogs rely on: the focused element, the
//! focus-trap stack, and the namespaced listener registry. It is
//! single-threaded by construction; "waiting" callers observe events only
//! through the handlers they registered.
//!
//! # Invariants
//!
//! 1. Node handles are never reused; operations on removed nodes are no-ops
//!    (queries return `None`/`false`).
//! 2. Removing a subtree also removes its listeners, any focus trap rooted
//!    in it, and clears focus if the focused element was inside.
//! 3. Dispatch snapshots the matching listeners and re-checks each one is
//!    still registered before invoking it, so a handler that removes a
//!    namespace suppresses the rest of that namespace mid-event.
//! 4. While a focus trap is active, focus cannot land outside the trap
//!    root: the move is suppressed and focus is forced onto the first
//!    focusable element inside the root.

use crate::event::{EventCtx, EventKind, EventTarget, Key, ListenerId, Namespace};
use crate::markup::{self, MarkupError, MarkupNode};
use crate::node::{Node, NodeContent, NodeFlags, NodeId};
use ahash::AHashMap;
use smallvec::SmallVec;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tracing::{debug, trace};

/// Result of a [`Document::focus`] request.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FocusOutcome {
    /// Focus moved to the requested node.
    Moved,
    /// A focus trap suppressed the move and redirected focus here.
    Redirected(NodeId),
    /// The request was dropped (missing/unfocusable node, or a trap with
    /// nothing focusable inside). Focus is unchanged.
    Blocked,
}

/// Handle to an installed focus trap.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct TrapId(u64);

type Handler = Rc<dyn Fn(&EventCtx)>;

struct ListenerEntry {
    id: ListenerId,
    target: EventTarget,
    kind: EventKind,
    ns: Namespace,
    handler: Handler,
}

struct TrapEntry {
    id: TrapId,
    root: NodeId,
}

struct DocInner {
    nodes: RefCell<AHashMap<NodeId, Node>>,
    body: NodeId,
    focused: Cell<Option<NodeId>>,
    listeners: RefCell<Vec<ListenerEntry>>,
    traps: RefCell<Vec<TrapEntry>>,
    next_node: Cell<u64>,
    next_listener: Cell<u64>,
    next_trap: Cell<u64>,
}

/// The in-memory host document. Clones share the same tree.
#[derive(Clone)]
pub struct Document {
    inner: Rc<DocInner>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("nodes", &self.inner.nodes.borrow().len())
            .field("listeners", &self.inner.listeners.borrow().len())
            .field("focused", &self.inner.focused.get())
            .finish()
    }
}

impl Document {
    /// Create an empty document with a `body` root element.
    pub fn new() -> Self {
        let body = NodeId(1);
        let mut nodes = AHashMap::new();
        nodes.insert(
            body,
            Node {
                parent: None,
                children: SmallVec::new(),
                content: NodeContent::Element {
                    tag: "body".to_string(),
                    attrs: AHashMap::new(),
                },
                flags: NodeFlags::empty(),
            },
        );
        Self {
            inner: Rc::new(DocInner {
                nodes: RefCell::new(nodes),
                body,
                focused: Cell::new(None),
                listeners: RefCell::new(Vec::new()),
                traps: RefCell::new(Vec::new()),
                next_node: Cell::new(2),
                next_listener: Cell::new(1),
                next_trap: Cell::new(1),
            }),
        }
    }

    /// The root element every attached node descends from.
    #[inline]
    pub fn body(&self) -> NodeId {
        self.inner.body
    }

    // --- Construction ---

    fn alloc(&self, content: NodeContent, flags: NodeFlags) -> NodeId {
        let id = NodeId(self.inner.next_node.get());
        self.inner.next_node.set(id.0 + 1);
        self.inner.nodes.borrow_mut().insert(
            id,
            Node {
                parent: None,
                children: SmallVec::new(),
                content,
                flags,
            },
        );
        id
    }

    fn instantiate(&self, ast: &MarkupNode) -> NodeId {
        match ast {
            MarkupNode::Text(text) => {
                self.alloc(NodeContent::Text(text.clone()), NodeFlags::empty())
            }
            MarkupNode::Element {
                tag,
                attrs,
                children,
            } => {
                let mut map = AHashMap::with_capacity(attrs.len());
                let mut flags = NodeFlags::empty();
                for (name, value) in attrs {
                    if name == "disabled" {
                        flags |= NodeFlags::DISABLED;
                    }
                    map.insert(name.clone(), value.clone());
                }
                let id = self.alloc(
                    NodeContent::Element {
                        tag: tag.clone(),
                        attrs: map,
                    },
                    flags,
                );
                for child_ast in children {
                    let child = self.instantiate(child_ast);
                    self.attach(id, child);
                }
                id
            }
        }
    }

    /// Create a detached element tree from markup with a single root.
    pub fn create(&self, markup_src: &str) -> Result<NodeId, MarkupError> {
        let ast = markup::parse_element(markup_src)?;
        Ok(self.instantiate(&ast))
    }

    // --- Tree structure ---

    /// Append `child` under `parent`, detaching it from any previous parent.
    /// No-op when either node is gone or the move would create a cycle.
    pub fn append(&self, parent: NodeId, child: NodeId) {
        if !self.exists(parent) || !self.exists(child) || self.contains(child, parent) {
            trace!(parent = parent.raw(), child = child.raw(), "append dropped");
            return;
        }
        self.detach(child);
        self.attach(parent, child);
    }

    fn attach(&self, parent: NodeId, child: NodeId) {
        let mut nodes = self.inner.nodes.borrow_mut();
        if let Some(node) = nodes.get_mut(&child) {
            node.parent = Some(parent);
        }
        if let Some(node) = nodes.get_mut(&parent) {
            node.children.push(child);
        }
    }

    fn detach(&self, node: NodeId) {
        let mut nodes = self.inner.nodes.borrow_mut();
        let parent = nodes.get(&node).and_then(|n| n.parent);
        if let Some(parent) = parent {
            if let Some(p) = nodes.get_mut(&parent) {
                p.children.retain(|c| *c != node);
            }
            if let Some(n) = nodes.get_mut(&node) {
                n.parent = None;
            }
        }
    }

    /// Remove a node and its whole subtree: detaches it, drops its
    /// listeners, releases traps rooted inside, and clears focus if the
    /// focused element was inside.
    pub fn remove(&self, node: NodeId) {
        if !self.exists(node) {
            return;
        }
        let doomed = self.collect_subtree(node);
        self.detach(node);
        {
            let mut nodes = self.inner.nodes.borrow_mut();
            for id in &doomed {
                nodes.remove(id);
            }
        }
        self.inner
            .listeners
            .borrow_mut()
            .retain(|entry| match entry.target {
                EventTarget::Document => true,
                EventTarget::Node(n) => !doomed.contains(&n),
            });
        self.inner
            .traps
            .borrow_mut()
            .retain(|trap| !doomed.contains(&trap.root));
        if let Some(focused) = self.inner.focused.get()
            && doomed.contains(&focused)
        {
            self.inner.focused.set(None);
        }
        trace!(root = node.raw(), removed = doomed.len(), "subtree removed");
    }

    fn collect_subtree(&self, root: NodeId) -> Vec<NodeId> {
        let nodes = self.inner.nodes.borrow();
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if let Some(node) = nodes.get(&id) {
                out.push(id);
                stack.extend(node.children.iter().copied());
            }
        }
        out
    }

    /// Whether the node is still part of this document (possibly detached).
    pub fn exists(&self, node: NodeId) -> bool {
        self.inner.nodes.borrow().contains_key(&node)
    }

    /// Whether the node's ancestor chain reaches `body`.
    pub fn is_attached(&self, node: NodeId) -> bool {
        let nodes = self.inner.nodes.borrow();
        let mut current = node;
        loop {
            if current == self.inner.body {
                return true;
            }
            match nodes.get(&current).and_then(|n| n.parent) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    /// Whether `node` is `root` or one of its descendants.
    pub fn contains(&self, root: NodeId, node: NodeId) -> bool {
        let nodes = self.inner.nodes.borrow();
        let mut current = node;
        loop {
            if current == root {
                return true;
            }
            match nodes.get(&current).and_then(|n| n.parent) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    /// Child handles in document order.
    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.inner
            .nodes
            .borrow()
            .get(&node)
            .map(|n| n.children.to_vec())
            .unwrap_or_default()
    }

    fn path_to_root(&self, node: NodeId) -> Vec<NodeId> {
        let nodes = self.inner.nodes.borrow();
        let mut path = Vec::new();
        let mut current = Some(node);
        while let Some(id) = current {
            path.push(id);
            current = nodes.get(&id).and_then(|n| n.parent);
        }
        path
    }

    // --- Content ---

    /// Element tag name, `None` for text nodes and removed nodes.
    pub fn tag(&self, node: NodeId) -> Option<String> {
        self.inner
            .nodes
            .borrow()
            .get(&node)
            .and_then(|n| n.tag().map(str::to_string))
    }

    /// Attribute value.
    pub fn attr(&self, node: NodeId, name: &str) -> Option<String> {
        self.inner
            .nodes
            .borrow()
            .get(&node)
            .and_then(|n| n.attr(name).map(str::to_string))
    }

    /// Attributes sorted by name (deterministic for assertions).
    pub fn attrs(&self, node: NodeId) -> Vec<(String, String)> {
        let mut out: Vec<(String, String)> = match self.inner.nodes.borrow().get(&node) {
            Some(Node {
                content: NodeContent::Element { attrs, .. },
                ..
            }) => attrs.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            _ => Vec::new(),
        };
        out.sort();
        out
    }

    /// Set an attribute value.
    pub fn set_attr(&self, node: NodeId, name: &str, value: &str) {
        let mut nodes = self.inner.nodes.borrow_mut();
        if let Some(Node {
            content: NodeContent::Element { attrs, .. },
            flags,
            ..
        }) = nodes.get_mut(&node)
        {
            if name == "disabled" {
                *flags |= NodeFlags::DISABLED;
            }
            attrs.insert(name.to_string(), value.to_string());
        }
    }

    /// Set a form control's current value (what a user typed).
    pub fn set_value(&self, node: NodeId, value: &str) {
        self.set_attr(node, "value", value);
    }

    /// Concatenated text of all text descendants.
    pub fn text_content(&self, node: NodeId) -> String {
        let nodes = self.inner.nodes.borrow();
        let mut out = String::new();
        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            if let Some(n) = nodes.get(&id) {
                match &n.content {
                    NodeContent::Text(text) => out.push_str(text),
                    NodeContent::Element { .. } => {
                        // Reverse so document order survives the stack.
                        stack.extend(n.children.iter().rev().copied());
                    }
                }
            }
        }
        out
    }

    /// Replace all children with a single literal text node (never parsed).
    pub fn set_text(&self, node: NodeId, text: &str) {
        self.clear_children(node);
        let child = self.alloc(NodeContent::Text(text.to_string()), NodeFlags::empty());
        self.attach(node, child);
    }

    /// Replace all children with a parsed markup fragment.
    pub fn set_markup(&self, node: NodeId, markup_src: &str) -> Result<(), MarkupError> {
        let fragment = markup::parse_fragment(markup_src)?;
        self.clear_children(node);
        for ast in &fragment {
            let child = self.instantiate(ast);
            self.attach(node, child);
        }
        Ok(())
    }

    fn clear_children(&self, node: NodeId) {
        for child in self.children(node) {
            self.remove(child);
        }
    }

    /// A copy of the node's content, for inspection by harnesses.
    pub fn content(&self, node: NodeId) -> Option<NodeContent> {
        self.inner.nodes.borrow().get(&node).map(|n| n.content.clone())
    }

    /// Toggle the hidden bit. Not inherited: hiding a panel does not mark
    /// its children hidden.
    pub fn set_hidden(&self, node: NodeId, hidden: bool) {
        let mut nodes = self.inner.nodes.borrow_mut();
        if let Some(n) = nodes.get_mut(&node) {
            n.flags.set(NodeFlags::HIDDEN, hidden);
        }
    }

    pub fn is_hidden(&self, node: NodeId) -> bool {
        self.inner
            .nodes
            .borrow()
            .get(&node)
            .is_some_and(|n| n.flags.contains(NodeFlags::HIDDEN))
    }

    // --- Queries ---

    /// First descendant (depth-first, including `root`) whose `slot`
    /// attribute equals `name`.
    pub fn find_slot(&self, root: NodeId, name: &str) -> Option<NodeId> {
        self.find_by_attr(root, "slot", name)
    }

    /// First descendant (depth-first, including `root`) with `key="value"`.
    pub fn find_by_attr(&self, root: NodeId, key: &str, value: &str) -> Option<NodeId> {
        let nodes = self.inner.nodes.borrow();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if let Some(node) = nodes.get(&id) {
                if node.attr(key) == Some(value) {
                    return Some(id);
                }
                stack.extend(node.children.iter().rev().copied());
            }
        }
        None
    }

    /// First focusable element in document order within `root` (inclusive).
    pub fn first_focusable(&self, root: NodeId) -> Option<NodeId> {
        let nodes = self.inner.nodes.borrow();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if let Some(node) = nodes.get(&id) {
                if node.is_focusable() {
                    return Some(id);
                }
                stack.extend(node.children.iter().rev().copied());
            }
        }
        None
    }

    /// Named form fields under `root` in document order, as name/value
    /// pairs. Disabled controls are skipped; duplicate names are reported
    /// as-is (callers decide the merge policy).
    pub fn serialize_fields(&self, root: NodeId) -> Vec<(String, String)> {
        let nodes = self.inner.nodes.borrow();
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if let Some(node) = nodes.get(&id) {
                if matches!(node.tag(), Some("input" | "textarea" | "select"))
                    && !node.flags.contains(NodeFlags::DISABLED)
                    && let Some(name) = node.attr("name")
                    && !name.is_empty()
                {
                    let value = node.attr("value").unwrap_or("").to_string();
                    out.push((name.to_string(), value));
                }
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }

    // --- Focus ---

    /// Currently focused element, if any.
    pub fn focused(&self) -> Option<NodeId> {
        self.inner.focused.get()
    }

    /// Request focus. Subject to the active focus trap: a request outside
    /// the trap root is suppressed and redirected inside.
    pub fn focus(&self, node: NodeId) -> FocusOutcome {
        let focusable = self
            .inner
            .nodes
            .borrow()
            .get(&node)
            .is_some_and(Node::is_focusable);
        if !focusable {
            return FocusOutcome::Blocked;
        }
        let trap_root = self.inner.traps.borrow().last().map(|t| t.root);
        if let Some(root) = trap_root
            && !self.contains(root, node)
        {
            // Hard trap: suppress the stray move and pull focus back in.
            return match self.first_focusable(root) {
                Some(inside) => {
                    self.inner.focused.set(Some(inside));
                    debug!(
                        stray = node.raw(),
                        redirected = inside.raw(),
                        "focus redirected into trap"
                    );
                    FocusOutcome::Redirected(inside)
                }
                None => FocusOutcome::Blocked,
            };
        }
        self.inner.focused.set(Some(node));
        FocusOutcome::Moved
    }

    /// Drop focus if `node` currently holds it.
    pub fn blur(&self, node: NodeId) {
        if self.inner.focused.get() == Some(node) {
            self.inner.focused.set(None);
        }
    }

    /// Install a focus trap confining focus to `root`'s subtree. Traps
    /// stack; the most recent one wins.
    pub fn push_focus_trap(&self, root: NodeId) -> TrapId {
        let id = TrapId(self.inner.next_trap.get());
        self.inner.next_trap.set(id.0 + 1);
        self.inner.traps.borrow_mut().push(TrapEntry { id, root });
        debug!(root = root.raw(), "focus trap installed");
        id
    }

    /// Remove a trap by handle (no-op if already gone).
    pub fn release_focus_trap(&self, id: TrapId) {
        self.inner.traps.borrow_mut().retain(|t| t.id != id);
        debug!("focus trap released");
    }

    /// Root of the trap currently in force.
    pub fn active_trap_root(&self) -> Option<NodeId> {
        self.inner.traps.borrow().last().map(|t| t.root)
    }

    // --- Listeners ---

    /// Register a listener under a namespace. Returns a handle usable with
    /// [`Document::off`].
    pub fn on(
        &self,
        target: EventTarget,
        kind: EventKind,
        ns: Namespace,
        handler: impl Fn(&EventCtx) + 'static,
    ) -> ListenerId {
        let id = ListenerId(self.inner.next_listener.get());
        self.inner.next_listener.set(id.0 + 1);
        self.inner.listeners.borrow_mut().push(ListenerEntry {
            id,
            target,
            kind,
            ns,
            handler: Rc::new(handler),
        });
        trace!(listener = id.0, ns = ns.raw(), ?kind, "listener added");
        id
    }

    /// Remove a single listener.
    pub fn off(&self, id: ListenerId) {
        self.inner.listeners.borrow_mut().retain(|e| e.id != id);
    }

    /// Remove every listener registered under `ns`, in one call.
    pub fn off_namespace(&self, ns: Namespace) {
        let mut listeners = self.inner.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|e| e.ns != ns);
        trace!(
            ns = ns.raw(),
            removed = before - listeners.len(),
            "namespace detached"
        );
    }

    /// Total registered listeners (leak checks).
    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }

    /// Registered listeners under one namespace.
    pub fn namespace_listener_count(&self, ns: Namespace) -> usize {
        self.inner.listeners.borrow().iter().filter(|e| e.ns == ns).count()
    }

    // --- Dispatch ---

    /// Synthetic user activation of `node`. Click listeners fire along the
    /// bubble path; activating a `type="submit"` control then submits the
    /// enclosing `form`.
    pub fn click(&self, node: NodeId) {
        if !self.exists(node) {
            return;
        }
        let path = self.path_to_root(node);
        self.dispatch(
            EventKind::Click,
            &path,
            EventCtx {
                target: Some(node),
                key: None,
            },
        );
        let submits = matches!(self.tag(node).as_deref(), Some("button" | "input"))
            && self.attr(node, "type").as_deref() == Some("submit");
        if submits
            && let Some(form) = path
                .iter()
                .skip(1)
                .copied()
                .find(|id| self.tag(*id).as_deref() == Some("form"))
        {
            self.submit(form);
        }
    }

    /// Synthetic submit of a form-like container.
    pub fn submit(&self, node: NodeId) {
        if !self.exists(node) {
            return;
        }
        let path = self.path_to_root(node);
        self.dispatch(
            EventKind::Submit,
            &path,
            EventCtx {
                target: Some(node),
                key: None,
            },
        );
    }

    /// Synthetic key press. Bubbles from the focused element (if any) and
    /// always reaches document-level listeners.
    pub fn key_down(&self, key: Key) {
        let path = match self.inner.focused.get() {
            Some(node) if self.exists(node) => self.path_to_root(node),
            _ => Vec::new(),
        };
        self.dispatch(
            EventKind::KeyDown,
            &path,
            EventCtx {
                target: self.inner.focused.get(),
                key: Some(key),
            },
        );
    }

    fn dispatch(&self, kind: EventKind, path: &[NodeId], ctx: EventCtx) {
        // Snapshot first: handlers may add or remove listeners.
        let snapshot: Vec<(ListenerId, Handler)> = {
            let listeners = self.inner.listeners.borrow();
            let mut matched = Vec::new();
            for node in path {
                for entry in listeners.iter() {
                    if entry.kind == kind && entry.target == EventTarget::Node(*node) {
                        matched.push((entry.id, Rc::clone(&entry.handler)));
                    }
                }
            }
            for entry in listeners.iter() {
                if entry.kind == kind && entry.target == EventTarget::Document {
                    matched.push((entry.id, Rc::clone(&entry.handler)));
                }
            }
            matched
        };
        trace!(?kind, handlers = snapshot.len(), "dispatch");
        for (id, handler) in snapshot {
            let live = self.inner.listeners.borrow().iter().any(|e| e.id == id);
            if live {
                handler(&ctx);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell as StdRefCell;

    fn doc_with(markup_src: &str) -> (Document, NodeId) {
        let doc = Document::new();
        let node = doc.create(markup_src).expect("fixture markup");
        doc.append(doc.body(), node);
        (doc, node)
    }

    #[test]
    fn create_and_attach() {
        let (doc, node) = doc_with("<div><p>hi</p></div>");
        assert!(doc.is_attached(node));
        assert_eq!(doc.tag(node).as_deref(), Some("div"));
        assert_eq!(doc.text_content(node), "hi");
    }

    #[test]
    fn created_nodes_start_detached() {
        let doc = Document::new();
        let node = doc.create("<div></div>").unwrap();
        assert!(doc.exists(node));
        assert!(!doc.is_attached(node));
    }

    #[test]
    fn remove_drops_subtree() {
        let (doc, node) = doc_with("<div><p><span>x</span></p></div>");
        let p = doc.children(node)[0];
        doc.remove(node);
        assert!(!doc.exists(node));
        assert!(!doc.exists(p));
        assert!(doc.exists(doc.body()));
    }

    #[test]
    fn remove_clears_focus_inside() {
        let (doc, node) = doc_with(r#"<div><input name="a"></div>"#);
        let input = doc.children(node)[0];
        assert_eq!(doc.focus(input), FocusOutcome::Moved);
        doc.remove(node);
        assert_eq!(doc.focused(), None);
    }

    #[test]
    fn remove_drops_node_listeners_but_not_document_ones() {
        let (doc, node) = doc_with("<div></div>");
        let ns = Namespace::fresh();
        doc.on(EventTarget::Node(node), EventKind::Click, ns, |_| {});
        doc.on(EventTarget::Document, EventKind::KeyDown, ns, |_| {});
        assert_eq!(doc.listener_count(), 2);
        doc.remove(node);
        assert_eq!(doc.listener_count(), 1);
    }

    #[test]
    fn append_refuses_cycles() {
        let (doc, outer) = doc_with("<div><p></p></div>");
        let inner = doc.children(outer)[0];
        doc.append(inner, outer);
        // Still parent/child the right way around.
        assert_eq!(doc.children(outer), vec![inner]);
        assert!(doc.children(inner).is_empty());
    }

    #[test]
    fn set_text_is_literal() {
        let (doc, node) = doc_with("<p></p>");
        doc.set_text(node, "<b>bold</b>");
        assert_eq!(doc.text_content(node), "<b>bold</b>");
        assert_eq!(doc.children(node).len(), 1);
    }

    #[test]
    fn set_markup_builds_children() {
        let (doc, node) = doc_with("<p></p>");
        doc.set_markup(node, "<b>bold</b> and plain").unwrap();
        let children = doc.children(node);
        assert_eq!(children.len(), 2);
        assert_eq!(doc.tag(children[0]).as_deref(), Some("b"));
        assert_eq!(doc.text_content(node), "bold and plain");
    }

    #[test]
    fn set_markup_replaces_previous_children() {
        let (doc, node) = doc_with("<p>old</p>");
        doc.set_markup(node, "new").unwrap();
        assert_eq!(doc.text_content(node), "new");
    }

    #[test]
    fn find_slot_depth_first() {
        let (doc, node) = doc_with(
            r#"<form><div><p slot="message"></p></div><div slot="buttons"></div></form>"#,
        );
        let message = doc.find_slot(node, "message").unwrap();
        assert_eq!(doc.tag(message).as_deref(), Some("p"));
        assert!(doc.find_slot(node, "missing").is_none());
    }

    #[test]
    fn first_focusable_in_document_order() {
        let (doc, node) = doc_with(
            r#"<div><span></span><input disabled name="a"><button>ok</button></div>"#,
        );
        let found = doc.first_focusable(node).unwrap();
        assert_eq!(doc.tag(found).as_deref(), Some("button"));
    }

    #[test]
    fn serialize_skips_disabled_and_unnamed() {
        let (doc, node) = doc_with(
            r#"<form><input name="a" value="1"><input disabled name="b" value="2"><input value="3"><input name="c"></form>"#,
        );
        assert_eq!(
            doc.serialize_fields(node),
            vec![
                ("a".to_string(), "1".to_string()),
                ("c".to_string(), String::new()),
            ]
        );
    }

    #[test]
    fn serialize_reports_duplicates_in_order() {
        let (doc, node) =
            doc_with(r#"<form><input name="x" value="1"><input name="x" value="2"></form>"#);
        assert_eq!(
            doc.serialize_fields(node),
            vec![
                ("x".to_string(), "1".to_string()),
                ("x".to_string(), "2".to_string()),
            ]
        );
    }

    #[test]
    fn focus_moves_and_blurs() {
        let (doc, node) = doc_with(r#"<div><input name="a"></div>"#);
        let input = doc.children(node)[0];
        assert_eq!(doc.focus(input), FocusOutcome::Moved);
        assert_eq!(doc.focused(), Some(input));
        doc.blur(input);
        assert_eq!(doc.focused(), None);
    }

    #[test]
    fn focus_non_focusable_blocked() {
        let (doc, node) = doc_with("<div></div>");
        assert_eq!(doc.focus(node), FocusOutcome::Blocked);
        assert_eq!(doc.focused(), None);
    }

    #[test]
    fn trap_redirects_outside_focus() {
        let (doc, outside) = doc_with(r#"<input name="out">"#);
        let panel = doc.create(r#"<form><button type="submit">OK</button></form>"#).unwrap();
        doc.append(doc.body(), panel);
        let ok = doc.children(panel)[0];

        let trap = doc.push_focus_trap(panel);
        assert_eq!(doc.focus(outside), FocusOutcome::Redirected(ok));
        assert_eq!(doc.focused(), Some(ok));

        // Inside the trap focus is free.
        assert_eq!(doc.focus(ok), FocusOutcome::Moved);

        doc.release_focus_trap(trap);
        assert_eq!(doc.focus(outside), FocusOutcome::Moved);
        assert_eq!(doc.focused(), Some(outside));
    }

    #[test]
    fn trap_with_nothing_focusable_blocks() {
        let (doc, outside) = doc_with(r#"<input name="out">"#);
        let (_, empty_panel) = {
            let panel = doc.create("<div></div>").unwrap();
            doc.append(doc.body(), panel);
            (doc.clone(), panel)
        };
        doc.focus(outside);
        let _trap = doc.push_focus_trap(empty_panel);
        assert_eq!(doc.focus(outside), FocusOutcome::Blocked);
        // Unchanged.
        assert_eq!(doc.focused(), Some(outside));
    }

    #[test]
    fn nested_traps_top_wins() {
        let doc = Document::new();
        let a = doc.create(r#"<div><input name="a"></div>"#).unwrap();
        let b = doc.create(r#"<div><input name="b"></div>"#).unwrap();
        doc.append(doc.body(), a);
        doc.append(doc.body(), b);
        let input_a = doc.children(a)[0];
        let input_b = doc.children(b)[0];

        let trap_a = doc.push_focus_trap(a);
        let trap_b = doc.push_focus_trap(b);
        assert_eq!(doc.focus(input_a), FocusOutcome::Redirected(input_b));

        doc.release_focus_trap(trap_b);
        assert_eq!(doc.focus(input_a), FocusOutcome::Moved);
        doc.release_focus_trap(trap_a);
    }

    #[test]
    fn removing_trap_root_releases_trap() {
        let (doc, outside) = doc_with(r#"<input name="out">"#);
        let panel = doc.create(r#"<div><input name="in"></div>"#).unwrap();
        doc.append(doc.body(), panel);
        doc.push_focus_trap(panel);
        doc.remove(panel);
        assert_eq!(doc.active_trap_root(), None);
        assert_eq!(doc.focus(outside), FocusOutcome::Moved);
    }

    #[test]
    fn click_bubbles_target_first() {
        let (doc, outer) = doc_with("<div><p><button>go</button></p></div>");
        let p = doc.children(outer)[0];
        let button = doc.children(p)[0];

        let order = Rc::new(StdRefCell::new(Vec::new()));
        let ns = Namespace::fresh();
        let o1 = Rc::clone(&order);
        doc.on(EventTarget::Node(button), EventKind::Click, ns, move |_| {
            o1.borrow_mut().push("button");
        });
        let o2 = Rc::clone(&order);
        doc.on(EventTarget::Node(outer), EventKind::Click, ns, move |_| {
            o2.borrow_mut().push("outer");
        });

        doc.click(button);
        assert_eq!(*order.borrow(), vec!["button", "outer"]);
    }

    #[test]
    fn submit_button_click_synthesizes_form_submit() {
        let (doc, form) =
            doc_with(r#"<form><button type="submit">OK</button></form>"#);
        let ok = doc.children(form)[0];

        let submitted = Rc::new(StdRefCell::new(false));
        let ns = Namespace::fresh();
        let s = Rc::clone(&submitted);
        doc.on(EventTarget::Node(form), EventKind::Submit, ns, move |_| {
            *s.borrow_mut() = true;
        });

        doc.click(ok);
        assert!(*submitted.borrow());
    }

    #[test]
    fn plain_button_click_does_not_submit() {
        let (doc, form) =
            doc_with(r#"<form><button type="button">Cancel</button></form>"#);
        let cancel = doc.children(form)[0];

        let submitted = Rc::new(StdRefCell::new(false));
        let ns = Namespace::fresh();
        let s = Rc::clone(&submitted);
        doc.on(EventTarget::Node(form), EventKind::Submit, ns, move |_| {
            *s.borrow_mut() = true;
        });

        doc.click(cancel);
        assert!(!*submitted.borrow());
    }

    #[test]
    fn key_down_reaches_document_listeners() {
        let doc = Document::new();
        let seen = Rc::new(StdRefCell::new(None));
        let ns = Namespace::fresh();
        let s = Rc::clone(&seen);
        doc.on(EventTarget::Document, EventKind::KeyDown, ns, move |ctx| {
            *s.borrow_mut() = ctx.key;
        });
        doc.key_down(Key::Escape);
        assert_eq!(*seen.borrow(), Some(Key::Escape));
    }

    #[test]
    fn off_namespace_is_scoped() {
        let doc = Document::new();
        let ns_a = Namespace::fresh();
        let ns_b = Namespace::fresh();
        doc.on(EventTarget::Document, EventKind::KeyDown, ns_a, |_| {});
        doc.on(EventTarget::Document, EventKind::KeyDown, ns_a, |_| {});
        doc.on(EventTarget::Document, EventKind::KeyDown, ns_b, |_| {});

        doc.off_namespace(ns_a);
        assert_eq!(doc.namespace_listener_count(ns_a), 0);
        assert_eq!(doc.namespace_listener_count(ns_b), 1);
        assert_eq!(doc.listener_count(), 1);
    }

    #[test]
    fn handler_removing_namespace_suppresses_rest_of_group() {
        let doc = Document::new();
        let ns = Namespace::fresh();
        let fired = Rc::new(StdRefCell::new(0));

        let doc2 = doc.clone();
        let f1 = Rc::clone(&fired);
        doc.on(EventTarget::Document, EventKind::KeyDown, ns, move |_| {
            *f1.borrow_mut() += 1;
            doc2.off_namespace(ns);
        });
        let f2 = Rc::clone(&fired);
        doc.on(EventTarget::Document, EventKind::KeyDown, ns, move |_| {
            *f2.borrow_mut() += 1;
        });

        doc.key_down(Key::Escape);
        assert_eq!(*fired.borrow(), 1);
        // And nothing fires on the next event.
        doc.key_down(Key::Escape);
        assert_eq!(*fired.borrow(), 1);
    }

    #[test]
    fn handler_may_register_listeners_without_affecting_current_event() {
        let doc = Document::new();
        let ns = Namespace::fresh();
        let fired = Rc::new(StdRefCell::new(0));

        let doc2 = doc.clone();
        let f1 = Rc::clone(&fired);
        doc.on(EventTarget::Document, EventKind::KeyDown, ns, move |_| {
            *f1.borrow_mut() += 1;
            let f = Rc::clone(&f1);
            doc2.on(EventTarget::Document, EventKind::KeyDown, ns, move |_| {
                *f.borrow_mut() += 10;
            });
        });

        doc.key_down(Key::Escape);
        assert_eq!(*fired.borrow(), 1, "late listener must not see the current event");
        doc.off_namespace(ns);
    }
}
