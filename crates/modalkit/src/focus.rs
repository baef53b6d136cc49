#![forbid(unsafe_code)]

//! Focus containment for one dialog instance.
//!
//! [`FocusGuard::capture`] remembers and blurs whatever held focus when
//! the dialog opened. [`FocusGuard::engage`] installs a trap on the
//! panel subtree; while engaged, any focus request landing outside the
//! panel is suppressed by the document and redirected to the first
//! focusable element inside. Release and restore happen at teardown,
//! restore after release so the trap cannot bounce the restored focus.

use modalkit_dom::{Document, NodeId, TrapId};
use tracing::debug;

pub struct FocusGuard {
    document: Document,
    trap: Option<TrapId>,
    restore: Option<NodeId>,
}

impl FocusGuard {
    /// Capture and blur the currently focused element.
    pub fn capture(document: &Document) -> Self {
        let restore = document.focused();
        if let Some(node) = restore {
            document.blur(node);
        }
        Self {
            document: document.clone(),
            trap: None,
            restore,
        }
    }

    /// Confine focus to `panel`'s subtree.
    pub fn engage(&mut self, panel: NodeId) {
        self.release();
        self.trap = Some(self.document.push_focus_trap(panel));
    }

    /// Lift the trap (idempotent).
    pub fn release(&mut self) {
        if let Some(trap) = self.trap.take() {
            self.document.release_focus_trap(trap);
        }
    }

    /// Give focus back to the captured element, if it still accepts it.
    pub fn restore_focus(&mut self) {
        if let Some(node) = self.restore.take() {
            let outcome = self.document.focus(node);
            debug!(target = node.raw(), ?outcome, "focus restored");
        }
    }
}

impl Drop for FocusGuard {
    fn drop(&mut self) {
        self.release();
    }
}
