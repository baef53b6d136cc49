#![forbid(unsafe_code)]

//! The dialog controller: open, settle, tear down.
//!
//! One controller owns at most one live [`DialogInstance`]. Opening while
//! a dialog is up tears the old instance down first, without settling it;
//! the displaced ticket stays pending forever. All interaction handlers
//! carry their instance's namespace and re-check it against the current
//! instance before acting, so a handler that survived teardown inside an
//! in-flight event can never touch a newer dialog.
//!
//! # Lifecycle
//!
//! `CLOSED -> OPEN -> settled (ok or cancelled) -> CLOSED`, with the one
//! documented hazard above: a second open forces `OPEN -> CLOSED` on the
//! prior instance without a settlement.
//!
//! # Teardown order
//!
//! hide hook, detach the namespace, release the focus trap, unmount
//! overlay and panel, restore captured focus. Prompt values are read
//! before teardown, while the fields are still mounted. Teardown always
//! completes before the settlement is dispatched.

use crate::binder::EventBinder;
use crate::error::DialogError;
use crate::focus::FocusGuard;
use crate::options::{DialogDefaults, DialogKind, DialogOptions, PresentCtx, PresentHook, Resolved};
use crate::outcome::{self, DialogTicket, PromptValues, Settler};
use crate::template::{self, Scaffold};
use modalkit_dom::{Document, EventKind, Key, Namespace, NodeId};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::debug;

/// The not-yet-settled half of the active dialog's result.
enum Pending {
    /// Alert and confirm: confirmation carries no payload.
    Ack(Settler<()>),
    /// Prompt: confirmation carries the named field values.
    Values(Settler<PromptValues>),
}

#[derive(Clone, Copy, Debug)]
enum Verdict {
    Confirm,
    Cancel,
}

/// The single live dialog. Owned by the controller's active cell;
/// consumed on teardown.
struct DialogInstance {
    namespace: Namespace,
    binder: EventBinder,
    guard: FocusGuard,
    overlay: NodeId,
    panel: NodeId,
    hide: PresentHook,
    pending: Pending,
}

impl DialogInstance {
    fn teardown(mut self, document: &Document) -> Pending {
        (self.hide)(&PresentCtx {
            document: document.clone(),
            overlay: self.overlay,
            panel: self.panel,
        });
        self.binder.detach_all();
        self.guard.release();
        document.remove(self.overlay);
        document.remove(self.panel);
        self.guard.restore_focus();
        self.pending
    }

    /// Teardown with no settlement: the settler drops, the ticket stays
    /// pending forever.
    fn discard(self, document: &Document) {
        let _ = self.teardown(document);
    }
}

type ActiveCell = Rc<RefCell<Option<DialogInstance>>>;

fn collect_values(document: &Document, panel: NodeId) -> PromptValues {
    let mut values = PromptValues::new();
    for (name, value) in document.serialize_fields(panel) {
        // Duplicate names: last in document order wins.
        values.insert(name, value);
    }
    values
}

/// Settle the active instance, if it is still the one the calling
/// handler was bound to.
fn conclude(document: &Document, active: &ActiveCell, ns: Namespace, verdict: Verdict) {
    let instance = {
        let mut cell = active.borrow_mut();
        match cell.as_ref() {
            Some(instance) if instance.namespace == ns => cell.take(),
            _ => None,
        }
    };
    let Some(instance) = instance else {
        return;
    };
    let values = match (verdict, &instance.pending) {
        (Verdict::Confirm, Pending::Values(_)) => Some(collect_values(document, instance.panel)),
        _ => None,
    };
    let pending = instance.teardown(document);
    debug!(ns = ns.raw(), ?verdict, "dialog settled");
    match (verdict, pending) {
        (Verdict::Confirm, Pending::Ack(settler)) => settler.resolve(()),
        (Verdict::Confirm, Pending::Values(settler)) => {
            settler.resolve(values.unwrap_or_default());
        }
        (Verdict::Cancel, Pending::Ack(settler)) => settler.reject(),
        (Verdict::Cancel, Pending::Values(settler)) => settler.reject(),
    }
}

/// Opens dialogs against one document and owns the single live instance.
///
/// Cloning is cheap and clones share the live instance.
#[derive(Clone)]
pub struct DialogController {
    document: Document,
    defaults: Rc<DialogDefaults>,
    active: ActiveCell,
}

impl DialogController {
    pub fn new(document: Document) -> Self {
        Self::with_defaults(document, DialogDefaults::default())
    }

    pub fn with_defaults(document: Document, defaults: DialogDefaults) -> Self {
        Self {
            document,
            defaults: Rc::new(defaults),
            active: Rc::new(RefCell::new(None)),
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Whether a dialog is currently mounted and interactive.
    pub fn is_open(&self) -> bool {
        self.active.borrow().is_some()
    }

    /// Panel node of the live dialog, for embedders that restyle it.
    pub fn active_panel(&self) -> Option<NodeId> {
        self.active.borrow().as_ref().map(|instance| instance.panel)
    }

    /// Show a message with an ok button. Resolves with `()` on ok; a
    /// cancel path exists only via Escape.
    pub fn alert(
        &self,
        message: &str,
        options: DialogOptions,
    ) -> Result<DialogTicket<()>, DialogError> {
        self.open_with(DialogKind::Alert, message, options, Pending::Ack)
    }

    /// Ask for confirmation. Resolves with `()` on ok, rejects with
    /// `Cancelled` on cancel or Escape.
    pub fn confirm(
        &self,
        message: &str,
        options: DialogOptions,
    ) -> Result<DialogTicket<()>, DialogError> {
        self.open_with(DialogKind::Confirm, message, options, Pending::Ack)
    }

    /// Ask for input. Resolves with the named field values captured at
    /// submit time, rejects with `Cancelled` on cancel or Escape.
    pub fn prompt(
        &self,
        message: &str,
        options: DialogOptions,
    ) -> Result<DialogTicket<PromptValues>, DialogError> {
        self.open_with(DialogKind::Prompt, message, options, Pending::Values)
    }

    fn open_with<T>(
        &self,
        kind: DialogKind,
        message: &str,
        options: DialogOptions,
        wrap: impl FnOnce(Settler<T>) -> Pending,
    ) -> Result<DialogTicket<T>, DialogError> {
        let resolved = self.defaults.resolve(&options);
        let mut guard = FocusGuard::capture(&self.document);

        if let Some(old) = self.active.borrow_mut().take() {
            debug!(ns = old.namespace.raw(), "dialog displaced without settlement");
            old.discard(&self.document);
        }

        let scaffold = match self.build_and_mount(kind, &resolved, message) {
            Ok(scaffold) => scaffold,
            Err(err) => {
                guard.restore_focus();
                return Err(err);
            }
        };
        let Scaffold {
            overlay,
            panel,
            ok,
            cancel,
        } = scaffold;

        let mut binder = EventBinder::new(self.document.clone());
        let ns = binder.namespace();
        let (settler, ticket) = outcome::channel::<T>();

        {
            let document = self.document.clone();
            let active = Rc::clone(&self.active);
            binder.on_node(panel, EventKind::Submit, move |_| {
                conclude(&document, &active, ns, Verdict::Confirm);
            });
        }
        if let Some(cancel) = cancel {
            let document = self.document.clone();
            let active = Rc::clone(&self.active);
            binder.on_node(cancel, EventKind::Click, move |_| {
                conclude(&document, &active, ns, Verdict::Cancel);
            });
        }
        {
            let document = self.document.clone();
            let active = Rc::clone(&self.active);
            binder.on_document(EventKind::KeyDown, move |ctx| {
                if ctx.key == Some(Key::Escape) {
                    conclude(&document, &active, ns, Verdict::Cancel);
                }
            });
        }
        guard.engage(panel);

        *self.active.borrow_mut() = Some(DialogInstance {
            namespace: ns,
            binder,
            guard,
            overlay,
            panel,
            hide: resolved.hide.clone(),
            pending: wrap(settler),
        });

        (resolved.show)(&PresentCtx {
            document: self.document.clone(),
            overlay,
            panel,
        });

        let target = if kind.has_prompt() {
            self.document
                .find_slot(panel, "prompt")
                .and_then(|slot| self.document.first_focusable(slot))
                .unwrap_or(ok)
        } else {
            ok
        };
        self.document.focus(target);

        debug!(kind = %kind, ns = ns.raw(), "dialog opened");
        Ok(ticket)
    }

    fn build_and_mount(
        &self,
        kind: DialogKind,
        resolved: &Resolved,
        message: &str,
    ) -> Result<Scaffold, DialogError> {
        let container = resolved.container.unwrap_or_else(|| self.document.body());
        if !self.document.is_attached(container) {
            return Err(DialogError::DetachedContainer);
        }
        let scaffold = template::build(&self.document, kind, resolved, message)?;
        // Mounted hidden; the show hook reveals (or animates) the pair.
        self.document.set_hidden(scaffold.overlay, true);
        self.document.set_hidden(scaffold.panel, true);
        self.document.append(container, scaffold.overlay);
        self.document.append(container, scaffold.panel);
        Ok(scaffold)
    }
}
