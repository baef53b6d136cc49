#![forbid(unsafe_code)]

//! Builds the overlay/panel pair for one dialog from resolved options.
//!
//! Pure construction: nodes come back detached, carry no listeners, and
//! are not yet part of the page. The panel template must provide a
//! `message` slot and a `buttons` slot; a `prompt` slot is required for
//! prompt dialogs and removed entirely for the others. On any failure
//! every node created so far is removed again, so a failed open leaves
//! the document untouched.

use crate::error::{DialogError, Slot};
use crate::options::{DialogKind, Resolved};
use modalkit_dom::{Document, NodeId};

/// The detached nodes making up one dialog.
#[derive(Debug)]
pub(crate) struct Scaffold {
    pub(crate) overlay: NodeId,
    pub(crate) panel: NodeId,
    pub(crate) ok: NodeId,
    pub(crate) cancel: Option<NodeId>,
}

pub(crate) fn build(
    document: &Document,
    kind: DialogKind,
    resolved: &Resolved,
    message: &str,
) -> Result<Scaffold, DialogError> {
    let overlay = document.create(&resolved.overlay)?;
    match build_panel(document, kind, resolved, message) {
        Ok((panel, ok, cancel)) => Ok(Scaffold {
            overlay,
            panel,
            ok,
            cancel,
        }),
        Err(err) => {
            document.remove(overlay);
            Err(err)
        }
    }
}

fn build_panel(
    document: &Document,
    kind: DialogKind,
    resolved: &Resolved,
    message: &str,
) -> Result<(NodeId, NodeId, Option<NodeId>), DialogError> {
    let panel = document.create(&resolved.panel)?;
    match fill_panel(document, panel, kind, resolved, message) {
        Ok((ok, cancel)) => Ok((panel, ok, cancel)),
        Err(err) => {
            document.remove(panel);
            Err(err)
        }
    }
}

fn fill_panel(
    document: &Document,
    panel: NodeId,
    kind: DialogKind,
    resolved: &Resolved,
    message: &str,
) -> Result<(NodeId, Option<NodeId>), DialogError> {
    let message_slot = document
        .find_slot(panel, "message")
        .ok_or(DialogError::MissingSlot(Slot::Message))?;
    if resolved.html {
        document.set_markup(message_slot, message)?;
    } else {
        document.set_text(message_slot, message);
    }

    match document.find_slot(panel, "prompt") {
        Some(slot) if kind.has_prompt() => document.set_markup(slot, &resolved.prompt)?,
        Some(slot) => document.remove(slot),
        None if kind.has_prompt() => {
            return Err(DialogError::MissingSlot(Slot::Prompt));
        }
        None => {}
    }

    let buttons_slot = document
        .find_slot(panel, "buttons")
        .ok_or(DialogError::MissingSlot(Slot::Buttons))?;
    let cancel = if kind.has_cancel() {
        let cancel = document.create(&resolved.cancel_button)?;
        document.append(buttons_slot, cancel);
        Some(cancel)
    } else {
        None
    };
    let ok = document.create(&resolved.ok_button)?;
    document.append(buttons_slot, ok);

    Ok((ok, cancel))
}
