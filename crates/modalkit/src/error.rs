#![forbid(unsafe_code)]

//! Failures that abort an opening call.
//!
//! These are returned synchronously from `alert`/`confirm`/`prompt` and are
//! never deferred into the pending ticket. User cancellation is not an
//! error; it travels through the ticket as
//! [`Cancelled`](crate::outcome::Cancelled).

use modalkit_dom::MarkupError;
use std::error::Error;
use std::fmt;

/// Named slots a panel template must (or may) provide.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Slot {
    /// `slot="message"`: always required.
    Message,
    /// `slot="prompt"`: required for prompt dialogs, removed otherwise.
    Prompt,
    /// `slot="buttons"`: always required.
    Buttons,
}

impl Slot {
    fn name(self) -> &'static str {
        match self {
            Slot::Message => "message",
            Slot::Prompt => "prompt",
            Slot::Buttons => "buttons",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Why a dialog could not be opened.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum DialogError {
    /// A configured template (or an `html` message) failed to parse.
    Markup(MarkupError),
    /// The panel template lacks a required slot.
    MissingSlot(Slot),
    /// The configured container is gone or not attached to the document.
    DetachedContainer,
}

impl fmt::Display for DialogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DialogError::Markup(err) => write!(f, "template markup: {err}"),
            DialogError::MissingSlot(slot) => {
                write!(f, "panel template has no \"{slot}\" slot")
            }
            DialogError::DetachedContainer => {
                f.write_str("container is not attached to the document")
            }
        }
    }
}

impl Error for DialogError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            DialogError::Markup(err) => Some(err),
            _ => None,
        }
    }
}

impl From<MarkupError> for DialogError {
    fn from(err: MarkupError) -> Self {
        DialogError::Markup(err)
    }
}
