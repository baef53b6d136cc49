#![forbid(unsafe_code)]

//! Blocking-style alert, confirm, and prompt dialogs for a host page.
//!
//! A [`DialogController`] replaces the host's native dialogs with one
//! styleable overlay+panel pair and an asynchronous result. The core
//! guarantees:
//!
//! - **One live dialog.** Opening while a dialog is up destroys the old
//!   instance first. The displaced ticket is never settled.
//! - **Focus containment.** While a dialog is open a focus trap confines
//!   keyboard focus to the panel; focus moved outside is pulled back to
//!   the first focusable element inside. The pre-dialog focus target is
//!   restored on close.
//! - **Deterministic teardown.** Every listener a dialog registers lives
//!   in one namespace and is removed in a single call on close; repeated
//!   open/close cycles leak nothing.
//! - **Exactly-once settlement.** Each interaction settles its
//!   [`DialogTicket`] at most once: `Ok` on confirmation (with the named
//!   field values for prompts), `Err(Cancelled)` on cancel or Escape.
//!
//! ```
//! use modalkit::{DialogController, DialogOptions};
//! use modalkit_dom::Document;
//!
//! let controller = DialogController::new(Document::new());
//! let ticket = controller
//!     .confirm("Delete everything?", DialogOptions::new().ok_label("Delete"))
//!     .unwrap();
//!
//! // The user clicks cancel (simulated here):
//! let doc = controller.document().clone();
//! let panel = controller.active_panel().unwrap();
//! let buttons = doc.find_slot(panel, "buttons").unwrap();
//! doc.click(doc.children(buttons)[0]);
//!
//! assert_eq!(ticket.try_take(), Some(Err(modalkit::Cancelled)));
//! ```

pub mod binder;
pub mod controller;
pub mod error;
pub mod focus;
pub mod options;
pub mod outcome;
mod template;

pub use binder::EventBinder;
pub use controller::DialogController;
pub use error::{DialogError, Slot};
pub use focus::FocusGuard;
pub use options::{DialogDefaults, DialogKind, DialogOptions, PresentCtx, PresentHook};
pub use outcome::{Cancelled, DialogTicket, PromptValues};
