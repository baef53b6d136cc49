#![forbid(unsafe_code)]

//! Test fixtures and helpers shared by the modalkit test suites.
//!
//! Provides a fixture page with background focusables, button locators
//! for the default templates, executor-free ticket polling, a tree
//! outline renderer for structural assertions, and proptest strategies
//! for message and label text.

use modalkit::{Cancelled, DialogController, DialogTicket};
use modalkit_dom::{Document, NodeContent, NodeId};
use std::future::Future;
use std::pin::pin;
use std::task::{Context, Poll, Waker};

/// A document with two background inputs and a background button, plus a
/// controller bound to it. The background elements give focus-capture
/// and focus-restore assertions something real to land on.
pub struct FixturePage {
    pub controller: DialogController,
    pub first_input: NodeId,
    pub second_input: NodeId,
    pub background_button: NodeId,
}

impl FixturePage {
    pub fn document(&self) -> &Document {
        self.controller.document()
    }
}

/// Build the standard fixture page.
pub fn page() -> FixturePage {
    let document = Document::new();
    let first_input = create_attached(&document, r#"<input name="first">"#);
    let second_input = create_attached(&document, r#"<input name="second">"#);
    let background_button = create_attached(&document, r#"<button type="button">bg</button>"#);
    FixturePage {
        controller: DialogController::new(document),
        first_input,
        second_input,
        background_button,
    }
}

fn create_attached(document: &Document, markup: &str) -> NodeId {
    let node = document.create(markup).expect("fixture markup");
    document.append(document.body(), node);
    node
}

/// The ok control inside a panel built from the default templates.
pub fn ok_button(document: &Document, panel: NodeId) -> NodeId {
    button_with_type(document, panel, "submit").expect("panel has an ok button")
}

/// The cancel control inside a panel built from the default templates.
pub fn cancel_button(document: &Document, panel: NodeId) -> NodeId {
    button_with_type(document, panel, "button").expect("panel has a cancel button")
}

fn button_with_type(document: &Document, panel: NodeId, ty: &str) -> Option<NodeId> {
    let buttons = document.find_slot(panel, "buttons")?;
    document
        .children(buttons)
        .into_iter()
        .find(|b| document.attr(*b, "type").as_deref() == Some(ty))
}

/// Poll a ticket once with a no-op waker.
pub fn poll_ticket<T>(ticket: &mut DialogTicket<T>) -> Poll<Result<T, Cancelled>> {
    let mut cx = Context::from_waker(Waker::noop());
    pin!(&mut *ticket).as_mut().poll(&mut cx)
}

/// Render a subtree as an indented outline, one node per line:
/// `tag` with sorted attributes, or `"text"` for text nodes. Stable
/// across runs, so suitable for literal assertions.
pub fn outline(document: &Document, root: NodeId) -> String {
    let mut out = String::new();
    render(document, root, 0, &mut out);
    out
}

fn render(document: &Document, node: NodeId, depth: usize, out: &mut String) {
    for _ in 0..depth {
        out.push_str("  ");
    }
    match document.content(node) {
        Some(NodeContent::Text(text)) => {
            out.push('"');
            out.push_str(&text);
            out.push('"');
        }
        Some(NodeContent::Element { tag, .. }) => {
            out.push_str(&tag);
            for (name, value) in document.attrs(node) {
                out.push(' ');
                out.push_str(&name);
                if !value.is_empty() {
                    out.push_str("=\"");
                    out.push_str(&value);
                    out.push('"');
                }
            }
        }
        None => out.push_str("<gone>"),
    }
    out.push('\n');
    for child in document.children(node) {
        render(document, child, depth + 1, out);
    }
}

/// Proptest strategies for dialog inputs.
pub mod strategies {
    use proptest::prelude::*;

    /// Message text: printable, possibly containing markup metacharacters.
    pub fn message() -> impl Strategy<Value = String> {
        "[ -~]{0,64}"
    }

    /// Button label text. Starts with a non-space character so the
    /// label survives as a text node rather than inter-tag whitespace.
    pub fn label() -> impl Strategy<Value = String> {
        "[!-~][ -~]{0,23}"
    }

    /// A field name acceptable in a `name` attribute.
    pub fn field_name() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9_]{0,15}"
    }
}
