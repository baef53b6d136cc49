#![forbid(unsafe_code)]

//! Dialog configuration: process defaults and the per-call patch.
//!
//! The controller owns a [`DialogDefaults`]. Each opening call supplies a
//! [`DialogOptions`] patch in which every field is optional; resolution is
//! field-by-field, patch over defaults. An explicit `ok_button` or
//! `cancel_button` markup override suppresses the label-based default for
//! that button entirely.

use modalkit_dom::{Document, NodeId, escape_text};
use std::fmt;
use std::rc::Rc;

/// Which interaction a dialog carries.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum DialogKind {
    /// Message plus an ok button.
    Alert,
    /// Message plus cancel and ok buttons.
    Confirm,
    /// Message, input field(s), cancel and ok buttons.
    Prompt,
}

impl DialogKind {
    pub(crate) fn has_cancel(self) -> bool {
        !matches!(self, DialogKind::Alert)
    }

    pub(crate) fn has_prompt(self) -> bool {
        matches!(self, DialogKind::Prompt)
    }
}

impl fmt::Display for DialogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DialogKind::Alert => "alert",
            DialogKind::Confirm => "confirm",
            DialogKind::Prompt => "prompt",
        })
    }
}

/// Handed to `show`/`hide` hooks so embedders can animate or restyle the
/// mounted pair.
#[derive(Clone)]
pub struct PresentCtx {
    pub document: Document,
    pub overlay: NodeId,
    pub panel: NodeId,
}

/// A presentation hook.
pub type PresentHook = Rc<dyn Fn(&PresentCtx)>;

/// Per-call overrides. Every field defaults to "inherit from defaults".
#[derive(Clone, Default)]
pub struct DialogOptions {
    pub container: Option<NodeId>,
    pub html: Option<bool>,
    pub ok_label: Option<String>,
    pub cancel_label: Option<String>,
    /// Full markup for the ok control; suppresses `ok_label`.
    pub ok_button: Option<String>,
    /// Full markup for the cancel control; suppresses `cancel_label`.
    pub cancel_button: Option<String>,
    pub overlay: Option<String>,
    pub panel: Option<String>,
    pub prompt: Option<String>,
    pub show: Option<PresentHook>,
    pub hide: Option<PresentHook>,
}

impl DialogOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn container(mut self, node: NodeId) -> Self {
        self.container = Some(node);
        self
    }

    /// Treat the message as markup instead of literal text.
    pub fn html(mut self, html: bool) -> Self {
        self.html = Some(html);
        self
    }

    pub fn ok_label(mut self, label: impl Into<String>) -> Self {
        self.ok_label = Some(label.into());
        self
    }

    pub fn cancel_label(mut self, label: impl Into<String>) -> Self {
        self.cancel_label = Some(label.into());
        self
    }

    pub fn ok_button(mut self, markup: impl Into<String>) -> Self {
        self.ok_button = Some(markup.into());
        self
    }

    pub fn cancel_button(mut self, markup: impl Into<String>) -> Self {
        self.cancel_button = Some(markup.into());
        self
    }

    pub fn overlay(mut self, markup: impl Into<String>) -> Self {
        self.overlay = Some(markup.into());
        self
    }

    pub fn panel(mut self, markup: impl Into<String>) -> Self {
        self.panel = Some(markup.into());
        self
    }

    pub fn prompt(mut self, markup: impl Into<String>) -> Self {
        self.prompt = Some(markup.into());
        self
    }

    pub fn show(mut self, hook: impl Fn(&PresentCtx) + 'static) -> Self {
        self.show = Some(Rc::new(hook));
        self
    }

    pub fn hide(mut self, hook: impl Fn(&PresentCtx) + 'static) -> Self {
        self.hide = Some(Rc::new(hook));
        self
    }
}

/// Process-wide defaults held by the controller.
#[derive(Clone)]
pub struct DialogDefaults {
    /// Mount point; `None` means the document body.
    pub container: Option<NodeId>,
    pub html: bool,
    pub ok_label: String,
    pub cancel_label: String,
    pub overlay: String,
    pub panel: String,
    pub prompt: String,
    pub show: PresentHook,
    pub hide: PresentHook,
}

impl Default for DialogDefaults {
    fn default() -> Self {
        Self {
            container: None,
            html: false,
            ok_label: "OK".to_string(),
            cancel_label: "Cancel".to_string(),
            overlay: r#"<div class="dialog-overlay"></div>"#.to_string(),
            panel: concat!(
                r#"<form class="dialog-panel">"#,
                r#"<p slot="message"></p>"#,
                r#"<div slot="prompt"></div>"#,
                r#"<div slot="buttons"></div>"#,
                "</form>"
            )
            .to_string(),
            prompt: r#"<input type="text" name="value">"#.to_string(),
            show: Rc::new(reveal),
            hide: Rc::new(conceal),
        }
    }
}

// Default presentation: the pair is mounted hidden and the show hook
// reveals it, so a custom hook can animate instead.
fn reveal(ctx: &PresentCtx) {
    ctx.document.set_hidden(ctx.overlay, false);
    ctx.document.set_hidden(ctx.panel, false);
}

fn conceal(ctx: &PresentCtx) {
    ctx.document.set_hidden(ctx.overlay, true);
    ctx.document.set_hidden(ctx.panel, true);
}

/// Fully merged configuration for one opening call.
pub(crate) struct Resolved {
    pub(crate) container: Option<NodeId>,
    pub(crate) html: bool,
    pub(crate) ok_button: String,
    pub(crate) cancel_button: String,
    pub(crate) overlay: String,
    pub(crate) panel: String,
    pub(crate) prompt: String,
    pub(crate) show: PresentHook,
    pub(crate) hide: PresentHook,
}

impl DialogDefaults {
    pub(crate) fn resolve(&self, patch: &DialogOptions) -> Resolved {
        let ok_button = patch.ok_button.clone().unwrap_or_else(|| {
            let label = patch.ok_label.as_deref().unwrap_or(&self.ok_label);
            format!(r#"<button type="submit">{}</button>"#, escape_text(label))
        });
        let cancel_button = patch.cancel_button.clone().unwrap_or_else(|| {
            let label = patch.cancel_label.as_deref().unwrap_or(&self.cancel_label);
            format!(r#"<button type="button">{}</button>"#, escape_text(label))
        });
        Resolved {
            container: patch.container.or(self.container),
            html: patch.html.unwrap_or(self.html),
            ok_button,
            cancel_button,
            overlay: patch.overlay.clone().unwrap_or_else(|| self.overlay.clone()),
            panel: patch.panel.clone().unwrap_or_else(|| self.panel.clone()),
            prompt: patch.prompt.clone().unwrap_or_else(|| self.prompt.clone()),
            show: patch.show.clone().unwrap_or_else(|| self.show.clone()),
            hide: patch.hide.clone().unwrap_or_else(|| self.hide.clone()),
        }
    }
}
