//! End-to-end dialog flows: open, interact, settle, tear down.

use modalkit::{Cancelled, DialogError, DialogOptions};
use modalkit_dom::Key;
use modalkit_harness::{cancel_button, ok_button, page, poll_ticket};
use proptest::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;

#[test]
fn confirm_ok_resolves_and_tears_down() {
    let fixture = page();
    let doc = fixture.document().clone();
    doc.focus(fixture.first_input);
    let baseline = doc.children(doc.body()).len();

    let mut ticket = fixture.controller.confirm("sure?", DialogOptions::new()).unwrap();
    assert!(poll_ticket(&mut ticket).is_pending());

    let panel = fixture.controller.active_panel().unwrap();
    doc.click(ok_button(&doc, panel));

    assert_eq!(poll_ticket(&mut ticket), std::task::Poll::Ready(Ok(())));
    assert!(!fixture.controller.is_open());
    assert_eq!(doc.children(doc.body()).len(), baseline);
    assert_eq!(doc.listener_count(), 0);
    assert_eq!(doc.focused(), Some(fixture.first_input));
}

#[test]
fn confirm_cancel_rejects() {
    let fixture = page();
    let doc = fixture.document().clone();

    let ticket = fixture.controller.confirm("sure?", DialogOptions::new()).unwrap();
    let panel = fixture.controller.active_panel().unwrap();
    doc.click(cancel_button(&doc, panel));

    assert_eq!(ticket.try_take(), Some(Err(Cancelled)));
    assert!(!fixture.controller.is_open());
    assert_eq!(doc.listener_count(), 0);
}

#[test]
fn escape_cancels_any_dialog() {
    let fixture = page();
    let doc = fixture.document().clone();

    let ticket = fixture.controller.prompt("name?", DialogOptions::new()).unwrap();
    doc.key_down(Key::Escape);

    assert_eq!(ticket.try_take(), Some(Err(Cancelled)));
    assert!(!fixture.controller.is_open());
    assert_eq!(doc.listener_count(), 0);
}

#[test]
fn other_keys_do_not_cancel() {
    let fixture = page();
    let doc = fixture.document().clone();

    let ticket = fixture.controller.alert("hi", DialogOptions::new()).unwrap();
    doc.key_down(Key::Enter);
    doc.key_down(Key::Tab);
    doc.key_down(Key::Char('q'));

    assert!(ticket.is_pending());
    assert!(fixture.controller.is_open());
}

#[test]
fn prompt_submit_captures_current_values() {
    let fixture = page();
    let doc = fixture.document().clone();

    let ticket = fixture.controller.prompt("name?", DialogOptions::new()).unwrap();
    let panel = fixture.controller.active_panel().unwrap();

    // The default prompt template is a single field named "value".
    let field = doc.focused().unwrap();
    assert_eq!(doc.attr(field, "name").as_deref(), Some("value"));
    doc.set_value(field, "ada");
    doc.click(ok_button(&doc, panel));

    let values = ticket.try_take().unwrap().unwrap();
    assert_eq!(values.len(), 1);
    assert_eq!(values.get("value").map(String::as_str), Some("ada"));
}

#[test]
fn prompt_maps_every_named_field() {
    let fixture = page();
    let doc = fixture.document().clone();

    let prompt = concat!(
        r#"<div><input type="text" name="user">"#,
        r#"<input type="text" name="email">"#,
        r#"<input type="text" value="unnamed">"#,
        r#"<input type="text" name="token" disabled></div>"#
    );
    let ticket = fixture
        .controller
        .prompt("who?", DialogOptions::new().prompt(prompt))
        .unwrap();
    let panel = fixture.controller.active_panel().unwrap();

    let user = doc.find_by_attr(panel, "name", "user").unwrap();
    let email = doc.find_by_attr(panel, "name", "email").unwrap();
    doc.set_value(user, "ada");
    doc.set_value(email, "ada@example.com");
    doc.submit(panel);

    let values = ticket.try_take().unwrap().unwrap();
    assert_eq!(values.len(), 2);
    assert_eq!(values.get("user").map(String::as_str), Some("ada"));
    assert_eq!(
        values.get("email").map(String::as_str),
        Some("ada@example.com")
    );
}

#[test]
fn duplicate_field_names_last_write_wins() {
    let fixture = page();
    let doc = fixture.document().clone();

    let prompt = concat!(
        r#"<div><input type="text" name="x" value="first">"#,
        r#"<input type="text" name="x" value="second"></div>"#
    );
    let ticket = fixture
        .controller
        .prompt("x?", DialogOptions::new().prompt(prompt))
        .unwrap();
    doc.submit(fixture.controller.active_panel().unwrap());

    let values = ticket.try_take().unwrap().unwrap();
    assert_eq!(values.get("x").map(String::as_str), Some("second"));
}

#[test]
fn second_open_displaces_without_settlement() {
    let fixture = page();
    let doc = fixture.document().clone();
    let baseline = doc.children(doc.body()).len();

    let mut first = fixture.controller.confirm("first?", DialogOptions::new()).unwrap();
    let first_panel = fixture.controller.active_panel().unwrap();
    let listeners_for_one = doc.listener_count();

    let second = fixture.controller.alert("second", DialogOptions::new()).unwrap();
    let second_panel = fixture.controller.active_panel().unwrap();

    // Exactly one overlay+panel pair mounted, and it is the new one.
    assert_ne!(first_panel, second_panel);
    assert!(!doc.exists(first_panel));
    assert_eq!(doc.children(doc.body()).len(), baseline + 2);
    assert_eq!(doc.listener_count(), listeners_for_one);

    // The displaced ticket is pending forever.
    assert!(poll_ticket(&mut first).is_pending());

    doc.click(ok_button(&doc, second_panel));
    assert_eq!(second.try_take(), Some(Ok(())));
    assert!(poll_ticket(&mut first).is_pending());
    assert_eq!(doc.listener_count(), 0);
}

#[test]
fn repeated_cycles_leak_nothing() {
    let fixture = page();
    let doc = fixture.document().clone();
    let baseline = doc.children(doc.body()).len();

    for _ in 0..10 {
        let ticket = fixture.controller.alert("hi", DialogOptions::new()).unwrap();
        doc.key_down(Key::Escape);
        assert_eq!(ticket.try_take(), Some(Err(Cancelled)));
    }
    assert_eq!(doc.listener_count(), 0);
    assert_eq!(doc.children(doc.body()).len(), baseline);
}

#[test]
fn focus_is_trapped_while_open() {
    let fixture = page();
    let doc = fixture.document().clone();

    fixture.controller.confirm("sure?", DialogOptions::new()).unwrap();
    let panel = fixture.controller.active_panel().unwrap();

    doc.focus(fixture.second_input);
    let focused = doc.focused().unwrap();
    assert!(doc.contains(panel, focused));
}

#[test]
fn escape_after_close_is_inert() {
    let fixture = page();
    let doc = fixture.document().clone();

    let ticket = fixture.controller.alert("hi", DialogOptions::new()).unwrap();
    doc.key_down(Key::Escape);
    assert_eq!(ticket.try_take(), Some(Err(Cancelled)));

    doc.key_down(Key::Escape);
    assert!(!fixture.controller.is_open());
    assert_eq!(doc.listener_count(), 0);
}

#[test]
fn show_and_hide_hooks_bracket_the_lifetime() {
    let fixture = page();
    let doc = fixture.document().clone();
    let calls = Rc::new(RefCell::new(Vec::new()));

    let on_show = Rc::clone(&calls);
    let on_hide = Rc::clone(&calls);
    let options = DialogOptions::new()
        .show(move |ctx| {
            on_show
                .borrow_mut()
                .push(("show", ctx.document.is_attached(ctx.panel)));
        })
        .hide(move |ctx| {
            on_hide
                .borrow_mut()
                .push(("hide", ctx.document.is_attached(ctx.panel)));
        });

    let ticket = fixture.controller.alert("hi", options).unwrap();
    doc.key_down(Key::Escape);
    assert_eq!(ticket.try_take(), Some(Err(Cancelled)));

    // Both hooks see the pair still mounted.
    assert_eq!(*calls.borrow(), vec![("show", true), ("hide", true)]);
}

#[test]
fn html_message_builds_markup() {
    let fixture = page();
    let doc = fixture.document().clone();

    fixture
        .controller
        .alert("<b>careful</b>", DialogOptions::new().html(true))
        .unwrap();
    let panel = fixture.controller.active_panel().unwrap();
    let slot = doc.find_slot(panel, "message").unwrap();
    assert_eq!(doc.tag(doc.children(slot)[0]).as_deref(), Some("b"));
}

#[test]
fn bad_html_message_fails_the_open_call() {
    let fixture = page();
    let err = fixture
        .controller
        .alert("<b>unclosed", DialogOptions::new().html(true))
        .unwrap_err();
    assert!(matches!(err, DialogError::Markup(_)));
    assert!(!fixture.controller.is_open());
    assert_eq!(fixture.document().listener_count(), 0);
}

#[test]
fn deeply_nested_html_message_fails_cleanly() {
    let fixture = page();
    let message = "<i>".repeat(100_000);
    let err = fixture
        .controller
        .alert(&message, DialogOptions::new().html(true))
        .unwrap_err();
    assert!(matches!(err, DialogError::Markup(_)));
    assert!(!fixture.controller.is_open());
    assert_eq!(fixture.document().listener_count(), 0);
}

#[test]
fn custom_labels_reach_the_buttons() {
    let fixture = page();
    let doc = fixture.document().clone();

    fixture
        .controller
        .confirm(
            "delete?",
            DialogOptions::new().ok_label("Delete").cancel_label("Keep"),
        )
        .unwrap();
    let panel = fixture.controller.active_panel().unwrap();
    assert_eq!(doc.text_content(ok_button(&doc, panel)), "Delete");
    assert_eq!(doc.text_content(cancel_button(&doc, panel)), "Keep");
}

#[test]
fn alert_has_exactly_one_button() {
    let fixture = page();
    let doc = fixture.document().clone();

    fixture.controller.alert("hi", DialogOptions::new()).unwrap();
    let panel = fixture.controller.active_panel().unwrap();
    let buttons = doc.find_slot(panel, "buttons").unwrap();
    assert_eq!(doc.children(buttons).len(), 1);
}

proptest! {
    #[test]
    fn plain_message_never_becomes_markup(message in modalkit_harness::strategies::message()) {
        let fixture = page();
        let doc = fixture.document().clone();
        fixture.controller.alert(&message, DialogOptions::new()).unwrap();
        let panel = fixture.controller.active_panel().unwrap();
        let slot = doc.find_slot(panel, "message").unwrap();
        prop_assert_eq!(doc.text_content(slot), message);
        prop_assert_eq!(doc.children(slot).len(), 1);
    }

    #[test]
    fn any_label_round_trips_through_the_button(label in modalkit_harness::strategies::label()) {
        let fixture = page();
        let doc = fixture.document().clone();
        fixture
            .controller
            .confirm("sure?", DialogOptions::new().ok_label(label.clone()))
            .unwrap();
        let panel = fixture.controller.active_panel().unwrap();
        prop_assert_eq!(doc.text_content(ok_button(&doc, panel)), label);
    }
}
