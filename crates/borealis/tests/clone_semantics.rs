//! Shared default children are copied, never aliased.

use std::sync::Arc;

use borealis::prelude::*;
use borealis::widget::Box;
use borealis::{downcast, is_claimed};

fn label_of(widget: Arc<dyn Widget>) -> Arc<Label> {
    downcast::<Label>(widget).expect("child is a label")
}

#[test]
fn test_first_parent_gets_the_instance() {
    let shared = Label::new("cpu");
    let first = Box::builder().child(shared.clone()).build();
    let second = Box::builder().child(shared.clone()).build();

    let a = label_of(first.children()[0].clone());
    let b = label_of(second.children()[0].clone());
    assert!(Arc::ptr_eq(&a, &shared));
    assert!(!Arc::ptr_eq(&b, &shared));
    assert!(is_claimed(b.core().id()));
}

#[test]
fn test_copies_are_independent() {
    let shared = Label::builder().text("cpu").css_class("stat").build();
    shared.core().add_css_class("warning");

    let first = Box::builder().child(shared.clone()).build();
    let second = Box::builder().child(shared.clone()).build();
    let copy = label_of(second.children()[0].clone());

    assert_eq!(copy.text(), "cpu");
    assert!(copy.core().has_css_class("stat"));
    assert!(copy.core().has_css_class("warning"));

    copy.set_text("mem");
    assert_eq!(shared.text(), "cpu");
    assert_eq!(label_of(first.children()[0].clone()).text(), "cpu");

    copy.core().remove_css_class("warning");
    assert!(shared.core().has_css_class("warning"));
}

#[test]
fn test_nested_children_are_copied() {
    let inner = Label::new("inner");
    let group = Box::builder().child(inner.clone()).build();

    let first = CenterBox::builder().center(group.clone()).build();
    let second = CenterBox::builder().center(group.clone()).build();

    let original = first.center().unwrap();
    let copy = second.center().unwrap();
    assert_eq!(original.core().id(), group.core().id());
    assert_ne!(copy.core().id(), group.core().id());

    let copied_inner = label_of(copy.children()[0].clone());
    assert!(!Arc::ptr_eq(&copied_inner, &inner));
    assert_eq!(copied_inner.text(), "inner");
    assert_eq!(copied_inner.core().parent().unwrap().core().id(), copy.core().id());
    assert_eq!(inner.core().parent().unwrap().core().id(), group.core().id());
}

#[test]
fn test_copies_keep_their_bindings() {
    let shared = Label::builder()
        .text("0")
        .bindings(Bindings::new().every(1000, |label: &Label, _| {
            let next = label.text().parse::<u32>().unwrap_or(0) + 1;
            label.set_text(next.to_string());
        }))
        .build();
    let _first = Button::builder().child(shared.clone()).build();
    let second = Button::builder().child(shared.clone()).build();
    let copy = label_of(second.child().unwrap());

    let timer = copy.core().timer_ids()[0];
    assert_ne!(timer, shared.core().timer_ids()[0]);
    assert!(copy.core().context().fire_timer(timer));
    assert_eq!(copy.text(), "1");
    assert_eq!(shared.text(), "0");
}

#[test]
fn test_factory_builds_fresh_children() {
    let source = WidgetSource::factory(|| Label::new("fresh"));
    let first = Box::builder().child(source.clone()).build();
    let second = Box::builder().child(source).build();

    let a = first.children()[0].core().id();
    let b = second.children()[0].core().id();
    assert_ne!(a, b);
}

#[test]
fn test_copy_of_a_copy() {
    let shared = Separator::new(Orientation::Vertical);
    let parents: Vec<_> = (0..3).map(|_| Box::builder().child(shared.clone()).build()).collect();

    let ids: Vec<_> = parents.iter().map(|p| p.children()[0].core().id()).collect();
    assert_eq!(ids[0], shared.core().id());
    assert_ne!(ids[1], ids[0]);
    assert_ne!(ids[2], ids[1]);
    assert_ne!(ids[2], ids[0]);

    let copy = downcast::<Separator>(parents[2].children()[0].clone()).unwrap();
    assert_eq!(copy.orientation(), Orientation::Vertical);
}
