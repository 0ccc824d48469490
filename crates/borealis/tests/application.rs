//! A whole bar: window root, services, the main loop.

use std::sync::Arc;
use std::time::Duration;

use borealis::prelude::*;
use borealis::widget::Box;
use borealis::{ArgKind, downcast, unmount};

struct ClockCallback;

impl ServiceAnnotation for ClockCallback {
    const PREFIX: &'static str = "clock-on";
}

fn clock_schema() -> SignalSchema {
    SignalSchema::new().signal("tick", [ArgKind::Int])
}

fn clock_label() -> Arc<Label> {
    Label::builder()
        .css_class("clock")
        .bindings(Bindings::new().declare(
            "clock_on_tick",
            AttrValue::callback(|label: &Label, args| label.set_text(format!("{}s", args[0]))),
        ))
        .build()
}

#[test]
fn test_labels_follow_a_service() {
    let app = Application::new(ApplicationConfig::new("org.example.clock"));
    let (service, sender) = ChannelService::<ClockCallback>::new(clock_schema());
    let handle = app.register(service).unwrap();

    let source = WidgetSource::factory(clock_label);
    app.set_root(move |_| {
        Window::builder()
            .child(
                CenterBox::builder()
                    .start(source.clone())
                    .end(source.clone())
                    .build(),
            )
            .build()
    });
    let root = app.activate().unwrap();
    assert_eq!(handle.attached_count(), 2);

    sender.send(ServiceSignal::new("tick", [42i64])).unwrap();
    assert_eq!(app.context().dispatch_within(Duration::from_secs(5)), 1);

    let window = downcast::<Window>(root.clone()).unwrap();
    let layout = downcast::<CenterBox>(window.child().unwrap()).unwrap();
    for slot in [layout.start(), layout.end()] {
        let label = downcast::<Label>(slot.unwrap()).unwrap();
        assert_eq!(label.text(), "42s");
    }

    unmount(&root);
    assert_eq!(handle.attached_count(), 0);
}

#[test]
fn test_late_children_attach_to_services() {
    let app = Application::new(ApplicationConfig::new("org.example.late"));
    let handle = app.register(ChannelService::<ClockCallback>::new(clock_schema()).0).unwrap();

    let row = Box::builder().build();
    let child = row.clone();
    app.set_root(move |_| Window::builder().child(child).build());
    app.activate().unwrap();
    assert_eq!(handle.attached_count(), 0);

    let label = row.append(clock_label());
    assert_eq!(handle.attached_count(), 1);

    row.remove(label.core().id());
    assert_eq!(handle.attached_count(), 0);
}

#[test]
fn test_run_until_quit() {
    let app = Application::new(ApplicationConfig::new("org.example.run"));
    let (service, sender) = ChannelService::<ClockCallback>::new(clock_schema());
    let handle = app.register(service).unwrap();

    app.set_root(|app| {
        let app = Arc::downgrade(app);
        Window::builder()
            .child(
                Label::builder()
                    .bindings(Bindings::new().from_annotation::<ClockCallback, _, _>("tick", move |label: &Label, args| {
                        label.set_text(args[0].to_string());
                        if let Some(app) = app.upgrade() {
                            app.quit();
                        }
                    }))
                    .build(),
            )
            .build()
    });

    sender.send(ServiceSignal::new("tick", [7i64])).unwrap();
    app.run().unwrap();

    let root = app.root().unwrap();
    assert!(!root.core().is_mounted());
    assert_eq!(handle.attached_count(), 0);

    let window = downcast::<Window>(root).unwrap();
    let label = downcast::<Label>(window.child().unwrap()).unwrap();
    assert_eq!(label.text(), "7");
}

#[test]
fn test_button_clicks_reach_bindings() {
    let button = Button::builder()
        .label("0")
        .bindings(Bindings::new().on("clicked", |button: &Button, _| {
            let label = downcast::<Label>(button.child().unwrap()).unwrap();
            let count = label.text().parse::<u32>().unwrap_or(0) + 1;
            label.set_text(count.to_string());
        }))
        .build();

    button.click();
    button.click();
    let label = downcast::<Label>(button.child().unwrap()).unwrap();
    assert_eq!(label.text(), "2");
}

#[test]
fn test_quit_while_activating() {
    let app = Application::new(ApplicationConfig::new("org.example.early-quit"));
    app.set_root(|app| {
        let app = Arc::downgrade(app);
        Window::builder()
            .bindings(Bindings::new().on("map", move |_: &Window, _| {
                if let Some(app) = app.upgrade() {
                    app.quit();
                }
            }))
            .build()
    });

    app.run().unwrap();
    assert!(!app.root().unwrap().core().is_mounted());
}
