//! Widgets and services shared by the integration tests.

#![allow(dead_code)]

use std::any::Any;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use borealis_core::{
    ArgKind, Bindings, EventSpec, ServiceAnnotation, SignalSchema, Value, Widget, WidgetCore,
    WidgetOptions,
};
use parking_lot::Mutex;

pub type Log = Arc<Mutex<Vec<String>>>;

pub struct HyprlandCallback;

impl ServiceAnnotation for HyprlandCallback {
    const PREFIX: &'static str = "hyprland-on";
}

pub struct HyprlandV2Callback;

impl ServiceAnnotation for HyprlandV2Callback {
    const PREFIX: &'static str = "hyprland-on-v2";
}

pub fn schema() -> SignalSchema {
    SignalSchema::new()
        .signal("workspace", [ArgKind::Str])
        .signal("fullscreen", [ArgKind::Bool])
        .signal("configreloaded", [])
}

/// A leaf widget that records what reaches it.
pub struct Probe {
    core: WidgetCore,
    pub name: &'static str,
    pub log: Log,
    pub hits: AtomicUsize,
}

impl Probe {
    pub fn new(name: &'static str, log: &Log, bindings: Bindings<Probe>) -> Arc<Self> {
        Self::with_options(name, log, WidgetOptions::default(), bindings)
    }

    pub fn with_options(
        name: &'static str,
        log: &Log,
        options: WidgetOptions,
        bindings: Bindings<Probe>,
    ) -> Arc<Self> {
        Arc::new_cyclic(|weak: &Weak<Probe>| Probe {
            core: WidgetCore::new(weak, "probe", &[EventSpec::unit("clicked")], options, bindings),
            name,
            log: log.clone(),
            hits: AtomicUsize::new(0),
        })
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

impl Widget for Probe {
    fn core(&self) -> &WidgetCore {
        &self.core
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// Push `"<name>:<first arg>"` to the probe's log.
pub fn record(probe: &Probe, args: &[Value]) {
    let arg = args.first().map(ToString::to_string).unwrap_or_default();
    probe.log.lock().push(format!("{}:{arg}", probe.name));
}

/// Count an invocation.
pub fn hit(probe: &Probe, _: &[Value]) {
    probe.hits.fetch_add(1, Ordering::SeqCst);
}

/// A container holding a fixed list of children.
pub struct Column {
    core: WidgetCore,
    children: Vec<Arc<dyn Widget>>,
}

impl Column {
    pub fn new(children: Vec<Arc<dyn Widget>>) -> Arc<Self> {
        Arc::new_cyclic(|weak: &Weak<Column>| {
            let parent: Weak<dyn Widget> = weak.clone();
            for child in &children {
                child.core().set_parent(parent.clone());
            }
            Column {
                core: WidgetCore::new(weak, "column", &[], WidgetOptions::default(), Bindings::new()),
                children,
            }
        })
    }
}

impl Widget for Column {
    fn core(&self) -> &WidgetCore {
        &self.core
    }

    fn children(&self) -> Vec<Arc<dyn Widget>> {
        self.children.clone()
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}
