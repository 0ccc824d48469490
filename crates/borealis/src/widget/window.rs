//! Top-level window.
//!
//! A window is the root of a widget tree. The application builds it at
//! activation and points it back at itself, which is how every widget in
//! the tree finds the application's services.
//!
//! ```no_run
//! use borealis::prelude::*;
//!
//! let app = Application::new(ApplicationConfig::new("org.example.bar"));
//! app.set_root(|_app| {
//!     Window::builder()
//!         .namespace("bar")
//!         .layer(Layer::Top)
//!         .anchors([Edge::Top, Edge::Left, Edge::Right])
//!         .exclusive(true)
//!         .child(Label::new("hello"))
//!         .build()
//! });
//! app.run_or_exit();
//! ```

use std::any::Any;
use std::sync::{Arc, Weak};

use borealis_core::{Application, EventSpec, Widget, WidgetCore, WidgetSource};
use parking_lot::RwLock;

use super::{Slot, WidgetBuilder, WidgetSettings, parent_ref};
use crate::enums::{Edge, Layer};

const EVENTS: &[EventSpec] = &[];

/// A layer-shell window holding one child.
pub struct Window {
    core: WidgetCore,
    weak: Weak<Window>,
    title: RwLock<String>,
    namespace: String,
    layer: Layer,
    anchors: Vec<Edge>,
    exclusive: bool,
    child: Slot,
}

impl Window {
    /// Start building a window.
    pub fn builder() -> WindowBuilder {
        WindowBuilder::default()
    }

    /// The window title.
    pub fn title(&self) -> String {
        self.title.read().clone()
    }

    /// Set the window title.
    pub fn set_title(&self, title: impl Into<String>) {
        *self.title.write() = title.into();
    }

    /// Layer-shell namespace.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Layer-shell layer.
    pub fn layer(&self) -> Layer {
        self.layer
    }

    /// Edges the window is anchored to.
    pub fn anchors(&self) -> &[Edge] {
        &self.anchors
    }

    /// Whether the window reserves its area so others do not overlap it.
    pub fn is_exclusive(&self) -> bool {
        self.exclusive
    }

    /// The window's child.
    pub fn child(&self) -> Option<Arc<dyn Widget>> {
        self.child.get()
    }

    /// Replace the child.
    pub fn set_child(&self, source: Option<WidgetSource>) {
        self.child.set(self, &parent_ref(&self.weak), source.as_ref());
    }

    /// The application this window belongs to, once activated.
    pub fn application(&self) -> Option<Arc<Application>> {
        self.core.application()
    }
}

impl Widget for Window {
    fn core(&self) -> &WidgetCore {
        &self.core
    }

    fn children(&self) -> Vec<Arc<dyn Widget>> {
        self.child.get().into_iter().collect()
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// Builder for [`Window`].
#[derive(Default)]
pub struct WindowBuilder {
    settings: WidgetSettings<Window>,
    title: String,
    namespace: Option<String>,
    layer: Layer,
    anchors: Vec<Edge>,
    exclusive: bool,
    child: Option<WidgetSource>,
}

impl WindowBuilder {
    /// Window title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Layer-shell namespace. Defaults to `borealis`.
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Layer-shell layer.
    pub fn layer(mut self, layer: Layer) -> Self {
        self.layer = layer;
        self
    }

    /// Edges to anchor to.
    pub fn anchors(mut self, anchors: impl IntoIterator<Item = Edge>) -> Self {
        for edge in anchors {
            if !self.anchors.contains(&edge) {
                self.anchors.push(edge);
            }
        }
        self
    }

    /// Reserve the window's area.
    pub fn exclusive(mut self, exclusive: bool) -> Self {
        self.exclusive = exclusive;
        self
    }

    /// The child widget.
    pub fn child(mut self, source: impl Into<WidgetSource>) -> Self {
        self.child = Some(source.into());
        self
    }
}

impl WidgetBuilder for WindowBuilder {
    type Widget = Window;

    fn settings(&mut self) -> &mut WidgetSettings<Window> {
        &mut self.settings
    }

    fn build(self) -> Arc<Window> {
        let Self {
            settings,
            title,
            namespace,
            layer,
            anchors,
            exclusive,
            child,
        } = self;
        Arc::new_cyclic(|weak: &Weak<Window>| {
            let parent = parent_ref(weak);
            Window {
                core: WidgetCore::new(weak, "window", EVENTS, settings.options, settings.bindings),
                weak: weak.clone(),
                title: RwLock::new(title),
                namespace: namespace.unwrap_or_else(|| "borealis".to_string()),
                layer,
                anchors,
                exclusive,
                child: Slot::new(child.as_ref(), &parent),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::Label;

    #[test]
    fn test_builder() {
        let window = Window::builder()
            .title("bar")
            .layer(Layer::Overlay)
            .anchors([Edge::Top, Edge::Left, Edge::Top])
            .child(Label::new("hello"))
            .build();
        assert_eq!(window.title(), "bar");
        assert_eq!(window.namespace(), "borealis");
        assert_eq!(window.layer(), Layer::Overlay);
        assert_eq!(window.anchors(), [Edge::Top, Edge::Left]);
        assert_eq!(window.children().len(), 1);
        assert!(window.application().is_none());
    }
}
