//! Concrete widgets.
//!
//! Every widget here is headless: it owns a [`WidgetCore`] and the state a
//! renderer would need, and nothing else. Widgets are built with a builder
//! and live in an `Arc`:
//!
//! ```
//! use borealis::prelude::*;
//!
//! let label = Label::builder()
//!     .text("12:00")
//!     .css_class("clock")
//!     .bindings(Bindings::new().every(1000, |label: &Label, _| label.set_text("12:01")))
//!     .build();
//! assert_eq!(label.text(), "12:00");
//! ```
//!
//! Containers take their children as [`WidgetSource`]s, so a pre-built
//! widget passed to several containers is copied rather than shared.

mod r#box;
mod button;
mod centerbox;
mod label;
mod separator;
mod window;

use std::sync::{Arc, Weak};

use borealis_core::{Bindings, Widget, WidgetOptions, WidgetSource, mount, unmount};
use parking_lot::RwLock;

pub use self::r#box::{Box, BoxBuilder};
pub use button::{Button, ButtonBuilder, CLICKED};
pub use centerbox::{CenterBox, CenterBoxBuilder};
pub use label::{Label, LabelBuilder};
pub use separator::{Separator, SeparatorBuilder};
pub use window::{Window, WindowBuilder};

static_assertions::assert_impl_all!(Box: Send, Sync, Widget);
static_assertions::assert_impl_all!(Button: Send, Sync, Widget);
static_assertions::assert_impl_all!(CenterBox: Send, Sync, Widget);
static_assertions::assert_impl_all!(Label: Send, Sync, Widget);
static_assertions::assert_impl_all!(Separator: Send, Sync, Widget);
static_assertions::assert_impl_all!(Window: Send, Sync, Widget);

/// Settings every widget builder carries.
pub struct WidgetSettings<W> {
    /// Per-instance options.
    pub options: WidgetOptions,
    /// Bindings applied at construction.
    pub bindings: Bindings<W>,
}

impl<W: 'static> Default for WidgetSettings<W> {
    fn default() -> Self {
        Self {
            options: WidgetOptions::default(),
            bindings: Bindings::new(),
        }
    }
}

impl<W> Clone for WidgetSettings<W> {
    fn clone(&self) -> Self {
        Self {
            options: self.options.clone(),
            bindings: self.bindings.clone(),
        }
    }
}

/// Builder methods shared by every widget.
pub trait WidgetBuilder: Sized {
    /// The widget built.
    type Widget: Widget;

    /// The common settings.
    fn settings(&mut self) -> &mut WidgetSettings<Self::Widget>;

    /// Build the widget.
    fn build(self) -> Arc<Self::Widget>;

    /// Add a CSS class.
    fn css_class(mut self, class: impl Into<String>) -> Self {
        let class = class.into();
        let classes = &mut self.settings().options.css_classes;
        if !classes.contains(&class) {
            classes.push(class);
        }
        self
    }

    /// Add bindings. Named declarations replace earlier ones of the same
    /// name.
    fn bindings(mut self, bindings: Bindings<Self::Widget>) -> Self {
        let settings = self.settings();
        settings.bindings = std::mem::take(&mut settings.bindings).merge(bindings);
        self
    }

    /// Whether service bindings are resolved on mount.
    fn map_services(mut self, enabled: bool) -> Self {
        self.settings().options.map_services = enabled;
        self
    }
}

/// Settings for a copy of a widget: its construction settings with the
/// current CSS classes.
pub(crate) fn copy_settings<W: Widget>(settings: &WidgetSettings<W>, widget: &W) -> WidgetSettings<W> {
    let mut copy = settings.clone();
    copy.options.css_classes = widget.core().css_classes();
    copy
}

/// A single-child slot.
pub(crate) struct Slot {
    child: RwLock<Option<Arc<dyn Widget>>>,
}

impl Slot {
    /// A slot filled from `source` and adopted by `parent`.
    pub(crate) fn new(source: Option<&WidgetSource>, parent: &Weak<dyn Widget>) -> Self {
        let child = source.map(|s| adopt(s.instantiate(), parent));
        Self {
            child: RwLock::new(child),
        }
    }

    /// A slot holding copies of `other`'s child, adopted by `parent`.
    pub(crate) fn copy_of(other: &Slot, parent: &Weak<dyn Widget>) -> Self {
        let child = other
            .get()
            .map(|c| adopt(borealis_core::materialize_dyn(&c), parent));
        Self {
            child: RwLock::new(child),
        }
    }

    pub(crate) fn get(&self) -> Option<Arc<dyn Widget>> {
        self.child.read().clone()
    }

    /// Replace the child, mounting the new one if `owner` is mounted.
    pub(crate) fn set(&self, owner: &dyn Widget, parent: &Weak<dyn Widget>, source: Option<&WidgetSource>) {
        let new = source.map(|s| adopt(s.instantiate(), parent));
        let old = std::mem::replace(&mut *self.child.write(), new.clone());
        release(owner, old);
        if let Some(child) = new {
            if owner.core().is_mounted() {
                mount(&child);
            }
        }
    }
}

/// Set `child`'s parent.
pub(crate) fn adopt(child: Arc<dyn Widget>, parent: &Weak<dyn Widget>) -> Arc<dyn Widget> {
    child.core().set_parent(parent.clone());
    child
}

/// Detach a removed child from `owner`.
pub(crate) fn release(owner: &dyn Widget, child: Option<Arc<dyn Widget>>) {
    let Some(child) = child else {
        return;
    };
    if owner.core().is_mounted() {
        unmount(&child);
    }
    child.core().clear_parent();
}

/// Upcast a widget's self-reference for [`adopt`].
pub(crate) fn parent_ref<W: Widget>(weak: &Weak<W>) -> Weak<dyn Widget> {
    weak.clone()
}
