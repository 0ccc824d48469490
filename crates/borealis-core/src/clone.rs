//! Materializing shared widget defaults.
//!
//! A widget type may use a pre-built widget as a default child. Handing the
//! same instance to two parents would alias it, so every use goes through
//! [`materialize`]: the first use claims the instance and gets it back
//! unchanged; every later use gets a deep copy.
//!
//! Copies are made with [`CloneWidget::clone_widget`] (or
//! [`Widget::duplicate`] for trait objects), which materialize nested widgets
//! by the same rule. A widget that cannot be copied is shared and a warning
//! is logged.
//!
//! [`WidgetSource::Factory`] sidesteps the question entirely by building a
//! fresh instance for every use.

use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;

use crate::widget::{Widget, WidgetId};

fn claimed() -> &'static Mutex<HashSet<WidgetId>> {
    static CLAIMED: OnceLock<Mutex<HashSet<WidgetId>>> = OnceLock::new();
    CLAIMED.get_or_init(|| Mutex::new(HashSet::new()))
}

/// Claim a widget identity. Returns `true` if it was unclaimed.
pub fn claim(id: WidgetId) -> bool {
    claimed().lock().insert(id)
}

/// Check if a widget identity is claimed.
pub fn is_claimed(id: WidgetId) -> bool {
    claimed().lock().contains(&id)
}

/// Forget a widget identity. Called when a widget is dropped.
pub(crate) fn release(id: WidgetId) {
    claimed().lock().remove(&id);
}

/// A widget that can produce a deep, independent copy of itself.
pub trait CloneWidget: Widget + Sized {
    /// Build a new instance from copies of this one's fields.
    ///
    /// Nested widgets are copied through [`materialize`] or
    /// [`materialize_dyn`].
    fn clone_widget(&self) -> Arc<Self>;
}

/// Hand out a widget for use in a tree.
///
/// The first use returns the instance itself; later uses return claimed
/// deep copies.
pub fn materialize<W: CloneWidget>(widget: &Arc<W>) -> Arc<W> {
    let id = widget.core().id();
    if claim(id) {
        return widget.clone();
    }
    let copy = widget.clone_widget();
    claim(copy.core().id());
    tracing::debug!(
        target: "borealis_core::clone",
        widget = widget.core().type_name(),
        source = %id,
        copy = %copy.core().id(),
        "widget copied"
    );
    copy
}

/// [`materialize`] for trait objects.
///
/// Widgets whose [`Widget::duplicate`] returns `None` are shared.
pub fn materialize_dyn(widget: &Arc<dyn Widget>) -> Arc<dyn Widget> {
    let core = widget.core();
    if claim(core.id()) {
        return widget.clone();
    }
    match widget.duplicate() {
        Some(copy) => {
            claim(copy.core().id());
            tracing::debug!(
                target: "borealis_core::clone",
                widget = core.type_name(),
                source = %core.id(),
                copy = %copy.core().id(),
                "widget copied"
            );
            copy
        }
        None => {
            tracing::warn!(
                target: "borealis_core::clone",
                widget = core.type_name(),
                id = %core.id(),
                "widget cannot be copied, sharing the instance"
            );
            widget.clone()
        }
    }
}

/// Where a child widget comes from.
#[derive(Clone)]
pub enum WidgetSource {
    /// A pre-built instance, materialized on each use.
    Shared(Arc<dyn Widget>),
    /// A constructor run on each use.
    Factory(Arc<dyn Fn() -> Arc<dyn Widget> + Send + Sync>),
}

impl WidgetSource {
    /// A source that builds a fresh widget on every use.
    pub fn factory<W, F>(f: F) -> Self
    where
        W: Widget,
        F: Fn() -> Arc<W> + Send + Sync + 'static,
    {
        Self::Factory(Arc::new(move || -> Arc<dyn Widget> { f() }))
    }

    /// Produce a widget for one use.
    pub fn instantiate(&self) -> Arc<dyn Widget> {
        match self {
            Self::Shared(widget) => materialize_dyn(widget),
            Self::Factory(f) => {
                let widget = f();
                claim(widget.core().id());
                widget
            }
        }
    }
}

impl<W: Widget> From<Arc<W>> for WidgetSource {
    fn from(widget: Arc<W>) -> Self {
        Self::Shared(widget)
    }
}

impl fmt::Debug for WidgetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shared(widget) => f
                .debug_tuple("Shared")
                .field(&widget.core().id())
                .finish(),
            Self::Factory(_) => f.write_str("Factory"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::any::Any;

    use super::*;
    use crate::binding::Bindings;
    use crate::widget::{WidgetCore, WidgetOptions};

    struct Leaf {
        core: WidgetCore,
    }

    impl Leaf {
        fn new() -> Arc<Self> {
            Arc::new_cyclic(|weak| Leaf {
                core: WidgetCore::new(weak, "leaf", &[], WidgetOptions::default(), Bindings::new()),
            })
        }
    }

    impl Widget for Leaf {
        fn core(&self) -> &WidgetCore {
            &self.core
        }

        fn duplicate(&self) -> Option<Arc<dyn Widget>> {
            Some(self.clone_widget())
        }

        fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
            self
        }
    }

    impl CloneWidget for Leaf {
        fn clone_widget(&self) -> Arc<Self> {
            Leaf::new()
        }
    }

    struct Opaque {
        core: WidgetCore,
    }

    impl Widget for Opaque {
        fn core(&self) -> &WidgetCore {
            &self.core
        }

        fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
            self
        }
    }

    #[test]
    fn test_first_use_is_free() {
        let leaf = Leaf::new();
        let first = materialize(&leaf);
        assert!(Arc::ptr_eq(&first, &leaf));

        let second = materialize(&leaf);
        assert!(!Arc::ptr_eq(&second, &leaf));
        assert!(is_claimed(second.core().id()));
    }

    #[test]
    fn test_opaque_widget_is_shared() {
        let opaque = Arc::new_cyclic(|weak| Opaque {
            core: WidgetCore::new(weak, "opaque", &[], WidgetOptions::default(), Bindings::new()),
        });
        let opaque: Arc<dyn Widget> = opaque;
        let a = materialize_dyn(&opaque);
        let b = materialize_dyn(&opaque);
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_factory_builds_fresh_instances() {
        let source = WidgetSource::factory(Leaf::new);
        let a = source.instantiate();
        let b = source.instantiate();
        assert_ne!(a.core().id(), b.core().id());
    }

    #[test]
    fn test_release_on_drop() {
        let leaf = Leaf::new();
        let id = leaf.core().id();
        let _ = materialize(&leaf);
        assert!(is_claimed(id));
        drop(leaf);
        assert!(!is_claimed(id));
    }
}
