//! Linear container.
//!
//! ```
//! use borealis::prelude::*;
//! use borealis::widget::Box;
//!
//! let row = Box::builder()
//!     .orientation(Orientation::Horizontal)
//!     .spacing(4)
//!     .child(Label::new("cpu"))
//!     .child(WidgetSource::factory(|| Label::new("mem")))
//!     .build();
//! assert_eq!(row.len(), 2);
//! ```

use std::any::Any;
use std::sync::{Arc, Weak};

use borealis_core::{CloneWidget, EventSpec, Widget, WidgetCore, WidgetId, WidgetSource, materialize_dyn, mount};
use parking_lot::RwLock;

use super::{WidgetBuilder, WidgetSettings, adopt, copy_settings, parent_ref, release};
use crate::enums::Orientation;

const EVENTS: &[EventSpec] = &[];

/// Lays its children out in a row or a column.
pub struct Box {
    core: WidgetCore,
    settings: WidgetSettings<Box>,
    weak: Weak<Box>,
    orientation: Orientation,
    spacing: u32,
    children: RwLock<Vec<Arc<dyn Widget>>>,
}

impl Box {
    /// Start building a box.
    pub fn builder() -> BoxBuilder {
        BoxBuilder::default()
    }

    /// Layout direction.
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Gap between children, in pixels.
    pub fn spacing(&self) -> u32 {
        self.spacing
    }

    /// Number of children.
    pub fn len(&self) -> usize {
        self.children.read().len()
    }

    /// Check if the box has no children.
    pub fn is_empty(&self) -> bool {
        self.children.read().is_empty()
    }

    /// Add a child at the end. It is mounted right away if the box is.
    pub fn append(&self, source: impl Into<WidgetSource>) -> Arc<dyn Widget> {
        let child = adopt(source.into().instantiate(), &parent_ref(&self.weak));
        self.children.write().push(child.clone());
        if self.core.is_mounted() {
            mount(&child);
        }
        child
    }

    /// Remove a child. Returns `false` if it is not a child of this box.
    pub fn remove(&self, id: WidgetId) -> bool {
        let removed = {
            let mut children = self.children.write();
            let Some(index) = children.iter().position(|c| c.core().id() == id) else {
                return false;
            };
            children.remove(index)
        };
        release(self, Some(removed));
        true
    }
}

impl Widget for Box {
    fn core(&self) -> &WidgetCore {
        &self.core
    }

    fn children(&self) -> Vec<Arc<dyn Widget>> {
        self.children.read().clone()
    }

    fn duplicate(&self) -> Option<Arc<dyn Widget>> {
        Some(self.clone_widget())
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

impl CloneWidget for Box {
    fn clone_widget(&self) -> Arc<Self> {
        let settings = copy_settings(&self.settings, self);
        let sources = self.children();
        Arc::new_cyclic(|weak: &Weak<Box>| {
            let parent = parent_ref(weak);
            let children = sources
                .iter()
                .map(|child| adopt(materialize_dyn(child), &parent))
                .collect();
            Box {
                core: WidgetCore::new(weak, "box", EVENTS, settings.options.clone(), settings.bindings.clone()),
                settings,
                weak: weak.clone(),
                orientation: self.orientation,
                spacing: self.spacing,
                children: RwLock::new(children),
            }
        })
    }
}

/// Builder for [`Box`].
#[derive(Default)]
pub struct BoxBuilder {
    settings: WidgetSettings<Box>,
    orientation: Orientation,
    spacing: u32,
    children: Vec<WidgetSource>,
}

impl BoxBuilder {
    /// Layout direction.
    pub fn orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    /// Gap between children, in pixels.
    pub fn spacing(mut self, spacing: u32) -> Self {
        self.spacing = spacing;
        self
    }

    /// Add a child.
    pub fn child(mut self, source: impl Into<WidgetSource>) -> Self {
        self.children.push(source.into());
        self
    }

    /// Add several children.
    pub fn children<I>(mut self, sources: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<WidgetSource>,
    {
        self.children.extend(sources.into_iter().map(Into::into));
        self
    }
}

impl WidgetBuilder for BoxBuilder {
    type Widget = Box;

    fn settings(&mut self) -> &mut WidgetSettings<Box> {
        &mut self.settings
    }

    fn build(self) -> Arc<Box> {
        let Self {
            mut settings,
            orientation,
            spacing,
            children,
        } = self;
        let class = orientation.css_class().to_string();
        if !settings.options.css_classes.contains(&class) {
            settings.options.css_classes.push(class);
        }
        Arc::new_cyclic(|weak: &Weak<Box>| {
            let parent = parent_ref(weak);
            let children = children.iter().map(|s| adopt(s.instantiate(), &parent)).collect();
            Box {
                core: WidgetCore::new(weak, "box", EVENTS, settings.options.clone(), settings.bindings.clone()),
                settings,
                weak: weak.clone(),
                orientation,
                spacing,
                children: RwLock::new(children),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::Label;

    #[test]
    fn test_children_are_adopted() {
        let row = Box::builder().child(Label::new("a")).child(Label::new("b")).build();
        assert_eq!(row.len(), 2);
        for child in row.children() {
            assert_eq!(child.core().parent().unwrap().core().id(), row.core().id());
        }
        assert!(row.core().has_css_class("horizontal"));
    }

    #[test]
    fn test_append_and_remove() {
        let column = Box::builder().orientation(Orientation::Vertical).build();
        assert!(column.is_empty());

        let child = column.append(Label::new("a"));
        assert_eq!(column.len(), 1);
        assert!(column.remove(child.core().id()));
        assert!(!column.remove(child.core().id()));
        assert!(child.core().parent().is_none());
    }

    #[test]
    fn test_append_mounts_when_mounted() {
        let row = Box::builder().build();
        let widget: Arc<dyn Widget> = row.clone();
        mount(&widget);

        let child = row.append(Label::new("late"));
        assert!(child.core().is_mounted());
        assert!(row.remove(child.core().id()));
        assert!(!child.core().is_mounted());
    }
}
