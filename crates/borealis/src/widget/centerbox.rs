//! Three-slot container keeping its middle child centered.

use std::any::Any;
use std::sync::{Arc, Weak};

use borealis_core::{CloneWidget, EventSpec, Widget, WidgetCore, WidgetSource};

use super::{Slot, WidgetBuilder, WidgetSettings, copy_settings, parent_ref};
use crate::enums::Orientation;

const EVENTS: &[EventSpec] = &[];

/// A container with start, center and end slots.
///
/// The usual top-level layout of a bar:
///
/// ```
/// use borealis::prelude::*;
///
/// let layout = CenterBox::builder()
///     .start(Label::new("workspaces"))
///     .center(Label::new("12:00"))
///     .end(Label::new("battery"))
///     .build();
/// assert!(layout.center().is_some());
/// ```
pub struct CenterBox {
    core: WidgetCore,
    settings: WidgetSettings<CenterBox>,
    weak: Weak<CenterBox>,
    orientation: Orientation,
    start: Slot,
    center: Slot,
    end: Slot,
}

impl CenterBox {
    /// Start building a center box.
    pub fn builder() -> CenterBoxBuilder {
        CenterBoxBuilder::default()
    }

    /// Layout direction.
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// The start child.
    pub fn start(&self) -> Option<Arc<dyn Widget>> {
        self.start.get()
    }

    /// The center child.
    pub fn center(&self) -> Option<Arc<dyn Widget>> {
        self.center.get()
    }

    /// The end child.
    pub fn end(&self) -> Option<Arc<dyn Widget>> {
        self.end.get()
    }

    /// Replace the start child.
    pub fn set_start(&self, source: Option<WidgetSource>) {
        self.start.set(self, &parent_ref(&self.weak), source.as_ref());
    }

    /// Replace the center child.
    pub fn set_center(&self, source: Option<WidgetSource>) {
        self.center.set(self, &parent_ref(&self.weak), source.as_ref());
    }

    /// Replace the end child.
    pub fn set_end(&self, source: Option<WidgetSource>) {
        self.end.set(self, &parent_ref(&self.weak), source.as_ref());
    }
}

impl Widget for CenterBox {
    fn core(&self) -> &WidgetCore {
        &self.core
    }

    fn children(&self) -> Vec<Arc<dyn Widget>> {
        [self.start(), self.center(), self.end()].into_iter().flatten().collect()
    }

    fn duplicate(&self) -> Option<Arc<dyn Widget>> {
        Some(self.clone_widget())
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

impl CloneWidget for CenterBox {
    fn clone_widget(&self) -> Arc<Self> {
        let settings = copy_settings(&self.settings, self);
        Arc::new_cyclic(|weak: &Weak<CenterBox>| {
            let parent = parent_ref(weak);
            CenterBox {
                core: WidgetCore::new(weak, "centerbox", EVENTS, settings.options.clone(), settings.bindings.clone()),
                settings,
                weak: weak.clone(),
                orientation: self.orientation,
                start: Slot::copy_of(&self.start, &parent),
                center: Slot::copy_of(&self.center, &parent),
                end: Slot::copy_of(&self.end, &parent),
            }
        })
    }
}

/// Builder for [`CenterBox`].
#[derive(Default)]
pub struct CenterBoxBuilder {
    settings: WidgetSettings<CenterBox>,
    orientation: Orientation,
    start: Option<WidgetSource>,
    center: Option<WidgetSource>,
    end: Option<WidgetSource>,
}

impl CenterBoxBuilder {
    /// Layout direction.
    pub fn orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    /// The start child.
    pub fn start(mut self, source: impl Into<WidgetSource>) -> Self {
        self.start = Some(source.into());
        self
    }

    /// The center child.
    pub fn center(mut self, source: impl Into<WidgetSource>) -> Self {
        self.center = Some(source.into());
        self
    }

    /// The end child.
    pub fn end(mut self, source: impl Into<WidgetSource>) -> Self {
        self.end = Some(source.into());
        self
    }
}

impl WidgetBuilder for CenterBoxBuilder {
    type Widget = CenterBox;

    fn settings(&mut self) -> &mut WidgetSettings<CenterBox> {
        &mut self.settings
    }

    fn build(self) -> Arc<CenterBox> {
        let Self {
            mut settings,
            orientation,
            start,
            center,
            end,
        } = self;
        let class = orientation.css_class().to_string();
        if !settings.options.css_classes.contains(&class) {
            settings.options.css_classes.push(class);
        }
        Arc::new_cyclic(|weak: &Weak<CenterBox>| {
            let parent = parent_ref(weak);
            CenterBox {
                core: WidgetCore::new(weak, "centerbox", EVENTS, settings.options.clone(), settings.bindings.clone()),
                settings,
                weak: weak.clone(),
                orientation,
                start: Slot::new(start.as_ref(), &parent),
                center: Slot::new(center.as_ref(), &parent),
                end: Slot::new(end.as_ref(), &parent),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::Label;

    #[test]
    fn test_children_in_slot_order() {
        let layout = CenterBox::builder()
            .end(Label::new("end"))
            .start(Label::new("start"))
            .build();
        let children = layout.children();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].core().id(), layout.start().unwrap().core().id());
        assert_eq!(children[1].core().id(), layout.end().unwrap().core().id());
        assert!(layout.center().is_none());
    }

    #[test]
    fn test_set_center() {
        let layout = CenterBox::builder().orientation(Orientation::Vertical).build();
        layout.set_center(Some(Label::new("clock").into()));
        assert!(layout.center().is_some());
        assert!(layout.core().has_css_class("vertical"));
    }
}
