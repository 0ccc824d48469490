//! Separator line.

use std::any::Any;
use std::sync::{Arc, Weak};

use borealis_core::{CloneWidget, EventSpec, Widget, WidgetCore};

use super::{WidgetBuilder, WidgetSettings, copy_settings};
use crate::enums::Orientation;

const EVENTS: &[EventSpec] = &[];

/// A thin line between widgets.
pub struct Separator {
    core: WidgetCore,
    settings: WidgetSettings<Separator>,
    orientation: Orientation,
}

impl Separator {
    /// A separator with the given orientation.
    pub fn new(orientation: Orientation) -> Arc<Self> {
        Self::builder().orientation(orientation).build()
    }

    /// Start building a separator.
    pub fn builder() -> SeparatorBuilder {
        SeparatorBuilder::default()
    }

    /// Line direction.
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }
}

impl Widget for Separator {
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

impl CloneWidget for Separator {
    fn clone_widget(&self) -> Arc<Self> {
        SeparatorBuilder {
            settings: copy_settings(&self.settings, self),
            orientation: self.orientation,
        }
        .build()
    }
}

/// Builder for [`Separator`].
#[derive(Default)]
pub struct SeparatorBuilder {
    settings: WidgetSettings<Separator>,
    orientation: Orientation,
}

impl SeparatorBuilder {
    /// Line direction.
    pub fn orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }
}

impl WidgetBuilder for SeparatorBuilder {
    type Widget = Separator;

    fn settings(&mut self) -> &mut WidgetSettings<Separator> {
        &mut self.settings
    }

    fn build(self) -> Arc<Separator> {
        let Self {
            mut settings,
            orientation,
        } = self;
        let class = orientation.css_class().to_string();
        if !settings.options.css_classes.contains(&class) {
            settings.options.css_classes.push(class);
        }
        Arc::new_cyclic(|weak: &Weak<Separator>| Separator {
            core: WidgetCore::new(weak, "separator", EVENTS, settings.options.clone(), settings.bindings.clone()),
            settings,
            orientation,
        })
    }
}
