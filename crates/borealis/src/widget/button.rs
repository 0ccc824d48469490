//! Push button.
//!
//! A button holds one child (usually a [`Label`]) and emits
//! [`CLICKED`] when activated.
//!
//! ```
//! use borealis::prelude::*;
//!
//! let button = Button::builder()
//!     .label("Reload")
//!     .bindings(Bindings::new().on("clicked", |_: &Button, _| println!("reloading")))
//!     .build();
//! button.click();
//! ```

use std::any::Any;
use std::sync::{Arc, Weak};

use borealis_core::{CloneWidget, EmitReport, EventSpec, Widget, WidgetCore, WidgetSource};

use super::{Label, Slot, WidgetBuilder, WidgetSettings, copy_settings, parent_ref};

/// Emitted when the button is activated.
pub const CLICKED: &str = "clicked";

const EVENTS: &[EventSpec] = &[EventSpec::unit(CLICKED)];

/// A clickable widget with a single child.
pub struct Button {
    core: WidgetCore,
    settings: WidgetSettings<Button>,
    weak: Weak<Button>,
    child: Slot,
}

impl Button {
    /// A button with a text label.
    pub fn with_label(text: impl Into<String>) -> Arc<Self> {
        Self::builder().label(text).build()
    }

    /// Start building a button.
    pub fn builder() -> ButtonBuilder {
        ButtonBuilder::default()
    }

    /// The button's child.
    pub fn child(&self) -> Option<Arc<dyn Widget>> {
        self.child.get()
    }

    /// Replace the child.
    pub fn set_child(&self, source: Option<WidgetSource>) {
        self.child.set(self, &parent_ref(&self.weak), source.as_ref());
    }

    /// Activate the button, running its `clicked` handlers.
    pub fn click(&self) -> EmitReport {
        match self.core.emit(CLICKED, &[]) {
            Ok(report) => report,
            Err(error) => {
                tracing::warn!(target: "borealis::widget", %error, "click not delivered");
                EmitReport::default()
            }
        }
    }
}

impl Widget for Button {
    fn core(&self) -> &WidgetCore {
        &self.core
    }

    fn children(&self) -> Vec<Arc<dyn Widget>> {
        self.child.get().into_iter().collect()
    }

    fn duplicate(&self) -> Option<Arc<dyn Widget>> {
        Some(self.clone_widget())
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

impl CloneWidget for Button {
    fn clone_widget(&self) -> Arc<Self> {
        let settings = copy_settings(&self.settings, self);
        Arc::new_cyclic(|weak: &Weak<Button>| {
            let parent = parent_ref(weak);
            Button {
                core: WidgetCore::new(weak, "button", EVENTS, settings.options.clone(), settings.bindings.clone()),
                settings,
                weak: weak.clone(),
                child: Slot::copy_of(&self.child, &parent),
            }
        })
    }
}

/// Builder for [`Button`].
#[derive(Default)]
pub struct ButtonBuilder {
    settings: WidgetSettings<Button>,
    child: Option<WidgetSource>,
}

impl ButtonBuilder {
    /// The child widget.
    pub fn child(mut self, source: impl Into<WidgetSource>) -> Self {
        self.child = Some(source.into());
        self
    }

    /// Use a fresh [`Label`] showing `text` as the child.
    pub fn label(self, text: impl Into<String>) -> Self {
        self.child(Label::new(text))
    }
}

impl WidgetBuilder for ButtonBuilder {
    type Widget = Button;

    fn settings(&mut self) -> &mut WidgetSettings<Button> {
        &mut self.settings
    }

    fn build(self) -> Arc<Button> {
        let Self { settings, child } = self;
        Arc::new_cyclic(|weak: &Weak<Button>| {
            let parent = parent_ref(weak);
            Button {
                core: WidgetCore::new(weak, "button", EVENTS, settings.options.clone(), settings.bindings.clone()),
                settings,
                weak: weak.clone(),
                child: Slot::new(child.as_ref(), &parent),
            }
        })
    }
}
