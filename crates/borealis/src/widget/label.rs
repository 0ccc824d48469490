//! Label widget for text display.
//!
//! # Example
//!
//! ```
//! use borealis::prelude::*;
//!
//! let label = Label::new("Hello");
//! label.set_text("Hello, World!");
//! assert_eq!(label.text(), "Hello, World!");
//! ```

use std::any::Any;
use std::sync::{Arc, Weak};

use borealis_core::{CloneWidget, EventSpec, Widget, WidgetCore};
use parking_lot::RwLock;

use super::{WidgetBuilder, WidgetSettings, copy_settings};

const EVENTS: &[EventSpec] = &[];

/// A widget that displays text.
pub struct Label {
    core: WidgetCore,
    settings: WidgetSettings<Label>,
    text: RwLock<String>,
    /// Markup instead of plain text.
    markup: RwLock<bool>,
}

impl Label {
    /// A label showing `text`.
    pub fn new(text: impl Into<String>) -> Arc<Self> {
        Self::builder().text(text).build()
    }

    /// Start building a label.
    pub fn builder() -> LabelBuilder {
        LabelBuilder::default()
    }

    /// The displayed text.
    pub fn text(&self) -> String {
        self.text.read().clone()
    }

    /// Replace the displayed text.
    pub fn set_text(&self, text: impl Into<String>) {
        *self.text.write() = text.into();
    }

    /// Whether the text is markup.
    pub fn uses_markup(&self) -> bool {
        *self.markup.read()
    }

    /// Interpret the text as markup.
    pub fn set_use_markup(&self, markup: bool) {
        *self.markup.write() = markup;
    }
}

impl Widget for Label {
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

impl CloneWidget for Label {
    fn clone_widget(&self) -> Arc<Self> {
        LabelBuilder {
            settings: copy_settings(&self.settings, self),
            text: self.text(),
            markup: self.uses_markup(),
        }
        .build()
    }
}

impl std::fmt::Debug for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Label")
            .field("id", &self.core.id())
            .field("text", &*self.text.read())
            .finish_non_exhaustive()
    }
}

/// Builder for [`Label`].
#[derive(Default)]
pub struct LabelBuilder {
    settings: WidgetSettings<Label>,
    text: String,
    markup: bool,
}

impl LabelBuilder {
    /// Initial text.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Interpret the text as markup.
    pub fn markup(mut self, markup: bool) -> Self {
        self.markup = markup;
        self
    }
}

impl WidgetBuilder for LabelBuilder {
    type Widget = Label;

    fn settings(&mut self) -> &mut WidgetSettings<Label> {
        &mut self.settings
    }

    fn build(self) -> Arc<Label> {
        let Self {
            settings,
            text,
            markup,
        } = self;
        Arc::new_cyclic(|weak: &Weak<Label>| Label {
            core: WidgetCore::new(weak, "label", EVENTS, settings.options.clone(), settings.bindings.clone()),
            settings,
            text: RwLock::new(text),
            markup: RwLock::new(markup),
        })
    }
}
