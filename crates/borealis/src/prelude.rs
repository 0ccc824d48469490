//! Prelude module for Borealis.
//!
//! ```
//! use borealis::prelude::*;
//! ```
//!
//! [`Box`](crate::widget::Box) is left out so it does not shadow
//! `std::boxed::Box`; import it from [`widget`](crate::widget).

// ============================================================================
// Application
// ============================================================================

pub use crate::config::BorealisConfig;
pub use crate::{Application, ApplicationConfig};

// ============================================================================
// Bindings and Values
// ============================================================================

pub use crate::{Annotated, AttrValue, Bindings, ServiceAnnotation, Value, callback};

// ============================================================================
// Services
// ============================================================================

pub use crate::{ChannelService, Service, ServiceSignal, SignalSchema};

// ============================================================================
// Widgets
// ============================================================================

pub use crate::widget::{Button, CenterBox, Label, Separator, Window, WidgetBuilder};
pub use crate::{CloneWidget, Widget, WidgetSource};

// ============================================================================
// Enums
// ============================================================================

pub use crate::enums::{Edge, Layer, Orientation};
