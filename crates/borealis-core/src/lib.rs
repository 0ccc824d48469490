//! Core systems for Borealis.
//!
//! This crate provides the machinery under the Borealis widget library:
//!
//! - **Main context**: a single-threaded loop owning timers and a queue of
//!   closures posted from worker threads
//! - **Event surfaces**: per-widget tables of named, typed events
//! - **Binding engine**: turns a widget's declared [`Bindings`] into signal
//!   handlers, interval and one-shot timers, and service subscriptions
//! - **Services**: long-running background producers whose signals are
//!   marshalled onto the UI thread and fanned out to subscribed widgets
//! - **Application**: the service registry and the root widget lifecycle
//! - **Widget copies**: [`materialize`] and [`WidgetSource`] keep shared
//!   default children from being aliased across parents
//!
//! # Binding Example
//!
//! ```
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::any::Any;
//!
//! use borealis_core::{Bindings, Widget, WidgetCore, WidgetOptions};
//!
//! struct Counter {
//!     core: WidgetCore,
//!     clicks: AtomicUsize,
//! }
//!
//! impl Widget for Counter {
//!     fn core(&self) -> &WidgetCore {
//!         &self.core
//!     }
//!
//!     fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
//!         self
//!     }
//! }
//!
//! let bindings = Bindings::new().on("map", |counter: &Counter, _args| {
//!     counter.clicks.fetch_add(1, Ordering::SeqCst);
//! });
//!
//! let counter = Arc::new_cyclic(|weak| Counter {
//!     core: WidgetCore::new(weak, "counter", &[], WidgetOptions::default(), bindings),
//!     clicks: AtomicUsize::new(0),
//! });
//!
//! counter.core().emit("map", &[]).unwrap();
//! assert_eq!(counter.clicks.load(Ordering::SeqCst), 1);
//! ```
//!
//! # Logging
//!
//! Every subsystem logs through `tracing` under its own target; see
//! [`logging`].

mod annotation;
mod application;
mod binding;
mod clone;
mod config;
mod context;
mod error;
pub mod logging;
pub mod naming;
mod service;
mod surface;
mod thread_check;
mod timer;
mod value;
mod widget;

pub use annotation::{
    Annotation, RESERVED_PREFIXES, RESERVED_SEPARATOR, SEGMENT_SEPARATOR, ServiceAnnotation,
};
pub use application::Application;
pub use binding::{Annotated, AttrValue, Bindings, Callback, HandlerOutput, callback};
pub use clone::{CloneWidget, WidgetSource, claim, is_claimed, materialize, materialize_dyn};
pub use config::{ApplicationConfig, DEFAULT_APPLICATION_ID};
pub use context::{MainContext, UiSender};
pub use error::{
    BindingError, BorealisError, CallbackError, CallbackResult, ConfigError, DecodeError, Result,
};
pub use service::{
    ChannelService, Service, ServiceHandle, ServiceSignal, SignalSchema, SignalSink,
};
pub use surface::{ConnectionId, EmitReport, EventSurface, Handler, handler};
pub use thread_check::{ThreadAffinity, are_thread_checks_enabled, set_thread_checks_enabled};
pub use timer::{ControlFlow, TimerId};
pub use value::{ArgKind, ArgMismatch, Value, check_args};
pub use widget::{
    COMMON_EVENTS, DESTROY, EventSpec, MAP, UNMAP, Widget, WidgetCore, WidgetId, WidgetOptions,
    application_of, destroy, downcast, mount, unmount,
};
