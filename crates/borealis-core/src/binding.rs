//! Declarative binding tables.
//!
//! A [`Bindings<W>`] collects everything a widget of type `W` reacts to:
//! its own events, repeating and single-shot timers, and service signals.
//! The table is consumed when the widget is built: timers and event handlers
//! are registered right away, service bindings once the widget is mounted
//! under an application.
//!
//! Bindings can be added through the typed methods ([`on`](Bindings::on),
//! [`every`](Bindings::every), [`once`](Bindings::once),
//! [`from_service`](Bindings::from_service),
//! [`from_annotation`](Bindings::from_annotation)) or by attribute name with
//! [`declare`](Bindings::declare), which follows the naming convention
//! described in [`naming`](crate::naming).
//!
//! # Example
//!
//! ```
//! use borealis_core::{Annotated, AttrValue, Bindings, callback};
//! # use borealis_core::{Widget, WidgetCore};
//! # use std::sync::Arc;
//! # struct Clock { core: WidgetCore }
//! # impl Widget for Clock {
//! #     fn core(&self) -> &WidgetCore { &self.core }
//! #     fn into_any(self: Arc<Self>) -> Arc<dyn std::any::Any + Send + Sync> { self }
//! # }
//!
//! let bindings = Bindings::<Clock>::new()
//!     .every(1000, |_clock, _| println!("tick"))
//!     .declare("on_map", AttrValue::callback(|_clock: &Clock, _| println!("mapped")))
//!     .declare("hyprland_on_workspace", AttrValue::callback(|_clock: &Clock, args| {
//!         println!("workspace {}", args[0]);
//!     }))
//!     .annotated("refresh", Annotated::interval([500, 2000]), callback(|_clock: &Clock, _| {}));
//! assert_eq!(bindings.len(), 4);
//! ```

use std::fmt;
use std::sync::Arc;

use crate::annotation::{Annotation, ServiceAnnotation};
use crate::error::{CallbackError, CallbackResult};
use crate::value::Value;

/// A widget callback: the widget plus the event's arguments.
///
/// Timer callbacks receive an empty argument slice.
pub type Callback<W> = Arc<dyn Fn(&W, &[Value]) -> CallbackResult + Send + Sync + 'static>;

/// Return types accepted from user callbacks.
pub trait HandlerOutput {
    /// Normalize to a [`CallbackResult`].
    fn into_result(self) -> CallbackResult;
}

impl HandlerOutput for () {
    fn into_result(self) -> CallbackResult {
        Ok(())
    }
}

impl<E: Into<CallbackError>> HandlerOutput for Result<(), E> {
    fn into_result(self) -> CallbackResult {
        self.map_err(Into::into)
    }
}

/// Wrap a closure as a [`Callback`].
pub fn callback<W, F, R>(f: F) -> Callback<W>
where
    W: 'static,
    F: Fn(&W, &[Value]) -> R + Send + Sync + 'static,
    R: HandlerOutput,
{
    Arc::new(move |widget: &W, args: &[Value]| f(widget, args).into_result())
}

/// The value of a name-declared attribute.
pub enum AttrValue<W> {
    /// A single callback.
    Callback(Callback<W>),
    /// Several callbacks, registered in order.
    Callbacks(Vec<Callback<W>>),
    /// A plain value. Only meaningful outside the reserved prefixes.
    Value(Value),
}

impl<W> AttrValue<W> {
    /// A single callback from a closure.
    pub fn callback<F, R>(f: F) -> Self
    where
        F: Fn(&W, &[Value]) -> R + Send + Sync + 'static,
        R: HandlerOutput,
        W: 'static,
    {
        Self::Callback(callback(f))
    }

    /// The callbacks carried, or `None` for a plain value.
    pub(crate) fn into_callbacks(self) -> Option<Vec<Callback<W>>> {
        match self {
            Self::Callback(cb) => Some(vec![cb]),
            Self::Callbacks(cbs) => Some(cbs),
            Self::Value(_) => None,
        }
    }
}

impl<W> Clone for AttrValue<W> {
    fn clone(&self) -> Self {
        match self {
            Self::Callback(cb) => Self::Callback(cb.clone()),
            Self::Callbacks(cbs) => Self::Callbacks(cbs.clone()),
            Self::Value(v) => Self::Value(v.clone()),
        }
    }
}

impl<W> fmt::Debug for AttrValue<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Callback(_) => f.write_str("Callback"),
            Self::Callbacks(cbs) => write!(f, "Callbacks({})", cbs.len()),
            Self::Value(v) => f.debug_tuple("Value").field(v).finish(),
        }
    }
}

impl<W> From<Value> for AttrValue<W> {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl<W> From<Callback<W>> for AttrValue<W> {
    fn from(cb: Callback<W>) -> Self {
        Self::Callback(cb)
    }
}

impl<W> From<Vec<Callback<W>>> for AttrValue<W> {
    fn from(cbs: Vec<Callback<W>>) -> Self {
        Self::Callbacks(cbs)
    }
}

/// A type-level annotation registering one callback under several triggers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Annotated {
    /// Equivalent to `on_<name>` for each name.
    Signal(Vec<String>),
    /// Equivalent to `interval_<ms>` for each interval.
    Interval(Vec<u64>),
    /// Equivalent to `oneshot_<ms>` for each delay.
    Oneshot(Vec<u64>),
    /// Bind the named signals of the service registered under `annotation`.
    Service {
        /// The service family.
        annotation: Annotation,
        /// Signals to bind.
        signals: Vec<String>,
    },
}

impl Annotated {
    /// Signal callback tagged with event names.
    pub fn signal<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Signal(names.into_iter().map(Into::into).collect())
    }

    /// Interval callback tagged with periods in milliseconds.
    pub fn interval(periods: impl IntoIterator<Item = u64>) -> Self {
        Self::Interval(periods.into_iter().collect())
    }

    /// Oneshot callback tagged with delays in milliseconds.
    pub fn oneshot(delays: impl IntoIterator<Item = u64>) -> Self {
        Self::Oneshot(delays.into_iter().collect())
    }

    /// Service callback tagged with signal names of service family `A`.
    pub fn service<A, I, S>(signals: I) -> Self
    where
        A: ServiceAnnotation,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Service {
            annotation: Annotation::of::<A>(),
            signals: signals.into_iter().map(Into::into).collect(),
        }
    }
}

/// Where a service binding's service comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ServiceTarget {
    /// A hyphenated attribute name to match against live prefixes.
    Candidate(String),
    /// An explicit prefix and signal.
    Prefix { prefix: String, signal: String },
    /// A service family and signal.
    Annotation { annotation: Annotation, signal: String },
}

/// One resolved trigger.
pub(crate) enum Binding<W> {
    Signal { event: String, callback: Callback<W> },
    Interval { ms: u64, callback: Callback<W> },
    Oneshot { ms: u64, callback: Callback<W> },
    Service { target: ServiceTarget, callback: Callback<W> },
}

impl<W> Clone for Binding<W> {
    fn clone(&self) -> Self {
        match self {
            Self::Signal { event, callback } => Self::Signal {
                event: event.clone(),
                callback: callback.clone(),
            },
            Self::Interval { ms, callback } => Self::Interval {
                ms: *ms,
                callback: callback.clone(),
            },
            Self::Oneshot { ms, callback } => Self::Oneshot {
                ms: *ms,
                callback: callback.clone(),
            },
            Self::Service { target, callback } => Self::Service {
                target: target.clone(),
                callback: callback.clone(),
            },
        }
    }
}

/// A single entry of a binding table.
pub(crate) enum Entry<W> {
    /// Added through a typed method; never replaced.
    Direct(Binding<W>),
    /// Declared under an attribute name.
    Named { attr: String, value: AttrValue<W> },
    /// Declared under an attribute name with a type-level annotation.
    Annotated {
        attr: String,
        annotation: Annotated,
        callback: Callback<W>,
    },
}

impl<W> Entry<W> {
    fn attr(&self) -> Option<&str> {
        match self {
            Self::Direct(_) => None,
            Self::Named { attr, .. } | Self::Annotated { attr, .. } => Some(attr.as_str()),
        }
    }
}

impl<W> Clone for Entry<W> {
    fn clone(&self) -> Self {
        match self {
            Self::Direct(binding) => Self::Direct(binding.clone()),
            Self::Named { attr, value } => Self::Named {
                attr: attr.clone(),
                value: value.clone(),
            },
            Self::Annotated {
                attr,
                annotation,
                callback,
            } => Self::Annotated {
                attr: attr.clone(),
                annotation: annotation.clone(),
                callback: callback.clone(),
            },
        }
    }
}

/// The binding table of a widget type.
///
/// Cloning is cheap: callbacks are shared.
pub struct Bindings<W> {
    entries: Vec<Entry<W>>,
}

impl<W: 'static> Bindings<W> {
    /// An empty table.
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    fn push(mut self, binding: Binding<W>) -> Self {
        self.entries.push(Entry::Direct(binding));
        self
    }

    /// Bind a callback to one of the widget's own events.
    pub fn on<F, R>(self, event: &str, f: F) -> Self
    where
        F: Fn(&W, &[Value]) -> R + Send + Sync + 'static,
        R: HandlerOutput,
    {
        self.push(Binding::Signal {
            event: crate::naming::event_name(event),
            callback: callback(f),
        })
    }

    /// Run a callback every `ms` milliseconds.
    pub fn every<F, R>(self, ms: u64, f: F) -> Self
    where
        F: Fn(&W, &[Value]) -> R + Send + Sync + 'static,
        R: HandlerOutput,
    {
        self.push(Binding::Interval {
            ms,
            callback: callback(f),
        })
    }

    /// Run a callback once, `ms` milliseconds after construction.
    pub fn once<F, R>(self, ms: u64, f: F) -> Self
    where
        F: Fn(&W, &[Value]) -> R + Send + Sync + 'static,
        R: HandlerOutput,
    {
        self.push(Binding::Oneshot {
            ms,
            callback: callback(f),
        })
    }

    /// Bind a service signal by the service's prefix.
    pub fn from_service<F, R>(self, prefix: &str, signal: &str, f: F) -> Self
    where
        F: Fn(&W, &[Value]) -> R + Send + Sync + 'static,
        R: HandlerOutput,
    {
        self.push(Binding::Service {
            target: ServiceTarget::Prefix {
                prefix: prefix.to_string(),
                signal: signal.to_string(),
            },
            callback: callback(f),
        })
    }

    /// Bind a service signal by the service's annotation type.
    pub fn from_annotation<A, F, R>(self, signal: &str, f: F) -> Self
    where
        A: ServiceAnnotation,
        F: Fn(&W, &[Value]) -> R + Send + Sync + 'static,
        R: HandlerOutput,
    {
        self.push(Binding::Service {
            target: ServiceTarget::Annotation {
                annotation: Annotation::of::<A>(),
                signal: signal.to_string(),
            },
            callback: callback(f),
        })
    }

    /// Declare an attribute by name.
    ///
    /// Declaring the same name twice keeps only the last value.
    pub fn declare(mut self, attr: &str, value: impl Into<AttrValue<W>>) -> Self {
        self.replace(Entry::Named {
            attr: attr.to_string(),
            value: value.into(),
        });
        self
    }

    /// Declare an attribute with a type-level annotation.
    pub fn annotated(mut self, attr: &str, annotation: Annotated, callback: Callback<W>) -> Self {
        self.replace(Entry::Annotated {
            attr: attr.to_string(),
            annotation,
            callback,
        });
        self
    }

    /// Apply construction-time overrides.
    ///
    /// Named entries of `overrides` replace same-named entries of `self`;
    /// everything else is appended.
    pub fn merge(mut self, overrides: Bindings<W>) -> Self {
        for entry in overrides.entries {
            self.replace(entry);
        }
        self
    }

    fn replace(&mut self, entry: Entry<W>) {
        if let Some(attr) = entry.attr() {
            self.entries.retain(|e| e.attr() != Some(attr));
        }
        self.entries.push(entry);
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check if an attribute name is declared.
    pub fn is_declared(&self, attr: &str) -> bool {
        self.entries.iter().any(|e| e.attr() == Some(attr))
    }

    pub(crate) fn into_entries(self) -> Vec<Entry<W>> {
        self.entries
    }
}

impl<W: 'static> Default for Bindings<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W> Clone for Bindings<W> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl<W> fmt::Debug for Bindings<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let attrs: Vec<&str> = self.entries.iter().filter_map(Entry::attr).collect();
        f.debug_struct("Bindings")
            .field("entries", &self.entries.len())
            .field("named", &attrs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Dummy;

    fn noop() -> Callback<Dummy> {
        callback(|_: &Dummy, _| {})
    }

    #[test]
    fn test_declare_last_write_wins() {
        let bindings = Bindings::<Dummy>::new()
            .declare("on_clicked", noop())
            .declare("on_clicked", vec![noop(), noop()]);
        assert_eq!(bindings.len(), 1);
        match &bindings.entries[0] {
            Entry::Named {
                value: AttrValue::Callbacks(cbs),
                ..
            } => assert_eq!(cbs.len(), 2),
            _ => panic!("expected the second declaration"),
        }
    }

    #[test]
    fn test_merge_replaces_named_and_appends_direct() {
        let defaults = Bindings::<Dummy>::new()
            .every(100, |_, _| {})
            .declare("label", Value::from("default"));
        let overrides = Bindings::<Dummy>::new()
            .every(100, |_, _| {})
            .declare("label", Value::from("override"));

        let merged = defaults.merge(overrides);
        assert_eq!(merged.len(), 3);
        assert!(merged.is_declared("label"));
    }

    #[test]
    fn test_callback_output_kinds() {
        let ok = callback(|_: &Dummy, _| {});
        let fallible = callback(|_: &Dummy, _| -> Result<(), std::io::Error> {
            Err(std::io::Error::other("nope"))
        });
        assert!(ok(&Dummy, &[]).is_ok());
        assert!(fallible(&Dummy, &[]).is_err());
    }

    #[test]
    fn test_annotated_constructors() {
        assert_eq!(
            Annotated::signal(["clicked", "map"]),
            Annotated::Signal(vec!["clicked".into(), "map".into()])
        );
        assert_eq!(Annotated::interval([1, 2]), Annotated::Interval(vec![1, 2]));
    }
}
