//! Services: long-lived producers of named, typed signals.
//!
//! A [`Service`] runs on its own worker thread, reads some native event
//! source, and turns each logical event into a [`ServiceSignal`]. It never
//! touches widgets: every signal goes through a [`SignalSink`], which checks
//! it against the service's [`SignalSchema`] and posts it to the UI thread.
//! There, the service's [`ServiceHandle`] fans it out to every attached
//! widget, in attachment order.
//!
//! ```text
//! worker thread                     UI thread
//! ─────────────                     ─────────
//! Service::run ─► SignalSink::emit ─► UiSender ─► ServiceHandle::dispatch
//!                  (validate)                       └─► widget surfaces
//! ```
//!
//! # Example
//!
//! ```
//! use borealis_core::{ArgKind, ChannelService, ServiceAnnotation, ServiceSignal, SignalSchema};
//!
//! struct ClockCallback;
//! impl ServiceAnnotation for ClockCallback {
//!     const PREFIX: &'static str = "clock-on";
//! }
//!
//! let schema = SignalSchema::new().signal("tick", [ArgKind::Int]);
//! let (service, sender) = ChannelService::<ClockCallback>::new(schema);
//! sender.send(ServiceSignal::new("tick", [5i64])).unwrap();
//! # drop(service);
//! ```

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::marker::PhantomData;
use std::sync::{Arc, Weak};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender, unbounded};
use parking_lot::Mutex;

use crate::annotation::{Annotation, SEGMENT_SEPARATOR, ServiceAnnotation};
use crate::context::UiSender;
use crate::error::{BorealisError, DecodeError};
use crate::value::{ArgKind, ArgMismatch, Value, check_args};
use crate::widget::{Widget, WidgetId};

/// A service-originated message: a signal name plus ordered arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceSignal {
    name: String,
    args: Vec<Value>,
}

impl ServiceSignal {
    /// Create a signal.
    pub fn new<I, V>(name: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self {
            name: name.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// The signal name, unqualified.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The arguments, in order.
    pub fn args(&self) -> &[Value] {
        &self.args
    }
}

/// The full signal table of a service: name to ordered argument kinds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignalSchema {
    signals: BTreeMap<String, Vec<ArgKind>>,
}

impl SignalSchema {
    /// An empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a signal.
    pub fn signal(mut self, name: impl Into<String>, kinds: impl IntoIterator<Item = ArgKind>) -> Self {
        self.signals.insert(name.into(), kinds.into_iter().collect());
        self
    }

    /// The argument kinds of `signal`, or `None` if the service does not
    /// declare it.
    pub fn signal_arg_types(&self, signal: &str) -> Option<&[ArgKind]> {
        self.signals.get(signal).map(Vec::as_slice)
    }

    /// Check if the schema declares `signal`.
    pub fn contains(&self, signal: &str) -> bool {
        self.signals.contains_key(signal)
    }

    /// All declared signals, sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[ArgKind])> {
        self.signals.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Number of declared signals.
    pub fn len(&self) -> usize {
        self.signals.len()
    }

    /// Check if the schema is empty.
    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }

    /// Check a signal against the schema.
    ///
    /// # Errors
    ///
    /// Unknown names, wrong arity and wrong kinds are decode errors.
    pub fn validate(&self, signal: &ServiceSignal) -> Result<(), DecodeError> {
        let Some(kinds) = self.signal_arg_types(&signal.name) else {
            return Err(DecodeError::UnknownSignal {
                signal: signal.name.clone(),
            });
        };
        match check_args(kinds, &signal.args) {
            None => Ok(()),
            Some(ArgMismatch::Arity { expected, got }) => Err(DecodeError::Arity {
                signal: signal.name.clone(),
                expected,
                got,
            }),
            Some(ArgMismatch::Kind {
                index,
                expected,
                got,
            }) => Err(DecodeError::Kind {
                signal: signal.name.clone(),
                index,
                expected,
                got,
            }),
        }
    }

    /// Build a signal from raw text fields, parsing each as its declared
    /// kind.
    ///
    /// # Errors
    ///
    /// Unknown names, wrong field counts and unparseable fields.
    pub fn decode(&self, signal: &str, fields: &[&str]) -> Result<ServiceSignal, DecodeError> {
        let Some(kinds) = self.signal_arg_types(signal) else {
            return Err(DecodeError::UnknownSignal {
                signal: signal.to_string(),
            });
        };
        if kinds.len() != fields.len() {
            return Err(DecodeError::Arity {
                signal: signal.to_string(),
                expected: kinds.len(),
                got: fields.len(),
            });
        }
        let args = kinds
            .iter()
            .zip(fields)
            .enumerate()
            .map(|(index, (kind, raw))| {
                kind.parse(raw).ok_or_else(|| DecodeError::Parse {
                    signal: signal.to_string(),
                    index,
                    raw: (*raw).to_string(),
                    expected: *kind,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ServiceSignal {
            name: signal.to_string(),
            args,
        })
    }
}

/// A long-lived producer of signals.
///
/// Implementations block in [`run`](Service::run) for as long as their
/// event source lives. There is no cancellation; a service runs until its
/// source closes or the process exits.
pub trait Service: Send + 'static {
    /// The annotation widgets use to bind to this service.
    ///
    /// A service without one still runs, but no widget can reach it.
    fn annotation(&self) -> Option<Annotation>;

    /// Every signal this service can emit, declared ahead of time.
    fn schema(&self) -> SignalSchema;

    /// A readable name for logs.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Produce signals until the event source ends.
    ///
    /// Runs on a dedicated worker thread.
    ///
    /// # Errors
    ///
    /// A transport failure that ends the service. It is logged; other
    /// services keep running.
    fn run(self: Box<Self>, sink: SignalSink) -> Result<(), BorealisError>;
}

/// Worker-side half of a service: validates signals and hands them to the
/// UI thread.
#[derive(Clone)]
pub struct SignalSink {
    handle: Arc<ServiceHandle>,
    ui: UiSender,
}

impl SignalSink {
    pub(crate) fn new(handle: Arc<ServiceHandle>, ui: UiSender) -> Self {
        Self { handle, ui }
    }

    /// The schema signals are checked against.
    pub fn schema(&self) -> &SignalSchema {
        self.handle.schema()
    }

    /// Validate a signal and post it for dispatch.
    ///
    /// Invalid signals are logged and dropped; they never reach the UI
    /// thread. Signals are delivered in the order they are emitted.
    ///
    /// # Errors
    ///
    /// The decode error that caused the signal to be dropped.
    pub fn emit(&self, signal: ServiceSignal) -> Result<(), DecodeError> {
        if let Err(error) = self.handle.schema().validate(&signal) {
            tracing::warn!(
                target: "borealis_core::service",
                service = self.handle.name(),
                %error,
                "dropping invalid signal"
            );
            return Err(error);
        }
        let handle = self.handle.clone();
        if !self.ui.post(move || {
            handle.dispatch(&signal);
        }) {
            tracing::debug!(target: "borealis_core::service", service = self.handle.name(), "UI thread is gone");
        }
        Ok(())
    }

    /// Decode raw text fields against the schema and emit the result.
    ///
    /// # Errors
    ///
    /// See [`SignalSchema::decode`].
    pub fn emit_raw(&self, signal: &str, fields: &[&str]) -> Result<(), DecodeError> {
        match self.handle.schema().decode(signal, fields) {
            Ok(signal) => self.emit(signal),
            Err(error) => {
                tracing::warn!(
                    target: "borealis_core::service",
                    service = self.handle.name(),
                    %error,
                    "skipping undecodable event"
                );
                Err(error)
            }
        }
    }
}

impl fmt::Debug for SignalSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignalSink")
            .field("service", &self.handle.name())
            .finish()
    }
}

struct Attachment {
    id: WidgetId,
    widget: Weak<dyn Widget>,
    signals: HashSet<String>,
}

/// UI-side routing object for one registered service.
///
/// Tracks which widgets want which signals. A widget is attached only
/// between its mount and unmount.
pub struct ServiceHandle {
    name: &'static str,
    annotation: Option<Annotation>,
    schema: SignalSchema,
    /// In attachment order.
    attachments: Mutex<Vec<Attachment>>,
}

impl ServiceHandle {
    /// Create a handle describing `service`.
    pub fn new(service: &dyn Service) -> Self {
        Self {
            name: service.name(),
            annotation: service.annotation(),
            schema: service.schema(),
            attachments: Mutex::new(Vec::new()),
        }
    }

    /// The service name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The service annotation.
    pub fn annotation(&self) -> Option<Annotation> {
        self.annotation
    }

    /// The routing prefix, if annotated.
    pub fn prefix(&self) -> Option<&'static str> {
        self.annotation.map(|a| a.prefix())
    }

    /// The service schema.
    pub fn schema(&self) -> &SignalSchema {
        &self.schema
    }

    /// The argument kinds of `signal`.
    pub fn signal_arg_types(&self, signal: &str) -> Option<&[ArgKind]> {
        self.schema.signal_arg_types(signal)
    }

    /// The event name widgets see for `signal`.
    pub fn qualified_event(&self, signal: &str) -> String {
        match self.annotation {
            Some(annotation) => annotation.qualify(signal),
            None => format!("{}{SEGMENT_SEPARATOR}{signal}", self.name),
        }
    }

    /// Record that `widget` wants `signal`. Idempotent.
    ///
    /// Returns `true` if the interest is new.
    pub fn attach(&self, widget: &Arc<dyn Widget>, signal: &str) -> bool {
        let id = widget.core().id();
        let mut attachments = self.attachments.lock();
        let added = match attachments.iter_mut().find(|a| a.id == id) {
            Some(attachment) => attachment.signals.insert(signal.to_string()),
            None => {
                attachments.push(Attachment {
                    id,
                    widget: Arc::downgrade(widget),
                    signals: HashSet::from([signal.to_string()]),
                });
                true
            }
        };
        if added {
            tracing::debug!(target: "borealis_core::service", service = self.name, %id, signal, "widget attached");
        }
        added
    }

    /// Remove every interest of a widget. Returns `true` if it was attached.
    pub fn detach(&self, id: WidgetId) -> bool {
        let mut attachments = self.attachments.lock();
        let before = attachments.len();
        attachments.retain(|a| a.id != id);
        let removed = attachments.len() != before;
        if removed {
            tracing::debug!(target: "borealis_core::service", service = self.name, %id, "widget detached");
        }
        removed
    }

    /// Check if a widget is attached.
    pub fn is_attached(&self, id: WidgetId) -> bool {
        self.attachments.lock().iter().any(|a| a.id == id)
    }

    /// Number of attached widgets.
    pub fn attached_count(&self) -> usize {
        self.attachments.lock().len()
    }

    /// The signals a widget is attached for, sorted.
    pub fn attached_signals(&self, id: WidgetId) -> Vec<String> {
        let mut signals: Vec<String> = self
            .attachments
            .lock()
            .iter()
            .find(|a| a.id == id)
            .map(|a| a.signals.iter().cloned().collect())
            .unwrap_or_default();
        signals.sort();
        signals
    }

    /// Deliver a signal to every widget attached for it, in attachment
    /// order. Must run on the UI thread.
    ///
    /// A widget whose handlers fail does not stop delivery to the rest.
    /// Returns the number of widgets the signal was delivered to.
    pub fn dispatch(&self, signal: &ServiceSignal) -> usize {
        let event = self.qualified_event(&signal.name);
        let targets: Vec<Arc<dyn Widget>> = {
            let mut attachments = self.attachments.lock();
            attachments.retain(|a| a.widget.strong_count() > 0);
            attachments
                .iter()
                .filter(|a| a.signals.contains(&signal.name))
                .filter_map(|a| a.widget.upgrade())
                .collect()
        };
        tracing::trace!(
            target: "borealis_core::service",
            service = self.name,
            event = %event,
            targets = targets.len(),
            "dispatching signal"
        );

        let mut delivered = 0;
        for widget in targets {
            let core = widget.core();
            match core.surface().emit(&event, &signal.args) {
                Ok(_) => delivered += 1,
                Err(error) => tracing::warn!(
                    target: "borealis_core::service",
                    service = self.name,
                    widget = core.type_name(),
                    %error,
                    "failed to deliver signal"
                ),
            }
        }
        delivered
    }
}

impl fmt::Debug for ServiceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceHandle")
            .field("name", &self.name)
            .field("annotation", &self.annotation)
            .field("signals", &self.schema.len())
            .field("attached", &self.attached_count())
            .finish()
    }
}

/// Start a service on a named worker thread.
pub(crate) fn spawn_worker(
    service: Box<dyn Service>,
    handle: Arc<ServiceHandle>,
    ui: UiSender,
) -> std::io::Result<JoinHandle<()>> {
    let label = handle.prefix().unwrap_or(handle.name());
    let thread_name = format!("borealis-service-{label}");
    let sink = SignalSink::new(handle.clone(), ui);
    thread::Builder::new().name(thread_name).spawn(move || {
        tracing::info!(target: "borealis_core::service", service = handle.name(), "service started");
        match service.run(sink) {
            Ok(()) => tracing::info!(target: "borealis_core::service", service = handle.name(), "service stopped"),
            Err(error) => tracing::error!(
                target: "borealis_core::service",
                service = handle.name(),
                %error,
                "service failed"
            ),
        }
    })
}

/// A service fed through an in-process channel.
///
/// Useful for application-defined producers: any thread holding the
/// sender can push signals, which reach widgets like any other service's.
/// The service stops once every sender is dropped.
pub struct ChannelService<A> {
    schema: SignalSchema,
    receiver: Receiver<ServiceSignal>,
    _annotation: PhantomData<fn() -> A>,
}

impl<A: ServiceAnnotation> ChannelService<A> {
    /// Create the service and the sender that feeds it.
    pub fn new(schema: SignalSchema) -> (Self, Sender<ServiceSignal>) {
        let (sender, receiver) = unbounded();
        (
            Self {
                schema,
                receiver,
                _annotation: PhantomData,
            },
            sender,
        )
    }
}

impl<A: ServiceAnnotation> Service for ChannelService<A> {
    fn annotation(&self) -> Option<Annotation> {
        Some(Annotation::of::<A>())
    }

    fn schema(&self) -> SignalSchema {
        self.schema.clone()
    }

    fn run(self: Box<Self>, sink: SignalSink) -> Result<(), BorealisError> {
        for signal in self.receiver.iter() {
            // Invalid signals are logged by the sink.
            let _ = sink.emit(signal);
        }
        Ok(())
    }
}

static_assertions::assert_impl_all!(ServiceHandle: Send, Sync);
static_assertions::assert_impl_all!(SignalSink: Send, Sync);
