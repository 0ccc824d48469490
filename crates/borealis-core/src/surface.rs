//! Per-widget dynamic event surface.
//!
//! Every widget owns an [`EventSurface`]: a table of named events, each with a
//! fixed ordered list of [`ArgKind`]s, plus the handlers connected to them.
//! Native events (`map`, `unmap`, `clicked`, ...) are declared when the widget
//! is built; service-qualified events (`hyprland-on-workspace`, ...) are
//! declared when the widget first attaches to a service.
//!
//! Emission validates arguments against the declared schema and isolates
//! handler failures: an `Err` or a panic from one handler is logged and the
//! remaining handlers still run.
//!
//! # Example
//!
//! ```
//! use borealis_core::{ArgKind, EventSurface, handler};
//!
//! let surface = EventSurface::new("Demo");
//! surface.declare("workspace", &[ArgKind::Str]).unwrap();
//! surface
//!     .connect("workspace", handler(|args| {
//!         println!("workspace {}", args[0]);
//!         Ok(())
//!     }))
//!     .unwrap();
//!
//! let report = surface.emit("workspace", &["3".into()]).unwrap();
//! assert_eq!(report.invoked, 1);
//! ```

use std::any::Any;
use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};

use crate::error::{BindingError, CallbackResult};
use crate::value::{ArgKind, ArgMismatch, Value, check_args};

new_key_type! {
    /// Identifies one handler connected to an event surface.
    pub struct ConnectionId;
}

/// A type-erased event handler.
pub type Handler = Arc<dyn Fn(&[Value]) -> CallbackResult + Send + Sync + 'static>;

/// Box a closure as a [`Handler`].
pub fn handler<F>(f: F) -> Handler
where
    F: Fn(&[Value]) -> CallbackResult + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Outcome of one emission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmitReport {
    /// Handlers that completed successfully.
    pub invoked: usize,
    /// Handlers that returned an error or panicked.
    pub failed: usize,
}

struct EventEntry {
    kinds: Vec<ArgKind>,
    /// Connections in connection order.
    connections: Vec<ConnectionId>,
}

struct Connection {
    event: String,
    handler: Handler,
}

#[derive(Default)]
struct SurfaceState {
    events: HashMap<String, EventEntry>,
    connections: SlotMap<ConnectionId, Connection>,
}

/// A widget's table of named, typed events.
pub struct EventSurface {
    owner: &'static str,
    state: Mutex<SurfaceState>,
}

impl EventSurface {
    /// Create an empty surface. `owner` names the widget type in errors.
    pub fn new(owner: &'static str) -> Self {
        Self {
            owner,
            state: Mutex::new(SurfaceState::default()),
        }
    }

    /// The widget type this surface belongs to.
    pub fn owner(&self) -> &'static str {
        self.owner
    }

    /// Declare an event.
    ///
    /// Returns `Ok(true)` if the event was created and `Ok(false)` if it
    /// already existed with the same schema.
    ///
    /// # Errors
    ///
    /// [`BindingError::ConflictingEvent`] if the event exists with a
    /// different schema.
    pub fn declare(&self, event: &str, kinds: &[ArgKind]) -> Result<bool, BindingError> {
        let mut state = self.state.lock();
        if let Some(existing) = state.events.get(event) {
            if existing.kinds == kinds {
                return Ok(false);
            }
            return Err(BindingError::ConflictingEvent {
                event: event.to_string(),
                existing: existing.kinds.clone(),
            });
        }
        state.events.insert(
            event.to_string(),
            EventEntry {
                kinds: kinds.to_vec(),
                connections: Vec::new(),
            },
        );
        tracing::trace!(target: "borealis_core::surface", owner = self.owner, event, ?kinds, "event declared");
        Ok(true)
    }

    /// Check if an event is declared.
    pub fn has_event(&self, event: &str) -> bool {
        self.state.lock().events.contains_key(event)
    }

    /// The declared argument kinds of an event.
    pub fn arg_kinds(&self, event: &str) -> Option<Vec<ArgKind>> {
        self.state.lock().events.get(event).map(|e| e.kinds.clone())
    }

    /// Names of all declared events, sorted.
    pub fn event_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.state.lock().events.keys().cloned().collect();
        names.sort();
        names
    }

    /// Connect a handler to a declared event.
    ///
    /// # Errors
    ///
    /// [`BindingError::UnknownEvent`] if the event is not declared.
    pub fn connect(&self, event: &str, handler: Handler) -> Result<ConnectionId, BindingError> {
        let mut state = self.state.lock();
        if !state.events.contains_key(event) {
            return Err(BindingError::UnknownEvent {
                widget: self.owner,
                event: event.to_string(),
            });
        }
        let id = state.connections.insert(Connection {
            event: event.to_string(),
            handler,
        });
        if let Some(entry) = state.events.get_mut(event) {
            entry.connections.push(id);
        }
        Ok(id)
    }

    /// Disconnect a handler. Returns `true` if it was connected.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        let mut state = self.state.lock();
        let Some(connection) = state.connections.remove(id) else {
            return false;
        };
        if let Some(entry) = state.events.get_mut(&connection.event) {
            entry.connections.retain(|c| *c != id);
        }
        true
    }

    /// Number of handlers connected to `event`.
    pub fn connection_count(&self, event: &str) -> usize {
        self.state
            .lock()
            .events
            .get(event)
            .map_or(0, |e| e.connections.len())
    }

    /// Number of handlers connected to any event.
    pub fn total_connections(&self) -> usize {
        self.state.lock().connections.len()
    }

    /// Emit an event, invoking its handlers in connection order.
    ///
    /// Handlers run without the surface locked, so they may connect or
    /// disconnect freely; such changes apply from the next emission.
    ///
    /// # Errors
    ///
    /// Fails without invoking anything when the event is unknown or `args`
    /// do not match its schema.
    pub fn emit(&self, event: &str, args: &[Value]) -> Result<EmitReport, BindingError> {
        let handlers: Vec<Handler> = {
            let state = self.state.lock();
            let Some(entry) = state.events.get(event) else {
                return Err(BindingError::UnknownEvent {
                    widget: self.owner,
                    event: event.to_string(),
                });
            };
            if let Some(mismatch) = check_args(&entry.kinds, args) {
                return Err(match mismatch {
                    ArgMismatch::Arity { expected, got } => BindingError::ArityMismatch {
                        event: event.to_string(),
                        expected,
                        got,
                    },
                    ArgMismatch::Kind {
                        index,
                        expected,
                        got,
                    } => BindingError::KindMismatch {
                        event: event.to_string(),
                        index,
                        expected,
                        got,
                    },
                });
            }
            entry
                .connections
                .iter()
                .filter_map(|id| state.connections.get(*id))
                .map(|c| c.handler.clone())
                .collect()
        };

        let mut report = EmitReport::default();
        for handler in handlers {
            match catch_unwind(AssertUnwindSafe(|| handler(args))) {
                Ok(Ok(())) => report.invoked += 1,
                Ok(Err(error)) => {
                    report.failed += 1;
                    tracing::warn!(
                        target: "borealis_core::surface",
                        owner = self.owner,
                        event,
                        %error,
                        "event handler failed"
                    );
                }
                Err(payload) => {
                    report.failed += 1;
                    tracing::error!(
                        target: "borealis_core::surface",
                        owner = self.owner,
                        event,
                        panic = panic_message(payload.as_ref()),
                        "event handler panicked"
                    );
                }
            }
        }
        Ok(report)
    }
}

impl std::fmt::Debug for EventSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventSurface")
            .field("owner", &self.owner)
            .field("events", &self.event_names())
            .field("connections", &self.total_connections())
            .finish()
    }
}

/// Best-effort text of a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "<non-string panic payload>"
    }
}

static_assertions::assert_impl_all!(EventSurface: Send, Sync);

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn counter_handler(counter: &Arc<AtomicUsize>) -> Handler {
        let counter = counter.clone();
        handler(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    }

    #[test]
    fn test_declare_is_idempotent() {
        let surface = EventSurface::new("Test");
        assert_eq!(surface.declare("map", &[]), Ok(true));
        assert_eq!(surface.declare("map", &[]), Ok(false));
        assert!(matches!(
            surface.declare("map", &[ArgKind::Int]),
            Err(BindingError::ConflictingEvent { .. })
        ));
    }

    #[test]
    fn test_connect_unknown_event() {
        let surface = EventSurface::new("Test");
        let counter = Arc::new(AtomicUsize::new(0));
        assert_eq!(
            surface.connect("clicked", counter_handler(&counter)),
            Err(BindingError::UnknownEvent {
                widget: "Test",
                event: "clicked".into()
            })
        );
    }

    #[test]
    fn test_emit_validates_schema() {
        let surface = EventSurface::new("Test");
        surface.declare("workspace", &[ArgKind::Str]).unwrap();
        let counter = Arc::new(AtomicUsize::new(0));
        surface.connect("workspace", counter_handler(&counter)).unwrap();

        assert!(matches!(
            surface.emit("workspace", &[]),
            Err(BindingError::ArityMismatch { .. })
        ));
        assert!(matches!(
            surface.emit("workspace", &[Value::Int(3)]),
            Err(BindingError::KindMismatch { .. })
        ));
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_failures_are_isolated() {
        let surface = EventSurface::new("Test");
        surface.declare("tick", &[]).unwrap();
        let counter = Arc::new(AtomicUsize::new(0));
        surface
            .connect("tick", handler(|_| Err("boom".into())))
            .unwrap();
        surface
            .connect("tick", handler(|_| panic!("handler panic")))
            .unwrap();
        surface.connect("tick", counter_handler(&counter)).unwrap();

        let report = surface.emit("tick", &[]).unwrap();
        assert_eq!(report, EmitReport { invoked: 1, failed: 2 });
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_disconnect() {
        let surface = EventSurface::new("Test");
        surface.declare("tick", &[]).unwrap();
        let counter = Arc::new(AtomicUsize::new(0));
        let id = surface.connect("tick", counter_handler(&counter)).unwrap();

        assert!(surface.disconnect(id));
        assert!(!surface.disconnect(id));
        assert_eq!(surface.connection_count("tick"), 0);
        surface.emit("tick", &[]).unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }
}
