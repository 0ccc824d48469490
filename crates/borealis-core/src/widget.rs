//! Widgets and the per-widget binding engine.
//!
//! A widget is any `Send + Sync` type that owns a [`WidgetCore`] and is held
//! in an `Arc`. The core carries the widget's identity, its
//! [`EventSurface`], CSS classes, its place in the tree, and the state of
//! its bindings.
//!
//! Bindings are applied in two passes:
//!
//! 1. **Construction** ([`WidgetCore::new`]): timers start and handlers are
//!    connected to the widget's own events. Service bindings are recorded.
//! 2. **Mount** ([`mount`]): if the widget maps services, the recorded
//!    service bindings are resolved against the application that owns the
//!    tree and the widget attaches to each service.
//!
//! [`unmount`] reverses the second pass and cancels every timer from the
//! first. It is idempotent, and a later [`mount`] runs the second pass
//! again.
//!
//! # Writing a widget
//!
//! ```
//! use std::sync::{Arc, Weak};
//! use borealis_core::{Bindings, COMMON_EVENTS, Widget, WidgetCore, WidgetOptions};
//!
//! struct Spacer {
//!     core: WidgetCore,
//! }
//!
//! impl Spacer {
//!     fn new(bindings: Bindings<Spacer>) -> Arc<Self> {
//!         Arc::new_cyclic(|weak: &Weak<Spacer>| Spacer {
//!             core: WidgetCore::new(weak, "spacer", COMMON_EVENTS, WidgetOptions::default(), bindings),
//!         })
//!     }
//! }
//!
//! impl Widget for Spacer {
//!     fn core(&self) -> &WidgetCore {
//!         &self.core
//!     }
//!
//!     fn into_any(self: Arc<Self>) -> Arc<dyn std::any::Any + Send + Sync> {
//!         self
//!     }
//! }
//!
//! let spacer = Spacer::new(Bindings::new().once(0, |_, _| println!("ready")));
//! assert_eq!(spacer.core().timer_ids().len(), 1);
//! ```

use std::any::Any;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::{Mutex, RwLock};

use crate::application::Application;
use crate::binding::{Annotated, Binding, Bindings, Callback, Entry, ServiceTarget};
use crate::clone;
use crate::context::MainContext;
use crate::error::BindingError;
use crate::naming::{self, AttrClass};
use crate::service::ServiceHandle;
use crate::surface::{ConnectionId, EmitReport, EventSurface, Handler, panic_message};
use crate::timer::{ControlFlow, TimerId};
use crate::value::{ArgKind, Value};

/// A unique, process-wide widget identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WidgetId(u64);

impl WidgetId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw value.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A native event a widget type declares on construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventSpec {
    /// Event name.
    pub name: &'static str,
    /// Argument kinds.
    pub kinds: &'static [ArgKind],
}

impl EventSpec {
    /// An event without arguments.
    pub const fn unit(name: &'static str) -> Self {
        Self { name, kinds: &[] }
    }
}

/// Emitted after a widget is mounted.
pub const MAP: &str = "map";
/// Emitted before a widget is unmounted.
pub const UNMAP: &str = "unmap";
/// Emitted when a widget is destroyed.
pub const DESTROY: &str = "destroy";

/// Events every widget has.
pub const COMMON_EVENTS: &[EventSpec] = &[
    EventSpec::unit(MAP),
    EventSpec::unit(UNMAP),
    EventSpec::unit(DESTROY),
];

/// Per-instance widget options.
#[derive(Debug, Clone)]
pub struct WidgetOptions {
    /// Resolve service bindings on mount.
    pub map_services: bool,
    /// Initial CSS classes.
    pub css_classes: Vec<String>,
}

impl Default for WidgetOptions {
    fn default() -> Self {
        Self {
            map_services: true,
            css_classes: Vec::new(),
        }
    }
}

/// A widget: anything that owns a [`WidgetCore`].
pub trait Widget: Send + Sync + 'static {
    /// The widget's core.
    fn core(&self) -> &WidgetCore;

    /// Direct children, in order.
    fn children(&self) -> Vec<Arc<dyn Widget>> {
        Vec::new()
    }

    /// A deep, independent copy of this widget.
    ///
    /// Widgets that cannot be copied return `None` and are shared instead.
    fn duplicate(&self) -> Option<Arc<dyn Widget>> {
        None
    }

    /// Upcast for [`downcast`].
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

/// Recover the concrete type of a widget.
pub fn downcast<W: Widget>(widget: Arc<dyn Widget>) -> Option<Arc<W>> {
    widget.into_any().downcast::<W>().ok()
}

/// A service binding waiting for mount.
#[derive(Clone)]
struct ServiceRequest {
    target: ServiceTarget,
    handler: Handler,
}

#[derive(Default)]
struct BindingState {
    mounted: bool,
    timers: Vec<TimerId>,
    requests: Vec<ServiceRequest>,
    /// Services joined since the last mount.
    attached: Vec<Arc<ServiceHandle>>,
    /// Surface connections made for services since the last mount.
    service_connections: Vec<ConnectionId>,
}

/// The state every widget carries.
pub struct WidgetCore {
    id: WidgetId,
    type_name: &'static str,
    css_name: &'static str,
    map_services: bool,
    surface: EventSurface,
    context: MainContext,
    css_classes: RwLock<Vec<String>>,
    parent: RwLock<Option<Weak<dyn Widget>>>,
    application: RwLock<Option<Weak<Application>>>,
    state: Mutex<BindingState>,
}

impl WidgetCore {
    /// Build the core of a widget of type `W` and apply its bindings.
    ///
    /// Call from inside `Arc::new_cyclic`, on the UI thread. Timers are
    /// registered on the current thread's default [`MainContext`].
    /// Bindings that cannot be applied are logged and skipped.
    pub fn new<W: Widget>(
        weak: &Weak<W>,
        css_name: &'static str,
        events: &[EventSpec],
        options: WidgetOptions,
        bindings: Bindings<W>,
    ) -> Self {
        let type_name = short_type_name::<W>();
        let surface = EventSurface::new(type_name);
        for spec in COMMON_EVENTS.iter().chain(events) {
            if let Err(error) = surface.declare(spec.name, spec.kinds) {
                tracing::warn!(target: "borealis_core::widget", widget = type_name, %error, "native event skipped");
            }
        }

        let core = Self {
            id: WidgetId::next(),
            type_name,
            css_name,
            map_services: options.map_services,
            surface,
            context: MainContext::thread_default(),
            css_classes: RwLock::new(options.css_classes),
            parent: RwLock::new(None),
            application: RwLock::new(None),
            state: Mutex::new(BindingState::default()),
        };
        core.apply(weak, bindings);
        core
    }

    /// First binding pass.
    fn apply<W: Widget>(&self, weak: &Weak<W>, bindings: Bindings<W>) {
        let mut timers = Vec::new();
        let mut requests = Vec::new();

        for binding in resolve(self.type_name, bindings) {
            match binding {
                Binding::Signal { event, callback } => {
                    if let Err(error) = self.surface.connect(&event, bind_handler(weak, callback)) {
                        tracing::warn!(
                            target: "borealis_core::binding",
                            widget = self.type_name,
                            %error,
                            "signal binding skipped"
                        );
                    }
                }
                Binding::Interval { ms, callback } => {
                    timers.push(self.start_timer(weak, ms, callback, false));
                }
                Binding::Oneshot { ms, callback } => {
                    timers.push(self.start_timer(weak, ms, callback, true));
                }
                Binding::Service { target, callback } => requests.push(ServiceRequest {
                    target,
                    handler: bind_handler(weak, callback),
                }),
            }
        }

        tracing::debug!(
            target: "borealis_core::binding",
            widget = self.type_name,
            id = %self.id,
            timers = timers.len(),
            services = requests.len(),
            "bindings applied"
        );
        let mut state = self.state.lock();
        state.timers = timers;
        state.requests = requests;
    }

    fn start_timer<W: Widget>(&self, weak: &Weak<W>, ms: u64, callback: Callback<W>, oneshot: bool) -> TimerId {
        let weak = weak.clone();
        let type_name = self.type_name;
        self.context.add_timeout(Duration::from_millis(ms), move || {
            let Some(widget) = weak.upgrade() else {
                return ControlFlow::Break;
            };
            match catch_unwind(AssertUnwindSafe(|| callback(&widget, &[]))) {
                Ok(Ok(())) => {}
                Ok(Err(error)) => {
                    tracing::warn!(target: "borealis_core::timer", widget = type_name, ms, %error, "timer callback failed");
                }
                Err(payload) => {
                    tracing::error!(
                        target: "borealis_core::timer",
                        widget = type_name,
                        ms,
                        panic = panic_message(payload.as_ref()),
                        "timer callback panicked"
                    );
                }
            }
            ControlFlow::from(!oneshot)
        })
    }

    /// The widget's identity.
    pub fn id(&self) -> WidgetId {
        self.id
    }

    /// Short type name of the widget.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// CSS node name.
    pub fn css_name(&self) -> &'static str {
        self.css_name
    }

    /// Whether service bindings are resolved on mount.
    pub fn maps_services(&self) -> bool {
        self.map_services
    }

    /// The widget's event surface.
    pub fn surface(&self) -> &EventSurface {
        &self.surface
    }

    /// The context the widget's timers run on.
    pub fn context(&self) -> &MainContext {
        &self.context
    }

    /// Emit one of the widget's events.
    ///
    /// # Errors
    ///
    /// See [`EventSurface::emit`].
    pub fn emit(&self, event: &str, args: &[Value]) -> Result<EmitReport, BindingError> {
        self.surface.emit(event, args)
    }

    fn emit_native(&self, event: &str) {
        if let Err(error) = self.surface.emit(event, &[]) {
            tracing::trace!(target: "borealis_core::widget", widget = self.type_name, %error, "native event not emitted");
        }
    }

    // -------------------------------------------------------------------------
    // CSS
    // -------------------------------------------------------------------------

    /// Current CSS classes.
    pub fn css_classes(&self) -> Vec<String> {
        self.css_classes.read().clone()
    }

    /// Add a CSS class. Returns `false` if already present.
    pub fn add_css_class(&self, class: &str) -> bool {
        let mut classes = self.css_classes.write();
        if classes.iter().any(|c| c == class) {
            return false;
        }
        classes.push(class.to_string());
        true
    }

    /// Remove a CSS class. Returns `true` if it was present.
    pub fn remove_css_class(&self, class: &str) -> bool {
        let mut classes = self.css_classes.write();
        let before = classes.len();
        classes.retain(|c| c != class);
        classes.len() != before
    }

    /// Check for a CSS class.
    pub fn has_css_class(&self, class: &str) -> bool {
        self.css_classes.read().iter().any(|c| c == class)
    }

    // -------------------------------------------------------------------------
    // Tree
    // -------------------------------------------------------------------------

    /// The parent widget, if any.
    pub fn parent(&self) -> Option<Arc<dyn Widget>> {
        self.parent.read().as_ref().and_then(Weak::upgrade)
    }

    /// Set the parent. Containers call this when adopting a child.
    pub fn set_parent(&self, parent: Weak<dyn Widget>) {
        *self.parent.write() = Some(parent);
    }

    /// Forget the parent.
    pub fn clear_parent(&self) {
        *self.parent.write() = None;
    }

    /// The application this widget is the root of.
    pub fn application(&self) -> Option<Arc<Application>> {
        self.application.read().as_ref().and_then(Weak::upgrade)
    }

    /// Make this widget the root of `application`'s tree.
    pub fn set_application(&self, application: Weak<Application>) {
        *self.application.write() = Some(application);
    }

    // -------------------------------------------------------------------------
    // Binding state
    // -------------------------------------------------------------------------

    /// Whether the widget is mounted.
    pub fn is_mounted(&self) -> bool {
        self.state.lock().mounted
    }

    /// Timers created at construction that have not been cancelled.
    ///
    /// A oneshot that already fired is still listed until teardown.
    pub fn timer_ids(&self) -> Vec<TimerId> {
        self.state.lock().timers.clone()
    }

    /// Number of construction timers still live.
    pub fn live_timer_count(&self) -> usize {
        let timers = self.timer_ids();
        timers.into_iter().filter(|t| self.context.is_timer_active(*t)).count()
    }

    /// Number of service bindings recorded at construction.
    pub fn service_binding_count(&self) -> usize {
        self.state.lock().requests.len()
    }

    /// Services joined since the last mount.
    pub fn attached_services(&self) -> Vec<Arc<ServiceHandle>> {
        self.state.lock().attached.clone()
    }

    /// Second binding pass: resolve service bindings and attach.
    fn map_services(&self, widget: &Arc<dyn Widget>) {
        let Some(application) = application_of(widget) else {
            tracing::debug!(
                target: "borealis_core::binding",
                widget = self.type_name,
                "not under an application, service bindings skipped"
            );
            return;
        };
        let requests = self.state.lock().requests.clone();
        if requests.is_empty() {
            return;
        }
        let prefixes = application.list_prefixes();

        for request in requests {
            let resolved = match &request.target {
                ServiceTarget::Candidate(attr) => match naming::match_service_prefix(attr, &prefixes) {
                    Some((prefix, signal)) => application.lookup_by_prefix(prefix).map(|s| (s, signal)),
                    None => {
                        tracing::warn!(
                            target: "borealis_core::binding",
                            widget = self.type_name,
                            attr = %attr,
                            "no service prefix matches attribute"
                        );
                        continue;
                    }
                },
                ServiceTarget::Prefix { prefix, signal } => application
                    .lookup_by_prefix(prefix)
                    .map(|s| (s, signal.clone())),
                ServiceTarget::Annotation { annotation, signal } => application
                    .lookup_by_annotation_type(annotation.type_id())
                    .map(|s| (s, signal.clone())),
            };
            let Some((service, signal)) = resolved else {
                let error = BindingError::UnresolvedService(describe(&request.target));
                tracing::warn!(target: "borealis_core::binding", widget = self.type_name, %error, "service binding skipped");
                continue;
            };
            self.attach(widget, &service, &signal, request.handler);
        }
    }

    fn attach(&self, widget: &Arc<dyn Widget>, service: &Arc<ServiceHandle>, signal: &str, handler: Handler) {
        if service.signal_arg_types(signal).is_none() {
            let error = BindingError::UnknownServiceSignal {
                service: service.prefix().unwrap_or(service.name()).to_string(),
                signal: signal.to_string(),
            };
            tracing::warn!(target: "borealis_core::binding", widget = self.type_name, %error, "service binding skipped");
            return;
        }

        let first_attach = !self
            .state
            .lock()
            .attached
            .iter()
            .any(|s| Arc::ptr_eq(s, service));
        if first_attach {
            for (name, kinds) in service.schema().iter() {
                if let Err(error) = self.surface.declare(&service.qualified_event(name), kinds) {
                    tracing::warn!(target: "borealis_core::binding", widget = self.type_name, %error, "service event not declared");
                }
            }
        }

        let event = service.qualified_event(signal);
        let connection = match self.surface.connect(&event, handler) {
            Ok(connection) => connection,
            Err(error) => {
                tracing::warn!(target: "borealis_core::binding", widget = self.type_name, %error, "service binding skipped");
                return;
            }
        };
        service.attach(widget, signal);

        let mut state = self.state.lock();
        state.service_connections.push(connection);
        if first_attach {
            state.attached.push(service.clone());
        }
    }

    /// Detach from every service and cancel every timer.
    ///
    /// Safe to call repeatedly; later calls do nothing. Service bindings
    /// are kept and resolved again on the next mount. Timers are not
    /// restarted.
    pub fn teardown(&self) {
        let (services, connections, timers) = {
            let mut state = self.state.lock();
            state.mounted = false;
            (
                std::mem::take(&mut state.attached),
                std::mem::take(&mut state.service_connections),
                std::mem::take(&mut state.timers),
            )
        };
        if services.is_empty() && connections.is_empty() && timers.is_empty() {
            return;
        }

        for service in &services {
            service.detach(self.id);
        }
        for connection in connections {
            self.surface.disconnect(connection);
        }
        let cancelled = timers
            .into_iter()
            .filter(|t| self.context.remove_timer(*t))
            .count();
        tracing::debug!(
            target: "borealis_core::binding",
            widget = self.type_name,
            id = %self.id,
            services = services.len(),
            timers = cancelled,
            "bindings torn down"
        );
    }
}

impl Drop for WidgetCore {
    fn drop(&mut self) {
        let state = self.state.get_mut();
        for service in state.attached.drain(..) {
            service.detach(self.id);
        }
        for timer in state.timers.drain(..) {
            self.context.remove_timer(timer);
        }
        clone::release(self.id);
    }
}

impl fmt::Debug for WidgetCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WidgetCore")
            .field("id", &self.id)
            .field("type_name", &self.type_name)
            .field("css_name", &self.css_name)
            .field("mounted", &self.is_mounted())
            .finish_non_exhaustive()
    }
}

static_assertions::assert_impl_all!(WidgetCore: Send, Sync);

/// Mount a widget and its subtree.
///
/// Resolves service bindings (if the widget maps services), then emits
/// `map`. Mounting a mounted widget does nothing.
pub fn mount(widget: &Arc<dyn Widget>) {
    let core = widget.core();
    {
        let mut state = core.state.lock();
        if state.mounted {
            return;
        }
        state.mounted = true;
    }
    tracing::trace!(target: "borealis_core::widget", widget = core.type_name, id = %core.id, "mount");
    if core.map_services {
        core.map_services(widget);
    }
    core.emit_native(MAP);
    for child in widget.children() {
        mount(&child);
    }
}

/// Unmount a widget and its subtree.
///
/// Emits `unmap`, then tears the widget's bindings down. Unmounting an
/// unmounted widget does nothing.
pub fn unmount(widget: &Arc<dyn Widget>) {
    let core = widget.core();
    if !core.is_mounted() {
        return;
    }
    for child in widget.children() {
        unmount(&child);
    }
    tracing::trace!(target: "borealis_core::widget", widget = core.type_name, id = %core.id, "unmount");
    core.emit_native(UNMAP);
    core.teardown();
}

/// Unmount a widget and its subtree, cancel all their timers and emit
/// `destroy` on each.
pub fn destroy(widget: &Arc<dyn Widget>) {
    unmount(widget);
    for child in widget.children() {
        destroy(&child);
    }
    let core = widget.core();
    core.teardown();
    core.emit_native(DESTROY);
}

/// The application owning the tree `widget` is in.
pub fn application_of(widget: &Arc<dyn Widget>) -> Option<Arc<Application>> {
    let mut current = widget.clone();
    loop {
        if let Some(application) = current.core().application() {
            return Some(application);
        }
        current = current.core().parent()?;
    }
}

fn short_type_name<W>() -> &'static str {
    let full = std::any::type_name::<W>();
    full.rsplit("::").next().unwrap_or(full)
}

fn describe(target: &ServiceTarget) -> String {
    match target {
        ServiceTarget::Candidate(attr) => format!("attribute `{attr}`"),
        ServiceTarget::Prefix { prefix, signal } => format!("prefix `{prefix}` (signal `{signal}`)"),
        ServiceTarget::Annotation { annotation, signal } => {
            format!("annotation `{}` (signal `{signal}`)", annotation.type_name())
        }
    }
}

fn bind_handler<W: Widget>(weak: &Weak<W>, callback: Callback<W>) -> Handler {
    let weak = weak.clone();
    Arc::new(move |args: &[Value]| match weak.upgrade() {
        Some(widget) => callback(&widget, args),
        None => Ok(()),
    })
}

/// Turn a binding table into concrete triggers, logging what cannot be
/// used.
fn resolve<W: 'static>(widget: &'static str, bindings: Bindings<W>) -> Vec<Binding<W>> {
    let mut out = Vec::new();
    for entry in bindings.into_entries() {
        match entry {
            Entry::Direct(binding) => out.push(binding),
            Entry::Named { attr, value } => {
                let class = naming::classify(&attr);
                let reserved = !matches!(class, AttrClass::Candidate(_));
                let Some(callbacks) = value.into_callbacks() else {
                    if reserved {
                        tracing::warn!(
                            target: "borealis_core::binding",
                            widget,
                            attr = %attr,
                            "reserved attribute does not hold callbacks, ignored"
                        );
                    } else {
                        tracing::trace!(target: "borealis_core::binding", widget, attr = %attr, "plain attribute");
                    }
                    continue;
                };
                match class {
                    AttrClass::Signal(event) => out.extend(callbacks.into_iter().map(|callback| Binding::Signal {
                        event: event.clone(),
                        callback,
                    })),
                    AttrClass::Interval(ms) => out.extend(
                        callbacks
                            .into_iter()
                            .map(|callback| Binding::Interval { ms, callback }),
                    ),
                    AttrClass::Oneshot(ms) => out.extend(
                        callbacks
                            .into_iter()
                            .map(|callback| Binding::Oneshot { ms, callback }),
                    ),
                    AttrClass::Malformed { prefix, remainder } => {
                        tracing::warn!(
                            target: "borealis_core::binding",
                            widget,
                            attr = %attr,
                            prefix,
                            remainder = %remainder,
                            "malformed attribute name, ignored"
                        );
                    }
                    AttrClass::Candidate(name) => out.extend(callbacks.into_iter().map(|callback| Binding::Service {
                        target: ServiceTarget::Candidate(name.clone()),
                        callback,
                    })),
                }
            }
            Entry::Annotated {
                annotation,
                callback,
                ..
            } => match annotation {
                Annotated::Signal(names) => out.extend(names.iter().map(|name| Binding::Signal {
                    event: naming::event_name(name),
                    callback: callback.clone(),
                })),
                Annotated::Interval(periods) => out.extend(periods.into_iter().map(|ms| Binding::Interval {
                    ms,
                    callback: callback.clone(),
                })),
                Annotated::Oneshot(delays) => out.extend(delays.into_iter().map(|ms| Binding::Oneshot {
                    ms,
                    callback: callback.clone(),
                })),
                Annotated::Service { annotation, signals } => {
                    out.extend(signals.into_iter().map(|signal| Binding::Service {
                        target: ServiceTarget::Annotation { annotation, signal },
                        callback: callback.clone(),
                    }))
                }
            },
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use super::*;
    use crate::binding::AttrValue;

    struct Probe {
        core: WidgetCore,
        hits: AtomicUsize,
    }

    impl Probe {
        fn new(bindings: Bindings<Probe>) -> Arc<Self> {
            Arc::new_cyclic(|weak| Probe {
                core: WidgetCore::new(
                    weak,
                    "probe",
                    &[EventSpec::unit("clicked")],
                    WidgetOptions::default(),
                    bindings,
                ),
                hits: AtomicUsize::new(0),
            })
        }
    }

    impl Widget for Probe {
        fn core(&self) -> &WidgetCore {
            &self.core
        }

        fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
            self
        }
    }

    fn hit(probe: &Probe, _: &[Value]) {
        probe.hits.fetch_add(1, Ordering::SeqCst);
    }

    #[test]
    fn test_signal_bindings_connect() {
        let probe = Probe::new(
            Bindings::new()
                .on("clicked", hit)
                .declare("on_clicked", AttrValue::callback(hit)),
        );
        probe.core().emit("clicked", &[]).unwrap();
        assert_eq!(probe.hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_unknown_event_is_skipped() {
        let probe = Probe::new(Bindings::new().on("toggled", hit).on("clicked", hit));
        assert_eq!(probe.core().surface().connection_count("clicked"), 1);
        assert!(!probe.core().surface().has_event("toggled"));
    }

    #[test]
    fn test_reserved_attribute_with_plain_value() {
        let probe = Probe::new(
            Bindings::new()
                .declare("interval_100", Value::from(3i64))
                .declare("interval_fast", AttrValue::callback(hit)),
        );
        assert!(probe.core().timer_ids().is_empty());
    }

    #[test]
    fn test_annotated_registers_each_tag() {
        let probe = Probe::new(
            Bindings::new()
                .annotated("refresh", Annotated::interval([10, 20]), crate::binding::callback(hit))
                .annotated("greet", Annotated::signal(["map", "clicked"]), crate::binding::callback(hit)),
        );
        assert_eq!(probe.core().timer_ids().len(), 2);
        assert_eq!(probe.core().surface().connection_count("map"), 1);
        assert_eq!(probe.core().surface().connection_count("clicked"), 1);
    }

    #[test]
    fn test_annotated_oneshots_fire_once_each() {
        let probe = Probe::new(Bindings::new().annotated(
            "flash",
            Annotated::oneshot([10, 20]),
            crate::binding::callback(hit),
        ));
        let context = probe.core().context().clone();
        let timers = probe.core().timer_ids();
        assert_eq!(timers.len(), 2);

        for timer in &timers {
            assert!(context.fire_timer(*timer));
            assert!(!context.is_timer_active(*timer));
            assert!(!context.fire_timer(*timer));
        }
        assert_eq!(probe.hits.load(Ordering::SeqCst), 2);
        assert_eq!(probe.core().live_timer_count(), 0);
    }

    #[test]
    fn test_teardown_cancels_timers_once() {
        let probe = Probe::new(Bindings::new().every(10, hit).once(10, hit));
        let context = MainContext::thread_default();
        let timers = probe.core().timer_ids();
        assert_eq!(probe.core().live_timer_count(), 2);

        probe.core().teardown();
        assert!(timers.iter().all(|t| !context.is_timer_active(*t)));
        probe.core().teardown();
        assert!(probe.core().timer_ids().is_empty());
    }

    #[test]
    fn test_mount_without_application() {
        let probe = Probe::new(Bindings::new().from_service("hyprland-on", "workspace", hit));
        let widget: Arc<dyn Widget> = probe.clone();
        mount(&widget);
        assert!(probe.core().is_mounted());
        assert!(probe.core().attached_services().is_empty());
        unmount(&widget);
        unmount(&widget);
        assert!(!probe.core().is_mounted());
    }

    #[test]
    fn test_dropped_widget_stops_timer() {
        let probe = Probe::new(Bindings::new().every(10, hit));
        let timer = probe.core().timer_ids()[0];
        let context = MainContext::thread_default();
        drop(probe);
        assert!(!context.is_timer_active(timer));
    }

    #[test]
    fn test_downcast() {
        let widget: Arc<dyn Widget> = Probe::new(Bindings::new());
        assert!(downcast::<Probe>(widget).is_some());
    }
}
