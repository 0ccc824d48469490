//! The application root: service registry, activation and main loop.
//!
//! An [`Application`] owns the configured services and the root widget.
//! Services are registered before activation; activation starts one worker
//! per service, builds the root widget, points it back at the application
//! and mounts the tree. Widgets then find their services through
//! [`lookup_by_prefix`](Application::lookup_by_prefix) and
//! [`lookup_by_annotation_type`](Application::lookup_by_annotation_type).
//!
//! # Example
//!
//! ```no_run
//! use borealis_core::{Application, ApplicationConfig};
//! # use borealis_core::{Bindings, Widget, WidgetCore, WidgetOptions};
//! # use std::sync::Arc;
//! # struct Root { core: WidgetCore }
//! # impl Widget for Root {
//! #     fn core(&self) -> &WidgetCore { &self.core }
//! #     fn into_any(self: Arc<Self>) -> Arc<dyn std::any::Any + Send + Sync> { self }
//! # }
//! # fn build_root() -> Arc<Root> {
//! #     Arc::new_cyclic(|weak| Root {
//! #         core: WidgetCore::new(weak, "window", &[], WidgetOptions::default(), Bindings::new()),
//! #     })
//! # }
//!
//! let app = Application::new(ApplicationConfig::new("org.example.bar"));
//! app.set_root(|_app| build_root());
//! app.run_or_exit();
//! ```

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;

use parking_lot::{Mutex, RwLock};

use crate::annotation::{Annotation, ServiceAnnotation};
use crate::config::ApplicationConfig;
use crate::context::MainContext;
use crate::error::{ConfigError, Result};
use crate::naming;
use crate::service::{Service, ServiceHandle, spawn_worker};
use crate::thread_check::set_thread_checks_enabled;
use crate::widget::{self, Widget};

type RootFactory = Box<dyn FnOnce(&Arc<Application>) -> Arc<dyn Widget> + Send + 'static>;

/// The application root.
pub struct Application {
    config: ApplicationConfig,
    context: MainContext,
    by_type: RwLock<HashMap<TypeId, Arc<ServiceHandle>>>,
    by_prefix: RwLock<HashMap<String, Arc<ServiceHandle>>>,
    /// Every registered service, in registration order.
    services: RwLock<Vec<Arc<ServiceHandle>>>,
    /// Services not started yet.
    pending: Mutex<Vec<(Box<dyn Service>, Arc<ServiceHandle>)>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    root_factory: Mutex<Option<RootFactory>>,
    root: RwLock<Option<Arc<dyn Widget>>>,
    activated: AtomicBool,
}

impl Application {
    /// Create an application on the current thread, which becomes the UI
    /// thread.
    pub fn new(config: ApplicationConfig) -> Arc<Self> {
        set_thread_checks_enabled(config.ui_thread_checks);
        tracing::debug!(target: "borealis_core::application", id = %config.application_id, "application created");
        Arc::new(Self {
            config,
            context: MainContext::thread_default(),
            by_type: RwLock::new(HashMap::new()),
            by_prefix: RwLock::new(HashMap::new()),
            services: RwLock::new(Vec::new()),
            pending: Mutex::new(Vec::new()),
            workers: Mutex::new(Vec::new()),
            root_factory: Mutex::new(None),
            root: RwLock::new(None),
            activated: AtomicBool::new(false),
        })
    }

    /// The configuration.
    pub fn config(&self) -> &ApplicationConfig {
        &self.config
    }

    /// The UI-thread context.
    pub fn context(&self) -> &MainContext {
        &self.context
    }

    /// Register a service.
    ///
    /// Annotated services become reachable by annotation type and by
    /// prefix. A service without an annotation still runs but no widget
    /// can bind to it; this is logged as a warning.
    ///
    /// # Errors
    ///
    /// The annotation's prefix is invalid or already registered.
    pub fn register<S: Service>(&self, service: S) -> std::result::Result<Arc<ServiceHandle>, ConfigError> {
        self.register_boxed(Box::new(service))
    }

    /// [`register`](Self::register) for boxed services.
    ///
    /// # Errors
    ///
    /// See [`register`](Self::register).
    pub fn register_boxed(&self, service: Box<dyn Service>) -> std::result::Result<Arc<ServiceHandle>, ConfigError> {
        let handle = Arc::new(ServiceHandle::new(service.as_ref()));
        match handle.annotation() {
            Some(annotation) => {
                annotation.validate()?;
                let mut by_prefix = self.by_prefix.write();
                if let Some(existing) = by_prefix.get(annotation.prefix()) {
                    return Err(ConfigError::DuplicatePrefix {
                        prefix: annotation.prefix().to_string(),
                        first: existing.name().to_string(),
                        second: handle.name().to_string(),
                    });
                }
                by_prefix.insert(annotation.prefix().to_string(), handle.clone());
                self.by_type.write().insert(annotation.type_id(), handle.clone());
                tracing::debug!(
                    target: "borealis_core::application",
                    service = handle.name(),
                    prefix = annotation.prefix(),
                    "service registered"
                );
            }
            None => tracing::warn!(
                target: "borealis_core::application",
                service = handle.name(),
                "service has no annotation, widgets cannot bind to it"
            ),
        }
        self.services.write().push(handle.clone());
        self.pending.lock().push((service, handle.clone()));
        Ok(handle)
    }

    /// Start a worker for every service not started yet.
    ///
    /// Returns how many were started.
    ///
    /// # Errors
    ///
    /// A worker thread could not be spawned.
    pub fn start_all(&self) -> Result<usize> {
        let pending = std::mem::take(&mut *self.pending.lock());
        let count = pending.len();
        let mut workers = self.workers.lock();
        for (service, handle) in pending {
            workers.push(spawn_worker(service, handle, self.context.ui_sender())?);
        }
        if count > 0 {
            tracing::info!(target: "borealis_core::application", count, "services started");
        }
        Ok(count)
    }

    /// The service registered under `prefix`.
    pub fn lookup_by_prefix(&self, prefix: &str) -> Option<Arc<ServiceHandle>> {
        self.by_prefix.read().get(prefix).cloned()
    }

    /// The service registered under an annotation type.
    pub fn lookup_by_annotation_type(&self, type_id: TypeId) -> Option<Arc<ServiceHandle>> {
        self.by_type.read().get(&type_id).cloned()
    }

    /// The service registered under annotation `A`.
    pub fn lookup_by_annotation<A: ServiceAnnotation>(&self) -> Option<Arc<ServiceHandle>> {
        self.lookup_by_annotation_type(Annotation::of::<A>().type_id())
    }

    /// Registered prefixes, longest first.
    pub fn list_prefixes(&self) -> Vec<String> {
        let mut prefixes: Vec<String> = self.by_prefix.read().keys().cloned().collect();
        naming::sort_prefixes(&mut prefixes);
        prefixes
    }

    /// Every registered service, in registration order.
    pub fn services(&self) -> Vec<Arc<ServiceHandle>> {
        self.services.read().clone()
    }

    /// Set the function that builds the root widget at activation.
    pub fn set_root<F, W>(&self, factory: F)
    where
        F: FnOnce(&Arc<Application>) -> Arc<W> + Send + 'static,
        W: Widget,
    {
        *self.root_factory.lock() = Some(Box::new(move |app: &Arc<Application>| -> Arc<dyn Widget> { factory(app) }));
    }

    /// The root widget, once activated.
    pub fn root(&self) -> Option<Arc<dyn Widget>> {
        self.root.read().clone()
    }

    /// Whether [`activate`](Self::activate) has run.
    pub fn is_activated(&self) -> bool {
        self.activated.load(Ordering::SeqCst)
    }

    /// Start services, build and mount the root widget.
    ///
    /// # Errors
    ///
    /// [`ConfigError::MissingRoot`] without a root factory,
    /// [`ConfigError::AlreadyActivated`] on a second call, or a worker
    /// spawn failure.
    pub fn activate(self: &Arc<Self>) -> Result<Arc<dyn Widget>> {
        if self.activated.swap(true, Ordering::SeqCst) {
            return Err(ConfigError::AlreadyActivated.into());
        }
        tracing::info!(target: "borealis_core::application", id = %self.config.application_id, "activating");

        match &self.config.css_file {
            Some(path) => tracing::info!(target: "borealis_core::application", path = %path.display(), "stylesheet configured"),
            None => tracing::info!(target: "borealis_core::application", "no stylesheet configured"),
        }

        self.start_all()?;

        let Some(factory) = self.root_factory.lock().take() else {
            return Err(ConfigError::MissingRoot {
                application_id: self.config.application_id.clone(),
            }
            .into());
        };
        let root = factory(self);
        root.core().set_application(Arc::downgrade(self));
        *self.root.write() = Some(root.clone());
        widget::mount(&root);
        Ok(root)
    }

    /// Activate, then run the main loop until [`quit`](Self::quit).
    ///
    /// # Errors
    ///
    /// See [`activate`](Self::activate).
    pub fn run(self: &Arc<Self>) -> Result<()> {
        self.activate()?;
        self.context.run();
        if let Some(root) = self.root() {
            widget::unmount(&root);
        }
        Ok(())
    }

    /// [`run`](Self::run), exiting the process with status 1 on a fatal
    /// error.
    pub fn run_or_exit(self: &Arc<Self>) {
        if let Err(error) = self.run() {
            tracing::error!(target: "borealis_core::application", %error, "fatal error");
            std::process::exit(1);
        }
    }

    /// Stop the main loop.
    pub fn quit(&self) {
        self.context.quit();
    }
}

impl fmt::Debug for Application {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Application")
            .field("config", &self.config)
            .field("prefixes", &self.list_prefixes())
            .field("activated", &self.is_activated())
            .finish_non_exhaustive()
    }
}

static_assertions::assert_impl_all!(Application: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BorealisError;
    use crate::service::{ChannelService, SignalSchema};
    use crate::value::ArgKind;

    struct Hypr;
    impl ServiceAnnotation for Hypr {
        const PREFIX: &'static str = "hyprland-on";
    }

    struct HyprV2;
    impl ServiceAnnotation for HyprV2 {
        const PREFIX: &'static str = "hyprland-on-v2";
    }

    struct Clash;
    impl ServiceAnnotation for Clash {
        const PREFIX: &'static str = "hyprland-on";
    }

    struct Oneshot;
    impl ServiceAnnotation for Oneshot {
        const PREFIX: &'static str = "oneshot-timer";
    }

    struct Mpris;
    impl ServiceAnnotation for Mpris {
        const PREFIX: &'static str = "MPRIS-on";
    }

    fn schema() -> SignalSchema {
        SignalSchema::new().signal("workspace", [ArgKind::Str])
    }

    #[test]
    fn test_lookup() {
        let app = Application::new(ApplicationConfig::default());
        let (hypr, _tx) = ChannelService::<Hypr>::new(schema());
        let (v2, _tx2) = ChannelService::<HyprV2>::new(schema());
        let handle = app.register(hypr).unwrap();
        app.register(v2).unwrap();

        assert!(Arc::ptr_eq(&app.lookup_by_prefix("hyprland-on").unwrap(), &handle));
        assert!(Arc::ptr_eq(&app.lookup_by_annotation::<Hypr>().unwrap(), &handle));
        assert!(app.lookup_by_prefix("mpris-on").is_none());
        assert_eq!(app.list_prefixes(), ["hyprland-on-v2", "hyprland-on"]);
    }

    #[test]
    fn test_duplicate_prefix() {
        let app = Application::new(ApplicationConfig::default());
        app.register(ChannelService::<Hypr>::new(schema()).0).unwrap();
        assert!(matches!(
            app.register(ChannelService::<Clash>::new(schema()).0),
            Err(ConfigError::DuplicatePrefix { .. })
        ));
    }

    #[test]
    fn test_reserved_prefix() {
        let app = Application::new(ApplicationConfig::default());
        assert!(matches!(
            app.register(ChannelService::<Oneshot>::new(schema()).0),
            Err(ConfigError::ReservedPrefix { .. })
        ));
    }

    #[test]
    fn test_uppercase_prefix() {
        let app = Application::new(ApplicationConfig::default());
        assert!(matches!(
            app.register(ChannelService::<Mpris>::new(schema()).0),
            Err(ConfigError::UppercasePrefix { .. })
        ));
        assert!(app.list_prefixes().is_empty());
    }

    #[test]
    fn test_missing_root() {
        let app = Application::new(ApplicationConfig::new("org.example.empty"));
        match app.activate() {
            Err(BorealisError::Config(ConfigError::MissingRoot { application_id })) => {
                assert_eq!(application_id, "org.example.empty");
            }
            Err(other) => panic!("expected a missing root error, got {other}"),
            Ok(_) => panic!("activation without a root succeeded"),
        }
        assert!(matches!(
            app.activate(),
            Err(BorealisError::Config(ConfigError::AlreadyActivated))
        ));
    }
}
