//! Error types for Borealis.
//!
//! Errors fall into four families:
//!
//! - [`ConfigError`]: fatal configuration problems detected once, at startup
//!   or activation.
//! - [`BindingError`]: a single binding could not be registered. The binding
//!   is skipped and logged; construction continues.
//! - [`DecodeError`]: a service worker received a malformed native event. The
//!   event is skipped and never reaches the UI thread.
//! - [`CallbackError`]: whatever a user callback chooses to return. These are
//!   logged at the call site and never unwind into engine bookkeeping.

use std::path::PathBuf;

use crate::value::ArgKind;

/// The error type user callbacks may return.
pub type CallbackError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The result type of a user callback.
pub type CallbackResult = std::result::Result<(), CallbackError>;

/// The main error type for Borealis operations.
#[derive(Debug, thiserror::Error)]
pub enum BorealisError {
    /// Fatal configuration error.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// A binding could not be registered.
    #[error(transparent)]
    Binding(#[from] BindingError),
    /// A native event could not be decoded.
    #[error(transparent)]
    Decode(#[from] DecodeError),
    /// I/O failure in a service transport.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Fatal configuration errors.
///
/// These are detected once, at registration or activation time, and leave the
/// application in an unspecified state if ignored.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The application was activated without a root window.
    #[error("application `{application_id}` has no root window")]
    MissingRoot {
        /// The id of the application being activated.
        application_id: String,
    },
    /// A service annotation declares an empty prefix.
    #[error("service annotation `{annotation}` has an empty prefix")]
    EmptyPrefix {
        /// Type name of the annotation.
        annotation: &'static str,
    },
    /// A service annotation prefix contains the reserved `_` separator.
    #[error("service annotation `{annotation}` prefix `{prefix}` contains the reserved separator `_`")]
    ReservedSeparator {
        /// Type name of the annotation.
        annotation: &'static str,
        /// The offending prefix.
        prefix: &'static str,
    },
    /// A service annotation prefix contains an uppercase letter.
    ///
    /// Name-declared bindings are matched in lowercase, so such a prefix
    /// could never be reached.
    #[error("service annotation `{annotation}` prefix `{prefix}` must be lowercase")]
    UppercasePrefix {
        /// Type name of the annotation.
        annotation: &'static str,
        /// The offending prefix.
        prefix: &'static str,
    },
    /// A service annotation prefix collides with a built-in binding prefix.
    #[error("service annotation `{annotation}` uses the reserved prefix `{prefix}`")]
    ReservedPrefix {
        /// Type name of the annotation.
        annotation: &'static str,
        /// The offending prefix.
        prefix: &'static str,
    },
    /// Two services were registered under the same prefix.
    #[error("prefix `{prefix}` is registered by both `{first}` and `{second}`")]
    DuplicatePrefix {
        /// The shared prefix.
        prefix: String,
        /// The service registered first.
        first: String,
        /// The service registered second.
        second: String,
    },
    /// The application has already been activated.
    #[error("application has already been activated")]
    AlreadyActivated,
    /// A required environment variable is not set.
    #[error("environment variable `{variable}` is not set")]
    MissingEnvironment {
        /// Name of the variable.
        variable: &'static str,
    },
    /// The configuration file could not be read.
    #[error("failed to read config file '{path}': {source}")]
    Io {
        /// Path of the configuration file.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The configuration file could not be parsed.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

impl ConfigError {
    /// Create an I/O error for a configuration file.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// A single binding could not be registered or an emission was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BindingError {
    /// The widget's event surface does not know the event.
    #[error("`{widget}` has no event named `{event}`")]
    UnknownEvent {
        /// Type name of the widget.
        widget: &'static str,
        /// The requested event name.
        event: String,
    },
    /// The event already exists with a different argument schema.
    #[error("event `{event}` is already declared with argument kinds {existing:?}")]
    ConflictingEvent {
        /// The event name.
        event: String,
        /// The schema already in place.
        existing: Vec<ArgKind>,
    },
    /// An emission carried the wrong number of arguments.
    #[error("event `{event}` expects {expected} argument(s), got {got}")]
    ArityMismatch {
        /// The event name.
        event: String,
        /// Declared arity.
        expected: usize,
        /// Supplied arity.
        got: usize,
    },
    /// An emission carried an argument of the wrong kind.
    #[error("argument {index} of `{event}` expected {expected}, got {got}")]
    KindMismatch {
        /// The event name.
        event: String,
        /// Zero-based argument position.
        index: usize,
        /// Declared kind.
        expected: ArgKind,
        /// Supplied kind.
        got: ArgKind,
    },
    /// The service does not declare the requested signal.
    #[error("service `{service}` does not declare a signal named `{signal}`")]
    UnknownServiceSignal {
        /// Prefix or name of the service.
        service: String,
        /// The requested signal.
        signal: String,
    },
    /// No registered service matches the request.
    #[error("no service is registered for {0}")]
    UnresolvedService(String),
}

/// A native event could not be turned into a valid signal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// The frame lacks the event/data separator.
    #[error("frame `{frame}` is missing the `>>` separator")]
    MissingSeparator {
        /// The raw frame.
        frame: String,
    },
    /// The frame is not valid UTF-8.
    #[error("frame is not valid UTF-8")]
    InvalidUtf8,
    /// The service does not know the signal.
    #[error("unknown signal `{signal}`")]
    UnknownSignal {
        /// The signal name.
        signal: String,
    },
    /// The signal carried the wrong number of arguments.
    #[error("signal `{signal}` expects {expected} argument(s), got {got}")]
    Arity {
        /// The signal name.
        signal: String,
        /// Declared arity.
        expected: usize,
        /// Supplied arity.
        got: usize,
    },
    /// The signal carried an argument of the wrong kind.
    #[error("argument {index} of `{signal}` expected {expected}, got {got}")]
    Kind {
        /// The signal name.
        signal: String,
        /// Zero-based argument position.
        index: usize,
        /// Declared kind.
        expected: ArgKind,
        /// Supplied kind.
        got: ArgKind,
    },
    /// A raw field could not be parsed as the declared kind.
    #[error("argument {index} of `{signal}`: cannot parse `{raw}` as {expected}")]
    Parse {
        /// The signal name.
        signal: String,
        /// Zero-based argument position.
        index: usize,
        /// The raw text.
        raw: String,
        /// Declared kind.
        expected: ArgKind,
    },
}

/// A specialized Result type for Borealis operations.
pub type Result<T> = std::result::Result<T, BorealisError>;
