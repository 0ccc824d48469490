//! Service annotations.
//!
//! An annotation identifies a service family. It is a registry key twice over:
//! by its Rust type (for [`Annotated::service`](crate::Annotated::service)
//! bindings) and by its string prefix (for name-based bindings such as
//! `"hyprland-on-workspace"`).
//!
//! # Example
//!
//! ```
//! use borealis_core::{Annotation, ServiceAnnotation};
//!
//! struct MprisCallback;
//!
//! impl ServiceAnnotation for MprisCallback {
//!     const PREFIX: &'static str = "mpris-on";
//! }
//!
//! let annotation = Annotation::of::<MprisCallback>();
//! assert_eq!(annotation.prefix(), "mpris-on");
//! assert_eq!(annotation.qualify("track"), "mpris-on-track");
//! assert!(annotation.validate().is_ok());
//! ```

use std::any::TypeId;
use std::fmt;

use crate::error::ConfigError;

/// Prefixes owned by the binding engine itself.
pub const RESERVED_PREFIXES: &[&str] = &["on", "interval", "oneshot"];

/// Separator reserved for the binding engine's attribute names.
pub const RESERVED_SEPARATOR: char = '_';

/// Separator joining prefix segments and service-qualified event names.
pub const SEGMENT_SEPARATOR: char = '-';

/// Marker trait for a service family.
///
/// Implement this on a zero-sized type and return
/// `Some(Annotation::of::<YourType>())` from
/// [`Service::annotation`](crate::Service::annotation).
pub trait ServiceAnnotation: 'static {
    /// The routing prefix. Segments are joined with `-`; `_` is not allowed.
    const PREFIX: &'static str;
}

/// A resolved service annotation: type key plus routing prefix.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Annotation {
    type_id: TypeId,
    type_name: &'static str,
    prefix: &'static str,
}

impl Annotation {
    /// The annotation for the marker type `A`.
    pub fn of<A: ServiceAnnotation>() -> Self {
        Self {
            type_id: TypeId::of::<A>(),
            type_name: std::any::type_name::<A>(),
            prefix: A::PREFIX,
        }
    }

    /// The `TypeId` of the marker type.
    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// The type name of the marker type.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// The routing prefix.
    #[inline]
    pub fn prefix(&self) -> &'static str {
        self.prefix
    }

    /// The event name a widget sees for `signal` from this service.
    pub fn qualify(&self, signal: &str) -> String {
        format!("{}{SEGMENT_SEPARATOR}{signal}", self.prefix)
    }

    /// Check the prefix against the engine's naming rules.
    ///
    /// # Errors
    ///
    /// Fails when the prefix is empty, contains `_` or an uppercase letter,
    /// or starts with a segment the engine reserves for its own bindings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.prefix.is_empty() {
            return Err(ConfigError::EmptyPrefix {
                annotation: self.type_name,
            });
        }
        if self.prefix.contains(RESERVED_SEPARATOR) {
            return Err(ConfigError::ReservedSeparator {
                annotation: self.type_name,
                prefix: self.prefix,
            });
        }
        if self.prefix.chars().any(|c| c.is_uppercase()) {
            return Err(ConfigError::UppercasePrefix {
                annotation: self.type_name,
                prefix: self.prefix,
            });
        }
        let first_segment = self.prefix.split(SEGMENT_SEPARATOR).next().unwrap_or_default();
        if RESERVED_PREFIXES.contains(&first_segment) {
            return Err(ConfigError::ReservedPrefix {
                annotation: self.type_name,
                prefix: self.prefix,
            });
        }
        Ok(())
    }
}

impl fmt::Debug for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Annotation")
            .field("type_name", &self.type_name)
            .field("prefix", &self.prefix)
            .finish()
    }
}
