//! Logging for Borealis.
//!
//! Borealis reports through the `tracing` crate. Every subsystem logs under
//! its own target (see [`targets`]) so it can be filtered separately:
//!
//! ```text
//! BOREALIS_LOG=borealis_core::binding=debug,borealis_core::service=trace
//! ```
//!
//! Applications that do not install their own subscriber can call
//! [`init`], which prints in the Borealis style:
//!
//! ```text
//! (BOREALIS) [2026-10-17T09:12:44.512Z] WARN: no service prefix matches attribute
//! ```
//!
//! Warnings are yellow, errors red, everything else grey.

use std::fmt;

use tracing::{Event, Level, Subscriber};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::{FormatTime, SystemTime};
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

/// Environment variable holding the filter directives.
pub const ENV_VAR: &str = "BOREALIS_LOG";

/// Filter used when [`ENV_VAR`] is unset.
pub const DEFAULT_FILTER: &str = "info";

/// Target names for log filtering.
pub mod targets {
    /// Core crate target.
    pub const CORE: &str = "borealis_core";
    /// Application root.
    pub const APPLICATION: &str = "borealis_core::application";
    /// Binding engine.
    pub const BINDING: &str = "borealis_core::binding";
    /// Widget copies.
    pub const CLONE: &str = "borealis_core::clone";
    /// Main context.
    pub const CONTEXT: &str = "borealis_core::context";
    /// Services and dispatch.
    pub const SERVICE: &str = "borealis_core::service";
    /// Event surfaces.
    pub const SURFACE: &str = "borealis_core::surface";
    /// Timers.
    pub const TIMER: &str = "borealis_core::timer";
    /// Widget lifecycle.
    pub const WIDGET: &str = "borealis_core::widget";
}

const GREY: &str = "\x1b[38;20m";
const YELLOW: &str = "\x1b[33;20m";
const RED: &str = "\x1b[31;20m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// The Borealis event format: `(BOREALIS) [time] LEVEL: message`.
#[derive(Debug, Clone, Copy)]
pub struct BorealisFormatter {
    ansi: bool,
}

impl BorealisFormatter {
    /// A formatter with colours.
    pub fn new() -> Self {
        Self { ansi: true }
    }

    /// Enable or disable colours.
    pub fn with_ansi(mut self, ansi: bool) -> Self {
        self.ansi = ansi;
        self
    }

    fn colour(level: Level) -> &'static str {
        match level {
            Level::ERROR => RED,
            Level::WARN => YELLOW,
            _ => GREY,
        }
    }
}

impl Default for BorealisFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, N> FormatEvent<S, N> for BorealisFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(&self, ctx: &FmtContext<'_, S, N>, mut writer: Writer<'_>, event: &Event<'_>) -> fmt::Result {
        let level = *event.metadata().level();
        if self.ansi {
            write!(writer, "{}{BOLD}", Self::colour(level))?;
        }
        write!(writer, "(BOREALIS) [")?;
        SystemTime.format_time(&mut writer)?;
        write!(writer, "] {level}")?;
        if self.ansi {
            write!(writer, "{RESET}")?;
        }
        write!(writer, ": ")?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        if self.ansi {
            write!(writer, "{RESET}")?;
        }
        writeln!(writer)
    }
}

/// The filter built from [`ENV_VAR`], or [`DEFAULT_FILTER`].
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(ENV_VAR).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the Borealis subscriber as the global default.
///
/// # Errors
///
/// Another global subscriber is already installed.
pub fn try_init() -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .event_format(BorealisFormatter::new())
        .try_init()
}

/// Install the Borealis subscriber, ignoring an already-installed one.
pub fn init() {
    if try_init().is_err() {
        tracing::debug!(target: "borealis_core", "a global subscriber is already installed");
    }
}
