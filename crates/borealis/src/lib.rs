//! Borealis: declarative widgets driven by background services.
//!
//! This is the main crate. It re-exports [`borealis_core`] and adds the
//! concrete widgets, the Hyprland service and the combined configuration
//! file.
//!
//! # Example
//!
//! ```no_run
//! use borealis::prelude::*;
//! use borealis::ext::hyprland::HyprlandService;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     borealis::logging::init();
//!     let config = BorealisConfig::load("bar.toml")?;
//!
//!     let app = Application::new(config.application.clone());
//!     app.register(HyprlandService::from_config(&config.hyprland)?)?;
//!     app.set_root(|_app| {
//!         Window::builder()
//!             .child(
//!                 Label::builder()
//!                     .bindings(Bindings::new().declare(
//!                         "hyprland_on_workspace",
//!                         AttrValue::callback(|label: &Label, args| label.set_text(args[0].to_string())),
//!                     ))
//!                     .build(),
//!             )
//!             .build()
//!     });
//!     app.run()?;
//!     Ok(())
//! }
//! ```

pub use borealis_core::*;

pub mod config;
pub mod enums;
pub mod ext;
pub mod prelude;
pub mod widget;

pub use config::{BorealisConfig, HyprlandConfig};
pub use enums::{Edge, Layer, Orientation};
