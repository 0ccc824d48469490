//! Services for external systems.

#[cfg(feature = "hyprland")]
pub mod hyprland;
