//! Combined configuration file.
//!
//! The top level holds the [`ApplicationConfig`] keys; service settings
//! live in their own tables:
//!
//! ```toml
//! application_id = "org.example.bar"
//! css_file = "~/.config/bar/style.css"
//!
//! [hyprland]
//! recv_buffer = 4096
//! ```

use std::path::{Path, PathBuf};

use borealis_core::{ApplicationConfig, ConfigError};
use serde::{Deserialize, Serialize};

/// Default size of the Hyprland socket read buffer.
pub const DEFAULT_RECV_BUFFER: usize = 1024;

/// Settings of the Hyprland service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HyprlandConfig {
    /// Event socket path. Derived from the environment when unset.
    pub socket_path: Option<PathBuf>,
    /// Read buffer size in bytes.
    pub recv_buffer: usize,
}

impl Default for HyprlandConfig {
    fn default() -> Self {
        Self {
            socket_path: None,
            recv_buffer: DEFAULT_RECV_BUFFER,
        }
    }
}

/// Everything a Borealis configuration file can hold.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BorealisConfig {
    /// Application settings, at the top level of the file.
    #[serde(flatten)]
    pub application: ApplicationConfig,
    /// `[hyprland]` table.
    pub hyprland: HyprlandConfig,
}

impl BorealisConfig {
    /// Parse from TOML.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] on malformed input.
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(input)?)
    }

    /// Load from a TOML file.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Io`] if the file cannot be read, [`ConfigError::Parse`]
    /// if it is malformed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let input = std::fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
        let config = Self::from_toml_str(&input)?;
        tracing::debug!(target: "borealis::config", path = %path.display(), "configuration loaded");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = BorealisConfig::from_toml_str("").unwrap();
        assert_eq!(config.application, ApplicationConfig::default());
        assert_eq!(config.hyprland.recv_buffer, DEFAULT_RECV_BUFFER);
        assert_eq!(config.hyprland.socket_path, None);
    }

    #[test]
    fn test_tables() {
        let config = BorealisConfig::from_toml_str(
            r#"
            application_id = "org.example.bar"
            css_file = "style.css"

            [hyprland]
            socket_path = "/tmp/hypr.sock"
            recv_buffer = 4096
            "#,
        )
        .unwrap();
        assert_eq!(config.application.application_id, "org.example.bar");
        assert_eq!(config.application.css_file, Some(PathBuf::from("style.css")));
        assert_eq!(config.hyprland.socket_path, Some(PathBuf::from("/tmp/hypr.sock")));
        assert_eq!(config.hyprland.recv_buffer, 4096);
    }

    #[test]
    fn test_load() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[hyprland]").unwrap();
        writeln!(file, "recv_buffer = 512").unwrap();

        let config = BorealisConfig::load(file.path()).unwrap();
        assert_eq!(config.hyprland.recv_buffer, 512);
    }

    #[test]
    fn test_malformed() {
        assert!(matches!(
            BorealisConfig::from_toml_str("[hyprland]\nrecv_buffer = \"big\""),
            Err(ConfigError::Parse(_))
        ));
    }
}
