//! Application configuration.
//!
//! ```
//! use borealis_core::ApplicationConfig;
//!
//! let config = ApplicationConfig::from_toml_str(r#"
//!     application_id = "org.example.bar"
//!     css_file = "style.css"
//! "#).unwrap();
//! assert_eq!(config.application_id, "org.example.bar");
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default application id.
pub const DEFAULT_APPLICATION_ID: &str = "com.example.app";

/// Settings of an [`Application`](crate::Application).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationConfig {
    /// Reverse-DNS application id.
    pub application_id: String,
    /// Stylesheet to load at activation.
    pub css_file: Option<PathBuf>,
    /// Panic when UI-thread-only operations run elsewhere.
    pub ui_thread_checks: bool,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            application_id: DEFAULT_APPLICATION_ID.to_string(),
            css_file: None,
            ui_thread_checks: cfg!(debug_assertions),
        }
    }
}

impl ApplicationConfig {
    /// Default settings with the given id.
    pub fn new(application_id: impl Into<String>) -> Self {
        Self {
            application_id: application_id.into(),
            ..Self::default()
        }
    }

    /// Set the stylesheet.
    pub fn with_css_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.css_file = Some(path.into());
        self
    }

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
        Self::from_toml_str(&input)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = ApplicationConfig::from_toml_str("").unwrap();
        assert_eq!(config.application_id, DEFAULT_APPLICATION_ID);
        assert_eq!(config.css_file, None);
    }

    #[test]
    fn test_wrong_type_is_rejected() {
        assert!(matches!(
            ApplicationConfig::from_toml_str("ui_thread_checks = \"yes\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_load_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "application_id = \"org.example.test\"").unwrap();
        writeln!(file, "ui_thread_checks = false").unwrap();

        let config = ApplicationConfig::load(file.path()).unwrap();
        assert_eq!(config.application_id, "org.example.test");
        assert!(!config.ui_thread_checks);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            ApplicationConfig::load(dir.path().join("missing.toml")),
            Err(ConfigError::Io { .. })
        ));
    }
}
