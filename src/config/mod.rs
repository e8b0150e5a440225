//! Configuration management for `tessera.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # [svg], [yuv], [contacts]
//! ├── types/         # ConfigError, global handle
//! └── mod.rs         # TesseraConfig (this file)
//! ```
//!
//! A missing config file is not an error: every section has defaults, and
//! library callers that never load a file read the defaults via [`cfg`].

pub mod section;
pub mod types;

pub use section::{ContactsConfig, SvgConfig, YuvConfig};
pub use types::{ConfigError, cfg, init_config};

use crate::log;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing tessera.toml
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TesseraConfig {
    /// SVG rendering settings
    #[serde(default)]
    pub svg: SvgConfig,

    /// Pixel-format conversion settings
    #[serde(default)]
    pub yuv: YuvConfig,

    /// Contact index settings
    #[serde(default)]
    pub contacts: ContactsConfig,
}

impl TesseraConfig {
    /// Load and validate the config at `path`, or defaults if it does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let config = if path.exists() {
            Self::from_path(path)?
        } else {
            Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring: {}", display_path, fields.join(", "));
    }

    /// Reject values the adapters cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let scale = self.svg.default_scale;
        if !scale.is_finite() || scale <= 0.0 {
            return Err(ConfigError::validation(
                "svg.default_scale",
                format!("must be a positive number, got {scale}"),
            ));
        }
        if self.svg.max_pixels == 0 {
            return Err(ConfigError::validation(
                "svg.max_pixels",
                "must be greater than zero",
            ));
        }
        if self.contacts.reference_prefix.is_empty() {
            return Err(ConfigError::validation(
                "contacts.reference_prefix",
                "must not be empty",
            ));
        }
        Ok(())
    }
}

// ============================================================================
// tests
// ============================================================================
