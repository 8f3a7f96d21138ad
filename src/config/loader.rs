//! Configuration loader
//!
//! Loading pipeline:
//! 1. Size check and raw read
//! 2. BOM stripping
//! 3. YAML parsing into [`LightConfig`] (an empty document yields defaults)
//! 4. Validation

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::ConfigError;

use super::schema::LightConfig;
use super::validation;

/// Largest configuration file accepted, in bytes.
pub const MAX_CONFIG_SIZE: u64 = 64 * 1024;

impl LightConfig {
    /// Loads and validates the configuration file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file does not exist or cannot be read
    /// - The file exceeds [`MAX_CONFIG_SIZE`]
    /// - YAML parsing fails
    /// - Validation fails
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let metadata = std::fs::metadata(path).map_err(|e| read_error(path, e))?;
        if metadata.len() > MAX_CONFIG_SIZE {
            return Err(ConfigError::InvalidValue {
                field: "file_size".to_string(),
                value: format!("{} bytes", metadata.len()),
                expected: format!("at most {MAX_CONFIG_SIZE} bytes"),
            });
        }

        let raw = std::fs::read_to_string(path).map_err(|e| read_error(path, e))?;
        let config = parse(&raw, path)?;
        debug!(path = %path.display(), ?config, "configuration loaded");
        Ok(config)
    }

    /// Parses and validates configuration text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ParseError`] for malformed YAML and
    /// [`ConfigError::InvalidValue`] when validation fails.
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        parse(text, Path::new("<inline>"))
    }

    /// Checks this configuration for values the signal cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validation::validate(self)
    }
}

fn parse(raw: &str, path: &Path) -> Result<LightConfig, ConfigError> {
    let text = raw.strip_prefix('\u{feff}').unwrap_or(raw);

    let config = if text.trim().is_empty() {
        LightConfig::default()
    } else {
        serde_yaml::from_str(text).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            line: e.location().map(|l| l.line()),
            message: e.to_string(),
        })?
    };

    config.validate()?;
    Ok(config)
}

fn read_error(path: &Path, source: std::io::Error) -> ConfigError {
    if source.kind() == ErrorKind::NotFound {
        ConfigError::MissingFile {
            path: PathBuf::from(path),
        }
    } else {
        ConfigError::Read {
            path: PathBuf::from(path),
            source,
        }
    }
}
