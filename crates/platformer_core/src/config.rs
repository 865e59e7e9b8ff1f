//! Configuration loading
//!
//! Settings structs derive serde and implement [`Config`] to be read from or
//! written to `.toml` and `.ron` files. The format follows the extension.

pub use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// On-disk configuration format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// `.toml`
    Toml,
    /// `.ron`
    Ron,
}

impl ConfigFormat {
    /// Pick the format from a file extension
    ///
    /// # Errors
    ///
    /// [`ConfigError::UnsupportedFormat`] for any other extension.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(Self::Toml),
            Some("ron") => Ok(Self::Ron),
            _ => Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

impl fmt::Display for ConfigFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Toml => f.write_str("TOML"),
            Self::Ron => f.write_str("RON"),
        }
    }
}

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Parse configuration text in the given format
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] when the text does not describe `Self`.
    fn from_str_as(format: ConfigFormat, text: &str) -> Result<Self, ConfigError> {
        let parsed = match format {
            ConfigFormat::Toml => toml::from_str(text).map_err(|e| e.to_string()),
            ConfigFormat::Ron => ron::from_str(text).map_err(|e| e.to_string()),
        };
        parsed.map_err(|message| ConfigError::Parse { format, message })
    }

    /// Render configuration text in the given format
    ///
    /// # Errors
    ///
    /// [`ConfigError::Serialize`] when `self` cannot be expressed in `format`.
    fn to_string_as(&self, format: ConfigFormat) -> Result<String, ConfigError> {
        let rendered = match format {
            ConfigFormat::Toml => toml::to_string_pretty(self).map_err(|e| e.to_string()),
            ConfigFormat::Ron => ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| e.to_string()),
        };
        rendered.map_err(|message| ConfigError::Serialize { format, message })
    }

    /// Load configuration from file
    ///
    /// # Errors
    ///
    /// Unknown extension, unreadable file, or malformed contents.
    fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let format = ConfigFormat::from_path(path)?;
        let contents = std::fs::read_to_string(path)?;
        Self::from_str_as(format, &contents)
    }

    /// Save configuration to file
    ///
    /// # Errors
    ///
    /// Unknown extension, serialization failure, or an unwritable file.
    fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = self.to_string_as(ConfigFormat::from_path(path)?)?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("{format} parse error: {message}")]
    Parse {
        /// Format being read
        format: ConfigFormat,
        /// Parser message
        message: String,
    },

    /// Serialization error
    #[error("{format} serialization error: {message}")]
    Serialize {
        /// Format being written
        format: ConfigFormat,
        /// Serializer message
        message: String,
    },

    /// Unsupported format
    #[error("Unsupported config format: {}", .0.display())]
    UnsupportedFormat(PathBuf),
}
