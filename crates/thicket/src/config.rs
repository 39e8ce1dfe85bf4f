//! Parse configuration.
//!
//! Nothing is read from the environment: callers build a [`ParseConfig`] in
//! code or load one from JSON.
//!
//! ```json
//! { "backend": "html", "fragment": true }
//! ```
//!
//! Missing fields take their defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use thiserror::Error;

/// Which tree representation a [`Document`](crate::Document) is parsed into.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Backend {
    /// The arena DOM from `thicket-dom`, searched through
    /// [`DomElement`](thicket_select::DomElement).
    #[default]
    Dom,
    /// The `scraper` parse tree, searched through
    /// [`HtmlElement`](thicket_select::HtmlElement).
    Html,
}

/// Options for [`Document::parse`](crate::Document::parse).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseConfig {
    /// Tree representation to build.
    pub backend: Backend,
    /// Parse as an HTML fragment instead of a full document.
    pub fragment: bool,
}

impl ParseConfig {
    /// Set [`ParseConfig::backend`].
    #[must_use]
    pub const fn backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    /// Set [`ParseConfig::fragment`].
    #[must_use]
    pub const fn fragment(mut self, fragment: bool) -> Self {
        self.fragment = fragment;
        self
    }

    /// Read a configuration from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] for malformed JSON, unknown backends or
    /// mistyped fields.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Read a configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the file cannot be read, and
    /// otherwise see [`ParseConfig::from_json`].
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&text)?;
        tracing::debug!(path = %path.display(), backend = %config.backend, "loaded parse config");
        Ok(config)
    }
}

/// Failure to load a [`ParseConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read '{}': {source}", path.display())]
    Io {
        /// File that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The configuration text is not a valid configuration.
    #[error("invalid configuration: {0}")]
    Json(#[from] serde_json::Error),
}
