// src/error.rs

//! Unified error handling for the watcher.

use std::fmt;

use thiserror::Error;

/// Result type alias for watcher operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Command-line usage error
    #[error("Usage error: {0}")]
    Usage(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Fetching a page or image failed
    #[error("Fetch error for {url}: {message}")]
    Fetch { url: String, message: String },

    /// A fetched document could not be interpreted
    #[error("Parse error for {context}: {message}")]
    Parse { context: String, message: String },

    /// The listing store could not be read
    #[error("Store load error for {path}: {message}")]
    StoreLoad { path: String, message: String },

    /// The listing store could not be written
    #[error("Store save error for {path}: {message}")]
    StoreSave { path: String, message: String },

    /// Notification transport failed
    #[error("Notification error: {0}")]
    Notify(String),
}

impl AppError {
    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// Create a usage error.
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage(message.into())
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a fetch error for a URL.
    pub fn fetch(url: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Fetch {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Create a parse error with context.
    pub fn parse(context: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Parse {
            context: context.into(),
            message: message.to_string(),
        }
    }

    /// Create a store load error.
    pub fn store_load(path: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::StoreLoad {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Create a store save error.
    pub fn store_save(path: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::StoreSave {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Create a notification transport error.
    pub fn notify(message: impl fmt::Display) -> Self {
        Self::Notify(message.to_string())
    }

    /// Whether this error happened while retrieving bytes from the network.
    pub fn is_fetch_failure(&self) -> bool {
        matches!(self, Self::Fetch { .. } | Self::Http(_))
    }
}
