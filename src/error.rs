//! Unified error types for urlgroup.
//!
//! The grouping engine itself is total over its input: classifiers either
//! match or they don't, and every path produces a simplified form. Errors only
//! surface while building a grouper (bad classifier configuration) or at the
//! I/O edges of the command-line tool.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for urlgroup operations.
#[derive(Error, Debug)]
pub enum UrlGroupError {
    /// I/O errors while reading URL lists or config files.
    #[error("storage error at {path}: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Configuration loading errors.
    #[error("config error: {message}")]
    Config { message: String },

    /// Classifier construction errors (bad pattern, empty label).
    #[error("classifier error: {message}")]
    Classifier { message: String },

    /// URL parsing errors.
    #[error("url error: {message}")]
    Url { message: String },

    /// Malformed or oversized input.
    #[error("input error: {message}")]
    Input { message: String },

    /// JSON serialization errors.
    #[error("serialization error: {message}")]
    Serde { message: String },
}

/// A specialized Result type for urlgroup operations.
pub type Result<T> = std::result::Result<T, UrlGroupError>;

impl UrlGroupError {
    /// Create a storage error from an I/O error.
    pub fn storage(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Storage {
            path: path.into(),
            source,
        }
    }

    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a classifier error.
    pub fn classifier(message: impl Into<String>) -> Self {
        Self::Classifier {
            message: message.into(),
        }
    }

    /// Create an input error.
    pub fn input(message: impl Into<String>) -> Self {
        Self::Input {
            message: message.into(),
        }
    }
}

impl From<io::Error> for UrlGroupError {
    fn from(err: io::Error) -> Self {
        Self::Storage {
            path: PathBuf::new(),
            source: err,
        }
    }
}

impl From<serde_json::Error> for UrlGroupError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde {
            message: err.to_string(),
        }
    }
}

impl From<regex::Error> for UrlGroupError {
    fn from(err: regex::Error) -> Self {
        Self::Classifier {
            message: err.to_string(),
        }
    }
}

impl From<url::ParseError> for UrlGroupError {
    fn from(err: url::ParseError) -> Self {
        Self::Url {
            message: err.to_string(),
        }
    }
}

/// Trait for fail-open error handling.
///
/// Used where a failure should degrade to a default rather than stop the
/// tool, such as a broken user config file.
pub trait FailOpen<T> {
    /// Handle an error by logging a warning and returning the default value.
    fn fail_open_default(self, context: &str) -> T
    where
        T: Default;
}

impl<T> FailOpen<T> for Result<T> {
    fn fail_open_default(self, context: &str) -> T
    where
        T: Default,
    {
        match self {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!("{}: {} (fail-open: using default)", context, err);
                T::default()
            }
        }
    }
}

/// Exit codes for the urlgroup CLI.
pub mod exit_codes {
    /// The command completed.
    pub const SUCCESS: i32 = 0;

    /// The command failed (bad input, bad config).
    pub const ERROR: i32 = 1;

    /// The process panicked.
    pub const CRASH: i32 = 3;
}
