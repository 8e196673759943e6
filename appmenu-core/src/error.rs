//! Structured error types for appmenu-core.
//!
//! Only boundary operations (save, load, scan, config) produce these. Tree
//! mutations never fail; they report whether anything changed instead.
//! Binary crates (appmenu-cli) wrap these in `anyhow` for convenience.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for appmenu-core operations
#[derive(Error, Debug)]
pub enum AppMenuError {
    /// I/O operation failed
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    /// JSON parsing or serialization failed
    #[error("JSON error at {context}: {source}")]
    Json {
        context: String,
        source: serde_json::Error,
    },

    /// File or directory not found
    #[error("Path not found: {path:?}")]
    PathNotFound { path: PathBuf },

    /// Configuration error
    #[error("Configuration error: {reason}")]
    Config { reason: String },

    /// Filesystem enumeration failed below a scan root
    #[error("Scan failed at {path:?}: {reason}")]
    Scan { path: PathBuf, reason: String },

    /// No per-user data directory could be determined
    #[error("Could not determine a data directory for appmenu")]
    DataDir,
}

/// Result type alias for appmenu-core operations
pub type Result<T> = std::result::Result<T, AppMenuError>;

impl AppMenuError {
    /// Create a JSON error with context
    pub fn json(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Json {
            context: context.into(),
            source,
        }
    }

    /// Create a path not found error
    pub fn path_not_found(path: impl Into<PathBuf>) -> Self {
        Self::PathNotFound { path: path.into() }
    }

    /// Create a config error
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }

    /// Create a scan error for a path
    pub fn scan(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Scan {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AppMenuError::scan("/Applications/Locked", "permission denied");
        assert_eq!(
            err.to_string(),
            "Scan failed at \"/Applications/Locked\": permission denied"
        );

        let err = AppMenuError::config("debounce_ms must be positive");
        assert!(err.to_string().contains("Configuration error"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "read-only volume");
        let err: AppMenuError = io_err.into();

        assert!(matches!(err, AppMenuError::Io { .. }));
    }

    #[test]
    fn test_json_error_keeps_context() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = AppMenuError::json("items.json", source);
        assert!(err.to_string().starts_with("JSON error at items.json"));
    }
}
