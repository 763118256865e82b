//! Error types for asset cache operations.
//!
//! This module defines [`AssetCacheError`], the primary error type used
//! throughout the library, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Every failure aborts the current `resolve` call and reaches the caller
//! - Nothing is retried and nothing is swallowed
//! - Use `anyhow::Error` (via `AssetCacheError::Other`) for unexpected errors

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for asset cache operations.
#[derive(Debug, Error)]
pub enum AssetCacheError {
    /// The server answered with a non-success status.
    #[error("Bad response for {url} ({status}): {reason}")]
    BadResponse {
        url: String,
        status: u16,
        reason: String,
    },

    /// The request never produced a response (DNS, TLS, timeout, ...).
    #[error("Request for {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The store file could not be read or written.
    #[error("Cache store I/O failed at {path}: {source}")]
    StoreIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The store file exists but does not hold a valid store.
    #[error("Cache store at {path} is corrupt: {source}")]
    StoreCorrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Bytes requested as JSON are not valid JSON.
    #[error("Failed to parse asset as JSON: {source}")]
    Parse {
        #[source]
        source: serde_json::Error,
    },

    /// A duration string could not be understood.
    #[error("Invalid cache duration '{value}': {message}")]
    InvalidDuration { value: String, message: String },

    /// An explicitly named configuration file does not exist.
    #[error("Config file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse the configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    /// Invalid configuration values.
    #[error("Invalid configuration: {message}")]
    ConfigValidation { message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AssetCacheError {
    /// Whether this error came from the network side of a fetch.
    pub fn is_fetch_failure(&self) -> bool {
        matches!(self, Self::BadResponse { .. } | Self::Transport { .. })
    }

    /// HTTP status of a bad response, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::BadResponse { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type alias for asset cache operations.
pub type Result<T> = std::result::Result<T, AssetCacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_response_displays_url_status_and_reason() {
        let err = AssetCacheError::BadResponse {
            url: "https://example.com/a.json".into(),
            status: 500,
            reason: "Internal Server Error".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("https://example.com/a.json"));
        assert!(msg.contains("500"));
        assert!(msg.contains("Internal Server Error"));
    }

    #[test]
    fn fetch_failures_are_classified() {
        let bad = AssetCacheError::BadResponse {
            url: "u".into(),
            status: 404,
            reason: "Not Found".into(),
        };
        let transport = AssetCacheError::Transport {
            url: "u".into(),
            source: "connection refused".into(),
        };
        let invalid = AssetCacheError::InvalidDuration {
            value: "1x".into(),
            message: "unknown unit".into(),
        };

        assert!(bad.is_fetch_failure());
        assert!(transport.is_fetch_failure());
        assert!(!invalid.is_fetch_failure());
        assert_eq!(bad.status(), Some(404));
        assert_eq!(transport.status(), None);
    }

    #[test]
    fn store_io_displays_path() {
        let err = AssetCacheError::StoreIo {
            path: PathBuf::from("/cache/asset-cache-abc"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/cache/asset-cache-abc"));
        assert!(msg.contains("denied"));
    }

    #[test]
    fn invalid_duration_displays_value() {
        let err = AssetCacheError::InvalidDuration {
            value: "10x".into(),
            message: "unknown unit 'x'".into(),
        };
        assert!(err.to_string().contains("10x"));
    }

    #[test]
    fn config_not_found_displays_path() {
        let err = AssetCacheError::ConfigNotFound {
            path: PathBuf::from("/site/missing.yml"),
        };
        assert!(err.to_string().contains("/site/missing.yml"));
    }

    #[test]
    fn io_error_converts_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: AssetCacheError = io_err.into();
        assert!(matches!(err, AssetCacheError::Io(_)));
    }

    #[test]
    fn result_type_alias_works() {
        fn returns_error() -> Result<()> {
            Err(AssetCacheError::InvalidDuration {
                value: "".into(),
                message: "empty".into(),
            })
        }
        assert!(returns_error().is_err());
    }
}
