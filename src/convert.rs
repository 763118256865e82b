//! Output conversion for resolved assets.

use std::fmt;
use std::str::FromStr;

use crate::error::{AssetCacheError, Result};

/// Representation requested for a resolved asset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputType {
    /// Raw bytes, untouched.
    #[default]
    Buffer,
    /// UTF-8 text.
    Text,
    /// Parsed JSON.
    Json,
}

impl FromStr for OutputType {
    type Err = AssetCacheError;

    /// Unrecognized names fall back to [`OutputType::Buffer`].
    fn from_str(s: &str) -> Result<Self> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "json" => Self::Json,
            "text" => Self::Text,
            _ => Self::Buffer,
        })
    }
}

impl fmt::Display for OutputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Buffer => "buffer",
            Self::Text => "text",
            Self::Json => "json",
        })
    }
}

/// A resolved asset in its requested representation.
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    Buffer(Vec<u8>),
    Text(String),
    Json(serde_json::Value),
}

impl Output {
    /// Raw bytes, if this is a buffer.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Buffer(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Text, if this is text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// JSON value, if this is JSON.
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Bytes suitable for writing to a file or stdout.
    ///
    /// JSON is pretty-printed with a trailing newline.
    pub fn into_bytes(self) -> Result<Vec<u8>> {
        match self {
            Self::Buffer(bytes) => Ok(bytes),
            Self::Text(text) => Ok(text.into_bytes()),
            Self::Json(value) => {
                let mut out = serde_json::to_vec_pretty(&value)
                    .map_err(|source| AssetCacheError::Parse { source })?;
                out.push(b'\n');
                Ok(out)
            }
        }
    }
}

/// Convert raw bytes into the requested representation.
///
/// Text decoding replaces invalid UTF-8 sequences with U+FFFD. JSON
/// conversion fails with [`AssetCacheError::Parse`] on malformed input.
pub fn convert(bytes: Vec<u8>, output: OutputType) -> Result<Output> {
    match output {
        OutputType::Json => serde_json::from_slice(&bytes)
            .map(Output::Json)
            .map_err(|source| AssetCacheError::Parse { source }),
        OutputType::Text => Ok(Output::Text(match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
        })),
        OutputType::Buffer => Ok(Output::Buffer(bytes)),
    }
}
