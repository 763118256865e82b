//! Cached record type.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// The persisted state for one URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheRecord {
    /// When the payload was written, in epoch milliseconds.
    pub cached_at: i64,
    /// Raw response body.
    #[serde(with = "base64_bytes")]
    pub payload: Vec<u8>,
}

impl CacheRecord {
    /// Create a record for a payload fetched at `cached_at`.
    pub fn new(cached_at: i64, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            cached_at,
            payload: payload.into(),
        }
    }

    /// `cached_at` as a UTC timestamp.
    pub fn cached_at_utc(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.cached_at).single()
    }

    /// Size of the payload in bytes.
    pub fn size_bytes(&self) -> usize {
        self.payload.len()
    }
}

/// Base64 encoding for payload bytes, so binary content survives JSON.
mod base64_bytes {
    use base64::{engine::general_purpose, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&general_purpose::STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let encoded = String::deserialize(deserializer)?;
        general_purpose::STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}
