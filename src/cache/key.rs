//! Cache key derivation.

use sha2::{Digest, Sha256};

/// Prefix of every store file name.
pub const STORE_FILE_PREFIX: &str = "asset-cache";

/// Derive the short cache key for a URL.
///
/// The key is the first 8 bytes of the SHA-256 digest of the URL's UTF-8
/// bytes, hex encoded. It is stable across processes and platforms, so a
/// later run finds the store written by an earlier one. With 64 bits of
/// digest, accidental collisions need around 4 billion distinct URLs to
/// become likely; a collision only shares a store file, since records
/// inside it are still keyed by the full URL.
pub fn cache_key(url: &str) -> String {
    let hash = Sha256::digest(url.as_bytes());
    hex::encode(&hash[..8])
}

/// Name of the store file for a cache key.
pub fn store_file_name(key: &str) -> String {
    format!("{}-{}", STORE_FILE_PREFIX, key)
}
