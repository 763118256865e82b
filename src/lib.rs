//! assetcache - Disk-backed cache for remote assets.
//!
//! Given a URL, [`AssetCache`] returns the cached bytes while a freshness
//! window allows, and otherwise fetches them, persists them to disk and
//! returns them.
//!
//! # Modules
//!
//! - [`cache`] - Cache keys, durations, records, the store and [`AssetCache`]
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Configuration file loading
//! - [`convert`] - Output representations (bytes, text, JSON)
//! - [`error`] - Error types and result aliases
//! - [`fetch`] - Network retrieval
//!
//! # Example
//!
//! ```
//! use assetcache::cache::{needs_refetch, CacheRecord};
//!
//! let record = CacheRecord::new(0, b"cached".to_vec());
//! let one_hour = 3_600_000;
//!
//! assert!(!needs_refetch(Some(&record), "2h", one_hour).unwrap());
//! assert!(needs_refetch(Some(&record), "30m", one_hour).unwrap());
//! assert!(!needs_refetch(Some(&record), "*", i64::MAX).unwrap());
//! ```

pub mod cache;
pub mod cli;
pub mod config;
pub mod convert;
pub mod error;
pub mod fetch;

pub use cache::{AssetCache, ResolveOptions};
pub use convert::{Output, OutputType};
pub use error::{AssetCacheError, Result};
