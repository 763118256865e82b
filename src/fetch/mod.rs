//! Network retrieval of assets.
//!
//! The cache only needs "fetch this URL into bytes", expressed by the
//! [`Fetcher`] trait. [`HttpFetcher`] implements it over HTTP/HTTPS.

pub mod http;

pub use http::HttpFetcher;

use crate::error::Result;

/// Retrieves the full body of a URL.
///
/// A non-success HTTP status must be reported as
/// [`AssetCacheError::BadResponse`](crate::AssetCacheError::BadResponse) and a
/// transport failure as
/// [`AssetCacheError::Transport`](crate::AssetCacheError::Transport).
pub trait Fetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

impl<F: Fetcher + ?Sized> Fetcher for &F {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        (**self).fetch(url)
    }
}
