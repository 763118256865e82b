//! Freshness decisions for cached records.

use tracing::debug;

use super::duration::CacheDuration;
use super::record::CacheRecord;
use crate::error::Result;

/// Result of checking a record against a freshness window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationResult {
    /// Record is within its freshness window.
    Fresh,
    /// Record is older than its freshness window.
    Expired,
    /// No record exists.
    NotFound,
}

impl ValidationResult {
    /// Whether the network must be consulted.
    pub fn needs_fetch(self) -> bool {
        !matches!(self, Self::Fresh)
    }
}

/// Instant (epoch ms) at which `record` stops being fresh.
///
/// `None` means the record never expires.
pub fn expires_at(record: &CacheRecord, duration: CacheDuration) -> Option<i64> {
    match duration {
        CacheDuration::Forever => None,
        CacheDuration::Span(span) => Some(
            record
                .cached_at
                .saturating_add(span.num_milliseconds()),
        ),
    }
}

/// Check a record against a parsed duration at `now_ms`.
///
/// A missing record is always [`ValidationResult::NotFound`], whatever the
/// duration. A record is fresh while its expiry instant is strictly later
/// than `now_ms`.
pub fn validate(
    record: Option<&CacheRecord>,
    duration: CacheDuration,
    now_ms: i64,
) -> ValidationResult {
    let Some(record) = record else {
        return ValidationResult::NotFound;
    };

    let Some(expiry) = expires_at(record, duration) else {
        return ValidationResult::Fresh;
    };

    let relative_secs = now_ms.saturating_sub(expiry).saturating_abs() / 1000;
    if expiry > now_ms {
        debug!("Cache okay, expires in {}s (at {}ms)", relative_secs, expiry);
        ValidationResult::Fresh
    } else {
        debug!("Cache expired {}s ago (at {}ms)", relative_secs, expiry);
        ValidationResult::Expired
    }
}

/// Decide whether a record must be fetched again.
///
/// A missing record always needs a fetch. Once a record exists, an empty
/// duration or `*` never expires. Otherwise the duration is parsed and
/// malformed values fail with
/// [`AssetCacheError::InvalidDuration`](crate::AssetCacheError::InvalidDuration).
pub fn needs_refetch(record: Option<&CacheRecord>, duration: &str, now_ms: i64) -> Result<bool> {
    if record.is_none() {
        return Ok(true);
    }
    let duration = CacheDuration::parse(duration)?;
    Ok(validate(record, duration, now_ms).needs_fetch())
}
