//! Cache duration parsing.
//!
//! Durations are written as `<integer><unit>` with one of the units
//! `s`, `m`, `h`, `d`, `w` or `y`. The special value `*` never expires.

use chrono::Duration;
use std::fmt;
use std::str::FromStr;

use crate::error::{AssetCacheError, Result};

/// Duration meaning "never expires".
pub const FOREVER: &str = "*";

/// Duration used when the caller does not supply one.
pub const DEFAULT_DURATION: &str = "1d";

/// A parsed freshness window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheDuration {
    /// Cached records never expire.
    Forever,
    /// Cached records expire after this span.
    Span(Duration),
}

impl CacheDuration {
    /// Parse a duration string.
    ///
    /// An empty string and `*` both mean [`CacheDuration::Forever`].
    pub fn parse(duration: &str) -> Result<Self> {
        let duration = duration.trim();
        if duration.is_empty() || duration == FOREVER {
            return Ok(Self::Forever);
        }
        parse_duration_ms(duration).map(|ms| Self::Span(Duration::milliseconds(ms)))
    }

    /// Whether this is [`CacheDuration::Forever`].
    pub fn is_forever(&self) -> bool {
        matches!(self, Self::Forever)
    }
}

impl FromStr for CacheDuration {
    type Err = AssetCacheError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for CacheDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Forever => f.write_str(FOREVER),
            Self::Span(d) => f.write_str(&format_duration(*d)),
        }
    }
}

/// Seconds-multiplier for a unit character.
fn unit_seconds(unit: char) -> Option<i64> {
    match unit {
        's' => Some(1),
        'm' => Some(60),
        'h' => Some(60 * 60),
        'd' => Some(60 * 60 * 24),
        'w' => Some(60 * 60 * 24 * 7),
        'y' => Some(60 * 60 * 24 * 365),
        _ => None,
    }
}

/// Parse a duration string like "30m", "1d" or "2w" into milliseconds.
///
/// Fails with [`AssetCacheError::InvalidDuration`] on an unknown unit, a
/// missing or non-numeric magnitude, or a value too large to represent.
pub fn parse_duration_ms(duration: &str) -> Result<i64> {
    let invalid = |message: String| AssetCacheError::InvalidDuration {
        value: duration.to_string(),
        message,
    };

    let trimmed = duration.trim();
    let unit = trimmed
        .chars()
        .last()
        .ok_or_else(|| invalid("duration is empty".to_string()))?;
    let multiplier =
        unit_seconds(unit).ok_or_else(|| invalid(format!("unknown unit '{}'", unit)))?;

    let magnitude = trimmed[..trimmed.len() - unit.len_utf8()].trim();
    if magnitude.is_empty() || !magnitude.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid(format!("expected a whole number before '{}'", unit)));
    }
    let value: i64 = magnitude
        .parse()
        .map_err(|e| invalid(format!("{}", e)))?;

    value
        .checked_mul(multiplier)
        .and_then(|secs| secs.checked_mul(1000))
        .ok_or_else(|| invalid("duration is too large".to_string()))
}

/// Format a duration for display.
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.num_seconds();

    if secs >= 86400 {
        let days = secs / 86400;
        format!("{}d", days)
    } else if secs >= 3600 {
        let hours = secs / 3600;
        format!("{}h", hours)
    } else if secs >= 60 {
        let mins = secs / 60;
        format!("{}m", mins)
    } else {
        format!("{}s", secs)
    }
}
