//! Status command implementation.
//!
//! `assetcache status <URL>` reports what the cache holds for a URL
//! without touching the network.

use chrono::{TimeZone, Utc};
use console::style;
use serde::Serialize;
use std::io::Write;

use super::dispatcher::{build_cache, Command, CommandResult};
use crate::cache::validation::expires_at;
use crate::cache::{format_duration, CacheDuration, ValidationResult};
use crate::cli::args::StatusArgs;
use crate::config::CacheConfig;
use crate::error::Result;

/// The status command implementation.
pub struct StatusCommand<'a> {
    config: &'a CacheConfig,
    args: StatusArgs,
}

/// Machine-readable status report.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    pub url: String,
    pub cache_key: String,
    pub store_path: String,
    pub duration: String,
    pub state: &'static str,
    pub cached_at: Option<String>,
    pub expires_at: Option<String>,
    pub size_bytes: Option<usize>,
}

impl<'a> StatusCommand<'a> {
    /// Create a new status command.
    pub fn new(config: &'a CacheConfig, args: StatusArgs) -> Self {
        Self { config, args }
    }

    /// Inspect the cache and build a report.
    pub fn report(&self) -> Result<StatusReport> {
        let mut cache = build_cache(self.config, &self.args.url)?;
        let duration = match self.args.duration.as_deref() {
            Some(d) if !d.is_empty() => d.to_string(),
            _ => cache.default_duration().to_string(),
        };
        let parsed = CacheDuration::parse(&duration)?;
        let state = cache.freshness(&duration)?;

        let to_rfc3339 = |ms: i64| {
            Utc.timestamp_millis_opt(ms)
                .single()
                .map(|t| t.to_rfc3339())
        };

        let cache_key = cache.cache_key().to_string();
        let store_path = cache.cache_path().display().to_string();
        let record = cache.cached_record()?;

        Ok(StatusReport {
            url: self.args.url.clone(),
            cache_key,
            store_path,
            duration: parsed.to_string(),
            state: match state {
                ValidationResult::Fresh => "fresh",
                ValidationResult::Expired => "expired",
                ValidationResult::NotFound => "missing",
            },
            cached_at: record.and_then(|r| to_rfc3339(r.cached_at)),
            expires_at: record
                .and_then(|r| expires_at(r, parsed))
                .and_then(to_rfc3339),
            size_bytes: record.map(|r| r.size_bytes()),
        })
    }
}

impl Command for StatusCommand<'_> {
    fn execute(&self, out: &mut dyn Write) -> Result<CommandResult> {
        let report = self.report()?;

        if self.args.json {
            let json = serde_json::to_string_pretty(&report).map_err(anyhow::Error::from)?;
            writeln!(out, "{}", json)?;
            return Ok(CommandResult::success());
        }

        writeln!(out, "{}", style(&report.url).bold())?;
        writeln!(out, "  Store: {}", report.store_path)?;

        let state = match report.state {
            "fresh" => style(report.state).green(),
            "expired" => style(report.state).yellow(),
            _ => style(report.state).dim(),
        };
        writeln!(out, "  Status: {} (duration {})", state, report.duration)?;

        if let Some(cached_at) = &report.cached_at {
            writeln!(out, "  Cached: {}", cached_at)?;
        }
        if let Some(size) = report.size_bytes {
            writeln!(out, "  Size: {} bytes", size)?;
        }
        if let Some(expires) = &report.expires_at {
            let remaining = chrono::DateTime::parse_from_rfc3339(expires)
                .map(|t| t.with_timezone(&Utc) - Utc::now())
                .ok();
            match remaining {
                Some(left) if left > chrono::Duration::zero() => {
                    writeln!(out, "  Expires: {} (in {})", expires, format_duration(left))?
                }
                Some(ago) => {
                    writeln!(out, "  Expired: {} ({} ago)", expires, format_duration(-ago))?
                }
                None => writeln!(out, "  Expires: {}", expires)?,
            }
        }

        Ok(CommandResult::success())
    }
}
