//! Fetch command implementation.
//!
//! `assetcache fetch <URL>` resolves an asset and writes it out.

use anyhow::Context;
use std::fs;
use std::io::Write;

use super::dispatcher::{build_cache, Command, CommandResult};
use crate::cache::ResolveOptions;
use crate::cli::args::FetchArgs;
use crate::config::CacheConfig;

/// The fetch command implementation.
pub struct FetchCommand<'a> {
    config: &'a CacheConfig,
    args: FetchArgs,
}

impl<'a> FetchCommand<'a> {
    /// Create a new fetch command.
    pub fn new(config: &'a CacheConfig, args: FetchArgs) -> Self {
        Self { config, args }
    }

    fn options(&self) -> ResolveOptions {
        let mut options = ResolveOptions::new().output(self.args.output_type);
        if let Some(duration) = &self.args.duration {
            options = options.duration(duration.clone());
        }
        options
    }
}

impl Command for FetchCommand<'_> {
    fn execute(&self, out: &mut dyn Write) -> crate::error::Result<CommandResult> {
        let mut cache = build_cache(self.config, &self.args.url)?;
        let bytes = cache.resolve(&self.options())?.into_bytes()?;

        match &self.args.output {
            Some(path) => {
                fs::write(path, &bytes)
                    .with_context(|| format!("Failed to write asset to {:?}", path))?;
                tracing::debug!("Wrote {} bytes to {:?}", bytes.len(), path);
            }
            None => {
                out.write_all(&bytes)?;
                out.flush()?;
            }
        }

        Ok(CommandResult::success())
    }
}
