//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for routing CLI subcommands

use std::io::Write;
use std::path::Path;

use crate::cache::AssetCache;
use crate::cli::args::{Cli, Commands};
use crate::config::CacheConfig;
use crate::error::Result;
use crate::fetch::HttpFetcher;

/// Trait for command implementations.
pub trait Command {
    /// Execute the command, writing user-facing output to `out`.
    fn execute(&self, out: &mut dyn Write) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Exit code to use.
    pub exit_code: u8,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self { exit_code: 0 }
    }
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    config: CacheConfig,
}

impl CommandDispatcher {
    /// Create a dispatcher with an already-resolved configuration.
    pub fn new(config: CacheConfig) -> Self {
        Self { config }
    }

    /// Build the configuration for `cli`, looking for a config file in
    /// `working_dir`.
    ///
    /// Precedence: `--cache-dir` / `ASSET_CACHE_DIR`, then the config file,
    /// then defaults.
    pub fn from_cli(cli: &Cli, working_dir: &Path) -> Result<Self> {
        let mut config = CacheConfig::discover(cli.config.as_deref(), working_dir)?;
        if let Some(dir) = &cli.cache_dir {
            config.cache_directory = dir.clone();
        }
        Ok(Self::new(config))
    }

    /// The merged configuration.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Dispatch and execute a command.
    pub fn dispatch(&self, cli: &Cli, out: &mut dyn Write) -> Result<CommandResult> {
        match &cli.command {
            Commands::Fetch(args) => {
                let cmd = super::fetch::FetchCommand::new(&self.config, args.clone());
                cmd.execute(out)
            }
            Commands::Status(args) => {
                let cmd = super::status::StatusCommand::new(&self.config, args.clone());
                cmd.execute(out)
            }
        }
    }
}

/// Build an HTTP-backed cache for `url` from `config`.
pub fn build_cache(config: &CacheConfig, url: &str) -> Result<AssetCache> {
    let fetcher = HttpFetcher::with_options(config.timeout(), &config.user_agent)?;
    AssetCache::with_fetcher(url, fetcher)
        .in_directory(&config.cache_directory)
        .with_default_duration(&config.default_duration)
}
