//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::convert::OutputType;

/// assetcache - Fetch remote assets through a local disk cache.
#[derive(Debug, Parser)]
#[command(name = "assetcache")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Cache directory (overrides the config file)
    #[arg(long, global = true, env = "ASSET_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Path to config file (overrides default .assetcache.yml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Fetch an asset, serving it from the cache while fresh
    Fetch(FetchArgs),

    /// Show what the cache holds for a URL
    Status(StatusArgs),
}

/// Arguments for the `fetch` command.
#[derive(Debug, Clone, clap::Args)]
pub struct FetchArgs {
    /// URL of the asset
    pub url: String,

    /// Freshness window, e.g. 30m, 1d, 2w, or * for never
    #[arg(short, long)]
    pub duration: Option<String>,

    /// Representation to emit
    #[arg(short = 't', long = "type", value_enum, default_value_t = OutputType::Buffer)]
    pub output_type: OutputType,

    /// Write to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the `status` command.
#[derive(Debug, Clone, clap::Args)]
pub struct StatusArgs {
    /// URL of the asset
    pub url: String,

    /// Freshness window to check against
    #[arg(short, long)]
    pub duration: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}
