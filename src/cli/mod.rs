//! Command-line interface for assetcache.
//!
//! # Architecture
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`commands`] - Command implementations

pub mod args;
pub mod commands;

pub use args::{Cli, Commands, FetchArgs, StatusArgs};
pub use commands::{Command, CommandDispatcher, CommandResult};
