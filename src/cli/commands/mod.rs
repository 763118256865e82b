//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait and is routed by
//! [`CommandDispatcher`], which also owns the merged configuration.

pub mod dispatcher;
pub mod fetch;
pub mod status;

pub use dispatcher::{Command, CommandDispatcher, CommandResult};
