//! assetcache CLI entry point.

use std::process::ExitCode;

use assetcache::cli::{Cli, CommandDispatcher};
use clap::Parser;
use console::style;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber for logging.
///
/// Log level is controlled by:
/// 1. `--debug` flag sets level to DEBUG
/// 2. `RUST_LOG` environment variable (if set)
/// 3. Default is INFO
///
/// Logs go to stderr; stdout carries asset bytes.
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("assetcache=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("assetcache=info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    tracing::debug!("assetcache starting with args: {:?}", cli);

    let working_dir = std::env::current_dir().unwrap_or_default();
    let result = CommandDispatcher::from_cli(&cli, &working_dir).and_then(|dispatcher| {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        dispatcher.dispatch(&cli, &mut out)
    });

    match result {
        Ok(result) => ExitCode::from(result.exit_code),
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            ExitCode::from(1)
        }
    }
}
