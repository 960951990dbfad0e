//! spendtrack - command-line client for the spendtrack expense backend.
//!
//! Logs in against the backend, keeps the session token locally and drives
//! the settings, category, expense and summary endpoints.

mod commands;

use std::io;
use std::process::ExitCode;

use anyhow::Result;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use spendtrack_core::CancelScope;

/// Directory for an additional daily log file
const LOG_DIR_ENV: &str = "SPENDTRACK_LOG_DIR";

const USAGE: &str = "\
Usage: spendtrack <command> [args]

Commands:
  login [username]                       Log in and store the session token
  register [username] [email]            Create an account and log in
  logout                                 Forget the stored session token
  status                                 Show whether the stored session is usable
  settings show                          Show username, email and currency
  settings set <field> [value]           Update username, email or password
  categories                             List categories
  categories add <name> <icon>           Create a category
  icons                                  List predefined icons
  expense add <category-id> <amount> <description> [YYYY-MM-DD]
                                         Record an expense
  summary                                Compare this month with the last one
  limits                                 List predefined spending limits

Environment:
  SPENDTRACK_API_BASE_URL   Backend base URL (overrides the config file)
  SPENDTRACK_LOG_DIR        Also write logs to a daily file in this directory
  RUST_LOG                  Log filter (default: warn)";

/// Initialize the tracing subscriber for logging.
/// The returned guard flushes the file writer and must outlive `main`'s work.
fn init_tracing() -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match std::env::var(LOG_DIR_ENV) {
        Ok(dir) if !dir.trim().is_empty() => {
            let appender = tracing_appender::rolling::daily(dir.trim(), "spendtrack.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_ansi(false).with_writer(writer)),
                Some(guard),
            )
        }
        _ => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

// Process exit statuses
const EXIT_OK: u8 = 0;
const EXIT_FAILED: u8 = 1;
const EXIT_USAGE: u8 = 2;

fn exit_status(result: &Result<()>) -> u8 {
    match result {
        Ok(()) => EXIT_OK,
        Err(e) => {
            error!(error = %format!("{:#}", e), "Command failed");
            eprintln!("Error: {:#}", e);
            EXIT_FAILED
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    // Dropped when main returns, which flushes the log file
    let _log_guard = init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = commands::Command::parse(&args) else {
        eprintln!("{}", USAGE);
        return ExitCode::from(EXIT_USAGE);
    };

    // Ctrl+C cancels whatever request is in flight; nothing local is changed
    // by a cancelled command.
    let scope = CancelScope::new();
    let cancel = scope.signal();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupted, cancelling");
            scope.cancel();
        }
    });

    let result = commands::run(command, &cancel).await;
    ExitCode::from(exit_status(&result))
}
