//! adboard CLI - Main entry point.
//!
//! Parses arguments, sets up logging on stderr and dispatches the command.
//! Errors are printed as a single status line with exit code 1.

use clap::Parser;

use adboard_cli::cli::{Cli, dispatch_command};
use adboard_cli::styled_output::print_error;

/// Environment variable selecting the log level.
const LOG_LEVEL_ENV: &str = "ADBOARD_LOG_LEVEL";

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let env_level = std::env::var(LOG_LEVEL_ENV).ok();
    let log_level = cli.effective_log_level(env_level.as_deref());
    let filter_str = if std::env::var("RUST_LOG").is_ok() {
        format!(
            "error,adboard_cli={level},adboard_client={level},adboard_session={level},adboard_login={level}",
            level = log_level.as_filter_str()
        )
    } else {
        log_level.as_filter_str().to_string()
    };
    tracing_subscriber::fmt()
        .with_env_filter(&filter_str)
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = dispatch_command(cli).await {
        print_error(&format!("{err:#}"));
        std::process::exit(1);
    }
}
