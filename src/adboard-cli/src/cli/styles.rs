//! CLI styling and formatting.
//!
//! Defines ANSI colors and formatting for the CLI help output.

use clap::builder::styling::{AnsiColor, Effects, Styles};

/// Help theme with cyan headers and green literals.
pub fn get_styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Yellow.on_default())
        .error(AnsiColor::Red.on_default() | Effects::BOLD)
        .valid(AnsiColor::Cyan.on_default())
        .invalid(AnsiColor::Yellow.on_default())
}

/// After-help section with quick start, environment variables and paths.
pub const AFTER_HELP: &str = color_print::cstr!(
    r#"<cyan,bold>QUICK START</>
    <green,bold>adboard login</> <dim>you@company.mx</>          Log in (password from prompt or ADBOARD_PASSWORD)
    <green,bold>adboard campaigns list</>                 First page of campaigns
    <green,bold>adboard campaigns show</> <dim>"Verano 2024"</>    Campaign detail with breakdowns
    <green,bold>adboard campaigns search</> <dim>2024-01-01 2024-03-31</>

<cyan,bold>ENVIRONMENT VARIABLES</>
    <yellow>ADBOARD_HOME</>          Override config directory (default: ~/.adboard)
    <yellow>ADBOARD_API_URL</>       API base URL (default: http://localhost:8000)
    <yellow>ADBOARD_TIMEOUT_SECS</>  Request timeout in seconds (default: 5)
    <yellow>ADBOARD_PASSWORD</>      Password for login, register and users create
    <yellow>ADBOARD_LOG_LEVEL</>     Log verbosity (error, warn, info, debug, trace)
    <yellow>NO_COLOR</>              Disable colored output

<cyan,bold>PATHS</>
    <dim>Config</>       ~/.adboard/config.toml
    <dim>Credentials</>  ~/.adboard/credentials.json"#
);
