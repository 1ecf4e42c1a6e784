//! Command-line argument definitions.

use clap::{Args, Parser, Subcommand};

use adboard_client::AssignableRole;

use super::styles::{AFTER_HELP, get_styles};
use crate::config::ConfigToml;

/// Log level for CLI output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogLevel {
    /// Only show errors
    Error,
    /// Show warnings and errors (default)
    #[default]
    Warn,
    /// Show informational messages, warnings, and errors
    Info,
    /// Show debug messages and above
    Debug,
    /// Show all messages including trace-level details
    Trace,
}

impl LogLevel {
    /// Convert to tracing filter string.
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }

    /// Parse from string (case-insensitive).
    pub fn from_str_loose(s: &str) -> Option<LogLevel> {
        match s.trim().to_lowercase().as_str() {
            "error" => Some(LogLevel::Error),
            "warn" | "warning" => Some(LogLevel::Warn),
            "info" => Some(LogLevel::Info),
            "debug" => Some(LogLevel::Debug),
            "trace" => Some(LogLevel::Trace),
            _ => None,
        }
    }
}

/// adboard - campaign analytics from the terminal
#[derive(Debug, Parser)]
#[command(name = "adboard")]
#[command(author, version)]
#[command(about = "adboard - campaign analytics from the terminal", long_about = None)]
#[command(styles = get_styles(), after_help = AFTER_HELP)]
pub struct Cli {
    /// API base URL (overrides config and ADBOARD_API_URL)
    #[arg(long = "api-url", global = true, value_name = "URL")]
    pub api_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long = "timeout", global = true, value_name = "SECS")]
    pub timeout_secs: Option<u64>,

    /// Enable verbose output (same as --log-level debug)
    #[arg(long = "verbose", short = 'v', global = true)]
    pub verbose: bool,

    /// Enable trace-level logging
    #[arg(long = "trace", global = true)]
    pub trace: bool,

    /// Log verbosity
    #[arg(long = "log-level", global = true, value_enum, default_value_t = LogLevel::Warn)]
    pub log_level: LogLevel,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Configuration values given on the command line.
    pub fn config_overrides(&self) -> ConfigToml {
        ConfigToml {
            api_url: self.api_url.clone(),
            timeout_secs: self.timeout_secs,
        }
    }

    /// Effective log level: `--trace`, then `--verbose`, then
    /// `ADBOARD_LOG_LEVEL`, then `--log-level`.
    pub fn effective_log_level(&self, env_level: Option<&str>) -> LogLevel {
        if self.trace {
            LogLevel::Trace
        } else if self.verbose {
            LogLevel::Debug
        } else if let Some(level) = env_level.and_then(LogLevel::from_str_loose) {
            level
        } else {
            self.log_level
        }
    }
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Log in with email and password
    Login(LoginArgs),

    /// Log out and revoke the refresh credential
    Logout,

    /// Create an account and log in
    Register(RegisterArgs),

    /// Show the logged-in user
    Whoami(OutputArgs),

    /// Show session state and configuration
    Status(OutputArgs),

    /// Browse campaigns
    #[command(subcommand)]
    Campaigns(CampaignsCommand),

    /// Manage users of your company (owners only)
    #[command(subcommand)]
    Users(UsersCommand),
}

/// Password source shared by login and register.
#[derive(Debug, Clone, Args)]
pub struct PasswordArgs {
    /// Password (prefer ADBOARD_PASSWORD or --password-stdin)
    #[arg(long = "password", env = "ADBOARD_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Read the password from stdin
    #[arg(long = "password-stdin", conflicts_with = "password")]
    pub password_stdin: bool,
}

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Account email
    pub email: String,

    #[command(flatten)]
    pub password: PasswordArgs,
}

#[derive(Debug, Args)]
pub struct RegisterArgs {
    /// Account email
    pub email: String,

    /// Company to create for this account
    #[arg(long = "company")]
    pub company_name: Option<String>,

    #[command(flatten)]
    pub password: PasswordArgs,
}

#[derive(Debug, Clone, Copy, Args)]
pub struct OutputArgs {
    /// Print JSON instead of text
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Debug, Subcommand)]
pub enum CampaignsCommand {
    /// List campaigns page by page
    List(ListArgs),

    /// Show a campaign with periods, sites and audience breakdowns
    Show(ShowArgs),

    /// Find campaigns within a date range
    Search(SearchArgs),
}

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Page number, starting at 1
    #[arg(long = "page", default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub page: u32,

    /// Campaigns per page (1-100)
    #[arg(long = "page-size", default_value_t = 5)]
    pub page_size: u32,

    /// Filter by campaign type
    #[arg(long = "type", value_name = "TIPO")]
    pub tipo_campania: Option<String>,

    /// Only campaigns starting on or after this date (YYYY-MM-DD)
    #[arg(long = "from", requires = "to")]
    pub from: Option<String>,

    /// Only campaigns ending on or before this date (YYYY-MM-DD)
    #[arg(long = "to", requires = "from")]
    pub to: Option<String>,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Campaign name
    pub name: String,

    /// Number of rows shown in the period and site tables
    #[arg(long = "rows", default_value_t = 20)]
    pub rows: usize,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Start date (YYYY-MM-DD)
    pub from: String,

    /// End date (YYYY-MM-DD)
    pub to: String,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Subcommand)]
pub enum UsersCommand {
    /// Create an admin or viewer in your company
    Create(CreateUserArgs),
}

#[derive(Debug, Args)]
pub struct CreateUserArgs {
    /// Email of the new user
    pub email: String,

    /// Role to grant
    #[arg(long = "role", value_enum, default_value_t = RoleArg::Viewer)]
    pub role: RoleArg,

    #[command(flatten)]
    pub password: PasswordArgs,
}

/// Roles that can be granted from the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum RoleArg {
    Admin,
    Viewer,
}

impl From<RoleArg> for AssignableRole {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Admin => AssignableRole::Admin,
            RoleArg::Viewer => AssignableRole::Viewer,
        }
    }
}
