//! Command dispatch and execution handlers.
//!
//! Every invocation builds the same stack: configuration, the credential
//! file, an [`ApiClient`] and a [`SessionManager`]. Commands that need a
//! logged-in user restore the session first and refuse to run without one.

use std::io::{self, BufRead, IsTerminal, Read, Write};
use std::sync::Arc;
use std::time::Duration;

use adboard_client::{ApiClient, AuthEvent, CampaignQuery, CreateUserRequest, DateRange, User};
use adboard_common::AppDirs;
use adboard_login::{CredentialStore, FileCredentialStore, safe_format_key};
use adboard_session::{SessionManager, SessionStatus};
use anyhow::{Context, Result, bail};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::debug;

use super::args::*;
use crate::config::Config;
use crate::render;
use crate::styled_output::{print_info, print_success, print_warning};

/// How long to wait for the expiry listener after a failed refresh.
const EXPIRY_SETTLE_TIMEOUT: Duration = Duration::from_secs(2);

/// Dispatch a CLI command to its handler.
pub async fn dispatch_command(cli: Cli) -> Result<()> {
    let dirs = AppDirs::new().context("Could not determine the home directory")?;
    let config = Config::load(dirs, cli.config_overrides())?;
    config
        .dirs
        .ensure_dirs()
        .with_context(|| format!("Failed to create {}", config.dirs.home.display()))?;

    let store: Arc<dyn CredentialStore> =
        Arc::new(FileCredentialStore::new(config.credentials_file()));
    let client = ApiClient::new(config.client_config(), store)?;
    let session = SessionManager::new(client);
    let _listener = session.spawn_expiry_listener();
    let events = session.client().subscribe();

    let result = run_command(cli.command, &session, &config).await;
    report_expiry(&session, events).await;
    result
}

/// Execute one command against an already built session.
pub async fn run_command(
    command: Commands,
    session: &SessionManager,
    config: &Config,
) -> Result<()> {
    match command {
        Commands::Login(args) => handle_login(session, args).await,
        Commands::Logout => handle_logout(session).await,
        Commands::Register(args) => handle_register(session, args).await,
        Commands::Whoami(output) => handle_whoami(session, output).await,
        Commands::Status(output) => handle_status(session, config, output).await,
        Commands::Campaigns(command) => handle_campaigns(session, command).await,
        Commands::Users(command) => handle_users(session, command).await,
    }
}

/// Print the expiry notice when a refresh failed during the command.
async fn report_expiry(session: &SessionManager, mut events: broadcast::Receiver<AuthEvent>) {
    if events.try_recv().is_err() {
        return;
    }

    let mut state = session.subscribe();
    let settled = tokio::time::timeout(
        EXPIRY_SETTLE_TIMEOUT,
        state.wait_for(|state| state.session_expired()),
    )
    .await;
    if settled.is_err() {
        debug!("Expiry listener did not settle in time");
    }

    print_warning("Session expired, log in again with 'adboard login <email>'.");
    session.acknowledge_expired();
}

// ============================================================================
// AUTH
// ============================================================================

async fn handle_login(session: &SessionManager, args: LoginArgs) -> Result<()> {
    let password = read_password(&args.password)?;
    let user = session.login(args.email.trim(), &password).await?;
    print_success(&format!("Logged in as {} ({})", user.email, user.role));
    Ok(())
}

async fn handle_logout(session: &SessionManager) -> Result<()> {
    let credentials = session.client().credentials();
    if !credentials.has_access_token() && credentials.refresh_token().is_none() {
        print_info("Not logged in.");
        return Ok(());
    }
    session.logout().await;
    print_success("Logged out.");
    Ok(())
}

async fn handle_register(session: &SessionManager, args: RegisterArgs) -> Result<()> {
    let password = read_password(&args.password)?;
    let user = session
        .register(args.email.trim(), &password, args.company_name.as_deref())
        .await?;
    print_success(&format!("Account created. Logged in as {}", user.email));
    Ok(())
}

async fn handle_whoami(session: &SessionManager, output: OutputArgs) -> Result<()> {
    let user = require_user(session).await?;
    if output.json {
        print_json(&user)
    } else {
        println!("{}", render::format_user(&user));
        Ok(())
    }
}

async fn handle_status(
    session: &SessionManager,
    config: &Config,
    output: OutputArgs,
) -> Result<()> {
    session.initialize().await;
    let state = session.state();
    let token = session
        .client()
        .credentials()
        .access_token()
        .map(|token| safe_format_key(token.expose_secret()));

    if output.json {
        #[derive(Serialize)]
        struct StatusJson<'a> {
            api_url: &'a str,
            timeout_secs: u64,
            status: SessionStatus,
            user: Option<&'a User>,
            token: Option<&'a str>,
        }
        return print_json(&StatusJson {
            api_url: &config.api_url,
            timeout_secs: config.timeout.as_secs(),
            status: state.status,
            user: state.user.as_ref(),
            token: token.as_deref(),
        });
    }

    println!("{}", render::format_status(&state, config, token.as_deref()));
    Ok(())
}

/// Restore the session and return the logged-in user.
async fn require_user(session: &SessionManager) -> Result<User> {
    session.initialize().await;
    match session.state().user {
        Some(user) => Ok(user),
        None => bail!("Not logged in. Run 'adboard login <email>' first."),
    }
}

// ============================================================================
// CAMPAIGNS
// ============================================================================

async fn handle_campaigns(session: &SessionManager, command: CampaignsCommand) -> Result<()> {
    require_user(session).await?;
    let client = session.client();

    match command {
        CampaignsCommand::List(args) => {
            let query = build_query(&args)?;
            let page = client.list_campaigns(&query).await?;
            if args.output.json {
                return print_json(&page);
            }
            println!("{}", render::format_campaign_page(&page, &query));
        }
        CampaignsCommand::Show(args) => {
            let detail = client.campaign_detail(&args.name).await?;
            if args.output.json {
                return print_json(&detail);
            }
            println!("{}", render::format_campaign_detail(&detail, args.rows));
        }
        CampaignsCommand::Search(args) => {
            let range = DateRange::parse(&args.from, &args.to)?;
            let campaigns = client.search_campaigns_by_date(&range).await?;
            if args.output.json {
                return print_json(&campaigns);
            }
            println!("{}", render::format_campaign_list(&campaigns));
        }
    }
    Ok(())
}

/// Translate list flags into a query. Pages are 1-based on the command line.
fn build_query(args: &ListArgs) -> Result<CampaignQuery> {
    let mut query = CampaignQuery::new()
        .page(args.page.saturating_sub(1))
        .page_size(args.page_size)?;
    if let Some(tipo) = &args.tipo_campania {
        query = query.tipo_campania(tipo.as_str());
    }
    if let (Some(from), Some(to)) = (&args.from, &args.to) {
        query = query.date_range(DateRange::parse(from, to)?);
    }
    Ok(query)
}

// ============================================================================
// USERS
// ============================================================================

async fn handle_users(session: &SessionManager, command: UsersCommand) -> Result<()> {
    let current = require_user(session).await?;

    match command {
        UsersCommand::Create(args) => {
            if !current.role.is_owner() {
                bail!(
                    "Only company owners can create users (you are {}).",
                    current.role
                );
            }
            let password = read_password(&args.password)?;
            let request = CreateUserRequest {
                email: args.email.trim().to_string(),
                password: password.expose_secret().to_string(),
                role: args.role.into(),
            };
            let created = session.client().create_user(&request).await?;
            print_success(&format!(
                "Created {} ({}) with ID {}",
                created.email, created.role, created.id
            ));
        }
    }
    Ok(())
}

// ============================================================================
// HELPERS
// ============================================================================

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{json}");
    Ok(())
}

/// Resolve the password from the flag or environment, piped stdin, or an
/// interactive prompt.
fn read_password(args: &PasswordArgs) -> Result<SecretString> {
    if let Some(password) = &args.password {
        return normalize_password(password.clone());
    }

    let mut stdin = io::stdin();
    let raw = if args.password_stdin || !stdin.is_terminal() {
        let mut buffer = String::new();
        stdin
            .read_to_string(&mut buffer)
            .context("Failed to read password from stdin")?;
        buffer
    } else {
        eprint!("Password: ");
        io::stderr().flush()?;
        let mut line = String::new();
        stdin
            .lock()
            .read_line(&mut line)
            .context("Failed to read password")?;
        line
    };
    normalize_password(raw)
}

fn normalize_password(raw: String) -> Result<SecretString> {
    let password = raw.trim_end_matches(['\r', '\n']);
    if password.is_empty() {
        bail!("No password provided.");
    }
    Ok(SecretString::from(password.to_string()))
}
