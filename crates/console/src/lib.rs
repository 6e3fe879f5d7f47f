//! `crm` command-line front end.
//!
//! Each invocation builds an [`AppContext`] over the file-backed storage,
//! runs one command and exits. Credential and selection persist between
//! invocations through that storage.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{anyhow, bail};
use clap::{Parser, Subcommand};
use configs::AppConfig;
use models::{AssociationPatch, LoginInput};
use service::auth::AuthError;
use service::AppContext;
use tracing::{debug, info};

mod render;

/// Fallback for `login` when `--password` is omitted.
pub const PASSWORD_ENV: &str = "CRM_PASSWORD";

#[derive(Debug, Parser)]
#[command(name = "crm")]
#[command(about = "Browse CRM contacts and deals, and link them together")]
pub struct Cli {
    /// TOML config file (defaults to $CONFIG_PATH, then crm.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub json_logs: bool,
    /// Print results as JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Log in with email and password
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: Option<String>,
    },
    /// Forget the stored access token
    Logout,
    /// Print the URL that starts an OAuth login in the browser
    OauthUrl {
        #[arg(long, default_value = "google")]
        provider: String,
    },
    /// List contacts, optionally filtered by name or email
    Contacts {
        #[arg(long)]
        search: Option<String>,
    },
    /// List deals, optionally filtered by name or id
    Deals {
        #[arg(long)]
        search: Option<String>,
    },
    /// Update the working selection; omitted fields keep their value
    Select {
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        deal: Option<String>,
    },
    /// Show the working selection
    Selection,
    /// Clear the working selection
    Reset,
    /// Link the selected contact and deal on the server
    Link,
    /// List links stored on the server
    Links,
}

pub fn parse_args() -> Cli {
    Cli::parse()
}

pub fn load_config(cli: &Cli) -> anyhow::Result<AppConfig> {
    match &cli.config {
        Some(path) => AppConfig::load_from_path_and_validate(path),
        None => AppConfig::load_and_validate(),
    }
}

/// Load config, open storage and run the parsed command against stdout.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let cfg = load_config(&cli)?;
    debug!(base_url = %cfg.api.base_url, data_dir = %cfg.storage.data_dir.display(), "config loaded");
    let ctx = AppContext::bootstrap(&cfg).await?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    execute(&ctx, cli.command, cli.json, &mut out).await
}

pub async fn execute(ctx: &AppContext, command: Commands, json: bool, out: &mut impl Write) -> anyhow::Result<()> {
    match command {
        Commands::Login { email, password } => {
            let password = password
                .or_else(|| std::env::var(PASSWORD_ENV).ok())
                .ok_or_else(|| anyhow!("no password given; pass --password or set {PASSWORD_ENV}"))?;
            ctx.auth.login(LoginInput::new(email.clone(), password)).await.map_err(coded)?;
            info!(%email, "logged in");
            writeln!(out, "logged in as {email}")?;
        }
        Commands::Logout => {
            ctx.logout().await.map_err(coded)?;
            writeln!(out, "logged out")?;
        }
        Commands::OauthUrl { provider } => {
            writeln!(out, "{}", ctx.auth.oauth_url(&provider))?;
        }
        Commands::Contacts { search } => {
            let contacts = ctx.crm.contacts(search.as_deref()).await?;
            render::list(out, &contacts, json, render::contact_line)?;
        }
        Commands::Deals { search } => {
            let deals = ctx.crm.deals(search.as_deref()).await?;
            render::list(out, &deals, json, render::deal_line)?;
        }
        Commands::Select { email, deal } => {
            if email.is_none() && deal.is_none() {
                bail!("nothing to select; pass --email and/or --deal");
            }
            let selection = ctx.associations.set_contact_deal(AssociationPatch { email, deal_id: deal }).await;
            render::one(out, &selection, json, render::association_line)?;
        }
        Commands::Selection => {
            render::one(out, &ctx.associations.current(), json, render::association_line)?;
        }
        Commands::Reset => {
            ctx.associations.reset_contact_deal().await;
            render::one(out, &ctx.associations.current(), json, render::association_line)?;
        }
        Commands::Link => {
            let id = ctx.crm.link_selection(&ctx.associations).await?;
            writeln!(out, "created link #{id}")?;
        }
        Commands::Links => {
            let links = ctx.crm.links().await?;
            render::list(out, &links, json, render::link_line)?;
        }
    }
    Ok(())
}

fn coded(e: AuthError) -> anyhow::Error {
    anyhow!("[{}] {e}", e.code())
}
