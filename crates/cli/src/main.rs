//! Folio CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! folio-cli migrate
//!
//! # Create an admin account (a password is generated when omitted)
//! folio-cli admin create -u jane
//!
//! # Reset an admin password
//! folio-cli admin set-password -u jane -p 'new long password'
//!
//! # Delete expired sessions
//! folio-cli sessions prune
//! ```
//!
//! All commands read `DATABASE_URL` (optionally from `.env`).

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "folio-cli")]
#[command(author, version, about = "Folio CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage admin accounts
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Manage stored sessions
    Sessions {
        #[command(subcommand)]
        action: SessionsAction,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a new admin account
    Create {
        /// Login name (case-sensitive)
        #[arg(short, long)]
        username: String,

        /// Password; a random one is generated and printed when omitted
        #[arg(short, long, env = "ADMIN_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Replace an admin's password
    SetPassword {
        /// Login name (case-sensitive)
        #[arg(short, long)]
        username: String,

        /// New password; a random one is generated and printed when omitted
        #[arg(short, long, env = "ADMIN_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
}

#[derive(Subcommand)]
enum SessionsAction {
    /// Delete expired sessions
    Prune,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CliError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Admin { action } => match action {
            AdminAction::Create { username, password } => {
                commands::admin::create(&username, password).await?;
            }
            AdminAction::SetPassword { username, password } => {
                commands::admin::set_password(&username, password).await?;
            }
        },
        Commands::Sessions { action } => match action {
            SessionsAction::Prune => {
                commands::sessions::prune().await?;
            }
        },
    }
    Ok(())
}
