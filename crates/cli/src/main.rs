//! Film Gaming Seller CLI - database migrations and store management.
//!
//! # Usage
//!
//! ```bash
//! # Apply database migrations
//! fgs-cli migrate
//!
//! # Create an admin account (password from --password or FGS_ADMIN_PASSWORD)
//! fgs-cli admin create -u owner -e owner@example.com -r super_admin
//!
//! # Load the starter catalog
//! fgs-cli seed catalog crates/cli/catalog/products.yaml
//! ```
//!
//! All commands read `FGS_DATABASE_URL` (falling back to `DATABASE_URL`).

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use secrecy::SecretString;

mod commands;

#[derive(Parser)]
#[command(name = "fgs-cli")]
#[command(author, version, about = "Film Gaming Seller CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply database migrations
    Migrate,
    /// Manage admin users
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Seed the database
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a new admin user
    Create {
        /// Login name
        #[arg(short, long)]
        username: String,

        /// Contact email address
        #[arg(short, long)]
        email: Option<String>,

        /// Admin role (`super_admin`, `admin`, `viewer`)
        #[arg(short, long, default_value = "admin")]
        role: String,

        /// Password (prefer the `FGS_ADMIN_PASSWORD` environment variable)
        #[arg(long, env = "FGS_ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Insert products from a YAML catalog, skipping names that exist
    Catalog {
        /// Path to the YAML catalog
        file: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let database_url = fgs_server::config::database_url_from_env();

    match cli.command {
        Commands::Migrate => commands::migrate::run(&database_url).await?,
        Commands::Admin { action } => match action {
            AdminAction::Create {
                username,
                email,
                role,
                password,
            } => {
                let password = SecretString::from(password);
                commands::admin::create_user(
                    &database_url,
                    &username,
                    email.as_deref(),
                    &role,
                    &password,
                )
                .await?;
            }
        },
        Commands::Seed { target } => match target {
            SeedTarget::Catalog { file } => {
                commands::seed::catalog(&database_url, &file).await?;
            }
        },
    }
    Ok(())
}
