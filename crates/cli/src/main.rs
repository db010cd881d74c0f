//! Agora CLI - Database migrations and session-core management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run storefront database migrations
//! agora-cli migrate
//!
//! # Hash a password for a credential record
//! agora-cli hash-password < password.txt
//!
//! # Check a login (password from AGORA_PASSWORD or stdin)
//! agora-cli login --role admin --username TechAdmin1
//!
//! # Inspect and edit a customer's wishlist
//! agora-cli wishlist list --owner client1
//! agora-cli wishlist add --owner client1 --product 42
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `hash-password` - Print an Argon2id hash
//! - `login` - Validate credentials
//! - `wishlist` - List, add, remove or check wishlist entries

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use agora_core::{ProductId, Role};

mod commands;

#[derive(Parser)]
#[command(name = "agora-cli")]
#[command(author, version, about = "Agora CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run storefront database migrations
    Migrate,
    /// Hash a password with the configured Argon2id parameters
    HashPassword {
        /// Password to hash (read from stdin when omitted)
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Validate credentials against the admin or customer namespace
    Login {
        /// Namespace to check (`admin` or `client`)
        #[arg(short, long, default_value = "client")]
        role: Role,

        /// Login identifier
        #[arg(short, long)]
        username: String,

        /// Password (read from stdin when unset)
        #[arg(long, env = "AGORA_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Manage customer wishlists
    Wishlist {
        #[command(subcommand)]
        action: WishlistAction,
    },
}

#[derive(Subcommand)]
enum WishlistAction {
    /// List a customer's wishlist
    List {
        #[arg(short, long)]
        owner: String,
    },
    /// Add a product to a customer's wishlist
    Add {
        #[arg(short, long)]
        owner: String,
        #[arg(short, long)]
        product: i32,
    },
    /// Remove a product from a customer's wishlist
    Remove {
        #[arg(short, long)]
        owner: String,
        #[arg(short, long)]
        product: i32,
    },
    /// Check whether a product is on a customer's wishlist
    Check {
        #[arg(short, long)]
        owner: String,
        #[arg(short, long)]
        product: i32,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("agora_cli=info,agora_storefront=info")),
        )
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::storefront().await?,
        Commands::HashPassword { password } => {
            commands::password::hash(password)?;
        }
        Commands::Login {
            role,
            username,
            password,
        } => commands::login::check(role, &username, password).await?,
        Commands::Wishlist { action } => match action {
            WishlistAction::List { owner } => commands::wishlist::list(&owner).await?,
            WishlistAction::Add { owner, product } => {
                commands::wishlist::add(&owner, ProductId::new(product)).await?;
            }
            WishlistAction::Remove { owner, product } => {
                commands::wishlist::remove(&owner, ProductId::new(product)).await?;
            }
            WishlistAction::Check { owner, product } => {
                commands::wishlist::check(&owner, ProductId::new(product)).await?;
            }
        },
    }
    Ok(())
}
