//! Emporium CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run storefront database migrations
//! emp-cli migrate storefront
//!
//! # Run admin database migrations
//! emp-cli migrate admin
//!
//! # Run all database migrations
//! emp-cli migrate all
//!
//! # Create an admin account (or grant the role to an existing one)
//! emp-cli admin create -e admin@example.com -p 'long password' -n "Admin Name"
//!
//! # Grant the Admin role to an existing account
//! emp-cli admin promote -e someone@example.com
//!
//! # Insert demo categories, products and stores
//! emp-cli seed catalog
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `admin` - Create admins and grant the Admin role
//! - `seed` - Insert demo data

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "emp-cli")]
#[command(author, version, about = "Emporium CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate {
        #[command(subcommand)]
        target: MigrateTarget,
    },
    /// Manage admin accounts
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Insert demo data
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
}

#[derive(Subcommand)]
enum MigrateTarget {
    /// Run storefront database migrations
    Storefront,
    /// Run admin database migrations
    Admin,
    /// Run all database migrations
    All,
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create an admin account, or grant the role if the account exists
    Create {
        /// Admin email address
        #[arg(short, long)]
        email: String,

        /// Password for a new account
        #[arg(short, long)]
        password: String,

        /// Full name for a new account
        #[arg(short, long)]
        name: Option<String>,
    },
    /// Grant the Admin role to an existing account
    Promote {
        /// Account email address
        #[arg(short, long)]
        email: String,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Demo categories, products and store locations
    Catalog,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate { target } => match target {
            MigrateTarget::Storefront => commands::migrate::storefront().await?,
            MigrateTarget::Admin => commands::migrate::admin().await?,
            MigrateTarget::All => {
                commands::migrate::storefront().await?;
                commands::migrate::admin().await?;
            }
        },
        Commands::Admin { action } => match action {
            AdminAction::Create {
                email,
                password,
                name,
            } => {
                commands::admin::create(&email, &password, name.as_deref()).await?;
            }
            AdminAction::Promote { email } => commands::admin::promote(&email).await?,
        },
        Commands::Seed { target } => match target {
            SeedTarget::Catalog => commands::seed::catalog().await?,
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_admin_create() {
        let cli = Cli::try_parse_from([
            "emp-cli", "admin", "create", "-e", "a@emporium.mk", "-p", "secret123",
        ]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::Admin {
                action: AdminAction::Create { name: None, .. }
            })
        ));
    }

    #[test]
    fn test_parse_migrate_all() {
        let cli = Cli::try_parse_from(["emp-cli", "migrate", "all"]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::Migrate {
                target: MigrateTarget::All
            })
        ));
    }

    #[test]
    fn test_admin_create_requires_password() {
        assert!(
            Cli::try_parse_from(["emp-cli", "admin", "create", "-e", "a@emporium.mk"]).is_err()
        );
    }
}
