//! Event Blog CLI - Collection provisioning and connectivity checks.
//!
//! # Usage
//!
//! ```bash
//! # Create every collection and install its indexes
//! event-blog-cli provision
//!
//! # Provision a single collection
//! event-blog-cli provision --collection users
//!
//! # Connect, ping, and fail if any collection is missing
//! event-blog-cli check
//! ```
//!
//! # Commands
//!
//! - `provision` - Create collections and unique indexes ahead of first use
//! - `check` - Verify connectivity without changing anything; exits 1 if a
//!   collection is missing
//!
//! Both read `EVENT_BLOG_DATABASE_URL` (or `DATABASE_URL`) and
//! `EVENT_BLOG_DATABASE_NAME` like the server does.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use clap::{Parser, Subcommand};
use event_blog_api::db::ConnectionSupervisor;

mod commands;

use commands::Target;

#[derive(Parser)]
#[command(name = "event-blog-cli")]
#[command(author, version, about = "Event Blog CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create collections and install their unique indexes
    Provision {
        /// Collection to provision
        #[arg(short, long, value_enum, default_value_t = Target::All)]
        collection: Target,
    },
    /// Connect to the database and report which collections exist
    Check,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let supervisor = Arc::new(ConnectionSupervisor::from_env(
        commands::postgres_connector(),
    ));
    match cli.command {
        Commands::Provision { collection } => {
            commands::provision::run(supervisor, collection).await?;
        }
        Commands::Check => {
            commands::check::run(&supervisor).await?;
        }
    }
    Ok(())
}
