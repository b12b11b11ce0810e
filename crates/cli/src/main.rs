//! Phonebook CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! pb-cli migrate
//!
//! # Create a user
//! pb-cli user create -u mluukkai
//!
//! # Print a bearer token for an existing user
//! pb-cli token issue -u mluukkai
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `user create` - Create a user with an empty friends list
//! - `token issue` - Sign a token the same way `login` does

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "pb-cli")]
#[command(author, version, about = "Phonebook CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage users
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Manage bearer tokens
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a new user
    Create {
        /// Username (at least 3 characters)
        #[arg(short, long)]
        username: String,
    },
}

#[derive(Subcommand)]
enum TokenAction {
    /// Print a token for an existing user
    Issue {
        /// Username of the token's subject
        #[arg(short, long)]
        username: String,
    },
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

async fn run(cli: Cli) -> Result<(), commands::CliError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::User { action } => match action {
            UserAction::Create { username } => commands::user::create(&username).await?,
        },
        Commands::Token { action } => match action {
            TokenAction::Issue { username } => commands::token::issue(&username).await?,
        },
    }
    Ok(())
}
