//! Rocket Cart CLI - Inspect and modify the persisted cart.
//!
//! # Usage
//!
//! ```bash
//! # Show cart contents and subtotal
//! rcart list
//!
//! # Add one unit of product 3 (fetched from the catalog if new)
//! rcart add 3
//!
//! # Set product 3 to four units
//! rcart update 3 4
//!
//! # Remove product 3
//! rcart remove 3
//! ```
//!
//! Configuration comes from the environment (see `rocket_cart::config`).
//! `list` only needs the snapshot settings; the other commands also need
//! `CART_API_URL`.
//! Rejected operations are logged as warnings and exit with status 1.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use rocket_cart_core::ProductId;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "rcart")]
#[command(author, version, about = "Rocket Cart command-line tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the cart
    List,
    /// Add one unit of a product
    Add {
        /// Product ID
        id: ProductId,
    },
    /// Remove a product from the cart
    Remove {
        /// Product ID
        id: ProductId,
    },
    /// Set the amount of a product already in the cart
    Update {
        /// Product ID
        id: ProductId,

        /// New amount (must be between 1 and the available stock)
        #[arg(allow_negative_numbers = true)]
        amount: i64,
    },
}

#[tokio::main]
async fn main() {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "rocket_cart=info,rocket_cart_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    use commands::cart::{Session, list_saved};

    match cli.command {
        Commands::List => list_saved().await?,
        Commands::Add { id } => Session::open().await?.add(id).await?,
        Commands::Remove { id } => Session::open().await?.remove(id).await?,
        Commands::Update { id, amount } => Session::open().await?.update(id, amount).await?,
    }
    Ok(())
}
