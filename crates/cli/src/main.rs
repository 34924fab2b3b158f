//! Pocket Shop CLI - Terminal front end for the shopping flow.
//!
//! # Usage
//!
//! ```bash
//! # Interactive session: login, listing, cart, checkout
//! pocket-shop shop
//!
//! # Check a credential pair against the directory
//! pocket-shop login -e letrongthien@gmail.com -p 1
//!
//! # Total a JSON cart file
//! pocket-shop total cart.json
//! ```
//!
//! # Commands
//!
//! - `shop` - Run an interactive shopping session
//! - `login` - Check credentials without starting a session
//! - `total` - Print the total of a saved cart

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod catalog;
mod commands;
mod config;
mod terminal;

use config::{LogFormat, ShopConfig};

#[derive(Parser)]
#[command(name = "pocket-shop")]
#[command(author, version, about = "Pocket Shop terminal storefront")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an interactive shopping session
    Shop,
    /// Check an email/password pair
    Login {
        /// Account email address
        #[arg(short, long)]
        email: String,

        /// Account password
        #[arg(short, long)]
        password: String,
    },
    /// Print the total of a JSON cart file
    Total {
        /// Path to a JSON array of cart items
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match ShopConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing(LogFormat::default());
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(2);
        }
    };

    init_tracing(config.log_format);

    let result: Result<(), Box<dyn std::error::Error>> = run(cli, config).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

/// Logs go to stderr so they never interleave with screen output.
fn init_tracing(format: LogFormat) {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "pocket_shop_cli=info,pocket_shop_core=info".into());

    let is_json = format == LogFormat::Json;
    let json_layer = is_json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_writer(std::io::stderr)
    });
    let text_layer =
        (!is_json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .init();
}

async fn run(cli: Cli, config: ShopConfig) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Shop => commands::shop::run(&config).await?,
        Commands::Login { email, password } => {
            commands::login::check(&config, &email, password).await?;
        }
        Commands::Total { file } => commands::total::print_total(&file).await?,
    }
    Ok(())
}
