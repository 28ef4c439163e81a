//! AssetLift CLI
//!
//! Command-line client for the AssetLift upload core.
//!
//! # Commands
//! - `id encode` - Convert an ACI to its external identifier
//! - `id decode` - Convert an external identifier back to its ACI
//! - `id hash` - Fingerprint a finished bundle file
//! - `session` - List, inspect or delete resumable upload sessions
//! - `monitor` - Show the current memory-driven upload strategy
//! - `config` - Show or initialize configuration
//!
//! # Configuration
//! Config file: ~/.assetlift/config.toml

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod config;
mod symbols;

use assetlift_storage::StorageConfig;
use commands::{id, monitor, session};

#[derive(Parser)]
#[command(name = "assetlift")]
#[command(about = "AssetLift bundle upload toolkit")]
#[command(version)]
struct Cli {
    /// Session database directory (overrides config file)
    #[arg(long, global = true, env = "ASSETLIFT_SESSION_DB")]
    db: Option<PathBuf>,

    /// Session key prefix (overrides config file)
    #[arg(long, global = true)]
    prefix: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Content identifier conversions
    Id {
        #[command(subcommand)]
        command: IdCommands,
    },

    /// Resumable upload sessions
    Session {
        #[command(subcommand)]
        command: SessionCommands,
    },

    /// Show the current upload buffer strategy
    Monitor {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show or initialize configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand)]
enum IdCommands {
    /// Encode an ACI (aci:1:sha256:<hex>)
    Encode { aci: String },

    /// Decode an external identifier
    Decode { id: String },

    /// Hash a file and print its ACI and identifier
    Hash { path: PathBuf },
}

#[derive(Subcommand)]
enum SessionCommands {
    /// List sessions
    List,

    /// Show one session
    Show {
        session_id: String,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete a session
    Delete { session_id: String },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Show config file path
    Path,

    /// Initialize config file with defaults
    Init {
        /// Overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    // Load configuration from ~/.assetlift/config.toml
    let cfg = config::load_config();

    match cli.command {
        Commands::Id { command } => match command {
            IdCommands::Encode { aci } => id::encode(&aci)?,
            IdCommands::Decode { id } => id::decode(&id)?,
            IdCommands::Hash { path } => id::hash(&path).await?,
        },

        Commands::Session { command } => {
            // CLI args override config file
            let storage = StorageConfig::new(cli.db.unwrap_or(cfg.storage.path))
                .with_prefix(cli.prefix.unwrap_or(cfg.storage.prefix));
            tracing::debug!(path = %storage.path.display(), prefix = %storage.prefix, "Opening session store");
            let store = storage.open_session_store().with_context(|| {
                format!("Failed to open session database at {}", storage.path.display())
            })?;

            match command {
                SessionCommands::List => session::list(&store).await?,
                SessionCommands::Show { session_id, json } => {
                    let config = session::ShowConfig { session_id, json };
                    session::show(&store, config).await?;
                }
                SessionCommands::Delete { session_id } => {
                    session::delete(&store, &session_id).await?;
                }
            }
        }

        Commands::Monitor { json } => {
            assetlift_monitor::metrics::init_metrics();
            let config = monitor::MonitorCommandConfig {
                monitor: cfg.monitor.with_env_overrides()?,
                json,
            };
            monitor::run(config).await?;
        }

        Commands::Config { command } => {
            handle_config_command(command, cfg)?;
        }
    }

    Ok(())
}

/// Handle config subcommands
fn handle_config_command(
    command: Option<ConfigCommands>,
    cfg: config::AssetLiftConfig,
) -> Result<()> {
    use console::style;

    match command {
        None | Some(ConfigCommands::Show) => {
            println!();
            println!("{}", style("AssetLift Configuration").bold().underlined());
            println!();
            println!("{}", style("[storage]").cyan());
            println!("  path = \"{}\"", cfg.storage.path.display());
            println!("  prefix = \"{}\"", cfg.storage.prefix);
            println!();
            println!("{}", style("[monitor]").cyan());
            println!("  full_min_bytes = {}", cfg.monitor.thresholds.full_min_bytes);
            println!(
                "  reduced_min_bytes = {}",
                cfg.monitor.thresholds.reduced_min_bytes
            );
            println!(
                "  minimal_min_bytes = {}",
                cfg.monitor.thresholds.minimal_min_bytes
            );
            println!("  record_metrics = {}", cfg.monitor.record_metrics);
            println!();

            if let Ok(path) = config::config_file_path() {
                println!("{} {}", style("Config file:").dim(), path.display());
                if !path.exists() {
                    println!(
                        "{} Run '{}' to create it",
                        style("(not created yet)").yellow(),
                        style("assetlift config init").green()
                    );
                }
            }
        }

        Some(ConfigCommands::Path) => {
            println!("{}", config::config_file_path()?.display());
        }

        Some(ConfigCommands::Init { force }) => {
            let path = config::config_file_path()?;
            if path.exists() && !force {
                println!(
                    "{} Config file already exists at {}",
                    style(symbols::WARN).yellow(),
                    path.display()
                );
                println!("Use --force to overwrite");
                return Ok(());
            }

            let path = config::save_config(&config::AssetLiftConfig::default())?;
            println!(
                "{} Config file created at {}",
                style(symbols::CHECK).green(),
                path.display()
            );
        }
    }

    Ok(())
}
