//! `notekeeper` - CLI entry point
//!
//! Runs the HTTP service and offers a few configuration helpers.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};

use notekeeper::cli::{Cli, Command, ConfigCommand, ServeCommand};
use notekeeper::config::StorageBackend;
use notekeeper::{init_logging, server, Config, MemoryStore, NoteStore, Notes, SqliteStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    match cli.command {
        Command::Serve(serve_cmd) => handle_serve(load_config(cli.config)?, &serve_cmd).await,
        Command::Config(config_cmd) => handle_config(cli.config, config_cmd),
    }
}

fn load_config(path: Option<PathBuf>) -> anyhow::Result<Config> {
    Config::load_from(path).context("loading configuration")
}

async fn handle_serve(mut config: Config, cmd: &ServeCommand) -> anyhow::Result<()> {
    cmd.apply(&mut config);
    config.validate().context("invalid command-line overrides")?;

    let store: Arc<dyn NoteStore> = match config.storage.backend {
        StorageBackend::Sqlite => {
            let store = SqliteStore::new(config.database_path());
            // Keep serving if the database is down; reads degrade until it is back
            if let Err(e) = store.connect().await {
                warn!("Starting without a usable database: {}", e);
            }
            Arc::new(store)
        }
        StorageBackend::Memory => Arc::new(MemoryStore::new()),
    };

    info!("Using {} storage", config.storage.backend);
    server::serve(&config, Notes::new(store))
        .await
        .context("running HTTP server")
}

fn handle_config(config_path: Option<PathBuf>, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            let config = load_config(config_path)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Server]");
                println!("  Host:          {}", config.server.host);
                println!("  Port:          {}", config.server.port);
                println!("  Compression:   {}", config.server.compression);
                println!();
                println!("[Storage]");
                println!("  Backend:       {}", config.storage.backend);
                println!("  Database path: {}", config.database_path().display());
            }
        }
        ConfigCommand::Path => {
            let path = config_path.unwrap_or_else(Config::default_config_path);
            println!("{}", path.display());
        }
        ConfigCommand::Validate { file } => {
            let path = file
                .or(config_path)
                .unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            Config::load_file(&path)
                .with_context(|| format!("configuration error in {}", path.display()))?;
            println!("Configuration is valid.");
        }
    }
    Ok(())
}
