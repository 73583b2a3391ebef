mod cli;
mod commands;
mod observability;
mod output;

use anyhow::{Context, Result};
use clap::Parser;
use oauth_docstore::StoreConfig;
use oauth_docstore::config::loader;
use oauth_docstore_mongo::MongoAuthStorage;

use cli::{ClientCommands, Cli, Commands, TokenCommands};
use output::print_error;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    observability::init_tracing_with_level(&cli.log_level);
    let format = cli.format.unwrap_or_default();

    let config = resolve_config(&cli)?;
    let storage = MongoAuthStorage::connect(config)
        .await
        .context("Failed to connect to MongoDB")?;

    match &cli.command {
        Commands::Client(args) => {
            let clients = storage.clients();
            match &args.command {
                ClientCommands::Set(set_args) => commands::client::set(&clients, set_args).await?,
                ClientCommands::Get { user_id } => {
                    commands::client::get(&clients, user_id, format).await?
                }
                ClientCommands::Remove { user_id } => {
                    commands::client::remove(&clients, user_id).await?
                }
            }
        }
        Commands::Token(args) => {
            let tokens = storage.tokens();
            match &args.command {
                TokenCommands::Get(keys) => commands::token::get(&tokens, keys, format).await?,
                TokenCommands::Remove(keys) => commands::token::remove(&tokens, keys).await?,
            }
        }
        Commands::Indexes(args) => commands::indexes::ensure(&storage, args.ttl).await?,
    }

    Ok(())
}

/// File and environment first, then command-line overrides.
fn resolve_config(cli: &Cli) -> Result<StoreConfig> {
    let mut config = loader::load_config(cli.config.as_deref()).context("Invalid configuration")?;
    if let Some(uri) = &cli.uri {
        config.uri = uri.clone();
    }
    if let Some(database) = &cli.database {
        config = config.with_database(database);
    }
    config.validate().context("Invalid configuration")?;
    Ok(config)
}
