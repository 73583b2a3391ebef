use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use oauth_docstore::TokenKey;

#[derive(Parser)]
#[command(name = "oauth-docstore")]
#[command(about = "Inspect and maintain OAuth client and token collections")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (defaults to ./oauth-docstore.toml when present)
    #[arg(short, long, global = true, env = "OAUTH_DOCSTORE_CONFIG")]
    pub config: Option<String>,

    /// Connection string (overrides config)
    #[arg(long, global = true, env = "OAUTH_DOCSTORE_URI")]
    pub uri: Option<String>,

    /// Database name (overrides config)
    #[arg(short, long, global = true)]
    pub database: Option<String>,

    /// Output format
    #[arg(short, long, global = true)]
    pub format: Option<OutputFormat>,

    /// Log filter when RUST_LOG is unset
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,
}

#[derive(Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Table,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage OAuth clients
    Client(ClientArgs),
    /// Inspect or revoke tokens
    Token(TokenArgs),
    /// Create the token collection indexes
    Indexes(IndexesArgs),
}

#[derive(clap::Args)]
pub struct ClientArgs {
    #[command(subcommand)]
    pub command: ClientCommands,
}

#[derive(Subcommand)]
pub enum ClientCommands {
    /// Insert a client document
    Set(ClientSetArgs),
    /// Show the client owned by a user
    Get {
        /// Owning user ID
        user_id: String,
    },
    /// Delete the client owned by a user
    Remove {
        /// Owning user ID
        user_id: String,
    },
}

#[derive(clap::Args)]
pub struct ClientSetArgs {
    /// Owning user ID (lookup key)
    #[arg(long)]
    pub user_id: String,
    /// Shared secret
    #[arg(long)]
    pub secret: String,
    /// Redirect domain
    #[arg(long)]
    pub domain: String,
}

#[derive(clap::Args)]
pub struct TokenArgs {
    #[command(subcommand)]
    pub command: TokenCommands,
}

#[derive(Subcommand)]
pub enum TokenCommands {
    /// Show a token
    Get(TokenKeyArgs),
    /// Delete a token through any of its keys
    Remove(TokenKeyArgs),
}

#[derive(clap::Args)]
#[group(required = true, multiple = false)]
pub struct TokenKeyArgs {
    /// Look up by access token
    #[arg(long)]
    pub access: Option<String>,
    /// Look up by authorization code
    #[arg(long)]
    pub code: Option<String>,
    /// Look up by refresh token
    #[arg(long)]
    pub refresh: Option<String>,
}

impl TokenKeyArgs {
    /// The selected key and its value.
    pub fn selected(&self) -> Option<(TokenKey, &str)> {
        self.access
            .as_deref()
            .map(|v| (TokenKey::Access, v))
            .or_else(|| self.code.as_deref().map(|v| (TokenKey::Code, v)))
            .or_else(|| self.refresh.as_deref().map(|v| (TokenKey::Refresh, v)))
    }
}

#[derive(clap::Args)]
pub struct IndexesArgs {
    /// TTL window applied to `expired_at` (e.g. "1h")
    #[arg(long, value_parser = humantime_serde::re::humantime::parse_duration, default_value = "1h")]
    pub ttl: Duration,
}
