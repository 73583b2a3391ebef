use anyhow::{Context, Result};
use colored::Colorize;
use oauth_docstore::{ClientInfo, ClientStore};

use crate::cli::{ClientSetArgs, OutputFormat};
use crate::output::{print_success, print_value};

pub async fn set(store: &impl ClientStore, args: &ClientSetArgs) -> Result<()> {
    let client = ClientInfo::new(&args.user_id, &args.secret, &args.domain);
    store
        .set(&client)
        .await
        .with_context(|| format!("Failed to store client for user {}", args.user_id))?;
    print_success(&format!("Stored client for user {}", args.user_id.cyan()));
    Ok(())
}

pub async fn get(store: &impl ClientStore, user_id: &str, format: OutputFormat) -> Result<()> {
    let client = store.get_by_id(user_id).await?;
    print_value(&serde_json::to_value(&client)?, format);
    Ok(())
}

pub async fn remove(store: &impl ClientStore, user_id: &str) -> Result<()> {
    store.remove_by_id(user_id).await?;
    print_success(&format!("Removed client for user {}", user_id.cyan()));
    Ok(())
}
