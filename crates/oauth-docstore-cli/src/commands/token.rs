use anyhow::{Result, bail};
use colored::Colorize;
use oauth_docstore::TokenStore;

use crate::cli::{OutputFormat, TokenKeyArgs};
use crate::output::{print_success, print_value};

pub async fn get(store: &impl TokenStore, keys: &TokenKeyArgs, format: OutputFormat) -> Result<()> {
    let Some((key, value)) = keys.selected() else {
        bail!("One of --access, --code or --refresh is required");
    };
    let token = store.get_by(key, value).await?;
    print_value(&serde_json::to_value(&token)?, format);
    Ok(())
}

pub async fn remove(store: &impl TokenStore, keys: &TokenKeyArgs) -> Result<()> {
    let Some((key, value)) = keys.selected() else {
        bail!("One of --access, --code or --refresh is required");
    };
    store.remove_by(key, value).await?;
    print_success(&format!("Removed token by {}", key.field().cyan()));
    Ok(())
}
