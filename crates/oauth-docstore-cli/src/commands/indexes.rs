use std::time::Duration;

use anyhow::Result;
use colored::Colorize;
use oauth_docstore_mongo::MongoAuthStorage;

use crate::output::print_success;

pub async fn ensure(storage: &MongoAuthStorage, ttl: Duration) -> Result<()> {
    storage.ensure_indexes(ttl).await?;
    print_success(&format!(
        "Indexes ready on {} (ttl {}s)",
        storage.config().token_collection.cyan(),
        ttl.as_secs()
    ));
    Ok(())
}
