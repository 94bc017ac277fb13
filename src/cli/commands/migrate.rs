//! Migrate command handler

use crate::config::Config;
use crate::db::Catalog;
use crate::domain::Strategy;

/// Connecting a store applies its schema, so connecting all three is the
/// whole job.
pub async fn cmd_migrate(config: &Config) -> anyhow::Result<()> {
    let catalog = Catalog::connect(&config.database).await?;
    catalog.ping().await?;

    for strategy in Strategy::ALL {
        println!(
            "{:<18} {}",
            strategy.as_str(),
            config.database.url(strategy)
        );
    }
    println!("Schemas are up to date.");
    Ok(())
}
