//! Catalog bootstrap commands: tags and ingredients have no write API.

use crate::config::Config;
use crate::db::Store;
use crate::services::CatalogService;

pub async fn cmd_add_ingredient(config: &Config, name: &str, unit: &str) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;
    let catalog = CatalogService::new(store);

    let ingredient = catalog.create_ingredient(name, unit).await?;
    println!(
        "✓ Added ingredient #{}: {} ({})",
        ingredient.id, ingredient.name, ingredient.measurement_unit
    );

    Ok(())
}

pub async fn cmd_add_tag(
    config: &Config,
    name: &str,
    slug: &str,
    color: Option<&str>,
) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;
    let catalog = CatalogService::new(store);

    let tag = catalog.create_tag(name, slug, color).await?;
    println!("✓ Added tag #{}: {} [{}]", tag.id, tag.name, tag.slug);
    if let Some(color) = &tag.color {
        println!("  Color: {color}");
    }

    Ok(())
}
