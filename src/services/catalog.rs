use anyhow::Result;

use crate::api::types::{IngredientDto, TagDto};
use crate::api::validation;
use crate::db::Store;

/// Read access to tags and ingredients, plus the creation paths used by the
/// command line.
pub struct CatalogService {
    store: Store,
}

impl CatalogService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn list_tags(&self) -> Result<Vec<TagDto>> {
        let tags = self.store.list_tags().await?;
        Ok(tags.into_iter().map(TagDto::from).collect())
    }

    pub async fn get_tag(&self, id: i32) -> Result<Option<TagDto>> {
        Ok(self.store.get_tag(id).await?.map(TagDto::from))
    }

    pub async fn list_ingredients(&self, name_prefix: Option<&str>) -> Result<Vec<IngredientDto>> {
        let rows = self.store.list_ingredients(name_prefix).await?;
        Ok(rows.into_iter().map(IngredientDto::from).collect())
    }

    pub async fn get_ingredient(&self, id: i32) -> Result<Option<IngredientDto>> {
        Ok(self.store.get_ingredient(id).await?.map(IngredientDto::from))
    }

    pub async fn create_tag(&self, name: &str, slug: &str, color: Option<&str>) -> Result<TagDto> {
        if name.trim().is_empty() {
            anyhow::bail!("Tag name cannot be empty");
        }
        validation::validate_max_length(name, 200).map_err(anyhow::Error::msg)?;
        validation::validate_slug(slug).map_err(anyhow::Error::msg)?;
        if let Some(color) = color {
            validation::validate_hex_color(color).map_err(anyhow::Error::msg)?;
        }

        let tag = self.store.create_tag(name, color, slug).await?;
        Ok(TagDto::from(tag))
    }

    pub async fn create_ingredient(&self, name: &str, unit: &str) -> Result<IngredientDto> {
        if name.trim().is_empty() || unit.trim().is_empty() {
            anyhow::bail!("Ingredient name and unit cannot be empty");
        }
        validation::validate_max_length(name, 200).map_err(anyhow::Error::msg)?;
        validation::validate_max_length(unit, 200).map_err(anyhow::Error::msg)?;

        let row = self.store.create_ingredient(name.trim(), unit.trim()).await?;
        Ok(IngredientDto::from(row))
    }
}
