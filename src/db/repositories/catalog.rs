use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, JoinType,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Select, Set, sea_query::LikeExpr,
};

use crate::entities::{ingredients, prelude::*, tags, units};

/// An ingredient together with its unit notation.
#[derive(Debug, Clone, FromQueryResult)]
pub struct IngredientRow {
    pub id: i32,
    pub name: String,
    pub measurement_unit: String,
}

pub struct CatalogRepository {
    conn: DatabaseConnection,
}

impl CatalogRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list_tags(&self) -> Result<Vec<tags::Model>> {
        Ok(Tags::find()
            .order_by_asc(tags::Column::Id)
            .all(&self.conn)
            .await?)
    }

    pub async fn get_tag(&self, id: i32) -> Result<Option<tags::Model>> {
        Ok(Tags::find_by_id(id).one(&self.conn).await?)
    }

    pub async fn create_tag(
        &self,
        name: &str,
        color: Option<&str>,
        slug: &str,
    ) -> Result<tags::Model> {
        let active = tags::ActiveModel {
            name: Set(name.to_string()),
            color: Set(color.map(str::to_string)),
            slug: Set(slug.to_string()),
            ..Default::default()
        };

        active
            .insert(&self.conn)
            .await
            .with_context(|| format!("Failed to create tag '{slug}'"))
    }

    /// Subset of `ids` that name existing tags.
    pub async fn existing_tag_ids(&self, ids: &[i32]) -> Result<Vec<i32>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        Ok(Tags::find()
            .select_only()
            .column(tags::Column::Id)
            .filter(tags::Column::Id.is_in(ids.iter().copied()))
            .into_tuple()
            .all(&self.conn)
            .await?)
    }

    fn ingredient_rows() -> Select<Ingredients> {
        Ingredients::find()
            .select_only()
            .column(ingredients::Column::Id)
            .column(ingredients::Column::Name)
            .column_as(units::Column::Notation, "measurement_unit")
            .join(JoinType::InnerJoin, ingredients::Relation::Unit.def())
    }

    /// All ingredients ordered by name, optionally narrowed to names that
    /// start with `name_prefix`.
    pub async fn list_ingredients(&self, name_prefix: Option<&str>) -> Result<Vec<IngredientRow>> {
        let mut query = Self::ingredient_rows();

        if let Some(prefix) = name_prefix.filter(|p| !p.is_empty()) {
            let pattern = format!("{}%", escape_like(prefix));
            query = query.filter(ingredients::Column::Name.like(LikeExpr::new(pattern).escape('\\')));
        }

        Ok(query
            .order_by_asc(ingredients::Column::Name)
            .order_by_asc(ingredients::Column::Id)
            .into_model::<IngredientRow>()
            .all(&self.conn)
            .await?)
    }

    pub async fn get_ingredient(&self, id: i32) -> Result<Option<IngredientRow>> {
        Ok(Self::ingredient_rows()
            .filter(ingredients::Column::Id.eq(id))
            .into_model::<IngredientRow>()
            .one(&self.conn)
            .await?)
    }

    /// Subset of `ids` that name existing ingredients.
    pub async fn existing_ingredient_ids(&self, ids: &[i32]) -> Result<Vec<i32>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        Ok(Ingredients::find()
            .select_only()
            .column(ingredients::Column::Id)
            .filter(ingredients::Column::Id.is_in(ids.iter().copied()))
            .into_tuple()
            .all(&self.conn)
            .await?)
    }

    async fn get_or_create_unit(&self, notation: &str) -> Result<units::Model> {
        if let Some(unit) = Units::find()
            .filter(units::Column::Notation.eq(notation))
            .one(&self.conn)
            .await?
        {
            return Ok(unit);
        }

        let active = units::ActiveModel {
            notation: Set(notation.to_string()),
            ..Default::default()
        };
        Ok(active.insert(&self.conn).await?)
    }

    /// Create an ingredient measured in `unit`, creating the unit on first use.
    pub async fn create_ingredient(&self, name: &str, unit: &str) -> Result<IngredientRow> {
        let unit = self.get_or_create_unit(unit).await?;

        let active = ingredients::ActiveModel {
            name: Set(name.to_string()),
            measurement_unit_id: Set(unit.id),
            ..Default::default()
        };
        let model = active
            .insert(&self.conn)
            .await
            .with_context(|| format!("Failed to create ingredient '{name}'"))?;

        Ok(IngredientRow {
            id: model.id,
            name: model.name,
            measurement_unit: unit.notation,
        })
    }
}

/// Escape `LIKE` metacharacters so user input matches literally.
fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("salt"), "salt");
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
        assert_eq!(escape_like("a\\b"), "a\\\\b");
    }
}
