use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    FromQueryResult, JoinType, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    RelationTrait, Select, Set, TransactionTrait,
    sea_query::{Expr, Query},
};
use std::collections::HashMap;

use super::annotations;
use crate::entities::{
    ingredients, prelude::*, recipe_ingredients, recipe_tags, recipes, tags, units,
};
use crate::models::recipe::{RecipeFilter, RecipeInput, RecipeList};
use crate::models::{PageRequest, Paged};

/// A recipe row annotated with the viewer's list membership.
#[derive(Debug, Clone, FromQueryResult)]
pub struct RecipeRow {
    pub id: i32,
    pub name: String,
    pub text: String,
    pub image: String,
    pub cooking_time: i32,
    pub author_id: Option<i32>,
    pub created_at: String,
    pub edited_at: String,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
}

/// One ingredient line of a recipe, flattened with the ingredient's name and unit.
#[derive(Debug, Clone, FromQueryResult)]
pub struct IngredientLineRow {
    pub recipe_id: i32,
    pub id: i32,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

pub struct RecipeRepository {
    conn: DatabaseConnection,
}

impl RecipeRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn annotated(viewer: Option<i32>) -> Select<Recipes> {
        Recipes::find()
            .column_as(
                annotations::in_recipe_list(RecipeList::Favorites, viewer),
                "is_favorited",
            )
            .column_as(
                annotations::in_recipe_list(RecipeList::ShoppingCart, viewer),
                "is_in_shopping_cart",
            )
    }

    pub async fn list(
        &self,
        filter: &RecipeFilter,
        viewer: Option<i32>,
        page: PageRequest,
    ) -> Result<Paged<RecipeRow>> {
        let mut query = Self::annotated(viewer);

        if let Some(author) = filter.author {
            query = query.filter(recipes::Column::AuthorId.eq(author));
        }

        if !filter.tags.is_empty() {
            let tagged = Query::select()
                .column((RecipeTags, recipe_tags::Column::RecipeId))
                .from(RecipeTags)
                .inner_join(
                    Tags,
                    Expr::col((Tags, tags::Column::Id))
                        .equals((RecipeTags, recipe_tags::Column::TagId)),
                )
                .and_where(Expr::col((Tags, tags::Column::Slug)).is_in(filter.tags.iter().cloned()))
                .to_owned();
            query = query.filter(recipes::Column::Id.in_subquery(tagged));
        }

        // Anonymous viewers have empty lists, so these filters match nothing.
        if filter.favorited_only {
            query = query.filter(annotations::in_recipe_list(RecipeList::Favorites, viewer));
        }

        if filter.in_shopping_cart_only {
            query = query.filter(annotations::in_recipe_list(RecipeList::ShoppingCart, viewer));
        }

        let paginator = query
            .order_by_desc(recipes::Column::CreatedAt)
            .order_by_desc(recipes::Column::Id)
            .into_model::<RecipeRow>()
            .paginate(&self.conn, page.size);

        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.index()).await?;

        Ok(Paged { items, total })
    }

    pub async fn get_annotated(&self, id: i32, viewer: Option<i32>) -> Result<Option<RecipeRow>> {
        Ok(Self::annotated(viewer)
            .filter(recipes::Column::Id.eq(id))
            .into_model::<RecipeRow>()
            .one(&self.conn)
            .await?)
    }

    pub async fn get(&self, id: i32) -> Result<Option<recipes::Model>> {
        Ok(Recipes::find_by_id(id).one(&self.conn).await?)
    }

    /// Ingredient lines for every recipe in `recipe_ids`, in insertion order.
    pub async fn ingredient_lines(&self, recipe_ids: &[i32]) -> Result<Vec<IngredientLineRow>> {
        if recipe_ids.is_empty() {
            return Ok(Vec::new());
        }

        Ok(RecipeIngredients::find()
            .select_only()
            .column_as(recipe_ingredients::Column::RecipeId, "recipe_id")
            .column_as(ingredients::Column::Id, "id")
            .column_as(ingredients::Column::Name, "name")
            .column_as(units::Column::Notation, "measurement_unit")
            .column_as(recipe_ingredients::Column::Amount, "amount")
            .join(JoinType::InnerJoin, recipe_ingredients::Relation::Ingredient.def())
            .join(JoinType::InnerJoin, ingredients::Relation::Unit.def())
            .filter(recipe_ingredients::Column::RecipeId.is_in(recipe_ids.iter().copied()))
            .order_by_asc(recipe_ingredients::Column::Id)
            .into_model::<IngredientLineRow>()
            .all(&self.conn)
            .await?)
    }

    /// `(recipe_id, tag)` pairs for every recipe in `recipe_ids`.
    pub async fn tags_for(&self, recipe_ids: &[i32]) -> Result<Vec<(i32, tags::Model)>> {
        if recipe_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = RecipeTags::find()
            .find_also_related(Tags)
            .filter(recipe_tags::Column::RecipeId.is_in(recipe_ids.iter().copied()))
            .order_by_asc(tags::Column::Id)
            .all(&self.conn)
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(link, tag)| tag.map(|t| (link.recipe_id, t)))
            .collect())
    }

    pub async fn create(
        &self,
        author_id: i32,
        input: &RecipeInput,
        image: &str,
    ) -> Result<recipes::Model> {
        let now = chrono::Utc::now().to_rfc3339();
        let txn = self.conn.begin().await?;

        let recipe = recipes::ActiveModel {
            name: Set(input.name.clone()),
            text: Set(input.text.clone()),
            image: Set(image.to_string()),
            cooking_time: Set(input.cooking_time),
            author_id: Set(Some(author_id)),
            created_at: Set(now.clone()),
            edited_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .context("Failed to insert recipe")?;

        insert_components(&txn, recipe.id, input).await?;

        txn.commit().await?;
        Ok(recipe)
    }

    /// Overwrite the scalar fields and fully replace the ingredient and tag
    /// sets. `image` is `None` when the stored picture is kept.
    pub async fn update(
        &self,
        id: i32,
        input: &RecipeInput,
        image: Option<&str>,
    ) -> Result<recipes::Model> {
        let txn = self.conn.begin().await?;

        let mut active = recipes::ActiveModel {
            id: Set(id),
            name: Set(input.name.clone()),
            text: Set(input.text.clone()),
            cooking_time: Set(input.cooking_time),
            edited_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };
        if let Some(image) = image {
            active.image = Set(image.to_string());
        }
        let recipe = active.update(&txn).await.context("Failed to update recipe")?;

        RecipeIngredients::delete_many()
            .filter(recipe_ingredients::Column::RecipeId.eq(id))
            .exec(&txn)
            .await?;

        RecipeTags::delete_many()
            .filter(recipe_tags::Column::RecipeId.eq(id))
            .exec(&txn)
            .await?;

        insert_components(&txn, id, input).await?;

        txn.commit().await?;
        Ok(recipe)
    }

    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = Recipes::delete_by_id(id).exec(&self.conn).await?;
        Ok(result.rows_affected > 0)
    }

    /// Every recipe by any of `author_ids`, newest first.
    pub async fn by_authors(&self, author_ids: &[i32]) -> Result<Vec<recipes::Model>> {
        if author_ids.is_empty() {
            return Ok(Vec::new());
        }

        Ok(Recipes::find()
            .filter(recipes::Column::AuthorId.is_in(author_ids.iter().copied()))
            .order_by_desc(recipes::Column::CreatedAt)
            .order_by_desc(recipes::Column::Id)
            .all(&self.conn)
            .await?)
    }

    pub async fn count_by_authors(&self, author_ids: &[i32]) -> Result<HashMap<i32, u64>> {
        if author_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let counts: Vec<(i32, i64)> = Recipes::find()
            .select_only()
            .column(recipes::Column::AuthorId)
            .column_as(recipes::Column::Id.count(), "count")
            .filter(recipes::Column::AuthorId.is_in(author_ids.iter().copied()))
            .group_by(recipes::Column::AuthorId)
            .into_tuple()
            .all(&self.conn)
            .await?;

        Ok(counts
            .into_iter()
            .map(|(author, count)| (author, u64::try_from(count).unwrap_or(0)))
            .collect())
    }
}

async fn insert_components<C: ConnectionTrait>(
    conn: &C,
    recipe_id: i32,
    input: &RecipeInput,
) -> Result<()> {
    if !input.ingredients.is_empty() {
        let lines: Vec<recipe_ingredients::ActiveModel> = input
            .ingredients
            .iter()
            .map(|line| recipe_ingredients::ActiveModel {
                recipe_id: Set(recipe_id),
                ingredient_id: Set(line.ingredient_id),
                amount: Set(line.amount),
                ..Default::default()
            })
            .collect();

        RecipeIngredients::insert_many(lines)
            .exec_without_returning(conn)
            .await
            .context("Failed to insert recipe ingredients")?;
    }

    if !input.tags.is_empty() {
        let links: Vec<recipe_tags::ActiveModel> = input
            .tags
            .iter()
            .map(|tag_id| recipe_tags::ActiveModel {
                recipe_id: Set(recipe_id),
                tag_id: Set(*tag_id),
            })
            .collect();

        RecipeTags::insert_many(links)
            .exec_without_returning(conn)
            .await
            .context("Failed to insert recipe tags")?;
    }

    Ok(())
}
