use anyhow::Result;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, JoinType, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait,
};

use crate::entities::{
    ingredients, prelude::*, recipe_ingredients, recipes, shopping_carts, units,
};

/// Total amount of one ingredient across every recipe in a cart.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
pub struct ShoppingListItem {
    pub name: String,
    pub unit: String,
    pub total_amount: i64,
}

pub struct ShoppingListRepository {
    conn: DatabaseConnection,
}

impl ShoppingListRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Sum ingredient amounts over the user's cart, grouped by name and unit,
    /// largest total first.
    pub async fn aggregate(&self, user_id: i32) -> Result<Vec<ShoppingListItem>> {
        Ok(RecipeIngredients::find()
            .select_only()
            .column_as(ingredients::Column::Name, "name")
            .column_as(units::Column::Notation, "unit")
            .column_as(recipe_ingredients::Column::Amount.sum(), "total_amount")
            .join(JoinType::InnerJoin, recipe_ingredients::Relation::Ingredient.def())
            .join(JoinType::InnerJoin, ingredients::Relation::Unit.def())
            .join(JoinType::InnerJoin, recipe_ingredients::Relation::Recipe.def())
            .join(JoinType::InnerJoin, recipes::Relation::ShoppingCarts.def())
            .filter(shopping_carts::Column::UserId.eq(user_id))
            .group_by(ingredients::Column::Name)
            .group_by(units::Column::Notation)
            .order_by_desc(recipe_ingredients::Column::Amount.sum())
            .order_by_asc(ingredients::Column::Name)
            .into_model::<ShoppingListItem>()
            .all(&self.conn)
            .await?)
    }
}
