use anyhow::Result;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

use crate::db::is_unique_violation;
use crate::entities::{favorites, prelude::*, shopping_carts};
use crate::models::recipe::RecipeList;

/// Membership in a user's favorites or shopping cart.
pub struct RecipeListRepository {
    conn: DatabaseConnection,
}

impl RecipeListRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Returns `false` when the recipe was already on the list.
    pub async fn add(&self, list: RecipeList, user_id: i32, recipe_id: i32) -> Result<bool> {
        let result = match list {
            RecipeList::Favorites => Favorites::insert(favorites::ActiveModel {
                user_id: Set(user_id),
                recipe_id: Set(recipe_id),
                ..Default::default()
            })
            .exec_without_returning(&self.conn)
            .await,
            RecipeList::ShoppingCart => ShoppingCarts::insert(shopping_carts::ActiveModel {
                user_id: Set(user_id),
                recipe_id: Set(recipe_id),
                ..Default::default()
            })
            .exec_without_returning(&self.conn)
            .await,
        };

        match result {
            Ok(_) => Ok(true),
            Err(err) if is_unique_violation(&err) => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    /// Number of rows removed: 0 when the recipe was not on the list.
    pub async fn remove(&self, list: RecipeList, user_id: i32, recipe_id: i32) -> Result<u64> {
        let result = match list {
            RecipeList::Favorites => {
                Favorites::delete_many()
                    .filter(favorites::Column::UserId.eq(user_id))
                    .filter(favorites::Column::RecipeId.eq(recipe_id))
                    .exec(&self.conn)
                    .await?
            }
            RecipeList::ShoppingCart => {
                ShoppingCarts::delete_many()
                    .filter(shopping_carts::Column::UserId.eq(user_id))
                    .filter(shopping_carts::Column::RecipeId.eq(recipe_id))
                    .exec(&self.conn)
                    .await?
            }
        };

        Ok(result.rows_affected)
    }
}
