use crate::entities::prelude::*;
use crate::entities::{favorites, recipe_ingredients, recipes, shopping_carts};
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Schema;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let schema = Schema::new(backend);

        // Parents first so the inline foreign keys resolve.
        manager
            .create_table(
                schema
                    .create_table_from_entity(Users)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Units)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Ingredients)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Tags)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Recipes)
                    .if_not_exists()
                    .check(Expr::col(recipes::Column::CookingTime).gte(1))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(RecipeIngredients)
                    .if_not_exists()
                    .check(Expr::col(recipe_ingredients::Column::Amount).gte(1))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(RecipeTags)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Favorites)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(ShoppingCarts)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_recipe_ingredients_recipe_ingredient")
                    .table(RecipeIngredients)
                    .col(recipe_ingredients::Column::RecipeId)
                    .col(recipe_ingredients::Column::IngredientId)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_favorites_user_recipe")
                    .table(Favorites)
                    .col(favorites::Column::UserId)
                    .col(favorites::Column::RecipeId)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_shopping_carts_user_recipe")
                    .table(ShoppingCarts)
                    .col(shopping_carts::Column::UserId)
                    .col(shopping_carts::Column::RecipeId)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_recipes_author_id")
                    .table(Recipes)
                    .col(recipes::Column::AuthorId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ShoppingCarts).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Favorites).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(RecipeTags).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(RecipeIngredients).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Recipes).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tags).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Ingredients).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Units).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users).if_exists().to_owned())
            .await
    }
}
