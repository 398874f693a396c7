use crate::models::recipe::{RecipeFilter, RecipeInput, RecipeList};
use crate::models::user::NewUser;
use crate::models::{PageRequest, Paged};
use anyhow::Result;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, SqlErr, Statement,
};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::config::SecurityConfig;
use crate::entities::{recipes, tags, users};

pub mod migrator;
pub mod repositories;

pub use repositories::catalog::IngredientRow;
pub use repositories::recipe::{IngredientLineRow, RecipeRow};
pub use repositories::shopping_list::ShoppingListItem;
pub use repositories::user::UserRow;

/// True when the database rejected a write because of a unique index.
#[must_use]
pub fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn token_repo(&self) -> repositories::token::TokenRepository {
        repositories::token::TokenRepository::new(self.conn.clone())
    }

    fn catalog_repo(&self) -> repositories::catalog::CatalogRepository {
        repositories::catalog::CatalogRepository::new(self.conn.clone())
    }

    fn recipe_repo(&self) -> repositories::recipe::RecipeRepository {
        repositories::recipe::RecipeRepository::new(self.conn.clone())
    }

    fn recipe_list_repo(&self) -> repositories::recipe_list::RecipeListRepository {
        repositories::recipe_list::RecipeListRepository::new(self.conn.clone())
    }

    fn subscription_repo(&self) -> repositories::subscription::SubscriptionRepository {
        repositories::subscription::SubscriptionRepository::new(self.conn.clone())
    }

    fn shopping_list_repo(&self) -> repositories::shopping_list::ShoppingListRepository {
        repositories::shopping_list::ShoppingListRepository::new(self.conn.clone())
    }

    // ========================================================================
    // Users & tokens
    // ========================================================================

    pub async fn create_user(
        &self,
        user: NewUser,
        security: &SecurityConfig,
    ) -> Result<Option<users::Model>> {
        self.user_repo().create(user, security).await
    }

    pub async fn get_user(&self, id: i32) -> Result<Option<users::Model>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn username_taken(&self, username: &str) -> Result<bool> {
        self.user_repo().username_exists(username).await
    }

    pub async fn email_taken(&self, email: &str) -> Result<bool> {
        self.user_repo().email_exists(email).await
    }

    pub async fn verify_user_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<users::Model>> {
        self.user_repo().verify_credentials(email, password).await
    }

    pub async fn verify_user_password(&self, user_id: i32, password: &str) -> Result<bool> {
        self.user_repo().verify_password(user_id, password).await
    }

    pub async fn update_user_password(
        &self,
        user_id: i32,
        new_password: &str,
        security: &SecurityConfig,
    ) -> Result<()> {
        self.user_repo()
            .update_password(user_id, new_password, security)
            .await
    }

    pub async fn delete_user(&self, id: i32) -> Result<bool> {
        self.user_repo().delete(id).await
    }

    pub async fn list_all_users(&self) -> Result<Vec<users::Model>> {
        self.user_repo().list_all().await
    }

    pub async fn list_users_annotated(
        &self,
        viewer: Option<i32>,
        page: PageRequest,
    ) -> Result<Paged<UserRow>> {
        self.user_repo().list_annotated(viewer, page).await
    }

    pub async fn get_user_annotated(&self, id: i32, viewer: Option<i32>) -> Result<Option<UserRow>> {
        self.user_repo().get_annotated(id, viewer).await
    }

    pub async fn get_users_annotated(
        &self,
        ids: &[i32],
        viewer: Option<i32>,
    ) -> Result<Vec<UserRow>> {
        self.user_repo().get_many_annotated(ids, viewer).await
    }

    pub async fn obtain_token(&self, user_id: i32) -> Result<String> {
        self.token_repo().get_or_create(user_id).await
    }

    pub async fn user_by_token(&self, key: &str) -> Result<Option<users::Model>> {
        self.token_repo().find_user(key).await
    }

    pub async fn revoke_token(&self, user_id: i32) -> Result<u64> {
        self.token_repo().delete_for_user(user_id).await
    }

    // ========================================================================
    // Catalog: tags, units, ingredients
    // ========================================================================

    pub async fn list_tags(&self) -> Result<Vec<tags::Model>> {
        self.catalog_repo().list_tags().await
    }

    pub async fn get_tag(&self, id: i32) -> Result<Option<tags::Model>> {
        self.catalog_repo().get_tag(id).await
    }

    pub async fn create_tag(&self, name: &str, color: Option<&str>, slug: &str) -> Result<tags::Model> {
        self.catalog_repo().create_tag(name, color, slug).await
    }

    pub async fn existing_tag_ids(&self, ids: &[i32]) -> Result<Vec<i32>> {
        self.catalog_repo().existing_tag_ids(ids).await
    }

    pub async fn list_ingredients(&self, name_prefix: Option<&str>) -> Result<Vec<IngredientRow>> {
        self.catalog_repo().list_ingredients(name_prefix).await
    }

    pub async fn get_ingredient(&self, id: i32) -> Result<Option<IngredientRow>> {
        self.catalog_repo().get_ingredient(id).await
    }

    pub async fn existing_ingredient_ids(&self, ids: &[i32]) -> Result<Vec<i32>> {
        self.catalog_repo().existing_ingredient_ids(ids).await
    }

    pub async fn create_ingredient(&self, name: &str, unit: &str) -> Result<IngredientRow> {
        self.catalog_repo().create_ingredient(name, unit).await
    }

    // ========================================================================
    // Recipes
    // ========================================================================

    pub async fn list_recipes(
        &self,
        filter: &RecipeFilter,
        viewer: Option<i32>,
        page: PageRequest,
    ) -> Result<Paged<RecipeRow>> {
        self.recipe_repo().list(filter, viewer, page).await
    }

    pub async fn get_recipe_annotated(
        &self,
        id: i32,
        viewer: Option<i32>,
    ) -> Result<Option<RecipeRow>> {
        self.recipe_repo().get_annotated(id, viewer).await
    }

    pub async fn get_recipe(&self, id: i32) -> Result<Option<recipes::Model>> {
        self.recipe_repo().get(id).await
    }

    pub async fn recipe_ingredient_lines(
        &self,
        recipe_ids: &[i32],
    ) -> Result<Vec<IngredientLineRow>> {
        self.recipe_repo().ingredient_lines(recipe_ids).await
    }

    pub async fn recipe_tags(&self, recipe_ids: &[i32]) -> Result<Vec<(i32, tags::Model)>> {
        self.recipe_repo().tags_for(recipe_ids).await
    }

    pub async fn create_recipe(
        &self,
        author_id: i32,
        input: &RecipeInput,
        image: &str,
    ) -> Result<recipes::Model> {
        self.recipe_repo().create(author_id, input, image).await
    }

    pub async fn update_recipe(
        &self,
        id: i32,
        input: &RecipeInput,
        image: Option<&str>,
    ) -> Result<recipes::Model> {
        self.recipe_repo().update(id, input, image).await
    }

    pub async fn delete_recipe(&self, id: i32) -> Result<bool> {
        self.recipe_repo().delete(id).await
    }

    pub async fn recipes_by_authors(&self, author_ids: &[i32]) -> Result<Vec<recipes::Model>> {
        self.recipe_repo().by_authors(author_ids).await
    }

    pub async fn recipe_counts_by_author(&self, author_ids: &[i32]) -> Result<HashMap<i32, u64>> {
        self.recipe_repo().count_by_authors(author_ids).await
    }

    // ========================================================================
    // Favorites / shopping cart
    // ========================================================================

    pub async fn add_to_recipe_list(
        &self,
        list: RecipeList,
        user_id: i32,
        recipe_id: i32,
    ) -> Result<bool> {
        self.recipe_list_repo().add(list, user_id, recipe_id).await
    }

    pub async fn remove_from_recipe_list(
        &self,
        list: RecipeList,
        user_id: i32,
        recipe_id: i32,
    ) -> Result<u64> {
        self.recipe_list_repo().remove(list, user_id, recipe_id).await
    }

    pub async fn shopping_list(&self, user_id: i32) -> Result<Vec<ShoppingListItem>> {
        self.shopping_list_repo().aggregate(user_id).await
    }

    // ========================================================================
    // Subscriptions
    // ========================================================================

    pub async fn subscribe(&self, subscriber_id: i32, author_id: i32) -> Result<bool> {
        self.subscription_repo().add(subscriber_id, author_id).await
    }

    pub async fn unsubscribe(&self, subscriber_id: i32, author_id: i32) -> Result<u64> {
        self.subscription_repo()
            .remove(subscriber_id, author_id)
            .await
    }

    pub async fn list_subscriptions(
        &self,
        subscriber_id: i32,
        page: PageRequest,
    ) -> Result<Paged<UserRow>> {
        self.subscription_repo()
            .list_authors(subscriber_id, page)
            .await
    }
}
