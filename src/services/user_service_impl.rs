//! `SeaORM` implementation of the `UserService` trait.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

use crate::api::types::{
    RecipeShortDto, RegisteredUserDto, UserDto, UserWithRecipesDto,
};
use crate::api::validation::{self, ValidationErrors};
use crate::config::SecurityConfig;
use crate::db::{Store, UserRow};
use crate::models::user::NewUser;
use crate::models::{PageRequest, Paged};
use crate::services::image::ImageService;
use crate::services::user_service::{UserError, UserService};

pub struct SeaOrmUserService {
    store: Store,
    images: Arc<ImageService>,
    security: SecurityConfig,
}

impl SeaOrmUserService {
    #[must_use]
    pub const fn new(store: Store, images: Arc<ImageService>, security: SecurityConfig) -> Self {
        Self {
            store,
            images,
            security,
        }
    }

    /// Attach a recipe preview (newest first, capped at `recipes_limit`) and
    /// the total recipe count to each author.
    async fn with_recipes(
        &self,
        authors: Vec<UserRow>,
        recipes_limit: Option<usize>,
    ) -> Result<Vec<UserWithRecipesDto>, UserError> {
        let ids: Vec<i32> = authors.iter().map(|a| a.id).collect();

        let counts = self.store.recipe_counts_by_author(&ids).await?;

        let mut previews: HashMap<i32, Vec<RecipeShortDto>> = HashMap::new();
        for recipe in self.store.recipes_by_authors(&ids).await? {
            let Some(author_id) = recipe.author_id else {
                continue;
            };
            let preview = previews.entry(author_id).or_default();
            if recipes_limit.is_none_or(|limit| preview.len() < limit) {
                preview.push(RecipeShortDto {
                    id: recipe.id,
                    image: self.images.url_for(&recipe.image),
                    name: recipe.name,
                    cooking_time: recipe.cooking_time,
                });
            }
        }

        Ok(authors
            .into_iter()
            .map(|author| {
                let id = author.id;
                UserWithRecipesDto {
                    user: UserDto::from(author),
                    recipes: previews.remove(&id).unwrap_or_default(),
                    recipes_count: counts.get(&id).copied().unwrap_or(0),
                }
            })
            .collect())
    }
}

#[async_trait]
impl UserService for SeaOrmUserService {
    async fn register(&self, user: NewUser) -> Result<RegisteredUserDto, UserError> {
        let mut errors = ValidationErrors::new();
        if self.store.email_taken(&user.email).await? {
            errors.add("email", "A user with that email already exists.");
        }
        if self.store.username_taken(&user.username).await? {
            errors.add("username", "A user with that username already exists.");
        }
        errors.into_result()?;

        let username = user.username.clone();
        let created = self
            .store
            .create_user(user, &self.security)
            .await?
            .ok_or_else(|| {
                ValidationErrors::non_field("A user with that email or username already exists.")
            })?;

        info!(user_id = created.id, username = %username, "User registered");
        Ok(RegisteredUserDto::from(created))
    }

    async fn list(
        &self,
        viewer: Option<i32>,
        page: PageRequest,
    ) -> Result<Paged<UserDto>, UserError> {
        Ok(self
            .store
            .list_users_annotated(viewer, page)
            .await?
            .map(UserDto::from))
    }

    async fn get(&self, id: i32, viewer: Option<i32>) -> Result<UserDto, UserError> {
        self.store
            .get_user_annotated(id, viewer)
            .await?
            .map(UserDto::from)
            .ok_or(UserError::NotFound(id))
    }

    async fn set_password(
        &self,
        user_id: i32,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), UserError> {
        if !self
            .store
            .verify_user_password(user_id, current_password)
            .await?
        {
            return Err(ValidationErrors::single("current_password", "Wrong password.").into());
        }

        let mut errors = ValidationErrors::new();
        for msg in validation::validate_password(new_password, self.security.min_password_length) {
            errors.add("new_password", msg);
        }
        errors.into_result()?;

        self.store
            .update_user_password(user_id, new_password, &self.security)
            .await?;

        info!(user_id, "Password changed");
        Ok(())
    }

    async fn subscribe(
        &self,
        subscriber_id: i32,
        author_id: i32,
        recipes_limit: Option<usize>,
    ) -> Result<UserWithRecipesDto, UserError> {
        let author = self
            .store
            .get_user_annotated(author_id, Some(subscriber_id))
            .await?
            .ok_or(UserError::NotFound(author_id))?;

        if subscriber_id == author_id {
            return Err(UserError::SelfSubscription);
        }

        if !self.store.subscribe(subscriber_id, author_id).await? {
            return Err(UserError::AlreadySubscribed(author_id));
        }

        metrics::counter!("subscriptions_created_total").increment(1);

        let author = UserRow {
            is_subscribed: true,
            ..author
        };

        self.with_recipes(vec![author], recipes_limit)
            .await?
            .pop()
            .ok_or(UserError::NotFound(author_id))
    }

    async fn unsubscribe(&self, subscriber_id: i32, author_id: i32) -> Result<(), UserError> {
        if self.store.get_user(author_id).await?.is_none() {
            return Err(UserError::NotFound(author_id));
        }

        let removed = self.store.unsubscribe(subscriber_id, author_id).await?;
        if removed == 0 {
            debug!(subscriber_id, author_id, "No subscription to remove");
        }

        Ok(())
    }

    async fn subscriptions(
        &self,
        subscriber_id: i32,
        page: PageRequest,
        recipes_limit: Option<usize>,
    ) -> Result<Paged<UserWithRecipesDto>, UserError> {
        let authors = self.store.list_subscriptions(subscriber_id, page).await?;
        let items = self.with_recipes(authors.items, recipes_limit).await?;

        Ok(Paged {
            items,
            total: authors.total,
        })
    }
}
