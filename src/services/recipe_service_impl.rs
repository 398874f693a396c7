//! `SeaORM` implementation of the `RecipeService` trait.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info};

use crate::api::types::{RecipeDto, RecipeIngredientDto, RecipeShortDto, TagDto, UserDto};
use crate::api::validation::ValidationErrors;
use crate::db::{RecipeRow, Store};
use crate::entities::recipes;
use crate::models::recipe::{RecipeFilter, RecipeInput, RecipeList};
use crate::models::{PageRequest, Paged};
use crate::services::image::ImageService;
use crate::services::recipe_service::{RecipeError, RecipeService};
use crate::services::shopping_list;

pub struct SeaOrmRecipeService {
    store: Store,
    images: Arc<ImageService>,
}

impl SeaOrmRecipeService {
    #[must_use]
    pub const fn new(store: Store, images: Arc<ImageService>) -> Self {
        Self { store, images }
    }

    /// Attach tags, ingredient lines and authors to a batch of rows using one
    /// query per relation.
    async fn assemble(
        &self,
        rows: Vec<RecipeRow>,
        viewer: Option<i32>,
    ) -> Result<Vec<RecipeDto>, RecipeError> {
        let ids: Vec<i32> = rows.iter().map(|r| r.id).collect();

        let mut lines: HashMap<i32, Vec<RecipeIngredientDto>> = HashMap::new();
        for line in self.store.recipe_ingredient_lines(&ids).await? {
            lines.entry(line.recipe_id).or_default().push(line.into());
        }

        let mut tags: HashMap<i32, Vec<TagDto>> = HashMap::new();
        for (recipe_id, tag) in self.store.recipe_tags(&ids).await? {
            tags.entry(recipe_id).or_default().push(tag.into());
        }

        let author_ids: Vec<i32> = rows
            .iter()
            .filter_map(|r| r.author_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let authors: HashMap<i32, UserDto> = self
            .store
            .get_users_annotated(&author_ids, viewer)
            .await?
            .into_iter()
            .map(|u| (u.id, UserDto::from(u)))
            .collect();

        Ok(rows
            .into_iter()
            .map(|row| RecipeDto {
                id: row.id,
                tags: tags.remove(&row.id).unwrap_or_default(),
                author: row.author_id.and_then(|a| authors.get(&a).cloned()),
                ingredients: lines.remove(&row.id).unwrap_or_default(),
                is_favorited: row.is_favorited,
                is_in_shopping_cart: row.is_in_shopping_cart,
                name: row.name,
                image: self.images.url_for(&row.image),
                text: row.text,
                cooking_time: row.cooking_time,
            })
            .collect())
    }

    /// Every referenced ingredient and tag must exist.
    async fn check_references(&self, input: &RecipeInput) -> Result<(), RecipeError> {
        let mut errors = ValidationErrors::new();

        let wanted: Vec<i32> = input.ingredients.iter().map(|i| i.ingredient_id).collect();
        let found: HashSet<i32> = self
            .store
            .existing_ingredient_ids(&wanted)
            .await?
            .into_iter()
            .collect();
        for id in wanted.iter().filter(|id| !found.contains(id)) {
            errors.add(
                "ingredients",
                format!("Invalid pk \"{id}\" - object does not exist."),
            );
        }

        let found: HashSet<i32> = self
            .store
            .existing_tag_ids(&input.tags)
            .await?
            .into_iter()
            .collect();
        for id in input.tags.iter().filter(|id| !found.contains(id)) {
            errors.add("tags", format!("Invalid pk \"{id}\" - object does not exist."));
        }

        errors.into_result().map_err(RecipeError::Validation)
    }

    async fn owned_recipe(&self, id: i32, editor_id: i32) -> Result<recipes::Model, RecipeError> {
        let recipe = self
            .store
            .get_recipe(id)
            .await?
            .ok_or(RecipeError::NotFound(id))?;

        if recipe.author_id != Some(editor_id) {
            return Err(RecipeError::NotAuthor(id));
        }

        Ok(recipe)
    }

    fn short(&self, recipe: &recipes::Model) -> RecipeShortDto {
        RecipeShortDto {
            id: recipe.id,
            name: recipe.name.clone(),
            image: self.images.url_for(&recipe.image),
            cooking_time: recipe.cooking_time,
        }
    }
}

#[async_trait]
impl RecipeService for SeaOrmRecipeService {
    async fn list(
        &self,
        filter: RecipeFilter,
        viewer: Option<i32>,
        page: PageRequest,
    ) -> Result<Paged<RecipeDto>, RecipeError> {
        let rows = self.store.list_recipes(&filter, viewer, page).await?;
        let items = self.assemble(rows.items, viewer).await?;

        Ok(Paged {
            items,
            total: rows.total,
        })
    }

    async fn get(&self, id: i32, viewer: Option<i32>) -> Result<RecipeDto, RecipeError> {
        let row = self
            .store
            .get_recipe_annotated(id, viewer)
            .await?
            .ok_or(RecipeError::NotFound(id))?;

        self.assemble(vec![row], viewer)
            .await?
            .pop()
            .ok_or(RecipeError::NotFound(id))
    }

    async fn create(&self, author_id: i32, input: RecipeInput) -> Result<RecipeDto, RecipeError> {
        self.check_references(&input).await?;

        let Some(data_url) = input.image.as_deref() else {
            return Err(ValidationErrors::single("image", "This field is required.").into());
        };
        let image = self.images.save_recipe_image(data_url).await?;

        let recipe = match self.store.create_recipe(author_id, &input, &image).await {
            Ok(recipe) => recipe,
            Err(e) => {
                self.images.remove(&image).await;
                return Err(e.into());
            }
        };

        metrics::counter!("recipes_created_total").increment(1);
        info!(recipe_id = recipe.id, author_id, "Recipe created");

        self.get(recipe.id, Some(author_id)).await
    }

    async fn update(
        &self,
        id: i32,
        editor_id: i32,
        input: RecipeInput,
    ) -> Result<RecipeDto, RecipeError> {
        let existing = self.owned_recipe(id, editor_id).await?;
        self.check_references(&input).await?;

        let new_image = match input.image.as_deref() {
            Some(data_url) => Some(self.images.save_recipe_image(data_url).await?),
            None => None,
        };

        if let Err(e) = self
            .store
            .update_recipe(id, &input, new_image.as_deref())
            .await
        {
            if let Some(path) = &new_image {
                self.images.remove(path).await;
            }
            return Err(e.into());
        }

        if new_image.is_some() {
            self.images.remove(&existing.image).await;
        }

        info!(recipe_id = id, editor_id, "Recipe updated");
        self.get(id, Some(editor_id)).await
    }

    async fn delete(&self, id: i32, editor_id: i32) -> Result<(), RecipeError> {
        let existing = self.owned_recipe(id, editor_id).await?;

        if !self.store.delete_recipe(id).await? {
            return Err(RecipeError::NotFound(id));
        }

        self.images.remove(&existing.image).await;
        info!(recipe_id = id, editor_id, "Recipe deleted");
        Ok(())
    }

    async fn ensure_author(&self, id: i32, editor_id: i32) -> Result<(), RecipeError> {
        self.owned_recipe(id, editor_id).await.map(|_| ())
    }

    async fn add_to_list(
        &self,
        list: RecipeList,
        user_id: i32,
        recipe_id: i32,
    ) -> Result<RecipeShortDto, RecipeError> {
        let recipe = self
            .store
            .get_recipe(recipe_id)
            .await?
            .ok_or(RecipeError::NotFound(recipe_id))?;

        if !self
            .store
            .add_to_recipe_list(list, user_id, recipe_id)
            .await?
        {
            return Err(RecipeError::AlreadyInList { list, recipe_id });
        }

        metrics::counter!("recipe_list_additions_total", "list" => list.as_str()).increment(1);

        Ok(self.short(&recipe))
    }

    async fn remove_from_list(
        &self,
        list: RecipeList,
        user_id: i32,
        recipe_id: i32,
    ) -> Result<(), RecipeError> {
        if self.store.get_recipe(recipe_id).await?.is_none() {
            return Err(RecipeError::NotFound(recipe_id));
        }

        let removed = self
            .store
            .remove_from_recipe_list(list, user_id, recipe_id)
            .await?;
        if removed == 0 {
            debug!(%list, user_id, recipe_id, "Recipe was not in list");
        }

        Ok(())
    }

    async fn shopping_list(&self, user_id: i32) -> Result<String, RecipeError> {
        let items = self.store.shopping_list(user_id).await?;
        Ok(shopping_list::render(&items))
    }
}
