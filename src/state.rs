use std::sync::Arc;

use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AuthService, CatalogService, ImageService, RecipeService, SeaOrmAuthService,
    SeaOrmRecipeService, SeaOrmUserService, UserService,
};

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Store,

    pub image_service: Arc<ImageService>,

    pub catalog_service: Arc<CatalogService>,

    pub auth_service: Arc<dyn AuthService>,

    pub recipe_service: Arc<dyn RecipeService>,

    pub user_service: Arc<dyn UserService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        Ok(Self::with_store(config, store))
    }

    /// Wire every service on top of an already opened store.
    #[must_use]
    pub fn with_store(config: Config, store: Store) -> Self {
        let image_service = Arc::new(ImageService::new(&config.media));
        let catalog_service = Arc::new(CatalogService::new(store.clone()));

        let auth_service =
            Arc::new(SeaOrmAuthService::new(store.clone())) as Arc<dyn AuthService + 'static>;

        let recipe_service = Arc::new(SeaOrmRecipeService::new(
            store.clone(),
            image_service.clone(),
        )) as Arc<dyn RecipeService + 'static>;

        let user_service = Arc::new(SeaOrmUserService::new(
            store.clone(),
            image_service.clone(),
            config.security.clone(),
        )) as Arc<dyn UserService + 'static>;

        Self {
            config: Arc::new(config),
            store,
            image_service,
            catalog_service,
            auth_service,
            recipe_service,
            user_service,
        }
    }
}
