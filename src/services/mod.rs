pub mod auth_service;
pub mod auth_service_impl;
pub mod catalog;
pub mod image;
pub mod recipe_service;
pub mod recipe_service_impl;
pub mod shopping_list;
pub mod user_service;
pub mod user_service_impl;

pub use auth_service::{AuthError, AuthService, AuthUser};
pub use auth_service_impl::SeaOrmAuthService;
pub use catalog::CatalogService;
pub use image::{ImageError, ImageService};
pub use recipe_service::{RecipeError, RecipeService};
pub use recipe_service_impl::SeaOrmRecipeService;
pub use user_service::{UserError, UserService};
pub use user_service_impl::SeaOrmUserService;
