pub mod annotations;
pub mod catalog;
pub mod recipe;
pub mod recipe_list;
pub mod shopping_list;
pub mod subscription;
pub mod token;
pub mod user;
