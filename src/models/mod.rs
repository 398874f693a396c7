pub mod pagination;
pub mod recipe;
pub mod user;

pub use pagination::{PageRequest, Paged};
