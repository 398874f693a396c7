mod catalog;
mod users;

pub use catalog::{cmd_add_ingredient, cmd_add_tag};
pub use users::{cmd_create_user, cmd_list_users};
