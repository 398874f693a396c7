use serde::{Deserialize, Serialize};

use super::validation::{
    self, REQUIRED, ValidationErrors, required_text, validate_int_range, validate_max_length,
};
use crate::db::{IngredientLineRow, IngredientRow, UserRow};
use crate::entities::{tags, users};
use crate::models::recipe::{IngredientAmount, RecipeInput};
use crate::models::user::NewUser;

const SMALL_INT_MAX: i32 = 32767;

// ============================================================================
// Read shapes
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TagDto {
    pub id: i32,
    pub name: String,
    pub color: Option<String>,
    pub slug: String,
}

impl From<tags::Model> for TagDto {
    fn from(tag: tags::Model) -> Self {
        Self {
            id: tag.id,
            name: tag.name,
            color: tag.color,
            slug: tag.slug,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IngredientDto {
    pub id: i32,
    pub name: String,
    pub measurement_unit: String,
}

impl From<IngredientRow> for IngredientDto {
    fn from(row: IngredientRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            measurement_unit: row.measurement_unit,
        }
    }
}

/// Ingredient line of a recipe: the ingredient's own fields plus `amount`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecipeIngredientDto {
    pub id: i32,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

impl From<IngredientLineRow> for RecipeIngredientDto {
    fn from(row: IngredientLineRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            measurement_unit: row.measurement_unit,
            amount: row.amount,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserDto {
    pub email: String,
    pub id: i32,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_subscribed: bool,
}

impl From<UserRow> for UserDto {
    fn from(row: UserRow) -> Self {
        Self {
            email: row.email,
            id: row.id,
            username: row.username,
            first_name: row.first_name,
            last_name: row.last_name,
            is_subscribed: row.is_subscribed,
        }
    }
}

/// Returned by registration; carries no viewer-relative fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegisteredUserDto {
    pub email: String,
    pub id: i32,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<users::Model> for RegisteredUserDto {
    fn from(user: users::Model) -> Self {
        Self {
            email: user.email,
            id: user.id,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecipeDto {
    pub id: i32,
    pub tags: Vec<TagDto>,
    pub author: Option<UserDto>,
    pub ingredients: Vec<RecipeIngredientDto>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecipeShortDto {
    pub id: i32,
    pub name: String,
    pub image: String,
    pub cooking_time: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserWithRecipesDto {
    #[serde(flatten)]
    pub user: UserDto,
    pub recipes: Vec<RecipeShortDto>,
    pub recipes_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenDto {
    pub auth_token: String,
}

// ============================================================================
// Write payloads
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct RecipeIngredientRequest {
    pub id: i32,
    pub amount: i64,
}

/// Recipe create/update body. Every field is optional at the JSON level so
/// that missing fields are reported per field instead of as a parse error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecipeWriteRequest {
    pub ingredients: Option<Vec<RecipeIngredientRequest>>,
    pub tags: Option<Vec<i32>>,
    pub image: Option<String>,
    pub name: Option<String>,
    pub text: Option<String>,
    pub cooking_time: Option<i64>,
}

impl RecipeWriteRequest {
    /// Shape checks that need no database access. Referenced ids are checked
    /// for existence by the recipe service.
    pub fn into_input(self, require_image: bool) -> Result<RecipeInput, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let name = required_text(&mut errors, "name", self.name);
        if let Some(name) = &name
            && let Err(msg) = validate_max_length(name, 200)
        {
            errors.add("name", msg);
        }

        let text = required_text(&mut errors, "text", self.text);

        let cooking_time = match self.cooking_time {
            None => {
                errors.add("cooking_time", REQUIRED);
                None
            }
            Some(value) => validate_int_range(value, 1, SMALL_INT_MAX)
                .map_err(|msg| errors.add("cooking_time", msg))
                .ok(),
        };

        let image = match self.image {
            None if require_image => {
                errors.add("image", REQUIRED);
                None
            }
            None => None,
            Some(image) if image.trim().is_empty() => {
                errors.add("image", validation::BLANK);
                None
            }
            Some(image) => Some(image),
        };

        let ingredients = parse_ingredients(&mut errors, self.ingredients);
        let tags = parse_tags(&mut errors, self.tags);

        errors.into_result()?;

        match (name, text, cooking_time) {
            (Some(name), Some(text), Some(cooking_time)) => Ok(RecipeInput {
                name,
                text,
                cooking_time,
                image,
                ingredients,
                tags,
            }),
            _ => Err(ValidationErrors::non_field("Invalid recipe payload.")),
        }
    }
}

fn parse_ingredients(
    errors: &mut ValidationErrors,
    lines: Option<Vec<RecipeIngredientRequest>>,
) -> Vec<IngredientAmount> {
    let Some(lines) = lines else {
        errors.add("ingredients", REQUIRED);
        return Vec::new();
    };

    if lines.is_empty() {
        errors.add("ingredients", "At least one ingredient is required.");
        return Vec::new();
    }

    let mut parsed: Vec<IngredientAmount> = Vec::with_capacity(lines.len());
    for line in lines {
        if parsed.iter().any(|p| p.ingredient_id == line.id) {
            errors.add(
                "ingredients",
                format!("Ingredient {} is listed more than once.", line.id),
            );
            continue;
        }

        match validate_int_range(line.amount, 1, SMALL_INT_MAX) {
            Ok(amount) => parsed.push(IngredientAmount {
                ingredient_id: line.id,
                amount,
            }),
            Err(msg) => errors.add("ingredients", format!("amount: {msg}")),
        }
    }

    parsed
}

fn parse_tags(errors: &mut ValidationErrors, tags: Option<Vec<i32>>) -> Vec<i32> {
    let Some(tags) = tags else {
        errors.add("tags", REQUIRED);
        return Vec::new();
    };

    if tags.is_empty() {
        errors.add("tags", "At least one tag is required.");
        return Vec::new();
    }

    let mut unique = Vec::with_capacity(tags.len());
    for tag in tags {
        if !unique.contains(&tag) {
            unique.push(tag);
        }
    }
    unique
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub password: Option<String>,
}

impl RegisterRequest {
    /// Format checks only; uniqueness is checked by the user service.
    pub fn into_new_user(self, min_password_length: usize) -> Result<NewUser, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let email = required_text(&mut errors, "email", self.email).map(|e| e.trim().to_string());
        if let Some(email) = &email
            && let Err(msg) = validation::validate_email(email)
        {
            errors.add("email", msg);
        }

        let username = required_text(&mut errors, "username", self.username);
        if let Some(username) = &username
            && let Err(msg) = validation::validate_username(username)
        {
            errors.add("username", msg);
        }

        let first_name = required_text(&mut errors, "first_name", self.first_name);
        if let Some(first_name) = &first_name
            && let Err(msg) = validate_max_length(first_name, 150)
        {
            errors.add("first_name", msg);
        }

        let last_name = required_text(&mut errors, "last_name", self.last_name);
        if let Some(last_name) = &last_name
            && let Err(msg) = validate_max_length(last_name, 150)
        {
            errors.add("last_name", msg);
        }

        let password = required_text(&mut errors, "password", self.password);
        if let Some(password) = &password {
            for msg in validation::validate_password(password, min_password_length) {
                errors.add("password", msg);
            }
        }

        errors.into_result()?;

        match (email, username, first_name, last_name, password) {
            (Some(email), Some(username), Some(first_name), Some(last_name), Some(password)) => {
                Ok(NewUser {
                    email,
                    username,
                    first_name,
                    last_name,
                    password,
                })
            }
            _ => Err(ValidationErrors::non_field("Invalid registration payload.")),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SetPasswordRequest {
    pub new_password: Option<String>,
    pub current_password: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_recipe() -> RecipeWriteRequest {
        RecipeWriteRequest {
            ingredients: Some(vec![
                RecipeIngredientRequest { id: 1, amount: 10 },
                RecipeIngredientRequest { id: 2, amount: 5 },
            ]),
            tags: Some(vec![1, 2, 1]),
            image: Some("data:image/png;base64,AAAA".to_string()),
            name: Some("Borscht".to_string()),
            text: Some("Boil beets.".to_string()),
            cooking_time: Some(90),
        }
    }

    #[test]
    fn test_recipe_input_valid() {
        let input = valid_recipe().into_input(true).unwrap();
        assert_eq!(input.cooking_time, 90);
        assert_eq!(input.ingredients.len(), 2);
        assert_eq!(input.tags, vec![1, 2]);
        assert!(input.image.is_some());
    }

    #[test]
    fn test_recipe_input_rejects_bad_numbers() {
        let mut req = valid_recipe();
        req.cooking_time = Some(0);
        req.ingredients = Some(vec![RecipeIngredientRequest { id: 1, amount: 0 }]);

        let errors = req.into_input(true).unwrap_err();
        assert!(errors.get("cooking_time").is_some());
        assert!(errors.get("ingredients").is_some());
    }

    #[test]
    fn test_recipe_input_rejects_duplicate_ingredients() {
        let mut req = valid_recipe();
        req.ingredients = Some(vec![
            RecipeIngredientRequest { id: 3, amount: 1 },
            RecipeIngredientRequest { id: 3, amount: 2 },
        ]);

        let errors = req.into_input(true).unwrap_err();
        assert_eq!(errors.get("ingredients").map(<[String]>::len), Some(1));
    }

    #[test]
    fn test_recipe_input_required_fields() {
        let errors = RecipeWriteRequest::default().into_input(true).unwrap_err();
        for field in ["ingredients", "tags", "image", "name", "text", "cooking_time"] {
            assert_eq!(errors.get(field), Some(&[REQUIRED.to_string()][..]), "{field}");
        }
    }

    #[test]
    fn test_recipe_update_image_optional() {
        let mut req = valid_recipe();
        req.image = None;
        let input = req.into_input(false).unwrap();
        assert!(input.image.is_none());
    }

    #[test]
    fn test_recipe_input_empty_lists() {
        let mut req = valid_recipe();
        req.ingredients = Some(vec![]);
        req.tags = Some(vec![]);

        let errors = req.into_input(true).unwrap_err();
        assert!(errors.get("ingredients").is_some());
        assert!(errors.get("tags").is_some());
    }

    #[test]
    fn test_register_request_validation() {
        let req = RegisterRequest {
            email: Some("bad".to_string()),
            username: Some("bad name".to_string()),
            first_name: Some(String::new()),
            last_name: None,
            password: Some("1234".to_string()),
        };

        let errors = req.into_new_user(8).unwrap_err();
        for field in ["email", "username", "first_name", "last_name", "password"] {
            assert!(errors.get(field).is_some(), "{field}");
        }
    }

    #[test]
    fn test_user_with_recipes_flattens_user() {
        let dto = UserWithRecipesDto {
            user: UserDto {
                email: "a@b.co".to_string(),
                id: 3,
                username: "cook".to_string(),
                first_name: "A".to_string(),
                last_name: "B".to_string(),
                is_subscribed: true,
            },
            recipes: vec![],
            recipes_count: 0,
        };

        let json = serde_json::to_value(&dto).unwrap();
        assert_eq!(json["id"], 3);
        assert_eq!(json["is_subscribed"], true);
        assert_eq!(json["recipes_count"], 0);
        assert!(json.get("user").is_none());
    }
}
