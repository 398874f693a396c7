//! End-to-end tests against the full router with a throwaway database.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use foodgram::api::AppState;
use foodgram::config::Config;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

// 1x1 transparent PNG
const PNG_DATA_URL: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

const PASSWORD: &str = "kitchen-sink-42";

struct TestApp {
    state: Arc<AppState>,
    router: Router,
    breakfast: i32,
    dinner: i32,
    flour: i32,
    eggs: i32,
}

async fn spawn_app() -> TestApp {
    let id = uuid::Uuid::new_v4();
    let db_path = std::env::temp_dir().join(format!("foodgram-test-{id}.db"));
    let media_root = std::env::temp_dir().join(format!("foodgram-media-{id}"));

    let mut config = Config::default();
    config.general.database_path = format!("sqlite:{}", db_path.display());
    config.media.root = media_root.display().to_string();
    config.security.argon2_memory_cost_kib = 1024;
    config.security.argon2_time_cost = 1;

    let state = foodgram::api::create_app_state_from_config(config, None)
        .await
        .expect("failed to create app state");

    let catalog = state.catalog_service();
    let breakfast = catalog
        .create_tag("Breakfast", "breakfast", Some("#E26C2D"))
        .await
        .expect("failed to create tag")
        .id;
    let dinner = catalog
        .create_tag("Dinner", "dinner", None)
        .await
        .expect("failed to create tag")
        .id;
    let flour = catalog
        .create_ingredient("Flour", "g")
        .await
        .expect("failed to create ingredient")
        .id;
    let eggs = catalog
        .create_ingredient("Eggs", "pcs")
        .await
        .expect("failed to create ingredient")
        .id;

    let router = foodgram::api::router(state.clone());

    TestApp {
        state,
        router,
        breakfast,
        dinner,
        flour,
        eggs,
    }
}

impl TestApp {
    async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Token {token}"));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();

        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };

        (status, value)
    }

    /// Registers `username` and returns `(user id, token)`.
    async fn signup(&self, username: &str) -> (i64, String) {
        let email = format!("{username}@example.com");
        let (status, body) = self
            .send(
                "POST",
                "/api/users",
                None,
                Some(json!({
                    "email": email,
                    "username": username,
                    "first_name": "Test",
                    "last_name": "Cook",
                    "password": PASSWORD,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
        let id = body["id"].as_i64().unwrap();

        let (status, body) = self
            .send(
                "POST",
                "/api/auth/token/login",
                None,
                Some(json!({ "email": email, "password": PASSWORD })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");

        (id, body["auth_token"].as_str().unwrap().to_string())
    }

    fn recipe_body(&self, name: &str, ingredients: &[(i32, i64)]) -> Value {
        json!({
            "name": name,
            "text": "Mix and bake.",
            "cooking_time": 25,
            "image": PNG_DATA_URL,
            "tags": [self.breakfast],
            "ingredients": ingredients
                .iter()
                .map(|(id, amount)| json!({ "id": id, "amount": amount }))
                .collect::<Vec<_>>(),
        })
    }

    async fn create_recipe(&self, token: &str, name: &str, ingredients: &[(i32, i64)]) -> i64 {
        let (status, body) = self
            .send(
                "POST",
                "/api/recipes",
                Some(token),
                Some(self.recipe_body(name, ingredients)),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create recipe failed: {body}");
        body["id"].as_i64().unwrap()
    }
}

#[tokio::test]
async fn test_register_login_and_logout() {
    let app = spawn_app().await;
    let (id, token) = app.signup("alice").await;
    assert_eq!(token.len(), 40);

    let (status, me) = app.send("GET", "/api/users/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["id"].as_i64(), Some(id));
    assert_eq!(me["username"], "alice");
    assert_eq!(me["is_subscribed"], false);

    let (status, body) = app
        .send(
            "POST",
            "/api/auth/token/login",
            None,
            Some(json!({ "email": "alice@example.com", "password": "wrong-password" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["non_field_errors"].is_array());

    let (status, _) = app
        .send("POST", "/api/auth/token/logout", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.send("GET", "/api/users/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_registration_rejects_duplicates_and_weak_passwords() {
    let app = spawn_app().await;
    app.signup("bob").await;

    let (status, body) = app
        .send(
            "POST",
            "/api/users",
            None,
            Some(json!({
                "email": "bob@example.com",
                "username": "bob",
                "first_name": "Bob",
                "last_name": "Again",
                "password": PASSWORD,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["email"].is_array());
    assert!(body["username"].is_array());

    let (status, body) = app
        .send(
            "POST",
            "/api/users",
            None,
            Some(json!({
                "email": "carol@example.com",
                "username": "carol",
                "first_name": "Carol",
                "last_name": "Numbers",
                "password": "12345678901",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["password"].is_array());
}

#[tokio::test]
async fn test_set_password() {
    let app = spawn_app().await;
    let (_, token) = app.signup("dave").await;

    let (status, body) = app
        .send(
            "POST",
            "/api/users/set_password",
            Some(&token),
            Some(json!({ "current_password": "not-it", "new_password": "brand-new-pass" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["current_password"].is_array());

    let (status, _) = app
        .send(
            "POST",
            "/api/users/set_password",
            Some(&token),
            Some(json!({ "current_password": PASSWORD, "new_password": "brand-new-pass" })),
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app
        .send(
            "POST",
            "/api/auth/token/login",
            None,
            Some(json!({ "email": "dave@example.com", "password": "brand-new-pass" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_invalid_token_is_rejected_on_public_routes() {
    let app = spawn_app().await;

    let (status, body) = app
        .send("GET", "/api/recipes", Some("0000000000"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["detail"], "Invalid token.");

    let (status, _) = app.send("GET", "/api/recipes", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_catalog_endpoints() {
    let app = spawn_app().await;

    let (status, tags) = app.send("GET", "/api/tags", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(tags.as_array().unwrap().len(), 2);
    assert_eq!(tags[0]["slug"], "breakfast");
    assert_eq!(tags[0]["color"], "#E26C2D");

    let (status, found) = app
        .send("GET", "/api/ingredients?name=fl", None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(found.as_array().unwrap().len(), 1);
    assert_eq!(found[0]["name"], "Flour");
    assert_eq!(found[0]["measurement_unit"], "g");

    let (status, _) = app.send("GET", "/api/tags/9999", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_recipe_write_validation() {
    let app = spawn_app().await;
    let (_, token) = app.signup("erin").await;

    let mut body = app.recipe_body("Pancakes", &[(app.flour, 200)]);
    body["cooking_time"] = json!(0);
    let (status, errors) = app
        .send("POST", "/api/recipes", Some(&token), Some(body))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(errors["cooking_time"].is_array());

    let body = app.recipe_body("Pancakes", &[(app.flour, 0)]);
    let (status, errors) = app
        .send("POST", "/api/recipes", Some(&token), Some(body))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(errors["ingredients"].is_array());

    let body = app.recipe_body("Pancakes", &[(9999, 1)]);
    let (status, errors) = app
        .send("POST", "/api/recipes", Some(&token), Some(body))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(errors["ingredients"].is_array());

    let mut body = app.recipe_body("Pancakes", &[(app.flour, 200)]);
    body["ingredients"] = json!([{ "id": app.flour }]);
    let (status, errors) = app
        .send("POST", "/api/recipes", Some(&token), Some(body))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(errors["non_field_errors"][0].as_str().unwrap().contains("amount"));

    let mut body = app.recipe_body("Pancakes", &[(app.flour, 200)]);
    body["cooking_time"] = json!("ten");
    let (status, errors) = app
        .send("POST", "/api/recipes", Some(&token), Some(body))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(errors["non_field_errors"].is_array());

    let request = Request::builder()
        .method("POST")
        .uri("/api/recipes")
        .header(header::AUTHORIZATION, format!("Token {token}"))
        .body(Body::from("not json"))
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let errors: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(errors["non_field_errors"].is_array());

    let body = app.recipe_body("Pancakes", &[(app.flour, 200)]);
    let (status, _) = app.send("POST", "/api/recipes", None, Some(body)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_and_read_recipe() {
    let app = spawn_app().await;
    let (author_id, token) = app.signup("frank").await;
    let id = app
        .create_recipe(&token, "Omelette", &[(app.eggs, 3), (app.flour, 20)])
        .await;

    let (status, recipe) = app
        .send("GET", &format!("/api/recipes/{id}"), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(recipe["name"], "Omelette");
    assert_eq!(recipe["author"]["id"].as_i64(), Some(author_id));
    assert_eq!(recipe["tags"][0]["slug"], "breakfast");
    assert_eq!(recipe["ingredients"].as_array().unwrap().len(), 2);
    assert_eq!(recipe["ingredients"][0]["name"], "Eggs");
    assert_eq!(recipe["ingredients"][0]["amount"], 3);
    assert!(
        recipe["image"]
            .as_str()
            .unwrap()
            .starts_with("/media/recipes/")
    );
    assert!(recipe["image"].as_str().unwrap().ends_with(".png"));
}

#[tokio::test]
async fn test_anonymous_listing_has_false_flags() {
    let app = spawn_app().await;
    let (_, token) = app.signup("grace").await;
    let id = app.create_recipe(&token, "Porridge", &[(app.flour, 50)]).await;

    let uri = format!("/api/recipes/{id}/favorite");
    let (status, _) = app.send("POST", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::CREATED);
    let uri = format!("/api/recipes/{id}/shopping_cart");
    let (status, _) = app.send("POST", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, page) = app.send("GET", "/api/recipes", None, None).await;
    assert_eq!(page["count"], 1);
    for recipe in page["results"].as_array().unwrap() {
        assert_eq!(recipe["is_favorited"], false);
        assert_eq!(recipe["is_in_shopping_cart"], false);
    }

    let (_, page) = app.send("GET", "/api/recipes", Some(&token), None).await;
    assert_eq!(page["results"][0]["is_favorited"], true);
    assert_eq!(page["results"][0]["is_in_shopping_cart"], true);
}

#[tokio::test]
async fn test_favorite_twice_conflicts() {
    let app = spawn_app().await;
    let (_, token) = app.signup("heidi").await;
    let id = app.create_recipe(&token, "Toast", &[(app.flour, 10)]).await;
    let uri = format!("/api/recipes/{id}/favorite");

    let (status, short) = app.send("POST", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(short["id"].as_i64(), Some(id));
    assert_eq!(short["cooking_time"], 25);

    let (status, body) = app.send("POST", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["detail"].is_string());

    let (status, _) = app.send("DELETE", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // Removing a recipe that is not on the list still succeeds.
    let (status, _) = app.send("DELETE", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // Removing from one list leaves the other untouched.
    let cart = format!("/api/recipes/{id}/shopping_cart");
    let (status, _) = app.send("DELETE", &cart, Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app.send("POST", &cart, Some(&token), None).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = app.send("DELETE", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, recipe) = app
        .send("GET", &format!("/api/recipes/{id}"), Some(&token), None)
        .await;
    assert_eq!(recipe["is_favorited"], false);
    assert_eq!(recipe["is_in_shopping_cart"], true);

    for method in ["POST", "DELETE"] {
        for list in ["favorite", "shopping_cart"] {
            let (status, _) = app
                .send(method, &format!("/api/recipes/9999/{list}"), Some(&token), None)
                .await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{method} {list}");
        }
    }
}

#[tokio::test]
async fn test_list_filters() {
    let app = spawn_app().await;
    let (alice, alice_token) = app.signup("ivan").await;
    let (_, bob_token) = app.signup("judy").await;

    let first = app
        .create_recipe(&alice_token, "Waffles", &[(app.flour, 100)])
        .await;
    let mut body = app.recipe_body("Stew", &[(app.eggs, 2)]);
    body["tags"] = json!([app.dinner]);
    let (status, _) = app
        .send("POST", "/api/recipes", Some(&bob_token), Some(body))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, page) = app
        .send("GET", &format!("/api/recipes?author={alice}"), None, None)
        .await;
    assert_eq!(page["count"], 1);
    assert_eq!(page["results"][0]["id"].as_i64(), Some(first));

    let (_, page) = app
        .send("GET", "/api/recipes?tags=dinner", None, None)
        .await;
    assert_eq!(page["count"], 1);
    assert_eq!(page["results"][0]["name"], "Stew");

    let (_, page) = app
        .send("GET", "/api/recipes?tags=dinner&tags=breakfast", None, None)
        .await;
    assert_eq!(page["count"], 2);

    app.send(
        "POST",
        &format!("/api/recipes/{first}/favorite"),
        Some(&bob_token),
        None,
    )
    .await;
    let (_, page) = app
        .send("GET", "/api/recipes?is_favorited=1", Some(&bob_token), None)
        .await;
    assert_eq!(page["count"], 1);
    assert_eq!(page["results"][0]["id"].as_i64(), Some(first));
}

#[tokio::test]
async fn test_update_replaces_ingredients() {
    let app = spawn_app().await;
    let (_, token) = app.signup("mallory").await;
    let id = app
        .create_recipe(&token, "Crepes", &[(app.flour, 150), (app.eggs, 2)])
        .await;

    let mut body = app.recipe_body("Crepes", &[(app.eggs, 4)]);
    body.as_object_mut().unwrap().remove("image");
    let (status, recipe) = app
        .send("PATCH", &format!("/api/recipes/{id}"), Some(&token), Some(body))
        .await;
    assert_eq!(status, StatusCode::OK, "update failed: {recipe}");

    let ingredients = recipe["ingredients"].as_array().unwrap();
    assert_eq!(ingredients.len(), 1);
    assert_eq!(ingredients[0]["id"].as_i64(), Some(i64::from(app.eggs)));
    assert_eq!(ingredients[0]["amount"], 4);
}

#[tokio::test]
async fn test_only_author_may_modify() {
    let app = spawn_app().await;
    let (_, author_token) = app.signup("niaj").await;
    let (_, other_token) = app.signup("olivia").await;
    let id = app
        .create_recipe(&author_token, "Muffins", &[(app.flour, 300)])
        .await;
    let uri = format!("/api/recipes/{id}");

    let body = app.recipe_body("Stolen Muffins", &[(app.flour, 1)]);
    let (status, _) = app.send("PATCH", &uri, Some(&other_token), Some(body)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.send("DELETE", &uri, Some(&other_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.send("DELETE", &uri, Some(&author_token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.send("GET", &uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_shopping_list_aggregates_shared_ingredients() {
    let app = spawn_app().await;
    let (_, token) = app.signup("peggy").await;
    let bread = app
        .create_recipe(&token, "Bread", &[(app.flour, 500), (app.eggs, 1)])
        .await;
    let cake = app
        .create_recipe(&token, "Cake", &[(app.flour, 200), (app.eggs, 3)])
        .await;

    for id in [bread, cake] {
        let (status, _) = app
            .send(
                "POST",
                &format!("/api/recipes/{id}/shopping_cart"),
                Some(&token),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let request = Request::builder()
        .uri("/api/recipes/download_shopping_cart")
        .header(header::AUTHORIZATION, format!("Token {token}"))
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/plain; charset=utf-8"
    );
    assert!(
        response.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .starts_with("attachment;")
    );

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert_eq!(text, "Flour: 700 g\nEggs: 4 pcs\n");

    let (status, _) = app
        .send("GET", "/api/recipes/download_shopping_cart", None, None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_subscriptions() {
    let app = spawn_app().await;
    let (reader_id, reader) = app.signup("rupert").await;
    let (author_id, author) = app.signup("sybil").await;
    app.create_recipe(&author, "Soup", &[(app.flour, 10)]).await;
    app.create_recipe(&author, "Salad", &[(app.eggs, 2)]).await;

    let (status, body) = app
        .send(
            "POST",
            &format!("/api/users/{reader_id}/subscribe"),
            Some(&reader),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["non_field_errors"].is_array());

    let uri = format!("/api/users/{author_id}/subscribe?recipes_limit=1");
    let (status, body) = app.send("POST", &uri, Some(&reader), None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["is_subscribed"], true);
    assert_eq!(body["recipes_count"], 2);
    assert_eq!(body["recipes"].as_array().unwrap().len(), 1);
    assert_eq!(body["recipes"][0]["name"], "Salad");

    let (status, _) = app.send("POST", &uri, Some(&reader), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, page) = app
        .send("GET", "/api/users/subscriptions", Some(&reader), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["count"], 1);
    assert_eq!(page["results"][0]["id"].as_i64(), Some(author_id));
    assert_eq!(page["results"][0]["recipes"].as_array().unwrap().len(), 2);

    let (_, profile) = app
        .send("GET", &format!("/api/users/{author_id}"), Some(&reader), None)
        .await;
    assert_eq!(profile["is_subscribed"], true);

    let (status, _) = app
        .send(
            "DELETE",
            &format!("/api/users/{author_id}/subscribe"),
            Some(&reader),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, page) = app
        .send("GET", "/api/users/subscriptions", Some(&reader), None)
        .await;
    assert_eq!(page["count"], 0);

    let (status, _) = app
        .send(
            "DELETE",
            &format!("/api/users/{author_id}/subscribe"),
            Some(&reader),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app
        .send("DELETE", "/api/users/9999/subscribe", Some(&reader), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app
        .send(
            "GET",
            "/api/users/subscriptions?recipes_limit=lots",
            Some(&reader),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["recipes_limit"].is_array());
}

#[tokio::test]
async fn test_deleting_author_keeps_recipe() {
    let app = spawn_app().await;
    let (author_id, token) = app.signup("trent").await;
    let id = app.create_recipe(&token, "Pie", &[(app.flour, 250)]).await;

    let author_id = i32::try_from(author_id).unwrap();
    assert!(app.state.store().delete_user(author_id).await.unwrap());

    let (status, recipe) = app
        .send("GET", &format!("/api/recipes/{id}"), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(recipe["author"].is_null());
}

#[tokio::test]
async fn test_pagination() {
    let app = spawn_app().await;
    let (_, token) = app.signup("victor").await;
    for name in ["One", "Two", "Three"] {
        app.create_recipe(&token, name, &[(app.flour, 1)]).await;
    }

    let (status, page) = app.send("GET", "/api/recipes?limit=2", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["count"], 3);
    assert_eq!(page["results"].as_array().unwrap().len(), 2);
    assert_eq!(page["results"][0]["name"], "Three");
    assert_eq!(page["next"], "/api/recipes?limit=2&page=2");
    assert!(page["previous"].is_null());

    let (status, page) = app
        .send("GET", "/api/recipes?limit=2&page=2", None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["results"].as_array().unwrap().len(), 1);
    assert_eq!(page["previous"], "/api/recipes?limit=2");

    for uri in [
        "/api/recipes?page=9",
        "/api/recipes?page=9223372036854775807",
        "/api/recipes?page=18446744073709551615&limit=100",
        "/api/users?page=9223372036854775807",
        "/api/users?page=abc",
    ] {
        let (status, body) = app.send("GET", uri, None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        assert_eq!(body["detail"], "Invalid page.", "{uri}");
    }

    let (status, users) = app.send("GET", "/api/users", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(users["count"], 1);
}

#[tokio::test]
async fn test_health_probes() {
    let app = spawn_app().await;

    let (status, body) = app.send("GET", "/api/health/live", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "alive");

    let (status, body) = app.send("GET", "/api/health/ready", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database"], true);
}
