//! Store-level tests for list membership, subscriptions and cascades.

use foodgram::config::SecurityConfig;
use foodgram::db::Store;
use foodgram::models::PageRequest;
use foodgram::models::recipe::{IngredientAmount, RecipeFilter, RecipeInput, RecipeList};
use foodgram::models::user::NewUser;

fn fast_security() -> SecurityConfig {
    SecurityConfig {
        argon2_memory_cost_kib: 1024,
        argon2_time_cost: 1,
        argon2_parallelism: 1,
        ..SecurityConfig::default()
    }
}

async fn open_store() -> Store {
    let db_path = std::env::temp_dir().join(format!(
        "foodgram-store-test-{}.db",
        uuid::Uuid::new_v4()
    ));
    Store::new(&format!("sqlite:{}", db_path.display()))
        .await
        .expect("failed to open store")
}

async fn add_user(store: &Store, username: &str) -> i32 {
    store
        .create_user(
            NewUser {
                email: format!("{username}@example.com"),
                username: username.to_string(),
                first_name: "Store".to_string(),
                last_name: "Test".to_string(),
                password: "store-pass-1".to_string(),
            },
            &fast_security(),
        )
        .await
        .unwrap()
        .expect("user should be new")
        .id
}

async fn flags(store: &Store, viewer: i32, recipe: i32) -> (bool, bool) {
    store
        .get_recipe_annotated(recipe, Some(viewer))
        .await
        .unwrap()
        .map(|row| (row.is_favorited, row.is_in_shopping_cart))
        .unwrap_or_default()
}

async fn follows(store: &Store, viewer: i32, author: i32) -> bool {
    store
        .get_user_annotated(author, Some(viewer))
        .await
        .unwrap()
        .is_some_and(|row| row.is_subscribed)
}

async fn add_recipe(store: &Store, author: i32, name: &str) -> i32 {
    let tag = store.create_tag(name, None, &name.to_lowercase()).await.unwrap();
    let salt = store.create_ingredient(&format!("{name} salt"), "g").await.unwrap();

    let input = RecipeInput {
        name: name.to_string(),
        text: "Season well.".to_string(),
        cooking_time: 10,
        image: None,
        ingredients: vec![IngredientAmount {
            ingredient_id: salt.id,
            amount: 5,
        }],
        tags: vec![tag.id],
    };

    store
        .create_recipe(author, &input, "recipes/test.png")
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn test_duplicate_user_returns_none() {
    let store = open_store().await;
    add_user(&store, "quinn").await;

    let again = store
        .create_user(
            NewUser {
                email: "quinn@example.com".to_string(),
                username: "quinn2".to_string(),
                first_name: "Q".to_string(),
                last_name: "Q".to_string(),
                password: "store-pass-1".to_string(),
            },
            &fast_security(),
        )
        .await
        .unwrap();
    assert!(again.is_none());
}

#[tokio::test]
async fn test_recipe_lists_are_independent() {
    let store = open_store().await;
    let user = add_user(&store, "uma").await;
    let recipe = add_recipe(&store, user, "Broth").await;

    assert!(
        store
            .add_to_recipe_list(RecipeList::Favorites, user, recipe)
            .await
            .unwrap()
    );
    assert!(
        !store
            .add_to_recipe_list(RecipeList::Favorites, user, recipe)
            .await
            .unwrap()
    );
    assert_eq!(flags(&store, user, recipe).await, (true, false));

    let removed = store
        .remove_from_recipe_list(RecipeList::ShoppingCart, user, recipe)
        .await
        .unwrap();
    assert_eq!(removed, 0);
    assert_eq!(flags(&store, user, recipe).await, (true, false));
}

#[tokio::test]
async fn test_deleting_recipe_clears_list_rows() {
    let store = open_store().await;
    let user = add_user(&store, "walter").await;
    let recipe = add_recipe(&store, user, "Gravy").await;

    store
        .add_to_recipe_list(RecipeList::ShoppingCart, user, recipe)
        .await
        .unwrap();
    assert_eq!(store.shopping_list(user).await.unwrap().len(), 1);
    assert_eq!(flags(&store, user, recipe).await, (false, true));

    assert!(store.delete_recipe(recipe).await.unwrap());
    assert!(store.get_recipe(recipe).await.unwrap().is_none());
    assert!(store.shopping_list(user).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_subscription_roundtrip() {
    let store = open_store().await;
    let reader = add_user(&store, "xena").await;
    let author = add_user(&store, "yusuf").await;

    assert!(store.subscribe(reader, author).await.unwrap());
    assert!(!store.subscribe(reader, author).await.unwrap());
    assert!(follows(&store, reader, author).await);
    assert!(!follows(&store, author, reader).await);

    let page = store
        .list_subscriptions(reader, PageRequest { page: 1, size: 6 })
        .await
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].id, author);
    assert!(page.items[0].is_subscribed);

    assert_eq!(store.unsubscribe(reader, author).await.unwrap(), 1);
    assert!(!follows(&store, reader, author).await);
    assert_eq!(store.unsubscribe(reader, author).await.unwrap(), 0);
}

#[tokio::test]
async fn test_deleting_user_orphans_recipes() {
    let store = open_store().await;
    let author = add_user(&store, "zoe").await;
    let recipe = add_recipe(&store, author, "Chowder").await;

    assert!(store.delete_user(author).await.unwrap());

    let row = store.get_recipe(recipe).await.unwrap().unwrap();
    assert!(row.author_id.is_none());

    let page = store
        .list_recipes(&RecipeFilter::default(), None, PageRequest { page: 1, size: 6 })
        .await
        .unwrap();
    assert_eq!(page.total, 1);
}
