//! Account bootstrap commands

use crate::api::types::RegisterRequest;
use crate::config::Config;
use crate::db::Store;

pub async fn cmd_create_user(
    config: &Config,
    email: &str,
    username: &str,
    first_name: &str,
    last_name: &str,
    password: &str,
) -> anyhow::Result<()> {
    let request = RegisterRequest {
        email: Some(email.to_string()),
        username: Some(username.to_string()),
        first_name: Some(first_name.to_string()),
        last_name: Some(last_name.to_string()),
        password: Some(password.to_string()),
    };

    let new_user = match request.into_new_user(config.security.min_password_length) {
        Ok(user) => user,
        Err(errors) => {
            println!("Invalid account details: {errors}");
            return Ok(());
        }
    };

    let store = Store::new(&config.general.database_path).await?;

    if store.email_taken(&new_user.email).await? {
        println!("A user with email {} already exists.", new_user.email);
        return Ok(());
    }
    if store.username_taken(&new_user.username).await? {
        println!("A user named {} already exists.", new_user.username);
        return Ok(());
    }

    match store.create_user(new_user, &config.security).await? {
        Some(user) => println!("✓ Created user #{} ({})", user.id, user.username),
        None => println!("A user with that email or username already exists."),
    }

    Ok(())
}

pub async fn cmd_list_users(config: &Config) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;
    let users = store.list_all_users().await?;

    if users.is_empty() {
        println!("No users registered.");
        println!();
        println!("Create one with: foodgram create-user --email ... --username ...");
        return Ok(());
    }

    println!("Users ({} total)", users.len());
    println!("{:-<70}", "");

    for user in users {
        println!(
            "#{:<5} {:<20} {:<30} {} {}",
            user.id, user.username, user.email, user.first_name, user.last_name
        );
    }

    Ok(())
}
