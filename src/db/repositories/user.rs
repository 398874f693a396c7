use anyhow::{Context, Result};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, Set,
};
use tokio::task;

use super::annotations;
use crate::config::SecurityConfig;
use crate::db::is_unique_violation;
use crate::entities::{prelude::*, users};
use crate::models::user::NewUser;
use crate::models::{PageRequest, Paged};

/// Public user columns plus whether the current viewer follows them.
#[derive(Debug, Clone, FromQueryResult)]
pub struct UserRow {
    pub id: i32,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_subscribed: bool,
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn annotated(viewer: Option<i32>) -> Select<Users> {
        Users::find()
            .select_only()
            .column(users::Column::Id)
            .column(users::Column::Email)
            .column(users::Column::Username)
            .column(users::Column::FirstName)
            .column(users::Column::LastName)
            .column_as(annotations::is_subscribed(viewer), "is_subscribed")
    }

    /// Insert a new account. Returns `None` when the email or username was
    /// taken by a concurrent registration.
    pub async fn create(
        &self,
        user: NewUser,
        security: &SecurityConfig,
    ) -> Result<Option<users::Model>> {
        let password = user.password;
        let config = security.clone();
        let password_hash = task::spawn_blocking(move || hash_password(&password, Some(&config)))
            .await
            .context("Password hashing task panicked")??;

        let active = users::ActiveModel {
            username: Set(user.username),
            email: Set(user.email),
            first_name: Set(user.first_name),
            last_name: Set(user.last_name),
            password_hash: Set(password_hash),
            date_joined: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };

        match active.insert(&self.conn).await {
            Ok(model) => Ok(Some(model)),
            Err(err) if is_unique_violation(&err) => Ok(None),
            Err(err) => Err(err).context("Failed to insert user"),
        }
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Option<users::Model>> {
        Users::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user by ID")
    }

    pub async fn username_exists(&self, username: &str) -> Result<bool> {
        let count = Users::find()
            .filter(users::Column::Username.eq(username))
            .count(&self.conn)
            .await?;
        Ok(count > 0)
    }

    pub async fn email_exists(&self, email: &str) -> Result<bool> {
        let count = Users::find()
            .filter(users::Column::Email.eq(email))
            .count(&self.conn)
            .await?;
        Ok(count > 0)
    }

    pub async fn list_all(&self) -> Result<Vec<users::Model>> {
        Ok(Users::find()
            .order_by_asc(users::Column::Id)
            .all(&self.conn)
            .await?)
    }

    pub async fn list_annotated(
        &self,
        viewer: Option<i32>,
        page: PageRequest,
    ) -> Result<Paged<UserRow>> {
        let paginator = Self::annotated(viewer)
            .order_by_asc(users::Column::Id)
            .into_model::<UserRow>()
            .paginate(&self.conn, page.size);

        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.index()).await?;

        Ok(Paged { items, total })
    }

    pub async fn get_annotated(&self, id: i32, viewer: Option<i32>) -> Result<Option<UserRow>> {
        Ok(Self::annotated(viewer)
            .filter(users::Column::Id.eq(id))
            .into_model::<UserRow>()
            .one(&self.conn)
            .await?)
    }

    pub async fn get_many_annotated(&self, ids: &[i32], viewer: Option<i32>) -> Result<Vec<UserRow>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        Ok(Self::annotated(viewer)
            .filter(users::Column::Id.is_in(ids.iter().copied()))
            .into_model::<UserRow>()
            .all(&self.conn)
            .await?)
    }

    /// Look up an account by email and check its password.
    /// Note: This uses `spawn_blocking` because Argon2 verification is CPU-intensive
    /// and would block the async runtime if run directly.
    pub async fn verify_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<users::Model>> {
        let user = Users::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.conn)
            .await
            .context("Failed to query user for password verification")?;

        let Some(user) = user else {
            return Ok(None);
        };

        if check_password(user.password_hash.clone(), password).await? {
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }

    pub async fn verify_password(&self, user_id: i32, password: &str) -> Result<bool> {
        let Some(user) = self.get_by_id(user_id).await? else {
            return Ok(false);
        };

        check_password(user.password_hash, password).await
    }

    pub async fn update_password(
        &self,
        user_id: i32,
        new_password: &str,
        config: &SecurityConfig,
    ) -> Result<()> {
        let user = self
            .get_by_id(user_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("User not found: {user_id}"))?;

        let password = new_password.to_string();
        let config = config.clone();
        let new_hash = task::spawn_blocking(move || hash_password(&password, Some(&config)))
            .await
            .context("Password hashing task panicked")??;

        let mut active: users::ActiveModel = user.into();
        active.password_hash = Set(new_hash);
        active.update(&self.conn).await?;

        Ok(())
    }

    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = Users::delete_by_id(id).exec(&self.conn).await?;
        Ok(result.rows_affected > 0)
    }
}

async fn check_password(password_hash: String, password: &str) -> Result<bool> {
    let password = password.to_string();

    task::spawn_blocking(move || {
        let parsed_hash = PasswordHash::new(&password_hash)
            .map_err(|e| anyhow::anyhow!("Invalid password hash format: {e}"))?;

        Ok::<bool, anyhow::Error>(
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed_hash)
                .is_ok(),
        )
    })
    .await
    .context("Password verification task panicked")?
}

/// Hash a password using Argon2id with optional custom params.
/// If config is None, uses the crate defaults.
pub fn hash_password(password: &str, config: Option<&SecurityConfig>) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let argon2 = if let Some(cfg) = config {
        let params = Params::new(
            cfg.argon2_memory_cost_kib,
            cfg.argon2_time_cost,
            cfg.argon2_parallelism,
            None,
        )
        .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;
        Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
    } else {
        Argon2::default()
    };

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_password_uses_configured_params() {
        let config = SecurityConfig {
            argon2_memory_cost_kib: 1024,
            argon2_time_cost: 1,
            argon2_parallelism: 1,
            ..SecurityConfig::default()
        };

        let hash = hash_password("correct horse", Some(&config)).unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(hash.contains("m=1024,t=1,p=1"));
    }

    #[tokio::test]
    async fn test_check_password() {
        let hash = hash_password("s3cret-pass", None).unwrap();
        assert!(check_password(hash.clone(), "s3cret-pass").await.unwrap());
        assert!(!check_password(hash, "wrong").await.unwrap());
    }
}
