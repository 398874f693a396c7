use anyhow::{Context, Result};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, sea_query::OnConflict,
};

use crate::entities::{auth_tokens, prelude::*, users};

pub struct TokenRepository {
    conn: DatabaseConnection,
}

impl TokenRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Return the user's token, issuing one on first login. A user holds at
    /// most one token, so repeated logins hand back the same key.
    pub async fn get_or_create(&self, user_id: i32) -> Result<String> {
        if let Some(existing) = self.find_for_user(user_id).await? {
            return Ok(existing.key);
        }

        let active = auth_tokens::ActiveModel {
            key: Set(generate_token()),
            user_id: Set(user_id),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
        };

        AuthTokens::insert(active)
            .on_conflict(
                OnConflict::column(auth_tokens::Column::UserId)
                    .do_nothing()
                    .to_owned(),
            )
            .do_nothing()
            .exec(&self.conn)
            .await
            .context("Failed to store auth token")?;

        // Re-read so a concurrent login that won the insert is honored.
        self.find_for_user(user_id)
            .await?
            .map(|t| t.key)
            .ok_or_else(|| anyhow::anyhow!("Token for user {user_id} vanished after insert"))
    }

    async fn find_for_user(&self, user_id: i32) -> Result<Option<auth_tokens::Model>> {
        Ok(AuthTokens::find()
            .filter(auth_tokens::Column::UserId.eq(user_id))
            .one(&self.conn)
            .await?)
    }

    pub async fn find_user(&self, key: &str) -> Result<Option<users::Model>> {
        let found = AuthTokens::find_by_id(key.to_string())
            .find_also_related(Users)
            .one(&self.conn)
            .await
            .context("Failed to query auth token")?;

        Ok(found.and_then(|(_, user)| user))
    }

    pub async fn delete_for_user(&self, user_id: i32) -> Result<u64> {
        let result = AuthTokens::delete_many()
            .filter(auth_tokens::Column::UserId.eq(user_id))
            .exec(&self.conn)
            .await?;
        Ok(result.rows_affected)
    }
}

/// Generate a random token key (40 character hex string)
#[must_use]
pub fn generate_token() -> String {
    use rand::Rng;

    let mut rng = rand::rng();
    let bytes: [u8; 20] = rng.random();

    bytes.iter().fold(String::with_capacity(40), |mut acc, b| {
        use std::fmt::Write;
        let _ = write!(acc, "{b:02x}");
        acc
    })
}
