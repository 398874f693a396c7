//! `SeaORM` implementation of the `AuthService` trait.

use crate::db::Store;
use crate::services::auth_service::{AuthError, AuthService, AuthUser};
use async_trait::async_trait;
use tracing::info;

pub struct SeaOrmAuthService {
    store: Store,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn login(&self, email: &str, password: &str) -> Result<String, AuthError> {
        let user = self
            .store
            .verify_user_credentials(email, password)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let token = self.store.obtain_token(user.id).await?;
        info!(user_id = user.id, "User logged in");

        Ok(token)
    }

    async fn logout(&self, user_id: i32) -> Result<(), AuthError> {
        self.store.revoke_token(user_id).await?;
        info!(user_id, "User logged out");
        Ok(())
    }

    async fn authenticate(&self, token: &str) -> Result<AuthUser, AuthError> {
        let user = self
            .store
            .user_by_token(token)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        Ok(AuthUser {
            id: user.id,
            username: user.username,
            email: user.email,
        })
    }
}
