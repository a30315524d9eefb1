use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::prelude::Result;

#[derive(Debug, Clone, FromRow)]
pub struct RefreshTokenEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub is_revoked: bool,
    pub created_at: DateTime<Utc>,
}

impl RefreshTokenEntry {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

#[derive(Debug, Clone)]
pub struct NewRefreshToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
}

#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn insert_refresh_token(&self, token: NewRefreshToken) -> Result<RefreshTokenEntry>;
    /// Most recently issued non-revoked token of the user, expired or not.
    async fn latest_active_refresh_token(&self, user_id: Uuid)
    -> Result<Option<RefreshTokenEntry>>;
    /// Returns false when the token was already revoked.
    async fn revoke_refresh_token(&self, id: Uuid) -> Result<bool>;
    async fn revoke_user_refresh_tokens(&self, user_id: Uuid) -> Result<u64>;
}
