use sqlx::PgConnection;
use uuid::Uuid;

use crate::{pkg::internal::adaptors::tokens::spec::RefreshTokenEntry, prelude::Result};

pub struct TokenSelector<'a> {
    pool: &'a mut PgConnection,
}

impl<'a> TokenSelector<'a> {
    pub fn new(pool: &'a mut PgConnection) -> Self {
        TokenSelector { pool }
    }

    pub async fn latest_active(&mut self, user_id: Uuid) -> Result<Option<RefreshTokenEntry>> {
        let row = sqlx::query_as::<_, RefreshTokenEntry>(
            r#"
            SELECT id, user_id, token_hash, expires_at, is_revoked, created_at
            FROM refresh_tokens
            WHERE user_id = $1 AND is_revoked = false
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&mut *self.pool)
        .await?;
        Ok(row)
    }
}
