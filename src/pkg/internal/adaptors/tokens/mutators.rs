use sqlx::PgConnection;
use uuid::Uuid;

use crate::{
    pkg::internal::adaptors::tokens::spec::{NewRefreshToken, RefreshTokenEntry},
    prelude::Result,
};

pub struct TokenMutator<'a> {
    pool: &'a mut PgConnection,
}

impl<'a> TokenMutator<'a> {
    pub fn new(pool: &'a mut PgConnection) -> Self {
        TokenMutator { pool }
    }

    pub async fn create(&mut self, token: &NewRefreshToken) -> Result<RefreshTokenEntry> {
        let row = sqlx::query_as::<_, RefreshTokenEntry>(
            r#"
            INSERT INTO refresh_tokens (id, user_id, token_hash, expires_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, token_hash, expires_at, is_revoked, created_at
            "#,
        )
        .bind(token.id)
        .bind(token.user_id)
        .bind(&token.token_hash)
        .bind(token.expires_at)
        .fetch_one(&mut *self.pool)
        .await?;
        Ok(row)
    }

    pub async fn revoke(&mut self, id: Uuid) -> Result<bool> {
        let result =
            sqlx::query("UPDATE refresh_tokens SET is_revoked = true WHERE id = $1 AND is_revoked = false")
                .bind(id)
                .execute(&mut *self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn revoke_for_user(&mut self, user_id: Uuid) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET is_revoked = true WHERE user_id = $1 AND is_revoked = false",
        )
        .bind(user_id)
        .execute(&mut *self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}
