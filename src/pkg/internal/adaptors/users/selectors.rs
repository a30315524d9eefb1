use sqlx::PgConnection;
use uuid::Uuid;

use crate::{pkg::internal::adaptors::users::spec::UserEntry, prelude::Result};

pub struct UserSelector<'a> {
    pool: &'a mut PgConnection,
}

impl<'a> UserSelector<'a> {
    pub fn new(pool: &'a mut PgConnection) -> Self {
        UserSelector { pool }
    }

    pub async fn get_by_id(&mut self, id: Uuid) -> Result<Option<UserEntry>> {
        let row = sqlx::query_as::<_, UserEntry>(
            r#"
            SELECT id, email, password_hash, role, name, phone, is_verified, is_active,
                   last_login_at, created_at, updated_at
            FROM users WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *self.pool)
        .await?;
        Ok(row)
    }

    pub async fn get_by_email(&mut self, email: &str) -> Result<Option<UserEntry>> {
        let row = sqlx::query_as::<_, UserEntry>(
            r#"
            SELECT id, email, password_hash, role, name, phone, is_verified, is_active,
                   last_login_at, created_at, updated_at
            FROM users WHERE lower(email) = lower($1)
            "#,
        )
        .bind(email)
        .fetch_optional(&mut *self.pool)
        .await?;
        Ok(row)
    }
}
