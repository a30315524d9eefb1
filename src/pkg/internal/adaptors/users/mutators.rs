use sqlx::PgConnection;
use uuid::Uuid;

use crate::{
    pkg::internal::adaptors::users::spec::{NewUser, UserEntry},
    prelude::Result,
};

pub struct UserMutator<'a> {
    pool: &'a mut PgConnection,
}

impl<'a> UserMutator<'a> {
    pub fn new(pool: &'a mut PgConnection) -> Self {
        UserMutator { pool }
    }

    pub async fn create(&mut self, user: &NewUser) -> Result<UserEntry> {
        let row = sqlx::query_as::<_, UserEntry>(
            r#"
            INSERT INTO users (id, email, password_hash, role, name, phone)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, email, password_hash, role, name, phone, is_verified, is_active,
                      last_login_at, created_at, updated_at
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role)
        .bind(&user.name)
        .bind(&user.phone)
        .fetch_one(&mut *self.pool)
        .await?;
        Ok(row)
    }

    pub async fn touch_last_login(&mut self, id: Uuid) -> Result<()> {
        sqlx::query("UPDATE users SET last_login_at = NOW(), updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&mut *self.pool)
            .await?;
        Ok(())
    }

    pub async fn update_contact(
        &mut self,
        id: Uuid,
        name: Option<String>,
        phone: Option<String>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET name = COALESCE($2, name), phone = COALESCE($3, phone), updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(phone)
        .execute(&mut *self.pool)
        .await?;
        Ok(())
    }
}
