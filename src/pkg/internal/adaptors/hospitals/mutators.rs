use sqlx::PgConnection;
use uuid::Uuid;

use crate::prelude::Result;

pub struct HospitalMutator<'a> {
    pool: &'a mut PgConnection,
}

impl<'a> HospitalMutator<'a> {
    pub fn new(pool: &'a mut PgConnection) -> Self {
        HospitalMutator { pool }
    }

    /// The first admin bound to a hospital becomes its primary admin.
    pub async fn bind_admin(&mut self, user_id: Uuid, hospital_id: Uuid) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO hospital_admins (id, user_id, hospital_id, role, is_primary)
            VALUES ($1, $2, $3, 'admin',
                NOT EXISTS (SELECT 1 FROM hospital_admins WHERE hospital_id = $3))
            ON CONFLICT (user_id, hospital_id) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(hospital_id)
        .execute(&mut *self.pool)
        .await?;
        Ok(())
    }
}
