use sqlx::PgConnection;

use crate::{
    pkg::internal::adaptors::applications::spec::{Application, ApplicationStatus},
    prelude::Result,
};

pub struct ApplicationMutator<'a> {
    pool: &'a mut PgConnection,
}

impl<'a> ApplicationMutator<'a> {
    pub fn new(pool: &'a mut PgConnection) -> Self {
        ApplicationMutator { pool }
    }

    pub async fn create(&mut self, application: &Application) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO applications (id, job_id, professional_id, user_id, cover_letter,
                available_start_date, status, applied_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(application.id)
        .bind(application.job_id)
        .bind(application.professional_id)
        .bind(application.user_id)
        .bind(&application.cover_letter)
        .bind(application.available_start_date)
        .bind(application.status)
        .bind(application.applied_at)
        .bind(application.updated_at)
        .execute(&mut *self.pool)
        .await?;
        Ok(())
    }

    pub async fn transition(
        &mut self,
        application: &Application,
        expected: ApplicationStatus,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE applications
            SET status = $2, review_note = $3, reviewed_by = $4, reviewed_at = $5, updated_at = NOW()
            WHERE id = $1 AND status = $6
            "#,
        )
        .bind(application.id)
        .bind(application.status)
        .bind(&application.review_note)
        .bind(application.reviewed_by)
        .bind(application.reviewed_at)
        .bind(expected)
        .execute(&mut *self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
