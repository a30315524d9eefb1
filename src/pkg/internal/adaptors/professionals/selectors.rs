use sqlx::PgConnection;
use uuid::Uuid;

use crate::{pkg::internal::adaptors::professionals::spec::ProfessionalEntry, prelude::Result};

pub struct ProfessionalSelector<'a> {
    pool: &'a mut PgConnection,
}

impl<'a> ProfessionalSelector<'a> {
    pub fn new(pool: &'a mut PgConnection) -> Self {
        ProfessionalSelector { pool }
    }

    pub async fn get_by_id(&mut self, id: Uuid) -> Result<Option<ProfessionalEntry>> {
        let row = sqlx::query_as::<_, ProfessionalEntry>(
            r#"
            SELECT id, user_id, id_number, professional_type, license_number, specialties,
                   years_of_experience, current_hospital, available_for_support, available_regions,
                   available_days, bio, completion_rate, rating, total_applications,
                   total_completed_jobs, created_at, updated_at
            FROM professional_profiles WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *self.pool)
        .await?;
        Ok(row)
    }

    pub async fn get_by_user(&mut self, user_id: Uuid) -> Result<Option<ProfessionalEntry>> {
        let row = sqlx::query_as::<_, ProfessionalEntry>(
            r#"
            SELECT id, user_id, id_number, professional_type, license_number, specialties,
                   years_of_experience, current_hospital, available_for_support, available_regions,
                   available_days, bio, completion_rate, rating, total_applications,
                   total_completed_jobs, created_at, updated_at
            FROM professional_profiles WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&mut *self.pool)
        .await?;
        Ok(row)
    }
}
