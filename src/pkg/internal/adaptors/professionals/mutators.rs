use sqlx::{PgConnection, types::Json};
use uuid::Uuid;

use crate::{pkg::internal::adaptors::professionals::spec::ProfessionalEntry, prelude::Result};

pub struct ProfessionalMutator<'a> {
    pool: &'a mut PgConnection,
}

impl<'a> ProfessionalMutator<'a> {
    pub fn new(pool: &'a mut PgConnection) -> Self {
        ProfessionalMutator { pool }
    }

    pub async fn create(&mut self, profile: &ProfessionalEntry) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO professional_profiles (id, user_id, id_number, professional_type,
                license_number, specialties, available_for_support, available_regions,
                available_days, completion_rate)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(profile.id)
        .bind(profile.user_id)
        .bind(&profile.id_number)
        .bind(profile.professional_type)
        .bind(&profile.license_number)
        .bind(Json(&profile.specialties))
        .bind(profile.available_for_support)
        .bind(Json(&profile.available_regions))
        .bind(Json(&profile.available_days))
        .bind(profile.completion_rate)
        .execute(&mut *self.pool)
        .await?;
        Ok(())
    }

    pub async fn update(&mut self, profile: &ProfessionalEntry) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE professional_profiles
            SET specialties = $2, years_of_experience = $3, current_hospital = $4,
                available_for_support = $5, available_regions = $6, available_days = $7,
                bio = $8, completion_rate = $9, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(profile.id)
        .bind(Json(&profile.specialties))
        .bind(profile.years_of_experience)
        .bind(&profile.current_hospital)
        .bind(profile.available_for_support)
        .bind(Json(&profile.available_regions))
        .bind(Json(&profile.available_days))
        .bind(&profile.bio)
        .bind(profile.completion_rate)
        .execute(&mut *self.pool)
        .await?;
        Ok(())
    }

    pub async fn increment_total_applications(&mut self, id: Uuid) -> Result<()> {
        sqlx::query(
            "UPDATE professional_profiles SET total_applications = total_applications + 1 WHERE id = $1",
        )
        .bind(id)
        .execute(&mut *self.pool)
        .await?;
        Ok(())
    }
}
