use chrono::{DateTime, Utc};
use sqlx::{PgConnection, types::Json};
use uuid::Uuid;

use crate::pkg::internal::adaptors::jobs::spec::JobPosting;
use crate::prelude::Result;

pub struct JobMutator<'a> {
    pool: &'a mut PgConnection,
}

impl<'a> JobMutator<'a> {
    pub fn new(pool: &'a mut PgConnection) -> Self {
        JobMutator { pool }
    }

    pub async fn create(&mut self, job: &JobPosting) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO job_postings (id, hospital_id, created_by, county, township,
                professional_type, specialty, number_of_positions, job_type, service_type,
                service_days, service_start_date, service_end_date, is_public_funded,
                meal_provided, accommodation_provided, transportation_provided, salary_amount,
                salary_currency, salary_unit, contact_name, contact_phone, contact_email, remarks,
                requirements, status, published_at, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17,
                $18, $19, $20, $21, $22, $23, $24, $25, $26, $27, $28, $29)
            "#,
        )
        .bind(job.id)
        .bind(job.hospital_id)
        .bind(job.created_by)
        .bind(&job.county)
        .bind(&job.township)
        .bind(job.professional_type)
        .bind(&job.specialty)
        .bind(job.number_of_positions)
        .bind(job.job_type)
        .bind(job.service_type)
        .bind(Json(&job.service_days))
        .bind(job.service_start_date)
        .bind(job.service_end_date)
        .bind(job.is_public_funded)
        .bind(job.meal_provided)
        .bind(job.accommodation_provided)
        .bind(job.transportation_provided)
        .bind(job.salary.as_ref().map(|s| s.amount))
        .bind(
            job.salary
                .as_ref()
                .map_or_else(|| "TWD".to_string(), |s| s.currency.clone()),
        )
        .bind(job.salary.as_ref().map(|s| s.unit.clone()))
        .bind(job.contact.as_ref().map(|c| c.name.clone()))
        .bind(job.contact.as_ref().map(|c| c.phone.clone()))
        .bind(job.contact.as_ref().and_then(|c| c.email.clone()))
        .bind(&job.remarks)
        .bind(&job.requirements)
        .bind(job.status)
        .bind(job.published_at)
        .bind(job.created_at)
        .bind(job.updated_at)
        .execute(&mut *self.pool)
        .await?;
        Ok(())
    }

    pub async fn update(&mut self, job: &JobPosting) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE job_postings
            SET county = $2, township = $3, professional_type = $4, specialty = $5,
                number_of_positions = $6, job_type = $7, service_type = $8, service_days = $9,
                service_start_date = $10, service_end_date = $11, is_public_funded = $12,
                meal_provided = $13, accommodation_provided = $14, transportation_provided = $15,
                salary_amount = $16, salary_currency = $17, salary_unit = $18, contact_name = $19,
                contact_phone = $20, contact_email = $21, remarks = $22, requirements = $23,
                status = $24, closed_at = $25, updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(job.id)
        .bind(&job.county)
        .bind(&job.township)
        .bind(job.professional_type)
        .bind(&job.specialty)
        .bind(job.number_of_positions)
        .bind(job.job_type)
        .bind(job.service_type)
        .bind(Json(&job.service_days))
        .bind(job.service_start_date)
        .bind(job.service_end_date)
        .bind(job.is_public_funded)
        .bind(job.meal_provided)
        .bind(job.accommodation_provided)
        .bind(job.transportation_provided)
        .bind(job.salary.as_ref().map(|s| s.amount))
        .bind(
            job.salary
                .as_ref()
                .map_or_else(|| "TWD".to_string(), |s| s.currency.clone()),
        )
        .bind(job.salary.as_ref().map(|s| s.unit.clone()))
        .bind(job.contact.as_ref().map(|c| c.name.clone()))
        .bind(job.contact.as_ref().map(|c| c.phone.clone()))
        .bind(job.contact.as_ref().and_then(|c| c.email.clone()))
        .bind(&job.remarks)
        .bind(&job.requirements)
        .bind(job.status)
        .bind(job.closed_at)
        .execute(&mut *self.pool)
        .await?;
        Ok(())
    }

    pub async fn soft_delete(&mut self, id: Uuid, at: DateTime<Utc>) -> Result<()> {
        sqlx::query("UPDATE job_postings SET deleted_at = $2, updated_at = $2 WHERE id = $1")
            .bind(id)
            .bind(at)
            .execute(&mut *self.pool)
            .await?;
        Ok(())
    }

    pub async fn increment_views(&mut self, id: Uuid) -> Result<()> {
        sqlx::query("UPDATE job_postings SET views_count = views_count + 1 WHERE id = $1")
            .bind(id)
            .execute(&mut *self.pool)
            .await?;
        Ok(())
    }

    pub async fn increment_applications(&mut self, id: Uuid) -> Result<()> {
        sqlx::query(
            "UPDATE job_postings SET applications_count = applications_count + 1 WHERE id = $1",
        )
        .bind(id)
        .execute(&mut *self.pool)
        .await?;
        Ok(())
    }
}
