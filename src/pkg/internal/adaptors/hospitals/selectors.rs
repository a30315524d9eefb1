use sqlx::{PgConnection, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    pkg::internal::adaptors::{
        hospitals::spec::{HospitalAdminEntry, HospitalEntry, HospitalFilter},
        postgres::contains_pattern,
    },
    prelude::Result,
};

pub struct HospitalSelector<'a> {
    pool: &'a mut PgConnection,
}

impl<'a> HospitalSelector<'a> {
    pub fn new(pool: &'a mut PgConnection) -> Self {
        HospitalSelector { pool }
    }

    pub async fn get_by_id(&mut self, id: Uuid) -> Result<Option<HospitalEntry>> {
        let row = sqlx::query_as::<_, HospitalEntry>(
            r#"
            SELECT id, code, name, county, township, address, phone, hospital_type, is_active, created_at
            FROM hospitals WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *self.pool)
        .await?;
        Ok(row)
    }

    pub async fn get_by_code(&mut self, code: &str) -> Result<Option<HospitalEntry>> {
        let row = sqlx::query_as::<_, HospitalEntry>(
            r#"
            SELECT id, code, name, county, township, address, phone, hospital_type, is_active, created_at
            FROM hospitals WHERE code = $1
            "#,
        )
        .bind(code)
        .fetch_optional(&mut *self.pool)
        .await?;
        Ok(row)
    }

    pub async fn list(&mut self, filter: &HospitalFilter) -> Result<Vec<HospitalEntry>> {
        let mut query: QueryBuilder<Postgres> = QueryBuilder::new(
            "SELECT id, code, name, county, township, address, phone, hospital_type, is_active, created_at \
             FROM hospitals WHERE is_active = true",
        );
        if let Some(county) = &filter.county {
            query.push(" AND county = ").push_bind(county.clone());
        }
        if let Some(township) = &filter.township {
            query.push(" AND township = ").push_bind(township.clone());
        }
        if let Some(search) = &filter.search {
            query
                .push(" AND name ILIKE ")
                .push_bind(contains_pattern(search));
        }
        query.push(" ORDER BY name ASC");
        let rows = query
            .build_query_as::<HospitalEntry>()
            .fetch_all(&mut *self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn get_binding(
        &mut self,
        user_id: Uuid,
        hospital_id: Uuid,
    ) -> Result<Option<HospitalAdminEntry>> {
        let row = sqlx::query_as::<_, HospitalAdminEntry>(
            r#"
            SELECT id, user_id, hospital_id, role, is_primary, created_at
            FROM hospital_admins WHERE user_id = $1 AND hospital_id = $2
            "#,
        )
        .bind(user_id)
        .bind(hospital_id)
        .fetch_optional(&mut *self.pool)
        .await?;
        Ok(row)
    }

    pub async fn bindings_for_user(&mut self, user_id: Uuid) -> Result<Vec<HospitalAdminEntry>> {
        let rows = sqlx::query_as::<_, HospitalAdminEntry>(
            r#"
            SELECT id, user_id, hospital_id, role, is_primary, created_at
            FROM hospital_admins WHERE user_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&mut *self.pool)
        .await?;
        Ok(rows)
    }
}
