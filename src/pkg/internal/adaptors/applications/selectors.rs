use sqlx::{PgConnection, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    pkg::internal::{
        adaptors::applications::spec::{Application, ApplicationScope, ApplicationStatus},
        paging::PageRequest,
    },
    prelude::Result,
};

fn push_scope(
    query: &mut QueryBuilder<'_, Postgres>,
    scope: ApplicationScope,
    status: Option<ApplicationStatus>,
) {
    query.push(" FROM applications a JOIN job_postings j ON j.id = a.job_id WHERE true");
    match scope {
        ApplicationScope::Applicant(user_id) => {
            query.push(" AND a.user_id = ").push_bind(user_id);
        }
        ApplicationScope::Hospital(hospital_id) => {
            query.push(" AND j.hospital_id = ").push_bind(hospital_id);
        }
        ApplicationScope::Everything => {}
    }
    if let Some(status) = status {
        query.push(" AND a.status = ").push_bind(status);
    }
}

pub struct ApplicationSelector<'a> {
    pool: &'a mut PgConnection,
}

impl<'a> ApplicationSelector<'a> {
    pub fn new(pool: &'a mut PgConnection) -> Self {
        ApplicationSelector { pool }
    }

    pub async fn get_by_id(&mut self, id: Uuid) -> Result<Option<Application>> {
        let row = sqlx::query_as::<_, Application>(
            r#"
            SELECT id, job_id, professional_id, user_id, cover_letter, available_start_date,
                   status, review_note, reviewed_by, reviewed_at, applied_at, updated_at
            FROM applications WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *self.pool)
        .await?;
        Ok(row)
    }

    pub async fn get_for(
        &mut self,
        job_id: Uuid,
        professional_id: Uuid,
    ) -> Result<Option<Application>> {
        let row = sqlx::query_as::<_, Application>(
            r#"
            SELECT id, job_id, professional_id, user_id, cover_letter, available_start_date,
                   status, review_note, reviewed_by, reviewed_at, applied_at, updated_at
            FROM applications WHERE job_id = $1 AND professional_id = $2
            "#,
        )
        .bind(job_id)
        .bind(professional_id)
        .fetch_optional(&mut *self.pool)
        .await?;
        Ok(row)
    }

    pub async fn list(
        &mut self,
        scope: ApplicationScope,
        status: Option<ApplicationStatus>,
        page: &PageRequest,
    ) -> Result<(Vec<Application>, u64)> {
        let mut count: QueryBuilder<Postgres> = QueryBuilder::new("SELECT COUNT(*)");
        push_scope(&mut count, scope, status);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&mut *self.pool)
            .await?;

        let mut query: QueryBuilder<Postgres> = QueryBuilder::new(
            "SELECT a.id, a.job_id, a.professional_id, a.user_id, a.cover_letter, \
             a.available_start_date, a.status, a.review_note, a.reviewed_by, a.reviewed_at, \
             a.applied_at, a.updated_at",
        );
        push_scope(&mut query, scope, status);
        query
            .push(" ORDER BY a.applied_at DESC LIMIT ")
            .push_bind(page.limit as i64)
            .push(" OFFSET ")
            .push_bind(page.offset() as i64);
        let rows = query
            .build_query_as::<Application>()
            .fetch_all(&mut *self.pool)
            .await?;
        Ok((rows, total as u64))
    }
}
