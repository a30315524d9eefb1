use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgConnection, Postgres, QueryBuilder, types::Json};
use uuid::Uuid;

use crate::{
    pkg::internal::{
        adaptors::{
            jobs::spec::{
                ContactInfo, JobFilter, JobPosting, JobStatus, JobType, Salary, ServiceType, Weekday,
            },
            postgres::contains_pattern,
            professionals::spec::ProfessionalType,
        },
        paging::PageRequest,
    },
    prelude::Result,
};

const JOB_COLUMNS: &str = "j.id, j.hospital_id, j.created_by, j.county, j.township, \
    j.professional_type, j.specialty, j.number_of_positions, j.job_type, j.service_type, \
    j.service_days, j.service_start_date, j.service_end_date, j.is_public_funded, j.meal_provided, \
    j.accommodation_provided, j.transportation_provided, j.salary_amount, j.salary_currency, \
    j.salary_unit, j.contact_name, j.contact_phone, j.contact_email, j.remarks, j.requirements, \
    j.status, j.views_count, j.applications_count, j.published_at, j.closed_at, j.deleted_at, \
    j.created_at, j.updated_at";

#[derive(FromRow)]
struct JobRow {
    id: Uuid,
    hospital_id: Uuid,
    created_by: Uuid,
    county: String,
    township: String,
    professional_type: ProfessionalType,
    specialty: Option<String>,
    number_of_positions: i32,
    job_type: JobType,
    service_type: Option<ServiceType>,
    service_days: Json<Vec<Weekday>>,
    service_start_date: NaiveDate,
    service_end_date: NaiveDate,
    is_public_funded: bool,
    meal_provided: bool,
    accommodation_provided: bool,
    transportation_provided: bool,
    salary_amount: Option<f64>,
    salary_currency: String,
    salary_unit: Option<String>,
    contact_name: Option<String>,
    contact_phone: Option<String>,
    contact_email: Option<String>,
    remarks: Option<String>,
    requirements: Option<String>,
    status: JobStatus,
    views_count: i32,
    applications_count: i32,
    published_at: Option<DateTime<Utc>>,
    closed_at: Option<DateTime<Utc>>,
    deleted_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<JobRow> for JobPosting {
    fn from(row: JobRow) -> Self {
        let salary = row.salary_amount.map(|amount| Salary {
            amount,
            currency: row.salary_currency,
            unit: row.salary_unit.unwrap_or_default(),
        });
        let contact = row.contact_name.map(|name| ContactInfo {
            name,
            phone: row.contact_phone.unwrap_or_default(),
            email: row.contact_email,
        });
        JobPosting {
            id: row.id,
            hospital_id: row.hospital_id,
            created_by: row.created_by,
            county: row.county,
            township: row.township,
            professional_type: row.professional_type,
            specialty: row.specialty,
            number_of_positions: row.number_of_positions,
            job_type: row.job_type,
            service_type: row.service_type,
            service_days: row.service_days.0,
            service_start_date: row.service_start_date,
            service_end_date: row.service_end_date,
            is_public_funded: row.is_public_funded,
            meal_provided: row.meal_provided,
            accommodation_provided: row.accommodation_provided,
            transportation_provided: row.transportation_provided,
            salary,
            contact,
            remarks: row.remarks,
            requirements: row.requirements,
            status: row.status,
            views_count: row.views_count,
            applications_count: row.applications_count,
            published_at: row.published_at,
            closed_at: row.closed_at,
            deletion: row.deleted_at.into(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

fn push_filter(query: &mut QueryBuilder<'_, Postgres>, filter: &JobFilter) {
    query
        .push(" FROM job_postings j JOIN hospitals h ON h.id = j.hospital_id")
        .push(" WHERE j.deleted_at IS NULL AND j.status = ")
        .push_bind(JobStatus::Open);
    if let Some(county) = &filter.county {
        query.push(" AND j.county = ").push_bind(county.clone());
    }
    if let Some(township) = &filter.township {
        query.push(" AND j.township = ").push_bind(township.clone());
    }
    if let Some(name) = &filter.hospital_name {
        query
            .push(" AND h.name ILIKE ")
            .push_bind(contains_pattern(name));
    }
    if let Some(professional_type) = filter.professional_type {
        query
            .push(" AND j.professional_type = ")
            .push_bind(professional_type);
    }
    if let Some(specialty) = &filter.specialty {
        query
            .push(" AND j.specialty ILIKE ")
            .push_bind(contains_pattern(specialty));
    }
    if let Some(service_type) = filter.service_type {
        query.push(" AND j.service_type = ").push_bind(service_type);
    }
    if let Some(weekday) = filter.weekday {
        query
            .push(" AND j.service_days @> ")
            .push_bind(Json(vec![weekday]));
    }
    if filter.public_funded_only {
        query.push(" AND j.is_public_funded = true");
    }
    if let Some(start_date) = filter.start_date {
        query
            .push(" AND j.service_start_date >= ")
            .push_bind(start_date);
    }
}

pub struct JobSelector<'a> {
    pool: &'a mut PgConnection,
}

impl<'a> JobSelector<'a> {
    pub fn new(pool: &'a mut PgConnection) -> Self {
        JobSelector { pool }
    }

    pub async fn get_by_id(&mut self, id: Uuid) -> Result<Option<JobPosting>> {
        let sql = format!("SELECT {} FROM job_postings j WHERE j.id = $1", JOB_COLUMNS);
        let row = sqlx::query_as::<_, JobRow>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.pool)
            .await?;
        Ok(row.map(JobPosting::from))
    }

    pub async fn search(
        &mut self,
        filter: &JobFilter,
        page: &PageRequest,
    ) -> Result<(Vec<JobPosting>, u64)> {
        let mut count: QueryBuilder<Postgres> = QueryBuilder::new("SELECT COUNT(*)");
        push_filter(&mut count, filter);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&mut *self.pool)
            .await?;

        let mut query: QueryBuilder<Postgres> = QueryBuilder::new("SELECT ");
        query.push(JOB_COLUMNS);
        push_filter(&mut query, filter);
        query
            .push(" ORDER BY j.created_at DESC LIMIT ")
            .push_bind(page.limit as i64)
            .push(" OFFSET ")
            .push_bind(page.offset() as i64);
        let rows = query
            .build_query_as::<JobRow>()
            .fetch_all(&mut *self.pool)
            .await?;
        Ok((rows.into_iter().map(JobPosting::from).collect(), total as u64))
    }
}
