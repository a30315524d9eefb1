use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::pkg::internal::adaptors::professionals::spec::ProfessionalType;
use crate::pkg::internal::paging::PageRequest;
use crate::prelude::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "job_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Draft,
    Open,
    Closed,
    Filled,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "job_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    #[default]
    Support,
    Permanent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "service_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    Outpatient,
    Inpatient,
    Emergency,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

/// Soft-delete state of a posting. Deleted postings behave as absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deletion {
    Active,
    Deleted(DateTime<Utc>),
}

impl Deletion {
    pub fn is_deleted(&self) -> bool {
        matches!(self, Deletion::Deleted(_))
    }
}

impl From<Option<DateTime<Utc>>> for Deletion {
    fn from(value: Option<DateTime<Utc>>) -> Self {
        value.map_or(Deletion::Active, Deletion::Deleted)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Salary {
    pub amount: f64,
    pub currency: String,
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
}

#[derive(Debug, Clone)]
pub struct JobPosting {
    pub id: Uuid,
    pub hospital_id: Uuid,
    pub created_by: Uuid,
    pub county: String,
    pub township: String,
    pub professional_type: ProfessionalType,
    pub specialty: Option<String>,
    pub number_of_positions: i32,
    pub job_type: JobType,
    pub service_type: Option<ServiceType>,
    pub service_days: Vec<Weekday>,
    pub service_start_date: NaiveDate,
    pub service_end_date: NaiveDate,
    pub is_public_funded: bool,
    pub meal_provided: bool,
    pub accommodation_provided: bool,
    pub transportation_provided: bool,
    pub salary: Option<Salary>,
    pub contact: Option<ContactInfo>,
    pub remarks: Option<String>,
    pub requirements: Option<String>,
    pub status: JobStatus,
    pub views_count: i32,
    pub applications_count: i32,
    pub published_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
    pub deletion: Deletion,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl JobPosting {
    pub fn accepts_applications(&self) -> bool {
        !self.deletion.is_deleted() && self.status == JobStatus::Open
    }
}

/// Conjunction of optional predicates over public postings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobFilter {
    pub county: Option<String>,
    pub township: Option<String>,
    pub hospital_name: Option<String>,
    pub professional_type: Option<ProfessionalType>,
    pub specialty: Option<String>,
    pub service_type: Option<ServiceType>,
    pub weekday: Option<Weekday>,
    #[serde(default)]
    pub public_funded_only: bool,
    pub start_date: Option<NaiveDate>,
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

impl JobFilter {
    /// `hospital_name` is the name of the posting's hospital, if known.
    pub fn matches(&self, job: &JobPosting, hospital_name: Option<&str>) -> bool {
        job.accepts_applications()
            && self.county.as_ref().is_none_or(|c| &job.county == c)
            && self.township.as_ref().is_none_or(|t| &job.township == t)
            && self.hospital_name.as_ref().is_none_or(|n| {
                hospital_name.is_some_and(|name| contains_ignore_case(name, n))
            })
            && self
                .professional_type
                .is_none_or(|p| job.professional_type == p)
            && self.specialty.as_ref().is_none_or(|s| {
                job.specialty
                    .as_deref()
                    .is_some_and(|spec| contains_ignore_case(spec, s))
            })
            && self
                .service_type
                .is_none_or(|s| job.service_type == Some(s))
            && self.weekday.is_none_or(|d| job.service_days.contains(&d))
            && (!self.public_funded_only || job.is_public_funded)
            && self
                .start_date
                .is_none_or(|d| job.service_start_date >= d)
    }
}

#[async_trait]
pub trait JobStore: Send + Sync {
    async fn insert_job(&self, job: &JobPosting) -> Result<()>;
    /// Returns soft-deleted postings too; callers decide how to treat them.
    async fn find_job(&self, id: Uuid) -> Result<Option<JobPosting>>;
    /// Open, non-deleted postings matching the filter, newest first, with the total match count.
    async fn search_jobs(
        &self,
        filter: &JobFilter,
        page: &PageRequest,
    ) -> Result<(Vec<JobPosting>, u64)>;
    /// Persists every editable column, including status and closed_at.
    async fn save_job(&self, job: &JobPosting) -> Result<()>;
    async fn soft_delete_job(&self, id: Uuid, at: DateTime<Utc>) -> Result<()>;
    async fn increment_job_views(&self, id: Uuid) -> Result<()>;
}
