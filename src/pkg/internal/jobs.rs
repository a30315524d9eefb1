use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{
    pkg::{
        internal::{
            access::{Action, Actor, administers, authorize},
            adaptors::{
                hospitals::spec::{HospitalEntry, HospitalType},
                jobs::spec::{
                    ContactInfo, Deletion, JobFilter, JobPosting, JobStatus, JobType, Salary,
                    ServiceType, Weekday,
                },
                professionals::spec::ProfessionalType,
                users::spec::Role,
            },
            paging::{PageRequest, Paged, Pagination},
        },
        server::state::AppState,
    },
    prelude::{Error, Result},
};

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SalaryInput {
    #[validate(range(min = 0.0))]
    pub amount: f64,
    pub currency: Option<String>,
    #[validate(length(min = 1, max = 20))]
    pub unit: String,
}

impl From<SalaryInput> for Salary {
    fn from(input: SalaryInput) -> Self {
        Salary {
            amount: input.amount,
            currency: input.currency.unwrap_or_else(|| "TWD".to_string()),
            unit: input.unit,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ContactInput {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 1, max = 20))]
    pub phone: String,
    #[validate(email)]
    pub email: Option<String>,
}

impl From<ContactInput> for ContactInfo {
    fn from(input: ContactInput) -> Self {
        ContactInfo {
            name: input.name,
            phone: input.phone,
            email: input.email,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobInput {
    /// Required for system admins; hospital admins default to their first hospital.
    pub hospital_id: Option<Uuid>,
    #[validate(length(min = 1, max = 20))]
    pub county: String,
    #[validate(length(min = 1, max = 20))]
    pub township: String,
    pub professional_type: ProfessionalType,
    #[validate(length(max = 100))]
    pub specialty: Option<String>,
    #[validate(range(min = 1))]
    pub number_of_positions: i32,
    #[serde(default)]
    pub job_type: JobType,
    pub service_type: Option<ServiceType>,
    #[serde(default)]
    pub service_days: Vec<Weekday>,
    pub service_start_date: NaiveDate,
    pub service_end_date: NaiveDate,
    #[serde(default)]
    pub is_public_funded: bool,
    #[serde(default)]
    pub meal_provided: bool,
    #[serde(default)]
    pub accommodation_provided: bool,
    #[serde(default)]
    pub transportation_provided: bool,
    #[validate(nested)]
    pub salary: Option<SalaryInput>,
    #[validate(nested)]
    pub contact_info: Option<ContactInput>,
    pub remarks: Option<String>,
    pub requirements: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateJobInput {
    #[validate(length(min = 1, max = 20))]
    pub county: Option<String>,
    #[validate(length(min = 1, max = 20))]
    pub township: Option<String>,
    pub professional_type: Option<ProfessionalType>,
    #[validate(length(max = 100))]
    pub specialty: Option<String>,
    #[validate(range(min = 1))]
    pub number_of_positions: Option<i32>,
    pub job_type: Option<JobType>,
    pub service_type: Option<ServiceType>,
    pub service_days: Option<Vec<Weekday>>,
    pub service_start_date: Option<NaiveDate>,
    pub service_end_date: Option<NaiveDate>,
    pub is_public_funded: Option<bool>,
    pub meal_provided: Option<bool>,
    pub accommodation_provided: Option<bool>,
    pub transportation_provided: Option<bool>,
    #[validate(nested)]
    pub salary: Option<SalaryInput>,
    #[validate(nested)]
    pub contact_info: Option<ContactInput>,
    pub remarks: Option<String>,
    pub requirements: Option<String>,
    pub status: Option<JobStatus>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HospitalSummary {
    pub hospital_id: Uuid,
    pub name: String,
    pub county: String,
    pub township: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    #[serde(rename = "type")]
    pub hospital_type: Option<HospitalType>,
}

impl From<&HospitalEntry> for HospitalSummary {
    fn from(hospital: &HospitalEntry) -> Self {
        HospitalSummary {
            hospital_id: hospital.id,
            name: hospital.name.clone(),
            county: hospital.county.clone(),
            township: hospital.township.clone(),
            address: hospital.address.clone(),
            phone: hospital.phone.clone(),
            hospital_type: hospital.hospital_type,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobView {
    pub job_id: Uuid,
    pub hospital: Option<HospitalSummary>,
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
    pub contact_info: Option<ContactInfo>,
    pub remarks: Option<String>,
    pub requirements: Option<String>,
    pub status: JobStatus,
    pub views_count: i32,
    pub applications_count: i32,
    pub published_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl JobView {
    pub fn new(job: JobPosting, hospital: Option<&HospitalEntry>) -> Self {
        JobView {
            job_id: job.id,
            hospital: hospital.map(HospitalSummary::from),
            county: job.county,
            township: job.township,
            professional_type: job.professional_type,
            specialty: job.specialty,
            number_of_positions: job.number_of_positions,
            job_type: job.job_type,
            service_type: job.service_type,
            service_days: job.service_days,
            service_start_date: job.service_start_date,
            service_end_date: job.service_end_date,
            is_public_funded: job.is_public_funded,
            meal_provided: job.meal_provided,
            accommodation_provided: job.accommodation_provided,
            transportation_provided: job.transportation_provided,
            salary: job.salary,
            contact_info: job.contact,
            remarks: job.remarks,
            requirements: job.requirements,
            status: job.status,
            views_count: job.views_count,
            applications_count: job.applications_count,
            published_at: job.published_at,
            closed_at: job.closed_at,
            created_at: job.created_at,
            updated_at: job.updated_at,
        }
    }
}

fn check_schedule(start: NaiveDate, end: NaiveDate) -> Result<()> {
    if end < start {
        return Err(Error::BadRequest(
            "serviceEndDate must not be before serviceStartDate".into(),
        ));
    }
    Ok(())
}

/// Fetches a posting that has not been soft-deleted.
pub async fn live_job(state: &AppState, id: Uuid) -> Result<JobPosting> {
    match state.store.find_job(id).await? {
        Some(job) if !job.deletion.is_deleted() => Ok(job),
        _ => Err(Error::NotFound("job posting not found".into())),
    }
}

async fn view(state: &AppState, job: JobPosting) -> Result<JobView> {
    let hospital = state.store.find_hospital(job.hospital_id).await?;
    Ok(JobView::new(job, hospital.as_ref()))
}

async fn authorize_manage(state: &AppState, actor: &Actor, job: &JobPosting) -> Result<()> {
    let bound = administers(&*state.store, actor, job.hospital_id).await?;
    authorize(actor, Action::ManageJob { bound })
}

pub async fn search(state: &AppState, filter: &JobFilter, page: PageRequest) -> Result<Paged<JobView>> {
    let (jobs, total) = state.store.search_jobs(filter, &page).await?;
    let mut hospitals: HashMap<Uuid, Option<HospitalEntry>> = HashMap::new();
    let mut items = Vec::with_capacity(jobs.len());
    for job in jobs {
        if !hospitals.contains_key(&job.hospital_id) {
            let hospital = state.store.find_hospital(job.hospital_id).await?;
            hospitals.insert(job.hospital_id, hospital);
        }
        let hospital = hospitals.get(&job.hospital_id).and_then(Option::as_ref);
        items.push(JobView::new(job, hospital));
    }
    tracing::debug!(total, page = page.page, "searched job postings");
    Ok(Paged {
        items,
        pagination: Pagination::new(&page, total),
    })
}

/// Every fetch counts as a view.
pub async fn get(state: &AppState, id: Uuid) -> Result<JobView> {
    let mut job = live_job(state, id).await?;
    state.store.increment_job_views(job.id).await?;
    job.views_count += 1;
    view(state, job).await
}

async fn target_hospital(state: &AppState, actor: &Actor, requested: Option<Uuid>) -> Result<Uuid> {
    match actor.role {
        Role::SystemAdmin => {
            let id = requested.ok_or_else(|| {
                Error::BadRequest("hospitalId is required for system admins".into())
            })?;
            state
                .store
                .find_hospital(id)
                .await?
                .map(|h| h.id)
                .ok_or_else(|| Error::NotFound("hospital not found".into()))
        }
        Role::HospitalAdmin => match requested {
            Some(id) => {
                let bound = administers(&*state.store, actor, id).await?;
                authorize(actor, Action::ManageJob { bound })?;
                Ok(id)
            }
            None => state
                .store
                .admin_bindings(actor.user_id)
                .await?
                .first()
                .map(|binding| binding.hospital_id)
                .ok_or_else(|| Error::Forbidden("not an administrator of any hospital".into())),
        },
        Role::HealthcareProfessional => {
            authorize(actor, Action::ManageJob { bound: false })?;
            Err(Error::Forbidden("not allowed to manage job postings".into()))
        }
    }
}

pub async fn create(state: &AppState, actor: &Actor, input: CreateJobInput) -> Result<JobView> {
    let hospital_id = target_hospital(state, actor, input.hospital_id).await?;
    input.validate()?;
    check_schedule(input.service_start_date, input.service_end_date)?;

    let now = Utc::now();
    let job = JobPosting {
        id: Uuid::new_v4(),
        hospital_id,
        created_by: actor.user_id,
        county: input.county,
        township: input.township,
        professional_type: input.professional_type,
        specialty: input.specialty,
        number_of_positions: input.number_of_positions,
        job_type: input.job_type,
        service_type: input.service_type,
        service_days: input.service_days,
        service_start_date: input.service_start_date,
        service_end_date: input.service_end_date,
        is_public_funded: input.is_public_funded,
        meal_provided: input.meal_provided,
        accommodation_provided: input.accommodation_provided,
        transportation_provided: input.transportation_provided,
        salary: input.salary.map(Salary::from),
        contact: input.contact_info.map(ContactInfo::from),
        remarks: input.remarks,
        requirements: input.requirements,
        status: JobStatus::Open,
        views_count: 0,
        applications_count: 0,
        published_at: Some(now),
        closed_at: None,
        deletion: Deletion::Active,
        created_at: now,
        updated_at: now,
    };
    state.store.insert_job(&job).await?;
    tracing::info!(job = %job.id, hospital = %hospital_id, "published job posting");
    view(state, job).await
}

pub async fn update(
    state: &AppState,
    actor: &Actor,
    id: Uuid,
    input: UpdateJobInput,
) -> Result<JobView> {
    let mut job = live_job(state, id).await?;
    authorize_manage(state, actor, &job).await?;
    input.validate()?;

    if let Some(county) = input.county {
        job.county = county;
    }
    if let Some(township) = input.township {
        job.township = township;
    }
    if let Some(professional_type) = input.professional_type {
        job.professional_type = professional_type;
    }
    if input.specialty.is_some() {
        job.specialty = input.specialty;
    }
    if let Some(positions) = input.number_of_positions {
        job.number_of_positions = positions;
    }
    if let Some(job_type) = input.job_type {
        job.job_type = job_type;
    }
    if input.service_type.is_some() {
        job.service_type = input.service_type;
    }
    if let Some(days) = input.service_days {
        job.service_days = days;
    }
    if let Some(start) = input.service_start_date {
        job.service_start_date = start;
    }
    if let Some(end) = input.service_end_date {
        job.service_end_date = end;
    }
    check_schedule(job.service_start_date, job.service_end_date)?;
    if let Some(flag) = input.is_public_funded {
        job.is_public_funded = flag;
    }
    if let Some(flag) = input.meal_provided {
        job.meal_provided = flag;
    }
    if let Some(flag) = input.accommodation_provided {
        job.accommodation_provided = flag;
    }
    if let Some(flag) = input.transportation_provided {
        job.transportation_provided = flag;
    }
    if let Some(salary) = input.salary {
        job.salary = Some(salary.into());
    }
    if let Some(contact) = input.contact_info {
        job.contact = Some(contact.into());
    }
    if input.remarks.is_some() {
        job.remarks = input.remarks;
    }
    if input.requirements.is_some() {
        job.requirements = input.requirements;
    }
    if let Some(status) = input.status {
        if status == JobStatus::Closed && job.status != JobStatus::Closed {
            job.closed_at = Some(Utc::now());
        }
        job.status = status;
    }

    state.store.save_job(&job).await?;
    tracing::info!(job = %job.id, user = %actor.user_id, "updated job posting");
    view(state, job).await
}

pub async fn close(state: &AppState, actor: &Actor, id: Uuid) -> Result<()> {
    let mut job = live_job(state, id).await?;
    authorize_manage(state, actor, &job).await?;
    job.status = JobStatus::Closed;
    job.closed_at = Some(Utc::now());
    state.store.save_job(&job).await?;
    tracing::info!(job = %job.id, user = %actor.user_id, "closed job posting");
    Ok(())
}

pub async fn remove(state: &AppState, actor: &Actor, id: Uuid) -> Result<()> {
    let job = live_job(state, id).await?;
    authorize_manage(state, actor, &job).await?;
    state.store.soft_delete_job(job.id, Utc::now()).await?;
    tracing::info!(job = %job.id, user = %actor.user_id, "deleted job posting");
    Ok(())
}

#[cfg(test)]
mod tests {
    use tracing_test::traced_test;

    use super::*;
    use crate::pkg::internal::{
        adaptors::hospitals::spec::HospitalStore,
        testing::{hospital_admin, job_input, memory_state, professional, system_admin},
    };

    #[traced_test]
    #[tokio::test]
    async fn test_admin_publishes_for_own_hospital() -> Result<()> {
        let (state, _) = memory_state().await;
        let admin = hospital_admin(&state, "admin@example.com", "HOSP001").await?;

        let job = create(&state, &admin, job_input("屏東縣", "屏東市")).await?;
        assert_eq!(job.status, JobStatus::Open);
        assert!(job.published_at.is_some());
        assert_eq!(job.hospital.as_ref().map(|h| h.name.as_str()), Some("屏東基督教醫院"));
        assert_eq!(job.salary.as_ref().map(|s| s.currency.as_str()), Some("TWD"));
        Ok(())
    }

    #[traced_test]
    #[tokio::test]
    async fn test_system_admin_must_name_hospital() -> Result<()> {
        let (state, store) = memory_state().await;
        let root = system_admin(&state).await?;

        let missing = create(&state, &root, job_input("屏東縣", "屏東市")).await;
        assert!(matches!(missing, Err(Error::BadRequest(_))));

        let mut unknown = job_input("屏東縣", "屏東市");
        unknown.hospital_id = Some(Uuid::new_v4());
        assert!(matches!(create(&state, &root, unknown).await, Err(Error::NotFound(_))));

        let hospital = store.find_hospital_by_code("HOSP003").await?.unwrap();
        let mut named = job_input("台東縣", "台東市");
        named.hospital_id = Some(hospital.id);
        let job = create(&state, &root, named).await?;
        assert_eq!(job.hospital.map(|h| h.hospital_id), Some(hospital.id));
        Ok(())
    }

    #[traced_test]
    #[tokio::test]
    async fn test_professionals_cannot_publish() -> Result<()> {
        let (state, _) = memory_state().await;
        let nurse = professional(&state, "nurse@example.com", "A123456789").await?;
        let err = create(&state, &nurse, job_input("屏東縣", "屏東市")).await.unwrap_err();
        assert!(matches!(err, Error::Forbidden(_)));
        Ok(())
    }

    #[traced_test]
    #[tokio::test]
    async fn test_schedule_must_not_run_backwards() -> Result<()> {
        let (state, _) = memory_state().await;
        let admin = hospital_admin(&state, "admin@example.com", "HOSP001").await?;
        let mut input = job_input("屏東縣", "屏東市");
        input.service_end_date = input.service_start_date.pred_opt().unwrap();
        assert!(matches!(create(&state, &admin, input).await, Err(Error::BadRequest(_))));

        let mut zero = job_input("屏東縣", "屏東市");
        zero.number_of_positions = 0;
        assert!(matches!(create(&state, &admin, zero).await, Err(Error::BadRequest(_))));
        Ok(())
    }

    #[traced_test]
    #[tokio::test]
    async fn test_search_filters_and_orders() -> Result<()> {
        let (state, _) = memory_state().await;
        let pingtung = hospital_admin(&state, "pt@example.com", "HOSP001").await?;
        let taitung = hospital_admin(&state, "tt@example.com", "HOSP003").await?;

        let older = create(&state, &pingtung, job_input("屏東縣", "屏東市")).await?;
        let mut funded = job_input("屏東縣", "恆春鎮");
        funded.is_public_funded = true;
        funded.service_days = vec![Weekday::Saturday];
        let newer = create(&state, &pingtung, funded).await?;
        create(&state, &taitung, job_input("台東縣", "台東市")).await?;

        let filter = JobFilter {
            county: Some("屏東縣".into()),
            ..Default::default()
        };
        let page = search(&state, &filter, PageRequest::default()).await?;
        let ids: Vec<Uuid> = page.items.iter().map(|j| j.job_id).collect();
        assert_eq!(ids, vec![newer.job_id, older.job_id]);
        assert_eq!(page.pagination.total_items, 2);

        let funded_only = JobFilter {
            public_funded_only: true,
            weekday: Some(Weekday::Saturday),
            ..Default::default()
        };
        let page = search(&state, &funded_only, PageRequest::default()).await?;
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].job_id, newer.job_id);

        let by_name = JobFilter {
            hospital_name: Some("馬偕".into()),
            ..Default::default()
        };
        let page = search(&state, &by_name, PageRequest::default()).await?;
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].county, "台東縣");
        Ok(())
    }

    #[traced_test]
    #[tokio::test]
    async fn test_views_count_every_fetch() -> Result<()> {
        let (state, _) = memory_state().await;
        let admin = hospital_admin(&state, "admin@example.com", "HOSP001").await?;
        let job = create(&state, &admin, job_input("屏東縣", "屏東市")).await?;

        get(&state, job.job_id).await?;
        let second = get(&state, job.job_id).await?;
        assert_eq!(second.views_count, 2);
        Ok(())
    }

    #[traced_test]
    #[tokio::test]
    async fn test_other_hospital_cannot_manage() -> Result<()> {
        let (state, _) = memory_state().await;
        let owner = hospital_admin(&state, "owner@example.com", "HOSP001").await?;
        let other = hospital_admin(&state, "other@example.com", "HOSP002").await?;
        let job = create(&state, &owner, job_input("屏東縣", "屏東市")).await?;

        assert!(matches!(close(&state, &other, job.job_id).await, Err(Error::Forbidden(_))));
        assert!(matches!(remove(&state, &other, job.job_id).await, Err(Error::Forbidden(_))));
        let update_input = UpdateJobInput {
            remarks: Some("hijacked".into()),
            ..Default::default()
        };
        assert!(matches!(
            update(&state, &other, job.job_id, update_input).await,
            Err(Error::Forbidden(_))
        ));
        Ok(())
    }

    #[traced_test]
    #[tokio::test]
    async fn test_close_and_delete_hide_postings() -> Result<()> {
        let (state, _) = memory_state().await;
        let admin = hospital_admin(&state, "admin@example.com", "HOSP001").await?;
        let closed = create(&state, &admin, job_input("屏東縣", "屏東市")).await?;
        let deleted = create(&state, &admin, job_input("屏東縣", "屏東市")).await?;

        close(&state, &admin, closed.job_id).await?;
        remove(&state, &admin, deleted.job_id).await?;

        let page = search(&state, &JobFilter::default(), PageRequest::default()).await?;
        assert!(page.items.is_empty());
        assert_eq!(get(&state, closed.job_id).await?.status, JobStatus::Closed);
        assert!(matches!(get(&state, deleted.job_id).await, Err(Error::NotFound(_))));
        assert!(matches!(remove(&state, &admin, deleted.job_id).await, Err(Error::NotFound(_))));
        assert!(matches!(close(&state, &admin, deleted.job_id).await, Err(Error::NotFound(_))));
        let reopen = UpdateJobInput {
            status: Some(JobStatus::Open),
            ..Default::default()
        };
        assert!(matches!(
            update(&state, &admin, deleted.job_id, reopen).await,
            Err(Error::NotFound(_))
        ));
        Ok(())
    }

    #[traced_test]
    #[tokio::test]
    async fn test_partial_update() -> Result<()> {
        let (state, _) = memory_state().await;
        let admin = hospital_admin(&state, "admin@example.com", "HOSP001").await?;
        let job = create(&state, &admin, job_input("屏東縣", "屏東市")).await?;

        let updated = update(
            &state,
            &admin,
            job.job_id,
            UpdateJobInput {
                number_of_positions: Some(3),
                status: Some(JobStatus::Filled),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(updated.number_of_positions, 3);
        assert_eq!(updated.status, JobStatus::Filled);
        assert_eq!(updated.township, "屏東市");
        Ok(())
    }
}
