use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{
    pkg::{
        internal::{
            access::{Action, Actor, administers, authorize},
            adaptors::{
                applications::spec::{Application, ApplicationScope, ApplicationStatus},
                jobs::spec::JobStatus,
                professionals::spec::ProfessionalType,
                users::spec::Role,
            },
            jobs::live_job,
            paging::{PageRequest, Paged, Pagination},
        },
        server::state::AppState,
    },
    prelude::{Error, Result},
};

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateApplicationInput {
    pub job_id: Uuid,
    #[validate(length(max = 2000))]
    pub cover_letter: Option<String>,
    pub available_start_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewDecision {
    Approved,
    Rejected,
}

impl From<ReviewDecision> for ApplicationStatus {
    fn from(decision: ReviewDecision) -> Self {
        match decision {
            ReviewDecision::Approved => ApplicationStatus::Approved,
            ReviewDecision::Rejected => ApplicationStatus::Rejected,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReviewInput {
    pub status: ReviewDecision,
    #[validate(length(max = 1000))]
    pub review_note: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HospitalRef {
    pub hospital_id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSummary {
    pub job_id: Uuid,
    pub county: String,
    pub township: String,
    pub professional_type: ProfessionalType,
    pub specialty: Option<String>,
    pub status: JobStatus,
    pub hospital: Option<HospitalRef>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfessionalSummary {
    pub user_id: Uuid,
    pub name: Option<String>,
    pub professional_type: ProfessionalType,
    pub specialties: Vec<String>,
    pub years_of_experience: Option<i32>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationView {
    pub application_id: Uuid,
    pub job: Option<JobSummary>,
    pub professional: Option<ProfessionalSummary>,
    pub cover_letter: Option<String>,
    pub available_start_date: Option<NaiveDate>,
    pub status: ApplicationStatus,
    pub review_note: Option<String>,
    pub applied_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
}

async fn view(state: &AppState, application: Application) -> Result<ApplicationView> {
    let job = match state.store.find_job(application.job_id).await? {
        Some(job) => {
            let hospital = state
                .store
                .find_hospital(job.hospital_id)
                .await?
                .map(|h| HospitalRef {
                    hospital_id: h.id,
                    name: h.name,
                });
            Some(JobSummary {
                job_id: job.id,
                county: job.county,
                township: job.township,
                professional_type: job.professional_type,
                specialty: job.specialty,
                status: job.status,
                hospital,
            })
        }
        None => None,
    };
    let professional = match state.store.find_profile(application.professional_id).await? {
        Some(profile) => {
            let name = state
                .store
                .find_user(profile.user_id)
                .await?
                .map(|u| u.name);
            Some(ProfessionalSummary {
                user_id: profile.user_id,
                name,
                professional_type: profile.professional_type,
                specialties: profile.specialties,
                years_of_experience: profile.years_of_experience,
            })
        }
        None => None,
    };
    Ok(ApplicationView {
        application_id: application.id,
        job,
        professional,
        cover_letter: application.cover_letter,
        available_start_date: application.available_start_date,
        status: application.status,
        review_note: application.review_note,
        applied_at: application.applied_at,
        reviewed_at: application.reviewed_at,
    })
}

async fn find(state: &AppState, id: Uuid) -> Result<Application> {
    state
        .store
        .find_application(id)
        .await?
        .ok_or_else(|| Error::NotFound("application not found".into()))
}

/// Whether the actor administers the hospital owning the application's job.
async fn bound_to(state: &AppState, actor: &Actor, application: &Application) -> Result<bool> {
    if actor.role != Role::HospitalAdmin {
        return Ok(false);
    }
    match state.store.find_job(application.job_id).await? {
        Some(job) => administers(&*state.store, actor, job.hospital_id).await,
        None => Ok(false),
    }
}

pub async fn create(
    state: &AppState,
    actor: &Actor,
    input: CreateApplicationInput,
) -> Result<ApplicationView> {
    authorize(actor, Action::CreateApplication)?;
    input.validate()?;
    let profile = state
        .store
        .find_profile_by_user(actor.user_id)
        .await?
        .ok_or_else(|| Error::BadRequest("complete your profile first".into()))?;
    let job = live_job(state, input.job_id).await?;
    if job.status != JobStatus::Open {
        return Err(Error::BadRequest("job posting is not accepting applications".into()));
    }
    if state
        .store
        .find_application_for(job.id, profile.id)
        .await?
        .is_some()
    {
        return Err(Error::Conflict("already applied to this job".into()));
    }

    let now = Utc::now();
    let application = Application {
        id: Uuid::new_v4(),
        job_id: job.id,
        professional_id: profile.id,
        user_id: actor.user_id,
        cover_letter: input.cover_letter,
        available_start_date: input.available_start_date,
        status: ApplicationStatus::Pending,
        review_note: None,
        reviewed_by: None,
        reviewed_at: None,
        applied_at: now,
        updated_at: now,
    };
    state.store.submit_application(&application).await?;
    tracing::info!(application = %application.id, job = %job.id, user = %actor.user_id, "application submitted");
    view(state, application).await
}

pub async fn get(state: &AppState, actor: &Actor, id: Uuid) -> Result<ApplicationView> {
    let application = find(state, id).await?;
    let owner = application.user_id == actor.user_id;
    let bound = bound_to(state, actor, &application).await?;
    authorize(actor, Action::ViewApplication { owner, bound })?;
    view(state, application).await
}

pub async fn list(
    state: &AppState,
    actor: &Actor,
    status: Option<ApplicationStatus>,
    page: PageRequest,
) -> Result<Paged<ApplicationView>> {
    authorize(actor, Action::ListApplications)?;
    let scope = match actor.role {
        Role::HealthcareProfessional => ApplicationScope::Applicant(actor.user_id),
        Role::HospitalAdmin => {
            let binding = state
                .store
                .admin_bindings(actor.user_id)
                .await?
                .into_iter()
                .next()
                .ok_or_else(|| Error::Forbidden("not an administrator of any hospital".into()))?;
            ApplicationScope::Hospital(binding.hospital_id)
        }
        Role::SystemAdmin => ApplicationScope::Everything,
    };
    let (applications, total) = state.store.list_applications(scope, status, &page).await?;
    let mut items = Vec::with_capacity(applications.len());
    for application in applications {
        items.push(view(state, application).await?);
    }
    Ok(Paged {
        items,
        pagination: Pagination::new(&page, total),
    })
}

pub async fn cancel(state: &AppState, actor: &Actor, id: Uuid) -> Result<()> {
    let mut application = find(state, id).await?;
    let owner = application.user_id == actor.user_id;
    authorize(actor, Action::CancelApplication { owner })?;
    let current = application.status;
    if !current.can_transition_to(ApplicationStatus::Withdrawn) {
        return Err(Error::BadRequest(
            "only pending applications can be cancelled".into(),
        ));
    }
    application.status = ApplicationStatus::Withdrawn;
    if !state
        .store
        .transition_application(&application, current)
        .await?
    {
        return Err(Error::BadRequest(
            "only pending applications can be cancelled".into(),
        ));
    }
    tracing::info!(application = %application.id, user = %actor.user_id, "application withdrawn");
    Ok(())
}

pub async fn review(
    state: &AppState,
    actor: &Actor,
    id: Uuid,
    input: ReviewInput,
) -> Result<ApplicationView> {
    let mut application = find(state, id).await?;
    let bound = bound_to(state, actor, &application).await?;
    authorize(actor, Action::ReviewApplication { bound })?;
    input.validate()?;

    let current = application.status;
    let next = ApplicationStatus::from(input.status);
    if !current.can_transition_to(next) {
        return Err(Error::BadRequest(
            "application is no longer awaiting review".into(),
        ));
    }
    application.status = next;
    application.review_note = Some(input.review_note.unwrap_or_default());
    application.reviewed_by = Some(actor.user_id);
    application.reviewed_at = Some(Utc::now());
    if !state
        .store
        .transition_application(&application, current)
        .await?
    {
        return Err(Error::BadRequest("application was modified concurrently".into()));
    }
    tracing::info!(application = %application.id, reviewer = %actor.user_id, status = ?next, "application reviewed");
    view(state, application).await
}
