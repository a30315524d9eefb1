use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::pkg::internal::paging::PageRequest;
use crate::prelude::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "application_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    Reviewing,
    Approved,
    Rejected,
    Cancelled,
    Withdrawn,
}

impl ApplicationStatus {
    /// `reviewing` is only ever set outside the API; it can still be decided.
    pub fn can_transition_to(&self, next: ApplicationStatus) -> bool {
        use ApplicationStatus::*;
        matches!(
            (self, next),
            (Pending, Approved)
                | (Pending, Rejected)
                | (Pending, Withdrawn)
                | (Reviewing, Approved)
                | (Reviewing, Rejected)
        )
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct Application {
    pub id: Uuid,
    pub job_id: Uuid,
    pub professional_id: Uuid,
    pub user_id: Uuid,
    pub cover_letter: Option<String>,
    pub available_start_date: Option<NaiveDate>,
    pub status: ApplicationStatus,
    pub review_note: Option<String>,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub applied_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Which applications a caller may list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplicationScope {
    Applicant(Uuid),
    Hospital(Uuid),
    Everything,
}

#[async_trait]
pub trait ApplicationStore: Send + Sync {
    /// Stores the application and raises the job's `applications_count` and the
    /// profile's `total_applications` as one unit. Fails with `Conflict` when the
    /// professional already applied to the job, leaving both counters untouched.
    async fn submit_application(&self, application: &Application) -> Result<()>;
    async fn find_application(&self, id: Uuid) -> Result<Option<Application>>;
    async fn find_application_for(
        &self,
        job_id: Uuid,
        professional_id: Uuid,
    ) -> Result<Option<Application>>;
    /// Newest `applied_at` first, with the total match count.
    async fn list_applications(
        &self,
        scope: ApplicationScope,
        status: Option<ApplicationStatus>,
        page: &PageRequest,
    ) -> Result<(Vec<Application>, u64)>;
    /// Writes status and review columns only if the stored status still equals
    /// `expected`; returns whether the write happened.
    async fn transition_application(
        &self,
        application: &Application,
        expected: ApplicationStatus,
    ) -> Result<bool>;
}

#[cfg(test)]
mod tests {
    use super::ApplicationStatus::*;

    #[test]
    fn terminal_states_have_no_exits() {
        for from in [Approved, Rejected, Cancelled, Withdrawn] {
            for to in [Pending, Reviewing, Approved, Rejected, Cancelled, Withdrawn] {
                assert!(!from.can_transition_to(to), "{:?} -> {:?}", from, to);
            }
        }
    }

    #[test]
    fn pending_moves_by_review_or_withdrawal() {
        assert!(Pending.can_transition_to(Approved));
        assert!(Pending.can_transition_to(Rejected));
        assert!(Pending.can_transition_to(Withdrawn));
        assert!(!Pending.can_transition_to(Cancelled));
        assert!(!Pending.can_transition_to(Reviewing));
        assert!(Reviewing.can_transition_to(Approved));
        assert!(!Reviewing.can_transition_to(Withdrawn));
    }
}
