use std::{future::Future, sync::Arc};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction, pool::PoolConnection};
use uuid::Uuid;

use super::{
    Store,
    applications::{
        mutators::ApplicationMutator,
        selectors::ApplicationSelector,
        spec::{Application, ApplicationScope, ApplicationStatus, ApplicationStore},
    },
    hospitals::{
        mutators::HospitalMutator,
        selectors::HospitalSelector,
        spec::{HospitalAdminEntry, HospitalEntry, HospitalFilter, HospitalStore},
    },
    jobs::{
        mutators::JobMutator,
        selectors::JobSelector,
        spec::{JobFilter, JobPosting, JobStore},
    },
    professionals::{
        mutators::ProfessionalMutator,
        selectors::ProfessionalSelector,
        spec::{ProfessionalEntry, ProfessionalStore},
    },
    tokens::{
        mutators::TokenMutator,
        selectors::TokenSelector,
        spec::{NewRefreshToken, RefreshTokenEntry, TokenStore},
    },
    users::{
        mutators::UserMutator,
        selectors::UserSelector,
        spec::{Affiliation, NewUser, UserEntry, UserStore},
    },
};
use crate::{
    pkg::internal::paging::PageRequest,
    prelude::{Error, Result},
};

pub trait GetTxn {
    fn begin_txn(&self) -> impl Future<Output = Result<Transaction<'static, Postgres>>> + Send;
}

impl GetTxn for PgPool {
    async fn begin_txn(&self) -> Result<Transaction<'static, Postgres>> {
        Ok(self.begin().await?)
    }
}

fn on_unique_violation(err: Error, message: &str) -> Error {
    if let Error::Database(sqlx::Error::Database(db)) = &err {
        if db.is_unique_violation() {
            return Error::Conflict(message.to_string());
        }
    }
    err
}

/// `ILIKE` pattern matching `needle` anywhere, with its wildcards taken literally.
pub fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: Arc<PgPool>,
}

impl PgStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        PgStore { pool }
    }

    async fn conn(&self) -> Result<PoolConnection<Postgres>> {
        Ok(self.pool.acquire().await?)
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn create_account(&self, user: NewUser, affiliation: Affiliation) -> Result<UserEntry> {
        let mut tx = self.pool.begin_txn().await?;
        let entry = UserMutator::new(&mut tx)
            .create(&user)
            .await
            .map_err(|e| on_unique_violation(e, "email already registered"))?;
        match affiliation {
            Affiliation::Professional(profile) => {
                ProfessionalMutator::new(&mut tx)
                    .create(&profile)
                    .await
                    .map_err(|e| on_unique_violation(e, "id number already registered"))?;
            }
            Affiliation::HospitalAdmin { hospital_id } => {
                HospitalMutator::new(&mut tx)
                    .bind_admin(entry.id, hospital_id)
                    .await?;
            }
            Affiliation::None => {}
        }
        tx.commit().await?;
        Ok(entry)
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<UserEntry>> {
        let mut conn = self.conn().await?;
        UserSelector::new(&mut conn).get_by_id(id).await
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserEntry>> {
        let mut conn = self.conn().await?;
        UserSelector::new(&mut conn).get_by_email(email).await
    }

    async fn touch_last_login(&self, id: Uuid) -> Result<()> {
        let mut conn = self.conn().await?;
        UserMutator::new(&mut conn).touch_last_login(id).await
    }

    async fn update_contact(
        &self,
        id: Uuid,
        name: Option<String>,
        phone: Option<String>,
    ) -> Result<()> {
        let mut conn = self.conn().await?;
        UserMutator::new(&mut conn).update_contact(id, name, phone).await
    }
}

#[async_trait]
impl TokenStore for PgStore {
    async fn insert_refresh_token(&self, token: NewRefreshToken) -> Result<RefreshTokenEntry> {
        let mut conn = self.conn().await?;
        TokenMutator::new(&mut conn).create(&token).await
    }

    async fn latest_active_refresh_token(
        &self,
        user_id: Uuid,
    ) -> Result<Option<RefreshTokenEntry>> {
        let mut conn = self.conn().await?;
        TokenSelector::new(&mut conn).latest_active(user_id).await
    }

    async fn revoke_refresh_token(&self, id: Uuid) -> Result<bool> {
        let mut conn = self.conn().await?;
        TokenMutator::new(&mut conn).revoke(id).await
    }

    async fn revoke_user_refresh_tokens(&self, user_id: Uuid) -> Result<u64> {
        let mut conn = self.conn().await?;
        TokenMutator::new(&mut conn).revoke_for_user(user_id).await
    }
}

#[async_trait]
impl ProfessionalStore for PgStore {
    async fn find_profile(&self, id: Uuid) -> Result<Option<ProfessionalEntry>> {
        let mut conn = self.conn().await?;
        ProfessionalSelector::new(&mut conn).get_by_id(id).await
    }

    async fn find_profile_by_user(&self, user_id: Uuid) -> Result<Option<ProfessionalEntry>> {
        let mut conn = self.conn().await?;
        ProfessionalSelector::new(&mut conn).get_by_user(user_id).await
    }

    async fn save_profile(&self, profile: &ProfessionalEntry) -> Result<()> {
        let mut conn = self.conn().await?;
        ProfessionalMutator::new(&mut conn).update(profile).await
    }

}

#[async_trait]
impl HospitalStore for PgStore {
    async fn find_hospital(&self, id: Uuid) -> Result<Option<HospitalEntry>> {
        let mut conn = self.conn().await?;
        HospitalSelector::new(&mut conn).get_by_id(id).await
    }

    async fn find_hospital_by_code(&self, code: &str) -> Result<Option<HospitalEntry>> {
        let mut conn = self.conn().await?;
        HospitalSelector::new(&mut conn).get_by_code(code).await
    }

    async fn list_hospitals(&self, filter: &HospitalFilter) -> Result<Vec<HospitalEntry>> {
        let mut conn = self.conn().await?;
        HospitalSelector::new(&mut conn).list(filter).await
    }

    async fn find_admin_binding(
        &self,
        user_id: Uuid,
        hospital_id: Uuid,
    ) -> Result<Option<HospitalAdminEntry>> {
        let mut conn = self.conn().await?;
        HospitalSelector::new(&mut conn)
            .get_binding(user_id, hospital_id)
            .await
    }

    async fn admin_bindings(&self, user_id: Uuid) -> Result<Vec<HospitalAdminEntry>> {
        let mut conn = self.conn().await?;
        HospitalSelector::new(&mut conn)
            .bindings_for_user(user_id)
            .await
    }
}

#[async_trait]
impl JobStore for PgStore {
    async fn insert_job(&self, job: &JobPosting) -> Result<()> {
        let mut conn = self.conn().await?;
        JobMutator::new(&mut conn).create(job).await
    }

    async fn find_job(&self, id: Uuid) -> Result<Option<JobPosting>> {
        let mut conn = self.conn().await?;
        JobSelector::new(&mut conn).get_by_id(id).await
    }

    async fn search_jobs(
        &self,
        filter: &JobFilter,
        page: &PageRequest,
    ) -> Result<(Vec<JobPosting>, u64)> {
        let mut conn = self.conn().await?;
        JobSelector::new(&mut conn).search(filter, page).await
    }

    async fn save_job(&self, job: &JobPosting) -> Result<()> {
        let mut conn = self.conn().await?;
        JobMutator::new(&mut conn).update(job).await
    }

    async fn soft_delete_job(&self, id: Uuid, at: DateTime<Utc>) -> Result<()> {
        let mut conn = self.conn().await?;
        JobMutator::new(&mut conn).soft_delete(id, at).await
    }

    async fn increment_job_views(&self, id: Uuid) -> Result<()> {
        let mut conn = self.conn().await?;
        JobMutator::new(&mut conn).increment_views(id).await
    }
}

#[async_trait]
impl ApplicationStore for PgStore {
    async fn submit_application(&self, application: &Application) -> Result<()> {
        let mut tx = self.pool.begin_txn().await?;
        ApplicationMutator::new(&mut tx)
            .create(application)
            .await
            .map_err(|e| on_unique_violation(e, "already applied to this job"))?;
        JobMutator::new(&mut tx)
            .increment_applications(application.job_id)
            .await?;
        ProfessionalMutator::new(&mut tx)
            .increment_total_applications(application.professional_id)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn find_application(&self, id: Uuid) -> Result<Option<Application>> {
        let mut conn = self.conn().await?;
        ApplicationSelector::new(&mut conn).get_by_id(id).await
    }

    async fn find_application_for(
        &self,
        job_id: Uuid,
        professional_id: Uuid,
    ) -> Result<Option<Application>> {
        let mut conn = self.conn().await?;
        ApplicationSelector::new(&mut conn)
            .get_for(job_id, professional_id)
            .await
    }

    async fn list_applications(
        &self,
        scope: ApplicationScope,
        status: Option<ApplicationStatus>,
        page: &PageRequest,
    ) -> Result<(Vec<Application>, u64)> {
        let mut conn = self.conn().await?;
        ApplicationSelector::new(&mut conn)
            .list(scope, status, page)
            .await
    }

    async fn transition_application(
        &self,
        application: &Application,
        expected: ApplicationStatus,
    ) -> Result<bool> {
        let mut conn = self.conn().await?;
        ApplicationMutator::new(&mut conn)
            .transition(application, expected)
            .await
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<()> {
        sqlx::query("select 1").execute(&*self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::contains_pattern;

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(contains_pattern("馬偕"), "%馬偕%");
        assert_eq!(contains_pattern("100%_a\\b"), "%100\\%\\_a\\\\b%");
    }
}
