//! Process-local store used by the test suite and by `memory://` database urls.
//!
//! Every table lives behind one `RwLock`, so each trait call is a single
//! atomic unit of work, including the counter increments.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    Store,
    applications::spec::{Application, ApplicationScope, ApplicationStatus, ApplicationStore},
    hospitals::spec::{HospitalAdminEntry, HospitalEntry, HospitalFilter, HospitalStore, HospitalType},
    jobs::spec::{Deletion, JobFilter, JobPosting, JobStore},
    professionals::spec::{ProfessionalEntry, ProfessionalStore},
    tokens::spec::{NewRefreshToken, RefreshTokenEntry, TokenStore},
    users::spec::{Affiliation, NewUser, UserEntry, UserStore},
};
use crate::{
    pkg::internal::paging::PageRequest,
    prelude::{Error, Result},
};

/// Hospitals loaded by `MemoryStore::seeded`, mirroring the init migration.
pub const SEED_HOSPITALS: &[(&str, &str, &str, &str, HospitalType)] = &[
    ("HOSP001", "屏東基督教醫院", "屏東縣", "屏東市", HospitalType::RegionalHospital),
    ("HOSP002", "恆春旅遊醫院", "屏東縣", "恆春鎮", HospitalType::DistrictHospital),
    ("HOSP003", "台東馬偕紀念醫院", "台東縣", "台東市", HospitalType::RegionalHospital),
    ("HOSP004", "關山慈濟醫院", "台東縣", "關山鎮", HospitalType::DistrictHospital),
    ("HOSP005", "門諾醫院壽豐分院", "花蓮縣", "壽豐鄉", HospitalType::DistrictHospital),
    ("HOSP006", "三軍總醫院澎湖分院", "澎湖縣", "馬公市", HospitalType::RegionalHospital),
];

#[derive(Debug, Default)]
struct Tables {
    users: Vec<UserEntry>,
    tokens: Vec<RefreshTokenEntry>,
    professionals: Vec<ProfessionalEntry>,
    hospitals: Vec<HospitalEntry>,
    admins: Vec<HospitalAdminEntry>,
    jobs: Vec<JobPosting>,
    applications: Vec<Application>,
}

impl Tables {
    fn hospital_name(&self, id: Uuid) -> Option<&str> {
        self.hospitals
            .iter()
            .find(|h| h.id == id)
            .map(|h| h.name.as_str())
    }

    fn job(&self, id: Uuid) -> Option<&JobPosting> {
        self.jobs.iter().find(|j| j.id == id)
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn seeded() -> Self {
        let store = Self::new();
        for (code, name, county, township, hospital_type) in SEED_HOSPITALS {
            store
                .insert_hospital(code, name, county, township, Some(*hospital_type))
                .await;
        }
        store
    }

    pub async fn insert_hospital(
        &self,
        code: &str,
        name: &str,
        county: &str,
        township: &str,
        hospital_type: Option<HospitalType>,
    ) -> HospitalEntry {
        let entry = HospitalEntry {
            id: Uuid::new_v4(),
            code: code.to_string(),
            name: name.to_string(),
            county: county.to_string(),
            township: township.to_string(),
            address: None,
            phone: None,
            hospital_type,
            is_active: true,
            created_at: Utc::now(),
        };
        self.tables.write().await.hospitals.push(entry.clone());
        entry
    }

    #[cfg(test)]
    pub async fn set_user_active(&self, id: Uuid, active: bool) {
        let mut tables = self.tables.write().await;
        if let Some(user) = tables.users.iter_mut().find(|u| u.id == id) {
            user.is_active = active;
        }
    }

    #[cfg(test)]
    pub async fn expire_refresh_tokens(&self, user_id: Uuid) {
        let mut tables = self.tables.write().await;
        let past = Utc::now() - chrono::TimeDelta::seconds(1);
        for token in tables.tokens.iter_mut().filter(|t| t.user_id == user_id) {
            token.expires_at = past;
        }
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_account(&self, user: NewUser, affiliation: Affiliation) -> Result<UserEntry> {
        let mut tables = self.tables.write().await;
        let email = user.email.to_lowercase();
        if tables.users.iter().any(|u| u.email.to_lowercase() == email) {
            return Err(Error::Conflict("email already registered".into()));
        }
        if let Affiliation::Professional(profile) = &affiliation {
            if tables
                .professionals
                .iter()
                .any(|p| p.id_number == profile.id_number)
            {
                return Err(Error::Conflict("id number already registered".into()));
            }
        }

        let now = Utc::now();
        let entry = UserEntry {
            id: user.id,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            name: user.name,
            phone: user.phone,
            is_verified: false,
            is_active: true,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        };
        match affiliation {
            Affiliation::Professional(profile) => tables.professionals.push(profile),
            Affiliation::HospitalAdmin { hospital_id } => {
                let exists = tables
                    .admins
                    .iter()
                    .any(|a| a.user_id == entry.id && a.hospital_id == hospital_id);
                if !exists {
                    let is_primary = !tables.admins.iter().any(|a| a.hospital_id == hospital_id);
                    tables.admins.push(HospitalAdminEntry {
                        id: Uuid::new_v4(),
                        user_id: entry.id,
                        hospital_id,
                        role: "admin".into(),
                        is_primary,
                        created_at: now,
                    });
                }
            }
            Affiliation::None => {}
        }
        tables.users.push(entry.clone());
        Ok(entry)
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<UserEntry>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserEntry>> {
        let tables = self.tables.read().await;
        let email = email.to_lowercase();
        Ok(tables
            .users
            .iter()
            .find(|u| u.email.to_lowercase() == email)
            .cloned())
    }

    async fn touch_last_login(&self, id: Uuid) -> Result<()> {
        let mut tables = self.tables.write().await;
        if let Some(user) = tables.users.iter_mut().find(|u| u.id == id) {
            let now = Utc::now();
            user.last_login_at = Some(now);
            user.updated_at = now;
        }
        Ok(())
    }

    async fn update_contact(
        &self,
        id: Uuid,
        name: Option<String>,
        phone: Option<String>,
    ) -> Result<()> {
        let mut tables = self.tables.write().await;
        if let Some(user) = tables.users.iter_mut().find(|u| u.id == id) {
            if let Some(name) = name {
                user.name = name;
            }
            if let Some(phone) = phone {
                user.phone = Some(phone);
            }
            user.updated_at = Utc::now();
        }
        Ok(())
    }
}

#[async_trait]
impl TokenStore for MemoryStore {
    async fn insert_refresh_token(&self, token: NewRefreshToken) -> Result<RefreshTokenEntry> {
        let entry = RefreshTokenEntry {
            id: token.id,
            user_id: token.user_id,
            token_hash: token.token_hash,
            expires_at: token.expires_at,
            is_revoked: false,
            created_at: Utc::now(),
        };
        self.tables.write().await.tokens.push(entry.clone());
        Ok(entry)
    }

    async fn latest_active_refresh_token(
        &self,
        user_id: Uuid,
    ) -> Result<Option<RefreshTokenEntry>> {
        let tables = self.tables.read().await;
        // max_by_key keeps the last maximum, so insertion order breaks ties
        Ok(tables
            .tokens
            .iter()
            .filter(|t| t.user_id == user_id && !t.is_revoked)
            .max_by_key(|t| t.created_at)
            .cloned())
    }

    async fn revoke_refresh_token(&self, id: Uuid) -> Result<bool> {
        let mut tables = self.tables.write().await;
        match tables
            .tokens
            .iter_mut()
            .find(|t| t.id == id && !t.is_revoked)
        {
            Some(token) => {
                token.is_revoked = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn revoke_user_refresh_tokens(&self, user_id: Uuid) -> Result<u64> {
        let mut tables = self.tables.write().await;
        let mut revoked = 0;
        for token in tables
            .tokens
            .iter_mut()
            .filter(|t| t.user_id == user_id && !t.is_revoked)
        {
            token.is_revoked = true;
            revoked += 1;
        }
        Ok(revoked)
    }
}

#[async_trait]
impl ProfessionalStore for MemoryStore {
    async fn find_profile(&self, id: Uuid) -> Result<Option<ProfessionalEntry>> {
        let tables = self.tables.read().await;
        Ok(tables.professionals.iter().find(|p| p.id == id).cloned())
    }

    async fn find_profile_by_user(&self, user_id: Uuid) -> Result<Option<ProfessionalEntry>> {
        let tables = self.tables.read().await;
        Ok(tables
            .professionals
            .iter()
            .find(|p| p.user_id == user_id)
            .cloned())
    }

    async fn save_profile(&self, profile: &ProfessionalEntry) -> Result<()> {
        let mut tables = self.tables.write().await;
        if let Some(stored) = tables.professionals.iter_mut().find(|p| p.id == profile.id) {
            let mut updated = profile.clone();
            // counters are owned by the increment paths
            updated.total_applications = stored.total_applications;
            updated.total_completed_jobs = stored.total_completed_jobs;
            updated.updated_at = Utc::now();
            *stored = updated;
        }
        Ok(())
    }
}

#[async_trait]
impl HospitalStore for MemoryStore {
    async fn find_hospital(&self, id: Uuid) -> Result<Option<HospitalEntry>> {
        let tables = self.tables.read().await;
        Ok(tables.hospitals.iter().find(|h| h.id == id).cloned())
    }

    async fn find_hospital_by_code(&self, code: &str) -> Result<Option<HospitalEntry>> {
        let tables = self.tables.read().await;
        Ok(tables.hospitals.iter().find(|h| h.code == code).cloned())
    }

    async fn list_hospitals(&self, filter: &HospitalFilter) -> Result<Vec<HospitalEntry>> {
        let tables = self.tables.read().await;
        let mut hospitals: Vec<HospitalEntry> = tables
            .hospitals
            .iter()
            .filter(|h| filter.matches(h))
            .cloned()
            .collect();
        hospitals.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(hospitals)
    }

    async fn find_admin_binding(
        &self,
        user_id: Uuid,
        hospital_id: Uuid,
    ) -> Result<Option<HospitalAdminEntry>> {
        let tables = self.tables.read().await;
        Ok(tables
            .admins
            .iter()
            .find(|a| a.user_id == user_id && a.hospital_id == hospital_id)
            .cloned())
    }

    async fn admin_bindings(&self, user_id: Uuid) -> Result<Vec<HospitalAdminEntry>> {
        let tables = self.tables.read().await;
        Ok(tables
            .admins
            .iter()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl JobStore for MemoryStore {
    async fn insert_job(&self, job: &JobPosting) -> Result<()> {
        let mut tables = self.tables.write().await;
        if tables.jobs.iter().any(|j| j.id == job.id) {
            return Err(Error::Conflict("job posting already exists".into()));
        }
        tables.jobs.push(job.clone());
        Ok(())
    }

    async fn find_job(&self, id: Uuid) -> Result<Option<JobPosting>> {
        let tables = self.tables.read().await;
        Ok(tables.job(id).cloned())
    }

    async fn search_jobs(
        &self,
        filter: &JobFilter,
        page: &PageRequest,
    ) -> Result<(Vec<JobPosting>, u64)> {
        let tables = self.tables.read().await;
        let mut matched: Vec<JobPosting> = tables
            .jobs
            .iter()
            .rev()
            .filter(|j| filter.matches(j, tables.hospital_name(j.hospital_id)))
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let total = matched.len() as u64;
        Ok((page.slice(matched), total))
    }

    async fn save_job(&self, job: &JobPosting) -> Result<()> {
        let mut tables = self.tables.write().await;
        if let Some(stored) = tables
            .jobs
            .iter_mut()
            .find(|j| j.id == job.id && !j.deletion.is_deleted())
        {
            let mut updated = job.clone();
            updated.views_count = stored.views_count;
            updated.applications_count = stored.applications_count;
            updated.deletion = stored.deletion;
            updated.updated_at = Utc::now();
            *stored = updated;
        }
        Ok(())
    }

    async fn soft_delete_job(&self, id: Uuid, at: DateTime<Utc>) -> Result<()> {
        let mut tables = self.tables.write().await;
        if let Some(job) = tables
            .jobs
            .iter_mut()
            .find(|j| j.id == id && !j.deletion.is_deleted())
        {
            job.deletion = Deletion::Deleted(at);
            job.updated_at = at;
        }
        Ok(())
    }

    async fn increment_job_views(&self, id: Uuid) -> Result<()> {
        let mut tables = self.tables.write().await;
        if let Some(job) = tables.jobs.iter_mut().find(|j| j.id == id) {
            job.views_count += 1;
        }
        Ok(())
    }
}

#[async_trait]
impl ApplicationStore for MemoryStore {
    async fn submit_application(&self, application: &Application) -> Result<()> {
        let mut tables = self.tables.write().await;
        if tables.applications.iter().any(|a| {
            a.job_id == application.job_id && a.professional_id == application.professional_id
        }) {
            return Err(Error::Conflict("already applied to this job".into()));
        }
        tables.applications.push(application.clone());
        if let Some(job) = tables.jobs.iter_mut().find(|j| j.id == application.job_id) {
            job.applications_count += 1;
        }
        if let Some(profile) = tables
            .professionals
            .iter_mut()
            .find(|p| p.id == application.professional_id)
        {
            profile.total_applications += 1;
        }
        Ok(())
    }

    async fn find_application(&self, id: Uuid) -> Result<Option<Application>> {
        let tables = self.tables.read().await;
        Ok(tables.applications.iter().find(|a| a.id == id).cloned())
    }

    async fn find_application_for(
        &self,
        job_id: Uuid,
        professional_id: Uuid,
    ) -> Result<Option<Application>> {
        let tables = self.tables.read().await;
        Ok(tables
            .applications
            .iter()
            .find(|a| a.job_id == job_id && a.professional_id == professional_id)
            .cloned())
    }

    async fn list_applications(
        &self,
        scope: ApplicationScope,
        status: Option<ApplicationStatus>,
        page: &PageRequest,
    ) -> Result<(Vec<Application>, u64)> {
        let tables = self.tables.read().await;
        let mut matched: Vec<Application> = tables
            .applications
            .iter()
            .rev()
            .filter(|a| match scope {
                ApplicationScope::Applicant(user_id) => a.user_id == user_id,
                ApplicationScope::Hospital(hospital_id) => tables
                    .job(a.job_id)
                    .is_some_and(|j| j.hospital_id == hospital_id),
                ApplicationScope::Everything => true,
            })
            .filter(|a| status.is_none_or(|s| a.status == s))
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.applied_at.cmp(&a.applied_at));
        let total = matched.len() as u64;
        Ok((page.slice(matched), total))
    }

    async fn transition_application(
        &self,
        application: &Application,
        expected: ApplicationStatus,
    ) -> Result<bool> {
        let mut tables = self.tables.write().await;
        match tables
            .applications
            .iter_mut()
            .find(|a| a.id == application.id && a.status == expected)
        {
            Some(stored) => {
                stored.status = application.status;
                stored.review_note = application.review_note.clone();
                stored.reviewed_by = application.reviewed_by;
                stored.reviewed_at = application.reviewed_at;
                stored.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pkg::internal::adaptors::{
        professionals::spec::ProfessionalType, users::spec::Role,
    };

    fn new_user(email: &str) -> NewUser {
        NewUser {
            id: Uuid::new_v4(),
            email: email.into(),
            password_hash: "hash".into(),
            role: Role::HospitalAdmin,
            name: "Admin".into(),
            phone: None,
        }
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() {
        let store = MemoryStore::new();
        store
            .create_account(new_user("a@example.com"), Affiliation::None)
            .await
            .unwrap();
        let err = store
            .create_account(new_user("A@Example.com"), Affiliation::None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
    }

    #[tokio::test]
    async fn first_admin_is_primary() {
        let store = MemoryStore::seeded().await;
        let hospital = store.find_hospital_by_code("HOSP001").await.unwrap().unwrap();
        let first = store
            .create_account(
                new_user("first@example.com"),
                Affiliation::HospitalAdmin { hospital_id: hospital.id },
            )
            .await
            .unwrap();
        let second = store
            .create_account(
                new_user("second@example.com"),
                Affiliation::HospitalAdmin { hospital_id: hospital.id },
            )
            .await
            .unwrap();

        let first = store.find_admin_binding(first.id, hospital.id).await.unwrap().unwrap();
        let second = store.find_admin_binding(second.id, hospital.id).await.unwrap().unwrap();
        assert!(first.is_primary);
        assert!(!second.is_primary);
    }

    #[tokio::test]
    async fn revoke_only_succeeds_once() {
        let store = MemoryStore::new();
        let user_id = Uuid::new_v4();
        let token = store
            .insert_refresh_token(NewRefreshToken {
                id: Uuid::new_v4(),
                user_id,
                token_hash: "h".into(),
                expires_at: Utc::now(),
            })
            .await
            .unwrap();
        assert!(store.revoke_refresh_token(token.id).await.unwrap());
        assert!(!store.revoke_refresh_token(token.id).await.unwrap());
        assert!(store.latest_active_refresh_token(user_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn hospitals_are_listed_by_name() {
        let store = MemoryStore::seeded().await;
        let filter = HospitalFilter {
            county: Some("台東縣".into()),
            ..Default::default()
        };
        let hospitals = store.list_hospitals(&filter).await.unwrap();
        assert_eq!(hospitals.len(), 2);
        assert!(hospitals.windows(2).all(|w| w[0].name <= w[1].name));
    }

    #[tokio::test]
    async fn duplicate_submission_keeps_counters() {
        let store = MemoryStore::new();
        let user = new_user("doc@example.com");
        let profile = ProfessionalEntry::new(
            user.id,
            "A123456789".into(),
            ProfessionalType::Doctor,
            "醫字第1號".into(),
        );
        let user_id = user.id;
        let profile_id = profile.id;
        store
            .create_account(user, Affiliation::Professional(profile))
            .await
            .unwrap();

        let now = Utc::now();
        let application = Application {
            id: Uuid::new_v4(),
            job_id: Uuid::new_v4(),
            professional_id: profile_id,
            user_id,
            cover_letter: None,
            available_start_date: None,
            status: ApplicationStatus::Pending,
            review_note: None,
            reviewed_by: None,
            reviewed_at: None,
            applied_at: now,
            updated_at: now,
        };
        store.submit_application(&application).await.unwrap();
        let again = Application {
            id: Uuid::new_v4(),
            ..application.clone()
        };
        let err = store.submit_application(&again).await.unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));

        let profile = store.find_profile(profile_id).await.unwrap().unwrap();
        assert_eq!(profile.total_applications, 1);
    }
}
