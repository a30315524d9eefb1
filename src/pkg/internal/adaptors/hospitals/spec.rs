use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::prelude::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "hospital_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum HospitalType {
    MedicalCenter,
    RegionalHospital,
    DistrictHospital,
    Clinic,
}

#[derive(Debug, Clone, FromRow)]
pub struct HospitalEntry {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub county: String,
    pub township: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub hospital_type: Option<HospitalType>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct HospitalAdminEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub hospital_id: Uuid,
    pub role: String,
    pub is_primary: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct HospitalFilter {
    pub county: Option<String>,
    pub township: Option<String>,
    pub search: Option<String>,
}

impl HospitalFilter {
    pub fn matches(&self, hospital: &HospitalEntry) -> bool {
        hospital.is_active
            && self.county.as_ref().is_none_or(|c| &hospital.county == c)
            && self.township.as_ref().is_none_or(|t| &hospital.township == t)
            && self
                .search
                .as_ref()
                .is_none_or(|s| hospital.name.to_lowercase().contains(&s.to_lowercase()))
    }
}

#[async_trait]
pub trait HospitalStore: Send + Sync {
    async fn find_hospital(&self, id: Uuid) -> Result<Option<HospitalEntry>>;
    async fn find_hospital_by_code(&self, code: &str) -> Result<Option<HospitalEntry>>;
    /// Active hospitals only, ordered by name.
    async fn list_hospitals(&self, filter: &HospitalFilter) -> Result<Vec<HospitalEntry>>;
    async fn find_admin_binding(
        &self,
        user_id: Uuid,
        hospital_id: Uuid,
    ) -> Result<Option<HospitalAdminEntry>>;
    /// Oldest binding first.
    async fn admin_bindings(&self, user_id: Uuid) -> Result<Vec<HospitalAdminEntry>>;
}
