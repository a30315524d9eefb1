use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::pkg::internal::adaptors::professionals::spec::ProfessionalEntry;
use crate::prelude::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    HealthcareProfessional,
    HospitalAdmin,
    SystemAdmin,
}

#[derive(Debug, Clone, FromRow)]
pub struct UserEntry {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub name: String,
    pub phone: Option<String>,
    pub is_verified: bool,
    pub is_active: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub name: String,
    pub phone: Option<String>,
}

/// What gets created alongside the user row, in the same unit of work.
#[derive(Debug, Clone)]
pub enum Affiliation {
    Professional(ProfessionalEntry),
    HospitalAdmin { hospital_id: Uuid },
    None,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `Conflict` when the email is taken.
    async fn create_account(&self, user: NewUser, affiliation: Affiliation) -> Result<UserEntry>;
    async fn find_user(&self, id: Uuid) -> Result<Option<UserEntry>>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserEntry>>;
    async fn touch_last_login(&self, id: Uuid) -> Result<()>;
    async fn update_contact(
        &self,
        id: Uuid,
        name: Option<String>,
        phone: Option<String>,
    ) -> Result<()>;
}
