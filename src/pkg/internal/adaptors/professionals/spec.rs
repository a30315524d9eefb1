use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::pkg::internal::adaptors::jobs::spec::Weekday;
use crate::prelude::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "professional_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ProfessionalType {
    Doctor,
    Nurse,
    RegisteredNurse,
    Pharmacist,
    PharmacyTechnician,
    MedicalTechnologist,
    MedicalLaboratoryTechnician,
}

#[derive(Debug, Clone, FromRow)]
pub struct ProfessionalEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub id_number: String,
    pub professional_type: ProfessionalType,
    pub license_number: String,
    #[sqlx(json)]
    pub specialties: Vec<String>,
    pub years_of_experience: Option<i32>,
    pub current_hospital: Option<String>,
    pub available_for_support: bool,
    #[sqlx(json)]
    pub available_regions: Vec<String>,
    #[sqlx(json)]
    pub available_days: Vec<Weekday>,
    pub bio: Option<String>,
    pub completion_rate: i32,
    pub rating: f64,
    pub total_applications: i32,
    pub total_completed_jobs: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProfessionalEntry {
    pub fn new(
        user_id: Uuid,
        id_number: String,
        professional_type: ProfessionalType,
        license_number: String,
    ) -> Self {
        let now = Utc::now();
        let mut entry = ProfessionalEntry {
            id: Uuid::new_v4(),
            user_id,
            id_number,
            professional_type,
            license_number,
            specialties: Vec::new(),
            years_of_experience: None,
            current_hospital: None,
            available_for_support: true,
            available_regions: Vec::new(),
            available_days: Vec::new(),
            bio: None,
            completion_rate: 0,
            rating: 0.0,
            total_applications: 0,
            total_completed_jobs: 0,
            created_at: now,
            updated_at: now,
        };
        entry.completion_rate = entry.completion_rate();
        entry
    }

    /// Percentage of the eight profile facts that are filled in.
    pub fn completion_rate(&self) -> i32 {
        let filled = [
            true,
            !self.license_number.trim().is_empty(),
            !self.specialties.is_empty(),
            self.years_of_experience.is_some(),
            self.current_hospital.as_deref().is_some_and(|h| !h.is_empty()),
            self.bio.as_deref().is_some_and(|b| !b.is_empty()),
            !self.available_regions.is_empty(),
            !self.available_days.is_empty(),
        ];
        let count = filled.iter().filter(|f| **f).count() as f64;
        (count / filled.len() as f64 * 100.0).round() as i32
    }
}

#[async_trait]
pub trait ProfessionalStore: Send + Sync {
    async fn find_profile(&self, id: Uuid) -> Result<Option<ProfessionalEntry>>;
    async fn find_profile_by_user(&self, user_id: Uuid) -> Result<Option<ProfessionalEntry>>;
    /// Persists every editable column of the profile.
    async fn save_profile(&self, profile: &ProfessionalEntry) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_profile_counts_type_and_license() {
        let profile = ProfessionalEntry::new(
            Uuid::new_v4(),
            "A123456789".into(),
            ProfessionalType::Doctor,
            "L-1".into(),
        );
        assert_eq!(profile.completion_rate, 25);
    }

    #[test]
    fn complete_profile_is_full() {
        let mut profile = ProfessionalEntry::new(
            Uuid::new_v4(),
            "A123456789".into(),
            ProfessionalType::Nurse,
            "L-2".into(),
        );
        profile.specialties = vec!["內科".into()];
        profile.years_of_experience = Some(3);
        profile.current_hospital = Some("台東醫院".into());
        profile.bio = Some("bio".into());
        profile.available_regions = vec!["台東縣".into()];
        profile.available_days = vec![Weekday::Monday];
        assert_eq!(profile.completion_rate(), 100);

        profile.bio = Some(String::new());
        assert_eq!(profile.completion_rate(), 88);
    }
}
