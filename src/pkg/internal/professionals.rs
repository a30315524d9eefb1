use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{
    pkg::{
        internal::{
            access::{Action, Actor, authorize},
            adaptors::{
                jobs::spec::Weekday,
                professionals::spec::{ProfessionalEntry, ProfessionalType},
                users::spec::UserEntry,
            },
            auth::validate_phone,
        },
        server::state::AppState,
    },
    prelude::{Error, Result},
};

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileInput {
    #[validate(length(min = 2, max = 100))]
    pub name: Option<String>,
    #[validate(custom(function = "validate_phone"))]
    pub phone: Option<String>,
    pub specialties: Option<Vec<String>>,
    #[validate(range(min = 0))]
    pub years_of_experience: Option<i32>,
    #[validate(length(max = 200))]
    pub current_hospital: Option<String>,
    pub available_for_support: Option<bool>,
    pub available_regions: Option<Vec<String>>,
    pub available_days: Option<Vec<Weekday>>,
    pub bio: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityInput {
    pub available_days: Option<Vec<Weekday>>,
    pub available_regions: Option<Vec<String>>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub id_number: String,
    pub professional_type: ProfessionalType,
    pub license_number: String,
    pub specialties: Vec<String>,
    pub years_of_experience: Option<i32>,
    pub current_hospital: Option<String>,
    pub available_for_support: bool,
    pub available_regions: Vec<String>,
    pub available_days: Vec<Weekday>,
    pub bio: Option<String>,
    pub profile_completion_rate: i32,
    pub rating: f64,
    pub total_applications: i32,
    pub total_completed_jobs: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProfileView {
    fn new(user: UserEntry, profile: ProfessionalEntry) -> Self {
        ProfileView {
            user_id: profile.user_id,
            name: user.name,
            email: user.email,
            phone: user.phone,
            id_number: profile.id_number,
            professional_type: profile.professional_type,
            license_number: profile.license_number,
            specialties: profile.specialties,
            years_of_experience: profile.years_of_experience,
            current_hospital: profile.current_hospital,
            available_for_support: profile.available_for_support,
            available_regions: profile.available_regions,
            available_days: profile.available_days,
            bio: profile.bio,
            profile_completion_rate: profile.completion_rate,
            rating: profile.rating,
            total_applications: profile.total_applications,
            total_completed_jobs: profile.total_completed_jobs,
            created_at: profile.created_at,
            updated_at: profile.updated_at,
        }
    }
}

async fn own_profile(state: &AppState, actor: &Actor) -> Result<ProfessionalEntry> {
    authorize(actor, Action::ManageProfile)?;
    state
        .store
        .find_profile_by_user(actor.user_id)
        .await?
        .ok_or_else(|| Error::NotFound("profile not found".into()))
}

pub async fn get_profile(state: &AppState, actor: &Actor) -> Result<ProfileView> {
    let profile = own_profile(state, actor).await?;
    let user = state
        .store
        .find_user(actor.user_id)
        .await?
        .ok_or_else(|| Error::NotFound("profile not found".into()))?;
    Ok(ProfileView::new(user, profile))
}

pub async fn update_profile(
    state: &AppState,
    actor: &Actor,
    input: UpdateProfileInput,
) -> Result<ProfileView> {
    let mut profile = own_profile(state, actor).await?;
    input.validate()?;

    if input.name.is_some() || input.phone.is_some() {
        state
            .store
            .update_contact(actor.user_id, input.name, input.phone)
            .await?;
    }
    if let Some(specialties) = input.specialties {
        profile.specialties = specialties;
    }
    if input.years_of_experience.is_some() {
        profile.years_of_experience = input.years_of_experience;
    }
    if input.current_hospital.is_some() {
        profile.current_hospital = input.current_hospital;
    }
    if let Some(flag) = input.available_for_support {
        profile.available_for_support = flag;
    }
    if let Some(regions) = input.available_regions {
        profile.available_regions = regions;
    }
    if let Some(days) = input.available_days {
        profile.available_days = days;
    }
    if input.bio.is_some() {
        profile.bio = input.bio;
    }
    profile.completion_rate = profile.completion_rate();
    state.store.save_profile(&profile).await?;
    tracing::info!(user = %actor.user_id, completion = profile.completion_rate, "profile updated");
    get_profile(state, actor).await
}

pub async fn set_availability(
    state: &AppState,
    actor: &Actor,
    input: AvailabilityInput,
) -> Result<()> {
    let mut profile = own_profile(state, actor).await?;
    if let (Some(start), Some(end)) = (input.start_date, input.end_date) {
        if end < start {
            return Err(Error::BadRequest("endDate must not be before startDate".into()));
        }
    }
    if let Some(days) = input.available_days {
        profile.available_days = days;
    }
    if let Some(regions) = input.available_regions {
        profile.available_regions = regions;
    }
    profile.completion_rate = profile.completion_rate();
    state.store.save_profile(&profile).await?;
    tracing::info!(user = %actor.user_id, "availability updated");
    Ok(())
}

#[cfg(test)]
mod tests {
    use tracing_test::traced_test;

    use super::*;
    use crate::pkg::internal::testing::{hospital_admin, memory_state, professional};

    #[traced_test]
    #[tokio::test]
    async fn test_update_recomputes_completion() -> Result<()> {
        let (state, _) = memory_state().await;
        let doctor = professional(&state, "doc@example.com", "A123456789").await?;
        assert_eq!(get_profile(&state, &doctor).await?.profile_completion_rate, 25);

        let view = update_profile(
            &state,
            &doctor,
            UpdateProfileInput {
                name: Some("王小明".into()),
                specialties: Some(vec!["家醫科".into()]),
                years_of_experience: Some(6),
                bio: Some("偏鄉支援經驗豐富".into()),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(view.name, "王小明");
        assert_eq!(view.profile_completion_rate, 63);

        set_availability(
            &state,
            &doctor,
            AvailabilityInput {
                available_days: Some(vec![Weekday::Saturday]),
                available_regions: Some(vec!["澎湖縣".into()]),
                ..Default::default()
            },
        )
        .await?;
        let view = get_profile(&state, &doctor).await?;
        assert_eq!(view.available_days, vec![Weekday::Saturday]);
        assert_eq!(view.profile_completion_rate, 88);
        Ok(())
    }

    #[traced_test]
    #[tokio::test]
    async fn test_profile_is_professional_only() -> Result<()> {
        let (state, _) = memory_state().await;
        let admin = hospital_admin(&state, "admin@example.com", "HOSP001").await?;
        assert!(matches!(get_profile(&state, &admin).await, Err(Error::Forbidden(_))));
        Ok(())
    }

    #[traced_test]
    #[tokio::test]
    async fn test_invalid_updates_are_rejected() -> Result<()> {
        let (state, _) = memory_state().await;
        let doctor = professional(&state, "doc@example.com", "A123456789").await?;

        let negative = UpdateProfileInput {
            years_of_experience: Some(-1),
            ..Default::default()
        };
        assert!(matches!(
            update_profile(&state, &doctor, negative).await,
            Err(Error::BadRequest(_))
        ));

        let phone = UpdateProfileInput {
            phone: Some("09-1234".into()),
            ..Default::default()
        };
        let err = update_profile(&state, &doctor, phone).await.unwrap_err();
        assert_eq!(err.to_string(), "invalid input: phone");

        let backwards = AvailabilityInput {
            start_date: NaiveDate::from_ymd_opt(2026, 12, 1),
            end_date: NaiveDate::from_ymd_opt(2026, 11, 1),
            ..Default::default()
        };
        assert!(matches!(
            set_availability(&state, &doctor, backwards).await,
            Err(Error::BadRequest(_))
        ));
        Ok(())
    }
}
