use uuid::Uuid;

use crate::{
    pkg::internal::adaptors::{Store, users::spec::Role},
    prelude::{Error, Result},
};

/// The authenticated caller, as inserted into request extensions.
#[derive(Debug, Clone)]
pub struct Actor {
    pub user_id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
}

/// Capability being exercised. The flags carry the caller's relationship to
/// the entity: `owner` when the caller is the applicant, `bound` when the
/// caller administers the hospital that owns the entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    CreateApplication,
    ListApplications,
    ViewApplication { owner: bool, bound: bool },
    CancelApplication { owner: bool },
    ReviewApplication { bound: bool },
    ManageJob { bound: bool },
    ManageProfile,
}

impl Action {
    fn denial(&self) -> &'static str {
        match self {
            Action::CreateApplication => "only healthcare professionals can apply",
            Action::ListApplications => "not allowed to list applications",
            Action::ViewApplication { .. } => "not allowed to view this application",
            Action::CancelApplication { .. } => "only the applicant can cancel an application",
            Action::ReviewApplication { .. } => "not allowed to review this application",
            Action::ManageJob { .. } => "not allowed to manage this job posting",
            Action::ManageProfile => "only healthcare professionals have a profile",
        }
    }
}

pub fn authorize(actor: &Actor, action: Action) -> Result<()> {
    use Role::*;
    let allowed = match (actor.role, action) {
        (HealthcareProfessional, Action::CreateApplication) => true,
        (HealthcareProfessional, Action::ManageProfile) => true,
        (_, Action::ListApplications) => true,
        (HealthcareProfessional, Action::ViewApplication { owner, .. }) => owner,
        (HealthcareProfessional, Action::CancelApplication { owner }) => owner,
        (HospitalAdmin, Action::ViewApplication { bound, .. }) => bound,
        (HospitalAdmin, Action::ReviewApplication { bound }) => bound,
        (HospitalAdmin, Action::ManageJob { bound }) => bound,
        (SystemAdmin, Action::ViewApplication { .. }) => true,
        (SystemAdmin, Action::ReviewApplication { .. }) => true,
        (SystemAdmin, Action::ManageJob { .. }) => true,
        _ => false,
    };
    if allowed {
        Ok(())
    } else {
        tracing::debug!(user = %actor.user_id, ?action, "access denied");
        Err(Error::Forbidden(action.denial().into()))
    }
}

/// Whether the actor is a hospital admin bound to `hospital_id`.
pub async fn administers(store: &dyn Store, actor: &Actor, hospital_id: Uuid) -> Result<bool> {
    if actor.role != Role::HospitalAdmin {
        return Ok(false);
    }
    Ok(store
        .find_admin_binding(actor.user_id, hospital_id)
        .await?
        .is_some())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor(role: Role) -> Actor {
        Actor {
            user_id: Uuid::new_v4(),
            email: "someone@example.com".into(),
            name: "Someone".into(),
            role,
        }
    }

    #[test]
    fn only_professionals_apply() {
        assert!(authorize(&actor(Role::HealthcareProfessional), Action::CreateApplication).is_ok());
        for role in [Role::HospitalAdmin, Role::SystemAdmin] {
            let err = authorize(&actor(role), Action::CreateApplication).unwrap_err();
            assert!(matches!(err, Error::Forbidden(_)));
        }
    }

    #[test]
    fn cancel_is_owner_only() {
        let professional = actor(Role::HealthcareProfessional);
        assert!(authorize(&professional, Action::CancelApplication { owner: true }).is_ok());
        assert!(authorize(&professional, Action::CancelApplication { owner: false }).is_err());
        assert!(authorize(&actor(Role::SystemAdmin), Action::CancelApplication { owner: false }).is_err());
    }

    #[test]
    fn review_requires_binding_or_system_admin() {
        let admin = actor(Role::HospitalAdmin);
        assert!(authorize(&admin, Action::ReviewApplication { bound: true }).is_ok());
        assert!(authorize(&admin, Action::ReviewApplication { bound: false }).is_err());
        assert!(authorize(&actor(Role::SystemAdmin), Action::ReviewApplication { bound: false }).is_ok());
        assert!(
            authorize(&actor(Role::HealthcareProfessional), Action::ReviewApplication { bound: true })
                .is_err()
        );
    }

    #[test]
    fn viewing_applications() {
        let professional = actor(Role::HealthcareProfessional);
        let view = |owner, bound| Action::ViewApplication { owner, bound };
        assert!(authorize(&professional, view(true, false)).is_ok());
        assert!(authorize(&professional, view(false, true)).is_err());
        assert!(authorize(&actor(Role::HospitalAdmin), view(false, true)).is_ok());
        assert!(authorize(&actor(Role::HospitalAdmin), view(false, false)).is_err());
        assert!(authorize(&actor(Role::SystemAdmin), view(false, false)).is_ok());
    }

    #[test]
    fn job_management() {
        assert!(authorize(&actor(Role::HospitalAdmin), Action::ManageJob { bound: true }).is_ok());
        assert!(authorize(&actor(Role::HospitalAdmin), Action::ManageJob { bound: false }).is_err());
        assert!(authorize(&actor(Role::SystemAdmin), Action::ManageJob { bound: false }).is_ok());
        assert!(
            authorize(&actor(Role::HealthcareProfessional), Action::ManageJob { bound: true }).is_err()
        );
    }
}
