//! Fixtures shared by the service tests.

use std::sync::Arc;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    pkg::{
        internal::{
            access::Actor,
            adaptors::{
                Store, jobs::spec::Weekday, memory::MemoryStore,
                professionals::spec::ProfessionalType, users::spec::Role,
            },
            auth::{self, RegisterInput, SessionConfig},
            jobs::{CreateJobInput, SalaryInput},
        },
        server::state::AppState,
    },
    prelude::Result,
};

pub const PASSWORD: &str = "password123";

pub async fn memory_state() -> (AppState, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::seeded().await);
    let state = AppState::with_store(store.clone() as Arc<dyn Store>, SessionConfig::testing());
    (state, store)
}

pub fn professional_input(email: &str, id_number: &str) -> RegisterInput {
    RegisterInput {
        email: email.into(),
        password: PASSWORD.into(),
        user_type: Role::HealthcareProfessional,
        name: "王大明".into(),
        phone: "0912345678".into(),
        id_number: Some(id_number.into()),
        professional_type: Some(ProfessionalType::Doctor),
        license_number: Some("醫字第123456號".into()),
        hospital_code: None,
    }
}

fn actor(id: Uuid, email: &str, name: &str, role: Role) -> Actor {
    Actor {
        user_id: id,
        email: email.into(),
        name: name.into(),
        role,
    }
}

pub async fn professional(state: &AppState, email: &str, id_number: &str) -> Result<Actor> {
    let input = professional_input(email, id_number);
    let name = input.name.clone();
    let id = auth::register(state, input).await?;
    Ok(actor(id, email, &name, Role::HealthcareProfessional))
}

pub async fn hospital_admin(state: &AppState, email: &str, hospital_code: &str) -> Result<Actor> {
    let input = RegisterInput {
        email: email.into(),
        password: PASSWORD.into(),
        user_type: Role::HospitalAdmin,
        name: "林院長".into(),
        phone: "0898765432".into(),
        id_number: None,
        professional_type: None,
        license_number: None,
        hospital_code: Some(hospital_code.into()),
    };
    let id = auth::register(state, input).await?;
    Ok(actor(id, email, "林院長", Role::HospitalAdmin))
}

pub async fn system_admin(state: &AppState) -> Result<Actor> {
    let email = "root@example.com";
    let id = auth::provision_system_admin(state, email, PASSWORD, "System").await?;
    Ok(actor(id, email, "System", Role::SystemAdmin))
}

pub fn job_input(county: &str, township: &str) -> CreateJobInput {
    CreateJobInput {
        hospital_id: None,
        county: county.into(),
        township: township.into(),
        professional_type: ProfessionalType::Doctor,
        specialty: Some("家庭醫學科".into()),
        number_of_positions: 1,
        job_type: Default::default(),
        service_type: None,
        service_days: vec![Weekday::Monday, Weekday::Wednesday],
        service_start_date: NaiveDate::from_ymd_opt(2026, 11, 2).unwrap(),
        service_end_date: NaiveDate::from_ymd_opt(2026, 11, 30).unwrap(),
        is_public_funded: false,
        meal_provided: true,
        accommodation_provided: false,
        transportation_provided: false,
        salary: Some(SalaryInput {
            amount: 8000.0,
            currency: None,
            unit: "per_day".into(),
        }),
        contact_info: None,
        remarks: None,
        requirements: None,
    }
}
