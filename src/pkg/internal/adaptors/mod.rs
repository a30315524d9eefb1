pub mod applications;
pub mod hospitals;
pub mod jobs;
pub mod memory;
pub mod postgres;
pub mod professionals;
pub mod tokens;
pub mod users;

use async_trait::async_trait;

use crate::prelude::Result;
use applications::spec::ApplicationStore;
use hospitals::spec::HospitalStore;
use jobs::spec::JobStore;
use professionals::spec::ProfessionalStore;
use tokens::spec::TokenStore;
use users::spec::UserStore;

/// Everything the services need from persistence.
#[async_trait]
pub trait Store:
    UserStore + TokenStore + ProfessionalStore + HospitalStore + JobStore + ApplicationStore
{
    async fn ping(&self) -> Result<()>;
}
