use axum::extract::{Query, State};
use axum_extra::extract::WithRejection;
use serde::Deserialize;

use crate::{
    pkg::{
        internal::{
            adaptors::hospitals::spec::HospitalFilter,
            directory::{self, HospitalListing, Region, Specialty},
        },
        server::{envelope::ApiResponse, handlers::Params, state::AppState},
    },
    prelude::Result,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecialtyQuery {
    pub professional_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HospitalQuery {
    pub county: Option<String>,
    pub township: Option<String>,
    pub search: Option<String>,
}

pub async fn regions() -> ApiResponse<&'static [Region]> {
    ApiResponse::data(directory::regions())
}

pub async fn specialties(
    WithRejection(Query(query), _): Params<SpecialtyQuery>,
) -> ApiResponse<Vec<Specialty>> {
    ApiResponse::data(directory::specialties(query.professional_type.as_deref()))
}

pub async fn hospitals(
    State(state): State<AppState>,
    WithRejection(Query(query), _): Params<HospitalQuery>,
) -> Result<ApiResponse<Vec<HospitalListing>>> {
    let filter = HospitalFilter {
        county: query.county,
        township: query.township,
        search: query.search,
    };
    Ok(ApiResponse::data(directory::hospitals(&state, &filter).await?))
}
