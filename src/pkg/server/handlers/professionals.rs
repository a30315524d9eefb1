use std::sync::Arc;

use axum::{Extension, Json, extract::State};
use axum_extra::extract::WithRejection;

use crate::{
    pkg::{
        internal::{
            access::Actor,
            professionals::{self, AvailabilityInput, ProfileView, UpdateProfileInput},
        },
        server::{envelope::ApiResponse, handlers::Body, state::AppState},
    },
    prelude::Result,
};

pub async fn get_profile(
    State(state): State<AppState>,
    Extension(actor): Extension<Arc<Actor>>,
) -> Result<ApiResponse<ProfileView>> {
    Ok(ApiResponse::data(professionals::get_profile(&state, &actor).await?))
}

pub async fn update_profile(
    State(state): State<AppState>,
    Extension(actor): Extension<Arc<Actor>>,
    WithRejection(Json(input), _): Body<UpdateProfileInput>,
) -> Result<ApiResponse<ProfileView>> {
    let profile = professionals::update_profile(&state, &actor, input).await?;
    Ok(ApiResponse::data(profile).with_message("profile updated"))
}

pub async fn set_availability(
    State(state): State<AppState>,
    Extension(actor): Extension<Arc<Actor>>,
    WithRejection(Json(input), _): Body<AvailabilityInput>,
) -> Result<ApiResponse<()>> {
    professionals::set_availability(&state, &actor, input).await?;
    Ok(ApiResponse::message("availability updated"))
}
