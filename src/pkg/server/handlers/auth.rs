use std::sync::Arc;

use axum::{Extension, Json, extract::State, response::Response};
use axum_extra::extract::WithRejection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    pkg::{
        internal::{
            access::Actor,
            auth::{self, LoginInput, LoginOutput, RegisterInput, TokenPair},
        },
        server::{envelope::ApiResponse, handlers::Body, state::AppState},
    },
    prelude::Result,
};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshInput {
    pub refresh_token: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registered {
    pub user_id: Uuid,
}

pub async fn register(
    State(state): State<AppState>,
    WithRejection(Json(input), _): Body<RegisterInput>,
) -> Result<Response> {
    let user_id = auth::register(&state, input).await?;
    Ok(ApiResponse::data(Registered { user_id })
        .with_message("registration successful")
        .created())
}

pub async fn login(
    State(state): State<AppState>,
    WithRejection(Json(input), _): Body<LoginInput>,
) -> Result<ApiResponse<LoginOutput>> {
    let output = auth::login(&state, input).await?;
    Ok(ApiResponse::data(output).with_message("login successful"))
}

pub async fn refresh(
    State(state): State<AppState>,
    WithRejection(Json(input), _): Body<RefreshInput>,
) -> Result<ApiResponse<TokenPair>> {
    Ok(ApiResponse::data(auth::refresh(&state, &input.refresh_token).await?))
}

pub async fn logout(
    State(state): State<AppState>,
    Extension(actor): Extension<Arc<Actor>>,
) -> Result<ApiResponse<()>> {
    auth::logout(&state, &actor).await?;
    Ok(ApiResponse::message("logged out"))
}
