use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    response::Response,
};
use axum_extra::extract::WithRejection;
use serde::Deserialize;

use crate::{
    pkg::{
        internal::{
            access::Actor,
            adaptors::applications::spec::ApplicationStatus,
            applications::{self, ApplicationView, CreateApplicationInput, ReviewInput},
            paging::PageRequest,
        },
        server::{
            envelope::ApiResponse,
            handlers::{Body, Id, Params},
            state::AppState,
        },
    },
    prelude::Result,
};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<ApplicationStatus>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

pub async fn list(
    State(state): State<AppState>,
    Extension(actor): Extension<Arc<Actor>>,
    WithRejection(Query(query), _): Params<ListQuery>,
) -> Result<ApiResponse<Vec<ApplicationView>>> {
    let page = PageRequest::new(query.page, query.limit)?;
    let found = applications::list(&state, &actor, query.status, page).await?;
    Ok(ApiResponse::paged(found))
}

pub async fn get(
    State(state): State<AppState>,
    Extension(actor): Extension<Arc<Actor>>,
    WithRejection(Path(id), _): Id,
) -> Result<ApiResponse<ApplicationView>> {
    Ok(ApiResponse::data(applications::get(&state, &actor, id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(actor): Extension<Arc<Actor>>,
    WithRejection(Json(input), _): Body<CreateApplicationInput>,
) -> Result<Response> {
    let application = applications::create(&state, &actor, input).await?;
    Ok(ApiResponse::data(application)
        .with_message("application submitted")
        .created())
}

pub async fn cancel(
    State(state): State<AppState>,
    Extension(actor): Extension<Arc<Actor>>,
    WithRejection(Path(id), _): Id,
) -> Result<ApiResponse<()>> {
    applications::cancel(&state, &actor, id).await?;
    Ok(ApiResponse::message("application cancelled"))
}

pub async fn review(
    State(state): State<AppState>,
    Extension(actor): Extension<Arc<Actor>>,
    WithRejection(Path(id), _): Id,
    WithRejection(Json(input), _): Body<ReviewInput>,
) -> Result<ApiResponse<ApplicationView>> {
    let application = applications::review(&state, &actor, id, input).await?;
    Ok(ApiResponse::data(application).with_message("application reviewed"))
}
