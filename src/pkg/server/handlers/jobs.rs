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
            adaptors::jobs::spec::JobFilter,
            jobs::{self, CreateJobInput, JobView, UpdateJobInput},
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

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl PageQuery {
    pub fn request(&self) -> Result<PageRequest> {
        PageRequest::new(self.page, self.limit)
    }
}

pub async fn search(
    State(state): State<AppState>,
    WithRejection(Query(page), _): Params<PageQuery>,
    WithRejection(Query(filter), _): Params<JobFilter>,
) -> Result<ApiResponse<Vec<JobView>>> {
    let found = jobs::search(&state, &filter, page.request()?).await?;
    Ok(ApiResponse::paged(found))
}

pub async fn get(
    State(state): State<AppState>,
    WithRejection(Path(id), _): Id,
) -> Result<ApiResponse<JobView>> {
    Ok(ApiResponse::data(jobs::get(&state, id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(actor): Extension<Arc<Actor>>,
    WithRejection(Json(input), _): Body<CreateJobInput>,
) -> Result<Response> {
    let job = jobs::create(&state, &actor, input).await?;
    Ok(ApiResponse::data(job)
        .with_message("job posting created")
        .created())
}

pub async fn update(
    State(state): State<AppState>,
    Extension(actor): Extension<Arc<Actor>>,
    WithRejection(Path(id), _): Id,
    WithRejection(Json(input), _): Body<UpdateJobInput>,
) -> Result<ApiResponse<JobView>> {
    let job = jobs::update(&state, &actor, id, input).await?;
    Ok(ApiResponse::data(job).with_message("job posting updated"))
}

pub async fn close(
    State(state): State<AppState>,
    Extension(actor): Extension<Arc<Actor>>,
    WithRejection(Path(id), _): Id,
) -> Result<ApiResponse<()>> {
    jobs::close(&state, &actor, id).await?;
    Ok(ApiResponse::message("job posting closed"))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(actor): Extension<Arc<Actor>>,
    WithRejection(Path(id), _): Id,
) -> Result<ApiResponse<()>> {
    jobs::remove(&state, &actor, id).await?;
    Ok(ApiResponse::message("job posting deleted"))
}
