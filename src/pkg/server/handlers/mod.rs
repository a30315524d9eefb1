pub mod applications;
pub mod auth;
pub mod health;
pub mod jobs;
pub mod professionals;
pub mod system;

use axum::{
    Json,
    extract::{Path, Query},
};
use axum_extra::extract::WithRejection;
use uuid::Uuid;

use crate::prelude::Error;

/// JSON body whose rejections render as the error envelope.
pub type Body<T> = WithRejection<Json<T>, Error>;
pub type Id = WithRejection<Path<Uuid>, Error>;
pub type Params<T> = WithRejection<Query<T>, Error>;
