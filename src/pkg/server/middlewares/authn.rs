use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};

use crate::{
    pkg::{internal::auth, server::state::AppState},
    prelude::{Error, Result},
};

/// Resolves the bearer access token into an `Actor` request extension.
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response> {
    let Some(bearer) = request.headers().typed_get::<Authorization<Bearer>>() else {
        tracing::warn!(path = %request.uri().path(), "bearer token missing, authentication denied");
        return Err(Error::Unauthorized);
    };
    let actor = auth::authenticate(&state, bearer.token()).await?;
    request.extensions_mut().insert(Arc::new(actor));
    Ok(next.run(request).await)
}
