//! On-demand revalidation endpoint.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::post,
};
use goty_common::AppResult;
use serde::{Deserialize, Serialize};

use crate::middleware::AppState;

/// Revalidation query.
#[derive(Debug, Deserialize)]
pub struct RevalidateQuery {
    pub secret: Option<String>,
    pub path: Option<String>,
}

/// Revalidation response. Served bare, without the `data` envelope.
#[derive(Serialize)]
pub struct RevalidateResponse {
    pub revalidated: bool,
    pub path: String,
}

/// Purge cached pages for a path.
async fn revalidate(
    State(state): State<AppState>,
    Query(query): Query<RevalidateQuery>,
) -> AppResult<Json<RevalidateResponse>> {
    let outcome = state
        .revalidation_service
        .revalidate(query.secret.as_deref(), query.path.as_deref())
        .await?;

    Ok(Json(RevalidateResponse {
        revalidated: true,
        path: outcome.path,
    }))
}

/// `/revalidate` route.
pub fn router() -> Router<AppState> {
    Router::new().route("/", post(revalidate))
}
