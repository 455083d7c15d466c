//! Nomination endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
};
use goty_common::AppResult;
use goty_db::entities::nomination;
use serde::{Deserialize, Serialize};

use crate::{
    extractors::AuthUser,
    middleware::AppState,
    response::{ApiResponse, no_content},
};

/// Nomination response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NominationResponse {
    pub id: String,
    pub category_id: String,
    pub game_id: String,
    pub created_at: String,
}

impl From<nomination::Model> for NominationResponse {
    fn from(n: nomination::Model) -> Self {
        Self {
            id: n.id,
            category_id: n.category_id,
            game_id: n.game_id,
            created_at: n.created_at.to_rfc3339(),
        }
    }
}

/// The current user's nominations in a category.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserNominationsResponse {
    pub count: usize,
    pub game_ids: Vec<String>,
}

/// Nominate request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NominateRequest {
    pub category_id: String,
    pub game_id: String,
}

/// Nominate a game.
async fn nominate(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<NominateRequest>,
) -> AppResult<ApiResponse<NominationResponse>> {
    let nomination = state
        .nomination_service
        .add(&req.category_id, &req.game_id, &user.id)
        .await?;

    Ok(ApiResponse::ok(nomination.into()))
}

/// Withdraw a nomination.
async fn remove(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path((category_id, game_id)): Path<(String, String)>,
) -> AppResult<StatusCode> {
    state
        .nomination_service
        .remove(&category_id, &game_id, &user.id)
        .await?;

    Ok(no_content())
}

/// The current user's nominated game IDs.
async fn user_nominations(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(category_id): Path<String>,
) -> AppResult<ApiResponse<UserNominationsResponse>> {
    let nominations = state
        .nomination_service
        .user_nominations(&category_id, &user.id)
        .await?;

    Ok(ApiResponse::ok(UserNominationsResponse {
        count: nominations.count,
        game_ids: nominations.game_ids,
    }))
}

/// `/category-nominee` routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/nominate", post(nominate))
        .route("/remove/{category_id}/{game_id}", delete(remove))
        .route("/{category_id}/user-nominations", get(user_nominations))
}
