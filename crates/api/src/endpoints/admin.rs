//! Admin endpoints: moderation queue and user directory.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use goty_common::AppResult;
use goty_core::ModerateGameInput;
use serde::{Deserialize, Serialize};

use crate::{
    endpoints::{games::GameResponse, users::UserResponse},
    extractors::AdminUser,
    middleware::AppState,
    response::ApiResponse,
};

/// Offset pagination query.
#[derive(Debug, Deserialize)]
pub struct PendingQuery {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

/// Page pagination query.
#[derive(Debug, Deserialize)]
pub struct UsersQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

/// A page of users.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserListResponse {
    pub users: Vec<UserResponse>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
}

/// Aggregate user counts.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStatsResponse {
    pub total: u64,
    pub verified: u64,
    pub unverified: u64,
}

/// Games awaiting moderation.
async fn pending_games(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Query(query): Query<PendingQuery>,
) -> AppResult<ApiResponse<Vec<GameResponse>>> {
    let games = state
        .game_service
        .list_pending(query.limit, query.offset)
        .await?;

    Ok(ApiResponse::ok(games.into_iter().map(Into::into).collect()))
}

/// Validate or reject a proposed game.
async fn moderate_game(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<ModerateGameInput>,
) -> AppResult<ApiResponse<GameResponse>> {
    tracing::debug!(admin_id = %admin.id, game_id = %id, "Moderating game");
    let game = state.game_service.moderate(&id, input).await?;
    Ok(ApiResponse::ok(game.into()))
}

/// List users.
async fn list_users(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Query(query): Query<UsersQuery>,
) -> AppResult<ApiResponse<UserListResponse>> {
    let page = state
        .user_service
        .list_users(query.page, query.limit)
        .await?;

    Ok(ApiResponse::ok(UserListResponse {
        users: page.users.into_iter().map(Into::into).collect(),
        total: page.total,
        page: page.page,
        limit: page.limit,
    }))
}

/// User counts.
async fn user_stats(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<UserStatsResponse>> {
    let stats = state.user_service.stats().await?;

    Ok(ApiResponse::ok(UserStatsResponse {
        total: stats.total,
        verified: stats.verified,
        unverified: stats.unverified,
    }))
}

/// Mark a user as verified.
async fn verify_user(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<UserResponse>> {
    let user = state.user_service.verify_user(&id).await?;
    Ok(ApiResponse::ok(user.into()))
}

/// `/admin` routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/games/pending", get(pending_games))
        .route("/games/{id}/moderate", post(moderate_game))
        .route("/users", get(list_users))
        .route("/users/stats", get(user_stats))
        .route("/users/{id}/verify", post(verify_user))
}
