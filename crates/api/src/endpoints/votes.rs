//! Vote endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use goty_common::AppResult;
use goty_db::entities::vote;
use serde::{Deserialize, Serialize};

use crate::{
    endpoints::categories::CategoryResponse, extractors::AuthUser, middleware::AppState,
    response::ApiResponse,
};

/// Vote response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteResponse {
    pub id: String,
    pub category_id: String,
    pub game_id: String,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl From<vote::Model> for VoteResponse {
    fn from(v: vote::Model) -> Self {
        Self {
            id: v.id,
            category_id: v.category_id,
            game_id: v.game_id,
            created_at: v.created_at.to_rfc3339(),
            updated_at: v.updated_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// The current user's vote in one category.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MyVoteResponse {
    pub game_id: Option<String>,
}

/// Chosen game display data.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VotedGameResponse {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub cover_url: Option<String>,
}

/// A category the current user voted in.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VotedCategoryResponse {
    pub category: CategoryResponse,
    pub game: VotedGameResponse,
}

/// Cast vote request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CastVoteRequest {
    pub category_id: String,
    pub game_id: String,
}

/// Cast or replace a vote.
async fn cast_vote(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CastVoteRequest>,
) -> AppResult<ApiResponse<VoteResponse>> {
    let vote = state
        .vote_service
        .cast(&req.category_id, &req.game_id, &user.id)
        .await?;

    Ok(ApiResponse::ok(vote.into()))
}

/// The current user's vote in a category.
async fn my_vote(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(category_id): Path<String>,
) -> AppResult<ApiResponse<MyVoteResponse>> {
    let game_id = state.vote_service.my_vote(&category_id, &user.id).await?;
    Ok(ApiResponse::ok(MyVoteResponse { game_id }))
}

/// Categories the current user voted in.
async fn my_voted_categories(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<VotedCategoryResponse>>> {
    let voted = state.vote_service.my_voted_categories(&user.id).await?;

    Ok(ApiResponse::ok(
        voted
            .into_iter()
            .map(|v| VotedCategoryResponse {
                category: v.category.into(),
                game: VotedGameResponse {
                    id: v.game.id,
                    name: v.game.name,
                    slug: v.game.slug,
                    cover_url: v.game.cover_url,
                },
            })
            .collect(),
    ))
}

/// `/votes` routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(cast_vote))
        .route("/categories", get(my_voted_categories))
        .route("/{category_id}/mine", get(my_vote))
}
