//! Game endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use goty_common::AppResult;
use goty_core::ProposeGameInput;
use goty_db::entities::game;
use serde::{Deserialize, Serialize};

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Game response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameResponse {
    pub id: String,
    pub name: String,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_year: Option<i32>,
    pub status: game::GameStatus,
    pub author_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moderation_comment: Option<String>,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moderated_at: Option<String>,
}

impl From<game::Model> for GameResponse {
    fn from(g: game::Model) -> Self {
        Self {
            id: g.id,
            name: g.name,
            slug: g.slug,
            description: g.description,
            cover_url: g.cover_url,
            release_year: g.release_year,
            status: g.status,
            author_id: g.author_id,
            moderation_comment: g.moderation_comment,
            created_at: g.created_at.to_rfc3339(),
            moderated_at: g.moderated_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// List games query.
#[derive(Debug, Deserialize)]
pub struct ListGamesQuery {
    pub search: Option<String>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

/// List validated games.
async fn list_games(
    State(state): State<AppState>,
    Query(query): Query<ListGamesQuery>,
) -> AppResult<ApiResponse<Vec<GameResponse>>> {
    let games = state
        .game_service
        .list_validated(query.search.as_deref(), query.limit, query.offset)
        .await?;

    Ok(ApiResponse::ok(games.into_iter().map(Into::into).collect()))
}

/// Propose a game.
async fn propose_game(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<ProposeGameInput>,
) -> AppResult<ApiResponse<GameResponse>> {
    let game = state.game_service.propose(&user.id, input).await?;
    Ok(ApiResponse::ok(game.into()))
}

/// Games proposed by the current user.
async fn my_games(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<GameResponse>>> {
    let games = state.game_service.list_mine(&user.id).await?;
    Ok(ApiResponse::ok(games.into_iter().map(Into::into).collect()))
}

/// Get a game by ID.
async fn get_game(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<GameResponse>> {
    let game = state.game_service.get(&id).await?;
    Ok(ApiResponse::ok(game.into()))
}

/// Get a game by slug.
async fn get_game_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<ApiResponse<GameResponse>> {
    let game = state.game_service.get_by_slug(&slug).await?;
    Ok(ApiResponse::ok(game.into()))
}

/// `/games` routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_games).post(propose_game))
        .route("/mine", get(my_games))
        .route("/slug/{slug}", get(get_game_by_slug))
        .route("/{id}", get(get_game))
}
