//! Category endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use chrono::Datelike;
use goty_common::AppResult;
use goty_core::{CreateCategoryInput, UpdateCategoryInput};
use goty_db::entities::category;
use serde::{Deserialize, Serialize};

use crate::{
    endpoints::games::GameResponse,
    extractors::{AdminUser, MaybeAuthUser},
    middleware::AppState,
    response::ApiResponse,
};

/// Category response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponse {
    pub id: String,
    pub name: String,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub year: i32,
    pub phase: category::CategoryPhase,
    pub is_validated: bool,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl From<category::Model> for CategoryResponse {
    fn from(c: category::Model) -> Self {
        Self {
            id: c.id,
            name: c.name,
            slug: c.slug,
            description: c.description,
            year: c.year,
            phase: c.phase,
            is_validated: c.is_validated,
            created_at: c.created_at.to_rfc3339(),
            updated_at: c.updated_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// Nominee response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NomineeResponse {
    pub game: GameResponse,
    pub nominations: i64,
}

/// Result row response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultResponse {
    pub game: GameResponse,
    pub votes: i64,
}

/// List categories query.
#[derive(Debug, Deserialize)]
pub struct ListCategoriesQuery {
    pub year: Option<i32>,
    pub validated: Option<bool>,
}

/// Nominated categories query.
#[derive(Debug, Deserialize)]
pub struct NominatedQuery {
    pub year: Option<i32>,
}

/// List categories.
async fn list_categories(
    State(state): State<AppState>,
    Query(query): Query<ListCategoriesQuery>,
) -> AppResult<ApiResponse<Vec<CategoryResponse>>> {
    let categories = state
        .category_service
        .list(query.year, query.validated)
        .await?;

    Ok(ApiResponse::ok(
        categories.into_iter().map(Into::into).collect(),
    ))
}

/// Validated categories with a frozen nominee list (defaults to the current year).
async fn list_nominated(
    State(state): State<AppState>,
    Query(query): Query<NominatedQuery>,
) -> AppResult<ApiResponse<Vec<CategoryResponse>>> {
    let year = query.year.unwrap_or_else(|| chrono::Utc::now().year());
    let categories = state.category_service.list_nominated(year).await?;

    Ok(ApiResponse::ok(
        categories.into_iter().map(Into::into).collect(),
    ))
}

/// Get a category by ID.
async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<CategoryResponse>> {
    let category = state.category_service.get(&id).await?;
    Ok(ApiResponse::ok(category.into()))
}

/// Get a category by slug.
async fn get_category_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<ApiResponse<CategoryResponse>> {
    let category = state.category_service.get_by_slug(&slug).await?;
    Ok(ApiResponse::ok(category.into()))
}

/// Create a category (admin only).
async fn create_category(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Json(input): Json<CreateCategoryInput>,
) -> AppResult<ApiResponse<CategoryResponse>> {
    let category = state.category_service.create(input).await?;
    Ok(ApiResponse::ok(category.into()))
}

/// Update a category (admin only).
async fn update_category(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateCategoryInput>,
) -> AppResult<ApiResponse<CategoryResponse>> {
    let category = state.category_service.update(&id, input).await?;
    Ok(ApiResponse::ok(category.into()))
}

/// Advance a category to its next phase (admin only).
async fn next_phase(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<CategoryResponse>> {
    let category = state.category_service.advance_phase(&id).await?;
    Ok(ApiResponse::ok(category.into()))
}

/// Nominated games with their counts.
async fn nominees(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<Vec<NomineeResponse>>> {
    let nominees = state.nomination_service.nominees(&id).await?;

    Ok(ApiResponse::ok(
        nominees
            .into_iter()
            .map(|n| NomineeResponse {
                game: n.game.into(),
                nominations: n.nominations,
            })
            .collect(),
    ))
}

/// Vote totals, once the category is closed.
async fn results(
    MaybeAuthUser(viewer): MaybeAuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<Vec<ResultResponse>>> {
    let results = state.vote_service.results(&id, viewer.as_ref()).await?;

    Ok(ApiResponse::ok(
        results
            .into_iter()
            .map(|r| ResultResponse {
                game: r.game.into(),
                votes: r.votes,
            })
            .collect(),
    ))
}

/// `/categories` routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_categories).post(create_category))
        .route("/slug/{slug}", get(get_category_by_slug))
        .route("/{id}", get(get_category).patch(update_category))
        .route("/{id}/next-phase", post(next_phase))
        .route("/{id}/nominees", get(nominees))
        .route("/{id}/results", get(results))
}

/// `/category` routes.
pub fn nominated_router() -> Router<AppState> {
    Router::new().route("/nominated", get(list_nominated))
}
