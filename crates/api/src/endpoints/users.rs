//! Authentication and user endpoints.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use goty_common::AppResult;
use goty_core::RegisterInput;
use goty_db::entities::user;
use serde::{Deserialize, Serialize};

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// User response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub roles: Vec<String>,
    pub is_admin: bool,
    pub is_verified: bool,
    pub created_at: String,
}

impl From<user::Model> for UserResponse {
    fn from(u: user::Model) -> Self {
        Self {
            roles: u.role_names(),
            is_admin: u.is_admin(),
            id: u.id,
            username: u.username,
            email: u.email,
            is_verified: u.is_verified,
            created_at: u.created_at.to_rfc3339(),
        }
    }
}

/// Session response: the user and their API token.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub user: UserResponse,
    pub token: String,
}

impl SessionResponse {
    fn from_model(user: user::Model) -> Self {
        let token = user.token.clone().unwrap_or_default();
        Self {
            user: user.into(),
            token,
        }
    }
}

/// Sign in request.
#[derive(Debug, Deserialize)]
pub struct SigninRequest {
    pub username: String,
    pub password: String,
}

/// Register a new account.
async fn signup(
    State(state): State<AppState>,
    Json(input): Json<RegisterInput>,
) -> AppResult<ApiResponse<SessionResponse>> {
    let user = state.user_service.register(input).await?;
    Ok(ApiResponse::ok(SessionResponse::from_model(user)))
}

/// Exchange credentials for an API token.
async fn signin(
    State(state): State<AppState>,
    Json(req): Json<SigninRequest>,
) -> AppResult<ApiResponse<SessionResponse>> {
    let user = state
        .user_service
        .signin(&req.username, &req.password)
        .await?;
    Ok(ApiResponse::ok(SessionResponse::from_model(user)))
}

/// The current user.
async fn me(AuthUser(user): AuthUser) -> AppResult<ApiResponse<UserResponse>> {
    Ok(ApiResponse::ok(user.into()))
}

/// `/auth` routes.
pub fn auth_router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/signin", post(signin))
}

/// `/users` routes.
pub fn router() -> Router<AppState> {
    Router::new().route("/me", get(me))
}
