//! API endpoints.

mod admin;
mod categories;
mod games;
mod nominations;
mod revalidate;
mod upload;
mod users;
mod votes;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
///
/// Route limits that depend on configuration are read from `state`.
pub fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .nest("/auth", users::auth_router())
        .nest("/users", users::router())
        .nest("/categories", categories::router())
        .nest("/category", categories::nominated_router())
        .nest("/category-nominee", nominations::router())
        .nest("/votes", votes::router())
        .nest("/games", games::router())
        .nest("/admin", admin::router())
        .nest("/upload", upload::router(state.upload_service.max_size()))
        .nest("/revalidate", revalidate::router())
}
