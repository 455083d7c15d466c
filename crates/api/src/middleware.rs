//! API middleware.

#![allow(missing_docs)]

use std::sync::Arc;

use axum::{
    body::{Body, to_bytes},
    extract::{OriginalUri, State},
    http::{Method, Request, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use goty_common::{CachedPage, PageCache};
use goty_core::{
    CATEGORY_CACHE_PREFIXES, CategoryService, GameService, NominationService,
    RevalidationService, UploadService, UserService, VoteService,
};
use tracing::warn;

/// Largest response body the page cache will store.
const MAX_CACHED_BODY: usize = 1024 * 1024;

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub category_service: CategoryService,
    pub nomination_service: NominationService,
    pub vote_service: VoteService,
    pub game_service: GameService,
    pub upload_service: UploadService,
    pub revalidation_service: RevalidationService,
    pub page_cache: Arc<dyn PageCache>,
}

/// Authentication middleware.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(auth_header) = req.headers().get(header::AUTHORIZATION)
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
        && let Ok(user) = state.user_service.authenticate_by_token(token).await
    {
        req.extensions_mut().insert(user);
    }

    next.run(req).await
}

/// Whether a GET on `path` is served from the page cache.
///
/// Results depend on the viewer and are never cached.
fn is_cacheable(path: &str) -> bool {
    CATEGORY_CACHE_PREFIXES
        .iter()
        .any(|prefix| path.starts_with(prefix))
        && !path.ends_with("/results")
}

/// Serve public category pages from the page cache, filling it on a miss.
pub async fn page_cache_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let uri = req
        .extensions()
        .get::<OriginalUri>()
        .map_or_else(|| req.uri().clone(), |original| original.0.clone());

    if req.method() != Method::GET || !is_cacheable(uri.path()) {
        return next.run(req).await;
    }

    let key = uri
        .path_and_query()
        .map_or_else(|| uri.path().to_string(), ToString::to_string);

    match state.page_cache.get(&key).await {
        Ok(Some(page)) => {
            return (
                StatusCode::OK,
                [(header::CONTENT_TYPE, page.content_type)],
                page.body,
            )
                .into_response();
        }
        Ok(None) => {}
        Err(e) => warn!(error = %e, key = %key, "Page cache lookup failed"),
    }

    let response = next.run(req).await;
    if response.status() != StatusCode::OK {
        return response;
    }

    let (parts, body) = response.into_parts();
    let bytes = match to_bytes(body, MAX_CACHED_BODY).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(error = %e, key = %key, "Response too large to cache");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let content_type = parts
        .headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/json")
        .to_string();

    let page = CachedPage {
        body: bytes.to_vec(),
        content_type,
    };
    if let Err(e) = state.page_cache.put(&key, page).await {
        warn!(error = %e, key = %key, "Failed to store page");
    }

    Response::from_parts(parts, Body::from(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_cacheable() {
        assert!(is_cacheable("/api/categories"));
        assert!(is_cacheable("/api/categories/abc/nominees"));
        assert!(is_cacheable("/api/category/nominated"));
        assert!(!is_cacheable("/api/categories/abc/results"));
        assert!(!is_cacheable("/api/category-nominee/abc/user-nominations"));
        assert!(!is_cacheable("/api/games"));
    }
}
