//! On-demand revalidation of cached public pages.

use std::sync::Arc;

use goty_common::{AppError, AppResult, PageCache};
use tracing::{error, info};

/// Result of a successful revalidation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Revalidated {
    pub path: String,
    pub purged: usize,
}

/// Revalidation service for business logic.
#[derive(Clone)]
pub struct RevalidationService {
    secret: String,
    page_cache: Arc<dyn PageCache>,
}

impl RevalidationService {
    /// Create a new revalidation service.
    #[must_use]
    pub fn new(secret: String, page_cache: Arc<dyn PageCache>) -> Self {
        Self { secret, page_cache }
    }

    /// Purge the cached variants of `path` when `secret` matches.
    ///
    /// An empty configured secret disables revalidation entirely.
    pub async fn revalidate(
        &self,
        secret: Option<&str>,
        path: Option<&str>,
    ) -> AppResult<Revalidated> {
        match secret {
            Some(s) if !self.secret.is_empty() && s == self.secret => {}
            _ => return Err(AppError::Unauthorized),
        }

        let path = path
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .ok_or_else(|| AppError::BadRequest("Missing path parameter".to_string()))?;

        let purged = self.page_cache.invalidate_path(path).await.map_err(|e| {
            error!(error = %e, path = %path, "Revalidation failed");
            AppError::Internal(format!("Error revalidating {path}"))
        })?;

        info!(path = %path, purged, "Revalidated path");

        Ok(Revalidated {
            path: path.to_string(),
            purged,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use goty_common::{CachedPage, InMemoryPageCache};

    struct BrokenCache;

    #[async_trait::async_trait]
    impl PageCache for BrokenCache {
        async fn get(&self, _key: &str) -> AppResult<Option<CachedPage>> {
            Ok(None)
        }

        async fn put(&self, _key: &str, _page: CachedPage) -> AppResult<()> {
            Ok(())
        }

        async fn invalidate_path(&self, _path: &str) -> AppResult<usize> {
            Err(AppError::Internal("cache unavailable".to_string()))
        }

        async fn invalidate_prefix(&self, _prefix: &str) -> AppResult<usize> {
            Err(AppError::Internal("cache unavailable".to_string()))
        }
    }

    fn create_service() -> (RevalidationService, Arc<InMemoryPageCache>) {
        let cache = Arc::new(InMemoryPageCache::default());
        (
            RevalidationService::new("s3cret".to_string(), cache.clone()),
            cache,
        )
    }

    #[tokio::test]
    async fn test_wrong_secret_is_unauthorized() {
        let (service, _) = create_service();

        let result = service.revalidate(Some("nope"), Some("/api/categories")).await;
        assert!(matches!(result, Err(AppError::Unauthorized)));

        let result = service.revalidate(None, Some("/api/categories")).await;
        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_empty_configured_secret_rejects_everything() {
        let service =
            RevalidationService::new(String::new(), Arc::new(InMemoryPageCache::default()));

        let result = service.revalidate(Some(""), Some("/api/categories")).await;
        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_missing_path_is_bad_request() {
        let (service, _) = create_service();

        let result = service.revalidate(Some("s3cret"), None).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));

        let result = service.revalidate(Some("s3cret"), Some("  ")).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_valid_request_purges_path() {
        let (service, cache) = create_service();
        cache
            .put("/api/categories?year=2025", CachedPage::json(b"[]".to_vec()))
            .await
            .unwrap();

        let result = service
            .revalidate(Some("s3cret"), Some("/api/categories"))
            .await
            .unwrap();

        assert_eq!(result.path, "/api/categories");
        assert_eq!(result.purged, 1);
        assert!(cache.get("/api/categories?year=2025").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_cache_failure_is_internal_error() {
        let service = RevalidationService::new("s3cret".to_string(), Arc::new(BrokenCache));

        let result = service
            .revalidate(Some("s3cret"), Some("/api/categories"))
            .await;

        assert!(matches!(result, Err(AppError::Internal(_))));
    }
}
