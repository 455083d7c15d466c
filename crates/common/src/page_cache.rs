//! Response cache for public read endpoints.
//!
//! Cached pages are keyed by request path plus query string. Revalidating a
//! path drops every cached variant of that path regardless of query.
//!
//! # Example
//!
//! ```
//! use goty_common::page_cache::{CachedPage, InMemoryPageCache, PageCache};
//!
//! # async fn demo() -> goty_common::AppResult<()> {
//! let cache = InMemoryPageCache::default();
//! cache.put("/categories?year=2025", CachedPage::json(b"[]".to_vec())).await?;
//! assert!(cache.get("/categories?year=2025").await?.is_some());
//!
//! let purged = cache.invalidate_path("/categories").await?;
//! assert_eq!(purged, 1);
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tracing::debug;

use crate::AppResult;

/// Default lifetime of a cached page: 5 minutes.
const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// A cached response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedPage {
    /// Response body bytes.
    pub body: Vec<u8>,
    /// Content type the body was served with.
    pub content_type: String,
}

impl CachedPage {
    /// A JSON body.
    #[must_use]
    pub fn json(body: Vec<u8>) -> Self {
        Self {
            body,
            content_type: "application/json".to_string(),
        }
    }
}

/// Cache of rendered public responses.
#[async_trait::async_trait]
pub trait PageCache: Send + Sync {
    /// Look up a cached page by key (`path` or `path?query`).
    async fn get(&self, key: &str) -> AppResult<Option<CachedPage>>;

    /// Store a page under a key.
    async fn put(&self, key: &str, page: CachedPage) -> AppResult<()>;

    /// Drop every cached variant of `path`. Returns the number purged.
    async fn invalidate_path(&self, path: &str) -> AppResult<usize>;

    /// Drop every cached page whose path starts with `prefix`.
    async fn invalidate_prefix(&self, prefix: &str) -> AppResult<usize>;
}

struct Entry {
    page: CachedPage,
    stored_at: Instant,
}

/// Process-local page cache with a fixed TTL.
pub struct InMemoryPageCache {
    entries: RwLock<HashMap<String, Entry>>,
    ttl: Duration,
}

impl Default for InMemoryPageCache {
    fn default() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }
}

impl InMemoryPageCache {
    /// Create a cache whose entries expire after `ttl`.
    #[must_use]
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    async fn purge_where<F>(&self, matches: F) -> usize
    where
        F: Fn(&str) -> bool,
    {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|key, _| !matches(path_of(key)));
        before - entries.len()
    }
}

/// Path portion of a cache key, without query string or trailing slash.
fn path_of(key: &str) -> &str {
    let path = key.split_once('?').map_or(key, |(path, _)| path);
    normalize(path)
}

fn normalize(path: &str) -> &str {
    if path.len() > 1 {
        path.trim_end_matches('/')
    } else {
        path
    }
}

#[async_trait::async_trait]
impl PageCache for InMemoryPageCache {
    async fn get(&self, key: &str) -> AppResult<Option<CachedPage>> {
        let entries = self.entries.read().await;
        let hit = entries
            .get(key)
            .filter(|entry| entry.stored_at.elapsed() < self.ttl)
            .map(|entry| entry.page.clone());

        if hit.is_some() {
            debug!(key = %key, "Page cache hit");
        }
        Ok(hit)
    }

    async fn put(&self, key: &str, page: CachedPage) -> AppResult<()> {
        self.entries.write().await.insert(
            key.to_string(),
            Entry {
                page,
                stored_at: Instant::now(),
            },
        );
        Ok(())
    }

    async fn invalidate_path(&self, path: &str) -> AppResult<usize> {
        let target = normalize(path).to_string();
        let purged = self.purge_where(|p| p == target).await;
        debug!(path = %path, purged, "Invalidated cached path");
        Ok(purged)
    }

    async fn invalidate_prefix(&self, prefix: &str) -> AppResult<usize> {
        let purged = self.purge_where(|p| p.starts_with(prefix)).await;
        debug!(prefix = %prefix, purged, "Invalidated cached prefix");
        Ok(purged)
    }
}
