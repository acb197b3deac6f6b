//! Known-sources cache
//!
//! Shared between every wizard session of one end customer so that the
//! existing-sources list reflects a newly created source right away. Writes
//! are fire-and-forget: there is no ordering between concurrent writers and
//! no rollback.

use std::sync::Arc;
use tokio::sync::RwLock;

use crate::api::{ApiResult, ConnectApi, SourceDescriptor};

#[derive(Debug, Default)]
struct CacheInner {
    sources: Option<Vec<SourceDescriptor>>,
    stale: bool,
}

/// Cached list of the end customer's sources
#[derive(Debug, Clone, Default)]
pub struct SourcesCache {
    inner: Arc<RwLock<CacheInner>>,
}

impl SourcesCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached sources, without touching the backend
    pub async fn cached(&self) -> Option<Vec<SourceDescriptor>> {
        self.inner.read().await.sources.clone()
    }

    /// Whether the next [`get_or_fetch`](Self::get_or_fetch) will hit the backend
    pub async fn is_stale(&self) -> bool {
        let inner = self.inner.read().await;
        inner.stale || inner.sources.is_none()
    }

    /// Cached sources, fetching them first if missing or stale
    pub async fn get_or_fetch<A>(&self, api: &A) -> ApiResult<Vec<SourceDescriptor>>
    where
        A: ConnectApi + ?Sized,
    {
        {
            let inner = self.inner.read().await;
            if let (Some(sources), false) = (&inner.sources, inner.stale) {
                return Ok(sources.clone());
            }
        }

        tracing::debug!("fetching sources list");
        let sources = api.list_sources().await?;
        let mut inner = self.inner.write().await;
        inner.sources = Some(sources.clone());
        inner.stale = false;
        Ok(sources)
    }

    /// Add a freshly created source and mark the list stale
    pub async fn record_created(&self, source: SourceDescriptor) {
        let mut inner = self.inner.write().await;
        if let Some(sources) = inner.sources.as_mut()
            && !sources.iter().any(|s| s.id == source.id)
        {
            sources.push(source);
        }
        inner.stale = true;
    }

    /// Force the next read to hit the backend
    pub async fn invalidate(&self) {
        self.inner.write().await.stale = true;
    }
}
