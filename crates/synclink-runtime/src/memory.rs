//! In-memory backend for dry runs and tests

use async_trait::async_trait;
use std::sync::Mutex;
use synclink_core::api::{
    ApiError, ApiResult, ConnectApi, CreateSourceRequest, FinalizeSyncRequest, SourceDescriptor,
    SyncDescriptor,
};

#[derive(Debug, Default)]
struct Store {
    sources: Vec<SourceDescriptor>,
    syncs: Vec<SyncDescriptor>,
    fail_next_create: Option<String>,
}

/// Backend that keeps sources and syncs in memory
#[derive(Debug, Default)]
pub struct InMemoryConnectApi {
    store: Mutex<Store>,
}

impl InMemoryConnectApi {
    /// Create an empty backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend that already knows `sources`
    pub fn with_sources(sources: Vec<SourceDescriptor>) -> Self {
        Self {
            store: Mutex::new(Store {
                sources,
                ..Default::default()
            }),
        }
    }

    /// Reject the next create-source call with `message`
    pub fn fail_next_create(&self, message: impl Into<String>) {
        self.lock().fail_next_create = Some(message.into());
    }

    /// Syncs finalized so far
    pub fn syncs(&self) -> Vec<SyncDescriptor> {
        self.lock().syncs.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl ConnectApi for InMemoryConnectApi {
    async fn create_source(&self, request: CreateSourceRequest) -> ApiResult<SourceDescriptor> {
        let mut store = self.lock();
        if let Some(message) = store.fail_next_create.take() {
            return Err(ApiError::Rejected(message));
        }
        let source = SourceDescriptor {
            id: format!("src_{}", uuid::Uuid::new_v4().simple()),
            display_name: request.display_name,
            connection_type: request.credentials.connection_type(),
        };
        store.sources.push(source.clone());
        Ok(source)
    }

    async fn list_sources(&self) -> ApiResult<Vec<SourceDescriptor>> {
        Ok(self.lock().sources.clone())
    }

    async fn finalize_sync(&self, request: FinalizeSyncRequest) -> ApiResult<SyncDescriptor> {
        let mut store = self.lock();
        if !store.sources.iter().any(|s| s.id == request.source_id) {
            return Err(ApiError::Rejected(format!(
                "unknown source '{}'",
                request.source_id
            )));
        }
        let sync = SyncDescriptor {
            id: format!("sync_{}", uuid::Uuid::new_v4().simple()),
            source_id: request.source_id,
            object_id: request.object_id,
            namespace: request.namespace,
            table_name: request.table_name,
            starts_at: request.starts_at,
        };
        store.syncs.push(sync.clone());
        Ok(sync)
    }
}
