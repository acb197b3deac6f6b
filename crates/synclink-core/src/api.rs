//! Backend contract
//!
//! The wizard talks to three backend endpoints. Only their contract lives
//! here; `synclink-runtime` provides the HTTP and in-memory implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::connection::{ConnectionType, SourceCredentials};
use crate::state::FieldMapping;

/// Result type for backend calls
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Errors surfaced by a backend call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// No link token was configured for the session
    #[error("no link token configured")]
    MissingLinkToken,

    /// Request never produced a response
    #[error("request failed: {0}")]
    Transport(String),

    /// Backend answered with a non-success status
    #[error("backend returned {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, possibly empty
        body: String,
    },

    /// Response body did not match the expected shape
    #[error("unexpected response: {0}")]
    Decode(String),

    /// Backend refused the request
    #[error("rejected: {0}")]
    Rejected(String),
}

/// A configured source as returned by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDescriptor {
    /// Backend identifier
    pub id: String,
    /// Name shown in lists
    pub display_name: String,
    /// Warehouse type
    pub connection_type: ConnectionType,
}

/// A sync as returned by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncDescriptor {
    /// Backend identifier
    pub id: String,
    /// Source the sync reads from
    pub source_id: String,
    /// Object the sync writes into
    pub object_id: String,
    /// Destination namespace
    pub namespace: String,
    /// Destination table
    pub table_name: String,
    /// First scheduled run, if any
    #[serde(default)]
    pub starts_at: Option<DateTime<Utc>>,
}

/// Payload for creating a source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateSourceRequest {
    /// Name shown in lists
    pub display_name: String,
    /// Credentials for exactly one connection type
    pub credentials: SourceCredentials,
}

/// Payload for finalizing a sync
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalizeSyncRequest {
    /// Source to read from
    pub source_id: String,
    /// Object to write into
    pub object_id: String,
    /// Destination namespace
    pub namespace: String,
    /// Destination table
    pub table_name: String,
    /// Column mappings
    #[serde(default)]
    pub field_mappings: Vec<FieldMapping>,
    /// First scheduled run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starts_at: Option<DateTime<Utc>>,
}

/// Backend operations used by the wizard
///
/// Implementations authenticate every call with the session's link token.
#[async_trait]
pub trait ConnectApi: Send + Sync {
    /// Create a new source from a display name and credentials
    async fn create_source(&self, request: CreateSourceRequest) -> ApiResult<SourceDescriptor>;

    /// List the sources already configured for this end customer
    async fn list_sources(&self) -> ApiResult<Vec<SourceDescriptor>>;

    /// Persist the sync configuration
    async fn finalize_sync(&self, request: FinalizeSyncRequest) -> ApiResult<SyncDescriptor>;
}
