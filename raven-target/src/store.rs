//! The narrow interface between the sink target and its document store.

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;
use time::OffsetDateTime;

use crate::record::Record;

/// Errors surfaced by document-store implementations.
///
/// Implementations fold their SDK's failures into this taxonomy; the
/// message carries the underlying detail. Configuration and transport
/// errors during [`DocumentStore::connect`] are fatal to activation, write
/// errors are reported to the host per write call.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid document store configuration: {0}")]
    Configuration(String),
    #[error("Could not reach the document store: {0}")]
    Transport(String),
    #[error("The document store rejected the write: {0}")]
    Write(String),
}

/// Connection settings resolved by the target at activation time.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// One or more store endpoints.
    pub urls: Vec<String>,
    /// Target database name; implementations fall back to their default
    /// when unset.
    pub database: Option<String>,
    /// Classification name under which records are stored.
    pub collection: String,
    /// PEM file holding the client identity for transport authentication.
    pub certificate: Option<PathBuf>,
}

/// Defines the expected interface between the sink target and its document
/// store.
///
/// Implementations own connection management, authentication, transport
/// retries, and bulk-insert mechanics; the target performs no locking,
/// retrying, or time-boxing of its own. A connected store is created once
/// during activation and must be safe for concurrent use across write
/// calls.
#[async_trait]
pub trait DocumentStore: Send + Sync + 'static {
    /// Establishes the store connection.
    ///
    /// Runs once during target activation and must verify the transport;
    /// any failure here fails activation and leaves the sink unusable.
    async fn connect(config: StoreConfig) -> Result<Self, StoreError>
    where
        Self: Sized;

    /// Persists one record through a short-lived unit of work, stamped
    /// with the given expiration when present.
    async fn insert_one(
        &self,
        record: Record,
        expires_at: Option<OffsetDateTime>,
    ) -> Result<(), StoreError>;

    /// Persists a whole batch through one bulk session: records are staged
    /// in input order and flushed in a single transfer. The expiration
    /// stamp, when present, applies to every record in the batch.
    async fn insert_many(
        &self,
        records: Vec<Record>,
        expires_at: Option<OffsetDateTime>,
    ) -> Result<(), StoreError>;
}
