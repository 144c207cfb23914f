//! The sink target: receives log events from the host pipeline and
//! persists them as documents.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use time::{Duration, OffsetDateTime};
use tracing::{error, instrument};
use uuid::Uuid;

use crate::{
    config::{Config, ConfigFile, IdType},
    constants::{ID_FIELD, TARGET_NAME},
    error::RavenTargetError,
    event::{BatchItem, LogEvent},
    record::Record,
    store::DocumentStore,
};

/// The narrow seam the host pipeline drives.
///
/// The host invokes the write hooks from its own dispatch threads; targets
/// impose no additional threading of their own.
#[async_trait]
pub trait Target: Send + Sync + 'static {
    /// Plugin identity under which the target is registered.
    fn name(&self) -> &str;

    /// Persists one event. Failures are reported through the diagnostic
    /// channel and returned, so the host's own retry/drop policy governs.
    async fn write(&self, event: &LogEvent) -> Result<(), RavenTargetError>;

    /// Persists a batch of events. Failures are reported through the
    /// diagnostic channel and fanned out to each item's completion signal
    /// instead; the call itself never fails.
    async fn write_batch(&self, batch: Vec<BatchItem>);
}

/// Sink target persisting log events into a document store.
///
/// Holds the resolved configuration and the single long-lived store
/// connection, established during activation and reused for every
/// subsequent write until the target is dropped. Units of work are scoped
/// to individual write calls inside the store implementation.
pub struct RavenTarget<S> {
    config: Config,
    store: S,
}

impl<S: DocumentStore> RavenTarget<S> {
    /// Activates the target: resolves the configuration and connects the
    /// store.
    ///
    /// Runs once, before any write. On failure no target value exists, so
    /// a sink that failed activation can never accept writes.
    pub async fn activate(file: ConfigFile) -> Result<Self, RavenTargetError> {
        let config = Config::resolve(file)?;
        let store = S::connect(config.store_config()).await?;
        Ok(Self::with_store(config, store))
    }

    /// Builds a target around an already-connected store.
    ///
    /// The configuration is expected to come out of [`Config::resolve`].
    /// Useful for custom store implementations and for tests.
    pub fn with_store(config: Config, store: S) -> Self {
        Self { config, store }
    }

    /// Builds the record for one event.
    ///
    /// The identifier field is set to null (the store assigns one) or to a
    /// fresh UUID depending on the configured mode. Each configured field
    /// template renders in declaration order; a blank render leaves the
    /// field absent from the record entirely, not present-but-empty.
    fn create_entry(&self, event: &LogEvent) -> Record {
        let mut record = Record::new();

        match self.config.id_type {
            IdType::String => record.set(ID_FIELD, Value::Null),
            IdType::Guid => record.set(ID_FIELD, Uuid::new_v4().to_string()),
        }

        for field in &self.config.fields {
            let rendered = field.layout.render(event);
            if !rendered.trim().is_empty() {
                record.set(field.name.as_str(), rendered);
            }
        }

        record
    }

    /// Expiration stamp for records written now, when expiry is configured.
    fn expires_at(&self) -> Option<OffsetDateTime> {
        (self.config.expiry_days > 0).then(|| {
            OffsetDateTime::now_utc() + Duration::days(i64::from(self.config.expiry_days))
        })
    }
}

#[async_trait]
impl<S: DocumentStore> Target for RavenTarget<S> {
    fn name(&self) -> &str {
        TARGET_NAME
    }

    #[instrument(skip(self, event), fields(collection = %self.config.collection_name))]
    async fn write(&self, event: &LogEvent) -> Result<(), RavenTargetError> {
        let record = self.create_entry(event);
        if let Err(err) = self.store.insert_one(record, self.expires_at()).await {
            error!("Error while sending log messages to the document store: message=\"{err}\"");
            return Err(err.into());
        }
        Ok(())
    }

    #[instrument(skip(self, batch), fields(collection = %self.config.collection_name, events = batch.len()))]
    async fn write_batch(&self, batch: Vec<BatchItem>) {
        // One expiration stamp for the whole batch, computed at batch start.
        let expires_at = self.expires_at();

        let records = batch
            .iter()
            .map(|item| self.create_entry(&item.event))
            .collect();

        if let Err(err) = self.store.insert_many(records, expires_at).await {
            error!("Error while sending log messages to the document store: message=\"{err}\"");
            // Fail every event of the original batch individually so the
            // host settles each delivery outcome on its own.
            let err = Arc::new(RavenTargetError::from(err));
            for item in batch {
                item.completion.fail(Arc::clone(&err));
            }
        }
    }
}
