//! MongoDB implementation of the document-store interface consumed by the
//! Raven sink target.
//!
//! Everything that touches the `mongodb` SDK lives here: endpoint parsing,
//! the TLS client identity, database and collection binding, and the
//! record-to-document mapping. The SDK owns connection pooling, transport
//! retries, sessions, and the wire protocol.
#![warn(unused_results)]
#![warn(future_incompatible)]
#![warn(unused)]
#![forbid(rustdoc::broken_intra_doc_links)]

pub mod constants;
pub mod error;

use async_trait::async_trait;
use mongodb::{
    bson::{doc, Bson, DateTime, Document},
    options::{ClientOptions, ServerAddress, Tls, TlsOptions},
    Client, Collection,
};
use time::OffsetDateTime;
use tracing::instrument;

use raven_target::{constants::ID_FIELD, DocumentStore, Record, StoreConfig, StoreError};

use crate::{
    constants::{DEFAULT_DATABASE, EXPIRES_AT, MONGO_ID},
    error::Error,
};

/// Document store backed by a MongoDB deployment.
///
/// Holds one typed collection handle bound at connect time: records are
/// classified under the configured collection name, and nothing else goes
/// through this handle. The underlying client is safe for concurrent use
/// across write calls.
#[derive(Debug, Clone)]
pub struct MongoStore {
    collection: Collection<Document>,
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn connect(config: StoreConfig) -> Result<Self, StoreError> {
        let hosts = config
            .urls
            .iter()
            .map(ServerAddress::parse)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| StoreError::Configuration(e.to_string()))?;

        let mut options = ClientOptions::builder().hosts(hosts).build();
        if let Some(certificate) = &config.certificate {
            options.tls = Some(Tls::Enabled(
                TlsOptions::builder()
                    .cert_key_file_path(certificate.clone())
                    .build(),
            ));
        }

        let client =
            Client::with_options(options).map_err(|e| StoreError::Configuration(e.to_string()))?;
        let database = client.database(config.database.as_deref().unwrap_or(DEFAULT_DATABASE));

        // Surface transport and authentication failures at activation
        // rather than on the first write.
        let _ = database
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        Ok(Self {
            collection: database.collection(&config.collection),
        })
    }

    #[instrument(skip(self, record), fields(collection = %self.collection.name()))]
    async fn insert_one(
        &self,
        record: Record,
        expires_at: Option<OffsetDateTime>,
    ) -> Result<(), StoreError> {
        let document = to_document(&record, expires_at)?;
        let _ = self
            .collection
            .insert_one(document, None)
            .await
            .map_err(Error::from)?;
        Ok(())
    }

    #[instrument(skip(self, records), fields(collection = %self.collection.name(), records = records.len()))]
    async fn insert_many(
        &self,
        records: Vec<Record>,
        expires_at: Option<OffsetDateTime>,
    ) -> Result<(), StoreError> {
        // The caller computed the stamp once; the whole batch shares it.
        let documents = records
            .iter()
            .map(|record| to_document(record, expires_at))
            .collect::<Result<Vec<_>, _>>()?;
        let _ = self
            .collection
            .insert_many(documents, None)
            .await
            .map_err(Error::from)?;
        Ok(())
    }
}

/// Maps a record to its stored document.
///
/// A null identifier is dropped so the store assigns one on insert; a
/// generated identifier moves to MongoDB's `_id`. The expiration stamp,
/// when present, is attached as a UTC datetime.
fn to_document(record: &Record, expires_at: Option<OffsetDateTime>) -> Result<Document, Error> {
    let mut document = mongodb::bson::to_document(record)?;

    match document.remove(ID_FIELD) {
        None | Some(Bson::Null) => {}
        Some(id) => {
            let _ = document.insert(MONGO_ID, id);
        }
    }

    if let Some(expires_at) = expires_at {
        let millis = (expires_at.unix_timestamp_nanos() / 1_000_000) as i64;
        let _ = document.insert(EXPIRES_AT, DateTime::from_millis(millis));
    }

    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn sample_record(id: Value) -> Record {
        let mut record = Record::new();
        record.set(ID_FIELD, id);
        record.set("Message", "hello");
        record.set("Level", "Info");
        record
    }

    #[test]
    fn null_identifier_is_dropped_so_the_store_assigns_one() {
        let document = to_document(&sample_record(Value::Null), None).unwrap();
        assert!(!document.contains_key(MONGO_ID));
        assert!(!document.contains_key(ID_FIELD));
        assert_eq!(document.get_str("Message").unwrap(), "hello");
    }

    #[test]
    fn generated_identifier_becomes_the_document_id() {
        let id = "8cbd2d17-2cb4-4dc1-a52e-64b3d6a0a1e5";
        let document = to_document(&sample_record(Value::from(id)), None).unwrap();
        assert_eq!(document.get_str(MONGO_ID).unwrap(), id);
        assert!(!document.contains_key(ID_FIELD));
    }

    #[test]
    fn fields_keep_their_declaration_order() {
        let document = to_document(&sample_record(Value::Null), None).unwrap();
        let keys: Vec<_> = document.keys().collect();
        assert_eq!(keys, vec!["Message", "Level"]);
    }

    #[test]
    fn expiration_stamp_is_attached_as_a_datetime() {
        let expires_at = OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap();
        let document = to_document(&sample_record(Value::Null), Some(expires_at)).unwrap();
        assert_eq!(
            document.get_datetime(EXPIRES_AT).unwrap(),
            &DateTime::from_millis(1_700_000_000_000)
        );
    }

    #[test]
    fn no_expiry_leaves_the_document_unstamped() {
        let document = to_document(&sample_record(Value::Null), None).unwrap();
        assert!(!document.contains_key(EXPIRES_AT));
    }
}
