//! Constants used throughout the MongoDB store adapter.

/* DB CONFIG */
/// Database used when the target configuration does not name one.
pub(crate) const DEFAULT_DATABASE: &str = "logs";

/* FIELD NAMES */
/// MongoDB's reserved document identifier.
pub(crate) const MONGO_ID: &str = "_id";
/// Expiration stamp attached to records when expiry is configured; a TTL
/// index on this field enforces the expiry.
pub(crate) const EXPIRES_AT: &str = "expires_at";
