//! Constants used throughout the sink target.

/// Plugin identity registered with the host pipeline's target registry.
pub const TARGET_NAME: &str = "Raven";

/// Record field reserved for the document identifier.
pub const ID_FIELD: &str = "Id";

/// Default classification name for stored records.
pub const DEFAULT_COLLECTION: &str = "NLogEntries";

/// Base directory of machine-wide certificate stores.
pub(crate) const MACHINE_STORE_BASE: &str = "/etc/ssl";

/// Directory under the user's home holding per-user certificate stores.
pub(crate) const USER_STORE_DIR: &str = ".ssl";
