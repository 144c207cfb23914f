//! A sink target that ships log events from a host logging pipeline into a
//! document database.
//!
//! The host pipeline supplies routing, levels, filtering, layout rendering,
//! and lifecycle; the document-store SDK supplies connection management,
//! authentication, transport retries, and bulk-insert mechanics. This crate
//! is the adapter between the two: it turns each incoming [`LogEvent`] into
//! a flexible [`Record`] by rendering the configured field templates and
//! hands the result to a [`DocumentStore`] implementation, one at a time or
//! as a batch.
//!
//! Store bindings live in their own crates; see `raven-mongodb` for the
//! MongoDB implementation of [`DocumentStore`].
#![warn(unused_results)]
#![warn(future_incompatible)]
#![warn(unused)]
#![forbid(rustdoc::broken_intra_doc_links)]

pub mod config;
pub mod constants;
pub mod error;
pub mod event;
pub mod identity;
pub mod layout;
pub mod record;
pub mod registry;
pub mod store;
pub mod target;

pub use config::{Config, ConfigFile};
pub use error::RavenTargetError;
pub use event::{BatchItem, Completion, Level, LogEvent};
pub use layout::Layout;
pub use record::Record;
pub use registry::TargetRegistry;
pub use store::{DocumentStore, StoreConfig, StoreError};
pub use target::{RavenTarget, Target};
