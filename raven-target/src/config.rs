//! Sink target configuration.
//!
//! Configuration comes in two stages, following the host's model: a
//! [`ConfigFile`] whose string values are render templates, and a resolved
//! [`Config`] produced once at activation by rendering those templates
//! against a synthetic empty event.

use std::{
    path::{Path, PathBuf},
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::{
    constants::DEFAULT_COLLECTION, error::RavenTargetError, event::LogEvent, identity,
    layout::Layout, store::StoreConfig,
};

/// Identifier-generation mode for stored records.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase", try_from = "String")]
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
pub enum IdType {
    /// Leave the identifier field unset so the store assigns one on insert.
    #[default]
    String,
    /// Generate a unique identifier per record.
    Guid,
}

impl TryFrom<String> for IdType {
    type Error = strum::ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// System certificate-store location searched for a client identity.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(try_from = "String")]
#[strum(ascii_case_insensitive)]
pub enum StoreLocation {
    CurrentUser,
    #[default]
    LocalMachine,
}

impl TryFrom<String> for StoreLocation {
    type Error = strum::ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// One configured document field: a name plus the layout rendered against
/// each event to produce the field's value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldTemplate {
    pub name: String,
    pub layout: Layout,
}

impl FieldTemplate {
    pub fn new(name: impl Into<String>, layout: impl Into<Layout>) -> Self {
        Self {
            name: name.into(),
            layout: layout.into(),
        }
    }
}

/// Client-identity configuration: a PEM file path, or a certificate-store
/// lookup by subject or thumbprint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "snake_case")]
pub struct CertificateConfig {
    /// PEM file holding the client identity.
    pub path: Option<Layout>,
    #[serde(default)]
    pub store_location: StoreLocation,
    /// Certificate store to search; relative names resolve under the
    /// configured store location.
    pub store_name: Option<Layout>,
    /// Subject-name lookup value; takes precedence over `thumbprint` when
    /// both are configured.
    pub subject: Option<Layout>,
    /// SHA-256 fingerprint lookup value.
    pub thumbprint: Option<Layout>,
}

/// Target configuration as written by the host's configuration layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "snake_case")]
pub struct ConfigFile {
    /// Comma-separated store endpoints; required.
    pub urls: Layout,
    /// Target database name.
    pub database: Option<Layout>,
    #[serde(default)]
    pub id_type: IdType,
    /// Classification name under which records are stored.
    #[serde(default = "default_collection")]
    pub collection_name: Layout,
    /// Document field templates, rendered per event in declaration order.
    #[serde(default)]
    pub fields: Vec<FieldTemplate>,
    /// Days until stored records expire; zero disables expiry.
    #[serde(default)]
    pub expiry_days: u32,
    pub certificate: Option<CertificateConfig>,
}

fn default_collection() -> Layout {
    Layout::new(DEFAULT_COLLECTION)
}

impl FromStr for ConfigFile {
    type Err = RavenTargetError;

    fn from_str(config_string: &str) -> Result<Self, Self::Err> {
        Ok(toml::from_str(config_string)?)
    }
}

impl ConfigFile {
    pub fn from_file(config_path: impl AsRef<Path>) -> Result<Self, RavenTargetError> {
        let config_string = std::fs::read_to_string(&config_path)
            .map_err(|e| RavenTargetError::FileIo(e, config_path.as_ref().to_path_buf()))?;
        Self::from_str(&config_string)
    }
}

/// Target configuration with all activation-time values resolved.
///
/// Field templates and the expiry duration stay unresolved here; they are
/// evaluated per event and per write respectively.
#[derive(Debug, Clone)]
pub struct Config {
    pub urls: Vec<String>,
    pub database: Option<String>,
    pub id_type: IdType,
    pub collection_name: String,
    pub fields: Vec<FieldTemplate>,
    pub expiry_days: u32,
    pub certificate: Option<PathBuf>,
}

impl Config {
    /// Resolves a [`ConfigFile`] against a synthetic empty event.
    ///
    /// Fails when the address list resolves blank, a field template has an
    /// empty name, or the configured client identity cannot be loaded.
    pub fn resolve(file: ConfigFile) -> Result<Self, RavenTargetError> {
        let empty = LogEvent::empty();

        let urls = file.urls.render(&empty);
        let urls: Vec<String> = urls
            .split(',')
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(ToOwned::to_owned)
            .collect();
        if urls.is_empty() {
            return Err(RavenTargetError::MissingUrls);
        }

        if file.fields.iter().any(|field| field.name.trim().is_empty()) {
            return Err(RavenTargetError::EmptyFieldName);
        }

        let database = file
            .database
            .map(|layout| layout.render(&empty))
            .filter(|name| !name.trim().is_empty());

        let collection_name = match file.collection_name.render(&empty) {
            name if name.trim().is_empty() => DEFAULT_COLLECTION.to_owned(),
            name => name,
        };

        let certificate = match &file.certificate {
            Some(certificate) => identity::resolve(certificate, &empty)?,
            None => None,
        };

        Ok(Self {
            urls,
            database,
            id_type: file.id_type,
            collection_name,
            fields: file.fields,
            expiry_days: file.expiry_days,
            certificate,
        })
    }

    /// The store-facing slice of this configuration.
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            urls: self.urls.clone(),
            database: self.database.clone(),
            collection: self.collection_name.clone(),
            certificate: self.certificate.clone(),
        }
    }
}
