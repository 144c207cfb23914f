use std::path::PathBuf;

use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum RavenTargetError {
    #[error("Cannot resolve the document store address. Please make sure the urls option is set.")]
    MissingUrls,
    #[error("Field templates must have a non-empty name.")]
    EmptyFieldName,
    #[error("No certificate was found in file: {0}")]
    InvalidCertificate(PathBuf),
    #[error(
        "No matching certificate was found in store {0}. Please verify that the \
         certificate is available in the configured store."
    )]
    NoCertificateMatch(PathBuf),
    #[error("Could not determine a home directory for the current-user certificate store.")]
    MissingHomeDirectory,

    // Wrapped errors
    #[error("File IO error: {0}, in file {1}")]
    FileIo(std::io::Error, PathBuf),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}
