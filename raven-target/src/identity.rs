//! Client-identity resolution for transport authentication.
//!
//! The target can authenticate to the store with an X.509 client identity,
//! loaded either from a configured PEM file or found in a certificate
//! store: a directory of PEM files searched by subject or by SHA-256
//! fingerprint. Resolution yields the path of the matching file; the store
//! SDK consumes the file itself.

use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use sha2::{Digest, Sha256};
use x509_parser::prelude::*;

use crate::{
    config::{CertificateConfig, StoreLocation},
    constants::{MACHINE_STORE_BASE, USER_STORE_DIR},
    error::RavenTargetError,
    event::LogEvent,
    layout::Layout,
};

/// Resolves the configured client identity to the PEM file holding it.
///
/// A configured `path` wins. Otherwise a store lookup runs when a store
/// name plus a subject or thumbprint are configured, searching by subject
/// when one is given and by thumbprint otherwise; an empty lookup result is
/// a configuration error. With neither configured there is no client
/// identity.
pub fn resolve(
    config: &CertificateConfig,
    event: &LogEvent,
) -> Result<Option<PathBuf>, RavenTargetError> {
    let path = render(&config.path, event);
    if !path.is_empty() {
        return from_file(Path::new(&path)).map(Some);
    }

    let store_name = render(&config.store_name, event);
    let subject = render(&config.subject, event);
    let thumbprint = render(&config.thumbprint, event);

    if !store_name.is_empty() && (!subject.is_empty() || !thumbprint.is_empty()) {
        let store_dir = store_directory(config.store_location, &store_name)?;
        return from_store(&store_dir, &subject, &thumbprint).map(Some);
    }

    Ok(None)
}

fn render(layout: &Option<Layout>, event: &LogEvent) -> String {
    layout
        .as_ref()
        .map(|layout| layout.render(event).trim().to_owned())
        .unwrap_or_default()
}

/// Validates that the file exists and contains at least one certificate.
fn from_file(path: &Path) -> Result<PathBuf, RavenTargetError> {
    if read_certificates(path)?.is_empty() {
        return Err(RavenTargetError::InvalidCertificate(path.to_path_buf()));
    }
    Ok(path.to_path_buf())
}

fn store_directory(location: StoreLocation, name: &str) -> Result<PathBuf, RavenTargetError> {
    let name = Path::new(name);
    if name.is_absolute() {
        return Ok(name.to_path_buf());
    }
    match location {
        StoreLocation::LocalMachine => Ok(Path::new(MACHINE_STORE_BASE).join(name)),
        StoreLocation::CurrentUser => {
            let base_dirs =
                directories::BaseDirs::new().ok_or(RavenTargetError::MissingHomeDirectory)?;
            Ok(base_dirs.home_dir().join(USER_STORE_DIR).join(name))
        }
    }
}

/// Opens the store directory read-only and returns the first certificate
/// file matching the subject (preferred) or the thumbprint.
fn from_store(
    store_dir: &Path,
    subject: &str,
    thumbprint: &str,
) -> Result<PathBuf, RavenTargetError> {
    let mut entries: Vec<PathBuf> = std::fs::read_dir(store_dir)
        .map_err(|e| RavenTargetError::FileIo(e, store_dir.to_path_buf()))?
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| {
            matches!(
                path.extension().and_then(|ext| ext.to_str()),
                Some("pem" | "crt" | "cer")
            )
        })
        .collect();
    // Scan in name order so "first match" is deterministic.
    entries.sort();

    for path in entries {
        // A store may hold unrelated or malformed files; those are not ours.
        let Ok(certificates) = read_certificates(&path) else {
            continue;
        };
        if certificates
            .iter()
            .any(|der| matches_lookup(der, subject, thumbprint))
        {
            return Ok(path);
        }
    }

    Err(RavenTargetError::NoCertificateMatch(
        store_dir.to_path_buf(),
    ))
}

fn matches_lookup(der: &[u8], subject: &str, thumbprint: &str) -> bool {
    // Subject lookup takes precedence when both values are configured.
    if !subject.is_empty() {
        let Ok((_, certificate)) = X509Certificate::from_der(der) else {
            return false;
        };
        return certificate
            .subject()
            .to_string()
            .to_lowercase()
            .contains(&subject.to_lowercase());
    }
    fingerprint(der).eq_ignore_ascii_case(&normalize_thumbprint(thumbprint))
}

/// Hex SHA-256 fingerprint of a DER-encoded certificate.
fn fingerprint(der: &[u8]) -> String {
    hex::encode(Sha256::digest(der))
}

/// Accepts colon- or space-separated fingerprints as printed by common
/// tooling.
fn normalize_thumbprint(thumbprint: &str) -> String {
    thumbprint
        .chars()
        .filter(|c| !matches!(c, ':' | ' '))
        .collect()
}

fn read_certificates(path: &Path) -> Result<Vec<Vec<u8>>, RavenTargetError> {
    let fd = File::open(path).map_err(|e| RavenTargetError::FileIo(e, path.to_path_buf()))?;
    let mut buf = BufReader::new(&fd);
    rustls_pemfile::certs(&mut buf).map_err(|e| RavenTargetError::FileIo(e, path.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALPHA_PEM: &str = include_str!("../tests/fixtures/alpha.pem");
    const BETA_PEM: &str = include_str!("../tests/fixtures/beta.pem");
    // SHA-256 fingerprint of beta.pem, as printed by `openssl x509 -fingerprint`.
    const BETA_THUMBPRINT: &str = "1F:39:B1:FA:C3:C4:8F:B7:B9:6A:B0:4F:F6:EE:BD:DC:\
                                   69:AB:38:99:55:AF:5A:41:CB:D7:76:93:39:6D:95:0D";

    fn store_with_fixtures() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("alpha.pem"), ALPHA_PEM).unwrap();
        std::fs::write(dir.path().join("beta.pem"), BETA_PEM).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "not a certificate").unwrap();
        std::fs::write(dir.path().join("junk.pem"), "garbage").unwrap();
        dir
    }

    fn lookup_config(dir: &tempfile::TempDir) -> CertificateConfig {
        CertificateConfig {
            store_name: Some(Layout::new(dir.path().to_str().unwrap())),
            ..CertificateConfig::default()
        }
    }

    #[test]
    fn no_identity_configured_resolves_to_none() {
        let config = CertificateConfig::default();
        assert_eq!(resolve(&config, &LogEvent::empty()).unwrap(), None);
    }

    #[test]
    fn store_name_without_lookup_value_resolves_to_none() {
        let dir = store_with_fixtures();
        let config = lookup_config(&dir);
        assert_eq!(resolve(&config, &LogEvent::empty()).unwrap(), None);
    }

    #[test]
    fn configured_path_resolves_to_that_file() {
        let dir = store_with_fixtures();
        let path = dir.path().join("alpha.pem");
        let config = CertificateConfig {
            path: Some(Layout::new(path.to_str().unwrap())),
            ..CertificateConfig::default()
        };
        assert_eq!(resolve(&config, &LogEvent::empty()).unwrap(), Some(path));
    }

    #[test]
    fn missing_path_is_an_error() {
        let config = CertificateConfig {
            path: Some(Layout::new("/nonexistent/client.pem")),
            ..CertificateConfig::default()
        };
        assert!(matches!(
            resolve(&config, &LogEvent::empty()),
            Err(RavenTargetError::FileIo(..))
        ));
    }

    #[test]
    fn lookup_by_subject_finds_the_certificate() {
        let dir = store_with_fixtures();
        let config = CertificateConfig {
            subject: Some(Layout::new("Raven-Alpha")),
            ..lookup_config(&dir)
        };
        assert_eq!(
            resolve(&config, &LogEvent::empty()).unwrap(),
            Some(dir.path().join("alpha.pem"))
        );
    }

    #[test]
    fn lookup_by_thumbprint_finds_the_certificate() {
        let dir = store_with_fixtures();
        let config = CertificateConfig {
            thumbprint: Some(Layout::new(BETA_THUMBPRINT)),
            ..lookup_config(&dir)
        };
        assert_eq!(
            resolve(&config, &LogEvent::empty()).unwrap(),
            Some(dir.path().join("beta.pem"))
        );
    }

    #[test]
    fn subject_lookup_takes_precedence_over_thumbprint() {
        let dir = store_with_fixtures();
        let config = CertificateConfig {
            subject: Some(Layout::new("raven-alpha")),
            thumbprint: Some(Layout::new(BETA_THUMBPRINT)),
            ..lookup_config(&dir)
        };
        assert_eq!(
            resolve(&config, &LogEvent::empty()).unwrap(),
            Some(dir.path().join("alpha.pem"))
        );
    }

    #[test]
    fn empty_lookup_result_is_an_error() {
        let dir = store_with_fixtures();
        let config = CertificateConfig {
            subject: Some(Layout::new("no-such-subject")),
            ..lookup_config(&dir)
        };
        assert!(matches!(
            resolve(&config, &LogEvent::empty()),
            Err(RavenTargetError::NoCertificateMatch(_))
        ));
    }
}
