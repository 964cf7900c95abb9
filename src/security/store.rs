//! Trusted certificate persistence.
//!
//! The trust engine pins exactly one certificate per host:port pair and
//! needs somewhere to keep those pins between connections. The store is
//! pluggable; this module ships an in-memory implementation for tests and
//! short-lived processes and a YAML-file implementation for a persistent
//! known-hosts list.

use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A pinned certificate record for one host:port pair.
///
/// Created on first contact and compared against on every subsequent
/// contact. The engine never mutates a stored record in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustedCertificate {
    /// The host the certificate was presented for
    pub host: String,
    /// The port the certificate was presented on
    pub port: u16,
    /// The certificate's notAfter date at pinning time
    pub expiry_date: NaiveDate,
    /// Uppercase-hex SHA-256 digest of the DER-encoded certificate
    pub fingerprint: String,
}

/// Opaque store failure. The trust engine treats any store error as a fatal
/// rejection of the connection attempt.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct StoreError(String);

impl StoreError {
    pub fn new(message: impl Into<String>) -> Self {
        StoreError(message.into())
    }
}

impl From<io::Error> for StoreError {
    fn from(e: io::Error) -> Self {
        StoreError(e.to_string())
    }
}

/// Contract for retrieving and persisting pinned certificates.
///
/// `get` followed by a first-contact `put` forms a check-then-act sequence.
/// Implementations that are shared across concurrently validating
/// connections must make that sequence atomic per (host, port) key, or
/// callers must serialize validation per host:port themselves; otherwise two
/// racing first contacts can pin different fingerprints.
pub trait CertificateStore: Send + Sync {
    /// Retrieves the pinned certificate for a host:port pair, if any.
    fn get(&self, host: &str, port: u16) -> Result<Option<TrustedCertificate>, StoreError>;

    /// Persists a pinned certificate, replacing any record for the same
    /// host:port pair.
    fn put(&self, certificate: TrustedCertificate) -> Result<(), StoreError>;
}

/// In-memory store backed by a mutex-guarded map.
///
/// Individual `get`/`put` calls are atomic; the check-then-act sequence
/// across them is not, so concurrent first contacts to the same host:port
/// must be serialized by the caller.
#[derive(Debug, Default)]
pub struct MemoryCertificateStore {
    entries: Mutex<HashMap<(String, u16), TrustedCertificate>>,
}

impl MemoryCertificateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CertificateStore for MemoryCertificateStore {
    fn get(&self, host: &str, port: u16) -> Result<Option<TrustedCertificate>, StoreError> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| StoreError::new("certificate store lock poisoned"))?;
        Ok(entries.get(&(host.to_string(), port)).cloned())
    }

    fn put(&self, certificate: TrustedCertificate) -> Result<(), StoreError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| StoreError::new("certificate store lock poisoned"))?;
        entries.insert(
            (certificate.host.clone(), certificate.port),
            certificate,
        );
        Ok(())
    }
}

/// File-backed store holding a YAML list of pinned certificates.
///
/// Every operation takes a single lock and re-reads the file, so one store
/// handle shared within a process keeps the load-modify-save cycle of `put`
/// atomic. A missing file reads as empty and is created on first `put`.
#[derive(Debug)]
pub struct FileCertificateStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileCertificateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    fn load(&self) -> Result<Vec<TrustedCertificate>, StoreError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_yaml::from_str(&raw).map_err(|e| StoreError::new(e.to_string()))
    }

    fn save(&self, entries: &[TrustedCertificate]) -> Result<(), StoreError> {
        let raw = serde_yaml::to_string(entries).map_err(|e| StoreError::new(e.to_string()))?;
        std::fs::write(&self.path, raw)?;
        Ok(())
    }
}

impl CertificateStore for FileCertificateStore {
    fn get(&self, host: &str, port: u16) -> Result<Option<TrustedCertificate>, StoreError> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| StoreError::new("certificate store lock poisoned"))?;
        let entries = self.load()?;
        Ok(entries
            .into_iter()
            .find(|c| c.host == host && c.port == port))
    }

    fn put(&self, certificate: TrustedCertificate) -> Result<(), StoreError> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| StoreError::new("certificate store lock poisoned"))?;
        let mut entries = self.load()?;
        entries.retain(|c| !(c.host == certificate.host && c.port == certificate.port));
        entries.push(certificate);
        self.save(&entries)
    }
}
