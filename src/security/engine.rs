//! Trust-On-First-Use certificate validation.
//!
//! There is no certificate authority in this protocol. The first certificate
//! a host:port pair ever presents is pinned by content fingerprint; later
//! connections must present the same certificate, with one heuristic escape
//! hatch: a changed certificate is tolerated when the *stored* record is
//! within its renewal grace period. A change far from the recorded expiry is
//! treated as a potential interception and rejected. This is a plausibility
//! heuristic, not cryptographic proof of anything.

use chrono::{DateTime, Local, NaiveDate, Utc};
use sha2::{Digest, Sha256};
use x509_parser::prelude::FromDer;
use x509_parser::certificate::X509Certificate;

use crate::options::RequestOptions;
use crate::security::store::TrustedCertificate;

/// The reason a certificate was rejected. Every rejection is fatal to the
/// connection attempt; the caller must abort the handshake.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TrustError {
    #[error("no server certificate received")]
    NoCertificate,

    #[error("server certificate could not be decoded: {0}")]
    Malformed(String),

    #[error("certificate host doesn't match: cert host {certificate_host:?}, request host {request_host:?}")]
    HostMismatch {
        certificate_host: String,
        request_host: String,
    },

    #[error("certificate not yet valid")]
    NotYetValid,

    #[error("certificate has expired")]
    Expired,

    #[error("certificate renewal out of grace period ({days_until_expiry} days until recorded expiry)")]
    RenewalOutOfGracePeriod { days_until_expiry: i64 },

    #[error("no certificate store configured")]
    NoStoreConfigured,

    #[error("certificate store unavailable: {0}")]
    StoreUnavailable(String),
}

/// How a certificate came to be accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trust {
    /// Validation is disabled by configuration; nothing was checked
    Disabled,
    /// First contact with this host:port; the certificate was pinned
    FirstUse,
    /// The presented fingerprint matches the pinned record
    Known,
    /// The fingerprint changed but the change was tolerated as renewal
    Renewal,
}

/// The fields of a peer certificate the trust decision is made from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerCertificate {
    /// Subject common name, compared verbatim against the request host
    pub host: String,
    /// First day the certificate is valid, as a local calendar date
    pub not_before: NaiveDate,
    /// Last day the certificate is valid, as a local calendar date
    pub not_after: NaiveDate,
    /// Uppercase-hex SHA-256 digest of the DER encoding
    pub fingerprint: String,
}

impl PeerCertificate {
    /// Extracts the decision-relevant fields from a DER-encoded certificate.
    pub fn from_der(der: &[u8]) -> Result<Self, TrustError> {
        let (_, cert) = X509Certificate::from_der(der)
            .map_err(|e| TrustError::Malformed(e.to_string()))?;

        let host = cert
            .subject()
            .iter_common_name()
            .next()
            .and_then(|cn| cn.as_str().ok())
            .unwrap_or_default()
            .to_string();

        let validity = cert.validity();
        let not_before = to_local_date(validity.not_before.timestamp())
            .ok_or_else(|| TrustError::Malformed("notBefore out of range".into()))?;
        let not_after = to_local_date(validity.not_after.timestamp())
            .ok_or_else(|| TrustError::Malformed("notAfter out of range".into()))?;

        Ok(PeerCertificate {
            host,
            not_before,
            not_after,
            fingerprint: fingerprint(der),
        })
    }
}

/// Computes the pinned identity token of a certificate: the uppercase-hex
/// SHA-256 digest of its DER encoding.
pub fn fingerprint(der: &[u8]) -> String {
    hex::encode_upper(Sha256::digest(der))
}

fn to_local_date(timestamp: i64) -> Option<NaiveDate> {
    DateTime::<Utc>::from_timestamp(timestamp, 0).map(|dt| dt.with_timezone(&Local).date_naive())
}

/// Validates the peer certificate chain presented during a handshake.
///
/// Only the leaf is examined; this protocol pins a single certificate by
/// content, not a chain of trust.
pub fn validate_chain(
    chain: &[&[u8]],
    request_host: &str,
    request_port: u16,
    options: &RequestOptions,
) -> Result<Trust, TrustError> {
    // Disabled validation accepts unconditionally, even with no certificate.
    if !options.validation_enabled {
        return Ok(Trust::Disabled);
    }
    let leaf = chain.first().ok_or_else(|| {
        tracing::error!("No server certificate received");
        TrustError::NoCertificate
    })?;
    let peer = PeerCertificate::from_der(leaf)?;
    validate(&peer, request_host, request_port, options)
}

/// Validates an already-extracted peer certificate against today's date.
pub fn validate(
    peer: &PeerCertificate,
    request_host: &str,
    request_port: u16,
    options: &RequestOptions,
) -> Result<Trust, TrustError> {
    validate_at(peer, request_host, request_port, options, Local::now().date_naive())
}

/// Validation with an explicit `today`, so the date-sensitive paths are
/// deterministic under test.
///
/// The decision sequence is: configuration gate, hostname match, validity
/// window, then the TOFU lookup. On a fingerprint mismatch accepted within
/// the grace period the stored record is deliberately left untouched, so
/// every later connection repeats this check until the old record's expiry
/// itself passes the grace threshold.
pub fn validate_at(
    peer: &PeerCertificate,
    request_host: &str,
    request_port: u16,
    options: &RequestOptions,
    today: NaiveDate,
) -> Result<Trust, TrustError> {
    if !options.validation_enabled {
        return Ok(Trust::Disabled);
    }

    // Hostname: exact, case-sensitive match against the subject CN. No
    // wildcard or SAN support; loosening this would change trust semantics.
    if peer.host != request_host {
        tracing::error!(
            certificate_host = %peer.host,
            request_host,
            "Certificate host doesn't match"
        );
        return Err(TrustError::HostMismatch {
            certificate_host: peer.host.clone(),
            request_host: request_host.to_string(),
        });
    }

    // Validity window, inclusive by calendar day.
    if today < peer.not_before {
        tracing::error!("Certificate not yet valid");
        return Err(TrustError::NotYetValid);
    }
    if today > peer.not_after {
        tracing::error!("Certificate has expired");
        return Err(TrustError::Expired);
    }

    let store = options.certificate_store.as_ref().ok_or_else(|| {
        tracing::error!("No certificate store configured");
        TrustError::NoStoreConfigured
    })?;

    let existing = store
        .get(request_host, request_port)
        .map_err(|e| TrustError::StoreUnavailable(e.to_string()))?;

    let Some(known) = existing else {
        // First contact with this host:port. Trust on first use: accept the
        // certificate and pin it.
        store
            .put(TrustedCertificate {
                host: request_host.to_string(),
                port: request_port,
                expiry_date: peer.not_after,
                fingerprint: peer.fingerprint.clone(),
            })
            .map_err(|e| TrustError::StoreUnavailable(e.to_string()))?;
        tracing::info!(
            host = request_host,
            port = request_port,
            fingerprint = %peer.fingerprint,
            "First contact, certificate pinned"
        );
        return Ok(Trust::FirstUse);
    };

    if known.fingerprint == peer.fingerprint {
        return Ok(Trust::Known);
    }

    // The certificate changed. A change close to the recorded expiry is
    // plausible routine renewal; a change far from it looks like
    // interception.
    if options.renewal_check_enabled {
        let days_until_expiry = (known.expiry_date - today).num_days();
        if days_until_expiry > options.grace_period_days {
            tracing::error!(
                days_until_expiry,
                grace_period_days = options.grace_period_days,
                "Certificate renewal out of grace period"
            );
            return Err(TrustError::RenewalOutOfGracePeriod { days_until_expiry });
        }
    }

    // Accepted without updating the pinned record: the stale record keeps
    // re-triggering this check until its own expiry passes the threshold.
    tracing::warn!(
        host = request_host,
        port = request_port,
        "Certificate changed, accepted as renewal; pinned record left untouched"
    );
    Ok(Trust::Renewal)
}
