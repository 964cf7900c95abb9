use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::NaiveDate;

use castor::options::RequestOptions;
use castor::security::engine::{self, PeerCertificate, Trust, TrustError};
use castor::security::store::{
    CertificateStore, MemoryCertificateStore, StoreError, TrustedCertificate,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn peer(host: &str, fingerprint: &str) -> PeerCertificate {
    PeerCertificate {
        host: host.to_string(),
        not_before: date(2024, 1, 1),
        not_after: date(2026, 1, 1),
        fingerprint: fingerprint.to_string(),
    }
}

fn options_with_store(store: Arc<dyn CertificateStore>) -> RequestOptions {
    RequestOptions::new()
        .validation_enabled(true)
        .renewal_check_enabled(true)
        .certificate_store(store)
}

/// Store wrapper counting put calls, so tests can assert on pinning
/// behavior.
struct CountingStore {
    inner: MemoryCertificateStore,
    puts: AtomicUsize,
}

impl CountingStore {
    fn new() -> Self {
        Self {
            inner: MemoryCertificateStore::new(),
            puts: AtomicUsize::new(0),
        }
    }

    fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }
}

impl CertificateStore for CountingStore {
    fn get(&self, host: &str, port: u16) -> Result<Option<TrustedCertificate>, StoreError> {
        self.inner.get(host, port)
    }

    fn put(&self, certificate: TrustedCertificate) -> Result<(), StoreError> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        self.inner.put(certificate)
    }
}

/// Store that fails every operation.
struct BrokenStore;

impl CertificateStore for BrokenStore {
    fn get(&self, _host: &str, _port: u16) -> Result<Option<TrustedCertificate>, StoreError> {
        Err(StoreError::new("disk on fire"))
    }

    fn put(&self, _certificate: TrustedCertificate) -> Result<(), StoreError> {
        Err(StoreError::new("disk on fire"))
    }
}

fn today() -> NaiveDate {
    date(2025, 6, 15)
}

#[test]
fn test_validation_disabled_accepts_unconditionally() {
    // No store, mismatched host, expired window: nothing is checked.
    let options = RequestOptions::new();
    let peer = PeerCertificate {
        not_after: date(2020, 1, 1),
        ..peer("other.example", "AA")
    };

    let trust = engine::validate_at(&peer, "example.org", 1965, &options, today()).unwrap();
    assert_eq!(trust, Trust::Disabled);
}

#[test]
fn test_validation_disabled_accepts_empty_chain() {
    let options = RequestOptions::new();
    let trust = engine::validate_chain(&[], "example.org", 1965, &options).unwrap();
    assert_eq!(trust, Trust::Disabled);
}

#[test]
fn test_empty_chain_is_rejected() {
    let store = Arc::new(MemoryCertificateStore::new());
    let options = options_with_store(store);

    let result = engine::validate_chain(&[], "example.org", 1965, &options);
    assert_eq!(result.unwrap_err(), TrustError::NoCertificate);
}

#[test]
fn test_undecodable_certificate_is_rejected() {
    let store = Arc::new(MemoryCertificateStore::new());
    let options = options_with_store(store);

    let garbage: &[u8] = b"not a certificate";
    let result = engine::validate_chain(&[garbage], "example.org", 1965, &options);
    assert!(matches!(result.unwrap_err(), TrustError::Malformed(_)));
}

#[test]
fn test_host_mismatch_rejected_regardless_of_other_state() {
    // Expired cert and no store configured, but the host check comes first.
    let options = RequestOptions::new().validation_enabled(true);
    let peer = PeerCertificate {
        not_after: date(2020, 1, 1),
        ..peer("other.example", "AA")
    };

    let result = engine::validate_at(&peer, "example.org", 1965, &options, today());
    assert_eq!(
        result.unwrap_err(),
        TrustError::HostMismatch {
            certificate_host: "other.example".to_string(),
            request_host: "example.org".to_string(),
        }
    );
}

#[test]
fn test_host_match_is_case_sensitive() {
    let options = RequestOptions::new().validation_enabled(true);
    let peer = peer("Example.org", "AA");

    let result = engine::validate_at(&peer, "example.org", 1965, &options, today());
    assert!(matches!(result.unwrap_err(), TrustError::HostMismatch { .. }));
}

#[test]
fn test_not_yet_valid_certificate_is_rejected() {
    let store = Arc::new(MemoryCertificateStore::new());
    let options = options_with_store(store);
    let peer = peer("example.org", "AA");

    let result = engine::validate_at(&peer, "example.org", 1965, &options, date(2023, 12, 31));
    assert_eq!(result.unwrap_err(), TrustError::NotYetValid);
}

#[test]
fn test_expired_certificate_is_rejected() {
    let store = Arc::new(MemoryCertificateStore::new());
    let options = options_with_store(store);
    let peer = peer("example.org", "AA");

    let result = engine::validate_at(&peer, "example.org", 1965, &options, date(2026, 1, 2));
    assert_eq!(result.unwrap_err(), TrustError::Expired);
}

#[test]
fn test_validity_window_is_inclusive_by_day() {
    let store = Arc::new(MemoryCertificateStore::new());
    let options = options_with_store(store);
    let peer = peer("example.org", "AA");

    let first = engine::validate_at(&peer, "example.org", 1965, &options, date(2024, 1, 1));
    assert_eq!(first.unwrap(), Trust::FirstUse);
    let last = engine::validate_at(&peer, "example.org", 1965, &options, date(2026, 1, 1));
    assert_eq!(last.unwrap(), Trust::Known);
}

#[test]
fn test_no_store_configured_is_rejected() {
    let options = RequestOptions::new().validation_enabled(true);
    let peer = peer("example.org", "AA");

    let result = engine::validate_at(&peer, "example.org", 1965, &options, today());
    assert_eq!(result.unwrap_err(), TrustError::NoStoreConfigured);
}

#[test]
fn test_store_failure_is_rejected_as_unavailable() {
    let options = options_with_store(Arc::new(BrokenStore));
    let peer = peer("example.org", "AA");

    let result = engine::validate_at(&peer, "example.org", 1965, &options, today());
    assert!(matches!(result.unwrap_err(), TrustError::StoreUnavailable(_)));
}

#[test]
fn test_first_contact_pins_the_certificate() {
    let store = Arc::new(CountingStore::new());
    let options = options_with_store(store.clone());
    let peer = peer("example.org", "ABCD");

    let trust = engine::validate_at(&peer, "example.org", 1965, &options, today()).unwrap();
    assert_eq!(trust, Trust::FirstUse);
    assert_eq!(store.put_count(), 1);

    let pinned = store.get("example.org", 1965).unwrap().unwrap();
    assert_eq!(pinned.host, "example.org");
    assert_eq!(pinned.port, 1965);
    assert_eq!(pinned.fingerprint, "ABCD");
    assert_eq!(pinned.expiry_date, date(2026, 1, 1));
}

#[test]
fn test_matching_fingerprint_accepts_without_store_write() {
    let store = Arc::new(CountingStore::new());
    let options = options_with_store(store.clone());
    let peer = peer("example.org", "ABCD");

    engine::validate_at(&peer, "example.org", 1965, &options, today()).unwrap();
    let trust = engine::validate_at(&peer, "example.org", 1965, &options, today()).unwrap();

    assert_eq!(trust, Trust::Known);
    assert_eq!(store.put_count(), 1); // only the first contact wrote
}

#[test]
fn test_pins_are_per_host_port_pair() {
    let store = Arc::new(CountingStore::new());
    let options = options_with_store(store.clone());
    let peer = peer("example.org", "ABCD");

    let a = engine::validate_at(&peer, "example.org", 1965, &options, today()).unwrap();
    let b = engine::validate_at(&peer, "example.org", 1966, &options, today()).unwrap();
    assert_eq!(a, Trust::FirstUse);
    assert_eq!(b, Trust::FirstUse);
    assert_eq!(store.put_count(), 2);
}

#[test]
fn test_mismatch_outside_grace_period_is_rejected() {
    let store = Arc::new(MemoryCertificateStore::new());
    store
        .put(TrustedCertificate {
            host: "example.org".to_string(),
            port: 1965,
            expiry_date: date(2025, 12, 1), // 169 days past today
            fingerprint: "OLD".to_string(),
        })
        .unwrap();
    let options = options_with_store(store);
    let peer = peer("example.org", "NEW");

    let result = engine::validate_at(&peer, "example.org", 1965, &options, today());
    assert_eq!(
        result.unwrap_err(),
        TrustError::RenewalOutOfGracePeriod {
            days_until_expiry: 169
        }
    );
}

#[test]
fn test_mismatch_within_grace_period_is_accepted_without_repinning() {
    let store = Arc::new(CountingStore::new());
    store
        .put(TrustedCertificate {
            host: "example.org".to_string(),
            port: 1965,
            expiry_date: date(2025, 7, 1), // 16 days past today
            fingerprint: "OLD".to_string(),
        })
        .unwrap();
    let options = options_with_store(store.clone());
    let peer = peer("example.org", "NEW");

    let trust = engine::validate_at(&peer, "example.org", 1965, &options, today()).unwrap();
    assert_eq!(trust, Trust::Renewal);

    // The stored record is deliberately left untouched.
    assert_eq!(store.put_count(), 1);
    let pinned = store.get("example.org", 1965).unwrap().unwrap();
    assert_eq!(pinned.fingerprint, "OLD");
    assert_eq!(pinned.expiry_date, date(2025, 7, 1));
}

#[test]
fn test_grace_period_boundary_is_inclusive() {
    let store = Arc::new(MemoryCertificateStore::new());
    store
        .put(TrustedCertificate {
            host: "example.org".to_string(),
            port: 1965,
            expiry_date: date(2025, 9, 13), // exactly 90 days past today
            fingerprint: "OLD".to_string(),
        })
        .unwrap();
    let options = options_with_store(store);
    let peer = peer("example.org", "NEW");

    let trust = engine::validate_at(&peer, "example.org", 1965, &options, today()).unwrap();
    assert_eq!(trust, Trust::Renewal);
}

#[test]
fn test_mismatch_with_renewal_check_disabled_is_accepted() {
    let store = Arc::new(MemoryCertificateStore::new());
    store
        .put(TrustedCertificate {
            host: "example.org".to_string(),
            port: 1965,
            expiry_date: date(2025, 12, 1), // far outside the grace period
            fingerprint: "OLD".to_string(),
        })
        .unwrap();
    let options = RequestOptions::new()
        .validation_enabled(true)
        .certificate_store(store);
    let peer = peer("example.org", "NEW");

    let trust = engine::validate_at(&peer, "example.org", 1965, &options, today()).unwrap();
    assert_eq!(trust, Trust::Renewal);
}

#[test]
fn test_fingerprint_is_uppercase_hex_sha256() {
    // SHA-256 of the empty input, well known vector.
    assert_eq!(
        engine::fingerprint(b""),
        "E3B0C44298FC1C149AFBF4C8996FB92427AE41E4649B934CA495991B7852B855"
    );
}
