use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::security::store::CertificateStore;

/// Default number of days before a pinned certificate's recorded expiry
/// within which a changed certificate is tolerated as routine renewal.
pub const DEFAULT_GRACE_PERIOD_DAYS: i64 = 90;

/// Options controlling how a request is sent and how the server certificate
/// is validated.
#[derive(Clone)]
pub struct RequestOptions {
    /// Whether to validate the server certificate at all. When disabled the
    /// handshake accepts any peer unconditionally.
    pub validation_enabled: bool,

    /// Whether a changed certificate is checked against the renewal grace
    /// period. When disabled a fingerprint mismatch is accepted silently.
    pub renewal_check_enabled: bool,

    /// Grace period for the renewal check, in days.
    pub grace_period_days: i64,

    /// Store for pinned certificates. Required when validation is enabled;
    /// validating without one rejects the connection.
    pub certificate_store: Option<Arc<dyn CertificateStore>>,

    /// Timeout for establishing the TCP connection.
    pub connect_timeout: Duration,

    /// Timeout for receiving the response header after the request is sent.
    pub request_timeout: Duration,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            validation_enabled: false,
            renewal_check_enabled: false,
            grace_period_days: DEFAULT_GRACE_PERIOD_DAYS,
            certificate_store: None,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn validation_enabled(mut self, enabled: bool) -> Self {
        self.validation_enabled = enabled;
        self
    }

    pub fn renewal_check_enabled(mut self, enabled: bool) -> Self {
        self.renewal_check_enabled = enabled;
        self
    }

    pub fn grace_period_days(mut self, days: i64) -> Self {
        self.grace_period_days = days;
        self
    }

    pub fn certificate_store(mut self, store: Arc<dyn CertificateStore>) -> Self {
        self.certificate_store = Some(store);
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

impl fmt::Debug for RequestOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestOptions")
            .field("validation_enabled", &self.validation_enabled)
            .field("renewal_check_enabled", &self.renewal_check_enabled)
            .field("grace_period_days", &self.grace_period_days)
            .field("certificate_store", &self.certificate_store.is_some())
            .field("connect_timeout", &self.connect_timeout)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}
