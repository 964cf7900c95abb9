use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use crate::options::{DEFAULT_GRACE_PERIOD_DAYS, RequestOptions};
use crate::security::store::{FileCertificateStore, MemoryCertificateStore};

/// CLI configuration, loaded from the YAML file named by `CASTOR_CONFIG`.
///
/// Missing file or variable means defaults: validation on, renewal check on,
/// 90-day grace period, pins kept in memory only (set `known_hosts` to a
/// file path to persist them across runs).
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub validation_enabled: bool,
    pub renewal_check_enabled: bool,
    pub grace_period_days: i64,
    pub known_hosts: Option<PathBuf>,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            validation_enabled: true,
            renewal_check_enabled: true,
            grace_period_days: DEFAULT_GRACE_PERIOD_DAYS,
            known_hosts: None,
            connect_timeout_secs: 10,
            request_timeout_secs: 30,
        }
    }
}

impl Config {
    pub fn load() -> Self {
        let Ok(path) = std::env::var("CASTOR_CONFIG") else {
            return Self::default();
        };
        match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_yaml::from_str(&raw) {
                Ok(config) => config,
                Err(e) => {
                    tracing::error!(path = %path, error = %e, "Invalid config file, using defaults");
                    Self::default()
                }
            },
            Err(e) => {
                tracing::error!(path = %path, error = %e, "Could not read config file, using defaults");
                Self::default()
            }
        }
    }

    /// Turns the configuration into request options, wiring up the
    /// certificate store.
    pub fn request_options(&self) -> RequestOptions {
        let options = RequestOptions::new()
            .validation_enabled(self.validation_enabled)
            .renewal_check_enabled(self.renewal_check_enabled)
            .grace_period_days(self.grace_period_days)
            .connect_timeout(Duration::from_secs(self.connect_timeout_secs))
            .request_timeout(Duration::from_secs(self.request_timeout_secs));

        match &self.known_hosts {
            Some(path) => options.certificate_store(Arc::new(FileCertificateStore::new(path))),
            None => options.certificate_store(Arc::new(MemoryCertificateStore::new())),
        }
    }
}
