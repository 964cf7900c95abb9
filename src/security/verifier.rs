//! rustls integration for the TOFU trust engine.
//!
//! Certificate *identity* is decided by the trust engine alone; there is no
//! chain building and no root store. Handshake signatures are still verified
//! with the crypto provider, so the peer must hold the private key of the
//! certificate it presents.

use std::sync::{Arc, Mutex};

use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::{WebPkiSupportedAlgorithms, verify_tls12_signature, verify_tls13_signature};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{DigitallySignedStruct, SignatureScheme};

use crate::options::RequestOptions;
use crate::security::engine::{TrustError, validate_chain};

/// Server certificate verifier making the TOFU accept/reject decision for
/// one host:port pair.
///
/// rustls reports rejections as an opaque handshake error, so the verifier
/// also records the last [`TrustError`] it produced; after a failed
/// handshake the caller takes it back out to surface a distinguishable trust
/// failure instead of a generic transport error.
#[derive(Debug)]
pub struct TofuVerifier {
    host: String,
    port: u16,
    options: Arc<RequestOptions>,
    supported: WebPkiSupportedAlgorithms,
    rejection: Mutex<Option<TrustError>>,
}

impl TofuVerifier {
    pub fn new(host: impl Into<String>, port: u16, options: Arc<RequestOptions>) -> Self {
        Self {
            host: host.into(),
            port,
            options,
            supported: rustls::crypto::ring::default_provider().signature_verification_algorithms,
            rejection: Mutex::new(None),
        }
    }

    /// Takes the rejection recorded during a failed handshake, if any.
    pub fn take_rejection(&self) -> Option<TrustError> {
        self.rejection.lock().ok().and_then(|mut slot| slot.take())
    }

    fn record(&self, reason: &TrustError) {
        if let Ok(mut slot) = self.rejection.lock() {
            *slot = Some(reason.clone());
        }
    }
}

impl ServerCertVerifier for TofuVerifier {
    fn verify_server_cert(
        &self,
        end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        match validate_chain(&[end_entity.as_ref()], &self.host, self.port, &self.options) {
            Ok(trust) => {
                tracing::debug!(host = %self.host, port = self.port, ?trust, "Server certificate accepted");
                Ok(ServerCertVerified::assertion())
            }
            Err(reason) => {
                let message = reason.to_string();
                self.record(&reason);
                Err(rustls::Error::General(message))
            }
        }
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls12_signature(message, cert, dss, &self.supported)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls13_signature(message, cert, dss, &self.supported)
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.supported.supported_schemes()
    }
}
