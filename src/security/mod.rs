//! Trust-On-First-Use certificate validation.
//!
//! This protocol has no certificate authorities. A server's identity is its
//! certificate: on first contact the certificate is accepted and pinned by
//! fingerprint, and every later contact must present the pinned certificate
//! (or a plausible renewal of it, see `engine`).
//!
//! - **`engine`**: the pure accept/reject decision over an extracted peer
//!   certificate, the request target and the options
//! - **`store`**: the pluggable persistence contract for pinned records,
//!   with in-memory and file-backed implementations
//! - **`verifier`**: the rustls `ServerCertVerifier` that runs the engine
//!   inside the handshake

pub mod engine;
pub mod store;
pub mod verifier;

pub use engine::{PeerCertificate, Trust, TrustError};
pub use store::{CertificateStore, FileCertificateStore, MemoryCertificateStore, TrustedCertificate};
pub use verifier::TofuVerifier;
