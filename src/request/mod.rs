//! Request building and the TLS send path.
//!
//! A request is one URL line written over a TLS 1.3 session. The TOFU trust
//! decision happens inside the handshake, through the verifier installed in
//! the client config; a rejection aborts the handshake and surfaces as
//! [`ClientError::Trust`] with its specific reason.

pub mod builder;

pub use builder::RequestBuilder;

use std::io;
use std::sync::Arc;

use rustls::pki_types::ServerName;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_rustls::TlsConnector;
use tokio_rustls::client::TlsStream;

use crate::error::ClientError;
use crate::options::RequestOptions;
use crate::protocol::response::{Response, read_response};
use crate::security::verifier::TofuVerifier;

/// Default scheme of the protocol
pub const DEFAULT_SCHEME: &str = "gemini";

/// Default port of the protocol
pub const DEFAULT_PORT: u16 = 1965;

/// Upper bound on the request URL, in bytes
pub const MAX_URL_BYTES: usize = 1024;

/// A request ready to be sent.
#[derive(Debug)]
pub struct Request {
    url: String,
    host: String,
    port: u16,
    options: Arc<RequestOptions>,
}

impl Request {
    pub(crate) fn new(url: String, host: String, port: u16, options: Arc<RequestOptions>) -> Self {
        Self {
            url,
            host,
            port,
            options,
        }
    }

    /// Returns the URL line this request will send.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Sends the request and parses the response header.
    ///
    /// The returned response borrows nothing: a `Success` variant owns the
    /// TLS stream positioned at the first body byte, so the body can be
    /// consumed incrementally and is never buffered here.
    pub async fn send(self) -> Result<Response<TlsStream<TcpStream>>, ClientError> {
        let verifier = Arc::new(TofuVerifier::new(
            &self.host,
            self.port,
            self.options.clone(),
        ));
        let config = client_config(verifier.clone())?;

        tracing::debug!(host = %self.host, port = self.port, url = %self.url, "Connecting");

        let tcp = timeout(
            self.options.connect_timeout,
            TcpStream::connect((self.host.as_str(), self.port)),
        )
        .await
        .map_err(|_| ClientError::ConnectTimeout(self.options.connect_timeout))??;

        let server_name = ServerName::try_from(self.host.clone())
            .map_err(|_| ClientError::InvalidHost(self.host.clone()))?;

        let connector = TlsConnector::from(Arc::new(config));
        let mut stream = match connector.connect(server_name, tcp).await {
            Ok(stream) => stream,
            Err(e) => {
                // A trust rejection travels through rustls as an opaque
                // handshake error; recover the recorded reason.
                if let Some(reason) = verifier.take_rejection() {
                    tracing::error!(host = %self.host, port = self.port, %reason, "Certificate rejected");
                    return Err(ClientError::Trust(reason));
                }
                tracing::error!(host = %self.host, port = self.port, error = %e, "TLS handshake failed");
                return Err(ClientError::Handshake(e));
            }
        };

        stream.write_all(self.url.as_bytes()).await?;
        stream.write_all(b"\r\n").await?;
        stream.flush().await?;

        tracing::trace!(url = %self.url, "Request line sent");

        let response = timeout(self.options.request_timeout, read_response(stream))
            .await
            .map_err(|_| ClientError::RequestTimeout(self.options.request_timeout))??;

        tracing::info!(
            url = %self.url,
            status = response.status().code(),
            "Response received"
        );
        Ok(response)
    }
}

/// Builds the TLS client config: TLS 1.3 only, no client auth, certificate
/// identity decided by the TOFU verifier.
fn client_config(verifier: Arc<TofuVerifier>) -> Result<rustls::ClientConfig, ClientError> {
    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let config = rustls::ClientConfig::builder_with_provider(provider)
        .with_protocol_versions(&[&rustls::version::TLS13])
        .map_err(|e| ClientError::Handshake(io::Error::other(e)))?
        .dangerous()
        .with_custom_certificate_verifier(verifier)
        .with_no_client_auth();
    Ok(config)
}
