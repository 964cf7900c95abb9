//! Request construction.
//!
//! A request is a single URL line. The builder assembles and bounds it; the
//! heavy lifting (TLS, validation, response parsing) happens in
//! [`Request::send`].

use std::sync::Arc;

use crate::error::ClientError;
use crate::options::RequestOptions;
use crate::request::{DEFAULT_PORT, DEFAULT_SCHEME, MAX_URL_BYTES, Request};

/// Builder for a Gemini request.
///
/// # Example
///
/// ```ignore
/// let request = RequestBuilder::new("geminiprotocol.net")
///     .path("/docs/gemtext-specification.gmi")
///     .build()?;
/// let response = request.send().await?;
/// ```
pub struct RequestBuilder {
    host: String,
    options: Arc<RequestOptions>,
    scheme: String,
    path: String,
    query_string: String,
    port: u16,
}

impl RequestBuilder {
    /// Creates a builder targeting `host` with default options.
    pub fn new(host: impl Into<String>) -> Self {
        Self::with_options(host, Arc::new(RequestOptions::default()))
    }

    /// Creates a builder targeting `host` with the given options.
    pub fn with_options(host: impl Into<String>, options: Arc<RequestOptions>) -> Self {
        Self {
            host: host.into(),
            options,
            scheme: DEFAULT_SCHEME.to_string(),
            path: "/".to_string(),
            query_string: String::new(),
            port: DEFAULT_PORT,
        }
    }

    /// Sets the request scheme. Default is `gemini`.
    pub fn scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    /// Sets the request path. Default is `/`.
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Sets the request port. Default is `1965`.
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the query string from raw text; it is percent-encoded here.
    pub fn query(mut self, query_string: &str) -> Self {
        self.query_string = encode_query(query_string);
        self
    }

    /// Sets an already percent-encoded query string verbatim.
    pub fn encoded_query(mut self, query_string: impl Into<String>) -> Self {
        self.query_string = query_string.into();
        self
    }

    /// Assembles the request. Fails only when the resulting URL exceeds the
    /// protocol's 1024-byte limit.
    pub fn build(self) -> Result<Request, ClientError> {
        let url = self.build_url()?;
        Ok(Request::new(url, self.host, self.port, self.options))
    }

    fn build_url(&self) -> Result<String, ClientError> {
        let mut url = format!(
            "{}://{}{}",
            self.scheme,
            self.host,
            normalize_path(&self.path)
        );
        if !self.query_string.is_empty() {
            url = format!("{}?{}", url, self.query_string);
        }
        let length = url.len();
        if length > MAX_URL_BYTES {
            tracing::error!(length, "Provided URL too long");
            return Err(ClientError::UrlTooLong {
                length,
                limit: MAX_URL_BYTES,
            });
        }
        Ok(url)
    }
}

fn normalize_path(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

/// Percent-encodes a query string. Spaces become `%20`, not `+`, since the
/// query is part of a URL rather than a form body.
fn encode_query(query_string: &str) -> String {
    url::form_urlencoded::byte_serialize(query_string.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}
