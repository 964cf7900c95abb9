use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt};
use url::Url;

use crate::protocol::header::read_header;
use crate::protocol::mime::MimeType;
use crate::protocol::status::Status;

/// Read buffer size for bulk body reads
const BUFFER_SIZE: usize = 8192;

/// A typed server response.
///
/// The variant is selected by the decade of the status code. Only
/// [`Response::Success`] keeps the stream: `body` is the unread remainder of
/// the connection, left untouched for the caller to consume. Every other
/// variant is fully materialized from the header line.
#[derive(Debug)]
pub enum Response<R> {
    /// 1x - the server asks for user input before serving the resource
    Input {
        status: Status,
        header: String,
        prompt: Option<String>,
    },
    /// 2x - the request succeeded and a body follows the header
    Success {
        status: Status,
        header: String,
        mime_type: Option<MimeType>,
        body: R,
    },
    /// 3x - the resource lives elsewhere. The target is a validated URI
    /// reference and may be relative; resolution against the request URL is
    /// up to the caller.
    Redirect {
        status: Status,
        header: String,
        uri: Option<String>,
    },
    /// 4x - the request failed but may succeed later
    TemporaryFailure {
        status: Status,
        header: String,
        message: Option<String>,
    },
    /// 5x - the request failed for good
    PermanentFailure {
        status: Status,
        header: String,
        message: Option<String>,
    },
    /// 6x - a client certificate is required or was refused
    AuthRequired {
        status: Status,
        header: String,
        message: Option<String>,
    },
    /// Fallback for headers with no recognizable status decade
    Error {
        status: Status,
        header: String,
        message: Option<String>,
    },
}

impl<R> Response<R> {
    /// Returns the status of this response.
    pub fn status(&self) -> Status {
        match self {
            Response::Input { status, .. }
            | Response::Success { status, .. }
            | Response::Redirect { status, .. }
            | Response::TemporaryFailure { status, .. }
            | Response::PermanentFailure { status, .. }
            | Response::AuthRequired { status, .. }
            | Response::Error { status, .. } => *status,
        }
    }

    /// Returns the raw header line this response was built from.
    pub fn header(&self) -> &str {
        match self {
            Response::Input { header, .. }
            | Response::Success { header, .. }
            | Response::Redirect { header, .. }
            | Response::TemporaryFailure { header, .. }
            | Response::PermanentFailure { header, .. }
            | Response::AuthRequired { header, .. }
            | Response::Error { header, .. } => header,
        }
    }
}

/// Reads the header line from the stream and builds the typed response.
///
/// Only I/O failures while scanning the header are errors; any header
/// *content*, including an empty line, degrades to a typed variant with
/// `None` fields.
pub async fn read_response<R>(mut stream: R) -> std::io::Result<Response<R>>
where
    R: AsyncRead + Unpin,
{
    let header = read_header(&mut stream).await?;
    Ok(dispatch(header, stream))
}

/// Builds the typed response variant from an already-scanned header line.
///
/// The body stream is handed to the `Success` variant unread and dropped for
/// every other variant.
pub fn dispatch<R>(header: String, body: R) -> Response<R> {
    let status = Status::from_header(&header);
    let meta = read_meta(&header);

    match status.code() / 10 {
        1 => Response::Input {
            status,
            header,
            prompt: meta,
        },
        2 => Response::Success {
            status,
            mime_type: meta.as_deref().and_then(MimeType::parse),
            body,
            header,
        },
        3 => Response::Redirect {
            status,
            uri: meta.as_deref().and_then(parse_uri),
            header,
        },
        4 => Response::TemporaryFailure {
            status,
            header,
            message: meta,
        },
        5 => Response::PermanentFailure {
            status,
            header,
            message: meta,
        },
        6 => Response::AuthRequired {
            status,
            header,
            message: meta,
        },
        _ => {
            tracing::error!(header = %header, "Could not parse response status, creating generic error response");
            Response::Error {
                status,
                header,
                message: meta,
            }
        }
    }
}

/// Extracts the meta portion of the header: everything after the status
/// token, re-joined with single spaces. Fewer than two whitespace-separated
/// tokens means there is no meta.
fn read_meta(header: &str) -> Option<String> {
    let tokens: Vec<&str> = header.split_whitespace().collect();
    if tokens.len() < 2 {
        return None;
    }
    Some(tokens[1..].join(" "))
}

/// Validates the redirect target as a URI reference, absolute or relative,
/// and returns it verbatim.
fn parse_uri(meta: &str) -> Option<String> {
    if meta.trim().is_empty() {
        tracing::error!("No redirect URI received");
        return None;
    }
    match Url::parse(meta) {
        Ok(_) => Some(meta.to_string()),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            // A relative reference is fine, but its first path segment must
            // not contain a colon (RFC 3986); that would be a malformed
            // scheme, not a path.
            let first_segment = meta.split(['/', '?', '#']).next().unwrap_or("");
            if first_segment.contains(':') {
                tracing::error!(uri = meta, "Invalid redirect URI received");
                return None;
            }
            Some(meta.to_string())
        }
        Err(e) => {
            tracing::error!(uri = meta, error = %e, "Invalid redirect URI received");
            None
        }
    }
}

/// Drains a success body into memory.
///
/// Convenience for callers that want the whole body at once; streaming
/// consumers should read from the body directly instead.
pub async fn read_body_to_end<R>(mut body: R) -> std::io::Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut buffer = BytesMut::with_capacity(BUFFER_SIZE);
    loop {
        let n = body.read_buf(&mut buffer).await?;
        if n == 0 {
            break;
        }
    }
    Ok(buffer.to_vec())
}
