//! Gemini response protocol.
//!
//! The wire format is a single CRLF-terminated header line, optionally
//! followed by a body stream:
//!
//! ```text
//! <2-digit-status>[ <meta...>]\r\n
//! [body...]
//! ```
//!
//! There are no other header fields. The modules here turn that untrusted
//! byte stream into a strongly-typed response:
//!
//! - **`header`**: scans the stream up to (and excluding) the CRLF terminator
//! - **`status`**: maps the two-digit code to a semantic status, with decade
//!   fallback for codes a server invents within a known decade
//! - **`mime`**: parses the media type carried by success responses
//! - **`response`**: the closed response sum type and the status-driven
//!   dispatcher that builds it
//!
//! Parsing never fails on malformed content: bad codes, bad URIs and bad
//! MIME types all degrade to a typed variant with `None` fields. Only I/O
//! errors on the underlying stream surface as errors.

pub mod header;
pub mod mime;
pub mod response;
pub mod status;

pub use mime::MimeType;
pub use response::{Response, read_response};
pub use status::Status;
