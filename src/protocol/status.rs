/// Semantic status returned by a Gemini server.
///
/// Every status carries a canonical two-digit code in [10, 69]. Codes the
/// server may send that are not enumerated here resolve to the status of
/// their decade base (e.g. 45 behaves as 40 Temporary Failure). Anything
/// that cannot be read as a code in range resolves to [`Status::Invalid`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// 10 - Input expected
    InputExpected,
    /// 11 - Sensitive input expected (e.g. a password)
    SensitiveInput,
    /// 20 - Success
    Success,
    /// 30 - Temporary redirection
    TemporaryRedirection,
    /// 31 - Permanent redirection
    PermanentRedirection,
    /// 40 - Temporary failure
    TemporaryFailure,
    /// 41 - Server unavailable
    ServerUnavailable,
    /// 42 - CGI error
    CgiError,
    /// 43 - Proxy error
    ProxyError,
    /// 44 - Slow down
    SlowDown,
    /// 50 - Permanent failure
    PermanentFailure,
    /// 51 - Not found
    NotFound,
    /// 52 - Gone
    Gone,
    /// 53 - Proxy request refused
    ProxyRequestRefused,
    /// 59 - Bad request
    BadRequest,
    /// 60 - Client certificate required
    RequiresCertificate,
    /// 61 - Certificate not authorized
    CertificateNotAuthorized,
    /// 62 - Certificate not valid
    CertificateNotValid,
    /// Fallback for headers that carry no usable status code
    Invalid,
}

impl Status {
    /// Returns the canonical numeric code of this status.
    ///
    /// # Example
    ///
    /// ```
    /// # use castor::protocol::status::Status;
    /// assert_eq!(Status::Success.code(), 20);
    /// assert_eq!(Status::Invalid.code(), 0);
    /// ```
    pub fn code(&self) -> u8 {
        match self {
            Status::InputExpected => 10,
            Status::SensitiveInput => 11,
            Status::Success => 20,
            Status::TemporaryRedirection => 30,
            Status::PermanentRedirection => 31,
            Status::TemporaryFailure => 40,
            Status::ServerUnavailable => 41,
            Status::CgiError => 42,
            Status::ProxyError => 43,
            Status::SlowDown => 44,
            Status::PermanentFailure => 50,
            Status::NotFound => 51,
            Status::Gone => 52,
            Status::ProxyRequestRefused => 53,
            Status::BadRequest => 59,
            Status::RequiresCertificate => 60,
            Status::CertificateNotAuthorized => 61,
            Status::CertificateNotValid => 62,
            Status::Invalid => 0,
        }
    }

    /// Reads the status from a raw response header.
    ///
    /// Never fails: a header shorter than two characters, a non-numeric
    /// prefix, or a code outside [10, 69] all yield [`Status::Invalid`].
    pub fn from_header(header: &str) -> Self {
        let Some(prefix) = header.get(..2) else {
            log_status_error(header);
            return Status::Invalid;
        };
        let Ok(code) = prefix.parse::<u8>() else {
            log_status_error(header);
            return Status::Invalid;
        };
        if !(10..=69).contains(&code) {
            log_status_error(header);
            return Status::Invalid;
        }
        Self::from_code(code)
    }

    /// Resolves a numeric code to its status.
    ///
    /// Unlisted codes fall back to the status of their decade base; a code
    /// with no listed decade base resolves to [`Status::Invalid`].
    pub fn from_code(code: u8) -> Self {
        match code {
            10 => Status::InputExpected,
            11 => Status::SensitiveInput,
            20 => Status::Success,
            30 => Status::TemporaryRedirection,
            31 => Status::PermanentRedirection,
            40 => Status::TemporaryFailure,
            41 => Status::ServerUnavailable,
            42 => Status::CgiError,
            43 => Status::ProxyError,
            44 => Status::SlowDown,
            50 => Status::PermanentFailure,
            51 => Status::NotFound,
            52 => Status::Gone,
            53 => Status::ProxyRequestRefused,
            59 => Status::BadRequest,
            60 => Status::RequiresCertificate,
            61 => Status::CertificateNotAuthorized,
            62 => Status::CertificateNotValid,
            // Decade fallback as a closed table so termination is obvious.
            other => match (other / 10) * 10 {
                10 => Status::InputExpected,
                20 => Status::Success,
                30 => Status::TemporaryRedirection,
                40 => Status::TemporaryFailure,
                50 => Status::PermanentFailure,
                60 => Status::RequiresCertificate,
                _ => Status::Invalid,
            },
        }
    }
}

fn log_status_error(header: &str) {
    tracing::error!(header, "Invalid response status returned from server");
}
