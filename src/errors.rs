use std::fmt;

use reqwest::StatusCode;
use thiserror::Error;

/// Business-level failures reported through the envelope `code` field.
///
/// Every other code, including the success codes, maps to no error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// 10001
    IllegalParameter,
    /// 10010
    InternalError,
    /// 10011
    FileNotFound,
    /// 10012
    SizeExceedsLimit,
    /// 10013, the embedded `jconfig` string could not be parsed.
    ParamParseError,
    /// 10014
    JobFailed,
    /// 30001
    InvalidApiKey,
    /// 30004
    InsufficientBalance,
}

impl ErrorKind {
    /// All kinds, in code order.
    pub const ALL: [ErrorKind; 8] = [
        ErrorKind::IllegalParameter,
        ErrorKind::InternalError,
        ErrorKind::FileNotFound,
        ErrorKind::SizeExceedsLimit,
        ErrorKind::ParamParseError,
        ErrorKind::JobFailed,
        ErrorKind::InvalidApiKey,
        ErrorKind::InsufficientBalance,
    ];

    /// Map an envelope code to a failure kind. `None` means "no error".
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            10001 => Some(ErrorKind::IllegalParameter),
            10010 => Some(ErrorKind::InternalError),
            10011 => Some(ErrorKind::FileNotFound),
            10012 => Some(ErrorKind::SizeExceedsLimit),
            10013 => Some(ErrorKind::ParamParseError),
            10014 => Some(ErrorKind::JobFailed),
            30001 => Some(ErrorKind::InvalidApiKey),
            30004 => Some(ErrorKind::InsufficientBalance),
            _ => None,
        }
    }

    /// The envelope code this kind is reported under.
    pub fn code(self) -> i64 {
        match self {
            ErrorKind::IllegalParameter => 10001,
            ErrorKind::InternalError => 10010,
            ErrorKind::FileNotFound => 10011,
            ErrorKind::SizeExceedsLimit => 10012,
            ErrorKind::ParamParseError => 10013,
            ErrorKind::JobFailed => 10014,
            ErrorKind::InvalidApiKey => 30001,
            ErrorKind::InsufficientBalance => 30004,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ErrorKind::IllegalParameter => "illegal parameter",
            ErrorKind::InternalError => "vanceai internal error",
            ErrorKind::FileNotFound => "file not found",
            ErrorKind::SizeExceedsLimit => "size exceeds limit",
            ErrorKind::ParamParseError => "jparam parse error",
            ErrorKind::JobFailed => "job failed",
            ErrorKind::InvalidApiKey => "invalid api key",
            ErrorKind::InsufficientBalance => "insufficient balance",
        };
        f.write_str(text)
    }
}

/// All errors that can occur when using the VanceAI SDK.
///
/// Two axes are kept apart: transport failures ([`Http`](Self::Http),
/// [`Status`](Self::Status), [`Decode`](Self::Decode)) and envelope-level
/// failures ([`Api`](Self::Api)) where the exchange succeeded but the service
/// reported a business error.
#[derive(Error, Debug)]
pub enum VanceAiError {
    /// No API key was passed to the builder and `VANCEAI_API_KEY` is unset.
    #[error("API key is required: pass it to ClientBuilder::api_key() or set VANCEAI_API_KEY")]
    MissingApiKey,

    /// A connection or protocol failure from reqwest.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with an HTTP status other than 200.
    #[error("{route}: unexpected HTTP status {status}")]
    Status {
        route: &'static str,
        status: StatusCode,
        body: String,
    },

    /// The body of an expected-JSON response could not be decoded.
    #[error("{route}: failed to decode response: {source}")]
    Decode {
        route: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// A request payload could not be serialized.
    #[error("failed to encode request: {0}")]
    Encode(#[source] serde_json::Error),

    /// A `jconfig` string could not be parsed into a job descriptor.
    #[error("invalid job config: {0}")]
    InvalidJob(#[source] serde_json::Error),

    /// The envelope carried one of the known failure codes.
    #[error("{route}: {kind} (code {code}): {message}")]
    Api {
        route: &'static str,
        kind: ErrorKind,
        code: i64,
        message: String,
    },

    /// Download returned a JSON envelope instead of image bytes.
    #[error("{route}: expected image data, got envelope with code {code}: {message}")]
    UnexpectedPayload {
        route: &'static str,
        code: i64,
        message: String,
    },

    /// An I/O error, typically from reading or writing a local file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl VanceAiError {
    /// The semantic failure kind, if this is an envelope-level error.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            VanceAiError::Api { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// `true` for failures at the HTTP/network layer.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            VanceAiError::Http(_) | VanceAiError::Status { .. } | VanceAiError::Decode { .. }
        )
    }

    /// The HTTP status, for [`Status`](Self::Status) errors.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            VanceAiError::Status { status, .. } => Some(*status),
            VanceAiError::Http(e) => e.status(),
            _ => None,
        }
    }
}

/// A convenience alias for `Result<T, VanceAiError>`.
pub type Result<T> = std::result::Result<T, VanceAiError>;
