//! Error types for Azion API calls.
//!
//! Every HTTP status the API documents as an error has its own [`ErrorKind`].
//! A failed response is turned into an [`ApiError`] carrying the kind, the
//! status code, the `detail` messages from the body and the raw body itself.
//! Everything else that can go wrong (transport, malformed payloads, bad
//! configuration) is a variant of the crate-wide [`Error`].

use crate::response::RawResponse;
use http::StatusCode;
use serde_json::Value;
use std::fmt;

/// The closed set of error kinds the API reports, keyed by HTTP status code.
///
/// # Examples
///
/// ```
/// use azion::ErrorKind;
/// use http::StatusCode;
///
/// assert_eq!(ErrorKind::classify(StatusCode::NOT_FOUND), Some(ErrorKind::NotFound));
/// assert_eq!(ErrorKind::classify(StatusCode::INTERNAL_SERVER_ERROR), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// 400: the server could not understand the request.
    BadRequest,
    /// 401: the request lacks valid authentication credentials.
    Unauthorized,
    /// 403: the server understood the request but refuses to authorize it.
    Forbidden,
    /// 404: the requested resource does not exist.
    NotFound,
    /// 405: the request method is known but not allowed on this resource.
    MethodNotAllowed,
    /// 406: no representation matches the `Accept*` headers.
    NotAcceptable,
    /// 409: the request conflicts with the current state of the resource.
    Conflict,
    /// 429: too many requests in a given amount of time.
    TooManyRequests,
}

impl ErrorKind {
    /// Every kind, in status code order.
    pub const ALL: [ErrorKind; 8] = [
        ErrorKind::BadRequest,
        ErrorKind::Unauthorized,
        ErrorKind::Forbidden,
        ErrorKind::NotFound,
        ErrorKind::MethodNotAllowed,
        ErrorKind::NotAcceptable,
        ErrorKind::Conflict,
        ErrorKind::TooManyRequests,
    ];

    /// Maps a status code to its error kind.
    ///
    /// Returns `None` for codes without a dedicated kind, including every
    /// 5xx. The decoder reports those as [`Error::UnclassifiedStatus`].
    pub fn classify(status: StatusCode) -> Option<Self> {
        match status.as_u16() {
            400 => Some(ErrorKind::BadRequest),
            401 => Some(ErrorKind::Unauthorized),
            403 => Some(ErrorKind::Forbidden),
            404 => Some(ErrorKind::NotFound),
            405 => Some(ErrorKind::MethodNotAllowed),
            406 => Some(ErrorKind::NotAcceptable),
            409 => Some(ErrorKind::Conflict),
            429 => Some(ErrorKind::TooManyRequests),
            _ => None,
        }
    }

    /// The status code this kind is keyed by.
    pub fn status_code(self) -> StatusCode {
        match self {
            ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
            ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorKind::Forbidden => StatusCode::FORBIDDEN,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ErrorKind::NotAcceptable => StatusCode::NOT_ACCEPTABLE,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
        }
    }

    /// A short, stable name for the kind.
    pub fn name(self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "BadRequest",
            ErrorKind::Unauthorized => "Unauthorized",
            ErrorKind::Forbidden => "Forbidden",
            ErrorKind::NotFound => "NotFound",
            ErrorKind::MethodNotAllowed => "MethodNotAllowed",
            ErrorKind::NotAcceptable => "NotAcceptable",
            ErrorKind::Conflict => "Conflict",
            ErrorKind::TooManyRequests => "TooManyRequests",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A classified error response from the API.
///
/// Built by the decoder whenever a response carries a status code that has an
/// [`ErrorKind`]. Immutable once constructed.
///
/// # Fields
///
/// * `kind` - The classified error kind
/// * `status` - The HTTP status code of the failed response
/// * `details` - The messages listed under the body's `detail` key
/// * `raw_response` - The raw response body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// The classified error kind.
    pub kind: ErrorKind,
    /// The HTTP status code.
    pub status: StatusCode,
    /// Human-readable messages from the body's `detail` field.
    pub details: Vec<String>,
    /// The raw response body.
    pub raw_response: String,
}

impl ApiError {
    /// Builds an error of the given kind from a failed response.
    ///
    /// The `detail` key is read from the body when it is JSON. A missing key
    /// or a body that is not JSON at all yields an empty `details` list, the
    /// raw body is kept either way.
    pub fn from_response(kind: ErrorKind, response: &RawResponse) -> Self {
        Self {
            kind,
            status: response.status,
            details: extract_details(&response.body),
            raw_response: response.body.clone(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.kind, self.status.as_u16())?;
        if !self.details.is_empty() {
            write!(f, ": {}", self.details.join("; "))?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {}

/// Reads `{"detail": [...]}` from an error body.
///
/// A bare string under `detail` counts as a single message.
fn extract_details(body: &str) -> Vec<String> {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return Vec::new();
    };

    match value.get("detail") {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(message) => message.clone(),
                other => other.to_string(),
            })
            .collect(),
        Some(Value::String(message)) => vec![message.clone()],
        _ => Vec::new(),
    }
}

/// The main error type for Azion API calls.
///
/// # Examples
///
/// ```no_run
/// use azion::{Client, Error, ErrorKind};
///
/// # async fn example() -> Result<(), Error> {
/// let client = Client::builder().token("my-token").build()?;
///
/// match client.get_configuration(1528252734).await {
///     Ok(configuration) => println!("Found: {:?}", configuration),
///     Err(Error::Api(err)) if err.kind == ErrorKind::NotFound => {
///         eprintln!("No such configuration: {:?}", err.details);
///     }
///     Err(e) => eprintln!("Other error: {}", e),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A network-level error occurred (connection failed, DNS lookup failed, etc.).
    ///
    /// No response was obtained at all.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The request timed out.
    #[error("Request timed out")]
    Timeout,

    /// The API answered with a status code that has an [`ErrorKind`].
    #[error("API error {0}")]
    Api(#[from] ApiError),

    /// The API answered with a status code >= 400 that has no [`ErrorKind`].
    #[error("HTTP error {status} without a known error kind: {raw_response}")]
    UnclassifiedStatus {
        /// The HTTP status code
        status: StatusCode,
        /// The raw response body
        raw_response: String,
    },

    /// A payload could not be turned into the expected shape.
    ///
    /// Raised for bodies that are not JSON, domain objects missing a required
    /// key, and multi-status items whose status line cannot be parsed.
    ///
    /// # Fields
    ///
    /// * `context` - What was being decoded (a type name, a status line, ...)
    /// * `message` - What went wrong
    #[error("Malformed payload ({context}): {message}")]
    MalformedPayload {
        /// What was being decoded
        context: String,
        /// Description of the failure
        message: String,
    },

    /// Invalid configuration was provided.
    ///
    /// This indicates a problem with how the client or request was configured,
    /// such as an invalid header value or a missing token.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Failed to serialize the request body.
    #[error("Failed to serialize request: {0}")]
    SerializationFailed(String),

    /// An invalid URL was provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl Error {
    pub(crate) fn malformed(context: impl Into<String>, message: impl fmt::Display) -> Self {
        Error::MalformedPayload {
            context: context.into(),
            message: message.to_string(),
        }
    }

    /// Returns the classified error kind, if this is an [`Error::Api`].
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Error::Api(err) => Some(err.kind),
            _ => None,
        }
    }

    /// Returns the HTTP status code if this error came from a response.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Api(err) => Some(err.status),
            Error::UnclassifiedStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns the `detail` messages of an API error, or an empty slice.
    pub fn details(&self) -> &[String] {
        match self {
            Error::Api(err) => &err.details,
            _ => &[],
        }
    }

    /// Returns the raw response body if this error has one.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            Error::Api(err) => Some(&err.raw_response),
            Error::UnclassifiedStatus { raw_response, .. } => Some(raw_response),
            _ => None,
        }
    }
}

/// A specialized `Result` type for Azion API calls.
pub type Result<T> = std::result::Result<T, Error>;
