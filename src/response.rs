//! The raw response handle consumed by the decoder.
//!
//! A [`RawResponse`] is a fully materialized HTTP response: status, headers
//! and body text. The client builds one from every `reqwest` response, tests
//! and other transports can build one directly from parts.

use crate::{Error, Result};
use http::{HeaderMap, StatusCode};
use serde_json::Value;
use std::time::Duration;

/// A materialized HTTP response.
///
/// # Examples
///
/// ```
/// use azion::RawResponse;
/// use http::StatusCode;
///
/// let response = RawResponse::new(StatusCode::OK, r#"{"a": 1}"#);
/// assert_eq!(response.json().unwrap(), Some(serde_json::json!({"a": 1})));
///
/// let empty = RawResponse::new(StatusCode::NO_CONTENT, "");
/// assert_eq!(empty.json().unwrap(), None);
/// ```
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// The HTTP status code of the response.
    pub status: StatusCode,

    /// The response headers.
    pub headers: HeaderMap,

    /// The raw response body as a string.
    pub body: String,

    /// Time from sending the request until the body was read.
    pub latency: Duration,
}

impl RawResponse {
    /// Creates a response from a status and a body, with no headers.
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
            latency: Duration::ZERO,
        }
    }

    /// Replaces the headers of this response.
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Reads a `reqwest` response to the end.
    pub(crate) async fn from_reqwest(response: reqwest::Response, latency: Duration) -> Result<Self> {
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await.map_err(transport_error)?;

        Ok(Self {
            status,
            headers,
            body,
            latency,
        })
    }

    /// Parses the body as JSON.
    ///
    /// An empty (or whitespace-only) body yields `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedPayload`] when the body is not valid JSON,
    /// for example an HTML error page served by a proxy.
    pub fn json(&self) -> Result<Option<Value>> {
        if self.body.trim().is_empty() {
            return Ok(None);
        }

        serde_json::from_str(&self.body).map(Some).map_err(|e| {
            tracing::error!(
                error = %e,
                status = self.status.as_u16(),
                raw_response = %self.body,
                "Response body is not JSON"
            );
            Error::malformed(format!("response body (status {})", self.status.as_u16()), e)
        })
    }

    /// Returns a header value by name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }
}

/// Classifies a transport failure, whether it happened while sending the
/// request or while reading the body.
pub(crate) fn transport_error(error: reqwest::Error) -> Error {
    if error.is_timeout() {
        tracing::warn!(error = %error, "Request timed out");
        Error::Timeout
    } else {
        tracing::warn!(error = %error, "Request failed before the response was complete");
        Error::Network(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    #[test]
    fn test_whitespace_body_is_empty() {
        let response = RawResponse::new(StatusCode::OK, "  \n");
        assert_eq!(response.json().unwrap(), None);
    }

    #[test]
    fn test_invalid_json_is_malformed() {
        let response = RawResponse::new(StatusCode::OK, "<html>oops</html>");
        match response.json() {
            Err(Error::MalformedPayload { context, .. }) => {
                assert!(context.contains("200"));
            }
            other => panic!("Expected MalformedPayload, got {:?}", other),
        }
    }

    #[test]
    fn test_header_lookup() {
        let mut headers = HeaderMap::new();
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let response = RawResponse::new(StatusCode::OK, "{}").with_headers(headers);
        assert_eq!(response.header("content-type"), Some("application/json"));
        assert_eq!(response.header("x-missing"), None);
    }
}
