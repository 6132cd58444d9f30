//! Turns raw responses into JSON payloads, booleans or typed errors.
//!
//! Both entry points take the response as an `Option`: `None` means no
//! response was obtained, which yields "no data" (`Ok(None)` / `Ok(false)`)
//! rather than an error. A status other than the expected one is accepted
//! as long as it is below 400.

use crate::error::{ApiError, Error, ErrorKind, Result};
use crate::response::RawResponse;
use http::StatusCode;
use serde_json::Value;

/// Validates the status of a response and returns its JSON body.
///
/// * no response: `Ok(None)`
/// * `expected` status: the parsed body, `None` when the body is empty
/// * status >= 400: the classified error, see [`error_for`]
/// * any other status: the parsed body, as if it had been `expected`
///
/// # Examples
///
/// ```
/// use azion::{decode, ErrorKind, RawResponse};
/// use http::StatusCode;
///
/// let ok = RawResponse::new(StatusCode::OK, r#"{"a": 1}"#);
/// assert_eq!(decode(Some(&ok), StatusCode::OK).unwrap(), Some(serde_json::json!({"a": 1})));
///
/// assert_eq!(decode(None, StatusCode::OK).unwrap(), None);
///
/// let missing = RawResponse::new(StatusCode::NOT_FOUND, r#"{"detail": ["Not found."]}"#);
/// let err = decode(Some(&missing), StatusCode::OK).unwrap_err();
/// assert_eq!(err.kind(), Some(ErrorKind::NotFound));
/// ```
pub fn decode(response: Option<&RawResponse>, expected: StatusCode) -> Result<Option<Value>> {
    let Some(response) = response else {
        tracing::debug!(expected = expected.as_u16(), "No response to decode");
        return Ok(None);
    };

    if response.status == expected {
        return response.json();
    }

    if is_error(response.status) {
        return Err(error_for(response));
    }

    tracing::debug!(
        status = response.status.as_u16(),
        expected = expected.as_u16(),
        "Unexpected non-error status, decoding body anyway"
    );
    response.json()
}

/// Validates the status of a response whose body is irrelevant.
///
/// Returns `true` iff the status equals `expected`, `false` when there is no
/// response or the status is some other non-error code.
///
/// # Errors
///
/// Fails with the classified error when the status is >= 400 and not the
/// expected one.
pub fn decode_boolean(response: Option<&RawResponse>, expected: StatusCode) -> Result<bool> {
    let Some(response) = response else {
        return Ok(false);
    };

    if response.status == expected {
        return Ok(true);
    }

    if is_error(response.status) {
        return Err(error_for(response));
    }

    Ok(false)
}

/// Builds the error for a failed response.
///
/// Codes with an [`ErrorKind`] become [`Error::Api`], every other code becomes
/// [`Error::UnclassifiedStatus`].
pub fn error_for(response: &RawResponse) -> Error {
    let status = response.status;

    if status.is_client_error() {
        tracing::error!(
            status = status.as_u16(),
            response = %response.body,
            "Client error (4xx)"
        );
    } else if status.is_server_error() {
        tracing::warn!(
            status = status.as_u16(),
            response = %response.body,
            "Server error (5xx)"
        );
    }

    match ErrorKind::classify(status) {
        Some(kind) => Error::Api(ApiError::from_response(kind, response)),
        None => Error::UnclassifiedStatus {
            status,
            raw_response: response.body.clone(),
        },
    }
}

fn is_error(status: StatusCode) -> bool {
    status.as_u16() >= 400
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_absent_response_is_no_data() {
        for expected in [StatusCode::OK, StatusCode::CREATED, StatusCode::NO_CONTENT] {
            assert_eq!(decode(None, expected).unwrap(), None);
            assert!(!decode_boolean(None, expected).unwrap());
        }
    }

    #[test]
    fn test_expected_status_returns_body() {
        let response = RawResponse::new(StatusCode::OK, r#"{"a":1}"#);
        assert_eq!(
            decode(Some(&response), StatusCode::OK).unwrap(),
            Some(json!({"a": 1}))
        );
    }

    #[test]
    fn test_expected_status_with_empty_body() {
        let response = RawResponse::new(StatusCode::NO_CONTENT, "");
        assert_eq!(decode(Some(&response), StatusCode::NO_CONTENT).unwrap(), None);
    }

    #[test]
    fn test_not_found_carries_details() {
        let response = RawResponse::new(
            StatusCode::NOT_FOUND,
            r#"{"detail": ["Configuration not found", "Check the id"]}"#,
        );

        match decode(Some(&response), StatusCode::OK) {
            Err(Error::Api(err)) => {
                assert_eq!(err.kind, ErrorKind::NotFound);
                assert_eq!(err.status, StatusCode::NOT_FOUND);
                assert_eq!(
                    err.details,
                    vec!["Configuration not found".to_string(), "Check the id".to_string()]
                );
            }
            other => panic!("Expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_each_classified_status_is_raised() {
        for kind in ErrorKind::ALL {
            let response = RawResponse::new(kind.status_code(), "{}");
            let err = decode(Some(&response), StatusCode::OK).unwrap_err();
            assert_eq!(err.kind(), Some(kind));
        }
    }

    #[test]
    fn test_unclassified_error_status() {
        let response = RawResponse::new(StatusCode::INTERNAL_SERVER_ERROR, "boom");

        match decode(Some(&response), StatusCode::OK) {
            Err(Error::UnclassifiedStatus { status, raw_response }) => {
                assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
                assert_eq!(raw_response, "boom");
            }
            other => panic!("Expected UnclassifiedStatus, got {:?}", other),
        }
    }

    #[test]
    fn test_unexpected_success_status_is_permissive() {
        let response = RawResponse::new(StatusCode::ACCEPTED, r#"{"queued": true}"#);
        assert_eq!(
            decode(Some(&response), StatusCode::OK).unwrap(),
            Some(json!({"queued": true}))
        );
    }

    #[test]
    fn test_expected_error_status_is_not_raised() {
        let response = RawResponse::new(StatusCode::CONFLICT, r#"{"detail": []}"#);
        assert_eq!(
            decode(Some(&response), StatusCode::CONFLICT).unwrap(),
            Some(json!({"detail": []}))
        );
        assert!(decode_boolean(Some(&response), StatusCode::CONFLICT).unwrap());
    }

    #[test]
    fn test_decode_boolean() {
        let deleted = RawResponse::new(StatusCode::NO_CONTENT, "");
        assert!(decode_boolean(Some(&deleted), StatusCode::NO_CONTENT).unwrap());

        let accepted = RawResponse::new(StatusCode::OK, "{}");
        assert!(!decode_boolean(Some(&accepted), StatusCode::NO_CONTENT).unwrap());

        let unauthorized = RawResponse::new(StatusCode::UNAUTHORIZED, r#"{"detail": ["Invalid token."]}"#);
        let err = decode_boolean(Some(&unauthorized), StatusCode::NO_CONTENT).unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::Unauthorized));
        assert_eq!(err.details(), &["Invalid token.".to_string()]);
    }

    #[test]
    fn test_non_json_success_body_is_malformed() {
        let response = RawResponse::new(StatusCode::OK, "<html></html>");
        assert!(matches!(
            decode(Some(&response), StatusCode::OK),
            Err(Error::MalformedPayload { .. })
        ));
    }
}
