//! Error mapping helpers for the `reqwest` gateway.

use http::StatusCode;

use crate::api::error::FeedError;

/// Checks if a status indicates an authentication failure.
pub(super) const fn is_auth_failure(status: StatusCode) -> bool {
    matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
}

pub(super) fn map_transport_error(operation: &str, error: &reqwest::Error) -> FeedError {
    if error.is_timeout() {
        return FeedError::Timeout {
            message: format!("{operation} failed: {error}"),
        };
    }

    if error.is_decode() {
        return FeedError::Decode {
            message: format!("{operation} failed: {error}"),
        };
    }

    FeedError::Network {
        message: format!("{operation} failed: {error}"),
    }
}

pub(super) fn map_http_error(
    operation: &str,
    status: StatusCode,
    maybe_message: Option<String>,
) -> FeedError {
    let message = maybe_message.unwrap_or_else(|| "unknown error".to_owned());
    if is_auth_failure(status) {
        FeedError::Authentication {
            message: format!("{operation} failed: server returned {status} {message}"),
        }
    } else {
        FeedError::Api {
            status: status.as_u16(),
            message: format!("{operation} failed: {message}"),
        }
    }
}

pub(super) fn map_decode_error(operation: &str, error: &serde_json::Error) -> FeedError {
    FeedError::Decode {
        message: format!("{operation}: {error}"),
    }
}

/// Pulls the `message` field out of a JSON error body.
pub(super) fn extract_api_message(body: &str) -> Option<String> {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        let trimmed = body.trim();
        return (!trimmed.is_empty()).then(|| trimmed.to_owned());
    };
    value
        .get("message")
        .and_then(serde_json::Value::as_str)
        .map(ToOwned::to_owned)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(StatusCode::UNAUTHORIZED, true)]
    #[case(StatusCode::FORBIDDEN, true)]
    #[case(StatusCode::NOT_FOUND, false)]
    #[case(StatusCode::INTERNAL_SERVER_ERROR, false)]
    fn auth_failures_are_recognised(#[case] status: StatusCode, #[case] expected: bool) {
        assert_eq!(is_auth_failure(status), expected);
    }

    #[test]
    fn http_errors_keep_the_status() {
        let error = map_http_error(
            "load page",
            StatusCode::SERVICE_UNAVAILABLE,
            Some("maintenance".to_owned()),
        );

        assert_eq!(
            error,
            FeedError::Api {
                status: 503,
                message: "load page failed: maintenance".to_owned(),
            }
        );
    }

    #[rstest]
    #[case(r#"{"message":"not yours"}"#, Some("not yours"))]
    #[case(r#"{"error":"x"}"#, None)]
    #[case("plain text", Some("plain text"))]
    #[case("   ", None)]
    fn api_message_extraction(#[case] body: &str, #[case] expected: Option<&str>) {
        assert_eq!(extract_api_message(body).as_deref(), expected);
    }
}
