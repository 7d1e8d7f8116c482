use hyper::StatusCode;
use std::time::Duration;
use thiserror::Error;

use crate::token::TokenError;

/// Errors returned by IoT Hub service operations
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IoTHubError {
    /// The request could not be delivered or the response could not be read
    #[error("transport error: {0}")]
    Http(#[from] hyper::Error),
    /// The HTTP request could not be constructed
    #[error("invalid request: {0}")]
    Request(#[from] hyper::http::Error),
    /// No response arrived within the configured request timeout
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    /// A request body could not be serialized or a response body deserialized
    #[error("failed to (de)serialize payload: {0}")]
    Serialization(#[from] serde_json::Error),
    /// Generating the shared access signature failed
    #[error(transparent)]
    Token(#[from] TokenError),
    /// The ETag sent in `If-Match` no longer matches the resource on the hub
    #[error("precondition failed: {body}")]
    PreconditionFailed {
        /// Error payload returned by the hub
        body: String,
    },
    /// The hub answered with a non-success status
    #[error("IoT Hub returned {status}: {body}")]
    Api {
        /// HTTP status of the response
        status: StatusCode,
        /// Raw response body, usually a JSON error document
        body: String,
    },
    /// The runtime driving blocking iteration could not be started
    #[error("failed to start runtime for blocking iteration: {0}")]
    Runtime(#[source] std::io::Error),
    /// A field required to address the resource was not set
    #[error("{0} must be set")]
    MissingField(&'static str),
}

impl IoTHubError {
    /// Whether this error signals an `If-Match` precondition failure.
    ///
    /// Callers typically refetch the resource to get a fresh ETag and retry.
    pub fn is_precondition_failed(&self) -> bool {
        matches!(self, IoTHubError::PreconditionFailed { .. })
    }

    /// HTTP status carried by the error, if the hub produced one
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            IoTHubError::PreconditionFailed { .. } => Some(StatusCode::PRECONDITION_FAILED),
            IoTHubError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precondition_failed_is_recognisable() {
        let err = IoTHubError::PreconditionFailed {
            body: r#"{"Message":"ErrorCode:PreconditionFailed"}"#.to_string(),
        };
        assert!(err.is_precondition_failed());
        assert_eq!(err.status(), Some(StatusCode::PRECONDITION_FAILED));
    }

    #[test]
    fn api_error_displays_status_and_body() {
        let err = IoTHubError::Api {
            status: StatusCode::NOT_FOUND,
            body: "DeviceNotFound".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("404"));
        assert!(msg.contains("DeviceNotFound"));
        assert!(!err.is_precondition_failed());
    }

    #[test]
    fn missing_field_names_the_field() {
        let err = IoTHubError::MissingField("deviceId");
        assert_eq!(err.to_string(), "deviceId must be set");
        assert_eq!(err.status(), None);
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<IoTHubError>();
    }
}
