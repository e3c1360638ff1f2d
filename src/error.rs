/// Unified error types for the gateway
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for the gateway
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Upload request carried no file field
    #[error("No file provided")]
    MissingFile,

    /// Malformed multipart payload
    #[error("Invalid upload: {0}")]
    InvalidUpload(String),

    /// Upload body exceeded the configured ceiling
    #[error("File exceeds upload limit of {limit} bytes")]
    PayloadTooLarge { limit: usize },

    /// The store does not know the identifier
    #[error("Content not found: {0}")]
    NotFound(String),

    /// The store could not be reached
    #[error("Content store unavailable: {0}")]
    StoreUnavailable(String),

    /// The store answered with a non-success status
    #[error("Content store rejected the request: {0}")]
    StoreRejected(String),

    /// The store did not answer within the configured bound
    #[error("Content store timed out after {0} seconds")]
    Timeout(u64),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal server errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Wire format for error responses
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Convert GatewayError to HTTP response
impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            GatewayError::MissingFile => (
                StatusCode::BAD_REQUEST,
                "No file provided".to_string(),
                None,
            ),
            GatewayError::InvalidUpload(msg) => (
                StatusCode::BAD_REQUEST,
                "Invalid upload".to_string(),
                Some(msg.clone()),
            ),
            GatewayError::PayloadTooLarge { .. } => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "File too large".to_string(),
                Some(self.to_string()),
            ),
            GatewayError::NotFound(content_id) => (
                StatusCode::NOT_FOUND,
                "Content not found".to_string(),
                Some(content_id.clone()),
            ),
            GatewayError::StoreUnavailable(msg) => (
                StatusCode::BAD_GATEWAY,
                "Content store unavailable".to_string(),
                Some(msg.clone()),
            ),
            GatewayError::StoreRejected(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Content store rejected the request".to_string(),
                Some(msg.clone()),
            ),
            GatewayError::Timeout(secs) => (
                StatusCode::GATEWAY_TIMEOUT,
                "Content store timed out".to_string(),
                Some(format!("no response within {} seconds", secs)),
            ),
            GatewayError::Config(_) | GatewayError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
                None, // Don't leak details
            ),
        };

        let body = Json(ErrorResponse { error, details });

        (status, body).into_response()
    }
}

/// Result type alias for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: GatewayError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_client_errors_map_to_4xx() {
        assert_eq!(status_of(GatewayError::MissingFile), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_of(GatewayError::InvalidUpload("two file fields".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(GatewayError::PayloadTooLarge { limit: 1024 }),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            status_of(GatewayError::NotFound("QmMissing".into())),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_store_errors_map_to_5xx() {
        assert_eq!(
            status_of(GatewayError::StoreUnavailable("connection refused".into())),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_of(GatewayError::StoreRejected("boom".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(status_of(GatewayError::Timeout(30)), StatusCode::GATEWAY_TIMEOUT);
    }

    #[test]
    fn test_internal_errors_are_opaque() {
        assert_eq!(
            status_of(GatewayError::Internal("/secret/path exploded".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(GatewayError::Config("bad port".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_response_omits_empty_details() {
        let json = serde_json::to_string(&ErrorResponse {
            error: "No file provided".to_string(),
            details: None,
        })
        .unwrap();
        assert_eq!(json, r#"{"error":"No file provided"}"#);

        let json = serde_json::to_string(&ErrorResponse {
            error: "Content not found".to_string(),
            details: Some("QmMissing".to_string()),
        })
        .unwrap();
        assert!(json.contains("QmMissing"));
    }
}
