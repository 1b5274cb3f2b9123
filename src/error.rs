// Error taxonomy for the credential codec and the API client
use reqwest::StatusCode;
use serde_json::{json, Value};
use thiserror::Error;

/// Why a credential could not be accepted
///
/// The gate never surfaces these to users: every variant is handled as an
/// expired session.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CredentialError {
    #[error("credential must have three dot-separated segments, found {0}")]
    SegmentCount(usize),

    #[error("credential payload is not valid base64url: {0}")]
    Encoding(String),

    #[error("credential payload is not a JSON object: {0}")]
    Payload(String),

    #[error("credential payload has no numeric exp claim")]
    MissingExpiry,

    #[error("credential signature rejected: {0}")]
    Signature(String),
}

/// Failure of a call made through the API client
#[derive(Debug, Error)]
pub enum ClientError {
    /// Backend answered with a non-success status
    #[error("backend responded with {status}: {message}")]
    Status {
        status: StatusCode,
        message: String,
        body: Option<Value>,
    },

    #[error("request timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("request cancelled by caller")]
    Cancelled,

    #[error("invalid request path '{0}'")]
    InvalidPath(String),

    #[error("invalid API base URL '{0}'")]
    InvalidBaseUrl(String),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ClientError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            ClientError::Transport(err) => err.status(),
            _ => None,
        }
    }

    /// True for the one status the client treats as a session-level event
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ClientError::Status { status, .. } if *status == StatusCode::UNAUTHORIZED => "UNAUTHORIZED",
            ClientError::Status { status, .. } if *status == StatusCode::FORBIDDEN => "FORBIDDEN",
            ClientError::Status { status, .. } if *status == StatusCode::NOT_FOUND => "NOT_FOUND",
            ClientError::Status { status, .. } if status.is_client_error() => "BAD_REQUEST",
            ClientError::Status { .. } => "BACKEND_ERROR",
            ClientError::Timeout(_) => "TIMEOUT",
            ClientError::Cancelled => "CANCELLED",
            ClientError::InvalidPath(_) => "INVALID_PATH",
            ClientError::InvalidBaseUrl(_) => "INVALID_BASE_URL",
            ClientError::Transport(_) => "TRANSPORT_ERROR",
        }
    }

    /// Convert to JSON body for CLI output
    pub fn to_json(&self) -> Value {
        let mut response = json!({
            "success": false,
            "error": self.to_string(),
            "error_code": self.error_code(),
        });

        if let ClientError::Status { status, body, .. } = self {
            response["status"] = json!(status.as_u16());
            if let Some(body) = body {
                response["body"] = body.clone();
            }
        }

        response
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn status_error(code: u16) -> ClientError {
        ClientError::Status {
            status: StatusCode::from_u16(code).unwrap(),
            message: "boom".to_string(),
            body: None,
        }
    }

    #[test]
    fn only_401_is_unauthorized() {
        assert!(status_error(401).is_unauthorized());
        assert!(!status_error(403).is_unauthorized());
        assert!(!status_error(500).is_unauthorized());
        assert!(!ClientError::Cancelled.is_unauthorized());
    }

    #[test]
    fn error_codes_follow_status() {
        assert_eq!(status_error(401).error_code(), "UNAUTHORIZED");
        assert_eq!(status_error(404).error_code(), "NOT_FOUND");
        assert_eq!(status_error(422).error_code(), "BAD_REQUEST");
        assert_eq!(status_error(502).error_code(), "BACKEND_ERROR");
        assert_eq!(ClientError::Timeout(std::time::Duration::from_secs(1)).error_code(), "TIMEOUT");
    }

    #[test]
    fn json_includes_status_and_body() {
        let err = ClientError::Status {
            status: StatusCode::BAD_REQUEST,
            message: "invalid plan".to_string(),
            body: Some(json!({"message": "invalid plan"})),
        };
        let value = err.to_json();
        assert_eq!(value["success"], false);
        assert_eq!(value["status"], 400);
        assert_eq!(value["body"]["message"], "invalid plan");
    }
}
