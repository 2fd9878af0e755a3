//! Error type shared by handlers, workflows and the GitHub client.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde::Serialize;
use thiserror::Error;

use crate::validation::FieldError;

/// Main error type for repodesk operations.
#[derive(Error, Debug)]
pub enum RepodeskError {
    // Request errors
    #[error("Invalid input")]
    Validation(Vec<FieldError>),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthenticated(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    // Upstream (GitHub) errors, status is passed through to the caller
    #[error("{message}")]
    Upstream { status: u16, message: String },

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Network errors
    #[error("Network request failed: {0}")]
    NetworkError(String),

    #[error("JSON parse error: {0}")]
    JsonParseError(#[from] serde_json::Error),

    #[error("Base64 decode error: {0}")]
    Base64DecodeError(#[from] base64::DecodeError),

    #[error("URL parse error: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("TOML parse error: {0}")]
    TomlParseError(#[from] toml::de::Error),

    // Generic wrapper for other errors
    #[error(transparent)]
    Other(#[from] color_eyre::Report),
}

/// Result type alias using RepodeskError
pub type Result<T> = std::result::Result<T, RepodeskError>;

impl RepodeskError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn unauthenticated(msg: impl Into<String>) -> Self {
        Self::Unauthenticated(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn upstream(status: u16, msg: impl Into<String>) -> Self {
        Self::Upstream {
            status,
            message: msg.into(),
        }
    }

    /// Single-field validation failure.
    pub fn invalid_field(
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Validation(vec![FieldError::new(field, message)])
    }

    /// Status reported by GitHub, if this error came from an upstream call.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            Self::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'a [FieldError]>,
}

impl ResponseError for RepodeskError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Upstream { status, .. } => StatusCode::from_u16(*status)
                .unwrap_or(StatusCode::BAD_GATEWAY),
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let details = match self {
            Self::Validation(errors) => Some(errors.as_slice()),
            _ => None,
        };

        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.to_string(),
            details,
        })
    }
}

// Implement From for std::io::Error - wraps in Other variant for generic I/O errors
impl From<std::io::Error> for RepodeskError {
    fn from(err: std::io::Error) -> Self {
        Self::Other(color_eyre::Report::from(err))
    }
}

// Status errors are produced by the GitHub client itself, so anything reqwest
// reports here is transport level.
impl From<reqwest::Error> for RepodeskError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            Self::Upstream {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            Self::NetworkError(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::MessageBody;

    #[test]
    fn test_error_display_formats() {
        let err = RepodeskError::forbidden("not yours");
        assert_eq!(err.to_string(), "not yours");

        let err = RepodeskError::upstream(422, "Validation Failed");
        assert_eq!(err.to_string(), "Validation Failed");

        let err = RepodeskError::InvalidConfig("missing port".into());
        assert_eq!(err.to_string(), "Invalid configuration: missing port");
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            RepodeskError::invalid_field("path", "required").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            RepodeskError::unauthenticated("no session").status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            RepodeskError::forbidden("nope").status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            RepodeskError::upstream(409, "conflict").status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            RepodeskError::NetworkError("reset".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_upstream_status() {
        assert_eq!(
            RepodeskError::upstream(404, "Not Found").upstream_status(),
            Some(404)
        );
        assert_eq!(RepodeskError::forbidden("x").upstream_status(), None);
    }

    #[test]
    fn test_validation_response_carries_details() {
        let err = RepodeskError::invalid_field("path", "must not be empty");
        let body = err.error_response().into_body().try_into_bytes().unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(json["error"], "Invalid input");
        assert_eq!(json["details"][0]["field"], "path");
        assert_eq!(json["details"][0]["message"], "must not be empty");
    }

    #[test]
    fn test_non_validation_response_has_no_details() {
        let err = RepodeskError::forbidden("You do not own this repository");
        let body = err.error_response().into_body().try_into_bytes().unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(json["error"], "You do not own this repository");
        assert!(json.get("details").is_none());
    }
}
