use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;
use tracing::error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Bad call arguments, raised before any network call.
    ValidationError(String),
    /// The backend could not be reached.
    Network(String),
    /// The backend answered with a non-success status.
    Remote { status: u16, message: String },
    /// The backend answered with a body we could not understand.
    MalformedResponse(String),
    /// A backend failure recorded earlier, passed on to the view as-is.
    Upstream(String),
    NotFound,
    InternalError(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::ValidationError(msg) => write!(f, "validation error: {}", msg),
            ApiError::Network(msg) => write!(f, "network error: {}", msg),
            ApiError::Remote { status, message } => {
                write!(f, "backend returned {}: {}", status, message)
            }
            ApiError::MalformedResponse(msg) => write!(f, "malformed response: {}", msg),
            ApiError::Upstream(msg) => write!(f, "{}", msg),
            ApiError::NotFound => write!(f, "not found"),
            ApiError::InternalError(msg) => write!(f, "internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    /// Rejects empty or blank ids before they reach a URL.
    pub fn require_id(name: &str, value: &str) -> Result<(), ApiError> {
        if value.trim().is_empty() {
            return Err(ApiError::ValidationError(format!("{} is required", name)));
        }
        Ok(())
    }
}

/// Convert errors into gateway responses
///
/// Remote failures surface as 502 so the view layer can tell them apart from
/// its own bad requests.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound => (StatusCode::NOT_FOUND, "Not Found".to_string()),
            ApiError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Upstream(msg) => (StatusCode::BAD_GATEWAY, msg),
            ApiError::Network(_) | ApiError::Remote { .. } | ApiError::MalformedResponse(_) => {
                (StatusCode::BAD_GATEWAY, self.to_string())
            }
            ApiError::InternalError(msg) => {
                error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (
            status,
            Json(serde_json::json!({
              "error": message
            })),
        )
            .into_response()
    }
}
