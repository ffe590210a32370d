use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use service::ServiceError;
use thiserror::Error;
use tracing::warn;

/// Client-facing failures. Each one is answered locally with a status code
/// and a `{"error": ...}` body; none of them stops the server.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Body is not JSON of the record shape; carries the decode error.
    #[error("Bad request: invalid JSON")]
    InvalidPayload(String),
    /// Path segment is not an integer; carries the raw segment.
    #[error("Invalid item ID")]
    InvalidIdentifier(String),
    #[error("Error: ID {0} already in use")]
    Conflict(i64),
    #[error("Item not found")]
    NotFound(i64),
    #[error("Route not found")]
    RouteNotFound(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidPayload(_) | Self::InvalidIdentifier(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::NotFound(_) | Self::RouteNotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    fn log(&self) {
        match self {
            Self::InvalidPayload(err) => warn!(error = %err, "decoding request body failed"),
            Self::InvalidIdentifier(raw) => warn!(raw_id = %raw, "item id is not an integer"),
            Self::Conflict(id) => warn!(id, "attempted to create item with duplicate id"),
            Self::NotFound(id) => warn!(id, "item not found"),
            Self::RouteNotFound(path) => warn!(%path, "no route matched"),
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::Conflict(id) => Self::Conflict(id),
            ServiceError::NotFound(id) => Self::NotFound(id),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.log();
        let status = self.status();
        (status, Json(serde_json::json!({"error": self.to_string()}))).into_response()
    }
}
