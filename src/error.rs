use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::{auth::AuthError, repository::RepositoryError};

/// ErrorEnvelope
///
/// The uniform failure body: `{"success": false, "error": <status>, "message": <text>}`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub error: u16,
    pub message: String,
}

/// ApiError
///
/// The HTTP-facing failure taxonomy. Handlers collapse persistence and parsing faults into
/// the class that fits their operation; authorization failures keep their fine-grained
/// variant inside `Auth` until the response is rendered.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("bad request")]
    BadRequest,
    #[error("resource not found")]
    NotFound,
    #[error("method not allowed")]
    MethodNotAllowed,
    #[error("unprocessable")]
    Unprocessable,
    #[error("internal server error")]
    ServerFault,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Auth(e) => e.status(),
            ApiError::BadRequest => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Unprocessable => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::ServerFault => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-visible message. Key-set faults are reported generically.
    fn message(&self) -> String {
        match self {
            ApiError::Auth(e @ AuthError::KeySetUnavailable(_)) => {
                tracing::error!(code = e.code(), "{}", e);
                ApiError::ServerFault.to_string()
            }
            other => other.to_string(),
        }
    }
}

/// Persistence faults reaching a handler boundary without a more specific mapping.
impl From<RepositoryError> for ApiError {
    fn from(e: RepositoryError) -> Self {
        tracing::error!("repository error: {:?}", e);
        ApiError::BadRequest
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorEnvelope {
            success: false,
            error: status.as_u16(),
            message: self.message(),
        };
        (status, Json(body)).into_response()
    }
}

/// Router fallback for paths that match no route.
pub async fn not_found() -> ApiError {
    ApiError::NotFound
}

/// Router fallback for known paths hit with an unsupported verb.
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}
