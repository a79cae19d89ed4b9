use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use skybook_core::CoreError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    AuthenticationError(String),
    #[error("Authorization failed: {0}")]
    AuthorizationError(String),
    #[error("Malformed request body: {0}")]
    InvalidBody(#[from] JsonRejection),
    #[error("Malformed path: {0}")]
    InvalidPath(#[from] PathRejection),
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl AppError {
    fn status_and_message(self) -> (StatusCode, String) {
        match self {
            AppError::AuthenticationError(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::AuthorizationError(msg) => (StatusCode::FORBIDDEN, msg),
            err @ (AppError::InvalidBody(_) | AppError::InvalidPath(_)) => (StatusCode::BAD_REQUEST, err.to_string()),
            AppError::Core(err) => {
                let status = match &err {
                    CoreError::NotFound(_) | CoreError::RemoteNotFound { .. } => StatusCode::NOT_FOUND,
                    CoreError::Conflict(_) | CoreError::RemoteRejected { .. } => StatusCode::CONFLICT,
                    CoreError::InvalidState(_)
                    | CoreError::CapacityExceeded { .. }
                    | CoreError::Validation(_) => StatusCode::BAD_REQUEST,
                    CoreError::RemoteUnavailable { .. } => StatusCode::BAD_GATEWAY,
                    CoreError::Storage(msg) => {
                        tracing::error!("Internal Server Error: {}", msg);
                        return (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string());
                    }
                };
                (status, err.to_string())
            }
        }
    }

    /// Attach the request path the error body reports.
    pub fn at(self, path: &str) -> ApiError {
        ApiError { error: self, path: path.to_string() }
    }
}

/// Body of every error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub timestamp: DateTime<Utc>,
    pub message: String,
    pub path: String,
}

/// An `AppError` bound to the request it failed.
#[derive(Debug)]
pub struct ApiError {
    pub error: AppError,
    pub path: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.error.status_and_message();
        if status.is_client_error() {
            tracing::debug!("{} {}: {}", status, self.path, message);
        }

        let body = Json(ErrorBody {
            timestamp: Utc::now(),
            message,
            path: self.path,
        });

        (status, body).into_response()
    }
}

pub trait ResultExt<T> {
    fn at(self, uri: &Uri) -> Result<T, ApiError>;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: Into<AppError>,
{
    fn at(self, uri: &Uri) -> Result<T, ApiError> {
        self.map_err(|e| e.into().at(uri.path()))
    }
}
