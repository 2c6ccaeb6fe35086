//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use workflows::WorkflowError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Bad request from the client.
    BadRequest(String),
    /// The acting user could not be identified.
    Unauthorized(String),
    /// Workflow failure.
    Workflow(WorkflowError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Workflow(err) => workflow_status(err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::BadRequest(msg) | ApiError::Unauthorized(msg) => msg,
            ApiError::Workflow(err) => {
                if status.is_server_error() {
                    tracing::error!(error = %err, "workflow failed");
                }
                err.to_string()
            }
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn workflow_status(err: &WorkflowError) -> StatusCode {
    match err {
        WorkflowError::NotFound { .. } => StatusCode::NOT_FOUND,
        WorkflowError::Validation(_)
        | WorkflowError::InsufficientInventory { .. }
        | WorkflowError::AlreadyFollowing { .. }
        | WorkflowError::NotFollowing { .. } => StatusCode::BAD_REQUEST,
        WorkflowError::Forbidden(_) => StatusCode::FORBIDDEN,
        WorkflowError::Conflict { .. }
        | WorkflowError::ConcurrentUpdateConflict { .. }
        | WorkflowError::PaymentAssociationFailed { .. } => StatusCode::CONFLICT,
        WorkflowError::PaymentGateway(_) => StatusCode::BAD_GATEWAY,
        WorkflowError::CascadeFailed { .. } | WorkflowError::Store(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl From<WorkflowError> for ApiError {
    fn from(err: WorkflowError) -> Self {
        ApiError::Workflow(err)
    }
}
