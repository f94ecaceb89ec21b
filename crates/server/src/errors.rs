use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use service::errors::ServiceError;
use tracing::error;

/// JSON API error: status code plus a short title and optional detail.
#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub title: &'static str,
    pub detail: Option<String>,
}

impl JsonApiError {
    pub fn new(status: StatusCode, title: &'static str, detail: Option<String>) -> Self {
        Self { status, title, detail }
    }

    /// Map service-layer error kinds onto HTTP statuses. Write-time
    /// collaborator failures surface as 400 (fail-closed); a usage-guard veto
    /// is a 409.
    pub fn from_service(e: ServiceError) -> Self {
        let detail = Some(e.to_string());
        match e {
            ServiceError::Validation(_) => Self::new(StatusCode::BAD_REQUEST, "Validation Error", detail),
            ServiceError::ReferenceNotFound(_) => {
                Self::new(StatusCode::BAD_REQUEST, "Reference Not Found", detail)
            }
            ServiceError::CollaboratorUnavailable { .. } => {
                Self::new(StatusCode::BAD_REQUEST, "Collaborator Unavailable", detail)
            }
            ServiceError::InvalidStatus { .. } => {
                Self::new(StatusCode::BAD_REQUEST, "Invalid Status Transition", detail)
            }
            ServiceError::NotFound(_) => Self::new(StatusCode::NOT_FOUND, "Not Found", detail),
            ServiceError::DeletionBlocked(_) => {
                Self::new(StatusCode::CONFLICT, "Deletion Blocked", detail)
            }
            ServiceError::Store(_) => {
                error!(error = %e, "store failure");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error", detail)
            }
        }
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "error": {
                "title": self.title,
                "detail": self.detail,
            }
        });
        (self.status, Json(body)).into_response()
    }
}
