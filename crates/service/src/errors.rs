use models::{errors::ModelError, BriefStatus};
use thiserror::Error;
use uuid::Uuid;

/// Error kinds surfaced by the service layer.
///
/// `ReferenceNotFound` and `CollaboratorUnavailable` are kept distinct on
/// purpose: the first means the authority answered and the id does not exist,
/// the second that the authority could not be reached. Write paths treat both
/// as fatal; the usage guard and the popularity resolver treat
/// `CollaboratorUnavailable` as a soft signal instead.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("competence {0} does not exist at the competence authority")]
    ReferenceNotFound(Uuid),
    #[error("collaborator {authority} unavailable: {reason}")]
    CollaboratorUnavailable { authority: &'static str, reason: String },
    #[error("deletion blocked: {0}")]
    DeletionBlocked(String),
    #[error("invalid status transition: {from} -> {to}")]
    InvalidStatus { from: BriefStatus, to: BriefStatus },
    #[error("store error: {0}")]
    Store(String),
}

impl ServiceError {
    pub fn not_found(entity: &str) -> Self {
        Self::NotFound(format!("{} not found", entity))
    }

    pub fn unavailable(authority: &'static str, reason: impl ToString) -> Self {
        Self::CollaboratorUnavailable { authority, reason: reason.to_string() }
    }
}

impl From<ModelError> for ServiceError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::Validation(msg) => ServiceError::Validation(msg),
        }
    }
}
