//! Collaborator-authority seams.
//!
//! The competence service owns the foreign ids briefs reference; the learner
//! service knows which submissions reference a brief and which briefs are the
//! most used. Both are behind traits so the core can be exercised with
//! in-memory fakes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ServiceError;

/// A referencing submission as reported by the learner service. Only the
/// fields the guard and the boundary layer care about; unknown fields are
/// ignored.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SubmissionSummary {
    #[serde(default)]
    pub id: Option<Uuid>,
    #[serde(default)]
    pub learner_id: Option<Uuid>,
    #[serde(default)]
    pub status: Option<String>,
}

/// One entry of the externally computed popularity ranking.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PopularityEntry {
    pub brief_id: Uuid,
    pub submission_count: u64,
}

/// The reference authority for competence ids.
#[async_trait]
pub trait CompetenceAuthority: Send + Sync {
    /// `Ok(true)` when the authority confirmed the id, `Ok(false)` when it
    /// answered 404, `Err(CollaboratorUnavailable)` when the call itself
    /// failed. Callers need the distinction to decide fail-open vs
    /// fail-closed.
    async fn exists(&self, id: Uuid) -> Result<bool, ServiceError>;

    /// Full competence record, for hydrating reference details.
    async fn fetch(&self, id: Uuid) -> Result<serde_json::Value, ServiceError>;
}

/// The usage authority: learner-service submissions and popularity ranking.
#[async_trait]
pub trait UsageAuthority: Send + Sync {
    async fn submissions_for_brief(
        &self,
        brief_id: Uuid,
    ) -> Result<Vec<SubmissionSummary>, ServiceError>;

    /// Ranked list, most used first.
    async fn popular_briefs(&self) -> Result<Vec<PopularityEntry>, ServiceError>;
}
