//! Brief service orchestration.
//!
//! Composes the reference verifier, the usage guard, the pagination engine,
//! the aggregation engine and the popularity resolver into the operations the
//! boundary layer exposes. Every remote check runs before the local write it
//! gates; verify-then-write is best-effort, not transactional.

use std::sync::Arc;

use models::{brief::dedup_references, Brief, BriefInput, BriefPatch, BriefStatus};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::authority::{CompetenceAuthority, UsageAuthority};
use crate::errors::ServiceError;
use crate::pagination::{BriefFilter, PageInfo, PageRequest, PageResult};
use crate::popular::{PopularityResolver, RankedBrief};
use crate::stats::{self, StatsSummary};
use crate::storage::BriefStore;
use crate::usage_guard::UsageGuard;
use crate::verify::ReferenceVerifier;

/// Availability of a brief for a learner: published briefs only.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Availability {
    pub brief_id: Uuid,
    pub available: bool,
    pub status: BriefStatus,
}

/// Hydrated competence details for one brief.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CompetenceDetails {
    pub brief_id: Uuid,
    pub title: String,
    pub competences: Vec<serde_json::Value>,
}

pub struct BriefService {
    store: Arc<BriefStore>,
    competences: Arc<dyn CompetenceAuthority>,
    verifier: ReferenceVerifier,
    guard: UsageGuard,
    resolver: PopularityResolver,
}

impl BriefService {
    pub fn new(
        store: Arc<BriefStore>,
        competences: Arc<dyn CompetenceAuthority>,
        usage: Arc<dyn UsageAuthority>,
    ) -> Self {
        Self {
            verifier: ReferenceVerifier::new(Arc::clone(&competences)),
            guard: UsageGuard::new(Arc::clone(&usage)),
            resolver: PopularityResolver::new(Arc::clone(&store), usage),
            store,
            competences,
        }
    }

    /// Create a brief. Competence references are verified before anything is
    /// persisted; on verification failure nothing is written.
    pub async fn create(&self, input: BriefInput) -> Result<Brief, ServiceError> {
        input.validate()?;
        self.verifier.verify(&input.competences).await?;
        let brief = Brief::from_input(input);
        self.store.insert(brief.clone()).await?;
        info!(id = %brief.id, title = %brief.title, "brief created");
        Ok(brief)
    }

    pub async fn get(&self, id: Uuid) -> Result<Brief, ServiceError> {
        self.store.get(id).await.ok_or_else(|| ServiceError::not_found("brief"))
    }

    /// Paginated listing; `total` and `pages` reflect the same filter as the
    /// slice.
    pub async fn list(
        &self,
        filter: BriefFilter,
        page: PageRequest,
    ) -> Result<PageResult<Brief>, ServiceError> {
        let (page, per_page) = page.normalize();
        // saturate: callers may request an arbitrarily large page number
        let offset = page.saturating_sub(1).saturating_mul(per_page);
        let (data, total) = self.store.select_page(&filter, offset, per_page).await;
        Ok(PageResult {
            data,
            pagination: PageInfo {
                page,
                per_page,
                total,
                pages: PageRequest::pages_for(total, per_page),
            },
        })
    }

    /// Partial update. Competence ids carried by the patch are verified
    /// before the merge; a status change must follow the state machine.
    pub async fn update(&self, id: Uuid, patch: BriefPatch) -> Result<Brief, ServiceError> {
        if patch.is_empty() {
            return Err(ServiceError::Validation("update requires at least one field".into()));
        }
        patch.validate()?;
        if let Some(ids) = &patch.competences {
            self.verifier.verify(ids).await?;
        }
        let updated = self
            .store
            .update_with(id, move |brief| {
                if let Some(to) = patch.status {
                    if brief.status != to && !brief.status.can_transition(to) {
                        return Err(ServiceError::InvalidStatus { from: brief.status, to });
                    }
                }
                brief.apply_patch(patch);
                Ok(())
            })
            .await?;
        info!(id = %updated.id, "brief updated");
        Ok(updated)
    }

    /// Delete, guarded by the usage authority. A referenced brief is left
    /// untouched and the call fails with `DeletionBlocked`.
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        if self.store.get(id).await.is_none() {
            return Err(ServiceError::not_found("brief"));
        }
        if !self.guard.may_delete(id).await? {
            return Err(ServiceError::DeletionBlocked(format!(
                "brief {id} is still referenced by submissions"
            )));
        }
        self.store.remove(id).await?;
        info!(%id, "brief deleted");
        Ok(())
    }

    /// Verify then replace the whole competence set in one store write.
    /// Idempotent: duplicates collapse to the same stored set.
    pub async fn associate_competences(
        &self,
        id: Uuid,
        competences: &[Uuid],
    ) -> Result<Brief, ServiceError> {
        if competences.is_empty() {
            return Err(ServiceError::Validation(
                "competences must be a non-empty array".into(),
            ));
        }
        if self.store.get(id).await.is_none() {
            return Err(ServiceError::not_found("brief"));
        }
        self.verifier.verify(competences).await?;
        let deduped = dedup_references(competences);
        let updated = self
            .store
            .update_with(id, move |brief| {
                brief.competences = deduped;
                brief.updated_at = chrono::Utc::now();
                Ok(())
            })
            .await?;
        info!(id = %updated.id, count = updated.competences.len(), "competences associated");
        Ok(updated)
    }

    /// Hydrate the associated competences from the authority. Ids whose
    /// lookup fails are skipped with a warning; this read path degrades
    /// rather than erroring.
    pub async fn competence_details(&self, id: Uuid) -> Result<CompetenceDetails, ServiceError> {
        let brief = self.get(id).await?;
        let mut competences = Vec::with_capacity(brief.competences.len());
        for competence_id in &brief.competences {
            match self.competences.fetch(*competence_id).await {
                Ok(detail) => competences.push(detail),
                Err(e) => {
                    warn!(%competence_id, error = %e, "skipping competence detail");
                }
            }
        }
        Ok(CompetenceDetails { brief_id: brief.id, title: brief.title, competences })
    }

    /// A brief is available to learners only once published. The learner id
    /// is accepted for future per-learner rules but does not affect the
    /// current decision.
    pub async fn availability(
        &self,
        id: Uuid,
        _learner_id: Option<Uuid>,
    ) -> Result<Availability, ServiceError> {
        let brief = self.get(id).await?;
        Ok(Availability {
            brief_id: brief.id,
            available: brief.status == BriefStatus::Published,
            status: brief.status,
        })
    }

    pub async fn statistics(&self) -> StatsSummary {
        stats::summary(&self.store).await
    }

    pub async fn popular(&self, limit: usize) -> Result<Vec<RankedBrief>, ServiceError> {
        self.resolver.top_briefs(limit.max(1)).await
    }
}
