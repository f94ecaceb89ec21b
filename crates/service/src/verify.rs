//! Write-time verification of foreign competence references.
//!
//! Fail-closed: a write that carries competence ids only proceeds when every
//! id was confirmed by the authority. Contrast with the delete-time usage
//! guard, which is fail-open.

use std::sync::Arc;

use models::brief::dedup_references;
use tokio::task::JoinSet;
use tracing::debug;
use uuid::Uuid;

use crate::authority::CompetenceAuthority;
use crate::errors::ServiceError;

pub struct ReferenceVerifier {
    authority: Arc<dyn CompetenceAuthority>,
}

impl ReferenceVerifier {
    pub fn new(authority: Arc<dyn CompetenceAuthority>) -> Self {
        Self { authority }
    }

    /// Confirm every id against the competence authority.
    ///
    /// Lookups fan out concurrently, one per distinct id; each is bounded by
    /// the client's per-call timeout. The first failure wins and outstanding
    /// sibling lookups are abandoned. An empty set is vacuously valid.
    pub async fn verify(&self, ids: &[Uuid]) -> Result<(), ServiceError> {
        let distinct = dedup_references(ids);
        if distinct.is_empty() {
            return Ok(());
        }

        let mut lookups = JoinSet::new();
        for id in distinct {
            let authority = Arc::clone(&self.authority);
            lookups.spawn(async move { (id, authority.exists(id).await) });
        }

        while let Some(joined) = lookups.join_next().await {
            let (id, res) = joined
                .map_err(|e| ServiceError::Store(format!("verification task failed: {e}")))?;
            match res {
                Ok(true) => debug!(%id, "competence reference confirmed"),
                Ok(false) => {
                    lookups.abort_all();
                    return Err(ServiceError::ReferenceNotFound(id));
                }
                Err(e) => {
                    lookups.abort_all();
                    return Err(e);
                }
            }
        }
        Ok(())
    }
}
