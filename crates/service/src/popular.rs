//! Popularity ranking with a local fallback.
//!
//! Primary path asks the learner service for its ranking and hydrates the
//! ids locally; any failure of that path degrades to the most recent
//! published briefs instead of surfacing an error.

use std::sync::Arc;

use models::Brief;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::authority::UsageAuthority;
use crate::errors::ServiceError;
use crate::storage::BriefStore;

/// A brief annotated with the usage count that ranked it. `submission_count`
/// is absent on the fallback path.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RankedBrief {
    #[serde(flatten)]
    pub brief: Brief,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submission_count: Option<u64>,
}

pub struct PopularityResolver {
    store: Arc<BriefStore>,
    authority: Arc<dyn UsageAuthority>,
}

impl PopularityResolver {
    pub fn new(store: Arc<BriefStore>, authority: Arc<dyn UsageAuthority>) -> Self {
        Self { store, authority }
    }

    /// At most `limit` briefs, most popular first. Ids the ranking mentions
    /// but the store no longer holds are skipped, preserving the
    /// collaborator's order for the rest.
    pub async fn top_briefs(&self, limit: usize) -> Result<Vec<RankedBrief>, ServiceError> {
        match self.authority.popular_briefs().await {
            Ok(ranking) => {
                let mut out = Vec::new();
                for entry in ranking {
                    if out.len() == limit {
                        break;
                    }
                    match self.store.get(entry.brief_id).await {
                        Some(brief) => out.push(RankedBrief {
                            brief,
                            submission_count: Some(entry.submission_count),
                        }),
                        // deleted locally since the ranking was computed
                        None => continue,
                    }
                }
                Ok(out)
            }
            Err(e) => {
                warn!(error = %e, "popularity ranking unavailable, falling back to latest published");
                let briefs = self.store.latest_published(limit).await;
                Ok(briefs
                    .into_iter()
                    .map(|brief| RankedBrief { brief, submission_count: None })
                    .collect())
            }
        }
    }
}
