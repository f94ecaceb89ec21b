//! Delete-time usage check against the learner service.
//!
//! Fail-open: when the usage authority is unreachable the guard permits the
//! delete instead of locking the catalog behind a down collaborator. The
//! degraded decision is logged. There is no compensating reconciliation step.

use std::sync::Arc;

use tracing::warn;
use uuid::Uuid;

use crate::authority::UsageAuthority;
use crate::errors::ServiceError;

pub struct UsageGuard {
    authority: Arc<dyn UsageAuthority>,
}

impl UsageGuard {
    pub fn new(authority: Arc<dyn UsageAuthority>) -> Self {
        Self { authority }
    }

    /// `Ok(false)` when at least one submission still references the brief.
    pub async fn may_delete(&self, brief_id: Uuid) -> Result<bool, ServiceError> {
        match self.authority.submissions_for_brief(brief_id).await {
            Ok(submissions) => Ok(submissions.is_empty()),
            Err(ServiceError::CollaboratorUnavailable { authority, reason }) => {
                warn!(
                    %brief_id,
                    authority,
                    %reason,
                    "usage authority unreachable, permitting delete (degraded decision)"
                );
                Ok(true)
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeUsageAuthority;

    #[tokio::test]
    async fn unreferenced_brief_may_be_deleted() {
        let authority = Arc::new(FakeUsageAuthority::default());
        let guard = UsageGuard::new(authority);
        assert!(guard.may_delete(Uuid::new_v4()).await.unwrap());
    }

    #[tokio::test]
    async fn referenced_brief_is_blocked() {
        let brief_id = Uuid::new_v4();
        let authority = Arc::new(FakeUsageAuthority::default());
        authority.add_submission(brief_id);
        let guard = UsageGuard::new(authority);
        assert!(!guard.may_delete(brief_id).await.unwrap());
    }

    #[tokio::test]
    async fn unreachable_authority_fails_open() {
        let authority = Arc::new(FakeUsageAuthority::unreachable());
        let guard = UsageGuard::new(authority);
        assert!(guard.may_delete(Uuid::new_v4()).await.unwrap());
    }
}
