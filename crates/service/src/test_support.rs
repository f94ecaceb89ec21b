//! In-memory fakes and fixtures shared by the service-layer tests.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use models::{Brief, BriefInput, Level};
use uuid::Uuid;

use crate::authority::{CompetenceAuthority, PopularityEntry, SubmissionSummary, UsageAuthority};
use crate::errors::ServiceError;

pub fn temp_store_path() -> PathBuf {
    std::env::temp_dir().join(format!("briefs_test_{}.json", Uuid::new_v4()))
}

pub fn sample_input(title: &str) -> BriefInput {
    BriefInput {
        title: title.into(),
        description: "A test brief".into(),
        objectives: "Learn something".into(),
        estimated_hours: 8,
        level: Level::Intermediate,
        competences: vec![],
        resources: vec![],
        deliverables: vec![],
        evaluation_criteria: vec![],
        status: None,
        author: "tests".into(),
    }
}

pub fn sample_brief(title: &str) -> Brief {
    Brief::from_input(sample_input(title))
}

/// Competence authority fake: a set of known ids, optionally unreachable.
#[derive(Default)]
pub struct FakeCompetenceAuthority {
    known: Mutex<HashSet<Uuid>>,
    unreachable: bool,
    lookups: AtomicUsize,
}

impl FakeCompetenceAuthority {
    pub fn with_ids(ids: &[Uuid]) -> Self {
        Self {
            known: Mutex::new(ids.iter().copied().collect()),
            ..Default::default()
        }
    }

    pub fn unreachable() -> Self {
        Self { unreachable: true, ..Default::default() }
    }

    pub fn forget(&self, id: Uuid) {
        self.known.lock().expect("lock").remove(&id);
    }

    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompetenceAuthority for FakeCompetenceAuthority {
    async fn exists(&self, id: Uuid) -> Result<bool, ServiceError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.unreachable {
            return Err(ServiceError::unavailable("competence-service", "connection refused"));
        }
        Ok(self.known.lock().expect("lock").contains(&id))
    }

    async fn fetch(&self, id: Uuid) -> Result<serde_json::Value, ServiceError> {
        if self.unreachable {
            return Err(ServiceError::unavailable("competence-service", "connection refused"));
        }
        if self.known.lock().expect("lock").contains(&id) {
            Ok(serde_json::json!({ "id": id, "name": format!("competence {id}") }))
        } else {
            Err(ServiceError::ReferenceNotFound(id))
        }
    }
}

/// Usage authority fake: referencing submissions per brief plus a canned
/// popularity ranking.
#[derive(Default)]
pub struct FakeUsageAuthority {
    submissions: Mutex<Vec<Uuid>>,
    ranking: Mutex<Vec<PopularityEntry>>,
    unreachable: bool,
}

impl FakeUsageAuthority {
    pub fn unreachable() -> Self {
        Self { unreachable: true, ..Default::default() }
    }

    pub fn add_submission(&self, brief_id: Uuid) {
        self.submissions.lock().expect("lock").push(brief_id);
    }

    pub fn set_ranking(&self, entries: &[(Uuid, u64)]) {
        *self.ranking.lock().expect("lock") = entries
            .iter()
            .map(|(brief_id, submission_count)| PopularityEntry {
                brief_id: *brief_id,
                submission_count: *submission_count,
            })
            .collect();
    }
}

#[async_trait]
impl UsageAuthority for FakeUsageAuthority {
    async fn submissions_for_brief(
        &self,
        brief_id: Uuid,
    ) -> Result<Vec<SubmissionSummary>, ServiceError> {
        if self.unreachable {
            return Err(ServiceError::unavailable("learner-service", "timeout"));
        }
        Ok(self
            .submissions
            .lock()
            .expect("lock")
            .iter()
            .filter(|id| **id == brief_id)
            .map(|_| SubmissionSummary { id: Some(Uuid::new_v4()), learner_id: None, status: None })
            .collect())
    }

    async fn popular_briefs(&self) -> Result<Vec<PopularityEntry>, ServiceError> {
        if self.unreachable {
            return Err(ServiceError::unavailable("learner-service", "timeout"));
        }
        Ok(self.ranking.lock().expect("lock").clone())
    }
}
