//! HTTP implementations of the collaborator-authority traits.
//!
//! Each client gets its own `reqwest::Client` with the configured per-call
//! timeout, so one slow lookup cannot hang a verification fan-out.

use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use crate::authority::{CompetenceAuthority, PopularityEntry, SubmissionSummary, UsageAuthority};
use crate::errors::ServiceError;

const COMPETENCE_AUTHORITY: &str = "competence-service";
const LEARNER_AUTHORITY: &str = "learner-service";

fn build_client(timeout: Duration) -> Result<reqwest::Client, ServiceError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ServiceError::Store(format!("http client init: {e}")))
}

/// Client for the competence service (`GET /api/competences/:id`).
pub struct HttpCompetenceAuthority {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCompetenceAuthority {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ServiceError> {
        Ok(Self {
            client: build_client(timeout)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl CompetenceAuthority for HttpCompetenceAuthority {
    async fn exists(&self, id: Uuid) -> Result<bool, ServiceError> {
        let url = format!("{}/api/competences/{}", self.base_url, id);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ServiceError::unavailable(COMPETENCE_AUTHORITY, e))?;
        match resp.status() {
            s if s.is_success() => Ok(true),
            s if s == reqwest::StatusCode::NOT_FOUND => Ok(false),
            s => Err(ServiceError::unavailable(
                COMPETENCE_AUTHORITY,
                format!("unexpected status {s}"),
            )),
        }
    }

    async fn fetch(&self, id: Uuid) -> Result<serde_json::Value, ServiceError> {
        let url = format!("{}/api/competences/{}", self.base_url, id);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ServiceError::unavailable(COMPETENCE_AUTHORITY, e))?;
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(ServiceError::ReferenceNotFound(id));
        }
        if !resp.status().is_success() {
            return Err(ServiceError::unavailable(
                COMPETENCE_AUTHORITY,
                format!("unexpected status {}", resp.status()),
            ));
        }
        resp.json::<serde_json::Value>()
            .await
            .map_err(|e| ServiceError::unavailable(COMPETENCE_AUTHORITY, e))
    }
}

/// Client for the learner service (`GET /api/submissions/by-brief/:id` and
/// `GET /api/statistics/popular-briefs`).
pub struct HttpUsageAuthority {
    client: reqwest::Client,
    base_url: String,
}

impl HttpUsageAuthority {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ServiceError> {
        Ok(Self {
            client: build_client(timeout)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl UsageAuthority for HttpUsageAuthority {
    async fn submissions_for_brief(
        &self,
        brief_id: Uuid,
    ) -> Result<Vec<SubmissionSummary>, ServiceError> {
        let url = format!("{}/api/submissions/by-brief/{}", self.base_url, brief_id);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ServiceError::unavailable(LEARNER_AUTHORITY, e))?;
        if !resp.status().is_success() {
            return Err(ServiceError::unavailable(
                LEARNER_AUTHORITY,
                format!("unexpected status {}", resp.status()),
            ));
        }
        resp.json::<Vec<SubmissionSummary>>()
            .await
            .map_err(|e| ServiceError::unavailable(LEARNER_AUTHORITY, e))
    }

    async fn popular_briefs(&self) -> Result<Vec<PopularityEntry>, ServiceError> {
        let url = format!("{}/api/statistics/popular-briefs", self.base_url);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ServiceError::unavailable(LEARNER_AUTHORITY, e))?;
        if !resp.status().is_success() {
            return Err(ServiceError::unavailable(
                LEARNER_AUTHORITY,
                format!("unexpected status {}", resp.status()),
            ));
        }
        resp.json::<Vec<PopularityEntry>>()
            .await
            .map_err(|e| ServiceError::unavailable(LEARNER_AUTHORITY, e))
    }
}
