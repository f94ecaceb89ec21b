use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use models::{Brief, BriefInput, BriefPatch, BriefStatus, Level};
use serde::Deserialize;
use service::briefs::{Availability, CompetenceDetails};
use service::pagination::{BriefFilter, PageRequest, PageResult};
use service::popular::RankedBrief;
use service::stats::StatsSummary;
use tracing::info;
use uuid::Uuid;

use crate::errors::JsonApiError;
use crate::state::ServerState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    pub level: Option<Level>,
    pub status: Option<BriefStatus>,
    pub competence: Option<Uuid>,
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AssociateInput {
    pub competences: Vec<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub learner_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct PopularQuery {
    pub limit: Option<usize>,
}

pub async fn list_briefs(
    State(state): State<ServerState>,
    Query(q): Query<ListQuery>,
) -> Result<Json<PageResult<Brief>>, JsonApiError> {
    let filter = BriefFilter { level: q.level, status: q.status, competence: q.competence, q: q.q };
    let page = PageRequest {
        page: q.page.unwrap_or(1),
        per_page: q.per_page.unwrap_or(10).min(100),
    };
    let result = state
        .briefs
        .list(filter, page)
        .await
        .map_err(JsonApiError::from_service)?;
    info!(total = result.pagination.total, page = result.pagination.page, "list briefs");
    Ok(Json(result))
}

pub async fn get_brief(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Brief>, JsonApiError> {
    state
        .briefs
        .get(id)
        .await
        .map(Json)
        .map_err(JsonApiError::from_service)
}

pub async fn create_brief(
    State(state): State<ServerState>,
    Json(input): Json<BriefInput>,
) -> Result<(StatusCode, Json<Brief>), JsonApiError> {
    let brief = state
        .briefs
        .create(input)
        .await
        .map_err(JsonApiError::from_service)?;
    Ok((StatusCode::CREATED, Json(brief)))
}

pub async fn update_brief(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(patch): Json<BriefPatch>,
) -> Result<Json<Brief>, JsonApiError> {
    state
        .briefs
        .update(id, patch)
        .await
        .map(Json)
        .map_err(JsonApiError::from_service)
}

pub async fn delete_brief(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, JsonApiError> {
    state
        .briefs
        .delete(id)
        .await
        .map(|_| StatusCode::OK)
        .map_err(JsonApiError::from_service)
}

pub async fn associate_competences(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(input): Json<AssociateInput>,
) -> Result<Json<Brief>, JsonApiError> {
    state
        .briefs
        .associate_competences(id, &input.competences)
        .await
        .map(Json)
        .map_err(JsonApiError::from_service)
}

pub async fn get_competences(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CompetenceDetails>, JsonApiError> {
    state
        .briefs
        .competence_details(id)
        .await
        .map(Json)
        .map_err(JsonApiError::from_service)
}

pub async fn statistics(State(state): State<ServerState>) -> Json<StatsSummary> {
    Json(state.briefs.statistics().await)
}

pub async fn popular(
    State(state): State<ServerState>,
    Query(q): Query<PopularQuery>,
) -> Result<Json<Vec<RankedBrief>>, JsonApiError> {
    let limit = q.limit.unwrap_or(10).min(100);
    state
        .briefs
        .popular(limit)
        .await
        .map(Json)
        .map_err(JsonApiError::from_service)
}

pub async fn availability(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Query(q): Query<AvailabilityQuery>,
) -> Result<Json<Availability>, JsonApiError> {
    state
        .briefs
        .availability(id, q.learner_id)
        .await
        .map(Json)
        .map_err(JsonApiError::from_service)
}
