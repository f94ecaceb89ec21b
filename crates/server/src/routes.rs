pub mod briefs;

use axum::{
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use common::types::Health;

use crate::state::ServerState;

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Build the full application router.
pub fn build_router(cors: CorsLayer, state: ServerState) -> Router {
    let api = Router::new()
        .route("/api/briefs", get(briefs::list_briefs).post(briefs::create_brief))
        .route("/api/briefs/statistics", get(briefs::statistics))
        .route("/api/briefs/popular", get(briefs::popular))
        .route(
            "/api/briefs/:id",
            get(briefs::get_brief)
                .put(briefs::update_brief)
                .delete(briefs::delete_brief),
        )
        .route(
            "/api/briefs/:id/competences",
            post(briefs::associate_competences).get(briefs::get_competences),
        )
        .route("/api/briefs/:id/availability", get(briefs::availability));

    Router::new()
        .route("/health", get(health))
        .merge(api)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
