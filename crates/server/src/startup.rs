use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::Router;
use common::utils::logging::init_logging_default;
use dotenvy::dotenv;
use tower_http::cors::CorsLayer;
use tracing::info;

use service::{
    briefs::BriefService,
    clients::{HttpCompetenceAuthority, HttpUsageAuthority},
    storage::BriefStore,
};

use crate::routes;
use crate::state::ServerState;

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Wire the store and collaborator clients into the brief service.
pub async fn build_state(cfg: &configs::AppConfig) -> anyhow::Result<ServerState> {
    common::env::ensure_data_dir(&cfg.storage.data_dir).await?;
    let store = BriefStore::open(&cfg.storage.briefs_file).await?;

    let timeout = Duration::from_secs(cfg.collaborators.verify_timeout_secs);
    let competences = HttpCompetenceAuthority::new(&cfg.collaborators.competence_url, timeout)?;
    let usage = HttpUsageAuthority::new(&cfg.collaborators.learner_url, timeout)?;

    let briefs = BriefService::new(store, Arc::new(competences), Arc::new(usage));
    Ok(ServerState { briefs: Arc::new(briefs) })
}

/// Public entry: build the app and run the HTTP server.
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging_default();

    let cfg = configs::AppConfig::load_and_validate()?;
    let state = build_state(&cfg).await?;

    let app: Router = routes::build_router(build_cors(), state);

    let addr: SocketAddr = format!("{}:{}", cfg.server.host, cfg.server.port).parse()?;
    info!(
        %addr,
        competence_url = %cfg.collaborators.competence_url,
        learner_url = %cfg.collaborators.learner_url,
        "starting brief service"
    );
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
