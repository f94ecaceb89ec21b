//! End-to-end tests: real HTTP server plus a stub collaborator service, both
//! on ephemeral ports, driven with reqwest.

use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use server::routes;
use server::state::ServerState;

/// Shared state of the stub competence/learner collaborator.
#[derive(Default)]
struct StubState {
    known_competences: HashSet<Uuid>,
    referenced_briefs: HashSet<Uuid>,
    ranking: Vec<(Uuid, u64)>,
    ranking_down: bool,
}

type SharedStub = Arc<Mutex<StubState>>;

async fn stub_competence(
    State(stub): State<SharedStub>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    let known = stub.lock().expect("lock").known_competences.contains(&id);
    if known {
        Ok(Json(json!({ "id": id, "name": "stub competence" })))
    } else {
        Err(StatusCode::NOT_FOUND)
    }
}

async fn stub_submissions(
    State(stub): State<SharedStub>,
    Path(brief_id): Path<Uuid>,
) -> Json<serde_json::Value> {
    let referenced = stub.lock().expect("lock").referenced_briefs.contains(&brief_id);
    if referenced {
        Json(json!([{ "id": Uuid::new_v4(), "learner_id": Uuid::new_v4(), "status": "submitted" }]))
    } else {
        Json(json!([]))
    }
}

async fn stub_popular(
    State(stub): State<SharedStub>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    let state = stub.lock().expect("lock");
    if state.ranking_down {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    let entries: Vec<serde_json::Value> = state
        .ranking
        .iter()
        .map(|(id, n)| json!({ "brief_id": id, "submission_count": n }))
        .collect();
    Ok(Json(json!(entries)))
}

async fn start_stub(stub: SharedStub) -> anyhow::Result<String> {
    let app = Router::new()
        .route("/api/competences/:id", get(stub_competence))
        .route("/api/submissions/by-brief/:id", get(stub_submissions))
        .route("/api/statistics/popular-briefs", get(stub_popular))
        .with_state(stub);
    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            eprintln!("stub server error: {e}");
        }
    });
    Ok(format!("http://{}:{}", addr.ip(), addr.port()))
}

struct TestApp {
    base_url: String,
    stub: SharedStub,
}

async fn start_server() -> anyhow::Result<TestApp> {
    let stub: SharedStub = Arc::new(Mutex::new(StubState::default()));
    let collaborator_url = start_stub(Arc::clone(&stub)).await?;

    let temp_id = Uuid::new_v4();
    let mut cfg = configs::AppConfig::default();
    cfg.collaborators.competence_url = collaborator_url.clone();
    cfg.collaborators.learner_url = collaborator_url;
    cfg.collaborators.verify_timeout_secs = 2;
    cfg.storage.data_dir = format!("target/test-data/{temp_id}");
    cfg.storage.briefs_file = format!("target/test-data/{temp_id}/briefs.json");

    let state: ServerState = server::startup::build_state(&cfg).await?;
    let app: Router = routes::build_router(CorsLayer::very_permissive(), state);

    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    let base_url = format!("http://{}:{}", addr.ip(), addr.port());
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            eprintln!("server error: {e}");
        }
    });

    Ok(TestApp { base_url, stub })
}

fn brief_body(title: &str) -> serde_json::Value {
    json!({
        "title": title,
        "description": "An end-to-end test brief",
        "objectives": "Exercise the whole stack",
        "estimated_hours": 6,
        "level": "Beginner",
        "author": "e2e",
    })
}

#[tokio::test]
async fn e2e_health() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = reqwest::get(format!("{}/health", app.base_url)).await?;
    assert_eq!(res.status(), reqwest::StatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn e2e_create_verifies_references() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = reqwest::Client::new();

    let a = Uuid::new_v4();
    let b = Uuid::new_v4();
    {
        let mut stub = app.stub.lock().expect("lock");
        stub.known_competences.insert(a);
        stub.known_competences.insert(b);
    }

    // duplicates collapse, both ids known
    let mut body = brief_body("Verified brief");
    body["competences"] = json!([a, a, b]);
    let res = c.post(format!("{}/api/briefs", app.base_url)).json(&body).send().await?;
    assert_eq!(res.status(), reqwest::StatusCode::CREATED);
    let created = res.json::<serde_json::Value>().await?;
    assert_eq!(created["competences"].as_array().expect("array").len(), 2);

    // one unknown id fails the whole write
    let missing = Uuid::new_v4();
    let mut body = brief_body("Broken brief");
    body["competences"] = json!([a, missing]);
    let res = c.post(format!("{}/api/briefs", app.base_url)).json(&body).send().await?;
    assert_eq!(res.status(), reqwest::StatusCode::BAD_REQUEST);

    // nothing partial was persisted
    let res = c.get(format!("{}/api/briefs", app.base_url)).send().await?;
    let page = res.json::<serde_json::Value>().await?;
    assert_eq!(page["pagination"]["total"], 1);
    Ok(())
}

#[tokio::test]
async fn e2e_list_pagination_metadata() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = reqwest::Client::new();

    for i in 0..25 {
        let res = c
            .post(format!("{}/api/briefs", app.base_url))
            .json(&brief_body(&format!("brief {i}")))
            .send()
            .await?;
        assert_eq!(res.status(), reqwest::StatusCode::CREATED);
    }

    let res = c
        .get(format!("{}/api/briefs?page=2&per_page=10", app.base_url))
        .send()
        .await?;
    let page = res.json::<serde_json::Value>().await?;
    assert_eq!(page["data"].as_array().expect("array").len(), 10);
    assert_eq!(page["pagination"], json!({ "page": 2, "per_page": 10, "total": 25, "pages": 3 }));
    Ok(())
}

#[tokio::test]
async fn e2e_delete_blocked_then_allowed() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = reqwest::Client::new();

    let res = c
        .post(format!("{}/api/briefs", app.base_url))
        .json(&brief_body("Referenced brief"))
        .send()
        .await?;
    let brief = res.json::<serde_json::Value>().await?;
    let id: Uuid = serde_json::from_value(brief["id"].clone())?;

    app.stub.lock().expect("lock").referenced_briefs.insert(id);
    let res = c.delete(format!("{}/api/briefs/{id}", app.base_url)).send().await?;
    assert_eq!(res.status(), reqwest::StatusCode::CONFLICT);

    // still present
    let res = c.get(format!("{}/api/briefs/{id}", app.base_url)).send().await?;
    assert_eq!(res.status(), reqwest::StatusCode::OK);

    app.stub.lock().expect("lock").referenced_briefs.remove(&id);
    let res = c.delete(format!("{}/api/briefs/{id}", app.base_url)).send().await?;
    assert_eq!(res.status(), reqwest::StatusCode::OK);
    let res = c.get(format!("{}/api/briefs/{id}", app.base_url)).send().await?;
    assert_eq!(res.status(), reqwest::StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn e2e_status_lifecycle_and_availability() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = reqwest::Client::new();

    let res = c
        .post(format!("{}/api/briefs", app.base_url))
        .json(&brief_body("Lifecycle brief"))
        .send()
        .await?;
    let brief = res.json::<serde_json::Value>().await?;
    let id = brief["id"].as_str().expect("id").to_string();

    let res = c
        .get(format!("{}/api/briefs/{id}/availability", app.base_url))
        .send()
        .await?;
    let avail = res.json::<serde_json::Value>().await?;
    assert_eq!(avail["available"], false);

    let res = c
        .put(format!("{}/api/briefs/{id}", app.base_url))
        .json(&json!({ "status": "Published" }))
        .send()
        .await?;
    assert_eq!(res.status(), reqwest::StatusCode::OK);

    let res = c
        .get(format!("{}/api/briefs/{id}/availability?learner_id={}", app.base_url, Uuid::new_v4()))
        .send()
        .await?;
    let avail = res.json::<serde_json::Value>().await?;
    assert_eq!(avail["available"], true);

    // Published -> Draft is illegal
    let res = c
        .put(format!("{}/api/briefs/{id}", app.base_url))
        .json(&json!({ "status": "Draft" }))
        .send()
        .await?;
    assert_eq!(res.status(), reqwest::StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn e2e_associate_and_hydrate_competences() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = reqwest::Client::new();

    let a = Uuid::new_v4();
    app.stub.lock().expect("lock").known_competences.insert(a);

    let res = c
        .post(format!("{}/api/briefs", app.base_url))
        .json(&brief_body("Associations"))
        .send()
        .await?;
    let brief = res.json::<serde_json::Value>().await?;
    let id = brief["id"].as_str().expect("id").to_string();

    let res = c
        .post(format!("{}/api/briefs/{id}/competences", app.base_url))
        .json(&json!({ "competences": [a, a] }))
        .send()
        .await?;
    assert_eq!(res.status(), reqwest::StatusCode::OK);
    let updated = res.json::<serde_json::Value>().await?;
    assert_eq!(updated["competences"].as_array().expect("array").len(), 1);

    let res = c
        .get(format!("{}/api/briefs/{id}/competences", app.base_url))
        .send()
        .await?;
    let details = res.json::<serde_json::Value>().await?;
    assert_eq!(details["competences"].as_array().expect("array").len(), 1);
    assert_eq!(details["competences"][0]["id"], json!(a));
    Ok(())
}

#[tokio::test]
async fn e2e_statistics_summary() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = reqwest::Client::new();

    for level in ["Beginner", "Beginner", "Advanced"] {
        let mut body = brief_body("Stats brief");
        body["level"] = json!(level);
        c.post(format!("{}/api/briefs", app.base_url)).json(&body).send().await?;
    }

    let res = c.get(format!("{}/api/briefs/statistics", app.base_url)).send().await?;
    assert_eq!(res.status(), reqwest::StatusCode::OK);
    let stats = res.json::<serde_json::Value>().await?;
    assert_eq!(stats["total_briefs"], 3);
    assert_eq!(stats["by_level"][0]["key"], "Beginner");
    assert_eq!(stats["by_level"][0]["count"], 2);
    Ok(())
}

#[tokio::test]
async fn e2e_popular_falls_back_when_ranking_down() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = reqwest::Client::new();

    let mut ids = Vec::new();
    for i in 0..6 {
        let res = c
            .post(format!("{}/api/briefs", app.base_url))
            .json(&brief_body(&format!("popular {i}")))
            .send()
            .await?;
        let brief = res.json::<serde_json::Value>().await?;
        let id = brief["id"].as_str().expect("id").to_string();
        c.put(format!("{}/api/briefs/{id}", app.base_url))
            .json(&json!({ "status": "Published" }))
            .send()
            .await?;
        ids.push(id);
    }

    // primary path serves the collaborator ranking
    {
        let mut stub = app.stub.lock().expect("lock");
        let ranked: Uuid = ids[3].parse()?;
        stub.ranking = vec![(ranked, 42)];
    }
    let res = c.get(format!("{}/api/briefs/popular?limit=5", app.base_url)).send().await?;
    let top = res.json::<serde_json::Value>().await?;
    assert_eq!(top.as_array().expect("array").len(), 1);
    assert_eq!(top[0]["submission_count"], 42);

    // ranking endpoint down: degrade to latest published, no error
    app.stub.lock().expect("lock").ranking_down = true;
    let res = c.get(format!("{}/api/briefs/popular?limit=5", app.base_url)).send().await?;
    assert_eq!(res.status(), reqwest::StatusCode::OK);
    let top = res.json::<serde_json::Value>().await?;
    let top = top.as_array().expect("array");
    assert_eq!(top.len(), 5);
    assert!(top.iter().all(|b| b.get("submission_count").is_none()));
    assert!(top.iter().all(|b| b["status"] == "Published"));
    Ok(())
}
