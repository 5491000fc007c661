//! GitLab client against an in-process stub of the CI API

use axum::{
    Form, Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::{Value, json};
use shipwright_client::{CiProvider, ClientError, GitLabClient};
use shipwright_core::domain::credentials::AccessToken;
use shipwright_core::domain::job::{JobStatus, find_job};
use shipwright_core::domain::pipeline::PipelineTrigger;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

const TOKEN: &str = "tok-123";

#[derive(Default)]
struct Recorded {
    pipeline_bodies: Vec<Value>,
    played_jobs: Vec<u64>,
}

type Shared = Arc<Mutex<Recorded>>;

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("Bearer {}", TOKEN))
        .unwrap_or(false)
}

async fn token(Form(form): Form<HashMap<String, String>>) -> Response {
    let valid = form.get("grant_type").map(String::as_str) == Some("password")
        && form.get("username").map(String::as_str) == Some("alice")
        && form.get("password").map(String::as_str) == Some("secret");

    if valid {
        Json(json!({ "access_token": TOKEN, "token_type": "Bearer" })).into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "invalid_grant" })),
        )
            .into_response()
    }
}

async fn project_by_path(headers: HeaderMap, Path(path): Path<String>) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if path == "acme/platform" {
        Json(json!({
            "id": 7,
            "name": "platform",
            "path": "platform",
            "path_with_namespace": "acme/platform"
        }))
        .into_response()
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(json!({ "message": "404 Project Not Found" })),
        )
            .into_response()
    }
}

async fn search_projects(
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let search = query.get("search").cloned().unwrap_or_default();
    let all = vec![
        json!({ "id": 5, "name": "platform-docs", "path": "platform-docs", "path_with_namespace": "acme/platform-docs" }),
        json!({ "id": 7, "name": "platform", "path": "platform", "path_with_namespace": "acme/platform" }),
    ];
    let found: Vec<Value> = all
        .into_iter()
        .filter(|p| p["path"].as_str().unwrap_or_default().contains(&search))
        .collect();
    Json(found).into_response()
}

async fn create_pipeline(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(project): Path<u64>,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) || project != 7 {
        return StatusCode::FORBIDDEN.into_response();
    }
    state.lock().unwrap().pipeline_bodies.push(body);
    (
        StatusCode::CREATED,
        Json(json!({
            "id": 77,
            "ref": "main",
            "status": "created",
            "web_url": "https://ci.example/acme/platform/-/pipelines/77"
        })),
    )
        .into_response()
}

async fn pipeline_jobs(
    headers: HeaderMap,
    Path((_project, pipeline)): Path<(u64, u64)>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if !authorized(&headers) || pipeline != 77 {
        return StatusCode::NOT_FOUND.into_response();
    }
    match query.get("page").map(String::as_str) {
        Some("2") => Json(json!([
            { "id": 903, "name": "platform:deploy", "status": "manual", "stage": "deploy" }
        ]))
        .into_response(),
        _ => (
            [("x-next-page", "2")],
            Json(json!([
                { "id": 901, "name": "compose", "status": "success", "stage": "build" },
                { "id": 902, "name": "prepare", "status": "running", "stage": "build" }
            ])),
        )
            .into_response(),
    }
}

async fn play_job(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path((_project, job)): Path<(u64, u64)>,
) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    state.lock().unwrap().played_jobs.push(job);
    Json(json!({ "id": job, "name": "platform:deploy", "status": "pending" })).into_response()
}

async fn spawn_stub() -> (String, Shared) {
    let state: Shared = Arc::new(Mutex::new(Recorded::default()));
    let app = Router::new()
        .route("/oauth/token", post(token))
        .route("/api/v4/projects", get(search_projects))
        .route("/api/v4/projects/{path}", get(project_by_path))
        .route("/api/v4/projects/{id}/pipeline", post(create_pipeline))
        .route(
            "/api/v4/projects/{id}/pipelines/{pipeline}/jobs",
            get(pipeline_jobs),
        )
        .route("/api/v4/projects/{id}/jobs/{job}/play", post(play_job))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), state)
}

#[tokio::test]
async fn test_token_exchange() {
    let (host, _) = spawn_stub().await;
    let client = GitLabClient::new();

    let token = client.authenticate(&host, "alice", "secret").await.unwrap();
    assert_eq!(token.secret(), TOKEN);
}

#[tokio::test]
async fn test_wrong_password_is_authentication_failure() {
    let (host, _) = spawn_stub().await;
    let client = GitLabClient::new();

    let err = client
        .authenticate(&host, "alice", "wrong")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ClientError::AuthenticationFailed { status: 401, .. }
    ));
}

#[tokio::test]
async fn test_resolve_project_by_namespaced_path() {
    let (host, _) = spawn_stub().await;
    let client = GitLabClient::new();
    let token = AccessToken::new(TOKEN);

    let id = client
        .resolve_project(&host, &token, "acme/platform")
        .await
        .unwrap();
    assert_eq!(id, 7);
}

#[tokio::test]
async fn test_resolve_project_by_name_prefers_exact_path() {
    let (host, _) = spawn_stub().await;
    let client = GitLabClient::new();
    let token = AccessToken::new(TOKEN);

    let id = client
        .resolve_project(&host, &token, "platform")
        .await
        .unwrap();
    assert_eq!(id, 7);
}

#[tokio::test]
async fn test_missing_project_names_the_repository() {
    let (host, _) = spawn_stub().await;
    let client = GitLabClient::new();
    let token = AccessToken::new(TOKEN);

    let err = client
        .resolve_project(&host, &token, "acme/unknown")
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert!(err.to_string().contains("acme/unknown"));

    let err = client
        .resolve_project(&host, &token, "nothing-like-it")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("nothing-like-it"));
}

#[tokio::test]
async fn test_pipeline_lifecycle() {
    let (host, state) = spawn_stub().await;
    let client = GitLabClient::new();
    let token = AccessToken::new(TOKEN);

    let run = client
        .trigger_pipeline(
            &host,
            &token,
            7,
            &PipelineTrigger {
                branch: "main".to_string(),
                environment: "dev".to_string(),
                selector: "platform.core".to_string(),
                debug: true,
            },
        )
        .await
        .unwrap();
    assert_eq!(run.pipeline_id, 77);
    assert_eq!(run.project_id, 7);
    assert_eq!(run.branch, "main");

    {
        let recorded = state.lock().unwrap();
        let body = &recorded.pipeline_bodies[0];
        assert_eq!(body["ref"], "main");
        let vars = body["variables"].as_array().unwrap();
        assert!(vars.contains(&json!({ "key": "TARGET_ENVIRONMENT", "value": "dev" })));
        assert!(vars.contains(&json!({ "key": "TARGET_TAGS", "value": "platform.core" })));
        assert!(vars.contains(&json!({ "key": "ANSIBLE_DEBUG", "value": "true" })));
    }

    let jobs = client.list_jobs(&host, &token, 7, 77).await.unwrap();
    let names: Vec<_> = jobs.iter().map(|j| j.name.as_str()).collect();
    assert_eq!(names, vec!["compose", "prepare", "platform:deploy"]);
    assert_eq!(jobs[1].status, JobStatus::Running);

    let target = find_job(&jobs, "platform:deploy").unwrap();
    client
        .trigger_job(&host, &token, 7, target.id, run.pipeline_id)
        .await
        .unwrap();
    assert_eq!(state.lock().unwrap().played_jobs, vec![903]);
}

#[tokio::test]
async fn test_api_error_carries_status() {
    let (host, _) = spawn_stub().await;
    let client = GitLabClient::new();
    let token = AccessToken::new("not-the-token");

    let err = client.list_jobs(&host, &token, 7, 77).await.unwrap_err();
    assert!(matches!(err, ClientError::ApiError { status: 404, .. }));
}
