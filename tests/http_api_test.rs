use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value as JsonValue};
use tower::ServiceExt;

use farmwork_backend::repository::memory::{
    MemoryApplicationRepository, MemoryChatTransport, MemoryJobRepository,
};
use farmwork_backend::services::assist_service::NullAssist;
use farmwork_backend::{routes, AppState};

fn test_app() -> Router {
    let state = AppState::from_parts(
        Arc::new(MemoryJobRepository::new()),
        Arc::new(MemoryApplicationRepository::new()),
        Arc::new(MemoryChatTransport::new()),
        Arc::new(NullAssist),
    );

    Router::new()
        .route("/health", get(routes::health::health))
        .route(
            "/api/jobs",
            get(routes::job::list_jobs).post(routes::job::create_job),
        )
        .route(
            "/api/jobs/:id",
            get(routes::job::get_job)
                .patch(routes::job::update_job)
                .delete(routes::job::close_job),
        )
        .route("/api/jobs/:id/apply", post(routes::application::apply_for_job))
        .route(
            "/api/jobs/:id/applications",
            get(routes::application::list_applications_for_job),
        )
        .route(
            "/api/applications/:id/decision",
            post(routes::application::decide_application),
        )
        .route("/api/chats", get(routes::chat::list_chat_rooms))
        .route("/api/assist/safety-tips", post(routes::assist::safety_tips))
        .route("/api/assist/parse", post(routes::assist::parse_job_request))
        .with_state(state)
}

fn job_body() -> JsonValue {
    json!({
        "crop": "葡萄",
        "task": "套袋",
        "salary_type": "daily",
        "salary_amount": 1500,
        "district": "台中市東勢區",
        "village": "東勢里",
        "date": "2026-08-20",
        "required_workers": 2,
        "terrain": "slope"
    })
}

fn profile_body(uid: &str, name: &str) -> JsonValue {
    json!({
        "profile": {
            "uid": uid,
            "email": format!("{}@example.com", uid),
            "full_name": name,
            "phone_number": "0912345678",
            "nationality": "越南",
            "skills": ["採收"],
            "credit_score": 4.1
        }
    })
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    user: Option<&str>,
    body: Option<JsonValue>,
) -> (StatusCode, JsonValue) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(uid) = user {
        builder = builder.header("x-user-id", uid);
    }
    let request = match body {
        Some(value) => builder
            .header("content-type", "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        JsonValue::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(JsonValue::Null)
    };
    (status, value)
}

#[tokio::test]
async fn health_endpoint_answers() {
    let app = test_app();
    let (status, body) = send(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn identity_header_is_required_for_posting() {
    let app = test_app();
    let (status, body) = send(&app, "POST", "/api/jobs", None, Some(job_body())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].as_str().unwrap().contains("identity"));
}

#[tokio::test]
async fn posting_and_listing_round_trip() {
    let app = test_app();

    let (status, created) =
        send(&app, "POST", "/api/jobs", Some("owner-1"), Some(job_body())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["title"], "葡萄 - 套袋");
    assert_eq!(created["current_workers"], 0);
    assert_eq!(created["status"], "active");

    let (status, listed) = send(&app, "GET", "/api/jobs", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["items"].as_array().unwrap().len(), 1);

    let (status, fetched) = send(
        &app,
        "GET",
        &format!("/api/jobs/{}", created["id"].as_str().unwrap()),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["pay_rate"], "日薪 1500");
}

#[tokio::test]
async fn invalid_payload_names_the_field() {
    let app = test_app();
    let mut body = job_body();
    body["crop"] = json!("其他");

    let (status, response) = send(&app, "POST", "/api/jobs", Some("owner-1"), Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], "invalid field: crop");
}

#[tokio::test]
async fn application_flow_enforces_capacity_over_http() {
    let app = test_app();
    let mut body = job_body();
    body["required_workers"] = json!(1);
    let (_, created) = send(&app, "POST", "/api/jobs", Some("owner-1"), Some(body)).await;
    let job_id = created["id"].as_str().unwrap().to_string();

    let apply_uri = format!("/api/jobs/{}/apply", job_id);
    let (status, first) = send(
        &app,
        "POST",
        &apply_uri,
        Some("worker-1"),
        Some(profile_body("worker-1", "阿明")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["status"], "pending");

    let (status, second) = send(
        &app,
        "POST",
        &apply_uri,
        Some("worker-2"),
        Some(profile_body("worker-2", "阿華")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // A profile snapshot for someone else is rejected outright.
    let (status, _) = send(
        &app,
        "POST",
        &apply_uri,
        Some("worker-3"),
        Some(profile_body("worker-1", "阿明")),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, review) = send(
        &app,
        "GET",
        &format!("/api/jobs/{}/applications", job_id),
        Some("owner-1"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(review["items"].as_array().unwrap().len(), 2);

    let first_decision = format!(
        "/api/applications/{}/decision",
        first["id"].as_str().unwrap()
    );
    let (status, decided) = send(
        &app,
        "POST",
        &first_decision,
        Some("owner-1"),
        Some(json!({ "decision": "accept" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(decided["status"], "accepted");

    let second_decision = format!(
        "/api/applications/{}/decision",
        second["id"].as_str().unwrap()
    );
    let (status, body) = send(
        &app,
        "POST",
        &second_decision,
        Some("owner-1"),
        Some(json!({ "decision": "accept" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "position filled");

    let (_, fetched) = send(&app, "GET", &format!("/api/jobs/{}", job_id), None, None).await;
    assert_eq!(fetched["current_workers"], 1);
    assert_eq!(fetched["remaining_workers"], 0);
}

#[tokio::test]
async fn edits_cannot_tamper_with_the_worker_count() {
    let app = test_app();
    let (_, created) = send(&app, "POST", "/api/jobs", Some("owner-1"), Some(job_body())).await;
    let job_id = created["id"].as_str().unwrap().to_string();

    let apply_uri = format!("/api/jobs/{}/apply", job_id);
    let (_, application) = send(
        &app,
        "POST",
        &apply_uri,
        Some("worker-1"),
        Some(profile_body("worker-1", "阿明")),
    )
    .await;
    let decision_uri = format!(
        "/api/applications/{}/decision",
        application["id"].as_str().unwrap()
    );
    send(
        &app,
        "POST",
        &decision_uri,
        Some("owner-1"),
        Some(json!({ "decision": "accept" })),
    )
    .await;

    // The edit payload claims 99 filled slots; the stored count wins.
    let mut edit = job_body();
    edit["current_workers"] = json!(99);
    edit["salary_amount"] = json!(1800);
    let (status, updated) = send(
        &app,
        "PATCH",
        &format!("/api/jobs/{}", job_id),
        Some("owner-1"),
        Some(edit),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["current_workers"], 1);
    assert_eq!(updated["pay_rate"], "日薪 1800");
}

#[tokio::test]
async fn closing_over_http_removes_job_and_chat() {
    let app = test_app();
    let (_, created) = send(&app, "POST", "/api/jobs", Some("owner-1"), Some(job_body())).await;
    let job_id = created["id"].as_str().unwrap().to_string();

    let (status, rooms) = send(&app, "GET", "/api/chats", Some("owner-1"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rooms["items"].as_array().unwrap().len(), 1);

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/jobs/{}", job_id),
        Some("owner-2"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/jobs/{}", job_id),
        Some("owner-1"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, listed) = send(&app, "GET", "/api/jobs", None, None).await;
    assert!(listed["items"].as_array().unwrap().is_empty());
    let (_, rooms) = send(&app, "GET", "/api/chats", Some("owner-1"), None).await;
    assert!(rooms["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn assist_endpoints_fall_back_without_a_provider() {
    let app = test_app();

    let (status, tips) = send(
        &app,
        "POST",
        "/api/assist/safety-tips",
        None,
        Some(json!({ "task": "噴藥" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(tips["tips"], "無法連線至 AI 安全顧問。");

    let (status, parsed) = send(
        &app,
        "POST",
        "/api/assist/parse",
        None,
        Some(json!({ "input": "明天要找三個人採葡萄" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(parsed.is_null());
}
