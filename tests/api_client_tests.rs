//! REST client behavior against a loopback mock backend: empty-result
//! fallbacks for role-scoped lists, the medical-records short-circuit and
//! error message extraction from non-2xx bodies.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use serde_json::{json, Value};

use tohpitoh::api::{ApiClient, ProfessionalKind, ValidationAction};
use tohpitoh::error::AppError;
use tohpitoh::session::Role;

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/api/v1", addr)
}

fn client_at(base: &str) -> ApiClient {
    ApiClient::new(reqwest::Url::parse(base).unwrap())
}

#[tokio::test]
async fn medical_records_short_circuit_skips_the_network() {
    let hits = Arc::new(AtomicUsize::new(0));
    let h = hits.clone();
    let app = Router::new().route(
        "/api/v1/patients/medical-records",
        get(move || {
            let h = h.clone();
            async move {
                h.fetch_add(1, Ordering::SeqCst);
                Json(json!([{"id": 1}]))
            }
        }),
    );
    let base = serve(app).await;
    let api = client_at(&base);

    for role in [Role::Doctor, Role::Laboratory, Role::Admin, Role::Unknown] {
        assert!(api.medical_records("tok", role).await.is_empty(), "role={}", role);
    }
    assert_eq!(hits.load(Ordering::SeqCst), 0, "non-patient roles must not issue a request");

    assert_eq!(api.medical_records("tok", Role::Patient).await.len(), 1);
    assert_eq!(api.medical_records("tok", Role::User).await.len(), 1, "legacy alias fetches too");
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn forbidden_list_endpoints_fall_back_to_empty() {
    let app = Router::new()
        .route(
            "/api/v1/patients/medical-records",
            get(|| async { (StatusCode::FORBIDDEN, Json(json!({"message": "not a patient"}))) }),
        )
        .route("/api/v1/laboratories/tests", get(|| async { StatusCode::NOT_FOUND }));
    let base = serve(app).await;
    let api = client_at(&base);

    assert!(api.medical_records("tok", Role::Patient).await.is_empty());
    assert!(api.pending_tests("tok").await.is_empty());
    // an endpoint the mock does not serve at all behaves the same
    assert!(api.granted_accesses("tok").await.is_empty());
}

#[tokio::test]
async fn list_envelopes_are_unwrapped() {
    let app = Router::new()
        .route("/api/v1/doctors", get(|| async { Json(json!({"data": [{"id": 1}, {"id": 2}]})) }))
        .route(
            "/api/v1/patients/medical-records",
            get(|| async { Json(json!({"records": [{"id": 3}]})) }),
        );
    let base = serve(app).await;
    let api = client_at(&base);

    assert_eq!(api.doctor_directory("tok").await.len(), 2);
    assert_eq!(api.my_patients("tok").await.len(), 2);
    assert_eq!(api.medical_records("tok", Role::Patient).await.len(), 1);
}

#[tokio::test]
async fn error_messages_are_mined_from_bodies() {
    let app = Router::new()
        .route(
            "/api/v1/admin/statistics",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"message": "boom"}))) }),
        )
        .route(
            "/api/v1/admin/all-users",
            get(|| async { (StatusCode::BAD_GATEWAY, "upstream says no") }),
        )
        .route("/api/v1/admin/pending-validations", get(|| async { StatusCode::SERVICE_UNAVAILABLE }));
    let base = serve(app).await;
    let api = client_at(&base);

    let err = api.admin_statistics("tok").await.unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert_eq!(err.message(), "boom");

    let err = api.all_users("tok").await.unwrap_err();
    assert_eq!(err.status(), Some(502));
    assert_eq!(err.message(), "upstream says no");

    let err = api.pending_validations("tok").await.unwrap_err();
    assert_eq!(err.status(), Some(503));
    assert_eq!(err.message(), "HTTP error 503");
}

#[tokio::test]
async fn unreachable_backend_is_a_network_error() {
    let api = client_at("http://127.0.0.1:9/api/v1");
    let err = api.admin_statistics("tok").await.unwrap_err();
    assert!(matches!(err, AppError::Network { .. }));
}

#[tokio::test]
async fn start_test_sends_the_in_progress_transition() {
    let captured: Arc<Mutex<Option<Value>>> = Arc::new(Mutex::new(None));
    let c = captured.clone();
    let app = Router::new().route(
        "/api/v1/laboratories/update-exam-status",
        put(move |Json(body): Json<Value>| {
            let c = c.clone();
            async move {
                *c.lock().unwrap() = Some(body);
                Json(json!({"status": "ok"}))
            }
        }),
    );
    let base = serve(app).await;
    let api = client_at(&base);

    api.start_test("tok", 17).await.unwrap();
    let body = captured.lock().unwrap().clone().unwrap();
    assert_eq!(body, json!({"testId": 17, "status": "in_progress"}));
}

#[tokio::test]
async fn professional_validation_hits_the_kind_and_action_path() {
    let app = Router::new()
        .route("/api/v1/admin/doctors/7/approve", put(|| async { Json(json!({"status": "approved"})) }))
        .route(
            "/api/v1/admin/laboratories/3/reject",
            put(|| async { Json(json!({"status": "rejected"})) }),
        );
    let base = serve(app).await;
    let api = client_at(&base);

    let v = api
        .validate_professional("tok", ProfessionalKind::Doctor, 7, ValidationAction::Approve)
        .await
        .unwrap();
    assert_eq!(v["status"], "approved");

    let v = api
        .validate_professional("tok", ProfessionalKind::Laboratory, 3, ValidationAction::Reject)
        .await
        .unwrap();
    assert_eq!(v["status"], "rejected");
}
