//! Session resolver integration tests against a loopback mock backend:
//! portal/role compatibility, response-shape tolerance, probe ordering and
//! the startup bootstrap policy.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use base64::Engine;
use serde_json::json;
use tempfile::tempdir;

use tohpitoh::api::ApiClient;
use tohpitoh::error::AppError;
use tohpitoh::session::{Bootstrap, Portal, Role, SessionResolver};
use tohpitoh::store::{ClientStore, TOKEN_KEY};

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/api/v1", addr)
}

fn resolver_at(base: &str, dir: &std::path::Path) -> SessionResolver {
    let api = ApiClient::new(reqwest::Url::parse(base).unwrap());
    SessionResolver::new(api, ClientStore::open(dir).unwrap())
}

fn bearer_with(claims: &serde_json::Value) -> String {
    let payload = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("hdr.{}.sig", payload)
}

#[tokio::test]
async fn login_role_compatibility_matrix() {
    for wire in ["patient", "doctor", "laboratory", "admin", "user"] {
        let body = json!({"token": "t-matrix", "role": wire});
        let app = Router::new().route(
            "/api/v1/jwt/auth",
            post(move || {
                let body = body.clone();
                async move { Json(body) }
            }),
        );
        let base = serve(app).await;
        for portal in Portal::ALL {
            let tmp = tempdir().unwrap();
            let mut r = resolver_at(&base, tmp.path());
            let result = r.login("a@b.c", "pw", portal).await;
            let expect_ok = matches!(
                (portal, wire),
                (Portal::Admin, "admin")
                    | (Portal::Patient, "patient")
                    | (Portal::Patient, "user")
                    | (Portal::Doctor, "doctor")
                    | (Portal::Laboratory, "laboratory")
            );
            assert_eq!(result.is_ok(), expect_ok, "portal={} resolved={}", portal, wire);
            if !expect_ok {
                let err = result.unwrap_err();
                assert!(matches!(err, AppError::Auth { .. }), "portal={} resolved={}", portal, wire);
            }
        }
    }
}

#[tokio::test]
async fn superuser_flag_in_data_wrapper_resolves_admin() {
    // login response {accessToken, data:{is_superuser}} against the admin portal
    let app = Router::new().route(
        "/api/v1/jwt/auth",
        post(|| async { Json(json!({"accessToken": "t1", "data": {"is_superuser": true, "email": "root@x.y"}})) }),
    );
    let base = serve(app).await;
    let tmp = tempdir().unwrap();
    let store = ClientStore::open(tmp.path()).unwrap();
    let mut r = resolver_at(&base, tmp.path());

    let session = r.login("root@x.y", "pw", Portal::Admin).await.unwrap().clone();
    assert_eq!(session.role, Role::Admin);
    assert_eq!(session.token.as_deref(), Some("t1"));
    assert_eq!(store.get(TOKEN_KEY).unwrap().as_deref(), Some("t1"));
}

#[tokio::test]
async fn flat_doctor_response_is_rejected_by_patient_portal() {
    let app = Router::new().route(
        "/api/v1/jwt/auth",
        post(|| async { Json(json!({"token": "t2", "role": "doctor"})) }),
    );
    let base = serve(app).await;
    let tmp = tempdir().unwrap();
    let store = ClientStore::open(tmp.path()).unwrap();
    let mut r = resolver_at(&base, tmp.path());

    let err = r.login("doc@x.y", "pw", Portal::Patient).await.unwrap_err();
    assert!(err.message().contains("role mismatch"), "got: {}", err.message());
    // the failed attempt must not touch the session or the store
    assert!(!r.session().is_authenticated());
    assert_eq!(r.session().role, Role::Unknown);
    assert_eq!(store.get(TOKEN_KEY).unwrap(), None);
}

#[tokio::test]
async fn missing_token_field_fails_without_side_effects() {
    let app = Router::new().route("/api/v1/jwt/auth", post(|| async { Json(json!({"status": "ok"})) }));
    let base = serve(app).await;
    let tmp = tempdir().unwrap();
    let store = ClientStore::open(tmp.path()).unwrap();
    let mut r = resolver_at(&base, tmp.path());

    let err = r.login("a@b.c", "pw", Portal::Patient).await.unwrap_err();
    assert!(matches!(err, AppError::Auth { .. }));
    assert!(err.message().contains("missing token"));
    assert_eq!(store.get(TOKEN_KEY).unwrap(), None);
}

#[tokio::test]
async fn rejected_credentials_surface_backend_message() {
    let app = Router::new().route(
        "/api/v1/jwt/auth",
        post(|| async { (StatusCode::UNAUTHORIZED, Json(json!({"message": "bad credentials"}))) }),
    );
    let base = serve(app).await;
    let tmp = tempdir().unwrap();
    let mut r = resolver_at(&base, tmp.path());

    let err = r.login("a@b.c", "nope", Portal::Patient).await.unwrap_err();
    assert!(matches!(err, AppError::Auth { .. }));
    assert_eq!(err.message(), "bad credentials");
    assert!(!r.session().is_authenticated());
}

#[tokio::test]
async fn probe_order_doctor_wins_over_laboratory() {
    // no inline user in the auth response forces the probe scan
    let lab_hits = Arc::new(AtomicUsize::new(0));
    let lh = lab_hits.clone();
    let app = Router::new()
        .route("/api/v1/jwt/auth", post(|| async { Json(json!({"accessToken": "tok-probe"})) }))
        .route("/api/v1/admin/statistics", get(|| async { StatusCode::NOT_FOUND }))
        .route(
            "/api/v1/doctors/profile/me",
            get(|| async {
                Json(json!({"user": {"id": 9, "email": "doc@x.y", "first_name": "Greg", "last_name": "House"}}))
            }),
        )
        .route(
            "/api/v1/laboratories/profile/me",
            get(move || {
                let lh = lh.clone();
                async move {
                    lh.fetch_add(1, Ordering::SeqCst);
                    Json(json!({"id": 1}))
                }
            }),
        );
    let base = serve(app).await;
    let tmp = tempdir().unwrap();
    let mut r = resolver_at(&base, tmp.path());

    let session = r.login("doc@x.y", "pw", Portal::Doctor).await.unwrap().clone();
    assert_eq!(session.role, Role::Doctor);
    assert_eq!(session.profile.email.as_deref(), Some("doc@x.y"));
    assert_eq!(session.profile.first_name.as_deref(), Some("Greg"));
    assert_eq!(lab_hits.load(Ordering::SeqCst), 0, "laboratory probe must not fire after the doctor match");
}

#[tokio::test]
async fn forbidden_probe_counts_as_admin_match_with_blank_profile() {
    // 403 on the first probe claims the admin role even though the stats
    // endpoint refused; an undecodable token leaves the profile blank
    let app = Router::new()
        .route("/api/v1/jwt/auth", post(|| async { Json(json!({"key": "opaque-token"})) }))
        .route("/api/v1/admin/statistics", get(|| async { StatusCode::FORBIDDEN }));
    let base = serve(app).await;
    let tmp = tempdir().unwrap();
    let mut r = resolver_at(&base, tmp.path());

    let session = r.login("root@x.y", "pw", Portal::Admin).await.unwrap().clone();
    assert_eq!(session.role, Role::Admin);
    assert_eq!(session.profile.id, None);
    assert_eq!(session.profile.email, None);
}

#[tokio::test]
async fn login_resolves_patient_via_probes_and_loads_records() {
    let app = Router::new()
        .route("/api/v1/jwt/auth", post(|| async { Json(json!({"access": "tok-pat"})) }))
        .route("/api/v1/admin/statistics", get(|| async { StatusCode::UNAUTHORIZED }))
        .route("/api/v1/doctors/profile/me", get(|| async { StatusCode::UNAUTHORIZED }))
        .route("/api/v1/laboratories/profile/me", get(|| async { StatusCode::UNAUTHORIZED }))
        .route(
            "/api/v1/patients/profile",
            get(|| async {
                Json(json!({"data": {
                    "id": 12,
                    "email": "pat@x.y",
                    "first_name": "Ada",
                    "last_name": "Lovelace",
                    "blood_type": "O+",
                    "allergies": "pollen, penicillin"
                }}))
            }),
        )
        .route(
            "/api/v1/patients/medical-records",
            get(|| async { Json(json!({"records": [{"id": 1}, {"id": 2}]})) }),
        );
    let base = serve(app).await;
    let tmp = tempdir().unwrap();
    let mut r = resolver_at(&base, tmp.path());

    let session = r.login("pat@x.y", "pw", Portal::Patient).await.unwrap().clone();
    assert_eq!(session.role, Role::Patient);
    let details = session.profile.patient.expect("patient details");
    assert_eq!(details.blood_type.as_deref(), Some("O+"));
    assert_eq!(details.allergies.as_deref(), Some("pollen, penicillin"));
    assert_eq!(r.records().len(), 2);
}

#[tokio::test]
async fn admin_probe_match_synthesizes_profile_from_token_claims() {
    let token = bearer_with(&json!({"sub": 42, "email": "root@x.y"}));
    let tmp = tempdir().unwrap();
    let store = ClientStore::open(tmp.path()).unwrap();
    store.set(TOKEN_KEY, &token).unwrap();

    let app = Router::new().route("/api/v1/admin/statistics", get(|| async { Json(json!({"users": 3})) }));
    let base = serve(app).await;
    let mut r = resolver_at(&base, tmp.path());

    let outcome = r.bootstrap().await.unwrap();
    assert_eq!(outcome, Bootstrap::Established(Role::Admin));
    assert_eq!(r.session().profile.id.as_deref(), Some("42"));
    assert_eq!(r.session().profile.email.as_deref(), Some("root@x.y"));
}

#[tokio::test]
async fn bootstrap_clears_token_only_when_every_probe_answers_401() {
    let unauthorized = Router::new()
        .route("/api/v1/admin/statistics", get(|| async { StatusCode::UNAUTHORIZED }))
        .route("/api/v1/doctors/profile/me", get(|| async { StatusCode::UNAUTHORIZED }))
        .route("/api/v1/laboratories/profile/me", get(|| async { StatusCode::UNAUTHORIZED }))
        .route("/api/v1/patients/profile", get(|| async { StatusCode::UNAUTHORIZED }));
    let base = serve(unauthorized).await;
    let tmp = tempdir().unwrap();
    let store = ClientStore::open(tmp.path()).unwrap();
    store.set(TOKEN_KEY, "stale-token").unwrap();
    let mut r = resolver_at(&base, tmp.path());

    let outcome = r.bootstrap().await.unwrap();
    assert_eq!(outcome, Bootstrap::TokenRejected);
    assert!(!r.session().is_authenticated());
    assert_eq!(store.get(TOKEN_KEY).unwrap(), None, "rejected token must be cleared");
}

#[tokio::test]
async fn bootstrap_tolerates_unreachable_backend_as_unknown_role() {
    // nothing listens on the discard port; every probe fails at transport
    // level, which is not a 401 from the token and must not force logout
    let tmp = tempdir().unwrap();
    let store = ClientStore::open(tmp.path()).unwrap();
    store.set(TOKEN_KEY, "still-valid-maybe").unwrap();
    let mut r = resolver_at("http://127.0.0.1:9/api/v1", tmp.path());

    let outcome = r.bootstrap().await.unwrap();
    assert_eq!(outcome, Bootstrap::Established(Role::Unknown));
    assert!(r.session().is_authenticated(), "session downgrades instead of dying");
    assert_eq!(r.session().profile.email.as_deref(), Some("unknown@user"));
    assert_eq!(store.get(TOKEN_KEY).unwrap().as_deref(), Some("still-valid-maybe"));
}

#[tokio::test]
async fn logout_then_fresh_bootstrap_is_unauthenticated() {
    let app = Router::new().route(
        "/api/v1/jwt/auth",
        post(|| async { Json(json!({"token": "t-out", "role": "patient"})) }),
    );
    let base = serve(app).await;
    let tmp = tempdir().unwrap();
    let mut r = resolver_at(&base, tmp.path());
    r.login("pat@x.y", "pw", Portal::Patient).await.unwrap();
    assert!(r.session().is_authenticated());

    r.logout().unwrap();
    assert!(!r.session().is_authenticated());
    assert_eq!(r.session().role, Role::Unknown);
    assert!(r.records().is_empty());

    // a fresh process start finds nothing
    let mut fresh = resolver_at(&base, tmp.path());
    assert_eq!(fresh.bootstrap().await.unwrap(), Bootstrap::NoSession);
    assert!(!fresh.session().is_authenticated());
}

#[tokio::test]
async fn registration_success_and_rejection() {
    use tohpitoh::session::RegistrationForm;

    let app = Router::new().route(
        "/api/v1/jwt/register",
        post(|Json(body): Json<serde_json::Value>| async move {
            if body["email"] == "taken@x.y" {
                return (StatusCode::CONFLICT, Json(json!({"message": "email already registered"})));
            }
            (StatusCode::CREATED, Json(json!({"status": "created"})))
        }),
    );
    let base = serve(app).await;
    let tmp = tempdir().unwrap();
    let r = resolver_at(&base, tmp.path());

    let mut form = RegistrationForm {
        email: "new@x.y".into(),
        password: "pw".into(),
        first_name: "Ada".into(),
        last_name: "Lovelace".into(),
        phone: "+229".into(),
        license_number: "LIC-1".into(),
        ..RegistrationForm::default()
    };
    r.register(&form, Portal::Laboratory).await.unwrap();

    form.email = "taken@x.y".into();
    let err = r.register(&form, Portal::Laboratory).await.unwrap_err();
    assert!(matches!(err, AppError::Auth { .. }));
    assert_eq!(err.message(), "email already registered");
}
