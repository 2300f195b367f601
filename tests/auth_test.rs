//! Integration tests for login, credential persistence and forced logout

mod helpers;

use assert_matches::assert_matches;
use helpers::*;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, ResponseTemplate};
use Presensi::models::{Profile, StudentRegisterRequest, UserType};
use Presensi::state::RequestContext;
use Presensi::utils::errors::{ApiError, AttendanceError};
use Presensi::ServiceFactory;

#[tokio::test]
async fn test_student_login_persists_credentials() {
    let backend = BackendMockServer::new().await;
    backend
        .mock_json(
            "POST",
            "/auth/student/login",
            200,
            json!({"token": "student-token", "user": student_json(7, "2024001")}),
            1,
        )
        .await;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("credentials.json");
    let services = ServiceFactory::new(backend.settings(&path.to_string_lossy())).unwrap();
    let auth = &services.auth_service;

    let credentials = auth.student_login("budi@example.com", "secret").await.unwrap();
    assert_eq!(credentials.user_type, UserType::Student);
    assert_eq!(credentials.student_id.as_deref(), Some("2024001"));

    let stored = auth.store().load().await.unwrap();
    assert_eq!(stored, Some(credentials));

    let bodies = backend.request_bodies("/auth/student/login").await;
    assert_eq!(bodies, vec![json!({"email": "budi@example.com", "password": "secret"})]);
}

#[tokio::test]
async fn test_failed_login_keeps_store_empty() {
    let backend = BackendMockServer::new().await;
    backend
        .mock_json("POST", "/auth/admin/login", 401, json!({"error": "Invalid credentials"}), 1)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("credentials.json");
    let services = ServiceFactory::new(backend.settings(&path.to_string_lossy())).unwrap();

    let result = services.auth_service.admin_login("admin@example.com", "wrong").await;
    assert_matches!(result, Err(AttendanceError::Api(ApiError::Unauthorized(ref m))) if m == "Invalid credentials");
    assert!(!path.exists());
}

#[tokio::test]
async fn test_profile_sends_bearer_token() {
    let backend = BackendMockServer::new().await;
    Mock::given(method("GET"))
        .and(path("/api/profile"))
        .and(header("Authorization", "Bearer student-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(student_json(7, "2024001")))
        .expect(1)
        .mount(&backend.server)
        .await;

    let services = ServiceFactory::new(backend.settings("unused.json")).unwrap();
    let profile = services.auth_service.profile(&student_context()).await.unwrap();

    assert_matches!(profile, Profile::Student(ref s) if s.student_id == "2024001");
    assert_eq!(profile.display_name(), "Budi Santoso");
}

#[tokio::test]
async fn test_unauthorized_response_clears_stored_credentials() {
    let backend = BackendMockServer::new().await;
    backend
        .mock_json("GET", "/admin/qr/sessions", 401, json!({"error": "Invalid token"}), 1)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("credentials.json");
    let services = ServiceFactory::new(backend.settings(&path.to_string_lossy())).unwrap();
    let auth = &services.auth_service;

    auth.store().save(&admin_credentials()).await.unwrap();
    assert!(path.exists());

    let ctx = RequestContext::from_credentials(admin_credentials());
    let result = auth.guard(services.issuer.list_active(&ctx).await).await;

    assert_matches!(result, Err(AttendanceError::Api(ApiError::Unauthorized(_))));
    assert!(!path.exists());
    assert!(auth.store().load().await.unwrap().is_none());
}

#[tokio::test]
async fn test_non_auth_errors_keep_credentials() {
    let backend = BackendMockServer::new().await;
    backend
        .mock_json("GET", "/admin/qr/sessions", 500, json!({"error": "Failed to fetch sessions"}), 1)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("credentials.json");
    let services = ServiceFactory::new(backend.settings(&path.to_string_lossy())).unwrap();
    let auth = &services.auth_service;

    auth.store().save(&admin_credentials()).await.unwrap();
    let result = auth.guard(services.issuer.list_active(&admin_context()).await).await;

    assert!(result.is_err());
    assert!(path.exists());
}

#[tokio::test]
async fn test_restore_clears_rejected_credentials() {
    let backend = BackendMockServer::new().await;
    backend
        .mock_json("GET", "/profile", 401, json!({"error": "Invalid token"}), 1)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("credentials.json");
    let services = ServiceFactory::new(backend.settings(&path.to_string_lossy())).unwrap();
    let auth = &services.auth_service;

    auth.store().save(&student_credentials()).await.unwrap();
    assert!(auth.restore().await.unwrap().is_none());
    assert!(!path.exists());
}

#[tokio::test]
async fn test_restore_returns_confirmed_context() {
    let backend = BackendMockServer::new().await;
    backend.mock_json("GET", "/profile", 200, student_json(7, "2024001"), 1).await;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("credentials.json");
    let services = ServiceFactory::new(backend.settings(&path.to_string_lossy())).unwrap();
    let auth = &services.auth_service;

    auth.store().save(&student_credentials()).await.unwrap();
    let ctx = auth.restore().await.unwrap().expect("credentials restored");
    assert_eq!(ctx.student_id(), Some("2024001"));
}

fn register_request() -> StudentRegisterRequest {
    StudentRegisterRequest {
        student_id: "2024001".to_string(),
        name: "Budi Santoso".to_string(),
        email: "budi@example.com".to_string(),
        password: "secret".to_string(),
        class: "XI-A".to_string(),
        grade: "11".to_string(),
        phone_number: None,
        address: None,
    }
}

#[tokio::test]
async fn test_register_requires_every_field_locally() {
    let backend = BackendMockServer::new().await;
    backend
        .mock_json(
            "POST",
            "/auth/student/register",
            201,
            json!({"token": "student-token", "user": student_json(7, "2024001")}),
            0,
        )
        .await;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("credentials.json");
    let services = ServiceFactory::new(backend.settings(&path.to_string_lossy())).unwrap();
    let auth = &services.auth_service;

    let mut no_class = register_request();
    no_class.class = "   ".to_string();
    assert_matches!(
        auth.student_register(&no_class).await,
        Err(AttendanceError::Api(ApiError::Validation(ref m))) if m.contains("class")
    );

    let mut no_password = register_request();
    no_password.password = String::new();
    assert_matches!(
        auth.student_register(&no_password).await,
        Err(AttendanceError::Api(ApiError::Validation(ref m))) if m.contains("password")
    );

    assert_eq!(backend.request_count().await, 0);
    assert!(!path.exists());
}

#[tokio::test]
async fn test_register_persists_credentials() {
    let backend = BackendMockServer::new().await;
    backend
        .mock_json(
            "POST",
            "/auth/student/register",
            201,
            json!({"token": "student-token", "user": student_json(7, "2024001")}),
            1,
        )
        .await;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("credentials.json");
    let services = ServiceFactory::new(backend.settings(&path.to_string_lossy())).unwrap();
    let auth = &services.auth_service;

    let credentials = auth.student_register(&register_request()).await.unwrap();
    assert_eq!(credentials.user_type, UserType::Student);
    assert_eq!(credentials.student_id.as_deref(), Some("2024001"));
    assert_eq!(auth.store().load().await.unwrap(), Some(credentials));

    let bodies = backend.request_bodies("/auth/student/register").await;
    assert_eq!(
        bodies,
        vec![json!({
            "student_id": "2024001",
            "name": "Budi Santoso",
            "email": "budi@example.com",
            "password": "secret",
            "class": "XI-A",
            "grade": "11"
        })]
    );
}
