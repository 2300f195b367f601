//! Mock attendance backend for testing
//!
//! Wraps a wiremock server that simulates the attendance REST API under an
//! `/api` prefix, the same way the real deployment mounts it.

use serde_json::{json, Value};
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};
use Presensi::config::Settings;

pub struct BackendMockServer {
    pub server: MockServer,
}

impl BackendMockServer {
    pub async fn new() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Base URL to configure the client with
    pub fn base_url(&self) -> String {
        format!("{}/api", self.server.uri())
    }

    /// Default settings pointing at this server, credentials in `credentials_path`
    pub fn settings(&self, credentials_path: &str) -> Settings {
        let mut settings = Settings::default();
        settings.api.base_url = self.base_url();
        settings.api.timeout_seconds = 5;
        settings.auth.credentials_path = credentials_path.to_string();
        settings
    }

    /// Respond to `verb /api{route}` with a JSON body, expecting `calls` requests
    pub async fn mock_json(&self, verb: &str, route: &str, status: u16, body: Value, calls: u64) {
        Mock::given(method(verb))
            .and(path(format!("/api{}", route)))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .expect(calls)
            .mount(&self.server)
            .await;
    }

    /// Scan endpoint accepting the submission
    pub async fn mock_scan_success(&self, message: &str, calls: u64) {
        self.mock_json(
            "POST",
            "/student/qr/scan",
            200,
            json!({
                "message": message,
                "student_name": "Budi Santoso",
                "subject": "Math",
                "teacher": "Pak Agus",
                "scan_time": "2025-03-07T08:05:00Z"
            }),
            calls,
        )
        .await;
    }

    /// Scan endpoint rejecting the submission with an `{error}` body
    pub async fn mock_scan_error(&self, status: u16, error: &str, calls: u64) {
        self.mock_json("POST", "/student/qr/scan", status, json!({ "error": error }), calls).await;
    }

    /// Bodies of every request received so far on `route`
    pub async fn request_bodies(&self, route: &str) -> Vec<Value> {
        let full_path = format!("/api{}", route);
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|r| r.url.path() == full_path)
            .filter_map(|r| serde_json::from_slice(&r.body).ok())
            .collect()
    }

    /// Total number of requests received, on any route
    pub async fn request_count(&self) -> usize {
        self.server.received_requests().await.map(|r| r.len()).unwrap_or_default()
    }
}
