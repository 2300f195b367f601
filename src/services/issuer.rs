//! Attendance session issuer
//!
//! Creates time-boxed attendance sessions on the backend and encodes the
//! token that is rendered into the QR image.

use tracing::debug;
use crate::config::SessionConfig;
use crate::models::{AttendanceSession, CreateSessionRequest, CreatedSession, SessionDuration, SessionList, SessionReport, SessionToken};
use crate::state::RequestContext;
use crate::utils::errors::{ApiError, ApiResult};
use crate::utils::logging::log_session_issued;
use super::api::{ApiClient, MessageResponse};

/// Session details as entered by the admin, before validation
#[derive(Debug, Clone, Default)]
pub struct SessionDraft {
    pub subject: String,
    pub teacher: String,
    pub location: String,
    pub duration_minutes: u32,
}

/// A created session together with its QR payload
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub session: CreatedSession,
    pub token: SessionToken,
    /// Exact text to encode into the QR image
    pub payload: String,
}

#[derive(Debug, Clone)]
pub struct SessionIssuer {
    api: ApiClient,
    allowed_durations: Vec<SessionDuration>,
}

impl SessionIssuer {
    pub fn new(api: ApiClient, config: &SessionConfig) -> Self {
        let allowed_durations = config
            .allowed_durations
            .iter()
            .filter_map(|m| SessionDuration::from_minutes(*m).ok())
            .collect();

        Self { api, allowed_durations }
    }

    pub fn allowed_durations(&self) -> &[SessionDuration] {
        &self.allowed_durations
    }

    /// Check a draft locally and turn it into a creation request
    pub fn validate(&self, draft: &SessionDraft) -> ApiResult<CreateSessionRequest> {
        for (field, value) in [
            ("subject", &draft.subject),
            ("teacher", &draft.teacher),
            ("location", &draft.location),
        ] {
            if value.trim().is_empty() {
                return Err(ApiError::Validation(format!("{} is required", field)));
            }
        }

        let duration = SessionDuration::from_minutes(draft.duration_minutes)?;
        if !self.allowed_durations.contains(&duration) {
            return Err(ApiError::Validation(format!(
                "Session duration of {} is not allowed",
                duration
            )));
        }

        Ok(CreateSessionRequest {
            subject: draft.subject.trim().to_string(),
            teacher: draft.teacher.trim().to_string(),
            location: draft.location.trim().to_string(),
            duration,
        })
    }

    /// Create a session; invalid drafts never reach the network
    pub async fn issue(&self, ctx: &RequestContext, draft: &SessionDraft) -> ApiResult<IssuedSession> {
        let request = self.validate(draft)?;

        let session: CreatedSession = self
            .api
            .post(ctx, &["admin", "qr", "generate"], Some(&request))
            .await?;

        let token = SessionToken::from(&session);
        let payload = token.encode();

        log_session_issued(&session.session_code, &session.subject, request.duration.minutes());

        Ok(IssuedSession { session, token, payload })
    }

    /// Sessions that are still active on the backend
    pub async fn list_active(&self, ctx: &RequestContext) -> ApiResult<Vec<AttendanceSession>> {
        let list: SessionList = self.api.get(ctx, &["admin", "qr", "sessions"], &[]).await?;
        debug!(count = list.sessions.len(), "Fetched active sessions");
        Ok(list.sessions)
    }

    /// End a session before its expiry
    pub async fn deactivate(&self, ctx: &RequestContext, session_code: &str) -> ApiResult<MessageResponse> {
        if session_code.trim().is_empty() {
            return Err(ApiError::Validation("session_code is required".to_string()));
        }
        self.api
            .put::<(), _>(ctx, &["admin", "qr", "sessions", session_code.trim(), "deactivate"], None)
            .await
    }

    /// Students who scanned into a session
    pub async fn report(&self, ctx: &RequestContext, session_code: &str) -> ApiResult<SessionReport> {
        if session_code.trim().is_empty() {
            return Err(ApiError::Validation("session_code is required".to_string()));
        }
        self.api
            .get(ctx, &["admin", "qr", "sessions", session_code.trim(), "report"], &[])
            .await
    }
}
