//! Authentication service
//!
//! Login, registration and profile lookup against the backend. Successful
//! logins are persisted through the [`CredentialStore`]; any unauthorized
//! response clears it (forced logout).

use tracing::{info, warn};
use crate::models::{Admin, AuthResponse, LoginRequest, Profile, Student, StudentRegisterRequest, UserType};
use crate::state::{CredentialStore, Credentials, RequestContext};
use crate::utils::errors::{ApiError, ApiResult, AttendanceError, Result};
use super::api::ApiClient;

#[derive(Debug, Clone)]
pub struct AuthService {
    api: ApiClient,
    store: CredentialStore,
}

impl AuthService {
    pub fn new(api: ApiClient, store: CredentialStore) -> Self {
        Self { api, store }
    }

    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    /// Log in as a student and persist the credentials
    pub async fn student_login(&self, email: &str, password: &str) -> Result<Credentials> {
        self.login(UserType::Student, email, password).await
    }

    /// Log in as an admin and persist the credentials
    pub async fn admin_login(&self, email: &str, password: &str) -> Result<Credentials> {
        self.login(UserType::Admin, email, password).await
    }

    async fn login(&self, user_type: UserType, email: &str, password: &str) -> Result<Credentials> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(ApiError::Validation("Email and password are required".to_string()).into());
        }

        let request = LoginRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
        };

        let user_segment = user_type.to_string();
        let response: AuthResponse = self
            .api
            .post(&RequestContext::anonymous(), &["auth", user_segment.as_str(), "login"], Some(&request))
            .await?;

        self.persist(response, user_type).await
    }

    /// Register a new student account and log it in
    pub async fn student_register(&self, request: &StudentRegisterRequest) -> Result<Credentials> {
        let required = [
            ("student_id", &request.student_id),
            ("name", &request.name),
            ("email", &request.email),
            ("password", &request.password),
            ("class", &request.class),
            ("grade", &request.grade),
        ];
        if let Some((field, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(ApiError::Validation(format!("{} is required", field)).into());
        }

        let response: AuthResponse = self
            .api
            .post(&RequestContext::anonymous(), &["auth", "student", "register"], Some(request))
            .await?;

        self.persist(response, UserType::Student).await
    }

    async fn persist(&self, response: AuthResponse, user_type: UserType) -> Result<Credentials> {
        let credentials = Credentials::from_auth_response(&response, user_type)?;
        self.store.save(&credentials).await?;
        info!(user_id = credentials.user_id, user_type = %user_type, "Logged in");
        Ok(credentials)
    }

    /// Fetch the signed-in account's profile
    pub async fn profile(&self, ctx: &RequestContext) -> Result<Profile> {
        let user_type = ctx
            .user_type()
            .ok_or_else(|| AttendanceError::Authentication("Not logged in".to_string()))?;

        let result = match user_type {
            UserType::Student => self
                .api
                .get::<Student>(ctx, &["profile"], &[])
                .await
                .map(Profile::Student),
            UserType::Admin => self
                .api
                .get::<Admin>(ctx, &["profile"], &[])
                .await
                .map(Profile::Admin),
        };

        self.guard(result).await
    }

    /// Load stored credentials and confirm them with the backend.
    ///
    /// Credentials refused by the backend are cleared. Transport failures
    /// are returned as errors and leave the stored credentials in place.
    pub async fn restore(&self) -> Result<Option<RequestContext>> {
        let Some(credentials) = self.store.load().await? else {
            return Ok(None);
        };

        let ctx = RequestContext::from_credentials(credentials);
        match self.profile(&ctx).await {
            Ok(_) => Ok(Some(ctx)),
            Err(AttendanceError::Api(e)) if e.is_transport() => Err(e.into()),
            Err(e) => {
                warn!(error = %e, "Stored credentials rejected, clearing");
                self.store.clear().await?;
                Ok(None)
            }
        }
    }

    /// Forget the stored credentials
    pub async fn logout(&self) -> Result<()> {
        self.store.clear().await
    }

    /// Clear stored credentials when the error demands a logout
    pub async fn handle_unauthorized(&self, error: &ApiError) -> Result<bool> {
        if error.requires_logout() {
            warn!(error = %error, "Backend refused credentials, logging out");
            self.store.clear().await?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Pass a backend result through, logging out on 401
    pub async fn guard<T>(&self, result: ApiResult<T>) -> Result<T> {
        match result {
            Ok(value) => Ok(value),
            Err(error) => {
                self.handle_unauthorized(&error).await?;
                Err(error.into())
            }
        }
    }
}
