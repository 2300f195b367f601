//! Request-scoped credential context
//!
//! Every backend call takes a [`RequestContext`] explicitly instead of reading
//! a token from ambient storage. The context carries the bearer token and the
//! identity of the signed-in account.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use crate::models::{AuthResponse, UserType};
use crate::utils::errors::{AttendanceError, Result};

/// Claims the backend puts into its bearer tokens
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub user_id: u64,
    pub user_type: String,
    #[serde(default)]
    pub exp: Option<i64>,
}

/// Credentials of a signed-in account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    pub token: String,
    pub user_type: UserType,
    pub user_id: u64,
    /// School-issued student number; only set for students
    pub student_id: Option<String>,
    pub name: String,
}

impl Credentials {
    /// Build credentials from a login or registration response
    pub fn from_auth_response(response: &AuthResponse, user_type: UserType) -> Result<Self> {
        let user = response.user.as_object().ok_or_else(|| {
            AttendanceError::Authentication("Login response did not include a user".to_string())
        })?;

        let user_id = user
            .get("id")
            .and_then(serde_json::Value::as_u64)
            .ok_or_else(|| AttendanceError::Authentication("Login response user has no id".to_string()))?;

        let student_id = match user_type {
            UserType::Student => Some(
                user.get("student_id")
                    .and_then(serde_json::Value::as_str)
                    .filter(|s| !s.is_empty())
                    .ok_or_else(|| {
                        AttendanceError::Authentication("Student account has no student_id".to_string())
                    })?
                    .to_string(),
            ),
            UserType::Admin => None,
        };

        let name = user
            .get("name")
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default()
            .to_string();

        Ok(Self {
            token: response.token.clone(),
            user_type,
            user_id,
            student_id,
            name,
        })
    }

    /// Read the token claims without verifying the signature.
    ///
    /// The client never holds the signing key; this is only used to skip
    /// requests with a token that has visibly expired.
    pub fn claims(&self) -> Option<TokenClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        decode::<TokenClaims>(&self.token, &DecodingKey::from_secret(&[]), &validation)
            .map(|data| data.claims)
            .ok()
    }

    /// Whether the token's `exp` claim is in the past
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.claims()
            .and_then(|c| c.exp)
            .map(|exp| now.timestamp() >= exp)
            .unwrap_or(false)
    }
}

/// Credentials and identity passed into each API call
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    credentials: Option<Credentials>,
}

impl RequestContext {
    /// Context for unauthenticated endpoints (login, register)
    pub fn anonymous() -> Self {
        Self { credentials: None }
    }

    pub fn from_credentials(credentials: Credentials) -> Self {
        Self { credentials: Some(credentials) }
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    pub fn bearer_token(&self) -> Option<&str> {
        self.credentials.as_ref().map(|c| c.token.as_str())
    }

    pub fn student_id(&self) -> Option<&str> {
        self.credentials.as_ref().and_then(|c| c.student_id.as_deref())
    }

    pub fn user_type(&self) -> Option<UserType> {
        self.credentials.as_ref().map(|c| c.user_type)
    }

    pub fn is_authenticated(&self) -> bool {
        self.credentials.is_some()
    }
}
