//! Session token wire format
//!
//! The token is the flat JSON object rendered into the QR image:
//! `{session_code, subject, teacher, location, expires_at}` with `expires_at`
//! in Unix seconds. There is no version field and no signature; the checks
//! here are structural and temporal only, the backend re-validates.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use chrono::{DateTime, TimeZone, Utc};
use crate::utils::errors::TokenError;
use super::session::CreatedSession;

/// Token payload as produced by the issuer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionToken {
    pub session_code: String,
    pub subject: String,
    pub teacher: String,
    pub location: String,
    /// Unix seconds with millisecond precision
    #[serde(serialize_with = "serialize_seconds")]
    pub expires_at: f64,
}

/// Whole seconds go out as integers, anything finer as a decimal
fn serialize_seconds<S: Serializer>(secs: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if secs.fract() == 0.0 && secs.abs() < i64::MAX as f64 {
        serializer.serialize_i64(*secs as i64)
    } else {
        serializer.serialize_f64(*secs)
    }
}

impl SessionToken {
    /// JSON text to place inside the QR image
    pub fn encode(&self) -> String {
        // Plain struct of strings and a number; serialization cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }
}

impl From<&CreatedSession> for SessionToken {
    fn from(created: &CreatedSession) -> Self {
        Self {
            session_code: created.session_code.clone(),
            subject: created.subject.clone(),
            teacher: created.teacher.clone(),
            location: created.location.clone(),
            expires_at: created.expires_at.timestamp_millis() as f64 / 1000.0,
        }
    }
}

/// Structure decoded from a scanned token.
///
/// Transient: it lives only for the scan-to-submit round trip.
#[derive(Debug, Clone, PartialEq)]
pub struct ScannedPayload {
    pub session_code: String,
    pub subject: String,
    pub teacher: String,
    pub location: String,
    /// Unix seconds; may carry a fractional part
    pub expires_at: f64,
}

impl ScannedPayload {
    /// Parse raw scanner text and check that the required fields are present.
    ///
    /// A field counts as missing when it is absent, null, an empty string or
    /// a zero/non-numeric expiry. An expiry sent as a numeric string counts.
    pub fn parse(raw: &str) -> Result<Self, TokenError> {
        let value: Value = serde_json::from_str(raw)
            .map_err(|e| TokenError::Malformed(e.to_string()))?;

        let object = value
            .as_object()
            .ok_or_else(|| TokenError::Malformed("token is not a JSON object".to_string()))?;

        let session_code = match object.get("session_code") {
            Some(Value::String(code)) if !code.is_empty() => code.clone(),
            Some(Value::Number(n)) if n.as_f64() != Some(0.0) => n.to_string(),
            _ => return Err(TokenError::MissingField("session_code")),
        };

        let expires_at = match object.get("expires_at") {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        let expires_at = match expires_at {
            Some(secs) if secs != 0.0 && secs.is_finite() => secs,
            _ => return Err(TokenError::MissingField("expires_at")),
        };

        let text = |key: &str| {
            object
                .get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };

        Ok(Self {
            session_code,
            subject: text("subject"),
            teacher: text("teacher"),
            location: text("location"),
            expires_at,
        })
    }

    /// Absolute expiry instant, millisecond precision
    pub fn expires_at_instant(&self) -> DateTime<Utc> {
        let millis = (self.expires_at * 1000.0) as i64;
        Utc.timestamp_millis_opt(millis)
            .single()
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Reject the token when `now` is past `expires_at * 1000` milliseconds
    pub fn check_expiry(&self, now: DateTime<Utc>) -> Result<(), TokenError> {
        let expires_at_ms = (self.expires_at * 1000.0) as i64;
        if now.timestamp_millis() > expires_at_ms {
            return Err(TokenError::Expired { expires_at: self.expires_at_instant() });
        }
        Ok(())
    }

    /// Parse and expiry-check in one step
    pub fn parse_valid_at(raw: &str, now: DateTime<Utc>) -> Result<Self, TokenError> {
        let payload = Self::parse(raw)?;
        payload.check_expiry(now)?;
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::Duration;

    fn token_json(expires_at: i64) -> String {
        format!(
            r#"{{"session_code":"S1","subject":"Math","teacher":"Ms. X","location":"Room 1","expires_at":{}}}"#,
            expires_at
        )
    }

    #[test]
    fn test_encode_is_flat_json() {
        let token = SessionToken {
            session_code: "S1".to_string(),
            subject: "Math".to_string(),
            teacher: "Ms. X".to_string(),
            location: "Room 1".to_string(),
            expires_at: 1_700_000_000.0,
        };
        let encoded = token.encode();
        let value: Value = serde_json::from_str(&encoded).unwrap();
        assert_eq!(value.as_object().unwrap().len(), 5);
        assert_eq!(value["expires_at"], 1_700_000_000);
        assert_eq!(ScannedPayload::parse(&encoded).unwrap().session_code, "S1");
    }

    #[test]
    fn test_token_keeps_sub_second_expiry() {
        let created = CreatedSession {
            session_code: "S1".to_string(),
            qr_code: String::new(),
            expires_at: Utc.timestamp_millis_opt(1_700_000_000_750).unwrap(),
            subject: "Math".to_string(),
            teacher: "Ms. X".to_string(),
            location: "Room 1".to_string(),
        };
        let token = SessionToken::from(&created);
        assert_eq!(token.expires_at, 1_700_000_000.75);

        let payload = ScannedPayload::parse(&token.encode()).unwrap();
        assert_eq!(payload.expires_at_instant(), created.expires_at);
        assert!(payload.check_expiry(created.expires_at).is_ok());
        assert!(payload.check_expiry(created.expires_at + Duration::milliseconds(1)).is_err());
    }

    #[test]
    fn test_numeric_string_expiry_counts_as_present() {
        let payload = ScannedPayload::parse(r#"{"session_code":"S1","expires_at":"9999999999"}"#).unwrap();
        assert_eq!(payload.expires_at, 9_999_999_999.0);
        assert!(payload.check_expiry(Utc::now()).is_ok());

        assert_matches!(
            ScannedPayload::parse(r#"{"session_code":"S1","expires_at":"0"}"#),
            Err(TokenError::MissingField("expires_at"))
        );
    }

    #[test]
    fn test_parse_rejects_non_json() {
        assert_matches!(ScannedPayload::parse("https://example.com"), Err(TokenError::Malformed(_)));
        assert_matches!(ScannedPayload::parse("[1,2]"), Err(TokenError::Malformed(_)));
    }

    #[test]
    fn test_parse_requires_session_code_and_expiry() {
        assert_matches!(
            ScannedPayload::parse(r#"{"expires_at":1700000000}"#),
            Err(TokenError::MissingField("session_code"))
        );
        assert_matches!(
            ScannedPayload::parse(r#"{"session_code":"","expires_at":1700000000}"#),
            Err(TokenError::MissingField("session_code"))
        );
        assert_matches!(
            ScannedPayload::parse(r#"{"session_code":"S1"}"#),
            Err(TokenError::MissingField("expires_at"))
        );
        assert_matches!(
            ScannedPayload::parse(r#"{"session_code":"S1","expires_at":0}"#),
            Err(TokenError::MissingField("expires_at"))
        );
        assert_matches!(
            ScannedPayload::parse(r#"{"session_code":"S1","expires_at":"soon"}"#),
            Err(TokenError::MissingField("expires_at"))
        );
    }

    #[test]
    fn test_optional_fields_default_to_empty() {
        let payload = ScannedPayload::parse(r#"{"session_code":"S1","expires_at":1700000000}"#).unwrap();
        assert_eq!(payload.subject, "");
        assert_eq!(payload.teacher, "");
        assert_eq!(payload.location, "");
    }

    #[test]
    fn test_expiry_boundary() {
        let now = Utc::now();
        let past = ScannedPayload::parse(&token_json((now - Duration::seconds(10)).timestamp())).unwrap();
        assert_matches!(past.check_expiry(now), Err(TokenError::Expired { .. }));

        let future = ScannedPayload::parse(&token_json((now + Duration::seconds(600)).timestamp())).unwrap();
        assert!(future.check_expiry(now).is_ok());

        // Exactly at the expiry millisecond the token is still accepted.
        let exact = ScannedPayload::parse(&token_json(1_700_000_000)).unwrap();
        let at = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        assert!(exact.check_expiry(at).is_ok());
        assert!(exact.check_expiry(at + Duration::milliseconds(1)).is_err());
    }
}
