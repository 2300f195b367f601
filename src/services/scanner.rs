//! QR scan-to-submit flow
//!
//! Drives the [`ScannerMachine`] for one device: decodes are parsed and
//! expiry-checked locally, and only tokens that pass both reach the scan
//! endpoint, exactly once per decode.

use std::sync::Arc;
use chrono::{DateTime, Utc};
use tracing::debug;
use crate::i18n::{I18n, TranslationParams};
use crate::models::{AttendanceSubmission, ScanReceipt, ScannedPayload};
use crate::state::{RejectReason, RequestContext, ScanOutcome, ScanState, ScannerMachine};
use crate::utils::errors::{Result, TokenError};
use crate::utils::helpers::generate_uuid;
use crate::utils::logging::{log_scan_attempt, log_scan_outcome};
use super::api::ApiClient;
use super::location::LocationResolver;

#[derive(Debug)]
pub struct QrScanner {
    api: ApiClient,
    location: LocationResolver,
    i18n: Arc<I18n>,
    language: String,
    machine: ScannerMachine,
}

impl QrScanner {
    pub fn new(api: ApiClient, location: LocationResolver, i18n: Arc<I18n>, language: impl Into<String>) -> Self {
        Self {
            api,
            location,
            i18n,
            language: language.into(),
            machine: ScannerMachine::new(),
        }
    }

    pub fn state(&self) -> &ScanState {
        self.machine.state()
    }

    pub fn start(&mut self) -> Result<()> {
        self.machine.start()
    }

    pub fn cancel(&mut self) -> Result<()> {
        self.machine.cancel()
    }

    pub fn frame_error(&mut self, message: &str) -> Result<()> {
        self.machine.frame_error(message)
    }

    /// Dismiss the shown result and return to Idle
    pub fn acknowledge(&mut self) -> Result<()> {
        self.machine.acknowledge()
    }

    /// Handle a decoded QR text
    pub async fn on_decoded(&mut self, ctx: &RequestContext, raw: &str) -> Result<Option<ScanOutcome>> {
        self.on_decoded_at(ctx, raw, Utc::now()).await
    }

    /// Handle a decoded QR text, checking expiry against `now`.
    ///
    /// Returns `None` when the decode was ignored because the scanner is not
    /// scanning; a decode that arrives while a submission is in flight never
    /// produces a second submission.
    pub async fn on_decoded_at(&mut self, ctx: &RequestContext, raw: &str, now: DateTime<Utc>) -> Result<Option<ScanOutcome>> {
        if !self.machine.is_scanning() {
            debug!(state = self.machine.state().name(), "Ignoring decode outside of scanning");
            return Ok(None);
        }

        let attempt_id = generate_uuid();
        log_scan_attempt(&attempt_id, raw.len());

        let payload = match ScannedPayload::parse_valid_at(raw, now) {
            Ok(payload) => payload,
            Err(error) => {
                let (reason, key) = match error {
                    TokenError::Expired { .. } => (RejectReason::Expired, "scanner.expired"),
                    TokenError::Malformed(_) | TokenError::MissingField(_) => (RejectReason::Malformed, "scanner.invalid"),
                };
                log_scan_outcome(&attempt_id, false, Some(&error.to_string()));
                let outcome = ScanOutcome::Rejected { reason, message: self.text(key, None) };
                self.machine.finish(outcome.clone())?;
                return Ok(Some(outcome));
            }
        };

        self.machine.begin_submit()?;

        let location = self.location.resolve().await;

        let Some(student_id) = ctx.student_id() else {
            log_scan_outcome(&attempt_id, false, Some("no student identity in request context"));
            let outcome = ScanOutcome::Rejected {
                reason: RejectReason::Validation,
                message: self.text("scanner.missing_student", None),
            };
            self.machine.finish(outcome.clone())?;
            return Ok(Some(outcome));
        };

        let submission = AttendanceSubmission {
            qr_data: raw.to_string(),
            student_id: student_id.to_string(),
            location,
        };

        let result = self
            .api
            .post::<_, ScanReceipt>(ctx, &["student", "qr", "scan"], Some(&submission))
            .await;

        let outcome = match result {
            Ok(receipt) => {
                log_scan_outcome(&attempt_id, true, Some(&payload.session_code));
                let mut params = TranslationParams::new();
                params.insert("message".to_string(), receipt.message.clone());

                ScanOutcome::Success {
                    message: self.text("scanner.success", Some(&params)),
                    subject: non_empty(receipt.subject).unwrap_or(payload.subject),
                    teacher: non_empty(receipt.teacher).unwrap_or(payload.teacher),
                    scanned_at: receipt.scan_time.unwrap_or(now),
                }
            }
            Err(error) => {
                log_scan_outcome(&attempt_id, false, Some(&error.to_string()));
                ScanOutcome::Rejected {
                    reason: RejectReason::from(&error),
                    message: error.user_message(&self.text("scanner.failed", None)),
                }
            }
        };

        self.machine.finish(outcome.clone())?;
        Ok(Some(outcome))
    }

    /// Subject and teacher lines shown under a successful scan
    pub fn success_detail(&self, subject: &str, teacher: &str) -> String {
        let mut params = TranslationParams::new();
        params.insert("subject".to_string(), subject.to_string());
        params.insert("teacher".to_string(), teacher.to_string());
        self.text("scanner.success_detail", Some(&params))
    }

    fn text(&self, key: &str, params: Option<&TranslationParams>) -> String {
        self.i18n.t(key, &self.language, params)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
