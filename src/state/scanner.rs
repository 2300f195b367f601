//! QR scanner state machine
//!
//! ```text
//! Idle --start--> Scanning --valid decode--> Submitting --done--> Result
//!  ^                 |  \--malformed/expired decode-----------------^ |
//!  +-----cancel------+                                              |
//!  +---------------------------acknowledge--------------------------+
//! ```
//!
//! Only the transitions above are accepted; anything else is an
//! [`AttendanceError::InvalidStateTransition`].

use chrono::{DateTime, Utc};
use tracing::{debug, warn};
use crate::utils::errors::{ApiError, AttendanceError, Result};

/// Why a scan did not produce an attendance record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Payload could not be parsed or lacks required fields
    Malformed,
    /// Token validity window has passed
    Expired,
    /// Required local data was missing; nothing was sent
    Validation,
    /// Backend refused the submission
    Server,
    /// Transport failure or timeout
    Network,
    /// Credentials were refused; the user is logged out
    Unauthorized,
}

impl From<&ApiError> for RejectReason {
    fn from(error: &ApiError) -> Self {
        match error {
            ApiError::Network(_) | ApiError::Timeout => RejectReason::Network,
            ApiError::Validation(_) => RejectReason::Validation,
            ApiError::Unauthorized(_) => RejectReason::Unauthorized,
            ApiError::Rejected { .. } | ApiError::InvalidResponse(_) => RejectReason::Server,
        }
    }
}

/// Final result of one scan attempt, shown until acknowledged
#[derive(Debug, Clone, PartialEq)]
pub enum ScanOutcome {
    Success {
        message: String,
        subject: String,
        teacher: String,
        scanned_at: DateTime<Utc>,
    },
    Rejected {
        reason: RejectReason,
        message: String,
    },
}

impl ScanOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ScanOutcome::Success { .. })
    }

    pub fn message(&self) -> &str {
        match self {
            ScanOutcome::Success { message, .. } => message,
            ScanOutcome::Rejected { message, .. } => message,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum ScanState {
    #[default]
    Idle,
    Scanning,
    Submitting,
    Result(ScanOutcome),
}

impl ScanState {
    pub fn name(&self) -> &'static str {
        match self {
            ScanState::Idle => "idle",
            ScanState::Scanning => "scanning",
            ScanState::Submitting => "submitting",
            ScanState::Result(_) => "result",
        }
    }
}

/// Owns the current [`ScanState`] and enforces legal transitions
#[derive(Debug, Default)]
pub struct ScannerMachine {
    state: ScanState,
    frame_errors: u32,
}

impl ScannerMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ScanState {
        &self.state
    }

    pub fn is_scanning(&self) -> bool {
        matches!(self.state, ScanState::Scanning)
    }

    /// Decode errors reported by the camera since the last `start()`
    pub fn frame_errors(&self) -> u32 {
        self.frame_errors
    }

    /// Idle -> Scanning
    pub fn start(&mut self) -> Result<()> {
        self.transition(ScanState::Scanning)?;
        self.frame_errors = 0;
        Ok(())
    }

    /// Scanning -> Idle
    pub fn cancel(&mut self) -> Result<()> {
        self.transition(ScanState::Idle)
    }

    /// Per-frame decode failure; logged, state unchanged
    pub fn frame_error(&mut self, message: &str) -> Result<()> {
        if !self.is_scanning() {
            return Err(self.invalid("frame_error"));
        }
        self.frame_errors += 1;
        debug!(frame_errors = self.frame_errors, "QR frame not decoded: {}", message);
        Ok(())
    }

    /// Scanning -> Submitting
    pub fn begin_submit(&mut self) -> Result<()> {
        self.transition(ScanState::Submitting)
    }

    /// Scanning or Submitting -> Result
    ///
    /// A successful outcome is only accepted from Submitting.
    pub fn finish(&mut self, outcome: ScanOutcome) -> Result<()> {
        self.transition(ScanState::Result(outcome))
    }

    /// Result -> Idle
    pub fn acknowledge(&mut self) -> Result<()> {
        self.transition(ScanState::Idle)
    }

    fn transition(&mut self, to: ScanState) -> Result<()> {
        let allowed = match (&self.state, &to) {
            (ScanState::Idle, ScanState::Scanning) => true,
            (ScanState::Scanning, ScanState::Idle) => true,
            (ScanState::Scanning, ScanState::Submitting) => true,
            (ScanState::Scanning, ScanState::Result(outcome)) => !outcome.is_success(),
            (ScanState::Submitting, ScanState::Result(_)) => true,
            (ScanState::Result(_), ScanState::Idle) => true,
            _ => false,
        };

        if !allowed {
            warn!(from = self.state.name(), to = to.name(), "Rejected scanner state transition");
            return Err(self.invalid(to.name()));
        }

        debug!(from = self.state.name(), to = to.name(), "Scanner state transition");
        self.state = to;
        Ok(())
    }

    fn invalid(&self, to: &str) -> AttendanceError {
        AttendanceError::InvalidStateTransition {
            from: self.state.name().to_string(),
            to: to.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn rejected(reason: RejectReason) -> ScanOutcome {
        ScanOutcome::Rejected { reason, message: "QR Code sudah expired".to_string() }
    }

    fn success() -> ScanOutcome {
        ScanOutcome::Success {
            message: "Presensi berhasil!".to_string(),
            subject: "Math".to_string(),
            teacher: "Pak Budi".to_string(),
            scanned_at: Utc::now(),
        }
    }

    #[test]
    fn test_successful_scan_cycle() {
        let mut machine = ScannerMachine::new();
        machine.start().unwrap();
        machine.frame_error("no QR code found").unwrap();
        assert_eq!(machine.frame_errors(), 1);
        assert!(machine.is_scanning());

        machine.begin_submit().unwrap();
        machine.finish(success()).unwrap();
        assert_matches!(machine.state(), ScanState::Result(ScanOutcome::Success { .. }));

        machine.acknowledge().unwrap();
        assert_eq!(machine.state(), &ScanState::Idle);
    }

    #[test]
    fn test_local_reject_skips_submitting() {
        let mut machine = ScannerMachine::new();
        machine.start().unwrap();
        machine.finish(rejected(RejectReason::Expired)).unwrap();
        assert_matches!(
            machine.state(),
            ScanState::Result(ScanOutcome::Rejected { reason: RejectReason::Expired, .. })
        );
    }

    #[test]
    fn test_success_requires_submission() {
        let mut machine = ScannerMachine::new();
        machine.start().unwrap();
        assert_matches!(machine.finish(success()), Err(AttendanceError::InvalidStateTransition { .. }));
        assert!(machine.is_scanning());
    }

    #[test]
    fn test_illegal_transitions() {
        let mut machine = ScannerMachine::new();
        assert_matches!(machine.acknowledge(), Err(AttendanceError::InvalidStateTransition { .. }));
        assert_matches!(machine.begin_submit(), Err(AttendanceError::InvalidStateTransition { .. }));
        assert_matches!(machine.frame_error("x"), Err(AttendanceError::InvalidStateTransition { .. }));

        machine.start().unwrap();
        assert_matches!(machine.start(), Err(AttendanceError::InvalidStateTransition { .. }));

        machine.begin_submit().unwrap();
        assert_matches!(machine.cancel(), Err(AttendanceError::InvalidStateTransition { .. }));
        assert_matches!(machine.begin_submit(), Err(AttendanceError::InvalidStateTransition { .. }));
    }

    #[test]
    fn test_cancel_returns_to_idle() {
        let mut machine = ScannerMachine::new();
        machine.start().unwrap();
        machine.cancel().unwrap();
        assert_eq!(machine.state(), &ScanState::Idle);
    }

    #[test]
    fn test_reject_reason_from_api_error() {
        assert_eq!(RejectReason::from(&ApiError::Timeout), RejectReason::Network);
        assert_eq!(
            RejectReason::from(&ApiError::Rejected { status: 400, message: "x".to_string() }),
            RejectReason::Server
        );
        assert_eq!(
            RejectReason::from(&ApiError::Unauthorized(String::new())),
            RejectReason::Unauthorized
        );
    }
}
