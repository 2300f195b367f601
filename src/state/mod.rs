//! State management module
//!
//! This module holds client-side state: the request credential context,
//! persisted credentials, the scanner state machine and the notification feed

pub mod context;
pub mod feed;
pub mod scanner;
pub mod storage;

// Re-export commonly used state components
pub use context::{Credentials, RequestContext, TokenClaims};
pub use feed::{Alert, AlertStyle, NotificationFeed, DEFAULT_FEED_CAPACITY};
pub use scanner::{RejectReason, ScanOutcome, ScanState, ScannerMachine};
pub use storage::CredentialStore;
