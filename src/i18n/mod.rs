//! Internationalization module
//!
//! User-facing notices are shown in Indonesian by default, with English as
//! the alternative. Provides translation loading, language detection, message
//! formatting and pluralization.

pub mod loader;

// Re-export commonly used i18n components
pub use loader::{I18n, TranslationParams};
