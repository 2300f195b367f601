//! Best-effort device location for scan submissions
//!
//! The location sent with a scan is a free-form string. Resolution never
//! fails: every problem maps to a fixed fallback text.

use std::sync::Arc;
use std::time::Duration;
use async_trait::async_trait;
use tracing::{debug, warn};
use crate::config::ScannerConfig;
use crate::utils::helpers::format_coordinates;

pub const LOCATION_DENIED: &str = "Location access denied";
pub const GEOLOCATION_UNSUPPORTED: &str = "Geolocation not supported";

/// Result of asking the platform for a position
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LocationFix {
    Coordinates { latitude: f64, longitude: f64 },
    Denied,
    Unsupported,
}

/// Source of the device position
#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn current_location(&self) -> LocationFix;
}

/// Provider that always answers with the same fix
#[derive(Debug, Clone, Copy)]
pub struct StaticLocation(pub LocationFix);

#[async_trait]
impl LocationProvider for StaticLocation {
    async fn current_location(&self) -> LocationFix {
        self.0
    }
}

#[derive(Clone)]
pub struct LocationResolver {
    provider: Option<Arc<dyn LocationProvider>>,
    timeout: Duration,
    fallback: String,
}

impl std::fmt::Debug for LocationResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocationResolver")
            .field("has_provider", &self.provider.is_some())
            .field("timeout", &self.timeout)
            .field("fallback", &self.fallback)
            .finish()
    }
}

impl LocationResolver {
    pub fn new(config: &ScannerConfig) -> Self {
        Self {
            provider: None,
            timeout: Duration::from_secs(config.location_timeout_seconds),
            fallback: config.platform_fallback.clone(),
        }
    }

    pub fn with_provider(mut self, provider: Arc<dyn LocationProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Location text to submit with a scan
    pub async fn resolve(&self) -> String {
        let Some(provider) = &self.provider else {
            return self.fallback.clone();
        };

        match tokio::time::timeout(self.timeout, provider.current_location()).await {
            Ok(LocationFix::Coordinates { latitude, longitude }) => {
                debug!(latitude, longitude, "Location resolved");
                format_coordinates(latitude, longitude)
            }
            Ok(LocationFix::Denied) => LOCATION_DENIED.to_string(),
            Ok(LocationFix::Unsupported) => GEOLOCATION_UNSUPPORTED.to_string(),
            Err(_) => {
                warn!(timeout_ms = self.timeout.as_millis() as u64, "Location lookup timed out");
                LOCATION_DENIED.to_string()
            }
        }
    }
}
