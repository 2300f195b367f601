//! Services module
//!
//! This module contains the client-side business logic talking to the
//! attendance backend

pub mod admin;
pub mod api;
pub mod attendance;
pub mod auth;
pub mod issuer;
pub mod location;
pub mod relay;
pub mod scanner;

// Re-export commonly used services
pub use admin::AdminService;
pub use api::{ApiClient, MessageResponse};
pub use attendance::AttendanceService;
pub use auth::AuthService;
pub use issuer::{IssuedSession, SessionDraft, SessionIssuer};
pub use location::{LocationFix, LocationProvider, LocationResolver, StaticLocation, LOCATION_DENIED, GEOLOCATION_UNSUPPORTED};
pub use relay::{NotificationCenter, NotificationRelay, ReconnectPolicy, RelayEvent};
pub use scanner::QrScanner;

use std::sync::Arc;
use crate::config::settings::Settings;
use crate::i18n::I18n;
use crate::state::CredentialStore;
use crate::utils::errors::Result;

/// Service factory for creating and managing all services
#[derive(Debug, Clone)]
pub struct ServiceFactory {
    pub api: ApiClient,
    pub auth_service: AuthService,
    pub issuer: SessionIssuer,
    pub attendance_service: AttendanceService,
    pub admin_service: AdminService,
    pub relay: NotificationRelay,
    settings: Settings,
}

impl ServiceFactory {
    /// Create a new ServiceFactory with all services initialized
    pub fn new(settings: Settings) -> Result<Self> {
        let api = ApiClient::new(&settings.api)?;
        let store = CredentialStore::new(&settings.auth.credentials_path);

        let auth_service = AuthService::new(api.clone(), store);
        let issuer = SessionIssuer::new(api.clone(), &settings.session);
        let attendance_service = AttendanceService::new(api.clone());
        let admin_service = AdminService::new(api.clone());
        let relay = NotificationRelay::new(&settings.relay)?;

        Ok(Self {
            api,
            auth_service,
            issuer,
            attendance_service,
            admin_service,
            relay,
            settings,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Scanner for one device, using the platform fallback as location
    pub fn scanner(&self, i18n: Arc<I18n>, language: &str) -> QrScanner {
        let location = LocationResolver::new(&self.settings.scanner);
        QrScanner::new(self.api.clone(), location, i18n, language)
    }

    /// Notification center sized per the relay configuration
    pub fn notification_center(&self) -> NotificationCenter {
        NotificationCenter::new(self.settings.relay.capacity)
    }
}
