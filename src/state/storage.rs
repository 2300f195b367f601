//! Credential storage implementation
//!
//! This module persists the signed-in account's credentials as a JSON file so
//! the CLI keeps its session between invocations. Expired tokens are removed
//! on load, and any unauthorized response clears the file.

use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn, info};
use crate::utils::errors::Result;
use super::context::Credentials;

/// File-backed credential store
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Save credentials, creating parent directories as needed
    pub async fn save(&self, credentials: &Credentials) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let serialized = serde_json::to_string_pretty(credentials)?;
        fs::write(&self.path, serialized).await?;

        debug!(path = %self.path.display(), user_type = %credentials.user_type, "Credentials saved");
        Ok(())
    }

    /// Load stored credentials.
    ///
    /// Returns `None` when nothing is stored, when the file is unreadable as
    /// credentials, or when the token has expired; the latter two also
    /// delete the file.
    pub async fn load(&self) -> Result<Option<Credentials>> {
        let data = match fs::read_to_string(&self.path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No stored credentials");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let credentials: Credentials = match serde_json::from_str(&data) {
            Ok(credentials) => credentials,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Stored credentials are corrupted, removing");
                self.clear().await?;
                return Ok(None);
            }
        };

        if credentials.is_expired_at(chrono::Utc::now()) {
            warn!(user_id = credentials.user_id, "Stored token has expired, removing");
            self.clear().await?;
            return Ok(None);
        }

        Ok(Some(credentials))
    }

    /// Remove stored credentials; a missing file is not an error
    pub async fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path).await {
            Ok(()) => {
                info!(path = %self.path.display(), "Credentials cleared");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
