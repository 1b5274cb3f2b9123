use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::SessionStore;
use crate::auth::Role;

/// On-disk shape of a saved session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SavedSession {
    pub token: Option<String>,
    pub role: Option<Role>,
    pub saved_at: Option<DateTime<Utc>>,
}

/// Session persisted as JSON, used by the command-line client
///
/// Every read goes back to disk so separate processes observe each other's
/// logins and logouts.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> anyhow::Result<SavedSession> {
        if !self.path.exists() {
            return Ok(SavedSession::default());
        }

        let content = fs::read_to_string(&self.path)?;
        let session: SavedSession = serde_json::from_str(&content)?;
        Ok(session)
    }

    pub fn save(&self, token: String, role: Role) -> anyhow::Result<()> {
        self.write(&SavedSession {
            token: Some(token),
            role: Some(role),
            saved_at: Some(Utc::now()),
        })
    }

    /// Remove both credential and role
    pub fn forget(&self) -> anyhow::Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }

    fn write(&self, session: &SavedSession) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(session)?;
        fs::write(&self.path, content)?;
        Ok(())
    }

    fn load_or_default(&self) -> SavedSession {
        self.load().unwrap_or_else(|e| {
            tracing::warn!("Ignoring unreadable session file {}: {}", self.path.display(), e);
            SavedSession::default()
        })
    }
}

impl SessionStore for FileSessionStore {
    fn credential(&self) -> Option<String> {
        self.load_or_default().token.filter(|t| !t.is_empty())
    }

    fn role(&self) -> Option<String> {
        self.load_or_default().role.map(|role| role.to_cookie_value())
    }

    fn clear_credential(&self) {
        let mut session = self.load_or_default();
        if session.token.take().is_none() {
            return;
        }
        if let Err(e) = self.write(&session) {
            tracing::error!("Failed to clear credential in {}: {}", self.path.display(), e);
        }
    }
}
