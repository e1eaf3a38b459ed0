use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

use crate::session::{Session, SessionHandle};

/// Keeps the signed-in session on disk so logins survive restarts
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn load(&self) -> Result<Option<Session>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path).context("Failed to read session file")?;
        let session: Session =
            serde_json::from_str(&content).context("Failed to parse session file")?;
        Ok(Some(session))
    }

    pub fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).context("Failed to create session directory")?;
        }

        let content =
            serde_json::to_string_pretty(session).context("Failed to serialize session")?;
        fs::write(&self.path, content).context("Failed to write session file")?;
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path).context("Failed to remove session file")?;
        }
        Ok(())
    }

    /// Mirror every session change to disk until the session owner goes away
    pub fn spawn_persister(self, mut handle: SessionHandle) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            while handle.changed().await {
                let result = match handle.current() {
                    Some(session) => self.save(&session),
                    None => self.clear(),
                };
                if let Err(e) = result {
                    tracing::warn!(error = %e, "failed to persist session");
                }
            }
        })
    }
}
