use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;

/// Authenticated identity issued by the identity provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub user_id: String,
    pub email: String,
}

/// Owner of the current session. Only the identity adapter and the
/// startup restore path write through this.
#[derive(Clone)]
pub struct SessionState {
    tx: Arc<watch::Sender<Option<Session>>>,
}

impl SessionState {
    pub fn new(initial: Option<Session>) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    /// Replace the current session
    pub fn set(&self, session: Session) {
        tracing::debug!(email = %session.email, "session established");
        self.tx.send_replace(Some(session));
    }

    /// Drop the current session
    pub fn clear(&self) {
        tracing::debug!("session cleared");
        self.tx.send_replace(None);
    }

    /// Hand out a read-only view for controllers
    pub fn handle(&self) -> SessionHandle {
        SessionHandle {
            rx: self.tx.subscribe(),
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(None)
    }
}

/// Read-only, reactive view of the session
#[derive(Clone)]
pub struct SessionHandle {
    rx: watch::Receiver<Option<Session>>,
}

impl SessionHandle {
    /// Snapshot of the current session, if any
    pub fn current(&self) -> Option<Session> {
        self.rx.borrow().clone()
    }

    pub fn is_signed_in(&self) -> bool {
        self.rx.borrow().is_some()
    }

    /// Wait until the session changes. Returns `false` once the owner is gone.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }

    /// Treat the current value as observed so `changed` waits for the next one
    pub fn mark_seen(&mut self) {
        self.rx.borrow_and_update();
    }
}

#[cfg(test)]
pub(crate) fn test_session() -> Session {
    Session {
        access_token: "token-abc".to_string(),
        refresh_token: Some("refresh-abc".to_string()),
        user_id: "user-1".to_string(),
        email: "student@example.com".to_string(),
    }
}
