//! Session store trait and the default in-memory implementation.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::entities::session::Session;

/// Owned, injectable storage for the current session.
///
/// Implementations may persist to a keychain or file; the contract is the
/// same: at most one session, replaced wholesale.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// The current session, if one is established.
    async fn load(&self) -> Option<Session>;

    /// Replace the current session.
    async fn save(&self, session: Session);

    /// Remove the current session, if any.
    async fn clear(&self);
}

/// Process-memory session store. Sessions do not survive a restart; use a
/// persistent [`SessionStore`] implementation where they should.
#[derive(Default)]
pub struct MemorySessionStore {
    session: RwLock<Option<Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self) -> Option<Session> {
        self.session.read().await.clone()
    }

    async fn save(&self, session: Session) {
        *self.session.write().await = Some(session);
    }

    async fn clear(&self) {
        *self.session.write().await = None;
    }
}
