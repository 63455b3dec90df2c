//! In-memory session registry.
//!
//! Sessions live in memory for the duration of the conversation and are only
//! written to storage at a terminal transition. Each session sits behind its
//! own mutex: turns for one session are strictly sequential, while distinct
//! sessions proceed concurrently.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use uuid::Uuid;

use crate::models::candidate::CandidateSession;

type SharedSession = Arc<Mutex<CandidateSession>>;

#[derive(Default)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<Uuid, SharedSession>>,
}

impl SessionRegistry {
    /// Registers a fresh session and returns its id.
    pub async fn create(&self) -> Uuid {
        let session = CandidateSession::new();
        let id = session.session_id;
        self.sessions
            .lock()
            .await
            .insert(id, Arc::new(Mutex::new(session)));
        id
    }

    /// Looks up a session handle by id.
    pub async fn get(&self, id: Uuid) -> Option<SharedSession> {
        self.sessions.lock().await.get(&id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::candidate::SessionState;

    #[tokio::test]
    async fn test_create_then_get() {
        let registry = SessionRegistry::default();
        let id = registry.create().await;

        let handle = registry.get(id).await.expect("session should exist");
        let session = handle.lock().await;
        assert_eq!(session.session_id, id);
        assert_eq!(session.state, SessionState::Greeting);
    }

    #[tokio::test]
    async fn test_unknown_id_returns_none() {
        let registry = SessionRegistry::default();
        assert!(registry.get(Uuid::new_v4()).await.is_none());
    }

    #[tokio::test]
    async fn test_sessions_are_independent() {
        let registry = SessionRegistry::default();
        let a = registry.create().await;
        let b = registry.create().await;
        assert_ne!(a, b);

        let handle_a = registry.get(a).await.unwrap();
        handle_a.lock().await.exit_requested = true;

        let handle_b = registry.get(b).await.unwrap();
        assert!(!handle_b.lock().await.exit_requested);
    }
}
