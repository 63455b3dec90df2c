use std::sync::Arc;

use crate::screening::questions::QuestionGenerator;
use crate::screening::registry::SessionRegistry;
use crate::screening::store::CandidateStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Pluggable question generator. Default: LLM-backed with static fallbacks.
    pub generator: Arc<dyn QuestionGenerator>,
    /// Persistence adapter — encrypts PII before anything reaches storage.
    pub store: Arc<dyn CandidateStore>,
    /// Live conversations, one lock per session.
    pub sessions: Arc<SessionRegistry>,
}
