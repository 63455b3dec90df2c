//! Candidate session domain model.
//!
//! `CandidateSession` is owned and mutated exclusively by the conversation
//! state machine. Every other component (validator, question generator,
//! store) receives read-only context or explicit inputs and returns values.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Conversation states. Closed set — the machine matches exhaustively, so a
/// new state fails to compile until every transition handles it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionState {
    Greeting,
    CollectName,
    CollectEmail,
    CollectPhone,
    CollectExperience,
    CollectPosition,
    CollectLocation,
    CollectTechStack,
    TechAssessment,
    WrapUp,
    Completed,
    EndedByUser,
}

impl SessionState {
    /// Terminal states accept no further input.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Completed | SessionState::EndedByUser)
    }

    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Greeting => "GREETING",
            SessionState::CollectName => "COLLECT_NAME",
            SessionState::CollectEmail => "COLLECT_EMAIL",
            SessionState::CollectPhone => "COLLECT_PHONE",
            SessionState::CollectExperience => "COLLECT_EXPERIENCE",
            SessionState::CollectPosition => "COLLECT_POSITION",
            SessionState::CollectLocation => "COLLECT_LOCATION",
            SessionState::CollectTechStack => "COLLECT_TECH_STACK",
            SessionState::TechAssessment => "TECH_ASSESSMENT",
            SessionState::WrapUp => "WRAP_UP",
            SessionState::Completed => "COMPLETED",
            SessionState::EndedByUser => "ENDED_BY_USER",
        }
    }
}

/// Identity and contact data collected one field per state.
/// Fields hold validator-normalized values only; a rejected input never
/// touches the profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub years_experience: Option<u8>,
    pub desired_position: Option<String>,
    pub location: Option<String>,
}

/// One question/answer pair within a technology's assessment.
/// `follow_up_asked` marks the exchange whose answer triggered a follow-up.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exchange {
    pub question: String,
    pub answer: String,
    pub follow_up_asked: bool,
}

/// Assessment record for a single declared technology.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechAssessment {
    pub technology: String,
    pub exchanges: Vec<Exchange>,
}

/// Position within the technical-assessment loop: which technology is being
/// assessed, whether its single allowed follow-up has been issued, and the
/// question that was asked but not yet answered.
#[derive(Debug, Clone, Default)]
pub struct AssessmentCursor {
    pub tech_index: usize,
    pub awaiting_follow_up: bool,
    pub pending_question: Option<String>,
}

/// One screening conversation.
#[derive(Debug, Clone)]
pub struct CandidateSession {
    pub session_id: Uuid,
    pub state: SessionState,
    pub profile: CandidateProfile,
    pub tech_stack: Vec<String>,
    pub assessment: Vec<TechAssessment>,
    pub cursor: AssessmentCursor,
    pub exit_requested: bool,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl CandidateSession {
    pub fn new() -> Self {
        Self {
            session_id: Uuid::new_v4(),
            state: SessionState::Greeting,
            profile: CandidateProfile::default(),
            tech_stack: Vec::new(),
            assessment: Vec::new(),
            cursor: AssessmentCursor::default(),
            exit_requested: false,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    /// Technology currently under assessment, if the cursor is in range.
    pub fn current_technology(&self) -> Option<&str> {
        self.tech_stack
            .get(self.cursor.tech_index)
            .map(String::as_str)
    }

    /// Persisted completion status: sessions cut short by the exit keyword
    /// are saved as partial records.
    pub fn status_label(&self) -> &'static str {
        if self.exit_requested {
            "partial"
        } else {
            "complete"
        }
    }
}

impl Default for CandidateSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_starts_in_greeting() {
        let session = CandidateSession::new();
        assert_eq!(session.state, SessionState::Greeting);
        assert!(!session.exit_requested);
        assert!(session.completed_at.is_none());
        assert!(session.tech_stack.is_empty());
    }

    #[test]
    fn test_terminal_states() {
        assert!(SessionState::Completed.is_terminal());
        assert!(SessionState::EndedByUser.is_terminal());
        assert!(!SessionState::Greeting.is_terminal());
        assert!(!SessionState::TechAssessment.is_terminal());
        assert!(!SessionState::WrapUp.is_terminal());
    }

    #[test]
    fn test_state_names_are_screaming_snake() {
        assert_eq!(SessionState::CollectTechStack.name(), "COLLECT_TECH_STACK");
        assert_eq!(SessionState::EndedByUser.name(), "ENDED_BY_USER");
        // serde uses the same spelling
        let json = serde_json::to_string(&SessionState::CollectName).unwrap();
        assert_eq!(json, r#""COLLECT_NAME""#);
    }

    #[test]
    fn test_status_label_follows_exit_flag() {
        let mut session = CandidateSession::new();
        assert_eq!(session.status_label(), "complete");
        session.exit_requested = true;
        assert_eq!(session.status_label(), "partial");
    }

    #[test]
    fn test_current_technology_respects_cursor() {
        let mut session = CandidateSession::new();
        assert_eq!(session.current_technology(), None);
        session.tech_stack = vec!["Python".to_string(), "Go".to_string()];
        session.cursor.tech_index = 1;
        assert_eq!(session.current_technology(), Some("Go"));
        session.cursor.tech_index = 2;
        assert_eq!(session.current_technology(), None);
    }
}
