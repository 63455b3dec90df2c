use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::candidate::{CandidateSession, SessionState};
use crate::screening::machine;
use crate::state::AppState;

/// Inputs longer than this are rejected before they reach the machine.
const MAX_MESSAGE_CHARS: usize = 8_000;

#[derive(Serialize)]
pub struct SessionCreatedResponse {
    pub session_id: Uuid,
    pub reply: String,
    pub state: SessionState,
}

#[derive(Deserialize)]
pub struct MessageRequest {
    pub text: String,
}

#[derive(Serialize)]
pub struct TurnResponse {
    pub reply: String,
    pub state: SessionState,
    pub is_terminal: bool,
}

#[derive(Serialize)]
pub struct TechProgress {
    pub technology: String,
    pub questions_answered: usize,
    pub is_current: bool,
}

#[derive(Serialize)]
pub struct SessionProgressResponse {
    pub session_id: Uuid,
    pub state: SessionState,
    pub is_terminal: bool,
    pub completion_percent: u8,
    pub technologies: Vec<TechProgress>,
}

/// POST /api/v1/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
) -> Result<Json<SessionCreatedResponse>, AppError> {
    let session_id = state.sessions.create().await;
    tracing::info!("Created screening session {session_id}");
    Ok(Json(SessionCreatedResponse {
        session_id,
        reply: machine::OPENING_PROMPT.to_string(),
        state: SessionState::Greeting,
    }))
}

/// POST /api/v1/sessions/:id/messages
///
/// One user turn: forwards the utterance into the state machine and returns
/// the next prompt. The per-session lock is held for the whole turn, so a
/// second message for the same session waits for this transition to finish.
pub async fn handle_post_message(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<MessageRequest>,
) -> Result<Json<TurnResponse>, AppError> {
    if req.text.chars().count() > MAX_MESSAGE_CHARS {
        return Err(AppError::Validation(format!(
            "Message exceeds {MAX_MESSAGE_CHARS} characters"
        )));
    }

    let handle = state
        .sessions
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))?;

    let mut session = handle.lock().await;
    let turn = machine::advance(
        &mut session,
        &req.text,
        state.generator.as_ref(),
        state.store.as_ref(),
    )
    .await?;

    Ok(Json(TurnResponse {
        reply: turn.reply,
        state: turn.state,
        is_terminal: turn.is_terminal,
    }))
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionProgressResponse>, AppError> {
    let handle = state
        .sessions
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))?;

    let session = handle.lock().await;
    Ok(Json(build_progress(&session)))
}

fn build_progress(session: &CandidateSession) -> SessionProgressResponse {
    let technologies = session
        .assessment
        .iter()
        .enumerate()
        .map(|(i, a)| TechProgress {
            technology: a.technology.clone(),
            questions_answered: a.exchanges.len(),
            is_current: session.state == SessionState::TechAssessment
                && i == session.cursor.tech_index,
        })
        .collect();

    SessionProgressResponse {
        session_id: session.session_id,
        state: session.state,
        is_terminal: session.state.is_terminal(),
        completion_percent: completion_percent(session),
        technologies,
    }
}

/// Rough completion estimate: profile collection is 60% of the screening,
/// the technical assessment the remaining 40%.
fn completion_percent(session: &CandidateSession) -> u8 {
    match session.state {
        SessionState::Completed | SessionState::EndedByUser | SessionState::WrapUp => 100,
        SessionState::TechAssessment => {
            let total = session.tech_stack.len().max(1);
            let done = session.cursor.tech_index.min(total);
            60 + ((done * 40) / total) as u8
        }
        _ => {
            let profile = &session.profile;
            let filled = [
                profile.name.is_some(),
                profile.email.is_some(),
                profile.phone.is_some(),
                profile.years_experience.is_some(),
                profile.desired_position.is_some(),
                profile.location.is_some(),
            ]
            .iter()
            .filter(|set| **set)
            .count();
            ((filled * 60) / 6) as u8
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::candidate::{Exchange, TechAssessment};

    #[test]
    fn test_completion_percent_empty_session() {
        let session = CandidateSession::new();
        assert_eq!(completion_percent(&session), 0);
    }

    #[test]
    fn test_completion_percent_grows_with_profile() {
        let mut session = CandidateSession::new();
        session.profile.name = Some("Jane Doe".to_string());
        session.profile.email = Some("jane@doe.com".to_string());
        session.profile.phone = Some("+15551234567".to_string());
        assert_eq!(completion_percent(&session), 30);
    }

    #[test]
    fn test_completion_percent_during_assessment() {
        let mut session = CandidateSession::new();
        session.state = SessionState::TechAssessment;
        session.tech_stack = vec!["Python".to_string(), "Go".to_string()];
        session.cursor.tech_index = 1;
        assert_eq!(completion_percent(&session), 80);
    }

    #[test]
    fn test_completion_percent_terminal_is_100() {
        let mut session = CandidateSession::new();
        session.state = SessionState::EndedByUser;
        assert_eq!(completion_percent(&session), 100);
    }

    #[test]
    fn test_progress_marks_current_technology() {
        let mut session = CandidateSession::new();
        session.state = SessionState::TechAssessment;
        session.tech_stack = vec!["Python".to_string(), "Go".to_string()];
        session.assessment = vec![
            TechAssessment {
                technology: "Python".to_string(),
                exchanges: vec![Exchange {
                    question: "Q".to_string(),
                    answer: "A".to_string(),
                    follow_up_asked: false,
                }],
            },
            TechAssessment {
                technology: "Go".to_string(),
                exchanges: vec![],
            },
        ];
        session.cursor.tech_index = 1;

        let progress = build_progress(&session);
        assert_eq!(progress.technologies.len(), 2);
        assert_eq!(progress.technologies[0].questions_answered, 1);
        assert!(!progress.technologies[0].is_current);
        assert!(progress.technologies[1].is_current);
    }
}
