//! Conversation State Machine — the heart of the screening service.
//!
//! Owns every `CandidateSession` mutation. One call to [`advance`] processes
//! one user turn: exit-keyword check, per-state validation and transition,
//! question-cursor management in the assessment loop, and persistence at the
//! terminal transitions.
//!
//! Flow: Greeting → CollectName → CollectEmail → CollectPhone →
//!       CollectExperience → CollectPosition → CollectLocation →
//!       CollectTechStack → TechAssessment (loop over stack) → WrapUp →
//!       Completed, with a side-transition to EndedByUser from any
//!       non-terminal state on an exit keyword.
//!
//! Validator rejections and generation failures are recovered in place
//! (re-prompt / fallback question). The only error this module returns is a
//! failed persistence at a terminal transition — the session stays terminal,
//! but unsaved, and the caller reports it distinctly from a re-prompt.

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::errors::AppError;
use crate::models::candidate::{
    AssessmentCursor, CandidateSession, Exchange, SessionState, TechAssessment,
};
use crate::screening::questions::{QuestionContext, QuestionGenerator};
use crate::screening::stack;
use crate::screening::store::CandidateStore;
use crate::screening::validation;

/// Exact tokens (case-insensitive, trimmed) that end the session early.
const EXIT_KEYWORDS: &[&str] = &["exit", "quit"];

/// Opening line shown when a session is created, before any user input.
pub const OPENING_PROMPT: &str = "Hello, and welcome! I'm the screening assistant. \
    I'll collect a few details and then ask some technical questions tailored to \
    your skills — it takes about 10-15 minutes. Send any message to begin, and \
    type \"exit\" at any point to stop.";

const GREETING_REPLY: &str = "Great, let's get started! First — what's your full name?";
const EMAIL_PROMPT: &str = "What's the best email address to reach you at?";
const PHONE_PROMPT: &str =
    "What's your phone number? Please include the country code, e.g. +1 555 123 4567.";
const EXPERIENCE_PROMPT: &str = "How many years of professional experience do you have?";
const POSITION_PROMPT: &str =
    "What kind of position are you looking for? (e.g. Backend Developer)";
const LOCATION_PROMPT: &str = "Where are you currently located? (City, Country)";
const STACK_PROMPT: &str = "Please list the languages, frameworks, databases and tools \
    you're proficient in (e.g. Python, React, PostgreSQL).";
const SESSION_CLOSED: &str = "This screening session is closed. Thanks again for your time!";

/// Result of one user turn.
#[derive(Debug, Clone)]
pub struct Turn {
    pub reply: String,
    pub state: SessionState,
    pub is_terminal: bool,
}

/// Processes one user utterance against the session.
///
/// The session is borrowed mutably for the whole turn; callers serialize
/// turns per session (the registry wraps each session in a mutex), so a new
/// input is only accepted once the previous transition has completed.
pub async fn advance(
    session: &mut CandidateSession,
    raw_input: &str,
    generator: &dyn QuestionGenerator,
    store: &dyn CandidateStore,
) -> Result<Turn, AppError> {
    let input = raw_input.trim();
    debug!(
        "Handling input for session {} in state {}",
        session.session_id,
        session.state.name()
    );

    if session.state.is_terminal() {
        return Ok(make_turn(session, SESSION_CLOSED.to_string()));
    }

    if EXIT_KEYWORDS.contains(&input.to_lowercase().as_str()) {
        let reply = end_by_user(session, store).await?;
        return Ok(make_turn(session, reply));
    }

    let reply = match session.state {
        SessionState::Greeting => greet(session),
        SessionState::CollectName => collect_name(session, input),
        SessionState::CollectEmail => collect_email(session, input),
        SessionState::CollectPhone => collect_phone(session, input),
        SessionState::CollectExperience => collect_experience(session, input),
        SessionState::CollectPosition => collect_position(session, input),
        SessionState::CollectLocation => collect_location(session, input),
        SessionState::CollectTechStack => collect_tech_stack(session, input, generator).await,
        SessionState::TechAssessment => assess(session, input, generator, store).await?,
        // WrapUp is transient — the stack-exhausting turn moves through it to
        // Completed. If a session ever rests here, finish it.
        SessionState::WrapUp => wrap_up(session, store).await?,
        SessionState::Completed | SessionState::EndedByUser => SESSION_CLOSED.to_string(),
    };

    Ok(make_turn(session, reply))
}

fn make_turn(session: &CandidateSession, reply: String) -> Turn {
    Turn {
        reply,
        state: session.state,
        is_terminal: session.state.is_terminal(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Collection states
// ────────────────────────────────────────────────────────────────────────────

fn greet(session: &mut CandidateSession) -> String {
    transition(session, SessionState::CollectName);
    GREETING_REPLY.to_string()
}

fn collect_name(session: &mut CandidateSession, input: &str) -> String {
    match validation::validate_name(input) {
        Ok(name) => {
            session.profile.name = Some(name.clone());
            transition(session, SessionState::CollectEmail);
            format!("Nice to meet you, {name}! {EMAIL_PROMPT}")
        }
        Err(e) => {
            warn!("Rejected name input ({})", e.label());
            format!(
                "That name doesn't look right ({}). Please give your full name, e.g. \"Jane Doe\".",
                e.label()
            )
        }
    }
}

fn collect_email(session: &mut CandidateSession, input: &str) -> String {
    match validation::validate_email(input) {
        Ok(email) => {
            session.profile.email = Some(email);
            transition(session, SessionState::CollectPhone);
            format!("Thanks! {PHONE_PROMPT}")
        }
        Err(e) => {
            warn!("Rejected email input ({})", e.label());
            format!(
                "That email doesn't look valid ({}). Please provide a deliverable address, e.g. jane.doe@mail.com.",
                e.label()
            )
        }
    }
}

fn collect_phone(session: &mut CandidateSession, input: &str) -> String {
    match validation::validate_phone(input) {
        Ok(phone) => {
            session.profile.phone = Some(phone);
            transition(session, SessionState::CollectExperience);
            format!("Got it. {EXPERIENCE_PROMPT}")
        }
        Err(e) => {
            warn!("Rejected phone input ({})", e.label());
            format!(
                "That phone number doesn't look valid ({}). Please include the country code, e.g. +1 555 123 4567.",
                e.label()
            )
        }
    }
}

fn collect_experience(session: &mut CandidateSession, input: &str) -> String {
    match validation::validate_experience(input) {
        Ok(years) => {
            session.profile.years_experience = Some(years);
            transition(session, SessionState::CollectPosition);
            format!("Great. {POSITION_PROMPT}")
        }
        Err(e) => {
            warn!("Rejected experience input ({})", e.label());
            format!(
                "I couldn't read that as years of experience ({}). Please give a whole number between 0 and 50.",
                e.label()
            )
        }
    }
}

fn collect_position(session: &mut CandidateSession, input: &str) -> String {
    match validation::validate_position(input) {
        Ok(position) => {
            session.profile.desired_position = Some(position);
            transition(session, SessionState::CollectLocation);
            format!("Noted. {LOCATION_PROMPT}")
        }
        Err(e) => {
            warn!("Rejected position input ({})", e.label());
            format!(
                "That looks {} — please describe the kind of position you're interested in.",
                e.label()
            )
        }
    }
}

fn collect_location(session: &mut CandidateSession, input: &str) -> String {
    match validation::validate_location(input) {
        Ok(location) => {
            session.profile.location = Some(location);
            transition(session, SessionState::CollectTechStack);
            format!("Almost there! {STACK_PROMPT}")
        }
        Err(e) => {
            warn!("Rejected location input ({})", e.label());
            format!(
                "I couldn't place that ({}). Please give a city and country, e.g. \"New Delhi, India\".",
                e.label()
            )
        }
    }
}

async fn collect_tech_stack(
    session: &mut CandidateSession,
    input: &str,
    generator: &dyn QuestionGenerator,
) -> String {
    let technologies = stack::parse_stack(input);
    if technologies.is_empty() {
        warn!("Could not parse any technologies from stack input");
        return "I couldn't pick out any technologies from that. Please list them \
                separated by commas, e.g. Python, React, PostgreSQL."
            .to_string();
    }

    session.assessment = technologies
        .iter()
        .map(|t| TechAssessment {
            technology: t.clone(),
            exchanges: Vec::new(),
        })
        .collect();
    session.tech_stack = technologies.clone();
    session.cursor = AssessmentCursor::default();
    transition(session, SessionState::TechAssessment);

    let first = technologies[0].clone();
    let question = primary_question_for(session, generator, 0, &first).await;
    session.cursor.pending_question = Some(question.clone());

    format!(
        "Perfect — we'll cover {}. Let's start with **{first}**:\n\n{question}",
        technologies.join(", ")
    )
}

// ────────────────────────────────────────────────────────────────────────────
// Technical assessment
// ────────────────────────────────────────────────────────────────────────────

async fn assess(
    session: &mut CandidateSession,
    input: &str,
    generator: &dyn QuestionGenerator,
    store: &dyn CandidateStore,
) -> Result<String, AppError> {
    let idx = session.cursor.tech_index;
    let Some(technology) = session.current_technology().map(String::from) else {
        return wrap_up(session, store).await;
    };

    // Pair the answer with the question that was pending for it.
    let question = session.cursor.pending_question.take().unwrap_or_default();
    session.assessment[idx].exchanges.push(Exchange {
        question,
        answer: input.to_string(),
        follow_up_asked: false,
    });
    info!(
        "Recorded answer for {technology} (exchange {})",
        session.assessment[idx].exchanges.len()
    );

    // At most one follow-up per technology, never nested.
    if !session.cursor.awaiting_follow_up {
        let follow_up = {
            let ctx = question_context(session, idx, &technology);
            generator.follow_up(&ctx, input).await
        };
        if let Some(question) = follow_up {
            if let Some(last) = session.assessment[idx].exchanges.last_mut() {
                last.follow_up_asked = true;
            }
            session.cursor.awaiting_follow_up = true;
            session.cursor.pending_question = Some(question.clone());
            info!("Asking follow-up for {technology}");
            return Ok(format!(
                "Thanks! A quick follow-up on {technology}:\n\n{question}"
            ));
        }
    }

    // Move on to the next technology, or wrap up when the stack is exhausted.
    session.cursor.tech_index += 1;
    session.cursor.awaiting_follow_up = false;
    let next_idx = session.cursor.tech_index;

    match session.tech_stack.get(next_idx).cloned() {
        Some(next_tech) => {
            let question = primary_question_for(session, generator, next_idx, &next_tech).await;
            session.cursor.pending_question = Some(question.clone());
            Ok(format!(
                "Great — that wraps up {technology}. Next up, **{next_tech}**:\n\n{question}"
            ))
        }
        None => wrap_up(session, store).await,
    }
}

async fn primary_question_for(
    session: &CandidateSession,
    generator: &dyn QuestionGenerator,
    idx: usize,
    technology: &str,
) -> String {
    let ctx = question_context(session, idx, technology);
    generator.primary_question(&ctx).await
}

fn question_context<'a>(
    session: &'a CandidateSession,
    idx: usize,
    technology: &'a str,
) -> QuestionContext<'a> {
    QuestionContext {
        technology,
        years_experience: session.profile.years_experience.unwrap_or(0),
        desired_position: session.profile.desired_position.as_deref().unwrap_or(""),
        prior_exchanges: &session.assessment[idx].exchanges,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Terminal transitions
// ────────────────────────────────────────────────────────────────────────────

async fn wrap_up(
    session: &mut CandidateSession,
    store: &dyn CandidateStore,
) -> Result<String, AppError> {
    transition(session, SessionState::WrapUp);
    let summary = closing_summary(session);

    transition(session, SessionState::Completed);
    if session.completed_at.is_none() {
        session.completed_at = Some(Utc::now());
    }
    store.persist(session).await?;
    info!("Session {} completed and persisted", session.session_id);

    Ok(summary)
}

async fn end_by_user(
    session: &mut CandidateSession,
    store: &dyn CandidateStore,
) -> Result<String, AppError> {
    info!("Exit requested for session {}", session.session_id);
    session.exit_requested = true;
    transition(session, SessionState::EndedByUser);
    if session.completed_at.is_none() {
        session.completed_at = Some(Utc::now());
    }
    store.persist(session).await?;

    Ok(match &session.profile.name {
        Some(name) => format!(
            "Thanks for your time, {name}! What you've shared so far has been saved \
             securely — our team will be in touch. Goodbye!"
        ),
        None => "Thanks for stopping by! Feel free to come back any time to complete \
                 the screening. Goodbye!"
            .to_string(),
    })
}

fn closing_summary(session: &CandidateSession) -> String {
    let techs = session.tech_stack.join(", ");
    match &session.profile.name {
        Some(name) => format!(
            "That completes the technical screening, {name}! We covered {techs}. \
             Your responses have been recorded securely, and our team will review \
             them and get back to you within a few business days. Thank you for \
             your time!"
        ),
        None => format!(
            "That completes the technical screening! We covered {techs}. Your \
             responses have been recorded securely. Thank you for your time!"
        ),
    }
}

fn transition(session: &mut CandidateSession, next: SessionState) {
    info!(
        "Session {}: {} -> {}",
        session.session_id,
        session.state.name(),
        next.name()
    );
    session.state = next;
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
