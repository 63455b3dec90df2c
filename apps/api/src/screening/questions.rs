//! Question generation — builds prompts from accumulated candidate context,
//! calls the LLM, and decides whether an answer warrants a follow-up.
//!
//! The generator holds no session state; all context arrives per call. A
//! failed or timed-out generation call never reaches the state machine: the
//! generator answers from a static per-technology fallback bank instead, so
//! the conversation cannot stall on a downstream outage.
//!
//! The follow-up decision is a pluggable policy behind the `FollowUpPolicy`
//! trait. `AppState` carries the generator as `Arc<dyn QuestionGenerator>`,
//! so tests drive the machine with scripted implementations.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::llm_client::prompts::SCREENING_SYSTEM;
use crate::llm_client::LlmClient;
use crate::models::candidate::Exchange;
use crate::screening::prompts::{FOLLOW_UP_TEMPLATE, PRIMARY_QUESTION_TEMPLATE};

/// Read-only context for one generation call.
pub struct QuestionContext<'a> {
    pub technology: &'a str,
    pub years_experience: u8,
    pub desired_position: &'a str,
    /// Prior Q/A pairs for this technology, oldest first.
    pub prior_exchanges: &'a [Exchange],
}

#[async_trait]
pub trait QuestionGenerator: Send + Sync {
    /// Produces the primary question for the context's technology.
    /// Infallible by contract: implementations fall back internally.
    async fn primary_question(&self, ctx: &QuestionContext<'_>) -> String;

    /// Decides whether `prior_answer` warrants a follow-up and, if so,
    /// produces it. `None` means "move on".
    async fn follow_up(&self, ctx: &QuestionContext<'_>, prior_answer: &str) -> Option<String>;
}

// ────────────────────────────────────────────────────────────────────────────
// Follow-up policy
// ────────────────────────────────────────────────────────────────────────────

/// Pluggable "was that answer shallow?" heuristic.
/// Carried by the generator; swap the implementation to change the policy
/// without touching the machine.
pub trait FollowUpPolicy: Send + Sync {
    fn wants_follow_up(&self, answer: &str) -> bool;
}

/// Answers the candidate uses to decline a question. Never worth probing.
const SKIP_MARKERS: &[&str] = &[
    "skip",
    "pass",
    "i don't know",
    "i dont know",
    "no idea",
    "not sure",
    "next",
];

/// Default policy: an answer under the word threshold is shallow and gets
/// one follow-up, unless it is a recognized skip.
pub struct BrevityPolicy {
    pub min_words: usize,
}

impl Default for BrevityPolicy {
    fn default() -> Self {
        Self { min_words: 12 }
    }
}

impl FollowUpPolicy for BrevityPolicy {
    fn wants_follow_up(&self, answer: &str) -> bool {
        let lowered = answer.trim().to_lowercase();
        if SKIP_MARKERS.contains(&lowered.as_str()) {
            return false;
        }
        lowered.split_whitespace().count() < self.min_words
    }
}

// ────────────────────────────────────────────────────────────────────────────
// LLM-backed generator
// ────────────────────────────────────────────────────────────────────────────

pub struct LlmQuestionGenerator {
    llm: LlmClient,
    policy: Arc<dyn FollowUpPolicy>,
}

impl LlmQuestionGenerator {
    pub fn new(llm: LlmClient, policy: Arc<dyn FollowUpPolicy>) -> Self {
        Self { llm, policy }
    }
}

#[async_trait]
impl QuestionGenerator for LlmQuestionGenerator {
    async fn primary_question(&self, ctx: &QuestionContext<'_>) -> String {
        let prompt = build_primary_prompt(ctx);
        match self.llm.call_text(&prompt, SCREENING_SYSTEM).await {
            Ok(question) => {
                debug!("Generated primary question for {}", ctx.technology);
                question
            }
            Err(e) => {
                warn!(
                    "Question generation for {} failed ({e}); using fallback",
                    ctx.technology
                );
                fallback_question(ctx.technology)
            }
        }
    }

    async fn follow_up(&self, ctx: &QuestionContext<'_>, prior_answer: &str) -> Option<String> {
        if !self.policy.wants_follow_up(prior_answer) {
            return None;
        }

        let prompt = FOLLOW_UP_TEMPLATE
            .replace("{technology}", ctx.technology)
            .replace("{answer}", prior_answer);

        match self.llm.call_text(&prompt, SCREENING_SYSTEM).await {
            Ok(question) => Some(question),
            Err(e) => {
                warn!(
                    "Follow-up generation for {} failed ({e}); using fallback",
                    ctx.technology
                );
                Some(fallback_follow_up(ctx.technology))
            }
        }
    }
}

fn build_primary_prompt(ctx: &QuestionContext<'_>) -> String {
    let history = if ctx.prior_exchanges.is_empty() {
        "(none yet)".to_string()
    } else {
        ctx.prior_exchanges
            .iter()
            .rev()
            .take(2)
            .rev()
            .map(|ex| format!("Q: {}\nA: {}", ex.question, ex.answer))
            .collect::<Vec<_>>()
            .join("\n")
    };

    PRIMARY_QUESTION_TEMPLATE
        .replace("{technology}", ctx.technology)
        .replace("{level}", experience_band(ctx.years_experience))
        .replace("{years}", &ctx.years_experience.to_string())
        .replace(
            "{position}",
            if ctx.desired_position.is_empty() {
                "a technical role"
            } else {
                ctx.desired_position
            },
        )
        .replace("{history}", &history)
}

/// Experience band used to pitch question difficulty.
pub fn experience_band(years: u8) -> &'static str {
    match years {
        0..=2 => "Junior",
        3..=5 => "Mid-Level",
        6..=10 => "Senior",
        _ => "Principal/Staff",
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Static fallback bank
// ────────────────────────────────────────────────────────────────────────────

/// Safe question used when the generation service is unavailable.
pub fn fallback_question(technology: &str) -> String {
    match technology.to_lowercase().as_str() {
        "python" => "How does Python manage memory, and when can reference cycles become a problem?".to_string(),
        "rust" => "Explain ownership and borrowing in Rust and the kinds of bugs they prevent.".to_string(),
        "go" => "How do goroutines differ from OS threads, and when would you reach for channels?".to_string(),
        "javascript" => "Explain how the JavaScript event loop schedules callbacks, promises, and timers.".to_string(),
        "java" => "What happens during JVM garbage collection, and how can it affect a latency-sensitive service?".to_string(),
        "sql" | "postgresql" | "mysql" => "When would you add an index to a table, and what does it cost you?".to_string(),
        "react" => "What causes unnecessary re-renders in React, and how do you avoid them?".to_string(),
        "docker" => "What is the difference between a Docker image and a container, and how do layers affect build time?".to_string(),
        "kubernetes" => "What problem do Kubernetes deployments solve compared to running pods directly?".to_string(),
        _ => format!(
            "What do you consider the most important concept to master in {technology}, and why?"
        ),
    }
}

fn fallback_follow_up(technology: &str) -> String {
    format!(
        "Could you walk me through the implementation details or trade-offs behind what you just described in {technology}?"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brevity_policy_flags_short_answers() {
        let policy = BrevityPolicy::default();
        // Scenario: a 3-word answer warrants a follow-up
        assert!(policy.wants_follow_up("Lists are mutable"));
        assert!(!policy.wants_follow_up(
            "Python lists are mutable ordered sequences while tuples are immutable, \
             which makes tuples safe to use as dictionary keys"
        ));
    }

    #[test]
    fn test_brevity_policy_ignores_skips() {
        let policy = BrevityPolicy::default();
        assert!(!policy.wants_follow_up("skip"));
        assert!(!policy.wants_follow_up("  I don't know  "));
        assert!(!policy.wants_follow_up("PASS"));
    }

    #[test]
    fn test_brevity_threshold_is_configurable() {
        let strict = BrevityPolicy { min_words: 3 };
        assert!(strict.wants_follow_up("two words"));
        assert!(!strict.wants_follow_up("three whole words"));
    }

    #[test]
    fn test_experience_bands() {
        assert_eq!(experience_band(0), "Junior");
        assert_eq!(experience_band(2), "Junior");
        assert_eq!(experience_band(3), "Mid-Level");
        assert_eq!(experience_band(5), "Mid-Level");
        assert_eq!(experience_band(10), "Senior");
        assert_eq!(experience_band(25), "Principal/Staff");
    }

    #[test]
    fn test_fallback_bank_covers_known_and_unknown() {
        assert!(fallback_question("Python").contains("memory"));
        assert!(fallback_question("RUST").contains("ownership"));
        let generic = fallback_question("Cobol");
        assert!(generic.contains("Cobol"));
    }

    #[test]
    fn test_primary_prompt_includes_context() {
        let exchanges = vec![Exchange {
            question: "What is a slice?".to_string(),
            answer: "A view into an array".to_string(),
            follow_up_asked: false,
        }];
        let ctx = QuestionContext {
            technology: "Go",
            years_experience: 4,
            desired_position: "Backend Developer",
            prior_exchanges: &exchanges,
        };
        let prompt = build_primary_prompt(&ctx);
        assert!(prompt.contains("Go"));
        assert!(prompt.contains("Mid-Level"));
        assert!(prompt.contains("Backend Developer"));
        assert!(prompt.contains("What is a slice?"));
        assert!(!prompt.contains("{technology}"));
        assert!(!prompt.contains("{history}"));
    }

    #[test]
    fn test_primary_prompt_without_history() {
        let ctx = QuestionContext {
            technology: "Python",
            years_experience: 0,
            desired_position: "",
            prior_exchanges: &[],
        };
        let prompt = build_primary_prompt(&ctx);
        assert!(prompt.contains("(none yet)"));
        assert!(prompt.contains("a technical role"));
        assert!(prompt.contains("Junior"));
    }

    #[tokio::test]
    async fn test_generator_falls_back_when_service_unreachable() {
        // Scenario: the generation service times out → the static fallback
        // question for the current technology is returned, not an error.
        let llm = LlmClient::new(
            "test-key".to_string(),
            "test-model".to_string(),
            "http://127.0.0.1:9",
            std::time::Duration::from_millis(200),
        );
        let generator = LlmQuestionGenerator::new(llm, Arc::new(BrevityPolicy::default()));
        let ctx = QuestionContext {
            technology: "Rust",
            years_experience: 3,
            desired_position: "Systems Engineer",
            prior_exchanges: &[],
        };

        let question = generator.primary_question(&ctx).await;
        assert_eq!(question, fallback_question("Rust"));

        let follow_up = generator.follow_up(&ctx, "short answer").await;
        assert_eq!(follow_up, Some(fallback_follow_up("Rust")));
    }
}
