// LLM prompt constants for the question generator.
// Cross-cutting fragments live in llm_client::prompts.

/// Primary-question prompt template. Replace `{technology}`, `{level}`,
/// `{years}`, `{position}` and `{history}` before sending.
pub const PRIMARY_QUESTION_TEMPLATE: &str = r#"Generate one {level}-level technical screening question about {technology} for a candidate with {years} years of experience applying for: {position}.

Recent answers from this candidate about {technology}:
{history}

Question guidelines:
- Ask the candidate to explain a specific concept, trade-off, or process — never to write code
- Difficulty should match the {level} level
- Focus on real-world application as well as theoretical knowledge
- Keep it concise but specific
- It should be answerable in 2-4 sentences
- Do not repeat ground already covered by the recent answers

Generate only the question, no additional text."#;

/// Follow-up prompt template. Replace `{technology}` and `{answer}`.
pub const FOLLOW_UP_TEMPLATE: &str = r#"A screening candidate gave this answer about {technology}:

"{answer}"

Generate one follow-up question that digs deeper into their technical understanding. The question should:
- Build on what they just said
- Ask for more specific technical detail, implementation challenges, or trade-offs
- Be concise and focused

Generate only the follow-up question, no additional text."#;
