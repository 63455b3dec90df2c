//! Tech-stack parsing.
//!
//! Turns a free-text declaration ("Python, JavaScript and PostgreSQL") into a
//! normalized, deduplicated, order-preserving list of technology names. The
//! list is fixed once the machine leaves the stack-collection state.

use std::collections::HashSet;

/// Characters treated as hard separators between technology names.
const SEPARATORS: &[char] = &[',', '/', '&', ';'];

/// Parses a raw tech-stack declaration into normalized technology names.
/// Returns an empty vector when nothing parseable remains — the machine
/// re-prompts in that case.
pub fn parse_stack(raw: &str) -> Vec<String> {
    let mut technologies = Vec::new();
    let mut seen = HashSet::new();

    for piece in raw.split(SEPARATORS) {
        for token in split_on_and(piece) {
            let cleaned = token.trim_matches(|c: char| {
                c.is_whitespace() || matches!(c, '.' | ';' | ':' | '-')
            });
            if cleaned.is_empty() {
                continue;
            }

            let normalized = normalize(cleaned);
            if seen.insert(normalized.to_lowercase()) {
                technologies.push(normalized);
            }
        }
    }

    technologies
}

/// Splits a piece on the standalone word "and" (any casing), keeping
/// multi-word names like "Ruby on Rails" intact.
fn split_on_and(piece: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for word in piece.split_whitespace() {
        if word.eq_ignore_ascii_case("and") {
            if !current.is_empty() {
                tokens.push(current.join(" "));
                current.clear();
            }
        } else {
            current.push(word);
        }
    }
    if !current.is_empty() {
        tokens.push(current.join(" "));
    }

    tokens
}

/// Normalizes casing: all-caps acronyms stay as-is ("SQL"), dotted names keep
/// their tail ("node.js" → "Node.js"), everything else is capitalized.
fn normalize(token: &str) -> String {
    if token.len() > 1 && token.chars().all(|c| !c.is_lowercase()) {
        return token.to_string();
    }

    if let Some((head, tail)) = token.split_once('.') {
        return format!("{}.{}", capitalize(head), tail);
    }

    capitalize(token)
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(|c| c.to_lowercase()))
            .collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comma_separated_list() {
        assert_eq!(
            parse_stack("Python, JavaScript, PostgreSQL"),
            vec!["Python", "Javascript", "Postgresql"]
        );
    }

    #[test]
    fn test_dedup_preserves_order() {
        // Scenario: "Python, Go, Python" → ["Python", "Go"]
        assert_eq!(parse_stack("Python, Go, Python"), vec!["Python", "Go"]);
    }

    #[test]
    fn test_dedup_is_case_insensitive() {
        assert_eq!(parse_stack("python, PYTHON, Python"), vec!["Python"]);
    }

    #[test]
    fn test_and_slash_ampersand_separators() {
        assert_eq!(
            parse_stack("Rust and Go / Docker & Redis"),
            vec!["Rust", "Go", "Docker", "Redis"]
        );
    }

    #[test]
    fn test_acronyms_keep_their_casing() {
        assert_eq!(parse_stack("SQL, CSS, php"), vec!["SQL", "CSS", "Php"]);
    }

    #[test]
    fn test_dotted_names_keep_their_tail() {
        assert_eq!(parse_stack("node.js, vue.js"), vec!["Node.js", "Vue.js"]);
    }

    #[test]
    fn test_multi_word_names_survive() {
        assert_eq!(
            parse_stack("Ruby on Rails, Spring Boot"),
            vec!["Ruby on rails", "Spring boot"]
        );
    }

    #[test]
    fn test_stray_punctuation_is_trimmed() {
        assert_eq!(parse_stack(" - python; , go. "), vec!["Python", "Go"]);
    }

    #[test]
    fn test_empty_input_yields_empty_list() {
        assert!(parse_stack("").is_empty());
        assert!(parse_stack("  ,, and / & ").is_empty());
    }
}
