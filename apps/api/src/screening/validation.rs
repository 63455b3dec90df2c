//! Field validators for the collection states.
//!
//! Pure and deterministic: no I/O, no clock, no lookup services. Each
//! validator either returns the normalized value the profile will store, or a
//! `FieldError` naming why the input was rejected — the state machine turns
//! that into a re-prompt and leaves the session untouched.

/// Why an input was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldError {
    Empty,
    InvalidFormat,
    InvalidRegion,
    NotANumber,
    OutOfRange,
    Unresolvable,
}

impl FieldError {
    /// Short human-readable label, embedded in re-prompts.
    pub fn label(&self) -> &'static str {
        match self {
            FieldError::Empty => "empty",
            FieldError::InvalidFormat => "invalid format",
            FieldError::InvalidRegion => "missing or invalid country code",
            FieldError::NotANumber => "not a number",
            FieldError::OutOfRange => "out of range",
            FieldError::Unresolvable => "unrecognized place",
        }
    }
}

const MAX_EXPERIENCE_YEARS: i64 = 50;

// E.164: up to 15 digits including the country code.
const PHONE_MIN_DIGITS: usize = 8;
const PHONE_MAX_DIGITS: usize = 15;

/// Full name: letters plus a handful of name punctuation, at least two words.
/// Normalizes to title case ("jane doe" → "Jane Doe").
pub fn validate_name(raw: &str) -> Result<String, FieldError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(FieldError::Empty);
    }

    let valid_chars = trimmed
        .chars()
        .all(|c| c.is_alphabetic() || c == ' ' || c == '\'' || c == '-' || c == '.');
    if !valid_chars || !trimmed.chars().next().is_some_and(|c| c.is_alphabetic()) {
        return Err(FieldError::InvalidFormat);
    }

    let words: Vec<&str> = trimmed.split_whitespace().collect();
    if words.len() < 2 {
        return Err(FieldError::InvalidFormat);
    }

    Ok(words
        .iter()
        .map(|w| title_case(w))
        .collect::<Vec<_>>()
        .join(" "))
}

/// Syntactic RFC-shape email check: one `@`, a sane local part, and a dotted
/// domain ending in a 2+ letter TLD. Normalizes to lowercase.
pub fn validate_email(raw: &str) -> Result<String, FieldError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(FieldError::Empty);
    }

    let lowered = trimmed.to_lowercase();
    let mut parts = lowered.split('@');
    let (local, domain) = match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => (local, domain),
        _ => return Err(FieldError::InvalidFormat),
    };

    let local_ok = !local.is_empty()
        && !local.starts_with('.')
        && !local.ends_with('.')
        && local
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '%' | '+' | '-'));

    let labels: Vec<&str> = domain.split('.').collect();
    let domain_ok = labels.len() >= 2
        && labels.iter().all(|label| {
            !label.is_empty()
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        });
    let tld_ok = labels
        .last()
        .is_some_and(|tld| tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic()));

    if local_ok && domain_ok && tld_ok {
        Ok(lowered)
    } else {
        Err(FieldError::InvalidFormat)
    }
}

/// Phone number with a country code. Formatting characters (spaces, hyphens,
/// dots, parentheses) are stripped; the canonical form is `+` followed by
/// 8–15 digits with a nonzero leading digit.
pub fn validate_phone(raw: &str) -> Result<String, FieldError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(FieldError::Empty);
    }

    let mut digits = String::new();
    let mut has_plus = false;
    for (i, c) in trimmed.chars().enumerate() {
        match c {
            '+' if i == 0 => has_plus = true,
            '0'..='9' => digits.push(c),
            ' ' | '-' | '.' | '(' | ')' => {}
            _ => return Err(FieldError::InvalidFormat),
        }
    }

    if !has_plus {
        return Err(FieldError::InvalidRegion);
    }
    if digits.len() < PHONE_MIN_DIGITS || digits.len() > PHONE_MAX_DIGITS {
        return Err(FieldError::InvalidFormat);
    }
    // Country calling codes never start with zero.
    if digits.starts_with('0') {
        return Err(FieldError::InvalidRegion);
    }

    Ok(format!("+{digits}"))
}

/// Whole years of professional experience, 0–50.
pub fn validate_experience(raw: &str) -> Result<u8, FieldError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(FieldError::Empty);
    }

    let years: i64 = trimmed.parse().map_err(|_| FieldError::NotANumber)?;
    if !(0..=MAX_EXPERIENCE_YEARS).contains(&years) {
        return Err(FieldError::OutOfRange);
    }
    Ok(years as u8)
}

/// Desired position: free text, non-empty after trimming.
pub fn validate_position(raw: &str) -> Result<String, FieldError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(FieldError::Empty);
    }
    Ok(trimmed.to_string())
}

/// Location: permissive plausible place-name check. A "City, Country" shape
/// passes; so does a bare city. Digits and most symbols do not read as place
/// names and are rejected as unresolvable.
pub fn validate_location(raw: &str) -> Result<String, FieldError> {
    let trimmed = raw.trim();

    let has_letters = trimmed.chars().filter(|c| c.is_alphabetic()).count() >= 2;
    let valid_chars = trimmed
        .chars()
        .all(|c| c.is_alphabetic() || matches!(c, ' ' | ',' | '.' | '-' | '\''));

    if has_letters && valid_chars {
        Ok(trimmed.to_string())
    } else {
        Err(FieldError::Unresolvable)
    }
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(|c| c.to_lowercase())).collect(),
        None => String::new(),
    }
}
