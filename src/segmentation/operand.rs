use crate::constants;
use once_cell::sync::Lazy;
use regex::Regex;

static LOWER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(constants::LOWER_MATCH).unwrap());
static WILDCARD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(constants::WILDCARD_MATCH).unwrap());
static REGEX_RE: Lazy<Regex> = Lazy::new(|| Regex::new(constants::REGEX_MATCH).unwrap());
static STARTING_STAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(constants::STARTING_STAR).unwrap());
static ENDING_STAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(constants::ENDING_STAR).unwrap());

/// Comparison selected by the operand wrapper. `wildcard(...)` narrows to
/// contains/starts-with/ends-with depending on where the stars sit; a
/// wildcard without stars and any unwrapped operand mean exact equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OperandMatch {
    CaseInsensitiveEquals,
    Contains,
    StartsWith,
    EndsWith,
    Regex,
    Equals,
}

/// Unwraps the operand and decides the comparison mode.
pub(crate) fn pre_process_operand_value(operand: &str) -> (OperandMatch, String) {
    if let Some(inner) = extract_operand_value(&LOWER_RE, operand) {
        return (OperandMatch::CaseInsensitiveEquals, inner);
    }
    if let Some(inner) = extract_operand_value(&WILDCARD_RE, operand) {
        let starting_star = STARTING_STAR_RE.is_match(&inner);
        let ending_star = ENDING_STAR_RE.is_match(&inner);
        let match_type = if starting_star && ending_star {
            OperandMatch::Contains
        } else if starting_star {
            // "*x" anchors the tail of the tag
            OperandMatch::EndsWith
        } else if ending_star {
            // "x*" anchors the head of the tag
            OperandMatch::StartsWith
        } else {
            OperandMatch::Equals
        };
        let stripped = ENDING_STAR_RE
            .replace_all(&STARTING_STAR_RE.replace_all(&inner, ""), "")
            .into_owned();
        return (match_type, stripped);
    }
    if let Some(inner) = extract_operand_value(&REGEX_RE, operand) {
        return (OperandMatch::Regex, inner);
    }
    (OperandMatch::Equals, operand.to_string())
}

/// When both sides parse as numbers they are re-stringified so "1", "1.0"
/// and 1 all compare equal: integer-valued floats as integers, everything
/// else in the shortest decimal form.
pub(crate) fn normalize_values(operand_value: String, tag_value: String) -> (String, String) {
    let operand_number: f64 = match operand_value.parse() {
        Ok(n) => n,
        Err(_) => return (operand_value, tag_value),
    };
    let tag_number: f64 = match tag_value.parse() {
        Ok(n) => n,
        Err(_) => return (operand_value, tag_value),
    };
    (normalize_number(operand_number), normalize_number(tag_number))
}

fn normalize_number(number: f64) -> String {
    if number.fract() == 0.0 && number.is_finite() {
        (number as i64).to_string()
    } else {
        number.to_string()
    }
}

/// Compiles the operand as a regex and tests the tag; an invalid pattern
/// never matches.
pub(crate) fn matches_regex(tag_value: &str, pattern: &str) -> bool {
    match Regex::new(pattern) {
        Ok(re) => re.is_match(tag_value),
        Err(_) => false,
    }
}

fn extract_operand_value(re: &Regex, operand: &str) -> Option<String> {
    re.captures(operand)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
