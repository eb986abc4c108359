//! Free-text answer parsing.
//!
//! `parse_answer` is the sole gate between free text and the numeric model.
//! It accepts the exact digits 0–3 and a small table of lexical equivalents
//! (the response-scale labels and close variants). Matching is exact after
//! normalization — substring matching would let hedged free text like
//! "well, sometimes I guess" slip through as a score, and those must go to
//! the invalid-attempt path instead.

/// Lexical equivalents accepted in place of a digit, already normalized.
const SYNONYMS: [(&str, u8); 17] = [
    ("0", 0),
    ("zero", 0),
    ("not at all", 0),
    ("never", 0),
    ("none", 0),
    ("1", 1),
    ("one", 1),
    ("several days", 1),
    ("a few days", 1),
    ("few days", 1),
    ("2", 2),
    ("two", 2),
    ("more than half the days", 2),
    ("more than half", 2),
    ("3", 3),
    ("three", 3),
    ("nearly every day", 3),
];

/// Additional score-3 variants kept apart so the table above stays scannable.
const NEARLY_EVERY_DAY_VARIANTS: [&str; 2] = ["almost every day", "every day"];

/// Parse a user's reply into a 0–3 score, or `None` when unparseable.
///
/// Normalization: trim, lowercase, strip one trailing `.`, `!`, or `,`.
/// Anything that is not an exact match after that returns `None` and counts
/// as an invalid attempt upstream.
pub fn parse_answer(raw: &str) -> Option<u8> {
    let normalized = normalize(raw);

    for (form, score) in SYNONYMS {
        if normalized == form {
            return Some(score);
        }
    }
    for form in NEARLY_EVERY_DAY_VARIANTS {
        if normalized == form {
            return Some(3);
        }
    }
    None
}

fn normalize(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    let stripped = lowered
        .strip_suffix('.')
        .or_else(|| lowered.strip_suffix('!'))
        .or_else(|| lowered.strip_suffix(','))
        .unwrap_or(&lowered);
    stripped.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digits_parse_to_their_value() {
        assert_eq!(parse_answer("0"), Some(0));
        assert_eq!(parse_answer("1"), Some(1));
        assert_eq!(parse_answer("2"), Some(2));
        assert_eq!(parse_answer("3"), Some(3));
    }

    #[test]
    fn digits_outside_scale_do_not_parse() {
        assert_eq!(parse_answer("4"), None);
        assert_eq!(parse_answer("-1"), None);
        assert_eq!(parse_answer("10"), None);
    }

    #[test]
    fn scale_labels_parse_case_insensitively() {
        assert_eq!(parse_answer("Not at all"), Some(0));
        assert_eq!(parse_answer("several days"), Some(1));
        assert_eq!(parse_answer("More than half the days"), Some(2));
        assert_eq!(parse_answer("NEARLY EVERY DAY"), Some(3));
    }

    #[test]
    fn number_words_parse() {
        assert_eq!(parse_answer("zero"), Some(0));
        assert_eq!(parse_answer("one"), Some(1));
        assert_eq!(parse_answer("two"), Some(2));
        assert_eq!(parse_answer("three"), Some(3));
    }

    #[test]
    fn whitespace_and_trailing_punctuation_are_tolerated() {
        assert_eq!(parse_answer("  3  "), Some(3));
        assert_eq!(parse_answer("three."), Some(3));
        assert_eq!(parse_answer("not at all!"), Some(0));
        assert_eq!(parse_answer("Several days,"), Some(1));
    }

    #[test]
    fn close_variants_parse() {
        assert_eq!(parse_answer("more than half"), Some(2));
        assert_eq!(parse_answer("almost every day"), Some(3));
        assert_eq!(parse_answer("every day"), Some(3));
        assert_eq!(parse_answer("never"), Some(0));
    }

    /// Hedged free text must fail so the invalid-attempt path can re-prompt.
    #[test]
    fn free_text_does_not_parse() {
        assert_eq!(parse_answer("sometimes"), None);
        assert_eq!(parse_answer("often"), None);
        assert_eq!(parse_answer("well, sometimes I guess"), None);
        assert_eq!(parse_answer("I don't know"), None);
        assert_eq!(parse_answer("maybe a 2 or so"), None);
        assert_eq!(parse_answer(""), None);
    }
}
