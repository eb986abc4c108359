//! The PHQ question bank and response scale, verbatim.
//!
//! The PHQ-2 short form administers the first two questions of the PHQ-9;
//! there is one canonical list and the instrument type selects a prefix.
//! Question text is presented to the user exactly as written here — the
//! conversational engine paraphrases around it but never rewrites it.

use anima_contracts::ids::PhqType;

/// The nine PHQ-9 question texts. Index 0 holds question 1.
pub const PHQ9_QUESTIONS: [&str; 9] = [
    "Over the last 2 weeks, how often have you been bothered by little interest or pleasure in doing things?",
    "Over the last 2 weeks, how often have you been bothered by feeling down, depressed, or hopeless?",
    "Over the last 2 weeks, how often have you been bothered by trouble falling or staying asleep, or sleeping too much?",
    "Over the last 2 weeks, how often have you been bothered by feeling tired or having little energy?",
    "Over the last 2 weeks, how often have you been bothered by poor appetite or overeating?",
    "Over the last 2 weeks, how often have you been bothered by feeling bad about yourself or that you are a failure or have let yourself or your family down?",
    "Over the last 2 weeks, how often have you been bothered by trouble concentrating on things, such as reading the newspaper or watching television?",
    "Over the last 2 weeks, how often have you been bothered by moving or speaking so slowly that other people could have noticed, or the opposite - being so fidgety or restless that you have been moving around a lot more than usual?",
    "Over the last 2 weeks, how often have you been bothered by thoughts that you would be better off dead, or of hurting yourself in some way?",
];

/// The four response-scale labels shared by both instruments. Index = score.
pub const RESPONSE_SCALE: [&str; 4] = [
    "Not at all",
    "Several days",
    "More than half the days",
    "Nearly every day",
];

/// The questions the given instrument administers, in order.
pub fn questions_for(phq_type: PhqType) -> &'static [&'static str] {
    &PHQ9_QUESTIONS[..phq_type.question_count() as usize]
}

/// Text of one question by its 1-based number, or `None` if out of range.
pub fn question_text(number: u8) -> Option<&'static str> {
    if number == 0 {
        return None;
    }
    PHQ9_QUESTIONS.get(number as usize - 1).copied()
}

/// The response scale as a JSON object keyed by score, for tool payloads.
pub fn response_scale_json() -> serde_json::Value {
    serde_json::json!({
        "0": RESPONSE_SCALE[0],
        "1": RESPONSE_SCALE[1],
        "2": RESPONSE_SCALE[2],
        "3": RESPONSE_SCALE[3],
    })
}
