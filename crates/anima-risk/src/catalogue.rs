//! The risk-phrase catalogue.
//!
//! General phrases are grouped by the PHQ question they signal trouble on;
//! the immediate-risk list is question-independent crisis language. Matching
//! is lowercase substring — the lists are curated to keep false positives
//! tolerable for an advisory detector.

/// General risk phrases for one PHQ question.
#[derive(Debug, Clone, Copy)]
pub struct QuestionPhrases {
    /// 1-based PHQ question number.
    pub question_number: u8,
    pub phrases: &'static [&'static str],
}

/// General risk phrases, by question. Question 9 has no general list — any
/// crisis language there is immediate by definition.
pub const GENERAL_RISK_PHRASES: [QuestionPhrases; 8] = [
    QuestionPhrases {
        question_number: 1,
        phrases: &[
            "nothing",
            "nothing matters",
            "don't care",
            "pointless",
            "no interest",
            "can't enjoy",
        ],
    },
    QuestionPhrases {
        question_number: 2,
        phrases: &[
            "hopeless",
            "depressed",
            "down",
            "terrible",
            "awful",
            "worthless",
            "can't take it",
        ],
    },
    QuestionPhrases {
        question_number: 3,
        phrases: &[
            "insomnia",
            "can't sleep",
            "sleeping all day",
            "nightmares",
            "restless",
        ],
    },
    QuestionPhrases {
        question_number: 4,
        phrases: &[
            "exhausted",
            "no energy",
            "tired all the time",
            "fatigue",
            "drained",
        ],
    },
    QuestionPhrases {
        question_number: 5,
        phrases: &["no appetite", "can't eat", "eating too much", "binge eating"],
    },
    QuestionPhrases {
        question_number: 6,
        phrases: &[
            "failure",
            "worthless",
            "useless",
            "bad person",
            "blame myself",
            "deserve this",
        ],
    },
    QuestionPhrases {
        question_number: 7,
        phrases: &[
            "can't focus",
            "can't concentrate",
            "mind is blank",
            "forgetful",
            "can't think",
        ],
    },
    QuestionPhrases {
        question_number: 8,
        phrases: &["slow", "sluggish", "restless", "fidgety", "pacing", "agitated"],
    },
];

/// Crisis language that is critical wherever it appears.
pub const IMMEDIATE_RISK_PHRASES: [&str; 6] = [
    "suicide",
    "kill myself",
    "end it",
    "better off dead",
    "hurt myself",
    "self-harm",
];

/// The general phrase list for one question; empty for question 9 and for
/// numbers outside the instrument.
pub fn general_phrases(question_number: u8) -> &'static [&'static str] {
    GENERAL_RISK_PHRASES
        .iter()
        .find(|entry| entry.question_number == question_number)
        .map(|entry| entry.phrases)
        .unwrap_or(&[])
}
