//! The conversational probe catalogue.
//!
//! Each PHQ question carries its clinical concept and a handful of natural
//! phrasings the conversation layer can open with. Probes deliberately never
//! quote the instrument — the point of conversational inference is that the
//! user talks freely and the engine maps what they said back onto the scale.

/// Probes for one PHQ question.
#[derive(Debug, Clone, Copy)]
pub struct ProbeSet {
    /// 1-based PHQ question number.
    pub question_number: u8,
    /// The clinical concept the question measures.
    pub concept: &'static str,
    /// Natural phrasings for opening the topic.
    pub probes: &'static [&'static str],
}

/// Probes for the PHQ-2 short form (questions 1–2).
pub const PHQ2_PROBES: [ProbeSet; 2] = [
    ProbeSet {
        question_number: 1,
        concept: "Little interest or pleasure in doing things",
        probes: &[
            "What kinds of things do you usually enjoy?",
            "Have you been able to do the things you like lately?",
            "Tell me about a time recently when you had fun.",
            "What activities bring you joy?",
        ],
    },
    ProbeSet {
        question_number: 2,
        concept: "Feeling down, depressed, or hopeless",
        probes: &[
            "How have you been feeling emotionally?",
            "What's your general mood been like?",
            "Do you see things getting better soon?",
            "Tell me about your outlook on things.",
        ],
    },
];

/// Probes for the remaining PHQ-9 questions (3–9).
pub const PHQ9_PROBES: [ProbeSet; 7] = [
    ProbeSet {
        question_number: 3,
        concept: "Trouble falling or staying asleep, or sleeping too much",
        probes: &[
            "How's your sleep been recently?",
            "Any trouble with your sleep patterns?",
            "Tell me about your sleep lately.",
        ],
    },
    ProbeSet {
        question_number: 4,
        concept: "Feeling tired or having little energy",
        probes: &[
            "How's your energy level been?",
            "Do you feel tired or exhausted?",
            "Tell me about your physical energy.",
        ],
    },
    ProbeSet {
        question_number: 5,
        concept: "Poor appetite or overeating",
        probes: &[
            "How's your appetite been?",
            "Any changes in how much you're eating?",
            "Tell me about your eating habits.",
        ],
    },
    ProbeSet {
        question_number: 6,
        concept: "Feeling bad about yourself or failure",
        probes: &[
            "How do you feel about yourself?",
            "Do you blame yourself for things?",
            "Tell me about your self-confidence.",
        ],
    },
    ProbeSet {
        question_number: 7,
        concept: "Trouble concentrating",
        probes: &[
            "How's your concentration?",
            "Do you find it hard to focus on things?",
            "Tell me about your ability to concentrate.",
        ],
    },
    ProbeSet {
        question_number: 8,
        concept: "Moving or speaking slowly or being fidgety/restless",
        probes: &[
            "Have you noticed changes in how you move or speak?",
            "Do you feel restless or slowed down?",
            "Tell me about your physical movements.",
        ],
    },
    ProbeSet {
        question_number: 9,
        concept: "Thoughts that you would be better off dead or of hurting yourself",
        probes: &[
            "Have you thought about hurting yourself?",
            "Any thoughts about ending it all?",
            "Do you ever feel like the world would be better without you?",
        ],
    },
];

/// The probe set for one question, or `None` outside 1–9.
pub fn probe_set(question_number: u8) -> Option<&'static ProbeSet> {
    PHQ2_PROBES
        .iter()
        .chain(PHQ9_PROBES.iter())
        .find(|set| set.question_number == question_number)
}
