//! Durable per-conversation progress records.
//!
//! `SessionProgress` is the record a session store keeps current while an
//! assessment runs. It is written exclusively through the store trait —
//! the state machines never touch it directly — and it is what a resumed
//! or abandoned conversation gets reconstructed from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{AssessmentId, PhqType};

/// Progress bookkeeping for one administered question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnsweredQuestion {
    /// 1-based question number within the instrument.
    pub question_number: u8,
    /// The question text as presented (contextual phrasing for inferred
    /// answers, verbatim instrument text for formal ones).
    pub question_text: String,
    /// Recorded score 0–3; `None` while pending or when skipped.
    pub answer: Option<u8>,
    /// Invalid-input attempts consumed so far.
    pub attempts: u8,
    /// True once the question was abandoned after repeated invalid input.
    pub was_skipped: bool,
    /// When the answer (or skip) was recorded.
    pub answered_at: Option<DateTime<Utc>>,
}

/// The full progress record for one conversation's assessment.
///
/// Scores, severity, and interpretation are only defined at completion;
/// until then they are `None` and `is_complete` is false.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionProgress {
    pub user_id: String,
    pub session_id: String,
    pub assessment_id: AssessmentId,
    pub phq_type: PhqType,
    /// One entry per administered question, in administration order.
    pub answered_questions: Vec<AnsweredQuestion>,
    pub total_score: Option<u8>,
    pub severity: Option<String>,
    pub interpretation: Option<String>,
    pub recommendations: Vec<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub is_complete: bool,
}

impl SessionProgress {
    /// A fresh record for a just-started assessment.
    pub fn begin(
        user_id: impl Into<String>,
        session_id: impl Into<String>,
        assessment_id: AssessmentId,
        phq_type: PhqType,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            session_id: session_id.into(),
            assessment_id,
            phq_type,
            answered_questions: Vec::new(),
            total_score: None,
            severity: None,
            interpretation: None,
            recommendations: Vec::new(),
            started_at: Utc::now(),
            completed_at: None,
            is_complete: false,
        }
    }

    /// Locate the bookkeeping entry for a question, if one was opened.
    pub fn question(&self, number: u8) -> Option<&AnsweredQuestion> {
        self.answered_questions
            .iter()
            .find(|q| q.question_number == number)
    }
}
