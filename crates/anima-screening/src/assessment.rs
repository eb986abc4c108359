//! The assessment state machine.
//!
//! One `Assessment` tracks a single PHQ-2 or PHQ-9 administration: which
//! questions are answered, skipped, or still pending, and when the whole
//! instrument completed. Transitions are strict — answering out of order,
//! re-answering, or touching a completed assessment is an error, never a
//! silent no-op.
//!
//! Question lifecycle: `Unanswered → Answered` (valid score recorded) or
//! `Unanswered → Skipped` (three invalid attempts). Both are terminal.
//! The assessment completes itself the moment every question is resolved.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use anima_contracts::{
    error::{AnimaError, AnimaResult},
    ids::{AssessmentId, PhqType},
    progress::SessionProgress,
};

use crate::bank;

/// Invalid attempts a question absorbs before it is skipped.
pub const MAX_INVALID_ATTEMPTS: u8 = 3;

/// One question's administration state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// 1-based number within the instrument.
    pub number: u8,
    /// Verbatim instrument text.
    pub text: String,
    /// Recorded score 0–3; `None` while unanswered or skipped.
    pub answer: Option<u8>,
    /// Invalid-input attempts consumed so far.
    pub attempts: u8,
    /// True once the question was abandoned after repeated invalid input.
    pub skipped: bool,
    /// When the answer (or the skip) was recorded.
    pub answered_at: Option<DateTime<Utc>>,
}

impl Question {
    fn fresh(number: u8, text: &str) -> Self {
        Self {
            number,
            text: text.to_string(),
            answer: None,
            attempts: 0,
            skipped: false,
            answered_at: None,
        }
    }

    /// True once the question reached a terminal state (answered or skipped).
    pub fn is_resolved(&self) -> bool {
        self.answer.is_some() || self.skipped
    }
}

/// What `record_invalid_attempt` decided about the question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// The user gets another try; `attempts_left` counts down to the skip.
    Retry { attempts_left: u8 },
    /// The attempt budget is spent; the question is now skipped.
    Skipped,
}

/// A single PHQ-2 or PHQ-9 administration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub assessment_id: AssessmentId,
    pub user_id: String,
    pub phq_type: PhqType,
    /// All questions of the instrument, in administration order.
    pub questions: Vec<Question>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub is_completed: bool,
}

impl Assessment {
    /// Start a fresh assessment: every question unanswered, zero attempts.
    pub fn new(phq_type: PhqType, user_id: impl Into<String>) -> Self {
        let questions = bank::questions_for(phq_type)
            .iter()
            .enumerate()
            .map(|(idx, text)| Question::fresh(idx as u8 + 1, text))
            .collect();

        let assessment = Self {
            assessment_id: AssessmentId::new(),
            user_id: user_id.into(),
            phq_type,
            questions,
            started_at: Utc::now(),
            completed_at: None,
            is_completed: false,
        };

        debug!(
            assessment_id = %assessment.assessment_id,
            phq_type = %phq_type,
            "assessment started"
        );
        assessment
    }

    /// Rebuild an assessment from its persisted progress record.
    ///
    /// An abandoned conversation resumes exactly where it stopped: answered
    /// and skipped questions come back in their terminal states, partial
    /// attempt counts survive, and `next_question` continues at the first
    /// untouched question. Question texts come from the bank; the record's
    /// as-presented phrasing stays audit data.
    pub fn from_progress(progress: &SessionProgress) -> Self {
        let mut assessment = Self {
            assessment_id: progress.assessment_id,
            user_id: progress.user_id.clone(),
            phq_type: progress.phq_type,
            questions: bank::questions_for(progress.phq_type)
                .iter()
                .enumerate()
                .map(|(idx, text)| Question::fresh(idx as u8 + 1, text))
                .collect(),
            started_at: progress.started_at,
            completed_at: progress.completed_at,
            is_completed: progress.is_complete,
        };

        for recorded in &progress.answered_questions {
            if let Some(question) = assessment
                .questions
                .iter_mut()
                .find(|q| q.number == recorded.question_number)
            {
                question.answer = recorded.answer;
                question.attempts = recorded.attempts;
                question.skipped = recorded.was_skipped;
                question.answered_at = recorded.answered_at;
            }
        }

        debug!(
            assessment_id = %assessment.assessment_id,
            phq_type = %assessment.phq_type,
            answered = assessment.answered_count(),
            skipped = assessment.skipped_count(),
            "assessment resumed from progress record"
        );
        assessment
    }

    /// The first unresolved question in ascending number order.
    ///
    /// Skipped questions are never revisited. `None` means every question is
    /// resolved and the assessment is (or is about to be) complete.
    pub fn next_question(&self) -> Option<&Question> {
        self.questions.iter().find(|q| !q.is_resolved())
    }

    /// Look up one question by its 1-based number.
    pub fn question(&self, number: u8) -> Option<&Question> {
        self.questions.iter().find(|q| q.number == number)
    }

    /// Record a valid score for a question.
    ///
    /// Legal only while the assessment is in progress and the question is
    /// still unanswered and unskipped. Scores outside 0–3 are rejected.
    /// Answering the final pending question completes the assessment.
    pub fn record_answer(&mut self, number: u8, score: u8) -> AnimaResult<()> {
        if self.is_completed {
            return Err(AnimaError::state(format!(
                "assessment {} is already completed",
                self.assessment_id
            )));
        }
        if score > 3 {
            return Err(AnimaError::validation(format!(
                "answer {} is outside the 0-3 response scale",
                score
            )));
        }

        let assessment_id = self.assessment_id;
        let question = self.question_mut(number)?;
        if question.answer.is_some() {
            return Err(AnimaError::state(format!(
                "question {} is already answered",
                number
            )));
        }
        if question.skipped {
            return Err(AnimaError::state(format!(
                "question {} was skipped and cannot be answered",
                number
            )));
        }

        question.answer = Some(score);
        question.answered_at = Some(Utc::now());
        debug!(
            assessment_id = %assessment_id,
            question = number,
            score,
            "answer recorded"
        );

        self.refresh_completion();
        Ok(())
    }

    /// Record one invalid attempt against a question.
    ///
    /// On the third attempt the question transitions to skipped and drops
    /// out of `next_question` permanently. Skipping the final pending
    /// question completes the assessment.
    pub fn record_invalid_attempt(&mut self, number: u8) -> AnimaResult<AttemptOutcome> {
        if self.is_completed {
            return Err(AnimaError::state(format!(
                "assessment {} is already completed",
                self.assessment_id
            )));
        }

        let assessment_id = self.assessment_id;
        let question = self.question_mut(number)?;
        if question.is_resolved() {
            return Err(AnimaError::state(format!(
                "question {} is already resolved",
                number
            )));
        }

        question.attempts += 1;
        let outcome = if question.attempts >= MAX_INVALID_ATTEMPTS {
            question.skipped = true;
            question.answered_at = Some(Utc::now());
            debug!(
                assessment_id = %assessment_id,
                question = number,
                "attempt budget spent; question skipped"
            );
            AttemptOutcome::Skipped
        } else {
            let attempts_left = MAX_INVALID_ATTEMPTS - question.attempts;
            debug!(
                assessment_id = %assessment_id,
                question = number,
                attempts_left,
                "invalid attempt recorded"
            );
            AttemptOutcome::Retry { attempts_left }
        };

        self.refresh_completion();
        Ok(outcome)
    }

    /// Total score: the sum of recorded answers. Skipped questions count 0.
    pub fn calculate_score(&self) -> u8 {
        self.questions.iter().filter_map(|q| q.answer).sum()
    }

    /// Number of questions with a recorded answer.
    pub fn answered_count(&self) -> usize {
        self.questions.iter().filter(|q| q.answer.is_some()).count()
    }

    /// Number of questions abandoned after repeated invalid input.
    pub fn skipped_count(&self) -> usize {
        self.questions.iter().filter(|q| q.skipped).count()
    }

    /// Upgrade a PHQ-2 administration to the full PHQ-9 in place.
    ///
    /// Answers to questions 1–2 carry over untouched; questions 3–9 are
    /// appended fresh, and a completed PHQ-2 reopens so the remaining
    /// questions flow through the ordinary answer path. The assessment id
    /// is unchanged — it is the same screening, extended.
    pub fn promote_to_phq9(&mut self) -> AnimaResult<()> {
        if self.phq_type == PhqType::Phq9 {
            return Err(AnimaError::state(format!(
                "assessment {} is already a PHQ-9",
                self.assessment_id
            )));
        }

        self.phq_type = PhqType::Phq9;
        for number in 3..=9u8 {
            let text = bank::PHQ9_QUESTIONS[number as usize - 1];
            self.questions.push(Question::fresh(number, text));
        }
        self.is_completed = false;
        self.completed_at = None;

        debug!(
            assessment_id = %self.assessment_id,
            "assessment promoted to PHQ-9"
        );
        Ok(())
    }

    /// A one-line progress summary for logs and demo output.
    pub fn progress_summary(&self) -> String {
        let mut summary = format!(
            "{} progress: {}/{} questions answered",
            self.phq_type,
            self.answered_count(),
            self.questions.len()
        );
        let skipped = self.skipped_count();
        if skipped > 0 {
            summary.push_str(&format!(", {} skipped", skipped));
        }
        summary
    }

    fn question_mut(&mut self, number: u8) -> AnimaResult<&mut Question> {
        let phq_type = self.phq_type;
        self.questions
            .iter_mut()
            .find(|q| q.number == number)
            .ok_or_else(|| {
                AnimaError::validation(format!(
                    "question {} does not exist on a {}",
                    number, phq_type
                ))
            })
    }

    /// Mark the assessment complete once every question is resolved.
    fn refresh_completion(&mut self) {
        if !self.is_completed && self.questions.iter().all(|q| q.is_resolved()) {
            self.is_completed = true;
            self.completed_at = Some(Utc::now());
            debug!(
                assessment_id = %self.assessment_id,
                score = self.calculate_score(),
                "assessment completed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use anima_contracts::progress::AnsweredQuestion;

    // ── Construction ─────────────────────────────────────────────────────────

    #[test]
    fn new_assessment_has_all_questions_unanswered() {
        let assessment = Assessment::new(PhqType::Phq9, "user-1");

        assert_eq!(assessment.questions.len(), 9);
        assert!(!assessment.is_completed);
        assert!(assessment.completed_at.is_none());
        for question in &assessment.questions {
            assert!(question.answer.is_none());
            assert_eq!(question.attempts, 0);
            assert!(!question.skipped);
        }
    }

    #[test]
    fn phq2_administers_two_questions() {
        let assessment = Assessment::new(PhqType::Phq2, "user-1");
        assert_eq!(assessment.questions.len(), 2);
        assert_eq!(assessment.questions[0].number, 1);
        assert_eq!(assessment.questions[1].number, 2);
    }

    fn recorded_question(
        number: u8,
        answer: Option<u8>,
        attempts: u8,
        was_skipped: bool,
    ) -> AnsweredQuestion {
        AnsweredQuestion {
            question_number: number,
            question_text: bank::question_text(number).unwrap().to_string(),
            answer,
            attempts,
            was_skipped,
            answered_at: (answer.is_some() || was_skipped).then(Utc::now),
        }
    }

    /// A half-finished record rebuilds into the same machine state: terminal
    /// questions stay terminal, partial attempt counts survive, and selection
    /// resumes at the first unresolved question.
    #[test]
    fn from_progress_resumes_where_the_record_stopped() {
        let mut progress =
            SessionProgress::begin("user-1", "sess-1", AssessmentId::new(), PhqType::Phq9);
        progress.answered_questions = vec![
            recorded_question(1, Some(2), 1, false),
            recorded_question(2, None, 3, true),
            recorded_question(3, None, 1, false),
        ];

        let mut assessment = Assessment::from_progress(&progress);

        assert_eq!(assessment.assessment_id, progress.assessment_id);
        assert_eq!(assessment.started_at, progress.started_at);
        assert!(!assessment.is_completed);
        assert_eq!(assessment.answered_count(), 1);
        assert_eq!(assessment.skipped_count(), 1);
        assert_eq!(assessment.calculate_score(), 2);

        // Question 3 was mid-retry; selection picks it back up.
        assert_eq!(assessment.next_question().map(|q| q.number), Some(3));
        assert_eq!(assessment.question(3).unwrap().attempts, 1);

        // The resolved questions came back frozen.
        assert!(matches!(
            assessment.record_answer(1, 3).unwrap_err(),
            AnimaError::State { .. }
        ));
        assert!(matches!(
            assessment.record_answer(2, 0).unwrap_err(),
            AnimaError::State { .. }
        ));
    }

    /// A record flagged complete resumes as a closed assessment.
    #[test]
    fn from_progress_honors_recorded_completion() {
        let mut progress =
            SessionProgress::begin("user-1", "sess-1", AssessmentId::new(), PhqType::Phq2);
        progress.answered_questions = vec![
            recorded_question(1, Some(1), 0, false),
            recorded_question(2, Some(1), 0, false),
        ];
        progress.total_score = Some(2);
        progress.is_complete = true;
        progress.completed_at = Some(Utc::now());

        let mut assessment = Assessment::from_progress(&progress);

        assert!(assessment.is_completed);
        assert_eq!(assessment.calculate_score(), 2);
        assert!(assessment.next_question().is_none());
        assert!(matches!(
            assessment.record_answer(1, 1).unwrap_err(),
            AnimaError::State { .. }
        ));
    }

    // ── next_question ────────────────────────────────────────────────────────

    #[test]
    fn next_question_walks_in_ascending_order() {
        let mut assessment = Assessment::new(PhqType::Phq9, "user-1");

        assert_eq!(assessment.next_question().map(|q| q.number), Some(1));
        assessment.record_answer(1, 2).unwrap();
        assert_eq!(assessment.next_question().map(|q| q.number), Some(2));
    }

    /// Two calls without an intervening transition return the same question.
    #[test]
    fn next_question_is_idempotent() {
        let assessment = Assessment::new(PhqType::Phq9, "user-1");

        let first = assessment.next_question().map(|q| q.number);
        let second = assessment.next_question().map(|q| q.number);
        assert_eq!(first, second);
        assert_eq!(first, Some(1));
    }

    #[test]
    fn next_question_skips_past_skipped_questions_permanently() {
        let mut assessment = Assessment::new(PhqType::Phq9, "user-1");
        assessment.record_answer(1, 1).unwrap();

        // Burn question 2's attempt budget.
        for _ in 0..2 {
            assert!(matches!(
                assessment.record_invalid_attempt(2).unwrap(),
                AttemptOutcome::Retry { .. }
            ));
        }
        assert_eq!(
            assessment.record_invalid_attempt(2).unwrap(),
            AttemptOutcome::Skipped
        );

        // Question 2 never comes back.
        assert_eq!(assessment.next_question().map(|q| q.number), Some(3));
    }

    // ── record_answer ────────────────────────────────────────────────────────

    #[test]
    fn record_answer_rejects_out_of_scale_scores() {
        let mut assessment = Assessment::new(PhqType::Phq2, "user-1");
        let err = assessment.record_answer(1, 4).unwrap_err();
        assert!(matches!(err, AnimaError::Validation { .. }));
    }

    #[test]
    fn record_answer_rejects_unknown_question_numbers() {
        let mut assessment = Assessment::new(PhqType::Phq2, "user-1");
        let err = assessment.record_answer(3, 1).unwrap_err();
        assert!(matches!(err, AnimaError::Validation { .. }));
    }

    #[test]
    fn record_answer_rejects_double_answers() {
        let mut assessment = Assessment::new(PhqType::Phq2, "user-1");
        assessment.record_answer(1, 2).unwrap();

        let err = assessment.record_answer(1, 3).unwrap_err();
        assert!(matches!(err, AnimaError::State { .. }));
        // The original answer is untouched.
        assert_eq!(assessment.question(1).unwrap().answer, Some(2));
    }

    #[test]
    fn record_answer_rejects_skipped_questions() {
        let mut assessment = Assessment::new(PhqType::Phq2, "user-1");
        for _ in 0..3 {
            assessment.record_invalid_attempt(1).unwrap();
        }

        let err = assessment.record_answer(1, 2).unwrap_err();
        assert!(matches!(err, AnimaError::State { .. }));
    }

    #[test]
    fn answering_every_question_completes_the_assessment() {
        let mut assessment = Assessment::new(PhqType::Phq2, "user-1");
        assessment.record_answer(1, 3).unwrap();
        assert!(!assessment.is_completed);

        assessment.record_answer(2, 2).unwrap();
        assert!(assessment.is_completed);
        assert!(assessment.completed_at.is_some());
        assert_eq!(assessment.calculate_score(), 5);
    }

    #[test]
    fn completed_assessment_rejects_further_transitions() {
        let mut assessment = Assessment::new(PhqType::Phq2, "user-1");
        assessment.record_answer(1, 0).unwrap();
        assessment.record_answer(2, 0).unwrap();
        assert!(assessment.is_completed);

        assert!(matches!(
            assessment.record_answer(1, 1),
            Err(AnimaError::State { .. })
        ));
        assert!(matches!(
            assessment.record_invalid_attempt(2),
            Err(AnimaError::State { .. })
        ));
    }

    // ── record_invalid_attempt ───────────────────────────────────────────────

    #[test]
    fn invalid_attempts_count_down_then_skip() {
        let mut assessment = Assessment::new(PhqType::Phq9, "user-1");

        assert_eq!(
            assessment.record_invalid_attempt(1).unwrap(),
            AttemptOutcome::Retry { attempts_left: 2 }
        );
        assert_eq!(
            assessment.record_invalid_attempt(1).unwrap(),
            AttemptOutcome::Retry { attempts_left: 1 }
        );
        assert_eq!(
            assessment.record_invalid_attempt(1).unwrap(),
            AttemptOutcome::Skipped
        );
        assert!(assessment.question(1).unwrap().skipped);
    }

    #[test]
    fn skipping_the_last_pending_question_completes_the_assessment() {
        let mut assessment = Assessment::new(PhqType::Phq2, "user-1");
        assessment.record_answer(1, 3).unwrap();
        for _ in 0..3 {
            assessment.record_invalid_attempt(2).unwrap();
        }

        assert!(assessment.is_completed);
        // The skipped question contributes zero.
        assert_eq!(assessment.calculate_score(), 3);
    }

    // ── Scoring ──────────────────────────────────────────────────────────────

    #[test]
    fn calculate_score_sums_answers_and_treats_skips_as_zero() {
        let mut assessment = Assessment::new(PhqType::Phq9, "user-1");
        assessment.record_answer(1, 3).unwrap();
        assessment.record_answer(2, 2).unwrap();
        for _ in 0..3 {
            assessment.record_invalid_attempt(3).unwrap();
        }
        assessment.record_answer(4, 1).unwrap();

        assert_eq!(assessment.calculate_score(), 6);
        assert_eq!(assessment.answered_count(), 3);
        assert_eq!(assessment.skipped_count(), 1);
    }

    // ── Promotion ────────────────────────────────────────────────────────────

    #[test]
    fn promote_to_phq9_extends_a_completed_phq2_in_place() {
        let mut assessment = Assessment::new(PhqType::Phq2, "user-1");
        let id = assessment.assessment_id;
        assessment.record_answer(1, 2).unwrap();
        assessment.record_answer(2, 1).unwrap();
        assert!(assessment.is_completed);

        assessment.promote_to_phq9().unwrap();

        assert_eq!(assessment.assessment_id, id, "promotion keeps the id");
        assert_eq!(assessment.phq_type, PhqType::Phq9);
        assert_eq!(assessment.questions.len(), 9);
        assert!(!assessment.is_completed);
        assert!(assessment.completed_at.is_none());
        // Early answers carry over.
        assert_eq!(assessment.question(1).unwrap().answer, Some(2));
        assert_eq!(assessment.question(2).unwrap().answer, Some(1));
        // Administration resumes at question 3.
        assert_eq!(assessment.next_question().map(|q| q.number), Some(3));
    }

    #[test]
    fn promote_to_phq9_rejects_an_assessment_that_already_is_one() {
        let mut assessment = Assessment::new(PhqType::Phq9, "user-1");
        let err = assessment.promote_to_phq9().unwrap_err();
        assert!(matches!(err, AnimaError::State { .. }));
    }

    // ── Progress summary ─────────────────────────────────────────────────────

    #[test]
    fn progress_summary_reports_answered_and_skipped() {
        let mut assessment = Assessment::new(PhqType::Phq2, "user-1");
        assessment.record_answer(1, 3).unwrap();
        for _ in 0..3 {
            assessment.record_invalid_attempt(2).unwrap();
        }

        let summary = assessment.progress_summary();
        assert!(summary.contains("PHQ-2"));
        assert!(summary.contains("1/2 questions answered"));
        assert!(summary.contains("1 skipped"));
    }
}
