//! # anima-screening
//!
//! The PHQ-2/PHQ-9 question bank, answer parsing, scoring rules, and the
//! assessment state machine for the ANIMA runtime.
//!
//! ## Overview
//!
//! This crate owns everything numeric about a screening: [`Assessment`]
//! drives administration (question order, retries, skips, completion),
//! [`parse_answer`](answer::parse_answer) gates free text into 0–3 scores,
//! and [`score`] maps totals to severity bands and clinical interpretation.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use anima_contracts::ids::PhqType;
//! use anima_screening::{answer::parse_answer, assessment::Assessment, score};
//!
//! let mut assessment = Assessment::new(PhqType::Phq2, "user-1");
//! if let Some(score_value) = parse_answer("nearly every day") {
//!     assessment.record_answer(1, score_value)?;
//! }
//! ```
//!
//! ## Skip law
//!
//! A question absorbs three invalid attempts, then transitions to skipped:
//! it is excluded from all later question selection and contributes zero to
//! the total score. The flow never stalls on one question.

pub mod answer;
pub mod assessment;
pub mod bank;
pub mod score;

pub use assessment::{Assessment, AttemptOutcome, Question, MAX_INVALID_ATTEMPTS};
pub use score::{determine_severity, interpret, Interpretation};
