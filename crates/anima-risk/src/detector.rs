//! The pure risk detector.
//!
//! `detect_risk` scans one utterance and reports what matched. It mutates
//! nothing and decides nothing — escalation policy belongs to the calling
//! agent. Immediate-risk phrases are scanned on every question, not just
//! the self-harm item; crisis language mid-conversation must not wait for
//! question 9 to come around.

use tracing::{debug, warn};

use anima_contracts::risk::{RiskReport, RiskSeverity};

use crate::catalogue;

/// Immediate-risk phrases present in `text`, in catalogue order.
pub fn immediate_matches(text: &str) -> Vec<&'static str> {
    let lowered = text.to_lowercase();
    catalogue::IMMEDIATE_RISK_PHRASES
        .iter()
        .filter(|phrase| lowered.contains(*phrase))
        .copied()
        .collect()
}

/// General risk phrases for `question_number` present in `text`.
pub fn general_matches(text: &str, question_number: u8) -> Vec<&'static str> {
    let lowered = text.to_lowercase();
    catalogue::general_phrases(question_number)
        .iter()
        .filter(|phrase| lowered.contains(*phrase))
        .copied()
        .collect()
}

/// Scan one utterance for risk language.
///
/// Severity is `Critical` when any immediate-risk phrase matched, `High`
/// when only general phrases for the question matched, absent otherwise.
/// The report is advisory: it never alters scores or conversation flow on
/// its own.
pub fn detect_risk(text: &str, question_number: u8) -> RiskReport {
    let immediate = immediate_matches(text);
    let general = general_matches(text, question_number);

    let severity = if !immediate.is_empty() {
        Some(RiskSeverity::Critical)
    } else if !general.is_empty() {
        Some(RiskSeverity::High)
    } else {
        None
    };

    let matched_phrases: Vec<String> = immediate
        .iter()
        .chain(general.iter())
        .map(|phrase| phrase.to_string())
        .collect();

    match severity {
        Some(RiskSeverity::Critical) => warn!(
            question = question_number,
            phrases = ?matched_phrases,
            "immediate risk language detected"
        ),
        Some(RiskSeverity::High) => debug!(
            question = question_number,
            phrases = ?matched_phrases,
            "general risk language detected"
        ),
        None => {}
    }

    RiskReport {
        risk_detected: !matched_phrases.is_empty(),
        matched_phrases,
        severity,
    }
}
