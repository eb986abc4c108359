//! Response analysis and the promotion decision.
//!
//! `record_response` turns one free-text reply into an inferred 0–3 score,
//! updates the context (answers, slots, risk log, stage), and reports what
//! it found. `decide_promotion` consumes the decision stage after both
//! PHQ-2 probes: promote to PHQ-9 probing or close as a negative screen.
//!
//! The scoring heuristic is an ordered first-match chain. The middle rungs
//! overlap (a single phrase hit satisfies both the score-2 and score-1
//! conditions); the declared order wins, so one hit scores 2. That
//! tie-break is intentional and covered by tests.

use tracing::{debug, info, warn};

use anima_contracts::{
    error::{AnimaError, AnimaResult},
    ids::PhqType,
    risk::{RiskReport, RiskSeverity},
};
use anima_risk::{general_matches, immediate_matches};

use crate::context::{JekyllContext, JekyllStage};

/// Characters of a response kept as a contextual-slot excerpt.
const SLOT_EXCERPT_CHARS: usize = 100;

/// Response length above which the top score is inferred outright.
const LONG_RESPONSE_CHARS: usize = 200;

/// What one recorded response inferred.
#[derive(Debug, Clone)]
pub struct InferredResponse {
    pub question_number: u8,
    /// Inferred 0–3 score.
    pub score: u8,
    /// Heuristic confidence, 0–1.
    pub confidence: f64,
    /// Risk scan over the same text. `Critical` entries were already
    /// appended to the context's risk log.
    pub risk: RiskReport,
}

/// The verdict after both PHQ-2 probes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromotionDecision {
    /// The short-form score met the threshold; continue with questions 3–9.
    PromoteToPhq9 { phq2_score: u8 },
    /// Below threshold; the screening closes negative.
    NegativeScreen { phq2_score: u8 },
}

/// Analyze and record one conversational response.
///
/// Legal only while the context is in a probing stage, for a question of
/// that stage, and only once per question. On the second PHQ-2 probe the
/// stage advances to `Decision`; the caller then settles it with
/// [`decide_promotion`].
pub fn record_response(
    ctx: &mut JekyllContext,
    question_number: u8,
    text: &str,
) -> AnimaResult<InferredResponse> {
    check_probe_target(ctx, question_number)?;

    let lowered = text.to_lowercase();

    // Immediate-risk scan first: crisis language is logged before any
    // scoring happens, whatever the inferred score turns out to be.
    let immediate = immediate_matches(&lowered);
    for phrase in &immediate {
        warn!(
            question = question_number,
            phrase, "immediate risk phrase in conversational response"
        );
        ctx.risk_factors.push(format!(
            "immediate risk: '{}' detected in question {}",
            phrase, question_number
        ));
    }

    let general = general_matches(&lowered, question_number);
    let hits = general.len();

    // Ordered inference chain; first match wins.
    // 3 = frequent, persistent themes; 2 = significant impact;
    // 1 = occasional; 0 = absent or minimal.
    let (score, confidence) =
        if lowered.chars().count() > LONG_RESPONSE_CHARS || (hits >= 2 && lowered.contains("always")) {
            (3, 0.8)
        } else if hits >= 1 || lowered.contains("often") {
            (2, 0.7)
        } else if hits >= 1 || lowered.contains("sometimes") {
            (1, 0.6)
        } else {
            (0, 0.7)
        };

    let excerpt: String = lowered.chars().take(SLOT_EXCERPT_CHARS).collect();
    ctx.slots.assign(question_number, excerpt);

    ctx.inferred_answers.insert(question_number, score);
    ctx.probes_asked.push(question_number);
    ctx.confidence = confidence;

    debug!(
        question = question_number,
        score,
        confidence,
        general_hits = hits,
        "conversational response recorded"
    );

    if ctx.stage == JekyllStage::Phq2Probing && ctx.has_probed(1) && ctx.has_probed(2) {
        ctx.stage = JekyllStage::Decision;
        debug!("both PHQ-2 probes recorded; awaiting promotion decision");
    }

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

    Ok(InferredResponse {
        question_number,
        score,
        confidence,
        risk: RiskReport {
            risk_detected: !matched_phrases.is_empty(),
            matched_phrases,
            severity,
        },
    })
}

/// Settle the PHQ-2 decision: promote or close negative.
///
/// Legal only in the `Decision` stage. Promotion flips the context to
/// PHQ-9 probing; the caller is responsible for promoting the formal
/// assessment alongside.
pub fn decide_promotion(
    ctx: &mut JekyllContext,
    threshold: u8,
) -> AnimaResult<PromotionDecision> {
    if ctx.stage != JekyllStage::Decision {
        return Err(AnimaError::state(format!(
            "promotion decision requested in stage '{}'",
            ctx.stage
        )));
    }

    let phq2_score = ctx.phq2_score();
    if phq2_score >= threshold {
        ctx.stage = JekyllStage::Phq9Probing;
        ctx.phq_type = PhqType::Phq9;
        info!(
            phq2_score,
            threshold, "PHQ-2 score met threshold; promoting to PHQ-9 probing"
        );
        Ok(PromotionDecision::PromoteToPhq9 { phq2_score })
    } else {
        ctx.stage = JekyllStage::Complete;
        info!(
            phq2_score,
            threshold, "PHQ-2 score below threshold; closing as negative screen"
        );
        Ok(PromotionDecision::NegativeScreen { phq2_score })
    }
}

/// Reject probes outside the current stage's question range, and repeats.
fn check_probe_target(ctx: &JekyllContext, question_number: u8) -> AnimaResult<()> {
    let valid = match ctx.stage {
        JekyllStage::Phq2Probing => (1..=2).contains(&question_number),
        JekyllStage::Phq9Probing => (3..=9).contains(&question_number),
        _ => {
            return Err(AnimaError::state(format!(
                "cannot record a response in stage '{}'",
                ctx.stage
            )))
        }
    };
    if !valid {
        return Err(AnimaError::validation(format!(
            "question {} is not probed during stage '{}'",
            question_number, ctx.stage
        )));
    }
    if ctx.has_probed(question_number) {
        return Err(AnimaError::state(format!(
            "question {} was already probed",
            question_number
        )));
    }
    Ok(())
}
