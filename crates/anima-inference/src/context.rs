//! The per-conversation inference context.
//!
//! One `JekyllContext` lives per conversation while a conversational
//! assessment runs. It is created by the start tool, advanced by the
//! engine, and torn down on completion. No module-level state: the context
//! is owned by the conversation it belongs to.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use anima_contracts::ids::{AssessmentId, PhqType};

/// Where the conversational assessment currently stands.
///
/// `Decision` sits between the PHQ-2 probes and the promotion verdict.
/// Risk detection is deliberately not a stage — crisis language can
/// interrupt at any point and is handled as an event, not a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JekyllStage {
    Initial,
    Phq2Probing,
    Decision,
    Phq9Probing,
    Complete,
}

impl std::fmt::Display for JekyllStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JekyllStage::Initial => f.write_str("initial"),
            JekyllStage::Phq2Probing => f.write_str("phq2-probing"),
            JekyllStage::Decision => f.write_str("decision"),
            JekyllStage::Phq9Probing => f.write_str("phq9-probing"),
            JekyllStage::Complete => f.write_str("complete"),
        }
    }
}

/// Free-text fragments captured while probing, by clinical topic.
///
/// Slots hold the first 100 characters of the relevant response, lowercased
/// as analyzed. They enrich the final report; nothing in scoring reads them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContextualSlots {
    pub sleep: Option<String>,
    pub energy: Option<String>,
    pub appetite: Option<String>,
    pub concentration: Option<String>,
    pub self_worth: Option<String>,
    pub psychomotor: Option<String>,
    pub triggers: Vec<String>,
    pub coping: Vec<String>,
    pub support: Option<String>,
}

impl ContextualSlots {
    /// Store an excerpt under the slot its question maps to.
    ///
    /// Questions 1–5 map to concentration, self-worth, sleep, energy, and
    /// appetite respectively; the remaining questions have no slot.
    pub fn assign(&mut self, question_number: u8, excerpt: String) {
        match question_number {
            1 => self.concentration = Some(excerpt),
            2 => self.self_worth = Some(excerpt),
            3 => self.sleep = Some(excerpt),
            4 => self.energy = Some(excerpt),
            5 => self.appetite = Some(excerpt),
            _ => {}
        }
    }
}

/// Live state of one conversational assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JekyllContext {
    /// The assessment this context is inferring answers for.
    pub assessment_id: AssessmentId,
    pub user_id: String,
    /// Tracks the assessment's instrument; flips to PHQ-9 on promotion.
    pub phq_type: PhqType,
    pub stage: JekyllStage,
    /// Inferred 0–3 scores keyed by question number.
    pub inferred_answers: BTreeMap<u8, u8>,
    pub slots: ContextualSlots,
    /// Append-only risk log; entries are never removed or rewritten.
    pub risk_factors: Vec<String>,
    /// Question numbers probed so far, in probe order.
    pub probes_asked: Vec<u8>,
    /// Confidence of the most recent inference, 0–1.
    pub confidence: f64,
}

impl JekyllContext {
    /// A fresh context, ready for PHQ-2 probing.
    pub fn new(assessment_id: AssessmentId, user_id: impl Into<String>) -> Self {
        Self {
            assessment_id,
            user_id: user_id.into(),
            phq_type: PhqType::Phq2,
            stage: JekyllStage::Phq2Probing,
            inferred_answers: BTreeMap::new(),
            slots: ContextualSlots::default(),
            risk_factors: Vec::new(),
            probes_asked: Vec::new(),
            confidence: 0.0,
        }
    }

    /// True once a given question has been probed.
    pub fn has_probed(&self, question_number: u8) -> bool {
        self.probes_asked.contains(&question_number)
    }

    /// Sum of the inferred scores for the PHQ-2 items (questions 1–2).
    pub fn phq2_score(&self) -> u8 {
        self.inferred_answers
            .iter()
            .filter(|(number, _)| **number <= 2)
            .map(|(_, score)| score)
            .sum()
    }

    /// Sum of every inferred score so far.
    pub fn inferred_total(&self) -> u8 {
        self.inferred_answers.values().sum()
    }

    /// Probes still owed in the current probing stage.
    pub fn questions_remaining(&self) -> u8 {
        let range: &[u8] = match self.stage {
            JekyllStage::Phq2Probing | JekyllStage::Decision => &[1, 2],
            JekyllStage::Phq9Probing => &[3, 4, 5, 6, 7, 8, 9],
            _ => return 0,
        };
        range
            .iter()
            .filter(|number| !self.has_probed(**number))
            .count() as u8
    }

    /// The lowest unprobed question of the current probing stage, or `None`
    /// when the stage owes no further probes.
    pub fn next_probe_target(&self) -> Option<u8> {
        let range: &[u8] = match self.stage {
            JekyllStage::Phq2Probing => &[1, 2],
            JekyllStage::Phq9Probing => &[3, 4, 5, 6, 7, 8, 9],
            _ => return None,
        };
        range.iter().copied().find(|number| !self.has_probed(*number))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_serializes_in_kebab_case() {
        let json = serde_json::to_string(&JekyllStage::Phq2Probing).unwrap();
        assert_eq!(json, "\"phq2-probing\"");
        let json = serde_json::to_string(&JekyllStage::Phq9Probing).unwrap();
        assert_eq!(json, "\"phq9-probing\"");
        assert_eq!(JekyllStage::Decision.to_string(), "decision");
    }

    #[test]
    fn new_context_starts_probing_phq2() {
        let ctx = JekyllContext::new(AssessmentId::new(), "user-1");

        assert_eq!(ctx.stage, JekyllStage::Phq2Probing);
        assert_eq!(ctx.phq_type, PhqType::Phq2);
        assert!(ctx.inferred_answers.is_empty());
        assert!(ctx.risk_factors.is_empty());
        assert_eq!(ctx.confidence, 0.0);
        assert_eq!(ctx.questions_remaining(), 2);
    }

    #[test]
    fn slots_assign_follows_the_question_mapping() {
        let mut slots = ContextualSlots::default();
        slots.assign(1, "a".to_string());
        slots.assign(2, "b".to_string());
        slots.assign(3, "c".to_string());
        slots.assign(4, "d".to_string());
        slots.assign(5, "e".to_string());
        slots.assign(9, "ignored".to_string());

        assert_eq!(slots.concentration.as_deref(), Some("a"));
        assert_eq!(slots.self_worth.as_deref(), Some("b"));
        assert_eq!(slots.sleep.as_deref(), Some("c"));
        assert_eq!(slots.energy.as_deref(), Some("d"));
        assert_eq!(slots.appetite.as_deref(), Some("e"));
        assert!(slots.psychomotor.is_none());
    }

    #[test]
    fn phq2_score_ignores_later_questions() {
        let mut ctx = JekyllContext::new(AssessmentId::new(), "user-1");
        ctx.inferred_answers.insert(1, 2);
        ctx.inferred_answers.insert(2, 1);
        ctx.inferred_answers.insert(3, 3);

        assert_eq!(ctx.phq2_score(), 3);
        assert_eq!(ctx.inferred_total(), 6);
    }

    #[test]
    fn questions_remaining_counts_down_per_stage() {
        let mut ctx = JekyllContext::new(AssessmentId::new(), "user-1");
        ctx.probes_asked.push(1);
        assert_eq!(ctx.questions_remaining(), 1);

        ctx.stage = JekyllStage::Phq9Probing;
        ctx.probes_asked.extend([3, 4]);
        assert_eq!(ctx.questions_remaining(), 5);

        ctx.stage = JekyllStage::Complete;
        assert_eq!(ctx.questions_remaining(), 0);
    }

    #[test]
    fn next_probe_target_walks_the_stage_range_in_order() {
        let mut ctx = JekyllContext::new(AssessmentId::new(), "user-1");
        assert_eq!(ctx.next_probe_target(), Some(1));

        ctx.probes_asked.push(1);
        assert_eq!(ctx.next_probe_target(), Some(2));

        ctx.stage = JekyllStage::Phq9Probing;
        ctx.probes_asked.extend([3, 4]);
        assert_eq!(ctx.next_probe_target(), Some(5));

        ctx.stage = JekyllStage::Decision;
        assert_eq!(ctx.next_probe_target(), None);

        ctx.stage = JekyllStage::Complete;
        assert_eq!(ctx.next_probe_target(), None);
    }
}
