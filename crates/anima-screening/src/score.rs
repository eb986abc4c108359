//! Severity bands and clinical interpretation.
//!
//! Severity is a pure table lookup over the total score. Interpretation
//! adds the clinical summary and recommendation list; for the PHQ-9, any
//! non-zero answer on the self-harm item forces crisis-resource text to the
//! front of the recommendations regardless of the total score band.

use serde::{Deserialize, Serialize};

use anima_contracts::ids::PhqType;

use crate::assessment::Assessment;

/// Crisis-resource line prepended whenever question 9 scored above zero.
pub const CRISIS_PRIORITY_LINE: &str = "⚠️ PRIORITY: Seek immediate help for suicidal thoughts";

/// Crisis-hotline line appended alongside the priority line.
pub const CRISIS_HOTLINE_LINE: &str =
    "Contact crisis hotline: 988 (US) or local emergency services";

/// Map a total score to its severity band label.
///
/// PHQ-2: 0–2 "Low", 3–6 "Elevated, recommend PHQ-9".
/// PHQ-9: the standard clinical bands (0–4 Minimal through 20–27 Severe).
pub fn determine_severity(score: u8, phq_type: PhqType) -> &'static str {
    match phq_type {
        PhqType::Phq2 => {
            if score >= 3 {
                "Elevated, recommend PHQ-9"
            } else {
                "Low"
            }
        }
        PhqType::Phq9 => {
            if score <= 4 {
                "Minimal"
            } else if score <= 9 {
                "Mild"
            } else if score <= 14 {
                "Moderate"
            } else if score <= 19 {
                "Moderately severe"
            } else {
                "Severe"
            }
        }
    }
}

/// Clinical summary plus recommendation strings for a completed assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interpretation {
    pub summary: String,
    pub recommendations: Vec<String>,
}

/// Interpret an assessment's score in clinical terms.
///
/// Reads the total score, the instrument type, and (for the PHQ-9) the
/// self-harm item. Valid on any assessment; callers normally invoke it at
/// completion.
pub fn interpret(assessment: &Assessment) -> Interpretation {
    let score = assessment.calculate_score();
    match assessment.phq_type {
        PhqType::Phq2 => interpret_phq2(score),
        PhqType::Phq9 => {
            let q9_flagged = assessment
                .question(9)
                .and_then(|q| q.answer)
                .map(|a| a > 0)
                .unwrap_or(false);
            interpret_phq9(score, q9_flagged)
        }
    }
}

fn interpret_phq2(score: u8) -> Interpretation {
    if score >= 3 {
        Interpretation {
            summary: "Positive screen for depression. Further evaluation recommended.".to_string(),
            recommendations: vec![
                "Consider completing PHQ-9 for comprehensive assessment".to_string(),
                "Discuss results with healthcare provider".to_string(),
                "Consider mental health professional consultation".to_string(),
            ],
        }
    } else {
        Interpretation {
            summary: "Negative screen for depression. Low likelihood of major depression."
                .to_string(),
            recommendations: vec![
                "Continue monitoring mood and wellbeing".to_string(),
                "Seek help if symptoms worsen or persist".to_string(),
            ],
        }
    }
}

fn interpret_phq9(score: u8, q9_flagged: bool) -> Interpretation {
    let summary = match determine_severity(score, PhqType::Phq9) {
        "Minimal" => "Minimal depression. May not require treatment.",
        "Mild" => "Mild depression. Consider counseling, follow-up, or watchful waiting.",
        "Moderate" => "Moderate depression. Consider psychotherapy or medication.",
        "Moderately severe" => "Moderately severe depression. Active treatment recommended.",
        _ => "Severe depression. Immediate active treatment required.",
    }
    .to_string();

    let mut recommendations = Vec::new();
    if score >= 10 {
        recommendations.push("Consider professional mental health treatment".to_string());
        recommendations.push("Discuss medication options with healthcare provider".to_string());
    }
    if score >= 5 {
        recommendations.push("Consider psychotherapy or counseling".to_string());
        recommendations.push("Monitor symptoms closely".to_string());
    }

    if q9_flagged {
        recommendations.insert(0, CRISIS_PRIORITY_LINE.to_string());
        recommendations.push(CRISIS_HOTLINE_LINE.to_string());
    }

    Interpretation {
        summary,
        recommendations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Severity bands ───────────────────────────────────────────────────────

    #[test]
    fn phq2_severity_splits_at_three() {
        assert_eq!(determine_severity(0, PhqType::Phq2), "Low");
        assert_eq!(determine_severity(2, PhqType::Phq2), "Low");
        assert_eq!(
            determine_severity(3, PhqType::Phq2),
            "Elevated, recommend PHQ-9"
        );
        assert_eq!(
            determine_severity(6, PhqType::Phq2),
            "Elevated, recommend PHQ-9"
        );
    }

    /// Exact band boundaries: 4 is still Minimal, 5 is Mild, and so on up.
    #[test]
    fn phq9_severity_band_boundaries_are_exact() {
        assert_eq!(determine_severity(0, PhqType::Phq9), "Minimal");
        assert_eq!(determine_severity(4, PhqType::Phq9), "Minimal");
        assert_eq!(determine_severity(5, PhqType::Phq9), "Mild");
        assert_eq!(determine_severity(9, PhqType::Phq9), "Mild");
        assert_eq!(determine_severity(10, PhqType::Phq9), "Moderate");
        assert_eq!(determine_severity(14, PhqType::Phq9), "Moderate");
        assert_eq!(determine_severity(15, PhqType::Phq9), "Moderately severe");
        assert_eq!(determine_severity(19, PhqType::Phq9), "Moderately severe");
        assert_eq!(determine_severity(20, PhqType::Phq9), "Severe");
        assert_eq!(determine_severity(27, PhqType::Phq9), "Severe");
    }

    // ── Interpretation ───────────────────────────────────────────────────────

    #[test]
    fn phq2_positive_screen_recommends_the_full_instrument() {
        let mut assessment = Assessment::new(PhqType::Phq2, "user-1");
        assessment.record_answer(1, 2).unwrap();
        assessment.record_answer(2, 1).unwrap();

        let interpretation = interpret(&assessment);
        assert!(interpretation.summary.contains("Positive screen"));
        assert!(interpretation
            .recommendations
            .iter()
            .any(|r| r.contains("PHQ-9")));
    }

    #[test]
    fn phq2_negative_screen_recommends_monitoring() {
        let mut assessment = Assessment::new(PhqType::Phq2, "user-1");
        assessment.record_answer(1, 1).unwrap();
        assessment.record_answer(2, 1).unwrap();

        let interpretation = interpret(&assessment);
        assert!(interpretation.summary.contains("Negative screen"));
        assert!(interpretation
            .recommendations
            .iter()
            .any(|r| r.contains("monitoring")));
    }

    #[test]
    fn phq9_moderate_scores_collect_both_recommendation_tiers() {
        let mut assessment = Assessment::new(PhqType::Phq9, "user-1");
        // Score 12: questions 1-4 at 3, the rest at 0.
        for number in 1..=4 {
            assessment.record_answer(number, 3).unwrap();
        }
        for number in 5..=9 {
            assessment.record_answer(number, 0).unwrap();
        }

        let interpretation = interpret(&assessment);
        assert!(interpretation.summary.contains("Moderate depression"));
        assert!(interpretation
            .recommendations
            .iter()
            .any(|r| r.contains("professional mental health treatment")));
        assert!(interpretation
            .recommendations
            .iter()
            .any(|r| r.contains("psychotherapy or counseling")));
    }

    /// Any non-zero self-harm answer forces crisis resources to the front,
    /// even when the total score sits in the lowest band.
    #[test]
    fn phq9_self_harm_answer_forces_crisis_resources() {
        let mut assessment = Assessment::new(PhqType::Phq9, "user-1");
        for number in 1..=8 {
            assessment.record_answer(number, 0).unwrap();
        }
        assessment.record_answer(9, 1).unwrap();

        let interpretation = interpret(&assessment);
        assert!(interpretation.summary.contains("Minimal depression"));
        assert_eq!(interpretation.recommendations[0], CRISIS_PRIORITY_LINE);
        assert!(interpretation
            .recommendations
            .iter()
            .any(|r| r.contains("988")));
    }

    #[test]
    fn phq9_zero_self_harm_answer_adds_no_crisis_text() {
        let mut assessment = Assessment::new(PhqType::Phq9, "user-1");
        for number in 1..=9 {
            assessment.record_answer(number, 0).unwrap();
        }

        let interpretation = interpret(&assessment);
        assert!(!interpretation
            .recommendations
            .iter()
            .any(|r| r.contains("988")));
    }
}
