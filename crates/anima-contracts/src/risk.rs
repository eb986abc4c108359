//! Risk detection outputs and escalation severities.

use serde::{Deserialize, Serialize};

/// Severity assigned by the phrase detector.
///
/// `Critical` means an immediate-risk phrase matched (question 9 territory);
/// `High` means one or more general risk phrases matched for the question
/// under discussion. Detection is advisory — it informs escalation, it never
/// alters scores on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskSeverity {
    High,
    Critical,
}

/// The result of scanning one utterance for risk phrases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskReport {
    /// True when any phrase matched.
    pub risk_detected: bool,
    /// Every phrase that matched, in catalogue order.
    pub matched_phrases: Vec<String>,
    /// Highest severity among the matches; absent when nothing matched.
    pub severity: Option<RiskSeverity>,
}

impl RiskReport {
    /// True when the report carries a critical match.
    pub fn is_critical(&self) -> bool {
        self.severity == Some(RiskSeverity::Critical)
    }
}

/// Severity scale used when an agent raises an explicit risk alert.
///
/// Broader than `RiskSeverity` because the reporting agent may flag
/// concerning-but-not-phrase-matched signals at lower levels. Only
/// `Critical` triggers the handoff-to-crisis advice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Low,
    Moderate,
    High,
    Critical,
}

impl AlertSeverity {
    pub fn is_critical(&self) -> bool {
        matches!(self, AlertSeverity::Critical)
    }

    /// Parse the lowercase wire form ("low", "moderate", "high", "critical").
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "low" => Some(AlertSeverity::Low),
            "moderate" => Some(AlertSeverity::Moderate),
            "high" => Some(AlertSeverity::High),
            "critical" => Some(AlertSeverity::Critical),
            _ => None,
        }
    }
}

impl std::fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertSeverity::Low => f.write_str("low"),
            AlertSeverity::Moderate => f.write_str("moderate"),
            AlertSeverity::High => f.write_str("high"),
            AlertSeverity::Critical => f.write_str("critical"),
        }
    }
}
