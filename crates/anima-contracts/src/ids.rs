//! Identity types for agents, assessments, and conversations.
//!
//! These types define the vocabulary shared across the ANIMA pipeline.
//! They are intentionally minimal — ANIMA does not prescribe how the
//! surrounding application mints user or session identifiers.

use serde::{Deserialize, Serialize};

/// Stable, human-readable identifier for an agent.
///
/// Used as the routing key for handoffs and as the name of the injected
/// switch tools. Example: AgentId("Agent_Jekyll")
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentId(pub String);

impl AgentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique identifier for a single assessment instance.
///
/// Minted when an assessment starts and carried in every session-progress
/// record and transcript entry the assessment produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssessmentId(pub uuid::Uuid);

impl AssessmentId {
    /// Create a new, unique assessment ID.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for AssessmentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AssessmentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// The isolation unit for all conversation state.
///
/// Every assessment, inference context, and retry counter is keyed by this
/// pair. Two conversations never share mutable state, and a handoff between
/// agents preserves the key unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationKey {
    pub user_id: String,
    pub session_id: String,
}

impl ConversationKey {
    pub fn new(user_id: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            session_id: session_id.into(),
        }
    }
}

impl std::fmt::Display for ConversationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.user_id, self.session_id)
    }
}

/// Which standardized screening instrument an assessment administers.
///
/// PHQ-2 is the two-question short form; PHQ-9 the full nine-question
/// instrument. A PHQ-2 can be promoted to a PHQ-9 mid-flight, carrying its
/// first two answers over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhqType {
    Phq2,
    Phq9,
}

impl PhqType {
    /// Number of questions the instrument administers.
    pub fn question_count(&self) -> u8 {
        match self {
            PhqType::Phq2 => 2,
            PhqType::Phq9 => 9,
        }
    }

    /// Maximum attainable total score (every answer at 3).
    pub fn max_score(&self) -> u8 {
        match self {
            PhqType::Phq2 => 6,
            PhqType::Phq9 => 27,
        }
    }
}

impl std::fmt::Display for PhqType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PhqType::Phq2 => f.write_str("PHQ-2"),
            PhqType::Phq9 => f.write_str("PHQ-9"),
        }
    }
}
