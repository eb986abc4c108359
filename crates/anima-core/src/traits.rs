//! Core trait definitions for the ANIMA conversation pipeline.
//!
//! These four traits define the seams of the runtime:
//!
//! - `ToolHandler`     — the logic behind one tool (may drive an LLM's side effects)
//! - `SessionStore`    — durable per-conversation assessment progress
//! - `TranscriptStore` — append-only conversation record
//! - `ProfileStore`    — field-level user profile persistence
//!
//! The orchestrator wires tool handlers to conversations; the three store
//! traits are collaborators the handlers write through. Store failures are
//! best-effort by policy: handlers log and degrade rather than block the
//! in-memory state machines (risk escalation being the loud exception).

use async_trait::async_trait;

use anima_contracts::{
    error::AnimaResult,
    ids::{AssessmentId, ConversationKey, PhqType},
    progress::SessionProgress,
    tool::ToolResult,
};

use crate::conversation::ConversationState;

/// The logic behind one tool.
///
/// Handlers receive exclusive access to the calling conversation's state and
/// the raw argument object. They re-validate arguments defensively — the
/// router's schema check is advisory — and return exactly one `ToolResult`.
/// A handoff is returned as data, never performed as a side effect.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Execute the tool against one conversation.
    ///
    /// The orchestrator guarantees `conversation` belongs to the key the
    /// call was dispatched for, and awaits the returned future to completion
    /// before evaluating any handoff.
    async fn call(
        &self,
        conversation: &mut ConversationState,
        args: serde_json::Value,
    ) -> AnimaResult<ToolResult>;
}

/// Durable assessment-progress bookkeeping, one record per conversation.
///
/// The runtime is the exclusive writer of `SessionProgress`; implementations
/// only persist what these calls describe. Calls must be replay-safe — a
/// resumed conversation may re-issue an `initialize_session` or
/// `record_answer` it already sent before a crash.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Open the progress record for a starting assessment.
    async fn initialize_session(
        &self,
        key: &ConversationKey,
        assessment_id: AssessmentId,
        phq_type: PhqType,
    ) -> AnimaResult<()>;

    /// Record the text a question was actually presented with.
    ///
    /// For conversational screenings this is the contextual probe, not the
    /// verbatim instrument wording.
    async fn set_question_text(
        &self,
        key: &ConversationKey,
        question_number: u8,
        text: &str,
    ) -> AnimaResult<()>;

    /// Record a valid answer for a question.
    async fn record_answer(
        &self,
        key: &ConversationKey,
        question_number: u8,
        score: u8,
    ) -> AnimaResult<()>;

    /// Record one invalid attempt against a question.
    async fn record_invalid_attempt(
        &self,
        key: &ConversationKey,
        question_number: u8,
    ) -> AnimaResult<()>;

    /// Mark a question skipped after its attempt budget is spent.
    async fn mark_skipped(&self, key: &ConversationKey, question_number: u8) -> AnimaResult<()>;

    /// Record a PHQ-2 → PHQ-9 promotion of the running assessment.
    async fn update_assessment_type(
        &self,
        key: &ConversationKey,
        phq_type: PhqType,
    ) -> AnimaResult<()>;

    /// Finalize the record with score, severity, and interpretation.
    async fn complete_assessment(
        &self,
        key: &ConversationKey,
        score: u8,
        severity: &str,
        interpretation: &str,
        recommendations: &[String],
    ) -> AnimaResult<()>;

    /// Close the session record.
    async fn end_session(&self, key: &ConversationKey) -> AnimaResult<()>;

    /// Completed assessments for a user, most recent first, at most `limit`.
    async fn history(&self, user_id: &str, limit: usize) -> AnimaResult<Vec<SessionProgress>>;
}

/// Append-only conversation record.
///
/// Every scored answer and every completion summary is written here;
/// `metadata` always carries the `assessment_id` so entries stay traceable
/// to the screening they belong to. Entries are never modified or deleted.
#[async_trait]
pub trait TranscriptStore: Send + Sync {
    /// Append a message the user said.
    async fn add_user_message(
        &self,
        key: &ConversationKey,
        text: &str,
        tag: &str,
        metadata: serde_json::Value,
    ) -> AnimaResult<()>;

    /// Append a message the assistant said (or an internal record).
    async fn add_assistant_message(
        &self,
        key: &ConversationKey,
        text: &str,
        tag: &str,
        metadata: serde_json::Value,
    ) -> AnimaResult<()>;
}

/// Field-level user profile persistence (the Matron-adjacent collaborator).
///
/// Writes auto-persist; the runtime stays agnostic to how and when they
/// complete.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Set one scalar profile field.
    async fn update_field(
        &self,
        user_id: &str,
        field: &str,
        value: serde_json::Value,
    ) -> AnimaResult<()>;

    /// Append values to an array-valued profile field.
    async fn add_to_array_field(
        &self,
        user_id: &str,
        field: &str,
        values: Vec<serde_json::Value>,
    ) -> AnimaResult<()>;

    /// The full profile for a user, if one exists.
    async fn get_profile(&self, user_id: &str) -> AnimaResult<Option<serde_json::Value>>;

    /// Whether any profile data exists for a user.
    async fn has_profile(&self, user_id: &str) -> AnimaResult<bool>;
}
