//! Per-conversation runtime state.
//!
//! One `ConversationState` exists per `(user_id, session_id)` key. All
//! mutable screening state lives here — the active agent, the running
//! assessment, the conversational inference context, and the retry
//! counters agents consult. Nothing is shared between conversations, so
//! two users (or two sessions of one user) can never observe each other's
//! progress.

use anima_contracts::{
    error::{AnimaError, AnimaResult},
    ids::{AgentId, ConversationKey},
};
use anima_inference::JekyllContext;
use anima_screening::Assessment;

/// All mutable state for one conversation.
#[derive(Debug)]
pub struct ConversationState {
    /// The key this state belongs to.
    pub key: ConversationKey,
    /// The agent currently bound to the conversation.
    pub active_agent: AgentId,
    /// The running assessment, if a screening has been started.
    pub assessment: Option<Assessment>,
    /// Conversational-inference context, present only during Jekyll screenings.
    pub jekyll: Option<JekyllContext>,
    /// Failed voice-recording attempts in the current recording task.
    pub recording_attempts: u8,
    /// Failed biometric-collection attempts in the current collection task.
    pub collection_attempts: u8,
}

impl ConversationState {
    /// Fresh state bound to the given agent.
    pub fn new(key: ConversationKey, active_agent: AgentId) -> Self {
        Self {
            key,
            active_agent,
            assessment: None,
            jekyll: None,
            recording_attempts: 0,
            collection_attempts: 0,
        }
    }

    /// The running assessment, or a state error if none has been started.
    pub fn require_assessment(&mut self) -> AnimaResult<&mut Assessment> {
        self.assessment.as_mut().ok_or_else(|| AnimaError::State {
            reason: "no active assessment in this conversation".into(),
        })
    }

    /// The inference context, or a state error if no conversational
    /// screening is running.
    pub fn require_jekyll(&mut self) -> AnimaResult<&mut JekyllContext> {
        self.jekyll.as_mut().ok_or_else(|| AnimaError::State {
            reason: "no conversational screening in progress".into(),
        })
    }

    /// Both the assessment and the inference context, for tools that keep
    /// the two in lockstep.
    pub fn require_screening(&mut self) -> AnimaResult<(&mut Assessment, &mut JekyllContext)> {
        match (self.assessment.as_mut(), self.jekyll.as_mut()) {
            (Some(assessment), Some(jekyll)) => Ok((assessment, jekyll)),
            _ => Err(AnimaError::State {
                reason: "no conversational screening in progress".into(),
            }),
        }
    }

    /// Drop all screening state, leaving the conversation bound to its
    /// current agent with clean counters.
    pub fn clear_screening(&mut self) {
        self.assessment = None;
        self.jekyll = None;
    }
}
