//! Runtime error types for the ANIMA pipeline.
//!
//! All fallible operations in the ANIMA crates return `AnimaResult<T>`.
//! Variants carry enough context to produce an actionable log line and a
//! structured failure payload for the conversation layer.

use thiserror::Error;

/// The unified error type for the ANIMA runtime.
#[derive(Debug, Error)]
pub enum AnimaError {
    /// Tool arguments or user input failed validation.
    ///
    /// Recoverable: the conversation layer re-prompts instead of aborting.
    #[error("validation failed: {reason}")]
    Validation { reason: String },

    /// A tool was invoked against missing or inconsistent conversation state
    /// (no active assessment, no inference context, double start).
    #[error("state error: {reason}")]
    State { reason: String },

    /// The named tool does not exist on the conversation's active agent.
    #[error("tool '{tool}' not found on agent '{agent}'")]
    ToolNotFound { tool: String, agent: String },

    /// A handler failed; the router wraps and propagates, never swallows.
    #[error("tool '{tool}' execution failed: {source}")]
    ToolExecutionFailed {
        tool: String,
        #[source]
        source: Box<AnimaError>,
    },

    /// A handoff named an agent the registry does not know.
    ///
    /// This is a configuration error, not a user error — it is fatal.
    #[error("agent '{agent}' not found in registry")]
    AgentNotFound { agent: String },

    /// A session, transcript, or profile collaborator failed.
    ///
    /// Logged and degraded: collaborator trouble never blocks the
    /// in-memory state machines.
    #[error("collaborator call failed: {reason}")]
    Collaborator { reason: String },

    /// Risk was detected but the escalation channel failed.
    ///
    /// Never silently dropped — this variant exists so the failure is
    /// loud at every layer.
    #[error("risk escalation failed: {reason}")]
    RiskEscalation { reason: String },

    /// Registry construction or runtime configuration is invalid.
    #[error("configuration error: {reason}")]
    Config { reason: String },
}

impl AnimaError {
    /// Shorthand for a `Validation` error.
    pub fn validation(reason: impl Into<String>) -> Self {
        AnimaError::Validation {
            reason: reason.into(),
        }
    }

    /// Shorthand for a `State` error.
    pub fn state(reason: impl Into<String>) -> Self {
        AnimaError::State {
            reason: reason.into(),
        }
    }
}

/// Convenience alias used throughout the ANIMA crates.
pub type AnimaResult<T> = Result<T, AnimaError>;
