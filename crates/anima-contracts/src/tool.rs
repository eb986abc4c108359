//! Tool invocation requests, results, and manifests.
//!
//! `ToolCall` is what the router receives; `ToolResult` is what every tool
//! handler returns. `DispatchOutcome` is the orchestrator's answer to the
//! caller after routing, executing, and applying any handoff.

use serde::{Deserialize, Serialize};

use crate::ids::AgentId;

/// A request to invoke one named tool on the conversation's active agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Name of the tool, resolved against the active agent only.
    pub tool_name: String,
    /// Arguments as a JSON object. Validated against the tool's parameter
    /// schema before the handler runs.
    pub args: serde_json::Value,
}

impl ToolCall {
    pub fn new(tool_name: impl Into<String>, args: serde_json::Value) -> Self {
        Self {
            tool_name: tool_name.into(),
            args,
        }
    }
}

/// What a tool handler produced.
///
/// Every handler returns exactly one of these; the orchestrator matches
/// exhaustively. A handoff is data, not a side effect — the handler never
/// mutates routing state itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ToolResult {
    /// An ordinary result payload for the calling conversation layer.
    Data {
        /// Arbitrary JSON body surfaced to the caller.
        payload: serde_json::Value,
    },

    /// A request to make `target_agent_id` the conversation's active agent.
    ///
    /// The payload typically carries a user-facing transition message.
    /// The orchestrator validates the target against the registry; an
    /// unknown target is a fatal configuration error.
    Handoff {
        target_agent_id: AgentId,
        payload: serde_json::Value,
    },
}

impl ToolResult {
    /// Shorthand for a `Data` result.
    pub fn data(payload: serde_json::Value) -> Self {
        ToolResult::Data { payload }
    }

    /// Shorthand for a `Handoff` result.
    pub fn handoff(target: AgentId, payload: serde_json::Value) -> Self {
        ToolResult::Handoff {
            target_agent_id: target,
            payload,
        }
    }
}

/// The serializable face of one tool: name, description, parameter schema.
///
/// This is what gets exported to the conversation layer (an LLM needs the
/// manifest to decide what to call); the handler itself never leaves the
/// registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    /// JSON Schema document for the tool's arguments.
    pub parameters: serde_json::Value,
}

/// Instructions for re-priming the conversation layer after a handoff.
///
/// Emitted alongside the tool result whenever the active agent changed, so
/// the caller can swap the system message and tool manifest it advertises.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentActivation {
    /// The newly active agent.
    pub agent_id: AgentId,
    /// The new agent's system message, verbatim.
    pub system_message: String,
    /// Manifests for every tool the new agent exposes, switch tools included.
    pub tools: Vec<ToolSpec>,
}

/// The outcome of one routed tool invocation.
///
/// Callers inspect `result` for the payload and `activation` to learn
/// whether the active agent changed this turn. `activation` is `Some` iff
/// the handler returned `ToolResult::Handoff`.
#[derive(Debug, Clone)]
pub struct DispatchOutcome {
    /// The handler's result, returned verbatim.
    pub result: ToolResult,
    /// Present when the invocation switched the active agent.
    pub activation: Option<AgentActivation>,
}
