//! The ANIMA orchestrator: per-conversation tool routing and handoff.
//!
//! The orchestrator owns the registry and all live conversation state. Its
//! routing model is strict:
//!
//!   resolve conversation → resolve tool on the ACTIVE agent → validate
//!   args → run handler → apply handoff
//!
//! A tool call can only ever be attributed to the agent that was active
//! when the call arrived — the active agent changes exclusively through a
//! `ToolResult::Handoff` applied after the handler returns, so handoff is
//! atomic with respect to a single turn.

use std::collections::HashMap;

use tracing::{debug, info};

use anima_contracts::{
    error::{AnimaError, AnimaResult},
    ids::{AgentId, ConversationKey},
    tool::{AgentActivation, DispatchOutcome, ToolCall, ToolResult},
};

use crate::conversation::ConversationState;
use crate::registry::AgentRegistry;

/// The central router for a closed roster of agents.
///
/// Construct one orchestrator per deployment; it serves any number of
/// concurrent conversations, each isolated under its `ConversationKey`.
#[derive(Debug)]
pub struct Orchestrator {
    registry: AgentRegistry,
    conversations: HashMap<ConversationKey, ConversationState>,
}

impl Orchestrator {
    /// Create an orchestrator over a validated registry.
    pub fn new(registry: AgentRegistry) -> Self {
        Self {
            registry,
            conversations: HashMap::new(),
        }
    }

    /// The registry this orchestrator routes against.
    pub fn registry(&self) -> &AgentRegistry {
        &self.registry
    }

    /// Begin (or resume) the conversation for `key`.
    ///
    /// A new conversation starts on the root agent. Calling this for a key
    /// that already has live state is harmless — it returns the activation
    /// of whichever agent is currently active, without resetting anything.
    pub fn begin_conversation(&mut self, key: ConversationKey) -> AnimaResult<AgentActivation> {
        if let Some(existing) = self.conversations.get(&key) {
            return self.registry.activation(&existing.active_agent);
        }

        let root = self.registry.root_id().clone();
        let activation = self.registry.activation(&root)?;
        info!(conversation = %key, root = %root, "conversation began");
        self.conversations
            .insert(key.clone(), ConversationState::new(key, root));
        Ok(activation)
    }

    /// Remove the conversation for `key`, returning its final state.
    pub fn end_conversation(&mut self, key: &ConversationKey) -> Option<ConversationState> {
        let state = self.conversations.remove(key);
        if state.is_some() {
            info!(conversation = %key, "conversation ended");
        }
        state
    }

    /// The live state for `key`, if the conversation has begun.
    pub fn conversation(&self, key: &ConversationKey) -> Option<&ConversationState> {
        self.conversations.get(key)
    }

    /// Mutable access to the live state for `key`.
    pub fn conversation_mut(&mut self, key: &ConversationKey) -> Option<&mut ConversationState> {
        self.conversations.get_mut(key)
    }

    /// The agent currently bound to `key`'s conversation.
    pub fn active_agent(&self, key: &ConversationKey) -> Option<&AgentId> {
        self.conversations.get(key).map(|c| &c.active_agent)
    }

    /// Route one tool call through the conversation for `key`.
    ///
    /// # Pipeline
    ///
    /// 1. Resolve the conversation — dispatching before `begin_conversation`
    ///    is a state error
    /// 2. Resolve the tool by name on the **active agent only** —
    ///    `ToolNotFound` otherwise
    /// 3. Validate args against the tool's compiled parameter schema —
    ///    `Validation` on the first bad call (handlers still re-validate
    ///    defensively)
    /// 4. Run the handler with exclusive access to the conversation state;
    ///    a handler error is wrapped in `ToolExecutionFailed` and
    ///    propagated, never swallowed
    /// 5. If the result is a `Handoff`, resolve the target — an unknown
    ///    target is a fatal `AgentNotFound` and the active agent does not
    ///    change — then switch the active agent and build the target's
    ///    activation bundle
    ///
    /// # Errors
    ///
    /// Returns `Err` for unbegun conversations, unknown tools, schema
    /// violations, handler failures, and unknown handoff targets. A tool
    /// that *ran* and reported a structured failure payload is NOT an
    /// error — that is an ordinary `ToolResult::Data`.
    pub async fn dispatch(
        &mut self,
        key: &ConversationKey,
        call: ToolCall,
    ) -> AnimaResult<DispatchOutcome> {
        let ToolCall { tool_name, args } = call;

        // ── Step 1: Resolve the conversation ─────────────────────────────
        let active = match self.conversations.get(key) {
            Some(conversation) => conversation.active_agent.clone(),
            None => {
                return Err(AnimaError::State {
                    reason: format!("conversation '{}' has not begun", key),
                })
            }
        };

        debug!(
            conversation = %key,
            agent = %active,
            tool = %tool_name,
            "dispatching tool call"
        );

        // ── Step 2: Resolve the tool on the active agent ─────────────────
        let tool = self.registry.find_tool(&active, &tool_name)?;
        let handler = std::sync::Arc::clone(&tool.handler);

        // ── Step 3: Schema validation ────────────────────────────────────
        self.registry.validate_args(&active, &tool_name, &args)?;

        // ── Step 4: Run the handler ──────────────────────────────────────
        //
        // The conversation entry is guaranteed present: nothing between
        // step 1 and here removes entries, and `&mut self` excludes
        // concurrent callers.
        let conversation = self
            .conversations
            .get_mut(key)
            .ok_or_else(|| AnimaError::State {
                reason: format!("conversation '{}' has not begun", key),
            })?;

        let result = handler
            .call(conversation, args)
            .await
            .map_err(|source| AnimaError::ToolExecutionFailed {
                tool: tool_name.clone(),
                source: Box::new(source),
            })?;

        // ── Step 5: Apply any handoff ────────────────────────────────────
        let activation = match &result {
            ToolResult::Handoff {
                target_agent_id, ..
            } => {
                // Resolve the target before touching routing state, so a
                // bad target leaves the conversation on its current agent.
                let activation = self.registry.activation(target_agent_id)?;
                let conversation =
                    self.conversations
                        .get_mut(key)
                        .ok_or_else(|| AnimaError::State {
                            reason: format!("conversation '{}' has not begun", key),
                        })?;
                info!(
                    conversation = %key,
                    from = %conversation.active_agent,
                    to = %target_agent_id,
                    tool = %tool_name,
                    "handoff"
                );
                conversation.active_agent = target_agent_id.clone();
                Some(activation)
            }
            ToolResult::Data { .. } => None,
        };

        Ok(DispatchOutcome { result, activation })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
