//! Agent registry: the closed roster of agents and their tools.
//!
//! A registry is built once at startup by `AgentRegistryBuilder` and never
//! mutated afterwards. Building validates the whole configuration up front:
//!
//! 1. exactly one agent is designated root,
//! 2. agent ids are unique,
//! 3. tool names are unique within each agent,
//! 4. every tool's parameter schema compiles as JSON Schema.
//!
//! Building also injects **switch tools**: for every ordered pair of
//! distinct agents (A, B), if A does not already declare a tool named after
//! B's id, A receives a parameterless tool of that name whose handler
//! requests a handoff to B. An agent that declares its own tool under
//! another agent's id keeps it — explicit handoff tools take precedence
//! over injected ones.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use anima_contracts::{
    error::{AnimaError, AnimaResult},
    ids::AgentId,
    tool::{AgentActivation, ToolResult, ToolSpec},
};

use crate::conversation::ConversationState;
use crate::traits::ToolHandler;

// ── Tool and agent definitions ────────────────────────────────────────────────

/// One tool: its manifest plus the handler that executes it.
pub struct Tool {
    /// Tool name, unique within the owning agent.
    pub name: String,
    /// Human/LLM-facing description of what the tool does.
    pub description: String,
    /// JSON Schema document for the tool's arguments.
    pub parameters: serde_json::Value,
    /// The logic invoked when the tool is called.
    pub handler: Arc<dyn ToolHandler>,
}

impl Tool {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: serde_json::Value,
        handler: Arc<dyn ToolHandler>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
            handler,
        }
    }

    /// The serializable manifest for this tool.
    pub fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: self.name.clone(),
            description: self.description.clone(),
            parameters: self.parameters.clone(),
        }
    }
}

impl fmt::Debug for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tool")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}

/// One registered agent: identity, conversational framing, and tools.
#[derive(Debug)]
pub struct Agent {
    /// Stable id, also the name of switch tools that target this agent.
    pub id: AgentId,
    /// One-line summary of the agent's scope. Used verbatim as the
    /// description of injected switch tools targeting this agent.
    pub description: String,
    /// The system message the conversation layer primes the LLM with while
    /// this agent is active.
    pub system_message: String,
    /// Declared tools, in declaration order. Injected switch tools are
    /// appended at registry build time.
    pub tools: Vec<Tool>,
}

impl Agent {
    pub fn new(
        id: AgentId,
        description: impl Into<String>,
        system_message: impl Into<String>,
        tools: Vec<Tool>,
    ) -> Self {
        Self {
            id,
            description: description.into(),
            system_message: system_message.into(),
            tools,
        }
    }
}

// ── Switch tools ──────────────────────────────────────────────────────────────

/// Handler behind every injected switch tool: requests a handoff to a fixed
/// target agent.
struct SwitchToolHandler {
    target: AgentId,
}

#[async_trait]
impl ToolHandler for SwitchToolHandler {
    async fn call(
        &self,
        _conversation: &mut ConversationState,
        _args: serde_json::Value,
    ) -> AnimaResult<ToolResult> {
        Ok(ToolResult::handoff(
            self.target.clone(),
            json!({
                "agent_switch": true,
                "message": format!("Switching you to {}.", self.target),
            }),
        ))
    }
}

/// The description every non-root agent's return-to-root switch tool carries.
fn return_to_root_description(root: &AgentId) -> String {
    format!(
        "If the customer asks any question that is outside of your work scope, \
         use this to switch back to {root}. Always call this when you complete \
         your task or the customer has other questions."
    )
}

/// Parameter schema for injected switch tools: an empty argument object.
fn switch_tool_parameters() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {},
        "required": []
    })
}

// ── Builder ───────────────────────────────────────────────────────────────────

/// Builds an `AgentRegistry`, validating the configuration as a whole.
#[derive(Debug, Default)]
pub struct AgentRegistryBuilder {
    root: Option<AgentId>,
    agents: Vec<Agent>,
}

impl AgentRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `agent` and designate it the root of the roster.
    ///
    /// The root is where every new conversation starts and where the
    /// injected return-to-root switch tools point.
    pub fn with_root(mut self, agent: Agent) -> Self {
        self.root = Some(agent.id.clone());
        self.agents.push(agent);
        self
    }

    /// Register a non-root agent.
    pub fn with_agent(mut self, agent: Agent) -> Self {
        self.agents.push(agent);
        self
    }

    /// Validate the roster, inject switch tools, and compile every tool's
    /// parameter schema.
    ///
    /// Returns `AnimaError::Config` for a missing root, duplicate agent id,
    /// duplicate tool name within an agent, or a parameter document that is
    /// not valid JSON Schema.
    pub fn build(self) -> AnimaResult<AgentRegistry> {
        let root = self.root.ok_or_else(|| AnimaError::Config {
            reason: "registry has no root agent".into(),
        })?;
        let mut agents = self.agents;

        // ── Roster validation ────────────────────────────────────────────
        let mut seen_ids: Vec<&AgentId> = Vec::new();
        for agent in &agents {
            if seen_ids.contains(&&agent.id) {
                return Err(AnimaError::Config {
                    reason: format!("duplicate agent id '{}'", agent.id),
                });
            }
            seen_ids.push(&agent.id);

            let mut seen_tools: Vec<&str> = Vec::new();
            for tool in &agent.tools {
                if seen_tools.contains(&tool.name.as_str()) {
                    return Err(AnimaError::Config {
                        reason: format!(
                            "agent '{}' declares duplicate tool '{}'",
                            agent.id, tool.name
                        ),
                    });
                }
                seen_tools.push(&tool.name);
            }
        }

        // ── Switch-tool injection ────────────────────────────────────────
        //
        // Snapshot the roster first; injection appends to each agent's tool
        // list in roster order, skipping pairs where the source agent
        // already declares a tool under the target's id.
        let roster: Vec<(AgentId, String)> = agents
            .iter()
            .map(|a| (a.id.clone(), a.description.clone()))
            .collect();

        for agent in &mut agents {
            for (target_id, target_description) in &roster {
                if *target_id == agent.id {
                    continue;
                }
                if agent.tools.iter().any(|t| t.name == target_id.as_str()) {
                    continue;
                }
                let description = if *target_id == root {
                    return_to_root_description(&root)
                } else {
                    target_description.clone()
                };
                debug!(
                    agent_id = %agent.id,
                    target = %target_id,
                    "injecting switch tool"
                );
                agent.tools.push(Tool::new(
                    target_id.as_str(),
                    description,
                    switch_tool_parameters(),
                    Arc::new(SwitchToolHandler {
                        target: target_id.clone(),
                    }),
                ));
            }
        }

        // ── Schema compilation ───────────────────────────────────────────
        let mut validators: HashMap<(AgentId, String), jsonschema::Validator> = HashMap::new();
        for agent in &agents {
            for tool in &agent.tools {
                let validator =
                    jsonschema::validator_for(&tool.parameters).map_err(|e| AnimaError::Config {
                        reason: format!(
                            "tool '{}' on agent '{}' has a malformed parameter schema: {}",
                            tool.name, agent.id, e
                        ),
                    })?;
                validators.insert((agent.id.clone(), tool.name.clone()), validator);
            }
        }

        let agents: HashMap<AgentId, Agent> =
            agents.into_iter().map(|a| (a.id.clone(), a)).collect();

        Ok(AgentRegistry {
            root,
            agents,
            validators,
        })
    }
}

// ── Registry ──────────────────────────────────────────────────────────────────

/// The immutable, validated agent roster.
pub struct AgentRegistry {
    root: AgentId,
    agents: HashMap<AgentId, Agent>,
    validators: HashMap<(AgentId, String), jsonschema::Validator>,
}

impl AgentRegistry {
    /// The id of the root agent, where every new conversation starts.
    pub fn root_id(&self) -> &AgentId {
        &self.root
    }

    /// Look up an agent by id.
    pub fn agent(&self, id: &AgentId) -> AnimaResult<&Agent> {
        self.agents.get(id).ok_or_else(|| AnimaError::AgentNotFound {
            agent: id.to_string(),
        })
    }

    /// Ids of every registered agent, in no particular order.
    pub fn agent_ids(&self) -> impl Iterator<Item = &AgentId> {
        self.agents.keys()
    }

    /// Locate a tool by name on one agent.
    pub fn find_tool(&self, agent_id: &AgentId, tool_name: &str) -> AnimaResult<&Tool> {
        let agent = self.agent(agent_id)?;
        agent
            .tools
            .iter()
            .find(|t| t.name == tool_name)
            .ok_or_else(|| AnimaError::ToolNotFound {
                tool: tool_name.to_string(),
                agent: agent_id.to_string(),
            })
    }

    /// Validate `args` against the compiled parameter schema of one tool.
    ///
    /// All schema violations are collected into a single `Validation` error
    /// so the caller sees the full failure set in one pass.
    pub fn validate_args(
        &self,
        agent_id: &AgentId,
        tool_name: &str,
        args: &serde_json::Value,
    ) -> AnimaResult<()> {
        let validator = self
            .validators
            .get(&(agent_id.clone(), tool_name.to_string()))
            .ok_or_else(|| AnimaError::ToolNotFound {
                tool: tool_name.to_string(),
                agent: agent_id.to_string(),
            })?;

        let violations: Vec<String> = validator
            .iter_errors(args)
            .map(|error| format!("at {}: {}", error.instance_path, error))
            .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(AnimaError::Validation {
                reason: format!(
                    "arguments for tool '{}' failed schema validation: {}",
                    tool_name,
                    violations.join("; ")
                ),
            })
        }
    }

    /// The activation bundle for one agent: system message plus the full
    /// tool manifest, injected switch tools included.
    pub fn activation(&self, id: &AgentId) -> AnimaResult<AgentActivation> {
        let agent = self.agent(id)?;
        Ok(AgentActivation {
            agent_id: agent.id.clone(),
            system_message: agent.system_message.clone(),
            tools: agent.tools.iter().map(Tool::spec).collect(),
        })
    }
}

impl fmt::Debug for AgentRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentRegistry")
            .field("root", &self.root)
            .field("agents", &self.agents.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
