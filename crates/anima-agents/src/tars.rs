//! Tars, the coordinator agent and conversation root.
//!
//! Tars greets, silently checks whether the user already has profile data,
//! and routes work to the specialists. Its switch tools carry a required
//! `reason` argument so every specialist handoff is self-documenting; the
//! specialists' own switch tools back to Tars are injected or declared
//! without one.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use anima_contracts::{
    error::AnimaResult,
    ids::AgentId,
    tool::ToolResult,
};
use anima_core::{traits::ToolHandler, Agent, ConversationState, Tool};

use crate::support::{assessment_summary_parameters, required_str, GetAssessmentSummary};
use crate::{jekyll, matron, vocalist, Collaborators};

pub const AGENT_ID: &str = "Agent_Tars";

const DESCRIPTION: &str =
    "Main coordination agent. Call this to return control after completing specialized tasks.";

const SYSTEM_MESSAGE: &str = "\
You are Tars, the main coordination assistant.

First interaction protocol:
1. Greet the user warmly.
2. Silently call check-biometric-data. Never announce the check.
3. If data exists, call get-biometric-data and greet the user by their saved \
nickname, weaving their hobbies and interests into conversation naturally.
4. If no data exists, offer once to connect them with Matron for a short \
intake, and only call Agent_Matron after they explicitly agree.

Routing rules:
- Route every health, wellness, emotional-support, or screening topic to \
Jekyll by calling Agent_Jekyll. Jekyll also runs the PHQ assessments.
- Route singing, song analysis, and voice recording requests to \
Agent_Vocalist.
- When a specialist hands control back, welcome the user and ask what they \
would like to do next.
- Use get-phq-assessment-summary when the user asks about past assessments \
or their progress over time.

Always acknowledge the user's input before acting, and keep responses clear \
and supportive.";

// ── Tool handlers ─────────────────────────────────────────────────────────────

/// A declared switch tool that records why the coordinator handed off.
struct ReasonedSwitch {
    target: AgentId,
}

#[async_trait]
impl ToolHandler for ReasonedSwitch {
    async fn call(
        &self,
        _conversation: &mut ConversationState,
        args: Value,
    ) -> AnimaResult<ToolResult> {
        let reason = required_str(&args, "reason")?.to_string();
        info!(target = %self.target, reason, "coordinator requested specialist handoff");
        Ok(ToolResult::handoff(
            self.target.clone(),
            json!({
                "agent_switch": true,
                "reason": reason,
                "message": format!("Switching you to {}.", self.target),
            }),
        ))
    }
}

/// The silent profile-existence probe run at the top of a conversation.
struct CheckBiometricData {
    collab: Collaborators,
}

#[async_trait]
impl ToolHandler for CheckBiometricData {
    async fn call(
        &self,
        _conversation: &mut ConversationState,
        args: Value,
    ) -> AnimaResult<ToolResult> {
        let user_id = required_str(&args, "user_id")?;
        match self.collab.profiles.has_profile(user_id).await {
            Ok(exists) => {
                debug!(user_id, exists, "profile existence checked");
                Ok(ToolResult::data(json!({
                    "success": true,
                    "exists": exists,
                })))
            }
            Err(err) => {
                warn!(user_id, error = %err, "profile existence check failed");
                Ok(ToolResult::data(json!({
                    "success": false,
                    "exists": false,
                })))
            }
        }
    }
}

/// Loads the saved profile for personalization.
struct GetBiometricData {
    collab: Collaborators,
}

#[async_trait]
impl ToolHandler for GetBiometricData {
    async fn call(
        &self,
        _conversation: &mut ConversationState,
        args: Value,
    ) -> AnimaResult<ToolResult> {
        let user_id = required_str(&args, "user_id")?;
        match self.collab.profiles.get_profile(user_id).await {
            Ok(Some(data)) => Ok(ToolResult::data(json!({
                "success": true,
                "data": data,
            }))),
            Ok(None) => Ok(ToolResult::data(json!({
                "success": false,
                "error": "Failed to load biometric data",
            }))),
            Err(err) => {
                warn!(user_id, error = %err, "profile load failed");
                Ok(ToolResult::data(json!({
                    "success": false,
                    "error": "Failed to load biometric data",
                })))
            }
        }
    }
}

// ── Parameter schemas ─────────────────────────────────────────────────────────

fn switch_parameters(reason_description: &str) -> Value {
    json!({
        "type": "object",
        "properties": {
            "reason": {
                "type": "string",
                "description": reason_description
            }
        },
        "required": ["reason"]
    })
}

fn user_parameters() -> Value {
    json!({
        "type": "object",
        "properties": {
            "user_id": { "type": "string", "description": "The user's id" }
        },
        "required": ["user_id"]
    })
}

// ── Agent assembly ────────────────────────────────────────────────────────────

fn switch_tool(target: &str, description: &str, reason_description: &str) -> Tool {
    Tool::new(
        target,
        description,
        switch_parameters(reason_description),
        Arc::new(ReasonedSwitch {
            target: AgentId::new(target),
        }),
    )
}

pub fn agent(collab: &Collaborators) -> Agent {
    Agent::new(
        AgentId::new(AGENT_ID),
        DESCRIPTION,
        SYSTEM_MESSAGE,
        vec![
            switch_tool(
                matron::AGENT_ID,
                "BIOMETRIC INTAKE AGENT: Transfer control to Matron for collecting and saving \
                 biometric/biographical data. Use ONLY when user explicitly agrees to provide \
                 biographical information. Do NOT use if biometric data already exists.",
                "Why Matron is being called (e.g., \"User agreed to provide biographical information\")",
            ),
            switch_tool(
                jekyll::AGENT_ID,
                "HEALTH & MENTAL HEALTH SPECIALIST: Transfer control to Jekyll for ALL health \
                 topics, wellness discussions, emotional support, general mental health \
                 conversations, and PHQ-2/PHQ-9 assessments. Jekyll handles everything related \
                 to physical and mental health.",
                "Why Jekyll is being called (e.g., \"User needs mental health support\", \
                 \"User mentioned depression\")",
            ),
            switch_tool(
                vocalist::AGENT_ID,
                "VOICE RECORDING SPECIALIST: Transfer control to Vocalist for mental/vocal \
                 assessment through 35-second voice recording. Use when user mentions singing, \
                 song analysis, voice recording, or mental assessment through voice.",
                "Why Vocalist is being called",
            ),
            Tool::new(
                "check-biometric-data",
                "SILENTLY check if biometric data exists for the user. This should be called \
                 WITHOUT telling the user. Returns true/false.",
                user_parameters(),
                Arc::new(CheckBiometricData {
                    collab: collab.clone(),
                }),
            ),
            Tool::new(
                "get-biometric-data",
                "Load biometric/biographical data to personalize interactions. Call this after \
                 check-biometric-data returns true.",
                user_parameters(),
                Arc::new(GetBiometricData {
                    collab: collab.clone(),
                }),
            ),
            Tool::new(
                "get-phq-assessment-summary",
                "Retrieve and summarize PHQ assessment history from chat transcripts. Returns \
                 completed assessments, scores, trends, and risk alerts.",
                assessment_summary_parameters(),
                Arc::new(GetAssessmentSummary {
                    collab: collab.clone(),
                    log_retrieval: false,
                }),
            ),
        ],
    )
}
