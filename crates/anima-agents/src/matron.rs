//! Matron, the biometric intake specialist.
//!
//! Matron opens a short collection session, saves whatever the user chose to
//! share through the profile store, and returns control to the coordinator.
//! Collection attempts are budgeted per conversation so a session that keeps
//! reopening intake without saving gets steered back to Tars.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use anima_contracts::{
    error::AnimaResult,
    ids::AgentId,
    tool::ToolResult,
};
use anima_core::{traits::ToolHandler, Agent, ConversationState, Tool};

use crate::support::{required_str, return_tool, split_csv};
use crate::{tars, Collaborators};

pub const AGENT_ID: &str = "Agent_Matron";

const DESCRIPTION: &str = "Biometric data and personalization intake coordinator. \
    Call this agent when the user has no biometric data saved and needs initial data collection.";

const SYSTEM_MESSAGE: &str = "\
You are Matron, the warm and professional biometric intake coordinator. You \
collect profile data so other agents can personalize their conversations.

Workflow:
1. Introduce yourself briefly and call start-biometric-collection.
2. Ask for a nickname first. It is the only required field; if the user \
declines twice, keep their account name and move on.
3. Offer the optional fields one at a time: height and weight (convert \
imperial to metric before saving), gender identity, pronouns, where they \
last lived, hobbies, likes, dislikes, and anything else they want noted.
4. Call save-biometric-data once with everything collected, comma-separating \
list answers.
5. Thank the user and call Agent_Tars to return control.

Keep responses short, ask one question at a time, and never pressure the \
user. Every field except the nickname is optional.";

// ── Tool handlers ─────────────────────────────────────────────────────────────

/// Opens a collection session, charging the conversation's attempt budget.
struct StartCollection {
    collab: Collaborators,
}

#[async_trait]
impl ToolHandler for StartCollection {
    async fn call(
        &self,
        conversation: &mut ConversationState,
        args: Value,
    ) -> AnimaResult<ToolResult> {
        let user_id = required_str(&args, "user_id")?;
        let max = self.collab.config.max_collection_attempts;

        if conversation.collection_attempts >= max {
            warn!(
                user_id,
                attempts = conversation.collection_attempts,
                "collection attempt budget spent"
            );
            return Ok(ToolResult::data(json!({
                "success": false,
                "error": format!("Maximum collection attempts ({max}) reached."),
                "should_return_to_tars": true,
            })));
        }

        conversation.collection_attempts += 1;
        debug!(
            user_id,
            attempt = conversation.collection_attempts,
            "biometric collection initialized"
        );
        Ok(ToolResult::data(json!({
            "success": true,
            "user_id": user_id,
            "message": "Biometric collection initialized",
            "next_step": "Ask for nickname",
        })))
    }
}

/// Persists the collected fields through the profile store.
struct SaveBiometricData {
    collab: Collaborators,
}

impl SaveBiometricData {
    /// Write every provided field, returning the saved subset. Scalar fields
    /// go through `update_field`; comma-separated lists append to array
    /// fields.
    async fn persist(&self, user_id: &str, args: &Value) -> AnimaResult<Value> {
        let profiles = &self.collab.profiles;
        let mut saved = Map::new();

        let nickname = required_str(args, "nickname")?;
        profiles
            .update_field(user_id, "nickname", json!(nickname))
            .await?;
        saved.insert("nickname".to_string(), json!(nickname));

        for field in ["weight_kg", "height_cm"] {
            if let Some(value) = args.get(field).and_then(Value::as_f64) {
                profiles.update_field(user_id, field, json!(value)).await?;
                saved.insert(field.to_string(), json!(value));
            }
        }
        for field in ["gender", "pronoun", "last_residence", "additional_info"] {
            if let Some(value) = args.get(field).and_then(Value::as_str) {
                profiles.update_field(user_id, field, json!(value)).await?;
                saved.insert(field.to_string(), json!(value));
            }
        }
        for field in ["hobbies", "likes", "dislikes"] {
            if let Some(raw) = args.get(field).and_then(Value::as_str) {
                let items = split_csv(raw);
                if !items.is_empty() {
                    let values: Vec<Value> = items.iter().map(|item| json!(item)).collect();
                    profiles.add_to_array_field(user_id, field, values).await?;
                    saved.insert(field.to_string(), json!(items));
                }
            }
        }

        Ok(Value::Object(saved))
    }
}

#[async_trait]
impl ToolHandler for SaveBiometricData {
    async fn call(
        &self,
        _conversation: &mut ConversationState,
        args: Value,
    ) -> AnimaResult<ToolResult> {
        let user_id = required_str(&args, "user_id")?.to_string();
        let nickname = required_str(&args, "nickname")?.to_string();

        match self.persist(&user_id, &args).await {
            Ok(saved) => Ok(ToolResult::data(json!({
                "success": true,
                "data": saved,
                "message": format!("Biometric data for {nickname} saved successfully"),
            }))),
            Err(err) => {
                warn!(user_id = %user_id, error = %err, "profile save failed");
                Ok(ToolResult::data(json!({
                    "success": false,
                    "error": err.to_string(),
                    "message": "Failed to save biometric data",
                })))
            }
        }
    }
}

// ── Parameter schemas ─────────────────────────────────────────────────────────

fn start_parameters() -> Value {
    json!({
        "type": "object",
        "properties": {
            "user_id": {
                "type": "string",
                "description": "The user's id"
            }
        },
        "required": ["user_id"]
    })
}

fn save_parameters() -> Value {
    json!({
        "type": "object",
        "properties": {
            "user_id": { "type": "string", "description": "The user's id" },
            "nickname": { "type": "string", "description": "Preferred nickname (required)" },
            "weight_kg": { "type": "number", "description": "Weight in kilograms" },
            "height_cm": { "type": "number", "description": "Height in centimeters" },
            "gender": { "type": "string", "description": "Gender identity" },
            "pronoun": { "type": "string", "description": "Preferred pronouns" },
            "last_residence": { "type": "string", "description": "Most recent place of residence" },
            "hobbies": { "type": "string", "description": "Comma-separated hobbies" },
            "likes": { "type": "string", "description": "Comma-separated likes" },
            "dislikes": { "type": "string", "description": "Comma-separated dislikes" },
            "additional_info": { "type": "string", "description": "Anything else the user shared" }
        },
        "required": ["user_id", "nickname"]
    })
}

// ── Agent assembly ────────────────────────────────────────────────────────────

pub fn agent(collab: &Collaborators) -> Agent {
    Agent::new(
        AgentId::new(AGENT_ID),
        DESCRIPTION,
        SYSTEM_MESSAGE,
        vec![
            Tool::new(
                "start-biometric-collection",
                "Initialize biometric data collection session with the user",
                start_parameters(),
                Arc::new(StartCollection {
                    collab: collab.clone(),
                }),
            ),
            Tool::new(
                "save-biometric-data",
                "Save the collected biometric data to storage",
                save_parameters(),
                Arc::new(SaveBiometricData {
                    collab: collab.clone(),
                }),
            ),
            return_tool(
                tars::AGENT_ID,
                "Complete biometric collection and return control to Tars coordinator. \
                 Call this after successfully saving biometric data.",
                "Biometric collection complete, returning to Tars",
            ),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use anima_contracts::ids::ConversationKey;
    use anima_core::RuntimeConfig;

    fn collab() -> Collaborators {
        Collaborators::in_memory(RuntimeConfig::default())
    }

    fn conversation() -> ConversationState {
        ConversationState::new(
            ConversationKey::new("user-7", "session-a"),
            AgentId::new(AGENT_ID),
        )
    }

    /// Saving writes scalars and splits list fields before appending.
    #[tokio::test]
    async fn save_persists_scalars_and_lists() {
        let collab = collab();
        let handler = SaveBiometricData {
            collab: collab.clone(),
        };
        let mut convo = conversation();

        let result = handler
            .call(
                &mut convo,
                json!({
                    "user_id": "user-7",
                    "nickname": "Sam",
                    "weight_kg": 70.5,
                    "hobbies": "reading, hiking",
                }),
            )
            .await
            .unwrap();

        match result {
            ToolResult::Data { payload } => {
                assert_eq!(payload["success"], true);
                assert_eq!(
                    payload["message"],
                    "Biometric data for Sam saved successfully"
                );
            }
            other => panic!("expected data result, got {other:?}"),
        }

        let profile = collab.profiles.get_profile("user-7").await.unwrap().unwrap();
        assert_eq!(profile["nickname"], "Sam");
        assert_eq!(profile["weight_kg"], 70.5);
        assert_eq!(profile["hobbies"], json!(["reading", "hiking"]));
    }

    /// The nickname is the one required field.
    #[tokio::test]
    async fn save_without_nickname_is_a_validation_error() {
        let handler = SaveBiometricData { collab: collab() };
        let mut convo = conversation();

        let err = handler
            .call(&mut convo, json!({"user_id": "user-7"}))
            .await
            .unwrap_err();
        match err {
            anima_contracts::error::AnimaError::Validation { reason } => {
                assert!(reason.contains("nickname"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    /// Collection can only be reopened while the attempt budget lasts.
    #[tokio::test]
    async fn start_enforces_the_collection_budget() {
        let handler = StartCollection { collab: collab() };
        let mut convo = conversation();
        let args = json!({"user_id": "user-7"});

        for attempt in 1..=2u8 {
            let result = handler.call(&mut convo, args.clone()).await.unwrap();
            match result {
                ToolResult::Data { payload } => assert_eq!(payload["success"], true),
                other => panic!("expected data result, got {other:?}"),
            }
            assert_eq!(convo.collection_attempts, attempt);
        }

        let result = handler.call(&mut convo, args).await.unwrap();
        match result {
            ToolResult::Data { payload } => {
                assert_eq!(payload["success"], false);
                assert_eq!(payload["should_return_to_tars"], true);
            }
            other => panic!("expected data result, got {other:?}"),
        }
    }

    /// The declared return tool hands control back to the coordinator.
    #[tokio::test]
    async fn return_tool_hands_off_to_tars() {
        let agent = agent(&collab());
        let return_tool = agent
            .tools
            .iter()
            .find(|t| t.name == tars::AGENT_ID)
            .unwrap();
        let mut convo = conversation();

        let result = return_tool.handler.call(&mut convo, json!({})).await.unwrap();
        match result {
            ToolResult::Handoff {
                target_agent_id,
                payload,
            } => {
                assert_eq!(target_agent_id.as_str(), tars::AGENT_ID);
                assert_eq!(payload["agent_switch"], true);
                assert_eq!(
                    payload["message"],
                    "Biometric collection complete, returning to Tars"
                );
            }
            other => panic!("expected handoff, got {other:?}"),
        }
    }

    /// The roster entry exposes exactly the declared tools.
    #[test]
    fn agent_declares_three_tools() {
        let agent = agent(&collab());
        let names: Vec<&str> = agent.tools.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "start-biometric-collection",
                "save-biometric-data",
                tars::AGENT_ID,
            ]
        );
    }
}
