//! Vocalist, the voice-recording specialist.
//!
//! Runs the timed read-aloud exercise: start a countdown recording, validate
//! the measured duration and format, and submit the validated audio to the
//! analysis pipeline with patient info pre-filled from the profile store.
//! The attempt counter lives on the conversation; it is charged when a
//! recording starts and cleared on a valid take, at the attempt cap, or when
//! control returns to the coordinator.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use anima_contracts::{
    error::{AnimaError, AnimaResult},
    ids::AgentId,
    tool::ToolResult,
};
use anima_core::{traits::ToolHandler, Agent, ConversationState, Tool};

use crate::support::{no_parameters, optional_str, required_f64, required_str};
use crate::{tars, Collaborators};

pub const AGENT_ID: &str = "Agent_Vocalist";

const DESCRIPTION: &str = "Voice recording coordinator for 35-second vocal analysis exercises. \
    Call this agent when user requests \"song analysis\", \"let's sing\", \"voice recording\", \
    or \"vocal exercise\".";

const SYSTEM_MESSAGE: &str = "\
You are the Vocalist agent, coordinator of the timed read-aloud recording \
exercise.

Workflow:
1. Introduce yourself and acknowledge what the user asked Tars for.
2. Explain the exercise before recording anything: content is displayed on \
screen, the user reads it aloud for the full 35-second countdown, and the \
audio is analyzed afterwards.
3. Ask whether they prefer lyrics or a short story, then call \
start-vocalist-recording once they confirm they are ready.
4. When the recording ends, call complete-vocalist-recording with the \
measured duration and audio format. The recording must be WAV and match the \
countdown length; at most two attempts are allowed.
5. After a valid recording, call submit-vocalist-analysis, then Agent_Tars \
to return control.

Keep responses short and encouraging, and never start a recording before \
the user confirms they are ready.";

// ── Tool handlers ─────────────────────────────────────────────────────────────

/// Opens a recording session, charging the conversation's attempt budget.
struct StartRecording {
    collab: Collaborators,
}

#[async_trait]
impl ToolHandler for StartRecording {
    async fn call(
        &self,
        conversation: &mut ConversationState,
        args: Value,
    ) -> AnimaResult<ToolResult> {
        let user_id = required_str(&args, "user_id")?;
        let content_type = match optional_str(&args, "content_type") {
            Some(kind @ ("lyrics" | "story")) => kind,
            Some(other) => {
                return Err(AnimaError::validation(format!(
                    "content_type must be 'lyrics' or 'story', got '{other}'"
                )));
            }
            None => "lyrics",
        };

        let max = self.collab.config.max_recording_attempts;
        if conversation.recording_attempts >= max {
            warn!(user_id, attempts = conversation.recording_attempts, "recording attempt budget spent");
            return Ok(ToolResult::data(attempts_spent(
                "Recording attempt limit reached before starting.",
                max,
            )));
        }

        conversation.recording_attempts += 1;
        let duration = self.collab.config.recording_duration_secs;
        debug!(
            user_id,
            content_type,
            attempt = conversation.recording_attempts,
            "recording session opened"
        );
        Ok(ToolResult::data(json!({
            "success": true,
            "user_id": user_id,
            "content_type": content_type,
            "duration": duration,
            "attempts_remaining": max - conversation.recording_attempts,
            "message": format!(
                "Recording session initialized. Display {content_type} and start countdown from {duration} seconds."
            ),
            "instruction": format!(
                "User should read the displayed content aloud during the {duration}-second recording."
            ),
        })))
    }
}

/// Validates a finished recording's format and measured duration.
struct CompleteRecording {
    collab: Collaborators,
}

#[async_trait]
impl ToolHandler for CompleteRecording {
    async fn call(
        &self,
        conversation: &mut ConversationState,
        args: Value,
    ) -> AnimaResult<ToolResult> {
        let user_id = required_str(&args, "user_id")?.to_string();
        let duration = required_f64(&args, "duration_seconds")?;
        let format = required_str(&args, "audio_format")?.to_string();

        let config = &self.collab.config;
        let max = config.max_recording_attempts;
        let target = config.recording_duration_secs as f64;
        let tolerance = config.recording_tolerance_secs as f64;

        if !format.eq_ignore_ascii_case("wav") {
            let error = "Invalid audio format. Must be WAV.";
            if conversation.recording_attempts >= max {
                conversation.recording_attempts = 0;
                warn!(user_id = %user_id, format = %format, "recording rejected at attempt cap");
                return Ok(ToolResult::data(attempts_spent(error, max)));
            }
            return Ok(ToolResult::data(json!({
                "success": false,
                "error": error,
                "should_retry": true,
                "attempts_remaining": max - conversation.recording_attempts,
                "message": "Recording must be in WAV format. Please try again.",
            })));
        }

        if duration < target - tolerance || duration > target + tolerance {
            let error = format!(
                "Recording must be exactly {target} seconds. Your recording was {duration} seconds."
            );
            if conversation.recording_attempts >= max {
                conversation.recording_attempts = 0;
                warn!(user_id = %user_id, duration, "recording rejected at attempt cap");
                return Ok(ToolResult::data(attempts_spent(&error, max)));
            }
            return Ok(ToolResult::data(json!({
                "success": false,
                "error": error,
                "should_retry": true,
                "attempts_remaining": max - conversation.recording_attempts,
                "message": format!(
                    "Recording duration incorrect. Please try again and ensure you record for exactly {} seconds.",
                    config.recording_duration_secs
                ),
            })));
        }

        conversation.recording_attempts = 0;
        info!(user_id = %user_id, duration, "recording validated");
        Ok(ToolResult::data(json!({
            "success": true,
            "duration": duration,
            "format": format,
            "message": "Recording completed successfully. Ready for analysis submission.",
            "next_step": "Submit to analysis pipeline with pre-filled biometric data",
        })))
    }
}

/// Submits a validated recording with patient info pre-filled from the
/// profile store. A missing or unreadable profile degrades to an empty
/// pre-fill rather than blocking submission.
struct SubmitAnalysis {
    collab: Collaborators,
}

#[async_trait]
impl ToolHandler for SubmitAnalysis {
    async fn call(
        &self,
        _conversation: &mut ConversationState,
        args: Value,
    ) -> AnimaResult<ToolResult> {
        let user_id = required_str(&args, "user_id")?;
        let audio_file_url = required_str(&args, "audio_file_url")?;

        let patient_info = match self.collab.profiles.get_profile(user_id).await {
            Ok(Some(profile)) => json!({
                "age": profile.get("age").cloned().unwrap_or(Value::Null),
                "weight": profile.get("weight_kg").cloned().unwrap_or(Value::Null),
                "height": profile.get("height_cm").cloned().unwrap_or(Value::Null),
                "gender": profile.get("gender").cloned().unwrap_or(Value::Null),
            }),
            Ok(None) => {
                warn!(user_id, "no biometric data on file; submitting without pre-fill");
                json!({})
            }
            Err(err) => {
                warn!(user_id, error = %err, "profile lookup failed; submitting without pre-fill");
                json!({})
            }
        };

        info!(user_id, audio_file_url, "recording submitted for analysis");
        Ok(ToolResult::data(json!({
            "success": true,
            "user_id": user_id,
            "audio_file_url": audio_file_url,
            "patient_info": patient_info,
            "message": "Recording submitted for analysis with patient information.",
            "next_step": "Return to Tars",
        })))
    }
}

/// Clears the attempt counter on the way back to the coordinator.
struct ReturnToTars;

#[async_trait]
impl ToolHandler for ReturnToTars {
    async fn call(
        &self,
        conversation: &mut ConversationState,
        _args: Value,
    ) -> AnimaResult<ToolResult> {
        conversation.recording_attempts = 0;
        Ok(ToolResult::handoff(
            AgentId::new(tars::AGENT_ID),
            json!({
                "agent_switch": true,
                "message": "Vocalist recording complete, returning to Tars",
            }),
        ))
    }
}

/// The payload returned when the attempt budget is spent: no retry, the
/// conversation goes back to the coordinator.
fn attempts_spent(error: &str, max: u8) -> Value {
    json!({
        "success": false,
        "error": error,
        "should_retry": false,
        "should_return_to_tars": true,
        "message": format!("Maximum recording attempts ({max}) reached. Returning to Tars."),
    })
}

// ── Parameter schemas ─────────────────────────────────────────────────────────

fn start_parameters() -> Value {
    json!({
        "type": "object",
        "properties": {
            "user_id": { "type": "string", "description": "The user's id" },
            "content_type": {
                "type": "string",
                "enum": ["lyrics", "story"],
                "description": "Type of content to display: lyrics or story (default lyrics)"
            }
        },
        "required": ["user_id"]
    })
}

fn complete_parameters() -> Value {
    json!({
        "type": "object",
        "properties": {
            "user_id": { "type": "string", "description": "The user's id" },
            "duration_seconds": {
                "type": "number",
                "description": "Measured recording duration in seconds"
            },
            "audio_format": { "type": "string", "description": "Audio container format, e.g. WAV" }
        },
        "required": ["user_id", "duration_seconds", "audio_format"]
    })
}

fn submit_parameters() -> Value {
    json!({
        "type": "object",
        "properties": {
            "user_id": { "type": "string", "description": "The user's id" },
            "audio_file_url": { "type": "string", "description": "Location of the validated recording" }
        },
        "required": ["user_id", "audio_file_url"]
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
                "start-vocalist-recording",
                "Start a 35-second voice recording session for mental/vocal assessment",
                start_parameters(),
                Arc::new(StartRecording {
                    collab: collab.clone(),
                }),
            ),
            Tool::new(
                "complete-vocalist-recording",
                "Complete the recording and validate duration. Returns success if exactly 35 seconds, \
                 otherwise prompts for retry.",
                complete_parameters(),
                Arc::new(CompleteRecording {
                    collab: collab.clone(),
                }),
            ),
            Tool::new(
                "submit-vocalist-analysis",
                "Submit the validated recording to the analysis pipeline with pre-filled patient \
                 information from biometric data",
                submit_parameters(),
                Arc::new(SubmitAnalysis {
                    collab: collab.clone(),
                }),
            ),
            Tool::new(
                tars::AGENT_ID,
                "Complete vocalist recording workflow and return control to Tars coordinator. \
                 Call this after successfully submitting recording or after max attempts reached.",
                no_parameters(),
                Arc::new(ReturnToTars),
            ),
        ],
    )
}
