//! Shared plumbing for the agent bundle.
//!
//! Argument extraction, the return-to-coordinator switch tool, and the
//! assessment-summary tool that both Tars and Jekyll expose. Handlers
//! re-validate arguments here even though the router already ran the JSON
//! Schema check; the schema is advisory and the handler is the authority.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::warn;

use anima_contracts::{
    error::{AnimaError, AnimaResult},
    ids::AgentId,
    progress::SessionProgress,
    tool::ToolResult,
};
use anima_core::{traits::ToolHandler, ConversationState, Tool};

use crate::Collaborators;

// ── Argument extraction ───────────────────────────────────────────────────────

/// A required string argument, or a validation error naming the field.
pub(crate) fn required_str<'a>(args: &'a Value, field: &str) -> AnimaResult<&'a str> {
    args.get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| AnimaError::validation(format!("missing required argument '{field}'")))
}

/// An optional string argument; absent and non-string both read as `None`.
pub(crate) fn optional_str<'a>(args: &'a Value, field: &str) -> Option<&'a str> {
    args.get(field).and_then(Value::as_str)
}

/// A required small integer argument (question numbers, counts).
pub(crate) fn required_u8(args: &Value, field: &str) -> AnimaResult<u8> {
    args.get(field)
        .and_then(Value::as_u64)
        .and_then(|n| u8::try_from(n).ok())
        .ok_or_else(|| {
            AnimaError::validation(format!("argument '{field}' must be a small unsigned integer"))
        })
}

/// A required numeric argument (measured durations).
pub(crate) fn required_f64(args: &Value, field: &str) -> AnimaResult<f64> {
    args.get(field)
        .and_then(Value::as_f64)
        .ok_or_else(|| AnimaError::validation(format!("argument '{field}' must be a number")))
}

/// An optional non-negative integer argument (list limits).
pub(crate) fn optional_u64(args: &Value, field: &str) -> Option<u64> {
    args.get(field).and_then(Value::as_u64)
}

/// Split a comma-separated argument into trimmed, non-empty items.
pub(crate) fn split_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(str::to_string)
        .collect()
}

/// The empty-object schema used by tools that take no arguments.
pub(crate) fn no_parameters() -> Value {
    json!({
        "type": "object",
        "properties": {},
        "required": []
    })
}

// ── Return-to-coordinator switch ──────────────────────────────────────────────

/// Handler behind a specialist's declared return tool: hands control to a
/// fixed target with a task-completion message.
struct ReturnSwitch {
    target: AgentId,
    message: &'static str,
}

#[async_trait]
impl ToolHandler for ReturnSwitch {
    async fn call(
        &self,
        _conversation: &mut ConversationState,
        _args: Value,
    ) -> AnimaResult<ToolResult> {
        Ok(ToolResult::handoff(
            self.target.clone(),
            json!({
                "agent_switch": true,
                "message": self.message,
            }),
        ))
    }
}

/// A declared switch tool returning control to `target` once a specialist's
/// task is done. Specialists that must reset conversation counters on the
/// way out define their own handler instead.
pub(crate) fn return_tool(target: &str, description: &str, message: &'static str) -> Tool {
    Tool::new(
        target,
        description,
        no_parameters(),
        Arc::new(ReturnSwitch {
            target: AgentId::new(target),
            message,
        }),
    )
}

// ── Assessment history summary ────────────────────────────────────────────────

/// Parameter schema shared by the Tars and Jekyll summary tools.
pub(crate) fn assessment_summary_parameters() -> Value {
    json!({
        "type": "object",
        "properties": {
            "user_id": {
                "type": "string",
                "description": "User id to fetch assessment history for"
            },
            "session_id": {
                "type": "string",
                "description": "Optional session id to filter results"
            },
            "assessment_id": {
                "type": "string",
                "description": "Optional assessment id to retrieve"
            },
            "limit": {
                "type": "number",
                "description": "Maximum number of assessments to return (default 10)"
            }
        },
        "required": ["user_id"]
    })
}

/// Retrieves completed-assessment history and condenses it into a summary
/// with score trend. Jekyll's copy leaves a retrieval note in the
/// transcript; Tars's copy reads silently.
pub(crate) struct GetAssessmentSummary {
    pub(crate) collab: Collaborators,
    pub(crate) log_retrieval: bool,
}

#[async_trait]
impl ToolHandler for GetAssessmentSummary {
    async fn call(
        &self,
        conversation: &mut ConversationState,
        args: Value,
    ) -> AnimaResult<ToolResult> {
        let user_id = required_str(&args, "user_id")?.to_string();
        let limit = optional_u64(&args, "limit").unwrap_or(10) as usize;
        let session_filter = optional_str(&args, "session_id").map(str::to_string);
        let assessment_filter = optional_str(&args, "assessment_id").map(str::to_string);
        let key = conversation.key.clone();

        let mut records = match self.collab.sessions.history(&user_id, limit).await {
            Ok(records) => records,
            Err(err) => {
                warn!(user_id = %user_id, error = %err, "assessment history lookup failed");
                return Ok(ToolResult::data(json!({
                    "success": false,
                    "error": "Failed to retrieve assessment history",
                })));
            }
        };
        if let Some(session_id) = &session_filter {
            records.retain(|r| &r.session_id == session_id);
        }
        if let Some(assessment_id) = &assessment_filter {
            records.retain(|r| r.assessment_id.to_string() == *assessment_id);
        }

        let summary = summarize_history(&user_id, &records);

        if self.log_retrieval {
            let note = format!("Retrieved PHQ assessment summary for user {user_id}");
            let metadata = json!({
                "is_internal_record": true,
                "assessment_count": records.len(),
                "score_trend": summary.get("score_trend").cloned().unwrap_or(Value::Null),
            });
            if let Err(err) = self
                .collab
                .transcripts
                .add_assistant_message(&key, &note, "jekyll-retrieve-summary", metadata)
                .await
            {
                warn!(error = %err, "transcript write failed for summary retrieval note");
            }
        }

        Ok(ToolResult::data(json!({
            "success": true,
            "summary": summary,
        })))
    }
}

/// Condense history records (most recent first) into the summary payload.
pub(crate) fn summarize_history(user_id: &str, records: &[SessionProgress]) -> Value {
    let record_json = |r: &SessionProgress| {
        json!({
            "assessment_id": r.assessment_id,
            "session_id": r.session_id,
            "phq_type": r.phq_type.to_string(),
            "total_score": r.total_score,
            "severity": r.severity,
            "completed_at": r.completed_at,
        })
    };

    // Trend compares the two most recent completed scores; lower is better.
    let score_trend = match (
        records.first().and_then(|r| r.total_score),
        records.get(1).and_then(|r| r.total_score),
    ) {
        (Some(latest), Some(prior)) if latest < prior => "improving",
        (Some(latest), Some(prior)) if latest > prior => "worsening",
        (Some(_), Some(_)) => "stable",
        _ => "insufficient-data",
    };

    json!({
        "user_id": user_id,
        "total_assessments": records.len(),
        "latest_assessment": records.first().map(record_json),
        "score_trend": score_trend,
        "assessments": records.iter().map(record_json).collect::<Vec<_>>(),
    })
}
