//! Jekyll, the conversational screening specialist.
//!
//! Jekyll never asks instrument questions verbatim. The conversation layer
//! opens natural probes; each reply is scored by the inference engine and
//! recorded against the formal assessment, keeping the `JekyllContext` and
//! the `Assessment` in lockstep. After both PHQ-2 probes the promotion
//! decision settles in the same tool call that recorded the second reply,
//! so no conversational gap exists where the screening is neither closed
//! nor continuing.
//!
//! Risk handling is the one place degraded store writes are not tolerated:
//! a risk alert that cannot reach the transcript escalates as an error.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use anima_contracts::{
    error::{AnimaError, AnimaResult},
    ids::{AgentId, AssessmentId, PhqType},
    risk::AlertSeverity,
    tool::ToolResult,
};
use anima_core::{traits::ToolHandler, Agent, ConversationState, Tool};
use anima_inference::{
    catalogue, decide_promotion, record_response, ContextualSlots, JekyllContext, JekyllStage,
    PromotionDecision,
};
use anima_screening::{determine_severity, interpret, Assessment, Interpretation};

use crate::support::{
    assessment_summary_parameters, required_str, required_u8, return_tool, split_csv,
    GetAssessmentSummary,
};
use crate::{tars, Collaborators};

pub const AGENT_ID: &str = "Agent_Jekyll";

const DESCRIPTION: &str =
    "Call this agent for natural conversational check-ins. Use when:\n\
     - User requests a conversational wellness check\n\
     - You want to infer PHQ-2/PHQ-9 scores through natural dialogue\n\
     - A non-threatening, contextual approach to screening is needed\n\
     DO NOT use if user prefers structured questionnaire - use PHQ-2 or PHQ-9 directly.";

const SYSTEM_MESSAGE: &str = "\
You are Jekyll, a conversational mental health assistant specializing in \
empathetic, dialogue-based depression screening.

Protocol:
1. Call start-jekyll-assessment once at the beginning of a check-in.
2. NEVER ask instrument questions verbatim. Open each topic with a natural \
conversational probe and let the user talk freely.
3. After each meaningful response, call record-conversational-response with \
the response text, the probe you asked, and the PHQ question it informs.
4. Probe questions 1 and 2 first. The tool decides whether the screening \
closes there or continues through questions 3-9.
5. If the user mentions suicide, self-harm, or immediate danger, call \
detect-immediate-risk right away.
6. When every question is recorded, call complete-jekyll-assessment, share \
the results gently, then call Agent_Tars to return control.

Be warm and proactive: ask layered follow-up questions, explore what the \
user shares, and never rush the conversation.";

// ── Tool handlers ─────────────────────────────────────────────────────────────

/// Opens the conversational screening: a fresh assessment plus its
/// inference context, both bound to the conversation.
struct StartScreening {
    collab: Collaborators,
}

#[async_trait]
impl ToolHandler for StartScreening {
    async fn call(
        &self,
        conversation: &mut ConversationState,
        args: Value,
    ) -> AnimaResult<ToolResult> {
        let user_id = required_str(&args, "user_id")?.to_string();
        if conversation.assessment.as_ref().is_some_and(|a| !a.is_completed) {
            return Err(AnimaError::state(
                "an assessment is already in progress for this conversation",
            ));
        }

        let key = conversation.key.clone();
        let assessment = Assessment::new(PhqType::Phq2, &user_id);
        let assessment_id = assessment.assessment_id;
        let context = JekyllContext::new(assessment_id, &user_id);
        let stage = context.stage;

        if let Err(err) = self
            .collab
            .sessions
            .initialize_session(&key, assessment_id, PhqType::Phq2)
            .await
        {
            warn!(error = %err, "session store rejected initialization; continuing without progress record");
        }

        conversation.assessment = Some(assessment);
        conversation.jekyll = Some(context);
        info!(assessment_id = %assessment_id, "conversational screening started");

        Ok(ToolResult::data(json!({
            "success": true,
            "assessment_id": assessment_id,
            "phq_type": PhqType::Phq2.to_string(),
            "stage": stage.to_string(),
            "ready_for_probing": true,
            "next_probe": probe_hint(1),
        })))
    }
}

/// Scores one conversational reply and records it against the assessment.
/// On the second PHQ-2 probe the promotion decision is settled here too.
struct RecordResponse {
    collab: Collaborators,
}

#[async_trait]
impl ToolHandler for RecordResponse {
    async fn call(
        &self,
        conversation: &mut ConversationState,
        args: Value,
    ) -> AnimaResult<ToolResult> {
        let response_text = required_str(&args, "user_response")?.to_string();
        let contextual_question = required_str(&args, "contextual_question")?.to_string();
        let target = required_u8(&args, "target_phq_question")?;
        let user_id = required_str(&args, "user_id")?.to_string();
        let key = conversation.key.clone();

        let (assessment, context) = conversation.require_screening()?;
        let inferred = record_response(context, target, &response_text)?;
        assessment.record_answer(target, inferred.score)?;
        let assessment_id = assessment.assessment_id;
        debug!(
            user_id = %user_id,
            question = target,
            score = inferred.score,
            "conversational response recorded against assessment"
        );

        let decision = if context.stage == JekyllStage::Decision {
            let decision =
                decide_promotion(context, self.collab.config.phq2_promotion_threshold)?;
            if matches!(decision, PromotionDecision::PromoteToPhq9 { .. }) {
                assessment.promote_to_phq9()?;
            }
            Some(decision)
        } else {
            None
        };
        let assessment_complete = assessment.is_completed;
        if assessment_complete && context.stage == JekyllStage::Phq9Probing {
            context.stage = JekyllStage::Complete;
        }
        let stage = context.stage;
        let questions_remaining = context.questions_remaining();
        let next_target = context.next_probe_target();
        let risk_detected = inferred.risk.is_critical();

        if let Err(err) = self
            .collab
            .sessions
            .set_question_text(&key, target, &contextual_question)
            .await
        {
            warn!(error = %err, "failed to record presented probe text");
        }
        if let Err(err) = self
            .collab
            .sessions
            .record_answer(&key, target, inferred.score)
            .await
        {
            warn!(error = %err, "session store rejected inferred answer");
        }
        if matches!(decision, Some(PromotionDecision::PromoteToPhq9 { .. })) {
            if let Err(err) = self
                .collab
                .sessions
                .update_assessment_type(&key, PhqType::Phq9)
                .await
            {
                warn!(error = %err, "session store rejected promotion record");
            }
        }
        if let Err(err) = self
            .collab
            .transcripts
            .add_user_message(
                &key,
                &response_text,
                "jekyll-conversational-response",
                json!({
                    "is_jekyll_response": true,
                    "target_phq_question": target,
                    "inferred_score": inferred.score,
                    "confidence": inferred.confidence,
                    "contextual_question": contextual_question,
                    "assessment_id": assessment_id,
                }),
            )
            .await
        {
            warn!(error = %err, "transcript write failed for conversational response");
        }

        match decision {
            Some(PromotionDecision::PromoteToPhq9 { phq2_score }) => {
                Ok(ToolResult::data(json!({
                    "success": true,
                    "response_recorded": true,
                    "phq2_complete": true,
                    "phq2_score": phq2_score,
                    "recommend_phq9": true,
                    "next_stage": stage.to_string(),
                    "next_probe": probe_hint(3),
                    "message": "Based on your responses, I'd like to ask a few more questions for a comprehensive assessment.",
                })))
            }
            Some(PromotionDecision::NegativeScreen { phq2_score }) => {
                Ok(ToolResult::data(json!({
                    "success": true,
                    "response_recorded": true,
                    "assessment_complete": true,
                    "phq2_score": phq2_score,
                    "negative_screen": true,
                })))
            }
            None => Ok(ToolResult::data(json!({
                "success": true,
                "response_recorded": true,
                "inferred_score": inferred.score,
                "confidence": inferred.confidence,
                "risk_detected": risk_detected,
                "assessment_complete": assessment_complete,
                "questions_remaining": questions_remaining,
                "next_probe": next_target.map(probe_hint),
            }))),
        }
    }
}

/// Raises a professional alert for risk language observed mid-conversation.
/// The transcript write is mandatory here; failure escalates.
struct DetectImmediateRisk {
    collab: Collaborators,
}

#[async_trait]
impl ToolHandler for DetectImmediateRisk {
    async fn call(
        &self,
        conversation: &mut ConversationState,
        args: Value,
    ) -> AnimaResult<ToolResult> {
        let indicators_raw = required_str(&args, "risk_indicators")?.to_string();
        let severity_raw = required_str(&args, "severity")?;
        let severity = AlertSeverity::parse(severity_raw).ok_or_else(|| {
            AnimaError::validation(format!("unknown risk severity '{severity_raw}'"))
        })?;
        let key = conversation.key.clone();

        let context = conversation.require_jekyll()?;
        let assessment_id = context.assessment_id;
        let indicators = split_csv(&indicators_raw);
        context.risk_factors.extend(indicators.iter().cloned());
        warn!(
            severity = %severity,
            indicators = ?indicators,
            "risk indicators reported during conversational screening"
        );

        let alert = format!(
            "Professional Alert: Potential risk indicators detected: {indicators_raw}"
        );
        if let Err(err) = self
            .collab
            .transcripts
            .add_assistant_message(
                &key,
                &alert,
                "jekyll-risk-alert",
                json!({
                    "is_risk_alert": true,
                    "severity": severity,
                    "indicators": indicators,
                    "assessment_id": assessment_id,
                }),
            )
            .await
        {
            return Err(AnimaError::RiskEscalation {
                reason: format!("risk alert could not be recorded: {err}"),
            });
        }

        Ok(ToolResult::data(json!({
            "success": true,
            "risk_detected": true,
            "severity": severity,
            "indicators": indicators,
            "alert_triggered": true,
            "next_action": if severity.is_critical() {
                "handoff-to-crisis"
            } else {
                "continue-assessment"
            },
        })))
    }
}

/// Finalizes a finished conversational screening: archive, internal record,
/// teardown, results payload.
struct CompleteScreening {
    collab: Collaborators,
}

#[async_trait]
impl ToolHandler for CompleteScreening {
    async fn call(
        &self,
        conversation: &mut ConversationState,
        _args: Value,
    ) -> AnimaResult<ToolResult> {
        let key = conversation.key.clone();

        let (assessment, context) = conversation.require_screening()?;
        if !assessment.is_completed {
            return Err(AnimaError::state("assessment is not complete"));
        }
        let score = assessment.calculate_score();
        let phq_type = assessment.phq_type;
        let severity = determine_severity(score, phq_type);
        let interpretation = interpret(assessment);
        let assessment_id = assessment.assessment_id;
        let risk_factors = context.risk_factors.clone();
        let slots = context.slots.clone();

        if let Err(err) = self
            .collab
            .sessions
            .complete_assessment(
                &key,
                score,
                severity,
                &interpretation.summary,
                &interpretation.recommendations,
            )
            .await
        {
            warn!(error = %err, "session store rejected completion; results remain in the reply only");
        }

        let record = internal_record(
            phq_type,
            score,
            severity,
            assessment_id,
            &slots,
            &risk_factors,
            &interpretation,
        );
        if let Err(err) = self
            .collab
            .transcripts
            .add_assistant_message(
                &key,
                &record,
                "jekyll-assessment-complete",
                json!({
                    "assessment_type": phq_type.to_string(),
                    "total_score": score,
                    "severity": severity,
                    "risk_factors": risk_factors,
                    "assessment_id": assessment_id,
                    "contextual_data": slots,
                    "is_internal_record": true,
                }),
            )
            .await
        {
            warn!(error = %err, "transcript write failed for internal completion record");
        }
        if let Err(err) = self.collab.sessions.end_session(&key).await {
            warn!(error = %err, "session store rejected close");
        }

        conversation.clear_screening();
        info!(
            assessment_id = %assessment_id,
            score,
            severity,
            "conversational screening completed"
        );

        Ok(ToolResult::data(json!({
            "success": true,
            "score": score,
            "severity": severity,
            "interpretation": interpretation.summary,
            "recommendations": interpretation.recommendations,
            "risk_factors_detected": risk_factors,
            "assessment_type": phq_type.to_string(),
        })))
    }
}

/// The clinician-facing completion record written into the transcript.
fn internal_record(
    phq_type: PhqType,
    score: u8,
    severity: &str,
    assessment_id: AssessmentId,
    slots: &ContextualSlots,
    risk_factors: &[String],
    interpretation: &Interpretation,
) -> String {
    let optional = |label: &str, value: &Option<String>| {
        format!("- {}: {}", label, value.as_deref().unwrap_or("Not collected"))
    };
    let list = |label: &str, values: &[String]| {
        if values.is_empty() {
            format!("- {label}: Not collected")
        } else {
            format!("- {}: {}", label, values.join(", "))
        }
    };
    let contextual = [
        optional("sleep", &slots.sleep),
        optional("energy", &slots.energy),
        optional("appetite", &slots.appetite),
        optional("concentration", &slots.concentration),
        optional("self_worth", &slots.self_worth),
        optional("psychomotor", &slots.psychomotor),
        list("triggers", &slots.triggers),
        list("coping", &slots.coping),
        optional("support", &slots.support),
    ]
    .join("\n");
    let risks = if risk_factors.is_empty() {
        "None detected".to_string()
    } else {
        risk_factors.join(", ")
    };
    let recommendations = interpretation
        .recommendations
        .iter()
        .map(|r| format!("• {r}"))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Assessment Complete - Internal Record\n\nType: {}\nScore: {}/{}\nSeverity: {}\nAssessment ID: {}\n\nContextual Data Collected:\n{}\n\nRisk Factors: {}\n\nClinical Interpretation: {}\n\nRecommendations:\n{}",
        phq_type,
        score,
        phq_type.max_score(),
        severity,
        assessment_id,
        contextual,
        risks,
        interpretation.summary,
        recommendations,
    )
}

/// Probe guidance for the conversation layer: the concept the next question
/// measures plus natural phrasings to open it with.
fn probe_hint(question_number: u8) -> Value {
    match catalogue::probe_set(question_number) {
        Some(set) => json!({
            "question": set.question_number,
            "concept": set.concept,
            "suggestions": set.probes,
        }),
        None => Value::Null,
    }
}

// ── Parameter schemas ─────────────────────────────────────────────────────────

fn start_parameters() -> Value {
    json!({
        "type": "object",
        "properties": {
            "user_id": { "type": "string", "description": "The user's id" }
        },
        "required": ["user_id"]
    })
}

fn record_parameters() -> Value {
    json!({
        "type": "object",
        "properties": {
            "user_response": {
                "type": "string",
                "description": "The user's conversational response to analyze"
            },
            "contextual_question": {
                "type": "string",
                "description": "The natural question that prompted this response"
            },
            "target_phq_question": {
                "type": "number",
                "description": "The PHQ question number (1-9) this response informs"
            },
            "user_id": { "type": "string", "description": "The user's id" }
        },
        "required": ["user_response", "contextual_question", "target_phq_question", "user_id"]
    })
}

fn risk_parameters() -> Value {
    json!({
        "type": "object",
        "properties": {
            "risk_indicators": {
                "type": "string",
                "description": "Comma-separated risk indicators observed in the conversation"
            },
            "severity": {
                "type": "string",
                "enum": ["low", "moderate", "high", "critical"],
                "description": "Overall severity of the observed indicators"
            },
            "user_id": { "type": "string", "description": "The user's id" }
        },
        "required": ["risk_indicators", "severity", "user_id"]
    })
}

fn complete_parameters() -> Value {
    json!({
        "type": "object",
        "properties": {
            "user_id": { "type": "string", "description": "The user's id" }
        },
        "required": ["user_id"]
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
                "start-jekyll-assessment",
                "Initialize Jekyll conversational PHQ inference assessment",
                start_parameters(),
                Arc::new(StartScreening {
                    collab: collab.clone(),
                }),
            ),
            Tool::new(
                "record-conversational-response",
                "Analyze and record user conversational response for PHQ inference",
                record_parameters(),
                Arc::new(RecordResponse {
                    collab: collab.clone(),
                }),
            ),
            Tool::new(
                "detect-immediate-risk",
                "Detect immediate risk factors in conversation and trigger professional alert",
                risk_parameters(),
                Arc::new(DetectImmediateRisk {
                    collab: collab.clone(),
                }),
            ),
            Tool::new(
                "get-phq-assessment-summary",
                "Retrieve and summarize past PHQ assessment results for a user. Use this when \
                 the user asks about previous assessments, their history, or how they're \
                 progressing over time.",
                assessment_summary_parameters(),
                Arc::new(GetAssessmentSummary {
                    collab: collab.clone(),
                    log_retrieval: true,
                }),
            ),
            Tool::new(
                "complete-jekyll-assessment",
                "Complete Jekyll assessment and store results",
                complete_parameters(),
                Arc::new(CompleteScreening {
                    collab: collab.clone(),
                }),
            ),
            return_tool(
                tars::AGENT_ID,
                "Complete Jekyll assessment and return control to Tars coordinator",
                "Jekyll assessment complete, returning to Tars",
            ),
        ],
    )
}
