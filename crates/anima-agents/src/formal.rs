//! The formal questionnaire agents: PHQ-2 and PHQ-9.
//!
//! Both instruments run the same machinery. A start tool opens an
//! `Assessment` on the conversation and presents the first question; a
//! record tool validates each reply against the 0-3 scale, advances the
//! questionnaire, and finalizes it once every question is resolved. The two
//! agents differ only in instrument length, completion extras (PHQ-2
//! suggests a follow-up, PHQ-9 checks question 9 for suicidal ideation),
//! and how control returns to the coordinator.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use anima_contracts::{
    error::{AnimaError, AnimaResult},
    ids::{AgentId, PhqType},
    tool::ToolResult,
};
use anima_core::{traits::ToolHandler, Agent, ConversationState, Tool};
use anima_screening::{
    answer::parse_answer, bank, determine_severity, interpret, Assessment, AttemptOutcome,
};

use crate::support::{required_str, return_tool};
use crate::{tars, Collaborators};

pub const PHQ2_AGENT_ID: &str = "Agent_PHQ2";
pub const PHQ9_AGENT_ID: &str = "Agent_PHQ9";

const PHQ2_DESCRIPTION: &str =
    "Call this agent to conduct a PHQ-2 brief wellbeing questionnaire. Use when:\n\
     - User requests a \"quick check\" or \"brief questionnaire\"\n\
     - User asks to \"invoke PHQ-2\" or \"start PHQ-2\"\n\
     - User wants a brief mental health check\n\
     DO NOT use if user requests comprehensive questionnaire - use PHQ-9 instead.";

const PHQ9_DESCRIPTION: &str =
    "Call this agent to conduct a PHQ-9 comprehensive depression assessment. Use when:\n\
     - User requests a \"full assessment\" or \"comprehensive screening\"\n\
     - User asks to \"invoke PHQ-9\" or \"start PHQ-9\"\n\
     - PHQ-2 score is 3 or higher (indicating need for comprehensive assessment)\n\
     - User wants detailed mental health evaluation\n\
     DO NOT use for quick screening - use PHQ-2 for that.";

const PHQ2_SYSTEM_MESSAGE: &str = "\
You are the PHQ-2 assessment specialist administering a standardized \
two-question wellbeing questionnaire.

Protocol:
1. Call start-phq2-assessment immediately and present the first question \
with the 0-3 response scale.
2. Present questions EXACTLY as written. Never rephrase, soften, or expand \
the standardized wording.
3. Record every user reply with record-phq2-answer. The tool validates the \
answer; when it is invalid, show the response scale again and re-ask. After \
three invalid replies the question is skipped automatically.
4. When the tool reports completion, present the score, severity, and \
recommendations exactly as returned.
5. If the results suggest a comprehensive follow-up, offer the PHQ-9.
6. Say goodbye and call Agent_Tars to return control.

Stay neutral and professional; do not editorialize on individual answers.";

const PHQ9_SYSTEM_MESSAGE: &str = "\
You are the PHQ-9 assessment specialist administering the standardized \
nine-question depression assessment.

Protocol:
1. Call start-phq9-assessment immediately and present the first question \
with the 0-3 response scale.
2. Present all nine questions EXACTLY as written. Never rephrase, soften, \
or expand the standardized wording.
3. Record every user reply with record-phq9-answer. Invalid answers get the \
response scale shown again; after three invalid replies the question is \
skipped automatically.
4. Question 9 concerns self-harm. If the completion payload flags suicidal \
ideation, present the crisis resources from the completion message verbatim \
and treat them as the priority.
5. When the tool reports completion, present the score, severity, and \
recommendations exactly as returned, then return control to Tars.

Stay neutral and professional; do not editorialize on individual answers.";

/// Lowercase instrument slug used in start payloads.
fn type_slug(phq_type: PhqType) -> &'static str {
    match phq_type {
        PhqType::Phq2 => "phq2",
        PhqType::Phq9 => "phq9",
    }
}

/// The numeric instrument code used in transcript metadata.
fn instrument_code(phq_type: PhqType) -> u8 {
    match phq_type {
        PhqType::Phq2 => 2,
        PhqType::Phq9 => 9,
    }
}

// ── Tool handlers ─────────────────────────────────────────────────────────────

/// Opens an assessment on the conversation and presents the first question.
struct StartAssessment {
    phq_type: PhqType,
    collab: Collaborators,
}

#[async_trait]
impl ToolHandler for StartAssessment {
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
        let assessment = Assessment::new(self.phq_type, &user_id);
        let assessment_id = assessment.assessment_id;
        let (first_number, first_text) = assessment
            .next_question()
            .map(|q| (q.number, q.text.clone()))
            .ok_or_else(|| AnimaError::state("assessment opened with no pending question"))?;

        if let Err(err) = self
            .collab
            .sessions
            .initialize_session(&key, assessment_id, self.phq_type)
            .await
        {
            warn!(error = %err, "session store rejected initialization; continuing without progress record");
        }
        if let Err(err) = self
            .collab
            .sessions
            .set_question_text(&key, first_number, &first_text)
            .await
        {
            warn!(error = %err, "failed to record presented question text");
        }

        conversation.assessment = Some(assessment);
        info!(assessment_id = %assessment_id, phq_type = %self.phq_type, "formal assessment started");

        Ok(ToolResult::data(json!({
            "success": true,
            "assessment_id": assessment_id,
            "type": type_slug(self.phq_type),
            "total_questions": self.phq_type.question_count(),
            "current_question_number": first_number,
            "question_text": first_text,
            "response_scale": bank::response_scale_json(),
            "session_id": key.session_id,
        })))
    }
}

/// Validates and records one reply against the current question.
struct RecordAnswer {
    collab: Collaborators,
}

#[async_trait]
impl ToolHandler for RecordAnswer {
    async fn call(
        &self,
        conversation: &mut ConversationState,
        args: Value,
    ) -> AnimaResult<ToolResult> {
        let raw = required_str(&args, "answer")?.to_string();
        let user_id = required_str(&args, "user_id")?.to_string();
        let key = conversation.key.clone();

        let assessment = conversation.require_assessment()?;
        let number = assessment
            .next_question()
            .map(|q| q.number)
            .ok_or_else(|| AnimaError::state("no question is pending on the active assessment"))?;
        let assessment_id = assessment.assessment_id;
        let phq_type = assessment.phq_type;
        debug!(user_id = %user_id, question = number, "recording formal answer");

        match parse_answer(&raw) {
            None => {
                let outcome = assessment.record_invalid_attempt(number)?;
                let completed = assessment.is_completed;
                let next = assessment.next_question().map(|q| (q.number, q.text.clone()));

                if let Err(err) = self.collab.sessions.record_invalid_attempt(&key, number).await {
                    warn!(error = %err, "session store rejected invalid-attempt record");
                }

                match outcome {
                    AttemptOutcome::Retry { attempts_left } => {
                        debug!(question = number, attempts_left, "invalid answer; re-prompting");
                        Ok(ToolResult::data(json!({
                            "success": false,
                            "invalid_response": true,
                            "attempts_left": attempts_left,
                            "question_number": number,
                            "response_scale": bank::response_scale_json(),
                        })))
                    }
                    AttemptOutcome::Skipped => {
                        info!(question = number, "question skipped after repeated invalid input");
                        if let Err(err) = self.collab.sessions.mark_skipped(&key, number).await {
                            warn!(error = %err, "session store rejected skip record");
                        }
                        if completed {
                            let payload = finalize_completed(conversation, &self.collab).await?;
                            return Ok(ToolResult::data(payload));
                        }
                        let (next_number, next_text) = next.ok_or_else(|| {
                            AnimaError::state("question skipped but no successor is pending")
                        })?;
                        if let Err(err) = self
                            .collab
                            .sessions
                            .set_question_text(&key, next_number, &next_text)
                            .await
                        {
                            warn!(error = %err, "failed to record presented question text");
                        }
                        Ok(ToolResult::data(json!({
                            "success": false,
                            "question_skipped": true,
                            "skipped_question_number": number,
                            "next_question": {
                                "question_number": next_number,
                                "question_text": next_text,
                                "response_scale": bank::response_scale_json(),
                            },
                        })))
                    }
                }
            }
            Some(score) => {
                assessment.record_answer(number, score)?;
                let completed = assessment.is_completed;
                let next = assessment.next_question().map(|q| (q.number, q.text.clone()));

                if let Err(err) = self.collab.sessions.record_answer(&key, number, score).await {
                    warn!(error = %err, "session store rejected answer record");
                }
                if let Err(err) = self
                    .collab
                    .transcripts
                    .add_user_message(
                        &key,
                        &raw,
                        "phq-answer",
                        json!({
                            "is_phq_answer": true,
                            "phq_type": instrument_code(phq_type),
                            "phq_question_number": number,
                            "phq_answer_value": score,
                            "assessment_id": assessment_id,
                        }),
                    )
                    .await
                {
                    warn!(error = %err, "transcript write failed for answer record");
                }

                if completed {
                    let payload = finalize_completed(conversation, &self.collab).await?;
                    return Ok(ToolResult::data(payload));
                }
                let (next_number, next_text) = next.ok_or_else(|| {
                    AnimaError::state("answer recorded but no successor question is pending")
                })?;
                if let Err(err) = self
                    .collab
                    .sessions
                    .set_question_text(&key, next_number, &next_text)
                    .await
                {
                    warn!(error = %err, "failed to record presented question text");
                }
                Ok(ToolResult::data(json!({
                    "success": true,
                    "answer_recorded": true,
                    "answered_question_number": number,
                    "answer_value": score,
                    "next_question": {
                        "question_number": next_number,
                        "question_text": next_text,
                        "response_scale": bank::response_scale_json(),
                    },
                })))
            }
        }
    }
}

// ── Completion ────────────────────────────────────────────────────────────────

/// Finalize a completed assessment: score it, archive the outcome, write the
/// completion transcript record, and clear the conversation for the next
/// screening. Returns the completion payload.
pub(crate) async fn finalize_completed(
    conversation: &mut ConversationState,
    collab: &Collaborators,
) -> AnimaResult<Value> {
    let Some(assessment) = conversation.assessment.take() else {
        return Err(AnimaError::state("no active assessment to finalize"));
    };
    let key = conversation.key.clone();
    let phq_type = assessment.phq_type;
    let score = assessment.calculate_score();
    let severity = determine_severity(score, phq_type);
    let interpretation = interpret(&assessment);
    let q9_flagged = phq_type == PhqType::Phq9
        && assessment
            .question(9)
            .and_then(|q| q.answer)
            .is_some_and(|a| a > 0);

    if let Err(err) = collab
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

    let recommendation_lines = interpretation
        .recommendations
        .iter()
        .map(|r| format!("• {r}"))
        .collect::<Vec<_>>()
        .join("\n");
    let mut completion_message = format!(
        "{} Assessment Complete\n\nTotal Score: {}/{}\nSeverity: {}\n\n{}\n\nRecommendations:\n{}",
        phq_type,
        score,
        phq_type.max_score(),
        severity,
        interpretation.summary,
        recommendation_lines,
    );
    if q9_flagged {
        completion_message.push_str(
            "\n\n⚠️ CRISIS ALERT: You indicated thoughts of self-harm. Please seek immediate help:\n• Call 988 (Suicide & Crisis Lifeline)\n• Text HOME to 741741 (Crisis Text Line)\n• Call 911 if in immediate danger",
        );
    }

    let mut metadata = json!({
        "phq_type": instrument_code(phq_type),
        "total_score": score,
        "severity": severity,
        "assessment_id": assessment.assessment_id,
    });
    if phq_type == PhqType::Phq9 {
        metadata["has_suicidal_ideation"] = json!(q9_flagged);
    }
    if let Err(err) = collab
        .transcripts
        .add_assistant_message(&key, &completion_message, "phq-completion", metadata)
        .await
    {
        warn!(error = %err, "transcript write failed for completion record");
    }
    if let Err(err) = collab.sessions.end_session(&key).await {
        warn!(error = %err, "session store rejected close");
    }

    info!(
        assessment_id = %assessment.assessment_id,
        score,
        severity,
        "formal assessment completed"
    );

    let mut payload = json!({
        "success": true,
        "assessment_complete": true,
        "score": score,
        "severity": severity,
        "interpretation": interpretation.summary,
        "recommendations": interpretation.recommendations,
    });
    match phq_type {
        PhqType::Phq2 => {
            payload["suggest_phq9"] = json!(score >= collab.config.phq2_promotion_threshold);
        }
        PhqType::Phq9 => {
            payload["has_suicidal_ideation"] = json!(q9_flagged);
        }
    }
    Ok(payload)
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
            "answer": {
                "type": "string",
                "description": "The user answer (should be 0, 1, 2, or 3)"
            },
            "user_id": { "type": "string", "description": "The user's id" }
        },
        "required": ["answer", "user_id"]
    })
}

// ── Agent assembly ────────────────────────────────────────────────────────────

pub fn phq2_agent(collab: &Collaborators) -> Agent {
    Agent::new(
        AgentId::new(PHQ2_AGENT_ID),
        PHQ2_DESCRIPTION,
        PHQ2_SYSTEM_MESSAGE,
        vec![
            Tool::new(
                "start-phq2-assessment",
                "Initialize and begin the PHQ-2 quick depression screening assessment",
                start_parameters(),
                Arc::new(StartAssessment {
                    phq_type: PhqType::Phq2,
                    collab: collab.clone(),
                }),
            ),
            Tool::new(
                "record-phq2-answer",
                "Record and validate a user answer for the current PHQ-2 question",
                record_parameters(),
                Arc::new(RecordAnswer {
                    collab: collab.clone(),
                }),
            ),
            return_tool(
                tars::AGENT_ID,
                "Complete PHQ-2 assessment and return control to Tars coordinator. Call this \
                 after presenting assessment results and saying goodbye.",
                "PHQ-2 assessment complete, returning to Tars",
            ),
        ],
    )
}

/// The PHQ-9 agent declares no return tool; the registry injects its switch
/// back to the coordinator.
pub fn phq9_agent(collab: &Collaborators) -> Agent {
    Agent::new(
        AgentId::new(PHQ9_AGENT_ID),
        PHQ9_DESCRIPTION,
        PHQ9_SYSTEM_MESSAGE,
        vec![
            Tool::new(
                "start-phq9-assessment",
                "Initialize and begin the PHQ-9 comprehensive depression assessment",
                start_parameters(),
                Arc::new(StartAssessment {
                    phq_type: PhqType::Phq9,
                    collab: collab.clone(),
                }),
            ),
            Tool::new(
                "record-phq9-answer",
                "Record and validate a user answer for the current PHQ-9 question",
                record_parameters(),
                Arc::new(RecordAnswer {
                    collab: collab.clone(),
                }),
            ),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use anima_contracts::ids::ConversationKey;
    use anima_core::RuntimeConfig;
    use anima_progress::{InMemoryProfileStore, InMemorySessionStore, InMemoryTranscriptStore};

    struct Bench {
        collab: Collaborators,
        sessions: Arc<InMemorySessionStore>,
        transcripts: Arc<InMemoryTranscriptStore>,
    }

    fn bench() -> Bench {
        let sessions = Arc::new(InMemorySessionStore::new());
        let transcripts = Arc::new(InMemoryTranscriptStore::new());
        let collab = Collaborators {
            sessions: sessions.clone(),
            transcripts: transcripts.clone(),
            profiles: Arc::new(InMemoryProfileStore::new()),
            config: Arc::new(RuntimeConfig::default()),
        };
        Bench {
            collab,
            sessions,
            transcripts,
        }
    }

    fn key() -> ConversationKey {
        ConversationKey::new("user-7", "session-a")
    }

    fn conversation(agent_id: &str) -> ConversationState {
        ConversationState::new(key(), AgentId::new(agent_id))
    }

    fn payload(result: ToolResult) -> Value {
        match result {
            ToolResult::Data { payload } => payload,
            other => panic!("expected data result, got {other:?}"),
        }
    }

    async fn start(bench: &Bench, convo: &mut ConversationState, phq_type: PhqType) -> Value {
        let handler = StartAssessment {
            phq_type,
            collab: bench.collab.clone(),
        };
        payload(
            handler
                .call(convo, json!({"user_id": "user-7"}))
                .await
                .unwrap(),
        )
    }

    async fn answer(bench: &Bench, convo: &mut ConversationState, raw: &str) -> Value {
        let handler = RecordAnswer {
            collab: bench.collab.clone(),
        };
        payload(
            handler
                .call(convo, json!({"user_id": "user-7", "answer": raw}))
                .await
                .unwrap(),
        )
    }

    /// Starting opens a session record and presents question 1 verbatim.
    #[tokio::test]
    async fn start_presents_the_first_question() {
        let bench = bench();
        let mut convo = conversation(PHQ2_AGENT_ID);

        let reply = start(&bench, &mut convo, PhqType::Phq2).await;
        assert_eq!(reply["success"], true);
        assert_eq!(reply["type"], "phq2");
        assert_eq!(reply["total_questions"], 2);
        assert_eq!(reply["current_question_number"], 1);
        assert_eq!(
            reply["question_text"],
            bank::question_text(1).unwrap()
        );
        assert_eq!(reply["session_id"], "session-a");

        let progress = bench.sessions.progress(&key()).unwrap();
        assert_eq!(progress.phq_type, PhqType::Phq2);
        assert_eq!(
            progress.question(1).unwrap().question_text,
            bank::question_text(1).unwrap()
        );
    }

    /// A second start while one is running is a state error.
    #[tokio::test]
    async fn start_rejects_a_running_assessment() {
        let bench = bench();
        let mut convo = conversation(PHQ2_AGENT_ID);
        start(&bench, &mut convo, PhqType::Phq2).await;

        let handler = StartAssessment {
            phq_type: PhqType::Phq2,
            collab: bench.collab.clone(),
        };
        let err = handler
            .call(&mut convo, json!({"user_id": "user-7"}))
            .await
            .unwrap_err();
        match err {
            AnimaError::State { reason } => assert!(reason.contains("already in progress")),
            other => panic!("expected state error, got {other:?}"),
        }
    }

    /// Recording without a start is a state error, not a degraded payload.
    #[tokio::test]
    async fn record_without_start_is_a_state_error() {
        let bench = bench();
        let mut convo = conversation(PHQ2_AGENT_ID);
        let handler = RecordAnswer {
            collab: bench.collab.clone(),
        };

        let err = handler
            .call(&mut convo, json!({"user_id": "user-7", "answer": "2"}))
            .await
            .unwrap_err();
        match err {
            AnimaError::State { .. } => {}
            other => panic!("expected state error, got {other:?}"),
        }
    }

    /// Unparseable answers count down the attempt budget and re-present the
    /// scale without advancing the questionnaire.
    #[tokio::test]
    async fn invalid_answers_count_down_before_skipping() {
        let bench = bench();
        let mut convo = conversation(PHQ2_AGENT_ID);
        start(&bench, &mut convo, PhqType::Phq2).await;

        let first = answer(&bench, &mut convo, "banana").await;
        assert_eq!(first["success"], false);
        assert_eq!(first["invalid_response"], true);
        assert_eq!(first["attempts_left"], 2);
        assert_eq!(first["question_number"], 1);

        let second = answer(&bench, &mut convo, "idk").await;
        assert_eq!(second["attempts_left"], 1);

        let third = answer(&bench, &mut convo, "whatever").await;
        assert_eq!(third["question_skipped"], true);
        assert_eq!(third["skipped_question_number"], 1);
        assert_eq!(third["next_question"]["question_number"], 2);

        let progress = bench.sessions.progress(&key()).unwrap();
        let q1 = progress.question(1).unwrap();
        assert_eq!(q1.attempts, 3);
        assert!(q1.was_skipped);
    }

    /// A full PHQ-2 run archives the outcome, writes the completion record,
    /// and clears the conversation for the next screening.
    #[tokio::test]
    async fn phq2_completion_scores_and_archives() {
        let bench = bench();
        let mut convo = conversation(PHQ2_AGENT_ID);
        start(&bench, &mut convo, PhqType::Phq2).await;

        let mid = answer(&bench, &mut convo, "3").await;
        assert_eq!(mid["answer_recorded"], true);
        assert_eq!(mid["next_question"]["question_number"], 2);

        let done = answer(&bench, &mut convo, "not at all").await;
        assert_eq!(done["assessment_complete"], true);
        assert_eq!(done["score"], 3);
        assert_eq!(done["severity"], "Elevated, recommend PHQ-9");
        assert_eq!(done["suggest_phq9"], true);

        assert!(convo.assessment.is_none());
        assert!(bench.sessions.progress(&key()).is_none());

        let history = bench.collab.sessions.history("user-7", 10).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].total_score, Some(3));
        assert!(history[0].is_complete);

        let transcript = bench.transcripts.export(&key()).unwrap();
        let completion = transcript
            .entries
            .iter()
            .find(|e| e.message.tag == "phq-completion")
            .unwrap();
        assert!(completion.message.text.contains("PHQ-2 Assessment Complete"));
        assert!(completion.message.text.contains("Total Score: 3/6"));
        assert_eq!(completion.message.metadata["phq_type"], 2);
    }

    /// Scored answers leave tagged transcript entries for later summaries.
    #[tokio::test]
    async fn answers_are_written_to_the_transcript() {
        let bench = bench();
        let mut convo = conversation(PHQ2_AGENT_ID);
        start(&bench, &mut convo, PhqType::Phq2).await;
        answer(&bench, &mut convo, "several days").await;

        let transcript = bench.transcripts.export(&key()).unwrap();
        let entry = transcript
            .entries
            .iter()
            .find(|e| e.message.tag == "phq-answer")
            .unwrap();
        assert_eq!(entry.message.text, "several days");
        assert_eq!(entry.message.metadata["phq_answer_value"], 1);
        assert_eq!(entry.message.metadata["phq_question_number"], 1);
        assert!(bench.transcripts.verify_integrity(&key()));
    }

    /// Any positive answer on question 9 raises the crisis flag and appends
    /// the crisis resources to the completion record.
    #[tokio::test]
    async fn phq9_flags_suicidal_ideation() {
        let bench = bench();
        let mut convo = conversation(PHQ9_AGENT_ID);
        start(&bench, &mut convo, PhqType::Phq9).await;

        for _ in 0..8 {
            answer(&bench, &mut convo, "0").await;
        }
        let done = answer(&bench, &mut convo, "1").await;
        assert_eq!(done["assessment_complete"], true);
        assert_eq!(done["score"], 1);
        assert_eq!(done["severity"], "Minimal");
        assert_eq!(done["has_suicidal_ideation"], true);

        let transcript = bench.transcripts.export(&key()).unwrap();
        let completion = transcript
            .entries
            .iter()
            .find(|e| e.message.tag == "phq-completion")
            .unwrap();
        assert!(completion.message.text.contains("CRISIS ALERT"));
        assert!(completion.message.text.contains("988"));
        assert_eq!(completion.message.metadata["has_suicidal_ideation"], true);
    }

    /// A clean PHQ-9 run reports no ideation and no crisis block.
    #[tokio::test]
    async fn phq9_without_ideation_stays_clean() {
        let bench = bench();
        let mut convo = conversation(PHQ9_AGENT_ID);
        start(&bench, &mut convo, PhqType::Phq9).await;

        for _ in 0..9 {
            answer(&bench, &mut convo, "0").await;
        }
        let history = bench.collab.sessions.history("user-7", 10).await.unwrap();
        assert_eq!(history[0].total_score, Some(0));

        let transcript = bench.transcripts.export(&key()).unwrap();
        let completion = transcript
            .entries
            .iter()
            .find(|e| e.message.tag == "phq-completion")
            .unwrap();
        assert!(!completion.message.text.contains("CRISIS ALERT"));
        assert_eq!(completion.message.metadata["has_suicidal_ideation"], false);
    }

    /// A completed-and-cleared conversation can start a fresh assessment.
    #[tokio::test]
    async fn completion_allows_a_restart() {
        let bench = bench();
        let mut convo = conversation(PHQ2_AGENT_ID);
        start(&bench, &mut convo, PhqType::Phq2).await;
        answer(&bench, &mut convo, "0").await;
        answer(&bench, &mut convo, "0").await;
        assert!(convo.assessment.is_none());

        let reply = start(&bench, &mut convo, PhqType::Phq2).await;
        assert_eq!(reply["success"], true);
        assert_eq!(reply["current_question_number"], 1);
    }

    /// The PHQ-2 roster entry declares its return tool; PHQ-9 leaves the
    /// switch back to the coordinator to registry injection.
    #[test]
    fn agents_declare_the_expected_tools() {
        let bench = bench();
        let phq2 = phq2_agent(&bench.collab);
        let phq2_names: Vec<&str> = phq2.tools.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(
            phq2_names,
            vec!["start-phq2-assessment", "record-phq2-answer", tars::AGENT_ID]
        );

        let phq9 = phq9_agent(&bench.collab);
        let phq9_names: Vec<&str> = phq9.tools.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(
            phq9_names,
            vec!["start-phq9-assessment", "record-phq9-answer"]
        );
    }
}
