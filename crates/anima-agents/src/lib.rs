//! # anima-agents
//!
//! The ANIMA agent roster and its assembly into a routable registry.
//!
//! ## Overview
//!
//! Six agents cooperate on one conversation:
//!
//! - **Tars** — the root coordinator. Greets, routes, and is the only agent
//!   that reads biometric data silently.
//! - **Matron** — biometric and biographical intake.
//! - **Jekyll** — conversational screening: infers PHQ scores from natural
//!   dialogue instead of administering the instrument verbatim.
//! - **Agent_PHQ2 / Agent_PHQ9** — the verbatim questionnaire specialists.
//! - **Vocalist** — the 35-second voice recording workflow.
//!
//! Every handler works against the same [`Collaborators`] bundle: session
//! store, transcript store, profile store, and runtime configuration. The
//! handlers own no storage; swap the trait objects to move off the
//! in-memory implementations.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use anima_agents::{build_registry, Collaborators};
//! use anima_core::{Orchestrator, RuntimeConfig};
//!
//! let collab = Collaborators::in_memory(RuntimeConfig::default());
//! let mut orchestrator = Orchestrator::new(build_registry(&collab)?);
//! let activation = orchestrator.begin_conversation(key)?;
//! ```

pub mod formal;
pub mod jekyll;
pub mod matron;
pub mod tars;
pub mod vocalist;

mod support;

use std::sync::Arc;

use anima_contracts::error::AnimaResult;
use anima_core::{
    traits::{ProfileStore, SessionStore, TranscriptStore},
    AgentRegistry, AgentRegistryBuilder, RuntimeConfig,
};
use anima_progress::{InMemoryProfileStore, InMemorySessionStore, InMemoryTranscriptStore};

/// The shared collaborators every tool handler is constructed over.
///
/// Cloning is cheap; each clone shares the same underlying stores.
#[derive(Clone)]
pub struct Collaborators {
    pub sessions: Arc<dyn SessionStore>,
    pub transcripts: Arc<dyn TranscriptStore>,
    pub profiles: Arc<dyn ProfileStore>,
    pub config: Arc<RuntimeConfig>,
}

impl Collaborators {
    /// Fresh in-memory stores under the given configuration.
    ///
    /// Suitable for demos and tests; production deployments supply their
    /// own store implementations field by field.
    pub fn in_memory(config: RuntimeConfig) -> Self {
        Self {
            sessions: Arc::new(InMemorySessionStore::new()),
            transcripts: Arc::new(InMemoryTranscriptStore::new()),
            profiles: Arc::new(InMemoryProfileStore::new()),
            config: Arc::new(config),
        }
    }
}

/// Assemble the full roster into a validated registry, Tars as root.
///
/// Construction fails if any agent is misconfigured (duplicate ids,
/// duplicate tool names, uncompilable parameter schemas). The builder also
/// injects a switch tool for every agent pair the roster does not connect
/// explicitly, so after this returns every agent can reach every other.
pub fn build_registry(collab: &Collaborators) -> AnimaResult<AgentRegistry> {
    AgentRegistryBuilder::new()
        .with_root(tars::agent(collab))
        .with_agent(matron::agent(collab))
        .with_agent(jekyll::agent(collab))
        .with_agent(formal::phq2_agent(collab))
        .with_agent(formal::phq9_agent(collab))
        .with_agent(vocalist::agent(collab))
        .build()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    use anima_contracts::{
        ids::{AgentId, ConversationKey, PhqType},
        tool::{DispatchOutcome, ToolCall, ToolResult},
    };
    use anima_core::Orchestrator;

    fn data(outcome: DispatchOutcome) -> Value {
        match outcome.result {
            ToolResult::Data { payload } => payload,
            other => panic!("expected data result, got {other:?}"),
        }
    }

    fn handoff_payload(outcome: DispatchOutcome) -> (AgentId, Value) {
        assert!(
            outcome.activation.is_some(),
            "handoff must carry an activation"
        );
        match outcome.result {
            ToolResult::Handoff {
                target_agent_id,
                payload,
            } => (target_agent_id, payload),
            other => panic!("expected handoff result, got {other:?}"),
        }
    }

    /// The registry exposes all six agents and connects every ordered pair,
    /// declared or injected.
    #[test]
    fn every_agent_can_reach_every_other() {
        let collab = Collaborators::in_memory(RuntimeConfig::default());
        let registry = build_registry(&collab).unwrap();

        let mut ids: Vec<String> = registry.agent_ids().map(|id| id.to_string()).collect();
        ids.sort();
        assert_eq!(
            ids,
            vec![
                "Agent_Jekyll",
                "Agent_Matron",
                "Agent_PHQ2",
                "Agent_PHQ9",
                "Agent_Tars",
                "Agent_Vocalist",
            ]
        );

        let roster: Vec<AgentId> = registry.agent_ids().cloned().collect();
        for from in &roster {
            for to in &roster {
                if from != to {
                    assert!(
                        registry.find_tool(from, to.as_str()).is_ok(),
                        "{from} has no route to {to}"
                    );
                }
            }
        }

        // Declared switches keep their own schemas: Tars reaches Matron
        // only with a stated reason, while the injected PHQ-2 switch and
        // Jekyll's declared return tool take an empty object.
        let tars_id = AgentId::new(tars::AGENT_ID);
        assert!(registry
            .validate_args(&tars_id, matron::AGENT_ID, &json!({}))
            .is_err());
        assert!(registry
            .validate_args(&tars_id, formal::PHQ2_AGENT_ID, &json!({}))
            .is_ok());
        assert!(registry
            .validate_args(&AgentId::new(jekyll::AGENT_ID), tars::AGENT_ID, &json!({}))
            .is_ok());
    }

    /// A verbatim PHQ-2 run, end to end: switch to the specialist, one
    /// invalid reply, two scored answers, completion, return to the
    /// coordinator, and the archived outcome visible in its summary tool.
    #[tokio::test]
    async fn verbatim_screening_runs_end_to_end() {
        let collab = Collaborators::in_memory(RuntimeConfig::default());
        let mut orchestrator = Orchestrator::new(build_registry(&collab).unwrap());
        let key = ConversationKey::new("avery", "session-1");

        let activation = orchestrator.begin_conversation(key.clone()).unwrap();
        assert_eq!(activation.agent_id, AgentId::new(tars::AGENT_ID));
        // The coordinator's manifest carries the injected instrument
        // switches alongside its declared tools.
        assert!(activation
            .tools
            .iter()
            .any(|t| t.name == formal::PHQ2_AGENT_ID));

        let outcome = orchestrator
            .dispatch(&key, ToolCall::new(formal::PHQ2_AGENT_ID, json!({})))
            .await
            .unwrap();
        let (target, payload) = handoff_payload(outcome);
        assert_eq!(target, AgentId::new(formal::PHQ2_AGENT_ID));
        assert_eq!(payload["agent_switch"], true);

        let started = data(
            orchestrator
                .dispatch(
                    &key,
                    ToolCall::new("start-phq2-assessment", json!({"user_id": "avery"})),
                )
                .await
                .unwrap(),
        );
        assert_eq!(started["success"], true);
        assert_eq!(started["current_question_number"], 1);
        assert_eq!(started["total_questions"], 2);

        let invalid = data(
            orchestrator
                .dispatch(
                    &key,
                    ToolCall::new(
                        "record-phq2-answer",
                        json!({"user_id": "avery", "answer": "kind of"}),
                    ),
                )
                .await
                .unwrap(),
        );
        assert_eq!(invalid["success"], false);
        assert_eq!(invalid["invalid_response"], true);
        assert_eq!(invalid["attempts_left"], 2);

        let first = data(
            orchestrator
                .dispatch(
                    &key,
                    ToolCall::new(
                        "record-phq2-answer",
                        json!({"user_id": "avery", "answer": "3"}),
                    ),
                )
                .await
                .unwrap(),
        );
        assert_eq!(first["answer_recorded"], true);
        assert_eq!(first["next_question"]["question_number"], 2);

        let done = data(
            orchestrator
                .dispatch(
                    &key,
                    ToolCall::new(
                        "record-phq2-answer",
                        json!({"user_id": "avery", "answer": "not at all"}),
                    ),
                )
                .await
                .unwrap(),
        );
        assert_eq!(done["assessment_complete"], true);
        assert_eq!(done["score"], 3);
        assert_eq!(done["severity"], "Elevated, recommend PHQ-9");
        assert_eq!(done["suggest_phq9"], true);

        let outcome = orchestrator
            .dispatch(&key, ToolCall::new(tars::AGENT_ID, json!({})))
            .await
            .unwrap();
        let (target, _) = handoff_payload(outcome);
        assert_eq!(target, AgentId::new(tars::AGENT_ID));
        assert_eq!(
            orchestrator.active_agent(&key),
            Some(&AgentId::new(tars::AGENT_ID))
        );

        let summary = data(
            orchestrator
                .dispatch(
                    &key,
                    ToolCall::new("get-phq-assessment-summary", json!({"user_id": "avery"})),
                )
                .await
                .unwrap(),
        );
        assert_eq!(summary["success"], true);
        assert_eq!(summary["summary"]["total_assessments"], 1);
        assert_eq!(summary["summary"]["latest_assessment"]["total_score"], 3);
        assert_eq!(summary["summary"]["score_trend"], "insufficient-data");
    }

    /// An abandoned screening resumes in a fresh orchestrator: the persisted
    /// record rebuilds the machine mid-questionnaire, the restored
    /// conversation picks up at question 2, and one more answer completes it.
    #[tokio::test]
    async fn abandoned_screening_resumes_from_its_progress_record() {
        use anima_contracts::ids::AssessmentId;
        use anima_contracts::progress::{AnsweredQuestion, SessionProgress};
        use anima_screening::{bank, Assessment};

        // The record a session store hands back after a restart: question 1
        // answered with 2, question 2 still pending.
        let mut record =
            SessionProgress::begin("avery", "session-1", AssessmentId::new(), PhqType::Phq2);
        record.answered_questions = vec![AnsweredQuestion {
            question_number: 1,
            question_text: bank::question_text(1).unwrap().to_string(),
            answer: Some(2),
            attempts: 0,
            was_skipped: false,
            answered_at: Some(chrono::Utc::now()),
        }];

        let collab = Collaborators::in_memory(RuntimeConfig::default());
        let mut orchestrator = Orchestrator::new(build_registry(&collab).unwrap());
        let key = ConversationKey::new("avery", "session-1");
        orchestrator.begin_conversation(key.clone()).unwrap();

        let conversation = orchestrator.conversation_mut(&key).unwrap();
        conversation.active_agent = AgentId::new(formal::PHQ2_AGENT_ID);
        conversation.assessment = Some(Assessment::from_progress(&record));

        let done = data(
            orchestrator
                .dispatch(
                    &key,
                    ToolCall::new(
                        "record-phq2-answer",
                        json!({"user_id": "avery", "answer": "several days"}),
                    ),
                )
                .await
                .unwrap(),
        );
        assert_eq!(done["assessment_complete"], true);
        assert_eq!(done["score"], 3);
        assert_eq!(done["severity"], "Elevated, recommend PHQ-9");
        assert_eq!(done["suggest_phq9"], true);
    }

    /// A conversational run that promotes: two PHQ-2 probes, promotion to
    /// the long form, seven more probes, completion, and a tamper-evident
    /// transcript of the whole exchange.
    #[tokio::test]
    async fn conversational_screening_promotes_and_completes() {
        let sessions = Arc::new(InMemorySessionStore::new());
        let transcripts = Arc::new(InMemoryTranscriptStore::new());
        let collab = Collaborators {
            sessions: sessions.clone(),
            transcripts: transcripts.clone(),
            profiles: Arc::new(InMemoryProfileStore::new()),
            config: Arc::new(RuntimeConfig::default()),
        };
        let mut orchestrator = Orchestrator::new(build_registry(&collab).unwrap());
        let key = ConversationKey::new("avery", "session-2");
        orchestrator.begin_conversation(key.clone()).unwrap();

        let outcome = orchestrator
            .dispatch(
                &key,
                ToolCall::new(
                    jekyll::AGENT_ID,
                    json!({"reason": "user asked for a conversational check-in"}),
                ),
            )
            .await
            .unwrap();
        let (target, payload) = handoff_payload(outcome);
        assert_eq!(target, AgentId::new(jekyll::AGENT_ID));
        assert_eq!(payload["reason"], "user asked for a conversational check-in");

        let started = data(
            orchestrator
                .dispatch(
                    &key,
                    ToolCall::new("start-jekyll-assessment", json!({"user_id": "avery"})),
                )
                .await
                .unwrap(),
        );
        assert_eq!(started["stage"], "phq2-probing");

        let probe = |question: u8, text: &str| {
            json!({
                "user_response": text,
                "contextual_question": format!("probe for question {question}"),
                "target_phq_question": question,
                "user_id": "avery",
            })
        };

        let first = data(
            orchestrator
                .dispatch(
                    &key,
                    ToolCall::new(
                        "record-conversational-response",
                        probe(1, "I often avoid my hobbies"),
                    ),
                )
                .await
                .unwrap(),
        );
        assert_eq!(first["response_recorded"], true);
        assert_eq!(first["questions_remaining"], 1);

        let promoted = data(
            orchestrator
                .dispatch(
                    &key,
                    ToolCall::new(
                        "record-conversational-response",
                        probe(2, "Sometimes I'm low"),
                    ),
                )
                .await
                .unwrap(),
        );
        assert_eq!(promoted["phq2_complete"], true);
        assert_eq!(promoted["phq2_score"], 3);
        assert_eq!(promoted["recommend_phq9"], true);
        assert_eq!(promoted["next_stage"], "phq9-probing");

        for question in 3..=9u8 {
            let reply = data(
                orchestrator
                    .dispatch(
                        &key,
                        ToolCall::new(
                            "record-conversational-response",
                            probe(question, "all fine on that front"),
                        ),
                    )
                    .await
                    .unwrap(),
            );
            assert_eq!(reply["assessment_complete"], question == 9);
        }

        let completed = data(
            orchestrator
                .dispatch(
                    &key,
                    ToolCall::new("complete-jekyll-assessment", json!({"user_id": "avery"})),
                )
                .await
                .unwrap(),
        );
        assert_eq!(completed["score"], 3);
        assert_eq!(completed["severity"], "Minimal");
        assert_eq!(completed["assessment_type"], "PHQ-9");

        let outcome = orchestrator
            .dispatch(&key, ToolCall::new(tars::AGENT_ID, json!({})))
            .await
            .unwrap();
        handoff_payload(outcome);
        assert_eq!(
            orchestrator.active_agent(&key),
            Some(&AgentId::new(tars::AGENT_ID))
        );

        let history = collab.sessions.history("avery", 10).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].phq_type, PhqType::Phq9);
        assert_eq!(history[0].total_score, Some(3));

        assert!(transcripts.verify_integrity(&key));
        let transcript = transcripts.export(&key).unwrap();
        assert!(transcript
            .entries
            .iter()
            .any(|e| e.message.tag == "jekyll-assessment-complete"));
        assert_eq!(
            transcript
                .entries
                .iter()
                .filter(|e| e.message.tag == "jekyll-conversational-response")
                .count(),
            9
        );
    }

    /// A tour across intake and recording: biometrics saved under Matron
    /// pre-fill the Vocalist's analysis submission, and control always
    /// returns to the coordinator.
    #[tokio::test]
    async fn intake_feeds_the_recording_workflow() {
        let collab = Collaborators::in_memory(RuntimeConfig::default());
        let mut orchestrator = Orchestrator::new(build_registry(&collab).unwrap());
        let key = ConversationKey::new("avery", "session-3");
        orchestrator.begin_conversation(key.clone()).unwrap();

        let outcome = orchestrator
            .dispatch(
                &key,
                ToolCall::new(
                    matron::AGENT_ID,
                    json!({"reason": "user agreed to share biographical details"}),
                ),
            )
            .await
            .unwrap();
        let (target, _) = handoff_payload(outcome);
        assert_eq!(target, AgentId::new(matron::AGENT_ID));

        let started = data(
            orchestrator
                .dispatch(
                    &key,
                    ToolCall::new("start-biometric-collection", json!({"user_id": "avery"})),
                )
                .await
                .unwrap(),
        );
        assert_eq!(started["success"], true);

        let saved = data(
            orchestrator
                .dispatch(
                    &key,
                    ToolCall::new(
                        "save-biometric-data",
                        json!({
                            "user_id": "avery",
                            "nickname": "Ave",
                            "weight_kg": 70.5,
                            "height_cm": 178.0,
                            "gender": "nonbinary",
                            "hobbies": "reading, climbing",
                        }),
                    ),
                )
                .await
                .unwrap(),
        );
        assert_eq!(saved["success"], true);
        assert_eq!(saved["data"]["hobbies"], json!(["reading", "climbing"]));
        // Data results never move the conversation off the active agent.
        assert_eq!(
            orchestrator.active_agent(&key),
            Some(&AgentId::new(matron::AGENT_ID))
        );

        orchestrator
            .dispatch(&key, ToolCall::new(tars::AGENT_ID, json!({})))
            .await
            .unwrap();
        let exists = data(
            orchestrator
                .dispatch(
                    &key,
                    ToolCall::new("check-biometric-data", json!({"user_id": "avery"})),
                )
                .await
                .unwrap(),
        );
        assert_eq!(exists["exists"], true);

        orchestrator
            .dispatch(
                &key,
                ToolCall::new(
                    vocalist::AGENT_ID,
                    json!({"reason": "user wants the voice assessment"}),
                ),
            )
            .await
            .unwrap();

        let recording = data(
            orchestrator
                .dispatch(
                    &key,
                    ToolCall::new("start-vocalist-recording", json!({"user_id": "avery"})),
                )
                .await
                .unwrap(),
        );
        assert_eq!(recording["success"], true);
        assert_eq!(recording["attempts_remaining"], 1);

        let taken = data(
            orchestrator
                .dispatch(
                    &key,
                    ToolCall::new(
                        "complete-vocalist-recording",
                        json!({
                            "user_id": "avery",
                            "duration_seconds": 34.6,
                            "audio_format": "wav",
                        }),
                    ),
                )
                .await
                .unwrap(),
        );
        assert_eq!(taken["success"], true);
        assert_eq!(
            orchestrator.conversation(&key).unwrap().recording_attempts,
            0
        );

        let submitted = data(
            orchestrator
                .dispatch(
                    &key,
                    ToolCall::new(
                        "submit-vocalist-analysis",
                        json!({
                            "user_id": "avery",
                            "audio_file_url": "recordings/avery-session-3.wav",
                        }),
                    ),
                )
                .await
                .unwrap(),
        );
        assert_eq!(submitted["patient_info"]["weight"], 70.5);
        assert_eq!(submitted["patient_info"]["height"], 178.0);
        assert_eq!(submitted["patient_info"]["gender"], "nonbinary");
        assert_eq!(submitted["patient_info"]["age"], Value::Null);

        let outcome = orchestrator
            .dispatch(&key, ToolCall::new(tars::AGENT_ID, json!({})))
            .await
            .unwrap();
        let (target, _) = handoff_payload(outcome);
        assert_eq!(target, AgentId::new(tars::AGENT_ID));
    }
}
