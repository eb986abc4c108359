//! Scenario 4: Risk Detection and Escalation
//!
//! Two independent risk channels:
//!
//! Sub-case A — conversational: crisis language in a Jekyll reply is logged
//! by the inference engine even though the numeric screen closes negative,
//! and the explicit alert tool writes a professional alert into the
//! tamper-evident transcript.
//!
//! Sub-case B — verbatim: any positive answer on PHQ-9 question 9 flags
//! suicidal ideation and appends the crisis resources to the completion
//! record.

use serde_json::json;

use anima_agents::{build_registry, formal, jekyll};
use anima_contracts::{error::AnimaResult, ids::ConversationKey, tool::ToolCall};
use anima_core::Orchestrator;

use super::{demo_stores, payload_of};

/// Run Scenario 4: both risk channels.
pub async fn run_scenario() -> AnimaResult<()> {
    println!("=== Scenario 4: Risk Detection and Escalation ===");
    println!();

    // ── Sub-case A: crisis language during conversational screening ──────────

    {
        println!("  Sub-case A: Crisis language in conversation");

        let stores = demo_stores();
        let mut orchestrator = Orchestrator::new(build_registry(&stores.collab)?);
        let key = ConversationKey::new("avery", "demo-risk-jekyll");
        orchestrator.begin_conversation(key.clone())?;

        orchestrator
            .dispatch(
                &key,
                ToolCall::new(jekyll::AGENT_ID, json!({ "reason": "wellness check-in" })),
            )
            .await?;
        orchestrator
            .dispatch(
                &key,
                ToolCall::new("start-jekyll-assessment", json!({ "user_id": "avery" })),
            )
            .await?;

        orchestrator
            .dispatch(
                &key,
                ToolCall::new(
                    "record-conversational-response",
                    json!({
                        "user_response": "Mostly okay, I still enjoy my runs",
                        "contextual_question": "What have you been enjoying lately?",
                        "target_phq_question": 1,
                        "user_id": "avery",
                    }),
                ),
            )
            .await?;

        let reply = "Sometimes I think everyone would be better off dead without me";
        let recorded = payload_of(
            orchestrator
                .dispatch(
                    &key,
                    ToolCall::new(
                        "record-conversational-response",
                        json!({
                            "user_response": reply,
                            "contextual_question": "How have your spirits been?",
                            "target_phq_question": 2,
                            "user_id": "avery",
                        }),
                    ),
                )
                .await?,
        );
        println!("  User: \"{}\"", reply);
        println!(
            "  Numeric screen:      closed negative at {} point(s) — scores alone miss the risk",
            recorded["phq2_score"]
        );

        let alert = payload_of(
            orchestrator
                .dispatch(
                    &key,
                    ToolCall::new(
                        "detect-immediate-risk",
                        json!({
                            "risk_indicators": "mentions being better off dead",
                            "severity": "critical",
                            "user_id": "avery",
                        }),
                    ),
                )
                .await?,
        );
        println!("  Alert severity:      {}", alert["severity"]);
        println!("  Alert triggered:     {}", alert["alert_triggered"]);
        println!("  Next action:         {}", alert["next_action"]);

        let completed = payload_of(
            orchestrator
                .dispatch(
                    &key,
                    ToolCall::new("complete-jekyll-assessment", json!({ "user_id": "avery" })),
                )
                .await?,
        );
        println!(
            "  Risk factors on the completion record: {}",
            completed["risk_factors_detected"]
        );

        let alert_recorded = stores
            .transcripts
            .export(&key)
            .map(|t| {
                t.entries
                    .iter()
                    .any(|e| e.message.tag == "jekyll-risk-alert")
            })
            .unwrap_or(false);
        println!(
            "  Professional alert in transcript:      {}",
            if alert_recorded { "YES" } else { "MISSING" }
        );
        println!(
            "  Transcript chain integrity:            {}",
            if stores.transcripts.verify_integrity(&key) {
                "VERIFIED"
            } else {
                "FAILED"
            }
        );
        println!();
    }

    // ── Sub-case B: PHQ-9 question 9 flag ────────────────────────────────────

    {
        println!("  Sub-case B: Positive answer on PHQ-9 question 9");

        let stores = demo_stores();
        let mut orchestrator = Orchestrator::new(build_registry(&stores.collab)?);
        let key = ConversationKey::new("avery", "demo-risk-phq9");
        orchestrator.begin_conversation(key.clone())?;

        orchestrator
            .dispatch(&key, ToolCall::new(formal::PHQ9_AGENT_ID, json!({})))
            .await?;
        orchestrator
            .dispatch(
                &key,
                ToolCall::new("start-phq9-assessment", json!({ "user_id": "avery" })),
            )
            .await?;

        // Eight clear answers, then a positive reply on question 9.
        let mut done = json!(null);
        for answer in ["0", "0", "0", "0", "0", "0", "0", "0", "1"] {
            done = payload_of(
                orchestrator
                    .dispatch(
                        &key,
                        ToolCall::new(
                            "record-phq9-answer",
                            json!({ "user_id": "avery", "answer": answer }),
                        ),
                    )
                    .await?,
            );
        }
        println!("  Answers:             0 on questions 1-8, 1 on question 9");
        println!("  Total score:         {}/27 ({})", done["score"], done["severity"]);
        println!("  Suicidal ideation:   {}", done["has_suicidal_ideation"]);

        let crisis_in_record = stores
            .transcripts
            .export(&key)
            .and_then(|t| {
                t.entries
                    .iter()
                    .find(|e| e.message.tag == "phq-completion")
                    .map(|e| e.message.text.contains("CRISIS ALERT"))
            })
            .unwrap_or(false);
        println!(
            "  Crisis resources in completion record: {}",
            if crisis_in_record { "YES" } else { "MISSING" }
        );
        println!();
    }

    println!("  Scenario 4 complete.");
    println!();

    Ok(())
}
