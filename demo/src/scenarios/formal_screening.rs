//! Scenario 1: Verbatim PHQ-2 Screening
//!
//! The coordinator hands the conversation to the PHQ-2 specialist through
//! an injected switch tool, the specialist administers the instrument
//! verbatim (including one invalid reply and the attempt budget), and the
//! archived outcome is visible afterwards through the coordinator's
//! summary tool. The transcript hash chain is verified at the end.

use serde_json::json;

use anima_agents::{build_registry, formal, tars};
use anima_contracts::{error::AnimaResult, ids::ConversationKey, tool::ToolCall};
use anima_core::Orchestrator;

use super::{demo_stores, payload_of};

/// Run Scenario 1: verbatim PHQ-2 screening, end to end.
pub async fn run_scenario() -> AnimaResult<()> {
    println!("=== Scenario 1: Verbatim PHQ-2 Screening ===");
    println!();

    let stores = demo_stores();
    let mut orchestrator = Orchestrator::new(build_registry(&stores.collab)?);
    let key = ConversationKey::new("avery", "demo-formal");

    let activation = orchestrator.begin_conversation(key.clone())?;
    println!("  Conversation opened on root agent: {}", activation.agent_id);
    println!(
        "  Tools advertised by the coordinator: {}",
        activation.tools.len()
    );

    // ── Hand off to the PHQ-2 specialist ─────────────────────────────────────
    //
    // Tars declares no tool named Agent_PHQ2; the registry injected one.
    let outcome = orchestrator
        .dispatch(&key, ToolCall::new(formal::PHQ2_AGENT_ID, json!({})))
        .await?;
    let transition = payload_of(outcome);
    println!("  Handoff via injected switch:       {}", transition["message"]);

    let started = payload_of(
        orchestrator
            .dispatch(
                &key,
                ToolCall::new("start-phq2-assessment", json!({ "user_id": "avery" })),
            )
            .await?,
    );
    println!();
    println!("  Assessment started ({} questions)", started["total_questions"]);
    println!("  Q{}: {}", started["current_question_number"], started["question_text"]);

    // ── One invalid reply, then scored answers ───────────────────────────────

    let invalid = payload_of(
        orchestrator
            .dispatch(
                &key,
                ToolCall::new(
                    "record-phq2-answer",
                    json!({ "user_id": "avery", "answer": "kind of, I guess" }),
                ),
            )
            .await?,
    );
    println!();
    println!("  User replies: \"kind of, I guess\"");
    println!(
        "  Validation:          REJECTED ({} attempt(s) left, question unchanged)",
        invalid["attempts_left"]
    );

    let first = payload_of(
        orchestrator
            .dispatch(
                &key,
                ToolCall::new(
                    "record-phq2-answer",
                    json!({ "user_id": "avery", "answer": "3" }),
                ),
            )
            .await?,
    );
    println!("  User replies: \"3\"");
    println!(
        "  Recorded:            question {} = {}",
        first["answered_question_number"], first["answer_value"]
    );
    println!("  Q2: {}", first["next_question"]["question_text"]);

    let done = payload_of(
        orchestrator
            .dispatch(
                &key,
                ToolCall::new(
                    "record-phq2-answer",
                    json!({ "user_id": "avery", "answer": "not at all" }),
                ),
            )
            .await?,
    );
    println!("  User replies: \"not at all\"");
    println!();
    println!("  Assessment complete:");
    println!("    Score:             {}/6", done["score"]);
    println!("    Severity:          {}", done["severity"]);
    println!("    Suggest PHQ-9:     {}", done["suggest_phq9"]);

    // ── Return to the coordinator and read the archive back ─────────────────

    orchestrator
        .dispatch(&key, ToolCall::new(tars::AGENT_ID, json!({})))
        .await?;
    println!();
    println!(
        "  Control returned to: {}",
        orchestrator
            .active_agent(&key)
            .map(|id| id.as_str())
            .unwrap_or("<none>")
    );

    let summary = payload_of(
        orchestrator
            .dispatch(
                &key,
                ToolCall::new("get-phq-assessment-summary", json!({ "user_id": "avery" })),
            )
            .await?,
    );
    println!(
        "  Archived assessments for avery:    {}",
        summary["summary"]["total_assessments"]
    );
    println!(
        "  Latest score on file:              {}",
        summary["summary"]["latest_assessment"]["total_score"]
    );

    let entries = stores
        .transcripts
        .export(&key)
        .map(|t| t.entries.len())
        .unwrap_or(0);
    println!(
        "  Transcript chain integrity:        {} ({} entry(ies))",
        if stores.transcripts.verify_integrity(&key) {
            "VERIFIED"
        } else {
            "FAILED"
        },
        entries
    );
    println!();
    println!("  Scenario 1 complete.");
    println!();

    Ok(())
}
