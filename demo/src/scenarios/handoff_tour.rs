//! Scenario 3: Roster Handoffs — Intake Feeds the Recording Workflow
//!
//! Control moves Tars → Matron → Tars → Vocalist → Tars. Biometric data
//! saved under Matron pre-fills the Vocalist's analysis submission, and a
//! rejected recording shows the per-conversation attempt budget before a
//! valid take resets it.

use serde_json::json;

use anima_agents::{build_registry, matron, tars, vocalist};
use anima_contracts::{error::AnimaResult, ids::ConversationKey, tool::ToolCall};
use anima_core::Orchestrator;

use super::{demo_stores, payload_of};

/// Run Scenario 3: the handoff tour.
pub async fn run_scenario() -> AnimaResult<()> {
    println!("=== Scenario 3: Roster Handoffs and Intake ===");
    println!();

    let stores = demo_stores();
    let registry = build_registry(&stores.collab)?;
    let mut agent_ids: Vec<String> = registry.agent_ids().map(|id| id.to_string()).collect();
    agent_ids.sort();
    println!("  Registered agents: {}", agent_ids.join(", "));

    let mut orchestrator = Orchestrator::new(registry);
    let key = ConversationKey::new("avery", "demo-tour");
    orchestrator.begin_conversation(key.clone())?;
    println!();

    // ── Intake under Matron ──────────────────────────────────────────────────

    let outcome = orchestrator
        .dispatch(
            &key,
            ToolCall::new(
                matron::AGENT_ID,
                json!({ "reason": "user agreed to share biographical details" }),
            ),
        )
        .await?;
    println!("  Handoff (declared, with reason): {}", payload_of(outcome)["message"]);

    let started = payload_of(
        orchestrator
            .dispatch(
                &key,
                ToolCall::new("start-biometric-collection", json!({ "user_id": "avery" })),
            )
            .await?,
    );
    println!("  Intake opened:       {}", started["message"]);

    let saved = payload_of(
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
                        "pronoun": "they/them",
                        "hobbies": "reading, climbing",
                    }),
                ),
            )
            .await?,
    );
    println!("  Saved fields:        {}", saved["data"]);

    orchestrator
        .dispatch(&key, ToolCall::new(tars::AGENT_ID, json!({})))
        .await?;
    let exists = payload_of(
        orchestrator
            .dispatch(
                &key,
                ToolCall::new("check-biometric-data", json!({ "user_id": "avery" })),
            )
            .await?,
    );
    println!("  Back on Tars; silent biometric check → exists = {}", exists["exists"]);
    println!();

    // ── Recording under Vocalist ─────────────────────────────────────────────

    orchestrator
        .dispatch(
            &key,
            ToolCall::new(
                vocalist::AGENT_ID,
                json!({ "reason": "user wants the voice assessment" }),
            ),
        )
        .await?;

    let recording = payload_of(
        orchestrator
            .dispatch(
                &key,
                ToolCall::new("start-vocalist-recording", json!({ "user_id": "avery" })),
            )
            .await?,
    );
    println!("  Recording session:   {}", recording["message"]);
    println!(
        "  Attempt budget:      {} attempt(s) remaining after this one",
        recording["attempts_remaining"]
    );

    let rejected = payload_of(
        orchestrator
            .dispatch(
                &key,
                ToolCall::new(
                    "complete-vocalist-recording",
                    json!({
                        "user_id": "avery",
                        "duration_seconds": 35.0,
                        "audio_format": "mp3",
                    }),
                ),
            )
            .await?,
    );
    println!("  Take 1 (mp3):        REJECTED — {}", rejected["error"]);

    let restarted = payload_of(
        orchestrator
            .dispatch(
                &key,
                ToolCall::new("start-vocalist-recording", json!({ "user_id": "avery" })),
            )
            .await?,
    );
    println!(
        "  Retake started:      {} attempt(s) remaining",
        restarted["attempts_remaining"]
    );

    let taken = payload_of(
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
            .await?,
    );
    println!("  Take 2 (wav, 34.6s): {}", taken["message"]);

    let submitted = payload_of(
        orchestrator
            .dispatch(
                &key,
                ToolCall::new(
                    "submit-vocalist-analysis",
                    json!({
                        "user_id": "avery",
                        "audio_file_url": "recordings/avery-demo-tour.wav",
                    }),
                ),
            )
            .await?,
    );
    println!(
        "  Analysis submission pre-filled from intake: {}",
        submitted["patient_info"]
    );

    orchestrator
        .dispatch(&key, ToolCall::new(tars::AGENT_ID, json!({})))
        .await?;
    println!(
        "  Control returned to: {}",
        orchestrator
            .active_agent(&key)
            .map(|id| id.as_str())
            .unwrap_or("<none>")
    );
    println!();
    println!("  Scenario 3 complete.");
    println!();

    Ok(())
}
