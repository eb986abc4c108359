//! ANIMA demo scenarios.
//!
//! Each scenario is a self-contained module that assembles the real agent
//! registry over fresh in-memory stores and drives it through the
//! orchestrator's tool-call interface, narrating each step.

use serde_json::Value;
use std::sync::Arc;

use anima_agents::Collaborators;
use anima_contracts::tool::{DispatchOutcome, ToolResult};
use anima_core::RuntimeConfig;
use anima_progress::{InMemoryProfileStore, InMemorySessionStore, InMemoryTranscriptStore};

pub mod conversational;
pub mod formal_screening;
pub mod handoff_tour;
pub mod risk_alert;

/// Fresh in-memory stores, with the transcript handle kept for post-run
/// chain inspection.
pub(crate) struct DemoStores {
    pub collab: Collaborators,
    pub transcripts: Arc<InMemoryTranscriptStore>,
}

pub(crate) fn demo_stores() -> DemoStores {
    let transcripts = Arc::new(InMemoryTranscriptStore::new());
    let collab = Collaborators {
        sessions: Arc::new(InMemorySessionStore::new()),
        transcripts: transcripts.clone(),
        profiles: Arc::new(InMemoryProfileStore::new()),
        config: Arc::new(RuntimeConfig::default()),
    };
    DemoStores { collab, transcripts }
}

/// The JSON body of either result kind. Handoff payloads carry the
/// transition message; data payloads carry the tool's reply.
pub(crate) fn payload_of(outcome: DispatchOutcome) -> Value {
    match outcome.result {
        ToolResult::Data { payload } => payload,
        ToolResult::Handoff { payload, .. } => payload,
    }
}
