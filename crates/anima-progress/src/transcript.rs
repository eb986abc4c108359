//! Transcript entry and export types.
//!
//! `TranscriptEntry` is a single entry in the hash chain for one
//! conversation — it wraps a `TranscriptMessage` with sequence numbering
//! and the SHA-256 hashes that make tampering detectable. `Transcript` is
//! the sealed record exported when a conversation is reviewed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who produced a transcript message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => f.write_str("user"),
            Role::Assistant => f.write_str("assistant"),
        }
    }
}

/// The content of one transcript entry.
///
/// `tag` names the kind of event ("phq-answer", "jekyll-risk-alert", …)
/// and `metadata` carries its structured detail — always including the
/// `assessment_id` for entries produced during a screening.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptMessage {
    pub role: Role,
    pub text: String,
    pub tag: String,
    pub metadata: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

/// A single entry in the SHA-256 hash chain for one conversation.
///
/// Each entry commits to the previous entry via `prev_hash`, forming an
/// append-only chain. Modifying any field — including those of the
/// embedded `message` — invalidates `this_hash` and every subsequent
/// `prev_hash`, which `verify_chain` detects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptEntry {
    /// Monotonically increasing position in the chain, starting at 0.
    pub sequence: u64,

    /// The conversation this entry belongs to, as `user_id/session_id`.
    pub conversation: String,

    /// The immutable message content.
    pub message: TranscriptMessage,

    /// SHA-256 hash (hex) of the previous entry, or `GENESIS_HASH` for the
    /// first entry.
    pub prev_hash: String,

    /// SHA-256 hash (hex) of this entry's canonical content.
    ///
    /// Computed by `hash_entry()` over (conversation, sequence, prev_hash,
    /// canonical JSON of message).
    pub this_hash: String,
}

impl TranscriptEntry {
    /// The sentinel `prev_hash` used for the first entry in every chain.
    ///
    /// 64 hex zeros — a value that can never be the SHA-256 of real data,
    /// making genesis detection unambiguous.
    pub const GENESIS_HASH: &'static str =
        "0000000000000000000000000000000000000000000000000000000000000000";
}

/// A sealed transcript export for a single conversation.
///
/// Produced by `InMemoryTranscriptStore::export()`. The `terminal_hash` is
/// the `this_hash` of the last entry and can be used as a compact
/// commitment to the entire transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    /// The conversation whose messages are recorded here, as
    /// `user_id/session_id`.
    pub conversation: String,

    /// All entries in chain order (sequence 0 first).
    pub entries: Vec<TranscriptEntry>,

    /// Wall-clock time (UTC) the transcript was exported.
    pub exported_at: DateTime<Utc>,

    /// The `this_hash` of the last entry. Empty string if the transcript
    /// is empty.
    pub terminal_hash: String,
}
