//! Hash-chain primitives: hashing and chain integrity verification.
//!
//! The chain is built by concatenation of deterministic byte sequences fed
//! into SHA-256. Every field that contributes to an entry's hash is listed
//! explicitly so nothing is accidentally omitted.
//!
//! Hash input layout (bytes, in order):
//!   1. conversation as UTF-8 bytes (`user_id/session_id`)
//!   2. sequence as 8-byte little-endian
//!   3. prev_hash as UTF-8 bytes (64 ASCII hex chars)
//!   4. canonical JSON of message (serde_json with no pretty-printing)

use sha2::{Digest, Sha256};

use crate::transcript::{TranscriptEntry, TranscriptMessage};

/// Compute the SHA-256 hash for a single transcript entry.
///
/// The hash commits to every field that uniquely identifies an entry: its
/// position in the chain (`sequence`), the conversation it belongs to
/// (`conversation`), its link to the previous entry (`prev_hash`), and the
/// full message content (`message`).
///
/// Returns a lowercase 64-character hex string.
///
/// # Panics
///
/// Panics if `message` cannot be serialized to JSON — which cannot happen
/// for the well-formed `TranscriptMessage` type.
pub fn hash_entry(
    conversation: &str,
    sequence: u64,
    message: &TranscriptMessage,
    prev_hash: &str,
) -> String {
    // serde_json::to_vec produces canonical, deterministic JSON without
    // trailing whitespace or key reordering across calls on the same value.
    let message_json = serde_json::to_vec(message)
        .expect("TranscriptMessage must always be serializable to JSON");

    let mut hasher = Sha256::new();
    hasher.update(conversation.as_bytes());
    hasher.update(sequence.to_le_bytes());
    hasher.update(prev_hash.as_bytes());
    hasher.update(&message_json);

    hex::encode(hasher.finalize())
}

/// Verify the integrity of a transcript hash chain.
///
/// Returns `true` when the chain is valid according to both rules:
///
/// 1. **Prev-hash linkage** — each entry's `prev_hash` equals the
///    `this_hash` of the preceding entry (or `GENESIS_HASH` for entry 0).
/// 2. **Hash correctness** — each entry's `this_hash` matches the value
///    recomputed from its own fields.
///
/// Returns `false` the moment any mismatch is detected. An empty chain is
/// defined as valid.
pub fn verify_chain(entries: &[TranscriptEntry]) -> bool {
    let mut expected_prev = TranscriptEntry::GENESIS_HASH.to_string();

    for entry in entries {
        // Rule 1: the stored prev_hash must match what we expect.
        if entry.prev_hash != expected_prev {
            return false;
        }

        // Rule 2: recompute this_hash and compare to the stored value.
        let recomputed = hash_entry(
            &entry.conversation,
            entry.sequence,
            &entry.message,
            &entry.prev_hash,
        );
        if entry.this_hash != recomputed {
            return false;
        }

        // Advance the expected prev_hash to this entry's hash.
        expected_prev = entry.this_hash.clone();
    }

    true
}
