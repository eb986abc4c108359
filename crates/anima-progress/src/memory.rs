//! In-memory implementations of the three store traits.
//!
//! These are the reference implementations of `SessionStore`,
//! `TranscriptStore`, and `ProfileStore` from `anima-core`. Each keeps its
//! records in a `Mutex`-protected map, making a store safe to share across
//! tool handlers behind an `Arc`.
//!
//! The transcript store chains every entry with SHA-256: use `export()`
//! after a conversation completes to obtain a sealed `Transcript`, and
//! `verify_integrity()` at any time to confirm the chain has not been
//! tampered with in memory.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, info};

use anima_contracts::{
    error::{AnimaError, AnimaResult},
    ids::{AssessmentId, ConversationKey, PhqType},
    progress::{AnsweredQuestion, SessionProgress},
};
use anima_core::traits::{ProfileStore, SessionStore, TranscriptStore};

use crate::{
    chain::{hash_entry, verify_chain},
    transcript::{Role, Transcript, TranscriptEntry, TranscriptMessage},
};

// ── Session store ─────────────────────────────────────────────────────────────

/// The mutable interior of an `InMemorySessionStore`.
struct SessionState {
    /// Progress records for conversations with an open session.
    live: HashMap<ConversationKey, SessionProgress>,
    /// Finalized records, in completion order.
    completed: Vec<SessionProgress>,
}

/// An in-memory session store.
///
/// One live `SessionProgress` per conversation; completed assessments move
/// to an archive that `history()` reads. Share behind an `Arc` — every
/// method takes `&self` and locks internally.
pub struct InMemorySessionStore {
    state: Mutex<SessionState>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SessionState {
                live: HashMap::new(),
                completed: Vec::new(),
            }),
        }
    }

    /// The live progress record for `key`, if a session is open.
    pub fn progress(&self, key: &ConversationKey) -> Option<SessionProgress> {
        let state = self.state.lock().expect("session store lock poisoned");
        state.live.get(key).cloned()
    }

    fn lock_state(&self) -> AnimaResult<MutexGuard<'_, SessionState>> {
        self.state.lock().map_err(|e| AnimaError::Collaborator {
            reason: format!("session store lock poisoned: {}", e),
        })
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

/// The live record for `key`, or a collaborator error naming the key.
fn live_entry<'a>(
    state: &'a mut SessionState,
    key: &ConversationKey,
) -> AnimaResult<&'a mut SessionProgress> {
    state.live.get_mut(key).ok_or_else(|| AnimaError::Collaborator {
        reason: format!("no session open for '{}'", key),
    })
}

/// The bookkeeping entry for one question, opened on first touch.
fn question_entry(progress: &mut SessionProgress, number: u8) -> &mut AnsweredQuestion {
    let idx = match progress
        .answered_questions
        .iter()
        .position(|q| q.question_number == number)
    {
        Some(idx) => idx,
        None => {
            progress.answered_questions.push(AnsweredQuestion {
                question_number: number,
                question_text: String::new(),
                answer: None,
                attempts: 0,
                was_skipped: false,
                answered_at: None,
            });
            progress.answered_questions.len() - 1
        }
    };
    &mut progress.answered_questions[idx]
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    /// Open a fresh progress record, replacing any stale one for the key.
    async fn initialize_session(
        &self,
        key: &ConversationKey,
        assessment_id: AssessmentId,
        phq_type: PhqType,
    ) -> AnimaResult<()> {
        let mut state = self.lock_state()?;
        debug!(conversation = %key, assessment_id = %assessment_id, %phq_type, "session initialized");
        state.live.insert(
            key.clone(),
            SessionProgress::begin(&key.user_id, &key.session_id, assessment_id, phq_type),
        );
        Ok(())
    }

    async fn set_question_text(
        &self,
        key: &ConversationKey,
        question_number: u8,
        text: &str,
    ) -> AnimaResult<()> {
        let mut state = self.lock_state()?;
        let progress = live_entry(&mut state, key)?;
        question_entry(progress, question_number).question_text = text.to_string();
        Ok(())
    }

    async fn record_answer(
        &self,
        key: &ConversationKey,
        question_number: u8,
        score: u8,
    ) -> AnimaResult<()> {
        let mut state = self.lock_state()?;
        let progress = live_entry(&mut state, key)?;
        let entry = question_entry(progress, question_number);
        entry.answer = Some(score);
        entry.answered_at = Some(Utc::now());
        Ok(())
    }

    async fn record_invalid_attempt(
        &self,
        key: &ConversationKey,
        question_number: u8,
    ) -> AnimaResult<()> {
        let mut state = self.lock_state()?;
        let progress = live_entry(&mut state, key)?;
        question_entry(progress, question_number).attempts += 1;
        Ok(())
    }

    async fn mark_skipped(&self, key: &ConversationKey, question_number: u8) -> AnimaResult<()> {
        let mut state = self.lock_state()?;
        let progress = live_entry(&mut state, key)?;
        let entry = question_entry(progress, question_number);
        entry.was_skipped = true;
        entry.answered_at = Some(Utc::now());
        Ok(())
    }

    async fn update_assessment_type(
        &self,
        key: &ConversationKey,
        phq_type: PhqType,
    ) -> AnimaResult<()> {
        let mut state = self.lock_state()?;
        let progress = live_entry(&mut state, key)?;
        debug!(conversation = %key, %phq_type, "session assessment type updated");
        progress.phq_type = phq_type;
        Ok(())
    }

    /// Finalize the live record and append a copy to the archive.
    async fn complete_assessment(
        &self,
        key: &ConversationKey,
        score: u8,
        severity: &str,
        interpretation: &str,
        recommendations: &[String],
    ) -> AnimaResult<()> {
        let mut state = self.lock_state()?;
        let progress = live_entry(&mut state, key)?;
        progress.total_score = Some(score);
        progress.severity = Some(severity.to_string());
        progress.interpretation = Some(interpretation.to_string());
        progress.recommendations = recommendations.to_vec();
        progress.completed_at = Some(Utc::now());
        progress.is_complete = true;

        info!(
            conversation = %key,
            assessment_id = %progress.assessment_id,
            score,
            severity,
            "assessment completed"
        );

        let finalized = progress.clone();
        state.completed.push(finalized);
        Ok(())
    }

    /// Drop the live record. Completed assessments stay in the archive;
    /// an abandoned (incomplete) session is discarded.
    async fn end_session(&self, key: &ConversationKey) -> AnimaResult<()> {
        let mut state = self.lock_state()?;
        if state.live.remove(key).is_some() {
            debug!(conversation = %key, "session ended");
        }
        Ok(())
    }

    async fn history(&self, user_id: &str, limit: usize) -> AnimaResult<Vec<SessionProgress>> {
        let state = self.lock_state()?;
        Ok(state
            .completed
            .iter()
            .rev()
            .filter(|p| p.user_id == user_id)
            .take(limit)
            .cloned()
            .collect())
    }
}

// ── Transcript store ──────────────────────────────────────────────────────────

/// The hash chain for one conversation.
pub(crate) struct ChainState {
    /// All entries written so far, in append order.
    pub(crate) entries: Vec<TranscriptEntry>,

    /// The next sequence number to assign (starts at 0).
    pub(crate) sequence: u64,

    /// The `this_hash` of the last written entry, or `GENESIS_HASH` before
    /// any entry has been written.
    pub(crate) last_hash: String,
}

impl ChainState {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
            sequence: 0,
            last_hash: TranscriptEntry::GENESIS_HASH.to_string(),
        }
    }
}

/// An in-memory, append-only transcript store backed by per-conversation
/// SHA-256 hash chains.
///
/// # Thread safety
///
/// Every method acquires a `Mutex` internally. Share the store behind an
/// `Arc` without additional synchronization.
pub struct InMemoryTranscriptStore {
    pub(crate) chains: Mutex<HashMap<ConversationKey, ChainState>>,
}

impl InMemoryTranscriptStore {
    pub fn new() -> Self {
        Self {
            chains: Mutex::new(HashMap::new()),
        }
    }

    /// Export a sealed `Transcript` for one conversation, or `None` if the
    /// conversation has no entries.
    ///
    /// The `terminal_hash` is the `this_hash` of the last entry.
    pub fn export(&self, key: &ConversationKey) -> Option<Transcript> {
        let chains = self.chains.lock().expect("transcript store lock poisoned");
        let chain = chains.get(key)?;
        let terminal_hash = chain
            .entries
            .last()
            .map(|e| e.this_hash.clone())
            .unwrap_or_default();

        Some(Transcript {
            conversation: key.to_string(),
            entries: chain.entries.clone(),
            exported_at: Utc::now(),
            terminal_hash,
        })
    }

    /// Verify that one conversation's chain has not been tampered with.
    ///
    /// A conversation with no entries is trivially valid. Delegates to
    /// `verify_chain`, which checks both prev-hash linkage and hash
    /// correctness for every entry.
    pub fn verify_integrity(&self, key: &ConversationKey) -> bool {
        let chains = self.chains.lock().expect("transcript store lock poisoned");
        match chains.get(key) {
            Some(chain) => verify_chain(&chain.entries),
            None => true,
        }
    }

    /// Append one message to the conversation's chain.
    ///
    /// Computes `this_hash` from (conversation, sequence, prev_hash,
    /// message), wraps the message in a `TranscriptEntry`, appends it, then
    /// advances the sequence counter and `last_hash`.
    fn append(&self, key: &ConversationKey, message: TranscriptMessage) -> AnimaResult<()> {
        let mut chains = self.chains.lock().map_err(|e| AnimaError::Collaborator {
            reason: format!("transcript store lock poisoned: {}", e),
        })?;
        let chain = chains.entry(key.clone()).or_insert_with(ChainState::new);

        let conversation = key.to_string();
        let prev_hash = chain.last_hash.clone();
        let sequence = chain.sequence;

        let this_hash = hash_entry(&conversation, sequence, &message, &prev_hash);

        chain.entries.push(TranscriptEntry {
            sequence,
            conversation,
            message,
            prev_hash,
            this_hash: this_hash.clone(),
        });
        chain.sequence += 1;
        chain.last_hash = this_hash;

        Ok(())
    }
}

impl Default for InMemoryTranscriptStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TranscriptStore for InMemoryTranscriptStore {
    async fn add_user_message(
        &self,
        key: &ConversationKey,
        text: &str,
        tag: &str,
        metadata: serde_json::Value,
    ) -> AnimaResult<()> {
        self.append(
            key,
            TranscriptMessage {
                role: Role::User,
                text: text.to_string(),
                tag: tag.to_string(),
                metadata,
                timestamp: Utc::now(),
            },
        )
    }

    async fn add_assistant_message(
        &self,
        key: &ConversationKey,
        text: &str,
        tag: &str,
        metadata: serde_json::Value,
    ) -> AnimaResult<()> {
        self.append(
            key,
            TranscriptMessage {
                role: Role::Assistant,
                text: text.to_string(),
                tag: tag.to_string(),
                metadata,
                timestamp: Utc::now(),
            },
        )
    }
}

// ── Profile store ─────────────────────────────────────────────────────────────

/// An in-memory, field-level profile store keyed by user id.
///
/// Profiles are plain JSON objects; scalar and array fields are written
/// through the two `ProfileStore` mutators and never removed.
pub struct InMemoryProfileStore {
    profiles: Mutex<HashMap<String, serde_json::Value>>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self {
            profiles: Mutex::new(HashMap::new()),
        }
    }

    fn lock_profiles(
        &self,
    ) -> AnimaResult<MutexGuard<'_, HashMap<String, serde_json::Value>>> {
        self.profiles.lock().map_err(|e| AnimaError::Collaborator {
            reason: format!("profile store lock poisoned: {}", e),
        })
    }
}

impl Default for InMemoryProfileStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn update_field(
        &self,
        user_id: &str,
        field: &str,
        value: serde_json::Value,
    ) -> AnimaResult<()> {
        let mut profiles = self.lock_profiles()?;
        let profile = profiles
            .entry(user_id.to_string())
            .or_insert_with(|| serde_json::json!({}));
        match profile.as_object_mut() {
            Some(object) => {
                object.insert(field.to_string(), value);
                Ok(())
            }
            None => Err(AnimaError::Collaborator {
                reason: format!("profile for '{}' is not a JSON object", user_id),
            }),
        }
    }

    async fn add_to_array_field(
        &self,
        user_id: &str,
        field: &str,
        values: Vec<serde_json::Value>,
    ) -> AnimaResult<()> {
        let mut profiles = self.lock_profiles()?;
        let profile = profiles
            .entry(user_id.to_string())
            .or_insert_with(|| serde_json::json!({}));
        let object = profile.as_object_mut().ok_or_else(|| AnimaError::Collaborator {
            reason: format!("profile for '{}' is not a JSON object", user_id),
        })?;
        let slot = object
            .entry(field.to_string())
            .or_insert_with(|| serde_json::json!([]));
        match slot.as_array_mut() {
            Some(array) => {
                array.extend(values);
                Ok(())
            }
            None => Err(AnimaError::Collaborator {
                reason: format!("profile field '{}' for '{}' is not an array", field, user_id),
            }),
        }
    }

    async fn get_profile(&self, user_id: &str) -> AnimaResult<Option<serde_json::Value>> {
        let profiles = self.lock_profiles()?;
        Ok(profiles.get(user_id).cloned())
    }

    async fn has_profile(&self, user_id: &str) -> AnimaResult<bool> {
        let profiles = self.lock_profiles()?;
        Ok(profiles.contains_key(user_id))
    }
}
