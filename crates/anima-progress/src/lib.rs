//! # anima-progress
//!
//! Session progress, profile, and SHA-256 hash-chained transcript stores
//! for the ANIMA runtime.
//!
//! ## Overview
//!
//! Every message a conversation records is wrapped in a `TranscriptEntry`
//! that links to the previous entry via its SHA-256 hash. Tampering with
//! any entry — even a single byte — breaks the chain and is detected by
//! `verify_chain`. Alongside the transcript, `InMemorySessionStore` keeps
//! the running `SessionProgress` record per conversation and
//! `InMemoryProfileStore` holds field-level user profiles.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use anima_progress::{InMemoryTranscriptStore, TranscriptEntry};
//! use anima_core::traits::TranscriptStore;
//!
//! let store = InMemoryTranscriptStore::new();
//! store.add_user_message(&key, "hello", "greeting", metadata).await?;
//!
//! assert!(store.verify_integrity(&key));
//! let transcript = store.export(&key);
//! ```

pub mod chain;
pub mod memory;
pub mod transcript;

pub use chain::{hash_entry, verify_chain};
pub use memory::{InMemoryProfileStore, InMemorySessionStore, InMemoryTranscriptStore};
pub use transcript::{Role, Transcript, TranscriptEntry, TranscriptMessage};

// ── Tests ─────────────────────────────────────────────────────────────────────
