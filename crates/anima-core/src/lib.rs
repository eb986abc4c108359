//! # anima-core
//!
//! The conversation-scoped agent runtime for ANIMA.
//!
//! This crate provides:
//! - The four core traits (`ToolHandler`, `SessionStore`, `TranscriptStore`,
//!   `ProfileStore`)
//! - The `AgentRegistry` builder with schema compilation and switch-tool
//!   injection
//! - The `Orchestrator` that routes tool calls and applies handoffs
//! - `RuntimeConfig`, the TOML-loadable tunables
//!
//! ## Usage
//!
//! ```rust,ignore
//! use anima_core::{Orchestrator, registry::AgentRegistryBuilder, traits::ToolHandler};
//! ```

pub mod config;
pub mod conversation;
pub mod orchestrator;
pub mod registry;
pub mod traits;

pub use config::RuntimeConfig;
pub use conversation::ConversationState;
pub use orchestrator::Orchestrator;
pub use registry::{Agent, AgentRegistry, AgentRegistryBuilder, Tool};
