//! # anima-contracts
//!
//! Shared types, schemas, and contracts for the ANIMA runtime.
//!
//! All crates in the workspace import from here. No business logic lives in
//! this crate — only data definitions and error types.

pub mod error;
pub mod ids;
pub mod progress;
pub mod risk;
pub mod tool;
