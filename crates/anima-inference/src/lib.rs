//! # anima-inference
//!
//! The conversational PHQ inference engine ("Jekyll") for the ANIMA
//! runtime.
//!
//! ## Overview
//!
//! Instead of administering the instrument verbatim, Jekyll probes each
//! topic with natural questions from the [`catalogue`], scores the free-text
//! replies with an ordered heuristic, and feeds the inferred answers into
//! the same formal assessment machine the verbatim agents use. After both
//! PHQ-2 probes the engine decides between promoting to full PHQ-9 probing
//! and closing as a negative screen.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use anima_inference::{context::JekyllContext, engine};
//!
//! let mut ctx = JekyllContext::new(assessment_id, "user-1");
//! let inferred = engine::record_response(&mut ctx, 1, "I don't enjoy much lately")?;
//! ```
//!
//! ## Stages
//!
//! `initial → phq2-probing → decision → (phq9-probing) → complete`.
//! Risk detection is an event, not a stage: crisis language can interrupt
//! at any point and is logged into the context's `risk_factors`.

pub mod catalogue;
pub mod context;
pub mod engine;

pub use context::{ContextualSlots, JekyllContext, JekyllStage};
pub use engine::{decide_promotion, record_response, InferredResponse, PromotionDecision};
