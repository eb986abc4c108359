//! # anima-risk
//!
//! Risk-phrase catalogue and crisis-language detection for the ANIMA
//! runtime.
//!
//! ## Overview
//!
//! [`detect_risk`] is a pure scan: given one utterance and the PHQ question
//! under discussion, it reports which phrases matched and at what severity.
//! `Critical` means immediate-risk (crisis) language; `High` means general
//! risk phrases tied to the question. Detection is advisory — escalation
//! decisions live with the agents.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use anima_risk::detect_risk;
//!
//! let report = detect_risk("I feel hopeless about all of it", 2);
//! assert!(report.risk_detected);
//! ```

pub mod catalogue;
pub mod detector;

pub use detector::{detect_risk, general_matches, immediate_matches};
