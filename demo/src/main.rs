//! ANIMA Agent Roster — Demo CLI
//!
//! Runs one or all of the four screening demo scenarios. Each scenario uses
//! real ANIMA components (agent registry, orchestrator, in-memory stores)
//! driven through the same tool-call interface a conversation layer would
//! use.
//!
//! Usage:
//!   cargo run -p demo -- run-all
//!   cargo run -p demo -- formal-screening
//!   cargo run -p demo -- conversational
//!   cargo run -p demo -- handoff-tour
//!   cargo run -p demo -- risk-alert

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use anima_contracts::error::AnimaResult;

mod scenarios;

use scenarios::{conversational, formal_screening, handoff_tour, risk_alert};

// ── CLI definition ────────────────────────────────────────────────────────────

/// ANIMA — conversational depression-screening orchestrator demo.
///
/// Each subcommand drives one or all of the four screening scenarios
/// through the full registry, orchestrator, and store stack.
#[derive(Parser)]
#[command(
    name = "demo",
    about = "ANIMA agent roster demo",
    long_about = "Runs ANIMA screening scenarios showing agent handoffs, verbatim and\n\
                  conversational PHQ assessments, risk escalation, and transcript\n\
                  chain integrity."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run all four screening scenarios in sequence.
    RunAll,
    /// Scenario 1: Verbatim PHQ-2 screening (invalid answer, completion, summary).
    FormalScreening,
    /// Scenario 2: Conversational inference with PHQ-9 promotion (Jekyll).
    Conversational,
    /// Scenario 3: Roster handoffs — intake feeds the recording workflow.
    HandoffTour,
    /// Scenario 4: Risk detection and the professional alert channel.
    RiskAlert,
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    // Initialize structured logging. Set RUST_LOG=debug for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    print_banner();

    let result = match cli.command {
        Command::RunAll => run_all().await,
        Command::FormalScreening => formal_screening::run_scenario().await,
        Command::Conversational => conversational::run_scenario().await,
        Command::HandoffTour => handoff_tour::run_scenario().await,
        Command::RiskAlert => risk_alert::run_scenario().await,
    };

    match result {
        Ok(()) => {
            println!("All selected scenarios completed successfully.");
        }
        Err(e) => {
            eprintln!("Demo error: {}", e);
            std::process::exit(1);
        }
    }
}

async fn run_all() -> AnimaResult<()> {
    formal_screening::run_scenario().await?;
    conversational::run_scenario().await?;
    handoff_tour::run_scenario().await?;
    risk_alert::run_scenario().await?;
    Ok(())
}

// ── Banner ────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("ANIMA — Conversational Screening Orchestrator");
    println!("Agent Roster Demo");
    println!("=============================================");
    println!();
    println!("Routing pipeline per tool call:");
    println!("  [1] Resolve the conversation and its active agent");
    println!("  [2] Resolve the tool on the active agent only (switch tools included)");
    println!("  [3] Validate args against the tool's compiled JSON Schema");
    println!("  [4] Run the handler against the shared session/transcript/profile stores");
    println!("  [5] Apply any handoff atomically and emit the next agent's activation");
    println!();
}
