//! Cagefeed Core - MMA event scraping and reconciliation.
//!
//! This crate provides:
//! - A header-rotating fetch layer with human-like pacing and block detection
//! - One extractor per public source (UFCStats, UFC.com, ESPN, Tapology,
//!   Wikipedia, Sherdog), each a cascade of selector and regex strategies
//! - Fuzzy fighter name matching across sources
//! - Staged event reconciliation into one canonical record per fight night
//! - A strike ledger that infers event cancellation from repeated absence
//! - A deterministic basic-profile synthesizer for fighters no source covers
//!
//! The orchestrator service (`services/orchestrator_rust`) drives these
//! components end-to-end and is the only writer to the persistence sink.

mod error;
mod types;

pub mod db;
pub mod extract;
pub mod fetch;
pub mod ledger;
pub mod llm;
pub mod matching;
pub mod reconcile;
pub mod synth;

pub use error::*;
pub use types::*;
