//! Expense Ledger
//!
//! Turns free-text descriptions of money movements into ledger entries:
//! - Builds a deterministic classification request for each utterance
//! - Delegates the judgement to an external LLM (Gemini)
//! - Re-validates every response against a closed category taxonomy
//! - Appends accepted records to an in-memory, append-only ledger
//! - Aggregates expenses per category on demand
//!
//! PIPELINE:
//! UTTERANCE → REQUEST → CLASSIFY → NORMALIZE → APPEND → AGGREGATE

pub mod aggregation;
pub mod api;
pub mod classifier;
pub mod config;
pub mod display;
pub mod error;
pub mod extraction;
pub mod gemini;
pub mod ledger;
pub mod models;
pub mod normalizer;
pub mod state;
pub mod taxonomy;

pub use error::{LedgerError, Rejection, Result};

// Re-export common types
pub use models::*;
pub use classifier::{Classifier, ScriptedClassifier, ScriptedReply};
pub use taxonomy::{Taxonomy, TransactionType};
