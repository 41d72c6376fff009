//! Quell Core - Request classification and decision caching
//!
//! Classifies outbound requests against four ordered pattern tiers and memoizes
//! the result so the decision sits cheaply on every call the host makes.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                   Transport Adapter                      │
//! └──────────────────────────────────────────────────────────┘
//!                             │
//!                             ▼
//! ┌──────────────────────────────────────────────────────────┐
//! │                     Decision Cache                       │
//! │        digest(address, payload prefix) → Decision        │
//! └──────────────────────────────────────────────────────────┘
//!                             │ miss
//!                             ▼
//! ┌──────────────────────────────────────────────────────────┐
//! │                       Classifier                         │
//! │  Essential → PreciseBlock → GenericBlock → Allowlist →   │
//! │                   default Allow (fail open)              │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! The classifier never fails: malformed or empty input resolves to `Allow` so
//! that the host application cannot be broken by traffic we did not anticipate.

pub mod cache;
pub mod classify;
pub mod config;
pub mod decision;
pub mod patterns;

pub use cache::{stable_digest, CacheStats, DecisionCache};
pub use classify::Classifier;
pub use config::{EngineConfig, TierToggles};
pub use decision::{Action, Decision, DecisionStats, SubstitutionStrategy};
pub use patterns::{PatternEntry, PatternTables, Tier};

use thiserror::Error;

/// Errors from engine plumbing. Classification and caching themselves are
/// infallible; these surface only from configuration and adapter boundaries.
#[derive(Debug, Error)]
pub enum QuellError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for quell operations
pub type Result<T> = std::result::Result<T, QuellError>;
