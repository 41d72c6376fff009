//! Quell Shim - The interception seam between transports and the engine
//!
//! Every outbound call a transport adapter wants to make passes through here:
//!
//! ```text
//! Received → Classifying → Forwarding ──────────────→ Delivered   (Allow)
//!                        → Rewriting → Forwarding ──→ Delivered   (Substitute)
//!                        → SynthesizingResponse ────→ Delivered   (Block)
//! ```
//!
//! Every path terminates in `Delivered`. A blocked call is never observable as
//! a failure: the host receives a fabricated success response, so host-side
//! retry and error logic stays dormant.

pub mod contract;
pub mod engine;
pub mod identifier;

pub use contract::{
    CallExecution, CallPlan, CallResponse, CallState, OutboundCall, PreparedCall,
    TransportAdapter,
};
pub use engine::{InterceptEngine, InterceptEngineBuilder};
pub use identifier::{looks_like_session_identifier, substitute_identifiers};

pub use quell_core::{
    Action, CacheStats, Decision, DecisionStats, EngineConfig, PatternEntry, QuellError, Result,
    Tier, TierToggles,
};
pub use quell_synth::{DescriptorSource, NullDescriptorSource, SessionIds};
