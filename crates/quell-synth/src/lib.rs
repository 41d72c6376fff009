//! Quell Synth - Session context and deterministic synthetic data
//!
//! Produces the fake values that stand in for real telemetry payloads: session
//! identifiers, 64-hex pseudo-random field hashes, and structured values shaped
//! like hardware identifiers. Every value is memoized per session so that a
//! bundle of synthetic fields reported twice matches field-for-field, while a
//! regenerated session changes everything going forward.

pub mod descriptor;
pub mod session;
pub mod synth;

pub use descriptor::{DescriptorError, DescriptorSource, NullDescriptorSource};
pub use session::{SessionContext, SessionIds};
pub use synth::{Synthesizer, VERSION_TAG_INDEX};
