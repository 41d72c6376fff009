//! Descriptor Source - Boundary to the platform descriptor collaborator
//!
//! The engine does not generate large fixed-format platform inventories itself;
//! it asks a collaborator for a bundle of plausible platform-shaped field
//! values and treats it as a pure value source. Any failure at this boundary
//! degrades to an empty bundle at the caller, never to a host-visible error.

use std::collections::HashMap;
use thiserror::Error;

/// Failure reported by a descriptor collaborator.
#[derive(Debug, Error)]
#[error("Descriptor source failed: {0}")]
pub struct DescriptorError(pub String);

/// A pure value source mapping field index to a plausible string value
/// (hardware ids, OS version strings, and the like).
pub trait DescriptorSource: Send + Sync {
    /// Produce the descriptor field bundle.
    ///
    /// Implementations may fail; callers must treat failure as an empty
    /// bundle.
    fn descriptor_fields(&self) -> Result<HashMap<u32, String>, DescriptorError>;
}

/// Default collaborator: no descriptor fields at all.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullDescriptorSource;

impl DescriptorSource for NullDescriptorSource {
    fn descriptor_fields(&self) -> Result<HashMap<u32, String>, DescriptorError> {
        Ok(HashMap::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_source_is_empty() {
        let fields = NullDescriptorSource.descriptor_fields().unwrap();
        assert!(fields.is_empty());
    }
}
