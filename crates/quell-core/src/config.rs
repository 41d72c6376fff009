//! Configuration surface for the interception engine.
//!
//! Read at startup and treated as immutable for the process lifetime by the
//! engine; nothing here is hot-reloaded.

use crate::{QuellError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Per-tier enable switches. A disabled tier is skipped during classification;
/// precedence among the remaining tiers is unchanged.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TierToggles {
    pub essential: bool,
    pub precise_block: bool,
    pub generic_block: bool,
    pub allowlist: bool,
}

impl Default for TierToggles {
    fn default() -> Self {
        Self {
            essential: true,
            precise_block: true,
            generic_block: true,
            allowlist: true,
        }
    }
}

/// Engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Master switch; a disabled engine forwards everything unchanged
    pub enabled: bool,
    /// Tier enable switches
    pub tiers: TierToggles,
    /// Whether fingerprint-endpoint payloads are rewritten
    pub substitution_enabled: bool,
    /// Whether identifier-shaped metadata values are replaced with session ids
    pub identifier_substitution: bool,
    /// Decision cache capacity (FIFO eviction beyond this bound)
    pub cache_capacity: usize,
    /// Number of synthesized hash fields in a substitution bundle
    pub synthetic_field_count: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            tiers: TierToggles::default(),
            substitution_enabled: true,
            identifier_substitution: true,
            cache_capacity: 1000,
            synthetic_field_count: 16,
        }
    }
}

impl EngineConfig {
    /// Block aggressively: all tiers on, substitution on.
    pub fn strict() -> Self {
        Self::default()
    }

    /// Only precise blocking; heuristics and substitution off.
    pub fn permissive() -> Self {
        Self {
            enabled: true,
            tiers: TierToggles {
                essential: true,
                precise_block: true,
                generic_block: false,
                allowlist: true,
            },
            substitution_enabled: false,
            identifier_substitution: false,
            cache_capacity: 1000,
            synthetic_field_count: 16,
        }
    }

    /// Load configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| QuellError::Config(format!("Failed to read config: {}", e)))?;
        let config: Self = serde_json::from_str(&content)?;
        if config.cache_capacity == 0 {
            return Err(QuellError::Config(
                "cache_capacity must be at least 1".to_string(),
            ));
        }
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .map_err(|e| QuellError::Config(format!("Failed to save config: {}", e)))?;
        Ok(())
    }
}
