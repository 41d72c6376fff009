//! Classifier - Tiered precedence evaluation
//!
//! Applies the pattern tables in a fixed order with first-match-wins semantics.
//! Essential overrides every block tier: core functionality is never sacrificed
//! to catch one more telemetry call. Unknown traffic falls through to Allow.

use crate::config::TierToggles;
use crate::decision::Decision;
use crate::patterns::{PatternTables, Tier};
use tracing::debug;

/// Pure, side-effect-free classifier over a fixed set of pattern tables.
#[derive(Debug, Clone)]
pub struct Classifier {
    tables: PatternTables,
    toggles: TierToggles,
}

impl Classifier {
    pub fn new(tables: PatternTables, toggles: TierToggles) -> Self {
        Self { tables, toggles }
    }

    pub fn tables(&self) -> &PatternTables {
        &self.tables
    }

    /// Classify a request. Same inputs always yield the same `Decision`.
    ///
    /// Precedence, first match wins:
    /// 1. Essential (address) → Allow
    /// 2. PreciseBlock (address) → Block
    /// 3. GenericBlock (address or payload) → Block
    /// 4. Allowlist (address or payload) → Allow
    /// 5. Default → Allow (fail open)
    pub fn classify(&self, address: &str, payload: Option<&[u8]>) -> Decision {
        if address.is_empty() {
            // Cannot classify; never break unanticipated host traffic.
            return Decision::allow("no pattern matched", None);
        }

        let address_lower = address.to_lowercase();
        // Non-UTF8 payloads scan lossily; absent payloads scan as empty.
        let payload_lower = payload
            .map(|p| String::from_utf8_lossy(p).to_lowercase())
            .unwrap_or_default();

        if self.toggles.essential {
            if let Some(pattern) = self.tables.first_match(Tier::Essential, &address_lower) {
                debug!(address, pattern, "essential endpoint, allowing");
                return Decision::allow("essential endpoint protection", Some(Tier::Essential));
            }
        }

        if self.toggles.precise_block {
            if let Some(pattern) = self.tables.first_match(Tier::PreciseBlock, &address_lower) {
                debug!(address, pattern, "precise block match");
                return Decision::block("precise pattern match", Tier::PreciseBlock);
            }
        }

        if self.toggles.generic_block {
            let hit = self
                .tables
                .first_match(Tier::GenericBlock, &address_lower)
                .or_else(|| self.tables.first_match(Tier::GenericBlock, &payload_lower));
            if let Some(pattern) = hit {
                debug!(address, pattern, "generic keyword match");
                return Decision::block("keyword heuristic match", Tier::GenericBlock);
            }
        }

        if self.toggles.allowlist {
            let hit = self
                .tables
                .first_match(Tier::Allowlist, &address_lower)
                .or_else(|| self.tables.first_match(Tier::Allowlist, &payload_lower));
            if let Some(pattern) = hit {
                debug!(address, pattern, "allowlist match");
                return Decision::allow("functional allowlist", Some(Tier::Allowlist));
            }
        }

        Decision::allow("no pattern matched", None)
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(PatternTables::new(), TierToggles::default())
    }
}
