//! Pattern Tables - The four-tier classification policy data
//!
//! Static substring sets the classifier evaluates in a fixed precedence order.
//! Table contents are configuration data, not verified business logic: a keyword
//! here decides whether a request lives or dies, so edits belong in review, not
//! in hot code paths.

use serde::{Deserialize, Serialize};

/// Precedence tier a pattern belongs to.
///
/// Tier order is significant (Essential wins over everything, Allowlist is only
/// consulted after both block tiers); order within a tier is not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tier {
    /// Core feature endpoints that must never be intercepted
    Essential,
    /// Exact telemetry/analytics endpoints, always intercepted
    PreciseBlock,
    /// Keyword heuristics over address and payload
    GenericBlock,
    /// Known-functional endpoints, lower priority than Essential
    Allowlist,
}

impl Tier {
    /// Human-readable tier label used in decision records
    pub fn label(&self) -> &'static str {
        match self {
            Tier::Essential => "essential",
            Tier::PreciseBlock => "precise-block",
            Tier::GenericBlock => "generic-block",
            Tier::Allowlist => "allowlist",
        }
    }
}

/// A single pattern: a lowercase substring and the tier it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternEntry {
    pub pattern: String,
    pub tier: Tier,
}

impl PatternEntry {
    pub fn new(pattern: &str, tier: Tier) -> Self {
        Self {
            pattern: pattern.to_lowercase(),
            tier,
        }
    }
}

/// The full pattern policy: four precedence tiers plus the fingerprint endpoint
/// table consulted by the substitution policy (not a precedence tier itself).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternTables {
    essential: Vec<String>,
    precise_block: Vec<String>,
    generic_block: Vec<String>,
    allowlist: Vec<String>,
    fingerprint: Vec<String>,
}

impl PatternTables {
    /// Build the tables with the built-in policy.
    pub fn new() -> Self {
        Self {
            essential: Self::builtin_essential(),
            precise_block: Self::builtin_precise_block(),
            generic_block: Self::builtin_generic_block(),
            allowlist: Self::builtin_allowlist(),
            fingerprint: Self::builtin_fingerprint(),
        }
    }

    /// Empty tables, for tests and fully custom policies.
    pub fn empty() -> Self {
        Self {
            essential: Vec::new(),
            precise_block: Vec::new(),
            generic_block: Vec::new(),
            allowlist: Vec::new(),
            fingerprint: Vec::new(),
        }
    }

    /// Append a custom pattern to a tier. Patterns are stored lowercase.
    pub fn add(&mut self, entry: PatternEntry) {
        let pattern = entry.pattern.to_lowercase();
        match entry.tier {
            Tier::Essential => self.essential.push(pattern),
            Tier::PreciseBlock => self.precise_block.push(pattern),
            Tier::GenericBlock => self.generic_block.push(pattern),
            Tier::Allowlist => self.allowlist.push(pattern),
        }
    }

    /// Append a custom structured-fingerprint endpoint pattern.
    pub fn add_fingerprint(&mut self, pattern: &str) {
        self.fingerprint.push(pattern.to_lowercase());
    }

    /// First pattern in `tier` contained in `haystack` (already lowercased).
    pub fn first_match<'a>(&'a self, tier: Tier, haystack: &str) -> Option<&'a str> {
        let table = match tier {
            Tier::Essential => &self.essential,
            Tier::PreciseBlock => &self.precise_block,
            Tier::GenericBlock => &self.generic_block,
            Tier::Allowlist => &self.allowlist,
        };
        table
            .iter()
            .find(|p| haystack.contains(p.as_str()))
            .map(String::as_str)
    }

    /// Whether `address` matches a structured-fingerprint endpoint.
    pub fn is_fingerprint_endpoint(&self, address: &str) -> bool {
        let address = address.to_lowercase();
        self.fingerprint.iter().any(|p| address.contains(p.as_str()))
    }

    /// Number of patterns across all tiers (fingerprint table excluded).
    pub fn len(&self) -> usize {
        self.essential.len()
            + self.precise_block.len()
            + self.generic_block.len()
            + self.allowlist.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Endpoints the host cannot function without. Overrides every block tier.
    fn builtin_essential() -> Vec<String> {
        [
            "completion",
            "chat-stream",
            "next-edit",
            "client-metrics",
            "subscription-info",
            "get-credentials",
            "token-refresh",
            "remote-agents",
            "memorize",
            "list-models",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    /// Exact telemetry/analytics endpoints, always intercepted.
    fn builtin_precise_block() -> Vec<String> {
        [
            "report-feature-vector",
            "record-session-events",
            "record-request-events",
            "record-preference-sample",
            "analytics",
            "telemetry-batch",
            "client-completion-timelines",
            "segment.io",
            "sentry.io",
            "track-event",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    /// Keyword heuristics. Scanned over address and payload, so a keyword here
    /// can shadow an allowlisted endpoint whose payload mentions it.
    fn builtin_generic_block() -> Vec<String> {
        [
            "telemetry",
            "tracking",
            "metrics",
            "usage-stats",
            "diagnostic-upload",
            "heartbeat-report",
            "beacon",
            "fingerprint-report",
            "session-replay",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    /// Known-functional endpoints. Only reached when no block tier fired.
    fn builtin_allowlist() -> Vec<String> {
        [
            "codebase-retrieval",
            "agents/",
            "tool-use",
            "file-sync",
            "workspace-context",
            "blob-upload",
            "model-catalog",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    /// Endpoints whose payloads carry structured host fingerprints. Requests
    /// here get their payload replaced with synthesized data before forwarding.
    fn builtin_fingerprint() -> Vec<String> {
        ["report-feature-vector", "fingerprint-report"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }
}

impl Default for PatternTables {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_tables_populated() {
        let tables = PatternTables::new();
        assert!(!tables.is_empty());
        assert!(tables.len() > 20);
    }

    #[test]
    fn test_first_match_lowercases_nothing_twice() {
        let tables = PatternTables::new();
        // Callers pass lowercased haystacks; patterns are stored lowercase.
        assert!(tables
            .first_match(Tier::PreciseBlock, "https://x.example.com/analytics")
            .is_some());
        assert!(tables
            .first_match(Tier::PreciseBlock, "https://x.example.com/api")
            .is_none());
    }

    #[test]
    fn test_custom_entry() {
        let mut tables = PatternTables::empty();
        tables.add(PatternEntry::new("My-Endpoint", Tier::Allowlist));
        assert_eq!(
            tables.first_match(Tier::Allowlist, "https://a/my-endpoint"),
            Some("my-endpoint")
        );
    }

    #[test]
    fn test_fingerprint_endpoint() {
        let tables = PatternTables::new();
        assert!(tables.is_fingerprint_endpoint("https://api.example.com/report-feature-vector"));
        assert!(!tables.is_fingerprint_endpoint("https://api.example.com/completion"));
    }
}
