//! Decision Types - Outcomes of request classification
//!
//! A `Decision` is immutable once produced; a new classification always builds a
//! fresh one rather than updating in place.

use crate::patterns::Tier;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// What to do with an outbound request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Forward the real call unchanged
    Allow,
    /// Make no real call; fabricate a success response
    Block,
    /// Replace the payload with synthesized data, then forward
    Substitute,
}

impl Action {
    /// Whether a real network call is made for this action
    pub fn forwards(&self) -> bool {
        matches!(self, Action::Allow | Action::Substitute)
    }

    pub fn action_text(&self) -> &'static str {
        match self {
            Action::Allow => "ALLOW",
            Action::Block => "BLOCK",
            Action::Substitute => "SUBSTITUTE",
        }
    }
}

/// Strategy identifier carried by `Substitute` decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubstitutionStrategy {
    /// The only strategy currently defined: replace the whole payload with a
    /// synthesized structured bundle.
    FullPayload,
}

/// The immutable output of classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub action: Action,
    /// Why this action was chosen (e.g. "precise pattern match")
    pub reason: String,
    /// Tier label that produced the decision, or "default"
    pub tier: String,
    /// Present only on `Substitute` decisions
    pub strategy: Option<SubstitutionStrategy>,
}

impl Decision {
    pub fn allow(reason: &str, tier: Option<Tier>) -> Self {
        Self {
            action: Action::Allow,
            reason: reason.to_string(),
            tier: tier.map(|t| t.label().to_string()).unwrap_or_else(|| "default".to_string()),
            strategy: None,
        }
    }

    pub fn block(reason: &str, tier: Tier) -> Self {
        Self {
            action: Action::Block,
            reason: reason.to_string(),
            tier: tier.label().to_string(),
            strategy: None,
        }
    }

    /// Upgrade an Allow into a Substitute for fingerprint endpoints. Block and
    /// existing Substitute decisions pass through unchanged.
    pub fn into_substitute(self, reason: &str) -> Self {
        match self.action {
            Action::Allow => Self {
                action: Action::Substitute,
                reason: reason.to_string(),
                tier: self.tier,
                strategy: Some(SubstitutionStrategy::FullPayload),
            },
            _ => self,
        }
    }

    pub fn display(&self) -> String {
        format!("{} [{}] {}", self.action.action_text(), self.tier, self.reason)
    }
}

/// Running tallies over decisions, observable through the engine.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct DecisionStats {
    pub total: u64,
    pub allowed: u64,
    pub blocked: u64,
    pub substituted: u64,
    /// Breakdown by tier label
    pub by_tier: HashMap<String, u64>,
}

impl DecisionStats {
    pub fn record(&mut self, decision: &Decision) {
        self.total += 1;
        match decision.action {
            Action::Allow => self.allowed += 1,
            Action::Block => self.blocked += 1,
            Action::Substitute => self.substituted += 1,
        }
        *self.by_tier.entry(decision.tier.clone()).or_insert(0) += 1;
    }

    /// Percentage of decisions that suppressed the real call
    pub fn block_rate(&self) -> f32 {
        if self.total == 0 {
            0.0
        } else {
            (self.blocked as f32 / self.total as f32) * 100.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_constructors() {
        let allow = Decision::allow("no pattern matched", None);
        assert_eq!(allow.action, Action::Allow);
        assert_eq!(allow.tier, "default");
        assert!(allow.strategy.is_none());

        let block = Decision::block("precise pattern match", Tier::PreciseBlock);
        assert_eq!(block.action, Action::Block);
        assert_eq!(block.tier, "precise-block");
        assert!(!block.action.forwards());
    }

    #[test]
    fn test_substitute_upgrade() {
        let sub = Decision::allow("no pattern matched", None)
            .into_substitute("structured fingerprint endpoint");
        assert_eq!(sub.action, Action::Substitute);
        assert_eq!(sub.strategy, Some(SubstitutionStrategy::FullPayload));
        assert!(sub.action.forwards());

        // Block is never upgraded
        let block = Decision::block("precise pattern match", Tier::PreciseBlock)
            .into_substitute("structured fingerprint endpoint");
        assert_eq!(block.action, Action::Block);
    }

    #[test]
    fn test_stats() {
        let mut stats = DecisionStats::default();
        stats.record(&Decision::allow("x", None));
        stats.record(&Decision::block("y", Tier::GenericBlock));
        stats.record(&Decision::block("y", Tier::PreciseBlock));

        assert_eq!(stats.total, 3);
        assert_eq!(stats.blocked, 2);
        assert!(stats.block_rate() > 60.0);
        assert_eq!(stats.by_tier.get("default"), Some(&1));
    }
}
