//! Decision Cache - Memoized classification results
//!
//! Keyed by a cheap rolling digest of the address and the first 100 payload
//! characters. Bounded, FIFO eviction (no promotion on hit), no TTL: a given
//! (address, payload-prefix) pair classifies the same way for the whole process
//! lifetime, so freshness is the caller's problem via `clear`.

use crate::decision::Decision;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

/// How much of the payload participates in the digest. Enough for good hit
/// rates; correctness never depends on the tail.
const DIGEST_PAYLOAD_PREFIX: usize = 100;

/// Cheap non-cryptographic digest of (address, payload prefix).
pub fn stable_digest(address: &str, payload: Option<&[u8]>) -> u64 {
    let mut hash: u64 = 1469598103934665603; // FNV offset as a non-zero start
    for b in address.bytes() {
        hash = hash.wrapping_mul(31).wrapping_add(b as u64);
    }
    hash = hash.wrapping_mul(31).wrapping_add(b'|' as u64);
    if let Some(payload) = payload {
        for &b in payload.iter().take(DIGEST_PAYLOAD_PREFIX) {
            hash = hash.wrapping_mul(31).wrapping_add(b as u64);
        }
    }
    hash
}

/// A cached decision. Never updated in place; a fresh classification always
/// produces a fresh entry that may overwrite an existing key.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheEntry {
    decision: Decision,
    created_at: DateTime<Utc>,
}

/// Cache counters, exposed through the engine.
#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub size: usize,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f32 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f32 / total as f32
        }
    }
}

/// Bounded FIFO memo table for classifier output.
#[derive(Debug)]
pub struct DecisionCache {
    entries: HashMap<u64, CacheEntry>,
    /// Keys in insertion order; front is evicted first
    order: VecDeque<u64>,
    capacity: usize,
    hits: u64,
    misses: u64,
}

impl DecisionCache {
    /// `capacity` is clamped to at least 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: HashMap::with_capacity(capacity),
            order: VecDeque::with_capacity(capacity),
            capacity,
            hits: 0,
            misses: 0,
        }
    }

    /// Cached decision for (address, payload), if present. Counters are the
    /// only state touched; entries are never promoted or rewritten here.
    pub fn get(&mut self, address: &str, payload: Option<&[u8]>) -> Option<Decision> {
        let key = stable_digest(address, payload);
        match self.entries.get(&key) {
            Some(entry) => {
                self.hits += 1;
                Some(entry.decision.clone())
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    /// Insert or overwrite the entry for (address, payload). Overwriting an
    /// existing key keeps its original insertion position. At capacity, the
    /// earliest-inserted key is evicted first.
    pub fn set(&mut self, address: &str, payload: Option<&[u8]>, decision: Decision) {
        let key = stable_digest(address, payload);
        let entry = CacheEntry {
            decision,
            created_at: Utc::now(),
        };

        if self.entries.insert(key, entry).is_some() {
            return;
        }

        self.order.push_back(key);
        while self.entries.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
            } else {
                break;
            }
        }
    }

    /// Empty the table and reset hit/miss counters.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
        self.hits = 0;
        self.misses = 0;
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            size: self.entries.len(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::{Action, Decision};
    use crate::patterns::Tier;

    fn block() -> Decision {
        Decision::block("precise pattern match", Tier::PreciseBlock)
    }

    #[test]
    fn test_set_then_get() {
        let mut cache = DecisionCache::new(10);
        cache.set("https://a/analytics", None, block());

        let got = cache.get("https://a/analytics", None).unwrap();
        assert_eq!(got.action, Action::Block);
        assert_eq!(cache.stats().hits, 1);
    }

    #[test]
    fn test_miss_counts() {
        let mut cache = DecisionCache::new(10);
        assert!(cache.get("https://a", None).is_none());
        assert_eq!(cache.stats().misses, 1);
        assert_eq!(cache.stats().hit_rate(), 0.0);
    }

    #[test]
    fn test_payload_prefix_digest() {
        let mut cache = DecisionCache::new(10);
        let long_a = vec![b'a'; 200];
        let mut long_b = long_a.clone();
        long_b[150] = b'z'; // differs only past the digest prefix

        cache.set("https://a", Some(&long_a), block());
        // Shares the entry: the digest covers only the first 100 bytes.
        assert!(cache.get("https://a", Some(&long_b)).is_some());
    }

    #[test]
    fn test_fifo_bound() {
        let mut cache = DecisionCache::new(3);
        for i in 0..4 {
            cache.set(&format!("https://host-{}", i), None, block());
        }

        assert_eq!(cache.len(), 3);
        // First-inserted key is gone; the rest survive.
        assert!(cache.get("https://host-0", None).is_none());
        assert!(cache.get("https://host-1", None).is_some());
        assert!(cache.get("https://host-3", None).is_some());
    }

    #[test]
    fn test_no_promotion_on_hit() {
        let mut cache = DecisionCache::new(2);
        cache.set("https://host-0", None, block());
        cache.set("https://host-1", None, block());

        // A hit on host-0 must not save it from FIFO eviction.
        assert!(cache.get("https://host-0", None).is_some());
        cache.set("https://host-2", None, block());

        assert!(cache.get("https://host-0", None).is_none());
        assert!(cache.get("https://host-1", None).is_some());
    }

    #[test]
    fn test_set_idempotent_per_key() {
        let mut cache = DecisionCache::new(2);
        cache.set("https://host-0", None, block());
        cache.set("https://host-0", None, block());
        cache.set("https://host-0", None, block());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_clear_resets_counters() {
        let mut cache = DecisionCache::new(2);
        cache.set("https://host-0", None, block());
        cache.get("https://host-0", None);
        cache.get("https://missing", None);

        cache.clear();
        let stats = cache.stats();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);
        assert_eq!(stats.size, 0);
    }

    #[test]
    fn test_digest_distinguishes_address() {
        assert_ne!(
            stable_digest("https://a/x", None),
            stable_digest("https://a/y", None)
        );
        assert_ne!(
            stable_digest("https://a", Some(b"p1")),
            stable_digest("https://a", Some(b"p2"))
        );
    }
}
