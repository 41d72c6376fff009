//! Deterministic Synthesizer - Session-stable pseudo-random values
//!
//! The hash construction is reproduced exactly as specified by the substitution
//! contract (rolling 31-multiplier hash, nibble extension against the session
//! seed) because downstream consumers round-trip these values: a bundle of
//! synthetic fields reported twice must match field-for-field. Do not "improve"
//! the algorithm.

use crate::session::SessionContext;
use parking_lot::Mutex;
use rand::Rng;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::trace;
use uuid::Uuid;

/// The distinguished index whose output carries a version tag prefix.
pub const VERSION_TAG_INDEX: u32 = 12;

/// Prefix applied to the distinguished index.
const VERSION_TAG: &str = "v1#";

/// Output length in hex characters (before any version tag).
const HASH_LEN: usize = 64;

/// Version-like candidate strings for `synthetic_version`. Chosen once per key
/// and then held fixed for the session.
const VERSION_CANDIDATES: &[&str] = &[
    "10.0.19045",
    "10.0.22631",
    "12.7.4",
    "14.4.1",
    "6.5.0-41-generic",
    "6.8.0-35-generic",
];

/// Deterministic, session-salted synthetic value generator.
///
/// All generated values are memoized write-once by key in a flat string
/// namespace shared across every field kind. Two call sites choosing the same
/// key silently share one value; that is a property of the contract, not a bug
/// to fix here.
pub struct Synthesizer {
    session: Arc<SessionContext>,
    cache: Mutex<HashMap<String, String>>,
}

impl Synthesizer {
    pub fn new(session: Arc<SessionContext>) -> Self {
        Self {
            session,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn session(&self) -> &Arc<SessionContext> {
        &self.session
    }

    /// Synthesize the 64-hex-char value for `(seed_key, index, seed_data)`.
    ///
    /// Memoized by `seed_key`: within one session the same key always returns
    /// the same string, byte for byte. Index `VERSION_TAG_INDEX` is prefixed
    /// with `"v1#"`.
    pub fn synthesize(
        &self,
        seed_key: &str,
        index: u32,
        seed_data: &serde_json::Value,
    ) -> String {
        let mut cache = self.cache.lock();
        if let Some(existing) = cache.get(seed_key) {
            return existing.clone();
        }

        let value = self.compute(index, seed_data);
        trace!(seed_key, index, "synthesized field value");
        cache.insert(seed_key.to_string(), value.clone());
        value
    }

    fn compute(&self, index: u32, seed_data: &serde_json::Value) -> String {
        // serde_json's default map is ordered, so this stringification is
        // canonical for identical seed data.
        let canonical = seed_data.to_string();
        let salted = format!("{}:{}", index, canonical);

        // Classic multiply-by-31 rolling hash over 32-bit signed arithmetic.
        let mut hash: i32 = 0;
        for c in salted.chars() {
            hash = hash
                .wrapping_shl(5)
                .wrapping_sub(hash)
                .wrapping_add(c as i32);
        }
        let mut out = format!("{:x}", hash.unsigned_abs());

        // Extend to 64 hex chars by XORing session-seed nibbles against the
        // zero-padded index hex, position by position.
        let seed_digits: Vec<u32> = self
            .session
            .session_seed()
            .chars()
            .map(|c| c.to_digit(16).unwrap_or(0))
            .collect();
        let index_digits: Vec<u32> = format!("{:02x}", index)
            .chars()
            .take(2)
            .map(|c| c.to_digit(16).unwrap_or(0))
            .collect();

        while out.len() < HASH_LEN {
            let p = out.len();
            let nibble = seed_digits[p % 8] ^ index_digits[p % 2];
            out.push(char::from_digit(nibble, 16).unwrap_or('0'));
        }
        out.truncate(HASH_LEN);

        if index == VERSION_TAG_INDEX {
            format!("{}{}", VERSION_TAG, out)
        } else {
            out
        }
    }

    /// A UUID-shaped identifier, stable for the session under `key`.
    pub fn synthetic_uuid(&self, key: &str) -> String {
        self.memoized(key, || Uuid::new_v4().to_string())
    }

    /// A MAC-address-shaped string, stable for the session under `key`.
    pub fn synthetic_mac(&self, key: &str) -> String {
        self.memoized(key, || {
            let bytes: [u8; 6] = rand::thread_rng().gen();
            bytes
                .iter()
                .map(|b| format!("{:02x}", b))
                .collect::<Vec<_>>()
                .join(":")
        })
    }

    /// One value from `candidates`, picked once and held fixed under `key`.
    /// Empty candidate lists degrade to an empty string rather than failing.
    pub fn synthetic_choice(&self, key: &str, candidates: &[&str]) -> String {
        self.memoized(key, || {
            if candidates.is_empty() {
                String::new()
            } else {
                let i = rand::thread_rng().gen_range(0..candidates.len());
                candidates[i].to_string()
            }
        })
    }

    /// A platform-version-like string from the built-in candidate set.
    pub fn synthetic_version(&self, key: &str) -> String {
        self.synthetic_choice(key, VERSION_CANDIDATES)
    }

    /// Clear all memoized values. Called on session regeneration so that a new
    /// session produces a fresh, internally consistent set.
    pub fn clear(&self) {
        self.cache.lock().clear();
    }

    /// Number of memoized values, for diagnostics.
    pub fn cached_len(&self) -> usize {
        self.cache.lock().len()
    }

    fn memoized<F: FnOnce() -> String>(&self, key: &str, generate: F) -> String {
        let mut cache = self.cache.lock();
        if let Some(existing) = cache.get(key) {
            return existing.clone();
        }
        let value = generate();
        cache.insert(key.to_string(), value.clone());
        value
    }
}
