//! Session Context - Process-lifetime identifier bundle
//!
//! Three identifiers generated once at startup and used both as call metadata
//! and as the synthesis salt. Regeneration replaces all three atomically;
//! synthetic values already emitted are not retracted.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Snapshot of the session identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionIds {
    pub primary: Uuid,
    pub user: Uuid,
    pub anonymous: Uuid,
}

impl SessionIds {
    fn generate() -> Self {
        Self {
            primary: Uuid::new_v4(),
            user: Uuid::new_v4(),
            anonymous: Uuid::new_v4(),
        }
    }
}

/// Lock-guarded session identifiers, shared across all concurrent calls.
#[derive(Debug)]
pub struct SessionContext {
    ids: RwLock<SessionIds>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self {
            ids: RwLock::new(SessionIds::generate()),
        }
    }

    /// Current identifiers.
    pub fn ids(&self) -> SessionIds {
        self.ids.read().clone()
    }

    /// The primary session id as a string, for metadata substitution.
    pub fn primary_id(&self) -> String {
        self.ids.read().primary.to_string()
    }

    /// Replace all three identifiers under one lock. Session-scoped synthetic
    /// consistency is invalidated from this point on.
    pub fn regenerate(&self) -> SessionIds {
        let fresh = SessionIds::generate();
        *self.ids.write() = fresh.clone();
        fresh
    }

    /// 8-hex-char synthesis seed: primary id with separators stripped,
    /// first 8 characters.
    pub fn session_seed(&self) -> String {
        let simple = self.ids.read().primary.simple().to_string();
        simple.chars().take(8).collect()
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}
