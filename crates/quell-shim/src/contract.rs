//! Shim Contract - Types every transport adapter works against
//!
//! A transport (request/response client, event stream, callback bridge) only
//! needs to know how to forward a call it is handed; classification, rewriting
//! and response fabrication live behind the engine.

use async_trait::async_trait;
use quell_core::{Decision, QuellError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// An outbound call as seen at the interception boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboundCall {
    /// Destination address (URL or endpoint identifier)
    pub address: String,
    /// Opaque payload; structure-aware inspection belongs to adapters
    pub payload: Option<Vec<u8>>,
    /// Call metadata (headers, query fragments) as flat string pairs
    pub metadata: HashMap<String, String>,
}

impl OutboundCall {
    pub fn new(address: &str) -> Self {
        Self {
            address: address.to_string(),
            payload: None,
            metadata: HashMap::new(),
        }
    }

    pub fn with_payload(mut self, payload: impl Into<Vec<u8>>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    pub fn with_metadata(mut self, key: &str, value: &str) -> Self {
        self.metadata.insert(key.to_string(), value.to_string());
        self
    }
}

/// Per-call state machine positions. Strictly ordered within one call;
/// independent calls have no mutual ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallState {
    Received,
    Classifying,
    Rewriting,
    Forwarding,
    SynthesizingResponse,
    Delivered,
}

/// The response a call ultimately delivers, real or fabricated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
    /// True when this response was fabricated by the shim
    pub synthetic: bool,
}

impl CallResponse {
    /// The fabricated success every blocked call delivers: success status, a
    /// minimal valid empty-object body, and headers sufficient for a JSON
    /// response contract.
    pub fn synthetic_success() -> Self {
        let mut headers = HashMap::new();
        headers.insert("content-type".to_string(), "application/json".to_string());
        headers.insert("content-length".to_string(), "2".to_string());
        Self {
            status: 200,
            headers,
            body: b"{}".to_vec(),
            synthetic: true,
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// What the engine decided to do with one call.
#[derive(Debug, Clone)]
pub enum CallPlan {
    /// Make the real call (payload/metadata possibly rewritten)
    Forward(OutboundCall),
    /// Make no real call; deliver this response
    Fabricate(CallResponse),
}

/// A call after classification and rewriting, ready for its transport.
#[derive(Debug, Clone)]
pub struct PreparedCall {
    pub decision: Decision,
    pub plan: CallPlan,
    /// States traversed so far (always starts Received, Classifying)
    pub trace: Vec<CallState>,
}

/// A call driven all the way to `Delivered`.
#[derive(Debug, Clone)]
pub struct CallExecution {
    pub decision: Decision,
    pub response: CallResponse,
    pub trace: Vec<CallState>,
}

/// The capability a networking binding implements to participate in
/// interception. Adapters only forward; they never classify.
#[async_trait]
pub trait TransportAdapter: Send + Sync {
    /// Perform the real network call. Only invoked for Allow/Substitute plans.
    async fn forward(&self, call: &OutboundCall) -> Result<CallResponse, QuellError>;

    /// Adapter name for diagnostics.
    fn name(&self) -> &str {
        "transport"
    }
}
