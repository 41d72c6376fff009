//! Intercept Engine - The explicit context object behind every adapter
//!
//! Owns the classifier, decision cache, synthesizer, session context and the
//! descriptor collaborator, constructed once at startup and handed by
//! reference to every transport adapter. Nothing in here is a process global.

use crate::contract::{
    CallExecution, CallPlan, CallResponse, CallState, OutboundCall, PreparedCall, TransportAdapter,
};
use crate::identifier::substitute_identifiers;
use parking_lot::{Mutex, RwLock};
use quell_core::{
    Action, Classifier, Decision, DecisionCache, DecisionStats, EngineConfig, PatternEntry,
    PatternTables, QuellError,
};
use quell_core::cache::CacheStats;
use quell_synth::{
    DescriptorSource, NullDescriptorSource, SessionContext, SessionIds, Synthesizer,
};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// The interception engine. One per process; shared behind `Arc` across every
/// concurrent call.
pub struct InterceptEngine {
    config: EngineConfig,
    classifier: Classifier,
    cache: Mutex<DecisionCache>,
    synth: Synthesizer,
    descriptor: Box<dyn DescriptorSource>,
    stats: Mutex<DecisionStats>,
    enabled: RwLock<bool>,
}

impl InterceptEngine {
    /// Engine with default configuration and built-in pattern tables.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        InterceptEngineBuilder::new().config(config).build()
    }

    pub fn builder() -> InterceptEngineBuilder {
        InterceptEngineBuilder::new()
    }

    /// Enable or disable interception. A disabled engine forwards everything
    /// unchanged.
    pub fn set_enabled(&self, enabled: bool) {
        *self.enabled.write() = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        *self.enabled.read()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Classify a request, serving repeats from the decision cache.
    ///
    /// The cached decision is the final one, fingerprint substitution upgrade
    /// included, so a hit skips every policy step. One lock spans the
    /// read-check-then-insert sequence.
    pub fn classify_and_cache(&self, address: &str, payload: Option<&[u8]>) -> Decision {
        if !self.is_enabled() {
            return Decision::allow("interception disabled", None);
        }

        let mut cache = self.cache.lock();
        if let Some(decision) = cache.get(address, payload) {
            self.stats.lock().record(&decision);
            return decision;
        }

        let mut decision = self.classifier.classify(address, payload);
        if self.config.substitution_enabled
            && decision.action == Action::Allow
            && self.classifier.tables().is_fingerprint_endpoint(address)
        {
            decision = decision.into_substitute("structured fingerprint endpoint");
        }

        cache.set(address, payload, decision.clone());
        drop(cache);

        debug!(address, decision = %decision.display(), "classified request");
        self.stats.lock().record(&decision);
        decision
    }

    /// Classify one call and produce its transport plan. Rewriting (payload
    /// substitution, identifier substitution) happens here; the adapter only
    /// ever forwards what it is handed.
    pub fn prepare(&self, mut call: OutboundCall) -> PreparedCall {
        let mut trace = vec![CallState::Received, CallState::Classifying];
        let decision = self.classify_and_cache(&call.address, call.payload.as_deref());

        match decision.action {
            Action::Allow => {
                self.rewrite_identifiers(&mut call);
                trace.push(CallState::Forwarding);
                PreparedCall {
                    decision,
                    plan: CallPlan::Forward(call),
                    trace,
                }
            }
            Action::Substitute => {
                trace.push(CallState::Rewriting);
                call.payload = Some(self.substitution_payload());
                self.rewrite_identifiers(&mut call);
                trace.push(CallState::Forwarding);
                PreparedCall {
                    decision,
                    plan: CallPlan::Forward(call),
                    trace,
                }
            }
            Action::Block => {
                trace.push(CallState::SynthesizingResponse);
                PreparedCall {
                    decision,
                    plan: CallPlan::Fabricate(CallResponse::synthetic_success()),
                    trace,
                }
            }
        }
    }

    /// Drive one call to `Delivered`.
    ///
    /// Blocked calls cannot fail; the only error source is the adapter's real
    /// network call on forwarded plans, which surfaces exactly as it would
    /// without interception.
    pub async fn execute(
        &self,
        adapter: &dyn TransportAdapter,
        call: OutboundCall,
    ) -> Result<CallExecution, QuellError> {
        let PreparedCall {
            decision,
            plan,
            mut trace,
        } = self.prepare(call);

        let response = match plan {
            CallPlan::Forward(call) => adapter.forward(&call).await?,
            CallPlan::Fabricate(response) => response,
        };

        trace.push(CallState::Delivered);
        Ok(CallExecution {
            decision,
            response,
            trace,
        })
    }

    /// The full-payload substitution bundle: synthesized hash fields merged
    /// with whatever the descriptor collaborator provides. Collaborator
    /// failure degrades to the synthesized fields alone.
    pub fn substitution_payload(&self) -> Vec<u8> {
        let mut fields = BTreeMap::new();
        for i in 0..self.config.synthetic_field_count {
            let key = format!("synthetic-field-{}", i);
            fields.insert(i, self.synth.synthesize(&key, i, &json!({ "field": i })));
        }

        match self.descriptor.descriptor_fields() {
            Ok(descriptor) => {
                for (index, value) in descriptor {
                    fields.insert(index, value);
                }
            }
            Err(e) => {
                warn!(error = %e, "descriptor source failed, using synthesized fields only");
            }
        }

        let object: serde_json::Map<String, serde_json::Value> = fields
            .into_iter()
            .map(|(k, v)| (k.to_string(), serde_json::Value::String(v)))
            .collect();
        serde_json::Value::Object(object).to_string().into_bytes()
    }

    /// Synthesize a session-stable value. Passthrough to the synthesizer for
    /// adapters that fabricate individual fields.
    pub fn synthesize(&self, seed_key: &str, index: u32, seed_data: &serde_json::Value) -> String {
        self.synth.synthesize(seed_key, index, seed_data)
    }

    pub fn session_ids(&self) -> SessionIds {
        self.synth.session().ids()
    }

    /// Replace all session identifiers and drop every memoized synthetic
    /// value. Values already emitted are not retracted.
    pub fn regenerate_session_ids(&self) -> SessionIds {
        let ids = self.synth.session().regenerate();
        self.synth.clear();
        ids
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.lock().stats()
    }

    pub fn decision_stats(&self) -> DecisionStats {
        self.stats.lock().clone()
    }

    /// Empty the decision cache and the synthetic value cache.
    pub fn clear_caches(&self) {
        self.cache.lock().clear();
        self.synth.clear();
    }

    fn rewrite_identifiers(&self, call: &mut OutboundCall) {
        if self.config.identifier_substitution && self.is_enabled() {
            let primary = self.synth.session().primary_id();
            substitute_identifiers(&mut call.metadata, &primary);
        }
    }
}

impl Default for InterceptEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `InterceptEngine`.
pub struct InterceptEngineBuilder {
    config: EngineConfig,
    custom_patterns: Vec<PatternEntry>,
    custom_fingerprints: Vec<String>,
    descriptor: Option<Box<dyn DescriptorSource>>,
}

impl InterceptEngineBuilder {
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
            custom_patterns: Vec::new(),
            custom_fingerprints: Vec::new(),
            descriptor: None,
        }
    }

    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Add a custom pattern to a tier.
    pub fn add_pattern(mut self, entry: PatternEntry) -> Self {
        self.custom_patterns.push(entry);
        self
    }

    /// Add a custom structured-fingerprint endpoint.
    pub fn add_fingerprint(mut self, pattern: &str) -> Self {
        self.custom_fingerprints.push(pattern.to_string());
        self
    }

    /// Install the descriptor collaborator.
    pub fn descriptor_source(mut self, source: Box<dyn DescriptorSource>) -> Self {
        self.descriptor = Some(source);
        self
    }

    pub fn build(self) -> InterceptEngine {
        let mut tables = PatternTables::new();
        for entry in self.custom_patterns {
            tables.add(entry);
        }
        for pattern in &self.custom_fingerprints {
            tables.add_fingerprint(pattern);
        }

        let enabled = self.config.enabled;
        let capacity = self.config.cache_capacity;
        let session = Arc::new(SessionContext::new());

        InterceptEngine {
            classifier: Classifier::new(tables, self.config.tiers),
            cache: Mutex::new(DecisionCache::new(capacity)),
            synth: Synthesizer::new(session),
            descriptor: self
                .descriptor
                .unwrap_or_else(|| Box::new(NullDescriptorSource)),
            stats: Mutex::new(DecisionStats::default()),
            enabled: RwLock::new(enabled),
            config: self.config,
        }
    }
}

impl Default for InterceptEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
