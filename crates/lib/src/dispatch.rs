//! Intent dispatch: action string to handler, with a mandatory default.
//!
//! The registry is built once at startup and read-only afterwards. Lookup is
//! total: unknown, absent, or unregistered keys resolve to the default
//! handler, so an unrecognized intent is a routing outcome, not an error.

use crate::response::{Context, ResponseModel};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Parsed inbound request handed to handlers: the intent key the NLU
/// assigned, extracted parameters, active contexts, and the calling surface.
#[derive(Debug, Clone, Default)]
pub struct FulfillmentRequest {
    pub intent_key: Option<String>,
    pub parameters: Map<String, Value>,
    pub contexts: Vec<Context>,
    pub source: Option<String>,
}

/// Response-construction routine for one intent.
pub type Handler = Box<dyn Fn(&FulfillmentRequest) -> ResponseModel + Send + Sync>;

/// Registry of intent keys to handlers. Constructed with the required default
/// handler; shared read-only across requests (e.g. via `Arc`).
pub struct HandlerRegistry {
    default: Handler,
    by_intent: HashMap<String, Handler>,
}

impl HandlerRegistry {
    pub fn new(default: Handler) -> Self {
        Self {
            default,
            by_intent: HashMap::new(),
        }
    }

    /// Register a handler for an intent key. Replaces any previous handler
    /// under the same key. Call before serving; the registry is not meant to
    /// change once requests are in flight.
    pub fn register(&mut self, intent: impl Into<String>, handler: Handler) {
        self.by_intent.insert(intent.into(), handler);
    }

    /// Look up the handler for an intent key. Never fails: an absent or
    /// unregistered key resolves to the default handler.
    pub fn resolve(&self, intent: Option<&str>) -> &Handler {
        intent
            .and_then(|key| self.by_intent.get(key))
            .unwrap_or(&self.default)
    }
}
