//! Inbound webhook wire types (the NLU platform's fulfillment request).
//!
//! Every field is lenient: missing pieces default instead of failing, so a
//! sparse or malformed payload still reaches the default handler rather than
//! aborting the request.

use crate::dispatch::FulfillmentRequest;
use crate::response::Context;
use serde::Deserialize;
use serde_json::{Map, Value};

/// Webhook POST body: `{ "result": {...}, "originalRequest": {...} | absent }`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookRequest {
    #[serde(default)]
    pub result: QueryResult,
    #[serde(default)]
    pub original_request: Option<OriginalRequest>,
}

/// NLU classification result: action name, extracted parameters, and the
/// contexts active for this conversation turn.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryResult {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub parameters: Map<String, Value>,
    #[serde(default)]
    pub contexts: Vec<Context>,
}

/// Envelope identifying the calling surface. Absent for callers that are not
/// a recognized platform (e.g. direct API tests).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OriginalRequest {
    #[serde(default)]
    pub source: Option<String>,
}

impl WebhookRequest {
    /// Extract the dispatchable request. An empty or whitespace-only action
    /// counts as absent and resolves to the default handler.
    pub fn into_fulfillment(self) -> FulfillmentRequest {
        let source = self.original_request.and_then(|original| original.source);
        let intent_key = self.result.action.filter(|action| !action.trim().is_empty());
        FulfillmentRequest {
            intent_key,
            parameters: self.result.parameters,
            contexts: self.result.contexts,
            source,
        }
    }
}
