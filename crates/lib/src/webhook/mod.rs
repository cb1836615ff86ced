//! Webhook transport: inbound wire protocol and the HTTP server.
//!
//! One pipeline per request: parse leniently, dispatch by action, project the
//! response for the calling surface, reply. Nothing is shared across requests
//! beyond the read-only config and handler registry.

mod protocol;
mod server;

pub use protocol::{OriginalRequest, QueryResult, WebhookRequest};
pub use server::{run_server, ServerState};
