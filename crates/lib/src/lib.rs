//! Parley core library — fulfillment webhook for a conversational-agent
//! platform: config, intent dispatch, response model, projection, and the
//! HTTP server used by the CLI.

pub mod config;
pub mod dispatch;
pub mod project;
pub mod response;
pub mod webhook;
