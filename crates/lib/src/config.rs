//! Configuration types and loading.
//!
//! Config is loaded from a JSON file (e.g. `~/.parley/config.json`).
//! Kept minimal: server bind/port and fulfillment defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Spoken fallback used when no override is configured. Serves both the
/// default handler and the projection-failure reply.
pub const DEFAULT_FALLBACK_SPEECH: &str = "Sorry, I didn't catch that. Could you say that again?";

/// Top-level application config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Fulfillment behavior (assistant source, fallback text).
    #[serde(default)]
    pub fulfillment: FulfillmentConfig,
}

/// Server bind and port settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    /// Port for the webhook endpoint (default 8787).
    #[serde(default = "default_server_port")]
    pub port: u16,

    /// Bind address (default "127.0.0.1").
    #[serde(default = "default_server_bind")]
    pub bind: String,
}

fn default_server_port() -> u16 {
    8787
}

fn default_server_bind() -> String {
    "127.0.0.1".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_server_port(),
            bind: default_server_bind(),
        }
    }
}

/// Fulfillment defaults: which `originalRequest.source` value selects the
/// assistant branch, and the text used when nothing better is available.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FulfillmentConfig {
    /// Source identifier of the voice-assistant surface (default "google").
    #[serde(default = "default_assistant_source")]
    pub assistant_source: String,

    /// Spoken text for the default handler and the projection fallback.
    pub fallback_speech: Option<String>,

    /// Displayed text for the default handler and the projection fallback.
    /// Falls back to the spoken text when unset.
    pub fallback_display_text: Option<String>,
}

fn default_assistant_source() -> String {
    "google".to_string()
}

impl Default for FulfillmentConfig {
    fn default() -> Self {
        Self {
            assistant_source: default_assistant_source(),
            fallback_speech: None,
            fallback_display_text: None,
        }
    }
}

/// Resolve the fallback spoken text: config override or the built-in default.
pub fn resolve_fallback_speech(config: &Config) -> String {
    config
        .fulfillment
        .fallback_speech
        .as_ref()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_FALLBACK_SPEECH.to_string())
}

/// Resolve the fallback display text: config override, else the spoken text.
pub fn resolve_fallback_display(config: &Config) -> String {
    config
        .fulfillment
        .fallback_display_text
        .as_ref()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| resolve_fallback_speech(config))
}

/// Resolve config path from env or default.
pub fn default_config_path() -> PathBuf {
    std::env::var("PARLEY_CONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .map(|home| home.join(".parley").join("config.json"))
                .unwrap_or_else(|| PathBuf::from("config.json"))
        })
}

/// Load config from the default path (or PARLEY_CONFIG_PATH). Missing file
/// means default config.
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(default_config_path);
    if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        return Ok(Config::default());
    }
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("reading config from {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("parsing config from {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_server_port_and_bind() {
        let server = ServerConfig::default();
        assert_eq!(server.port, 8787);
        assert_eq!(server.bind, "127.0.0.1");
    }

    #[test]
    fn default_assistant_source_is_google() {
        let config = Config::default();
        assert_eq!(config.fulfillment.assistant_source, "google");
    }

    #[test]
    fn fallback_text_uses_built_in_default() {
        let config = Config::default();
        assert_eq!(resolve_fallback_speech(&config), DEFAULT_FALLBACK_SPEECH);
        assert_eq!(resolve_fallback_display(&config), DEFAULT_FALLBACK_SPEECH);
    }

    #[test]
    fn fallback_display_falls_back_to_speech_override() {
        let mut config = Config::default();
        config.fulfillment.fallback_speech = Some("pardon?".to_string());
        assert_eq!(resolve_fallback_speech(&config), "pardon?");
        assert_eq!(resolve_fallback_display(&config), "pardon?");
    }

    #[test]
    fn empty_config_json_parses_to_defaults() {
        let config: Config = serde_json::from_str("{}").expect("parse");
        assert_eq!(config.server.port, 8787);
        assert_eq!(config.fulfillment.assistant_source, "google");
    }

    #[test]
    fn camel_case_fields_parse() {
        let config: Config = serde_json::from_str(
            r#"{"fulfillment": {"assistantSource": "alexa", "fallbackDisplayText": "hm?"}}"#,
        )
        .expect("parse");
        assert_eq!(config.fulfillment.assistant_source, "alexa");
        assert_eq!(resolve_fallback_display(&config), "hm?");
    }
}
