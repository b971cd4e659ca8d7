//! Client configuration from the environment

use crate::transcript::DEFAULT_GREETING;
use crate::wire::{Protocol, UnknownProtocol};
use std::io::IsTerminal;
use thiserror::Error;

pub const DEFAULT_WS_URL: &str = "ws://localhost:8000/chat";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("CHAT_WS_URL must start with ws:// or wss://, got '{0}'")]
    InvalidUrl(String),
    #[error("CHAT_PROTOCOL: {0}")]
    Protocol(#[from] UnknownProtocol),
}

/// Runtime configuration for the terminal client
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub ws_url: String,
    pub protocol: Protocol,
    pub greeting: String,
    pub color: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            ws_url: DEFAULT_WS_URL.to_string(),
            protocol: Protocol::Canonical,
            greeting: DEFAULT_GREETING.to_string(),
            color: false,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok(), std::io::stdout().is_terminal())
    }

    /// Build from an arbitrary variable lookup; `is_tty` feeds color detection
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
        is_tty: bool,
    ) -> Result<Self, ConfigError> {
        let ws_url = lookup("CHAT_WS_URL").unwrap_or_else(|| DEFAULT_WS_URL.to_string());
        if !(ws_url.starts_with("ws://") || ws_url.starts_with("wss://")) {
            return Err(ConfigError::InvalidUrl(ws_url));
        }

        let protocol = match lookup("CHAT_PROTOCOL") {
            Some(value) => value.parse()?,
            None => Protocol::default(),
        };

        let greeting = lookup("CHAT_GREETING")
            .filter(|g| !g.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_GREETING.to_string());

        // NO_COLOR wins over FORCE_COLOR, then fall back to tty detection
        let color = if lookup("NO_COLOR").is_some() {
            false
        } else if lookup("FORCE_COLOR").is_some() {
            true
        } else {
            is_tty
        };

        Ok(Self {
            ws_url,
            protocol,
            greeting,
            color,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)], is_tty: bool) -> Result<ClientConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ClientConfig::from_lookup(|key| vars.get(key).cloned(), is_tty)
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[], false).unwrap();
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(
            &[
                ("CHAT_WS_URL", "wss://example.com/chat"),
                ("CHAT_PROTOCOL", "legacy"),
                ("CHAT_GREETING", "Hello!"),
            ],
            false,
        )
        .unwrap();
        assert_eq!(config.ws_url, "wss://example.com/chat");
        assert_eq!(config.protocol, Protocol::Legacy);
        assert_eq!(config.greeting, "Hello!");
    }

    #[test]
    fn test_rejects_non_websocket_url() {
        let err = config_from(&[("CHAT_WS_URL", "http://localhost:8000")], false).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl(_)));
    }

    #[test]
    fn test_rejects_unknown_protocol() {
        let err = config_from(&[("CHAT_PROTOCOL", "v3")], false).unwrap_err();
        assert!(matches!(err, ConfigError::Protocol(_)));
    }

    #[test]
    fn test_blank_greeting_uses_default() {
        let config = config_from(&[("CHAT_GREETING", "  ")], false).unwrap();
        assert_eq!(config.greeting, DEFAULT_GREETING);
    }

    #[test]
    fn test_color_detection() {
        assert!(config_from(&[], true).unwrap().color);
        assert!(!config_from(&[("NO_COLOR", "1")], true).unwrap().color);
        assert!(config_from(&[("FORCE_COLOR", "1")], false).unwrap().color);
        assert!(!config_from(&[("NO_COLOR", ""), ("FORCE_COLOR", "1")], true)
            .unwrap()
            .color);
    }
}
