//! Application configuration.
//!
//! Defaults are compiled in. The server settings can be overridden from the
//! environment (or a `.env` file) with `MECGEN_PORT` and
//! `MECGEN_MAX_UPLOAD_BYTES`.

use std::env;

/// Default HTTP port for `mecgen serve`.
pub const DEFAULT_PORT: u16 = 3000;

/// Maximum accepted upload size (in bytes).
///
/// 20 MB limit.
pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// File name suggested for generated documents.
pub const DEFAULT_OUTPUT_FILE: &str = "MEC_Metadata.xml";

/// Capacity of the log broadcast channel.
pub const LOG_CHANNEL_CAPACITY: usize = 100;

/// Runtime settings for the HTTP server.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub port: u16,
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            max_upload_bytes: MAX_UPLOAD_BYTES,
        }
    }
}

impl ServerConfig {
    /// Build from environment variables, loading `.env` first.
    ///
    /// Unset or unparsable values keep their defaults.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            port: lookup("MECGEN_PORT")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.port),
            max_upload_bytes: lookup("MECGEN_MAX_UPLOAD_BYTES")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.max_upload_bytes),
        }
    }

    /// Override the port (CLI flag wins over the environment).
    pub fn with_port(mut self, port: Option<u16>) -> Self {
        if let Some(port) = port {
            self.port = port;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_unset() {
        let config = ServerConfig::from_lookup(|_| None);
        assert_eq!(config, ServerConfig::default());
    }

    #[test]
    fn test_values_from_lookup() {
        let config = ServerConfig::from_lookup(|key| match key {
            "MECGEN_PORT" => Some("8080".to_string()),
            "MECGEN_MAX_UPLOAD_BYTES" => Some(" 1024 ".to_string()),
            _ => None,
        });
        assert_eq!(config.port, 8080);
        assert_eq!(config.max_upload_bytes, 1024);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = ServerConfig::from_lookup(|_| Some("lots".to_string()));
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.max_upload_bytes, MAX_UPLOAD_BYTES);
    }

    #[test]
    fn test_cli_port_override() {
        let config = ServerConfig::default().with_port(Some(9000));
        assert_eq!(config.port, 9000);
        let config = ServerConfig::default().with_port(None);
        assert_eq!(config.port, DEFAULT_PORT);
    }
}
