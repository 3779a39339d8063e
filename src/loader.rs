use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::transport::TransportOptions;
use crate::types::{PushError, DEFAULT_SERVER};

/// Client settings as stored in a JSON config file.
///
/// ```json
/// {"deviceKeys": ["abc123"], "server": "bark.example.com", "transport": {"verifyTls": false}}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    #[serde(default)]
    pub device_keys: Vec<String>,
    #[serde(default = "default_server")]
    pub server: String,
    #[serde(default)]
    pub transport: TransportOptions,
}

fn default_server() -> String {
    DEFAULT_SERVER.into()
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            device_keys: Vec::new(),
            server: default_server(),
            transport: TransportOptions::default(),
        }
    }
}

/// Load client settings from a JSON file on disk.
pub fn load_config(path: impl AsRef<Path>) -> Result<ClientConfig, PushError> {
    let path = path.as_ref();
    let data = std::fs::read(path).map_err(|e| {
        tracing::error!(path = %path.display(), "load push config: {}", e);
        e
    })?;
    parse_config(&data)
}

/// Parse client settings from raw JSON bytes.
pub fn parse_config(data: &[u8]) -> Result<ClientConfig, PushError> {
    let mut config: ClientConfig = serde_json::from_slice(data)?;

    let before = config.device_keys.len();
    config.device_keys.retain(|k| !k.is_empty());
    if config.device_keys.len() != before {
        tracing::warn!(dropped = before - config.device_keys.len(), "ignoring empty device keys");
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ErrorKind;

    #[test]
    fn test_parse_config() {
        let json = r#"{"deviceKeys":["abc","","def"],"server":"bark.example.com","transport":{"connectTimeoutMs":1000}}"#;
        let config = parse_config(json.as_bytes()).unwrap();
        assert_eq!(config.device_keys, vec!["abc", "def"]);
        assert_eq!(config.server, "bark.example.com");
        assert_eq!(config.transport.connect_timeout_ms, 1_000);
        assert_eq!(config.transport.total_timeout_ms, 10_000);
        assert!(config.transport.verify_tls);
    }

    #[test]
    fn test_parse_config_defaults() {
        let config = parse_config(b"{}").unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.server, DEFAULT_SERVER);
    }

    #[test]
    fn test_load_config_missing_file() {
        let err = load_config("/nonexistent/barkpush.json").unwrap_err();
        assert!(matches!(err, PushError::Io(_)));
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn test_parse_config_malformed() {
        let err = parse_config(b"{not valid json").unwrap_err();
        assert!(matches!(err, PushError::Json(_)));
    }

    #[test]
    fn test_client_from_config() {
        let config = parse_config(br#"{"deviceKeys":["k1"],"server":"http://localhost:8080"}"#).unwrap();
        let client = crate::PushClient::from_config(config).unwrap();
        assert_eq!(client.endpoint(), "http://localhost:8080/push");
        assert_eq!(client.device_keys(), ["k1"]);
    }
}
