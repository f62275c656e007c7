//! Deployment configuration
//!
//! A deployment document bundles the node configuration with the uplink it
//! should use. The uplink is picked here, at configuration time, instead of
//! being compiled in:
//!
//! ```json
//! {
//!   "node": { "device_id": "AERO-NODE-007", "device_key": "..." },
//!   "transport": { "kind": "http", "endpoint": "https://collector.example/api/readings",
//!                  "api_key": "..." }
//! }
//! ```

use std::time::Duration;

use aeroguard_core::NodeConfig;
use serde::{Deserialize, Serialize};

use crate::ConnectorError;

/// Default MQTT broker port
pub const DEFAULT_MQTT_PORT: u16 = 1883;

/// Default HTTP request timeout, ms
pub const DEFAULT_HTTP_TIMEOUT_MS: u64 = 10_000;

/// MQTT uplink settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MqttConfig {
    /// Broker host name or address
    pub host: String,
    /// Broker port
    pub port: u16,
    /// Client identifier presented to the broker
    pub client_id: String,
    /// Topic readings are published to
    pub topic: String,
    /// Optional broker user name
    pub username: Option<String>,
    /// Password for `username`
    pub password: Option<String>,
    /// Keep-alive interval, s
    pub keep_alive_secs: u64,
    /// How long a publish may wait for the broker's acknowledgement, ms
    pub ack_timeout_ms: u64,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            host: "localhost".into(),
            port: DEFAULT_MQTT_PORT,
            client_id: "aeroguard-node".into(),
            topic: "aeroguard/readings".into(),
            username: None,
            password: None,
            keep_alive_secs: 60,
            ack_timeout_ms: 5_000,
        }
    }
}

impl MqttConfig {
    /// Acknowledgement timeout as a duration
    pub fn ack_timeout(&self) -> Duration {
        Duration::from_millis(self.ack_timeout_ms)
    }
}

/// HTTP(S) uplink settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Full URL readings are POSTed to
    pub endpoint: String,
    /// Value of the `X-API-Key` header
    pub api_key: String,
    /// Request timeout, ms
    pub timeout_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key: String::new(),
            timeout_ms: DEFAULT_HTTP_TIMEOUT_MS,
        }
    }
}

impl HttpConfig {
    /// Request timeout as a duration
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Uplink choice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TransportConfig {
    /// Publish to an MQTT broker
    Mqtt(MqttConfig),
    /// POST to an HTTP collector
    Http(HttpConfig),
}

/// Node configuration plus uplink choice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentConfig {
    /// Pipeline configuration
    #[serde(default)]
    pub node: NodeConfig,
    /// Uplink
    pub transport: TransportConfig,
}

impl DeploymentConfig {
    /// Parse and validate a deployment document.
    pub fn from_json(document: &str) -> Result<Self, ConnectorError> {
        let config: Self = serde_json::from_str(document)?;
        config
            .node
            .validate()
            .map_err(|e| ConnectorError::Config(e.to_string()))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_deployment() {
        let config = DeploymentConfig::from_json(
            r#"{
                "node": { "device_id": "AERO-NODE-007", "device_key": "k" },
                "transport": { "kind": "http", "endpoint": "https://collector.local/readings", "api_key": "abc" }
            }"#,
        )
        .unwrap();

        assert_eq!(config.node.device_id, "AERO-NODE-007");
        assert_eq!(
            config.transport,
            TransportConfig::Http(HttpConfig {
                endpoint: "https://collector.local/readings".into(),
                api_key: "abc".into(),
                timeout_ms: DEFAULT_HTTP_TIMEOUT_MS,
            })
        );
    }

    #[test]
    fn mqtt_defaults_fill_in() {
        let config = DeploymentConfig::from_json(
            r#"{
                "node": { "signing_enabled": false },
                "transport": { "kind": "mqtt", "host": "broker.lan", "topic": "lab/air" }
            }"#,
        )
        .unwrap();

        let TransportConfig::Mqtt(mqtt) = config.transport else {
            panic!("expected mqtt transport");
        };
        assert_eq!(mqtt.host, "broker.lan");
        assert_eq!(mqtt.port, DEFAULT_MQTT_PORT);
        assert_eq!(mqtt.topic, "lab/air");
        assert_eq!(mqtt.ack_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn invalid_node_is_rejected() {
        let err = DeploymentConfig::from_json(
            r#"{ "node": { "device_key": "" }, "transport": { "kind": "http" } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConnectorError::Config(_)));

        let err = DeploymentConfig::from_json(r#"{ "transport": { "kind": "coap" } }"#).unwrap_err();
        assert!(matches!(err, ConnectorError::Parse(_)));
    }
}
