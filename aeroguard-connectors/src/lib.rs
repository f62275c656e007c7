//! Uplink transports and host adapters for AeroGuard nodes
//!
//! ## Overview
//!
//! The core pipeline only knows the [`Transport`] trait. This crate supplies
//! the concrete links a deployment can choose between, plus the host-side
//! adapters (delay, runtime metadata) needed to run a node on a full OS.
//!
//! ### MQTT
//!
//! Publishes each payload with QoS 1 and waits, bounded by a timeout, for the
//! broker's PUBACK. A send only counts as delivered once the broker has
//! acknowledged it.
//!
//! ### HTTP/HTTPS
//!
//! POSTs each payload as `application/json` with an `X-API-Key` header. Only
//! `200 OK` and `201 Created` count as delivered; every other status, and any
//! network error, is a failed send and the reading goes to the offline buffer.
//!
//! ## Selecting a transport
//!
//! The uplink is a deployment decision, so it comes from configuration rather
//! than from a build flag:
//!
//! ```no_run
//! use aeroguard_connectors::{connect, DeploymentConfig};
//!
//! let deployment = DeploymentConfig::from_json(&std::fs::read_to_string("node.json")?)?;
//! let transport = connect(&deployment.transport)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Both transports are compiled in by default; disabling the `mqtt` or `http`
//! feature removes the client library, and selecting the missing kind at
//! runtime fails with [`ConnectorError::Unsupported`].

#[cfg(not(any(feature = "mqtt", feature = "http")))]
compile_error!("enable at least one of the `mqtt` or `http` features");

#[cfg(feature = "mqtt")]
pub mod mqtt;

#[cfg(feature = "http")]
pub mod http;

pub mod platform;
pub mod settings;

use aeroguard_core::Transport;
use thiserror::Error;

#[cfg(feature = "http")]
pub use http::{HttpError, HttpTransport};
#[cfg(feature = "mqtt")]
pub use mqtt::{MqttError, MqttTransport};
pub use platform::{HostRuntime, StdDelay};
pub use settings::{DeploymentConfig, HttpConfig, MqttConfig, TransportConfig};

/// Common connector errors
#[derive(Debug, Error)]
pub enum ConnectorError {
    /// MQTT link failure
    #[cfg(feature = "mqtt")]
    #[error("MQTT: {0}")]
    Mqtt(#[from] MqttError),

    /// HTTP link failure
    #[cfg(feature = "http")]
    #[error("HTTP: {0}")]
    Http(#[from] HttpError),

    /// Malformed deployment document
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Well-formed but unusable configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Transport kind not compiled into this build
    #[error("Transport `{0}` not enabled in this build")]
    Unsupported(&'static str),
}

/// Whichever transport the deployment selected.
pub enum AnyTransport {
    /// MQTT broker link
    #[cfg(feature = "mqtt")]
    Mqtt(MqttTransport),
    /// HTTP collector link
    #[cfg(feature = "http")]
    Http(HttpTransport),
}

impl AnyTransport {
    /// Short name of the active transport
    pub fn kind(&self) -> &'static str {
        match self {
            #[cfg(feature = "mqtt")]
            Self::Mqtt(_) => "mqtt",
            #[cfg(feature = "http")]
            Self::Http(_) => "http",
        }
    }
}

impl Transport for AnyTransport {
    type Error = ConnectorError;

    fn send(&mut self, payload: &[u8]) -> Result<(), Self::Error> {
        match self {
            #[cfg(feature = "mqtt")]
            Self::Mqtt(link) => link.send(payload).map_err(ConnectorError::from),
            #[cfg(feature = "http")]
            Self::Http(link) => link.send(payload).map_err(ConnectorError::from),
        }
    }

    fn is_connected(&self) -> bool {
        match self {
            #[cfg(feature = "mqtt")]
            Self::Mqtt(link) => link.is_connected(),
            #[cfg(feature = "http")]
            Self::Http(link) => link.is_connected(),
        }
    }
}

/// Build the transport a deployment asks for.
pub fn connect(config: &TransportConfig) -> Result<AnyTransport, ConnectorError> {
    let transport = match config {
        #[cfg(feature = "mqtt")]
        TransportConfig::Mqtt(mqtt) => AnyTransport::Mqtt(MqttTransport::new(mqtt)?),
        #[cfg(not(feature = "mqtt"))]
        TransportConfig::Mqtt(_) => return Err(ConnectorError::Unsupported("mqtt")),

        #[cfg(feature = "http")]
        TransportConfig::Http(http) => AnyTransport::Http(HttpTransport::new(http)?),
        #[cfg(not(feature = "http"))]
        TransportConfig::Http(_) => return Err(ConnectorError::Unsupported("http")),
    };

    log::info!("Uplink selected: {}", transport.kind());
    Ok(transport)
}
