//! MQTT uplink
//!
//! Built on the blocking [`rumqttc::Client`]. A send enqueues one QoS 1
//! publish and then drives the connection's event loop until the broker's
//! PUBACK for that publish arrives, the connection fails, or the
//! acknowledgement timeout runs out. The event loop reconnects on its own on
//! the next send.
//!
//! Acknowledgements are matched by packet id. A publish that timed out stays
//! in flight inside the client; its late PUBACK may show up during a later
//! send and is discarded there, so it can never complete the wrong send.

use std::time::{Duration, Instant};

use aeroguard_core::Transport;
use rumqttc::{Client, Connection, Event, MqttOptions, Outgoing, Packet, QoS};
use thiserror::Error;

use crate::settings::MqttConfig;

/// Capacity of the client's request queue
const REQUEST_QUEUE_CAPACITY: usize = 10;

/// MQTT-specific errors
#[derive(Debug, Error)]
pub enum MqttError {
    /// Publish could not be queued
    #[error("Client error: {0}")]
    Client(String),

    /// Broker connection failed
    #[error("Connection error: {0}")]
    Connection(String),

    /// No PUBACK within the configured window
    #[error("No acknowledgement within {0} ms")]
    Timeout(u64),

    /// Unusable broker configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

/// What an event loop event means for the publish being awaited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AckStep {
    /// Keep polling
    Pending,
    /// Broker accepted the session
    Connected,
    /// The awaited publish was acknowledged
    Acked,
}

/// Matches PUBACKs to the publish of the current send.
#[derive(Debug, Default)]
struct AckTracker {
    /// Packet id of the current send, once the client has written it
    awaiting: Option<u16>,
    /// Packet ids of earlier sends that gave up waiting, oldest first
    abandoned: Vec<u16>,
}

impl AckTracker {
    /// Start tracking a freshly queued publish.
    fn begin(&mut self) {
        self.awaiting = None;
    }

    fn observe(&mut self, event: &Event) -> AckStep {
        match event {
            Event::Incoming(Packet::ConnAck(_)) => AckStep::Connected,
            Event::Outgoing(Outgoing::Publish(pkid)) => {
                // retransmissions of abandoned publishes are not ours
                if self.awaiting.is_none() && !self.abandoned.contains(pkid) {
                    self.awaiting = Some(*pkid);
                }
                AckStep::Pending
            }
            Event::Incoming(Packet::PubAck(ack)) => {
                if self.awaiting == Some(ack.pkid) {
                    self.awaiting = None;
                    return AckStep::Acked;
                }
                if let Some(pos) = self.abandoned.iter().position(|p| *p == ack.pkid) {
                    self.abandoned.remove(pos);
                }
                log::debug!("Discarding stale PUBACK for packet {}", ack.pkid);
                AckStep::Pending
            }
            _ => AckStep::Pending,
        }
    }

    /// Give up on the current send.
    fn abandon(&mut self) {
        if let Some(pkid) = self.awaiting.take() {
            if self.abandoned.len() == REQUEST_QUEUE_CAPACITY {
                self.abandoned.remove(0);
            }
            self.abandoned.push(pkid);
        }
    }
}

/// Publishes payloads to a broker topic.
pub struct MqttTransport {
    client: Client,
    connection: Connection,
    topic: String,
    ack_timeout: Duration,
    connected: bool,
    acks: AckTracker,
}

impl MqttTransport {
    /// Create a client for the configured broker.
    ///
    /// No network traffic happens until the first send.
    pub fn new(config: &MqttConfig) -> Result<Self, MqttError> {
        if config.host.is_empty() {
            return Err(MqttError::Config("Broker host is empty".into()));
        }
        if config.topic.is_empty() {
            return Err(MqttError::Config("Topic is empty".into()));
        }
        // rumqttc panics on these
        if config.client_id.is_empty() || config.client_id.starts_with(' ') {
            return Err(MqttError::Config("Invalid client id".into()));
        }
        if config.keep_alive_secs == 0 || config.ack_timeout_ms == 0 {
            return Err(MqttError::Config(
                "Keep-alive and acknowledgement timeout must be non-zero".into(),
            ));
        }

        let mut options = MqttOptions::new(&config.client_id, &config.host, config.port);
        options.set_keep_alive(Duration::from_secs(config.keep_alive_secs));
        if let Some(username) = &config.username {
            options.set_credentials(username, config.password.as_deref().unwrap_or_default());
        }

        let (client, connection) = Client::new(options, REQUEST_QUEUE_CAPACITY);

        Ok(Self {
            client,
            connection,
            topic: config.topic.clone(),
            ack_timeout: config.ack_timeout(),
            connected: false,
            acks: AckTracker::default(),
        })
    }

    /// Topic readings are published to
    pub fn topic(&self) -> &str {
        &self.topic
    }

    fn await_ack(&mut self) -> Result<(), MqttError> {
        let deadline = Instant::now() + self.ack_timeout;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(MqttError::Timeout(self.ack_timeout.as_millis() as u64));
            }

            match self.connection.recv_timeout(remaining) {
                Ok(Ok(event)) => match self.acks.observe(&event) {
                    AckStep::Connected => {
                        log::debug!("Broker session established");
                        self.connected = true;
                    }
                    AckStep::Acked => {
                        self.connected = true;
                        return Ok(());
                    }
                    AckStep::Pending => {}
                },
                Ok(Err(e)) => {
                    self.connected = false;
                    return Err(MqttError::Connection(e.to_string()));
                }
                Err(_) => return Err(MqttError::Timeout(self.ack_timeout.as_millis() as u64)),
            }
        }
    }
}

impl Transport for MqttTransport {
    type Error = MqttError;

    fn send(&mut self, payload: &[u8]) -> Result<(), Self::Error> {
        self.client
            .try_publish(self.topic.as_str(), QoS::AtLeastOnce, false, payload.to_vec())
            .map_err(|e| MqttError::Client(e.to_string()))?;

        self.acks.begin();
        let result = self.await_ack();
        if let Err(e) = &result {
            self.acks.abandon();
            log::warn!("Publish to {} failed: {}", self.topic, e);
        }
        result
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}
