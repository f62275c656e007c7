//! HTTP/HTTPS uplink
//!
//! Each payload is one blocking POST through a [`ureq::Agent`] whose timeout
//! bounds the whole request. The collector acknowledges with `200` or `201`;
//! anything else is treated as a failed send so the reading gets buffered.

use std::time::Duration;

use aeroguard_core::Transport;
use thiserror::Error;

use crate::settings::HttpConfig;

/// HTTP-specific errors
#[derive(Debug, Error)]
pub enum HttpError {
    /// Network-level failure (DNS, refused, TLS, timeout)
    #[error("Request failed: {0}")]
    Request(String),

    /// Collector answered with a status other than 200/201
    #[error("Unexpected status {status}")]
    Status {
        /// HTTP status code
        status: u16,
    },

    /// Unusable endpoint configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Map a response status to a delivery result.
pub fn accept_status(status: u16) -> Result<(), HttpError> {
    match status {
        200 | 201 => Ok(()),
        status => Err(HttpError::Status { status }),
    }
}

/// POSTs payloads to a collector endpoint.
pub struct HttpTransport {
    endpoint: String,
    api_key: String,
    timeout: Duration,
    agent: ureq::Agent,
    last_send_ok: bool,
}

impl HttpTransport {
    /// Create a transport for the configured endpoint.
    pub fn new(config: &HttpConfig) -> Result<Self, HttpError> {
        if !config.endpoint.starts_with("http://") && !config.endpoint.starts_with("https://") {
            return Err(HttpError::Config(
                "Endpoint must start with http:// or https://".into(),
            ));
        }
        if config.timeout_ms == 0 {
            return Err(HttpError::Config("Timeout must be non-zero".into()));
        }

        let agent = ureq::AgentBuilder::new()
            .timeout(config.timeout())
            .user_agent(&format!("AeroGuard/{}", env!("CARGO_PKG_VERSION")))
            .build();

        Ok(Self {
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            timeout: config.timeout(),
            agent,
            last_send_ok: false,
        })
    }

    /// Collector URL
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Per-request timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn post(&self, payload: &[u8]) -> Result<(), HttpError> {
        let response = self
            .agent
            .post(&self.endpoint)
            .set("Content-Type", "application/json")
            .set("X-API-Key", &self.api_key)
            .send_bytes(payload);

        match response {
            Ok(resp) => accept_status(resp.status()),
            Err(ureq::Error::Status(code, _)) => Err(HttpError::Status { status: code }),
            Err(ureq::Error::Transport(e)) => Err(HttpError::Request(e.to_string())),
        }
    }
}

impl Transport for HttpTransport {
    type Error = HttpError;

    fn send(&mut self, payload: &[u8]) -> Result<(), Self::Error> {
        let result = self.post(payload);
        self.last_send_ok = result.is_ok();

        if let Err(e) = &result {
            log::warn!("POST {} failed: {}", self.endpoint, e);
        }
        result
    }

    // stateless protocol: "connected" means the last request got through
    fn is_connected(&self) -> bool {
        self.last_send_ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(endpoint: &str) -> HttpConfig {
        HttpConfig {
            endpoint: endpoint.into(),
            api_key: "test-key".into(),
            timeout_ms: 2_000,
        }
    }

    #[test]
    fn only_ok_and_created_are_accepted() {
        assert!(accept_status(200).is_ok());
        assert!(accept_status(201).is_ok());

        for status in [202, 204, 301, 400, 401, 404, 429, 500, 503] {
            assert!(
                matches!(accept_status(status), Err(HttpError::Status { status: s }) if s == status),
                "status {} accepted",
                status
            );
        }
    }

    #[test]
    fn test_url_validation() {
        assert!(matches!(HttpTransport::new(&config("not-a-url")), Err(HttpError::Config(_))));
        assert!(matches!(
            HttpTransport::new(&config("ftp://collector.local")),
            Err(HttpError::Config(_))
        ));

        let link = HttpTransport::new(&config("https://collector.local/readings")).unwrap();
        assert_eq!(link.endpoint(), "https://collector.local/readings");
        assert_eq!(link.timeout(), Duration::from_secs(2));
        assert!(!link.is_connected());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let cfg = HttpConfig {
            timeout_ms: 0,
            ..config("http://collector.local")
        };
        assert!(matches!(HttpTransport::new(&cfg), Err(HttpError::Config(_))));
    }

    #[test]
    fn unreachable_collector_is_a_failed_send() {
        let mut link = HttpTransport::new(&config("http://127.0.0.1:1/readings")).unwrap();

        let result = link.send(br#"{"device_id":"AERO-TEST-01"}"#);

        assert!(matches!(result, Err(HttpError::Request(_))));
        assert!(!link.is_connected());
    }
}
