//! Payload schema and signing
//!
//! ## Wire Format
//!
//! One JSON object per reading, keys in this exact order:
//!
//! ```text
//! {
//!   "device_id": "AERO-NODE-001",
//!   "firmware_version": "0.1.0",
//!   "timestamp": 1700000000,
//!   "sensors": { "mq135_raw", "iaq_score", "co2_equiv", "temperature",
//!                "humidity", "pressure_hpa", "altitude_m" },
//!   "meta": { "uptime_ms", "rssi", "free_heap" },
//!   "signature": "<64 lowercase hex chars>"        // only when signing
//! }
//! ```
//!
//! ## Signing Order
//!
//! The HMAC-SHA256 tag is computed over the serialization **without** the
//! `signature` key, then the key is appended as the last member. A verifier
//! strips `signature`, re-serializes, and recomputes. Because serialization
//! is deterministic (fixed key order, shortest round-trip float formatting)
//! the receiver reconstructs the signed bytes exactly.
//!
//! ```rust
//! use aeroguard_core::payload::{verify_signed_payload, PayloadBuilder, PayloadSigner, RuntimeMeta};
//! use aeroguard_core::{Measurements, Reading};
//!
//! let reading = Reading::new(
//!     Measurements {
//!         gas_resistance_raw: 10.1,
//!         iaq_score: 78.4,
//!         co2_equivalent_ppm: 300.0,
//!         temperature_c: 25.0,
//!         humidity_pct: 40.0,
//!         pressure_hpa: 1013.25,
//!         altitude_m: 0.0,
//!     },
//!     1_700_000_000,
//!     true,
//! );
//!
//! let builder = PayloadBuilder::new("AERO-NODE-001", "0.1.0", Some(PayloadSigner::new(b"key")));
//! let bytes = builder.build(&reading, RuntimeMeta::default())?;
//!
//! let document = verify_signed_payload(&bytes, b"key")?;
//! assert_eq!(document.timestamp, 1_700_000_000);
//! # Ok::<(), aeroguard_core::PayloadError>(())
//! ```

use alloc::{borrow::Cow, string::String, vec::Vec};

use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::{
    config::NodeConfig,
    errors::{ConfigurationError, PayloadError},
    reading::{Measurements, Reading},
    time::Timestamp,
    traits::RuntimeInfo,
};

type HmacSha256 = Hmac<Sha256>;

/// Hex characters in a signature
pub const SIGNATURE_HEX_LEN: usize = 64;

/// `sensors` object of the payload
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorBlock {
    /// Median gas-sensor resistance
    pub mq135_raw: f32,
    /// IAQ score
    pub iaq_score: f32,
    /// CO2-equivalent, ppm
    pub co2_equiv: f32,
    /// Temperature, °C
    pub temperature: f32,
    /// Relative humidity, %
    pub humidity: f32,
    /// Pressure, hPa
    pub pressure_hpa: f32,
    /// Altitude, m
    pub altitude_m: f32,
}

impl From<&Measurements> for SensorBlock {
    fn from(m: &Measurements) -> Self {
        Self {
            mq135_raw: m.gas_resistance_raw,
            iaq_score: m.iaq_score,
            co2_equiv: m.co2_equivalent_ppm,
            temperature: m.temperature_c,
            humidity: m.humidity_pct,
            pressure_hpa: m.pressure_hpa,
            altitude_m: m.altitude_m,
        }
    }
}

/// `meta` object of the payload
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeMeta {
    /// Milliseconds since boot
    pub uptime_ms: u64,
    /// Uplink signal strength, dBm
    pub rssi: i32,
    /// Free heap, bytes
    pub free_heap: u32,
}

impl RuntimeMeta {
    /// Snapshot the runtime state.
    pub fn capture<R: RuntimeInfo + ?Sized>(runtime: &R) -> Self {
        Self {
            uptime_ms: runtime.uptime_ms(),
            rssi: runtime.rssi(),
            free_heap: runtime.free_heap(),
        }
    }
}

/// One payload document.
///
/// Borrows the device identity while building; owns it only when parsed
/// from escaped input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignedPayload<'a> {
    /// Device identity
    #[serde(borrow)]
    pub device_id: Cow<'a, str>,
    /// Firmware version
    #[serde(borrow)]
    pub firmware_version: Cow<'a, str>,
    /// Reading time, seconds since the Unix epoch
    pub timestamp: Timestamp,
    /// Sensor field set
    pub sensors: SensorBlock,
    /// Runtime metadata
    pub meta: RuntimeMeta,
    /// Lowercase hex HMAC-SHA256 over the document without this field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

impl SignedPayload<'_> {
    /// Canonical bytes of the document without its signature.
    pub fn unsigned_bytes(&self) -> Result<Vec<u8>, PayloadError> {
        let unsigned = SignedPayload {
            device_id: Cow::Borrowed(&*self.device_id),
            firmware_version: Cow::Borrowed(&*self.firmware_version),
            timestamp: self.timestamp,
            sensors: self.sensors,
            meta: self.meta,
            signature: None,
        };
        serde_json::to_vec(&unsigned).map_err(|_| PayloadError::Serialize)
    }
}

/// HMAC-SHA256 with a pre-shared device key.
#[derive(Clone, PartialEq, Eq)]
pub struct PayloadSigner {
    key: Vec<u8>,
}

impl PayloadSigner {
    /// Signer for `key`
    pub fn new(key: &[u8]) -> Self {
        Self { key: key.to_vec() }
    }

    fn mac(&self) -> Result<HmacSha256, PayloadError> {
        HmacSha256::new_from_slice(&self.key).map_err(|_| PayloadError::InvalidKey)
    }

    /// Lowercase hex tag over `message`.
    pub fn sign(&self, message: &[u8]) -> Result<String, PayloadError> {
        let mut mac = self.mac()?;
        mac.update(message);
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    /// Check a hex tag in constant time.
    pub fn verify(&self, message: &[u8], signature_hex: &str) -> Result<(), PayloadError> {
        let tag = hex::decode(signature_hex).map_err(|_| PayloadError::SignatureMismatch)?;
        let mut mac = self.mac()?;
        mac.update(message);
        mac.verify_slice(&tag).map_err(|_| PayloadError::SignatureMismatch)
    }
}

impl core::fmt::Debug for PayloadSigner {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        // never print the key
        f.debug_struct("PayloadSigner").field("key_len", &self.key.len()).finish()
    }
}

/// Serializes valid readings into signed payloads.
#[derive(Debug, Clone)]
pub struct PayloadBuilder {
    device_id: String,
    firmware_version: String,
    signer: Option<PayloadSigner>,
}

impl PayloadBuilder {
    /// Builder for one device identity.
    pub fn new(
        device_id: impl Into<String>,
        firmware_version: impl Into<String>,
        signer: Option<PayloadSigner>,
    ) -> Self {
        Self {
            device_id: device_id.into(),
            firmware_version: firmware_version.into(),
            signer,
        }
    }

    /// Builder from node configuration.
    pub fn from_config(config: &NodeConfig) -> Result<Self, ConfigurationError> {
        let signer = if config.signing_enabled {
            if config.device_key.is_empty() {
                return Err(ConfigurationError::MissingDeviceKey);
            }
            Some(PayloadSigner::new(config.device_key.as_bytes()))
        } else {
            None
        };

        Ok(Self::new(config.device_id.clone(), config.firmware_version.clone(), signer))
    }

    /// Whether payloads get a signature
    pub fn is_signing(&self) -> bool {
        self.signer.is_some()
    }

    /// Unsigned document for a reading.
    pub fn document<'a>(&'a self, reading: &Reading, meta: RuntimeMeta) -> SignedPayload<'a> {
        SignedPayload {
            device_id: Cow::Borrowed(self.device_id.as_str()),
            firmware_version: Cow::Borrowed(self.firmware_version.as_str()),
            timestamp: reading.timestamp(),
            sensors: SensorBlock::from(reading.measurements()),
            meta,
            signature: None,
        }
    }

    /// Serialize a reading, signing it when a key is configured.
    ///
    /// Invalid readings are refused.
    pub fn build(&self, reading: &Reading, meta: RuntimeMeta) -> Result<Vec<u8>, PayloadError> {
        if !reading.is_valid() {
            return Err(PayloadError::InvalidReading);
        }

        let mut document = self.document(reading, meta);
        let unsigned = serde_json::to_vec(&document).map_err(|_| PayloadError::Serialize)?;

        let Some(signer) = &self.signer else {
            return Ok(unsigned);
        };

        document.signature = Some(signer.sign(&unsigned)?);
        serde_json::to_vec(&document).map_err(|_| PayloadError::Serialize)
    }
}

/// Parse a signed payload and check its signature against `key`.
///
/// Returns the verified document.
pub fn verify_signed_payload<'a>(bytes: &'a [u8], key: &[u8]) -> Result<SignedPayload<'a>, PayloadError> {
    let document: SignedPayload<'a> =
        serde_json::from_slice(bytes).map_err(|_| PayloadError::Malformed)?;

    let signature = document.signature.as_deref().ok_or(PayloadError::MissingSignature)?;
    if signature.len() != SIGNATURE_HEX_LEN {
        return Err(PayloadError::SignatureMismatch);
    }

    PayloadSigner::new(key).verify(&document.unsigned_bytes()?, signature)?;
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(valid: bool) -> Reading {
        Reading::new(
            Measurements {
                gas_resistance_raw: 10.1,
                iaq_score: 78.4,
                co2_equivalent_ppm: 300.0,
                temperature_c: 25.0,
                humidity_pct: 40.0,
                pressure_hpa: 1013.25,
                altitude_m: 0.0,
            },
            1_700_000_000,
            valid,
        )
    }

    fn meta() -> RuntimeMeta {
        RuntimeMeta {
            uptime_ms: 120_000,
            rssi: -61,
            free_heap: 180_000,
        }
    }

    const UNSIGNED: &str = concat!(
        r#"{"device_id":"AERO-NODE-001","firmware_version":"1.0.0","timestamp":1700000000,"#,
        r#""sensors":{"mq135_raw":10.1,"iaq_score":78.4,"co2_equiv":300.0,"temperature":25.0,"#,
        r#""humidity":40.0,"pressure_hpa":1013.25,"altitude_m":0.0},"#,
        r#""meta":{"uptime_ms":120000,"rssi":-61,"free_heap":180000}}"#,
    );

    #[test]
    fn unsigned_layout_is_exact() {
        let builder = PayloadBuilder::new("AERO-NODE-001", "1.0.0", None);
        let bytes = builder.build(&reading(true), meta()).unwrap();
        assert_eq!(core::str::from_utf8(&bytes).unwrap(), UNSIGNED);
    }

    #[test]
    fn signature_is_appended_after_signing() {
        let signer = PayloadSigner::new(b"device-key");
        let builder = PayloadBuilder::new("AERO-NODE-001", "1.0.0", Some(signer.clone()));

        let bytes = builder.build(&reading(true), meta()).unwrap();
        let text = core::str::from_utf8(&bytes).unwrap();

        let expected_sig = signer.sign(UNSIGNED.as_bytes()).unwrap();
        assert_eq!(expected_sig.len(), SIGNATURE_HEX_LEN);
        assert!(expected_sig.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));

        let prefix = &UNSIGNED[..UNSIGNED.len() - 1];
        assert!(text.starts_with(prefix));
        assert!(text.ends_with(&alloc::format!(r#","signature":"{}"}}"#, expected_sig)));
    }

    #[test]
    fn verification_round_trip() {
        let builder = PayloadBuilder::new("AERO-NODE-001", "1.0.0", Some(PayloadSigner::new(b"k1")));
        let bytes = builder.build(&reading(true), meta()).unwrap();

        let document = verify_signed_payload(&bytes, b"k1").unwrap();
        assert_eq!(document.device_id, "AERO-NODE-001");
        assert_eq!(document.sensors.iaq_score, 78.4);

        assert_eq!(verify_signed_payload(&bytes, b"k2"), Err(PayloadError::SignatureMismatch));
    }

    #[test]
    fn single_byte_mutation_breaks_signature() {
        let signer = PayloadSigner::new(b"device-key");
        let original = signer.sign(UNSIGNED.as_bytes()).unwrap();

        let mut mutated = UNSIGNED.as_bytes().to_vec();
        let pos = UNSIGNED.find("78.4").unwrap();
        mutated[pos] = b'9';
        assert_ne!(signer.sign(&mutated).unwrap(), original);

        let builder = PayloadBuilder::new("AERO-NODE-001", "1.0.0", Some(signer));
        let mut bytes = builder.build(&reading(true), meta()).unwrap();
        let pos = bytes.windows(4).position(|w| w == b"78.4").unwrap();
        bytes[pos] = b'9';
        assert_eq!(verify_signed_payload(&bytes, b"device-key"), Err(PayloadError::SignatureMismatch));
    }

    #[test]
    fn invalid_reading_is_refused() {
        let builder = PayloadBuilder::new("AERO-NODE-001", "1.0.0", None);
        assert_eq!(builder.build(&reading(false), meta()), Err(PayloadError::InvalidReading));
    }

    #[test]
    fn unsigned_or_garbage_documents() {
        assert_eq!(verify_signed_payload(UNSIGNED.as_bytes(), b"k"), Err(PayloadError::MissingSignature));
        assert_eq!(verify_signed_payload(b"not json", b"k"), Err(PayloadError::Malformed));
    }

    #[test]
    fn builder_from_config() {
        let mut config = NodeConfig::default();
        assert_eq!(
            PayloadBuilder::from_config(&config).unwrap_err(),
            ConfigurationError::MissingDeviceKey
        );

        config.device_key = "secret".into();
        assert!(PayloadBuilder::from_config(&config).unwrap().is_signing());

        config.signing_enabled = false;
        assert!(!PayloadBuilder::from_config(&config).unwrap().is_signing());
    }

    #[test]
    fn signer_debug_hides_key() {
        let text = alloc::format!("{:?}", PayloadSigner::new(b"hunter2"));
        assert!(!text.contains("hunter2"));
    }
}
