//! Node configuration
//!
//! Everything the pipeline consumes from configuration, in one serde-friendly
//! struct. [`NodeConfig::default`] is the reference node configuration; any
//! field left out of a JSON document keeps its default.
//!
//! ```rust
//! use aeroguard_core::NodeConfig;
//!
//! let mut config = NodeConfig::default();
//! config.device_key = "provisioned-secret".into();
//! assert!(config.validate().is_ok());
//! ```

use alloc::string::{String, ToString};

use serde::{Deserialize, Serialize};

use crate::{
    baseline::check_r0,
    constants::{
        buffers::DEFAULT_MEDIAN_SAMPLES,
        model::DEFAULT_EMA_ALPHA,
        sensors::*,
        time::{
            DEFAULT_FLUSH_DELAY_MS, DEFAULT_SAMPLE_DELAY_MS, DEFAULT_SAMPLING_INTERVAL_MS,
            DEFAULT_WARMUP_MS,
        },
    },
    errors::ConfigurationError,
    reading::SensorField,
    signal::{check_sample_count, EmaFilter},
};

/// Closed interval `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FieldRange {
    /// Lower bound, inclusive
    pub min: f32,
    /// Upper bound, inclusive
    pub max: f32,
}

impl FieldRange {
    /// Interval from bounds
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Whether `value` lies inside the interval. NaN never does.
    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }

    /// Finite bounds with `min <= max`
    pub fn is_well_formed(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min <= self.max
    }

    /// Clamp `value` into the interval.
    pub fn clamp(&self, value: f32) -> f32 {
        value.max(self.min).min(self.max)
    }
}

/// Valid envelope of every range-checked field.
///
/// Gas resistance and altitude have no envelope; they are only checked for
/// being finite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidRanges {
    /// IAQ score
    pub iaq: FieldRange,
    /// CO2-equivalent, ppm
    pub co2_equiv: FieldRange,
    /// Temperature, °C
    pub temperature: FieldRange,
    /// Relative humidity, %
    pub humidity: FieldRange,
    /// Pressure, hPa
    pub pressure: FieldRange,
}

impl ValidRanges {
    /// Envelope of a field, if it has one.
    pub fn for_field(&self, field: SensorField) -> Option<FieldRange> {
        match field {
            SensorField::IaqScore => Some(self.iaq),
            SensorField::Co2Equivalent => Some(self.co2_equiv),
            SensorField::Temperature => Some(self.temperature),
            SensorField::Humidity => Some(self.humidity),
            SensorField::Pressure => Some(self.pressure),
            SensorField::GasResistance | SensorField::Altitude => None,
        }
    }

    /// Reject inverted or non-finite envelopes.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        for field in SensorField::ALL {
            if let Some(range) = self.for_field(field) {
                if !range.is_well_formed() {
                    return Err(ConfigurationError::InvalidRange { field });
                }
            }
        }
        Ok(())
    }
}

impl Default for ValidRanges {
    fn default() -> Self {
        Self {
            iaq: FieldRange::new(IAQ_MIN, IAQ_MAX),
            co2_equiv: FieldRange::new(CO2_EQUIV_MIN_PPM, CO2_EQUIV_MAX_PPM),
            temperature: FieldRange::new(TEMP_MIN_C, TEMP_MAX_C),
            humidity: FieldRange::new(HUMIDITY_MIN_PCT, HUMIDITY_MAX_PCT),
            pressure: FieldRange::new(PRESSURE_MIN_HPA, PRESSURE_MAX_HPA),
        }
    }
}

/// Complete configuration surface of a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Identity reported in every payload
    pub device_id: String,
    /// Firmware version reported in every payload
    pub firmware_version: String,
    /// Gas samples per median window
    pub median_samples: usize,
    /// Pause between consecutive gas samples, ms
    pub sample_delay_ms: u32,
    /// IAQ smoothing factor; the default `1.0` sends the unsmoothed score
    pub ema_alpha: f32,
    /// Per-field valid envelopes
    pub ranges: ValidRanges,
    /// Attach an HMAC-SHA256 signature to payloads
    pub signing_enabled: bool,
    /// Pre-shared signing key
    pub device_key: String,
    /// Clean-air baseline resistance loaded at boot
    pub baseline_r0: f32,
    /// Transducer preheat duration, ms
    pub warmup_ms: u32,
    /// Time between sampling cycles, ms
    pub sampling_interval_ms: u64,
    /// Pause before each record while flushing the offline buffer, ms
    pub flush_delay_ms: u32,
    /// Sea-level reference for altitude, hPa
    pub sea_level_pressure_hpa: f32,
}

impl NodeConfig {
    /// Reject configurations that would make scores meaningless or payloads
    /// unsignable.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        check_r0(self.baseline_r0)?;
        check_sample_count(self.median_samples)?;
        EmaFilter::new(self.ema_alpha)?;
        self.ranges.validate()?;

        if self.signing_enabled && self.device_key.is_empty() {
            return Err(ConfigurationError::MissingDeviceKey);
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration document.
    #[cfg(feature = "std")]
    pub fn from_json(document: &str) -> Result<Self, ConfigLoadError> {
        let config: Self = serde_json::from_str(document)?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            device_id: "AERO-NODE-001".to_string(),
            firmware_version: crate::VERSION.to_string(),
            median_samples: DEFAULT_MEDIAN_SAMPLES,
            sample_delay_ms: DEFAULT_SAMPLE_DELAY_MS,
            ema_alpha: DEFAULT_EMA_ALPHA,
            ranges: ValidRanges::default(),
            signing_enabled: true,
            device_key: String::new(),
            baseline_r0: DEFAULT_BASELINE_R0,
            warmup_ms: DEFAULT_WARMUP_MS,
            sampling_interval_ms: DEFAULT_SAMPLING_INTERVAL_MS,
            flush_delay_ms: DEFAULT_FLUSH_DELAY_MS,
            sea_level_pressure_hpa: SEA_LEVEL_PRESSURE_HPA,
        }
    }
}

/// Loading a configuration document failed.
#[cfg(feature = "std")]
#[derive(thiserror_no_std::Error, Debug)]
pub enum ConfigLoadError {
    /// Not a valid configuration document
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Parsed, but degenerate
    #[error("invalid config: {0}")]
    Invalid(#[from] ConfigurationError),
}
