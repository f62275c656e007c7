//! Error Types for the Measurement and Delivery Pipeline
//!
//! ## Design Philosophy
//!
//! Errors here are returned from the sampling hot path and stored in
//! validation reports, so they follow the same rules as the data they describe:
//!
//! 1. **No Heap Allocation**: context is numeric or `&'static str`.
//! 2. **Copy Semantics**: every core error is `Copy` and cheap to return.
//! 3. **Recoverability is encoded in the type**, not in a severity flag.
//!
//! ## Taxonomy
//!
//! | Type                  | Raised by                        | Recovery                       |
//! |-----------------------|----------------------------------|--------------------------------|
//! | `AcquisitionError`    | transducer reads                 | reading marked invalid         |
//! | `RangeViolation`      | `ReadingValidator`               | reading marked invalid         |
//! | `ConfigurationError`  | conditioner, scorer, config      | surfaced to the caller         |
//! | `DeliveryError`       | `DeliveryManager`                | reading buffered for retry     |
//! | `PayloadError`        | `PayloadBuilder`, verification   | reading dropped                |
//!
//! Buffer overflow is not an error: a full offline buffer evicts its oldest
//! entry and carries on.
//!
//! ```rust
//! use aeroguard_core::{ConfigurationError, CalibrationBaseline};
//!
//! match CalibrationBaseline::new(0.0) {
//!     Err(ConfigurationError::NonPositiveBaseline { r0 }) => assert_eq!(r0, 0.0),
//!     other => panic!("unexpected {:?}", other),
//! }
//! ```

use core::fmt;

use thiserror_no_std::Error;

use crate::reading::SensorField;

/// A physical sensor read failed or produced a value that is not a number.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AcquisitionError {
    /// The transducer did not answer or reported a fault
    #[error("{sensor} read failed")]
    ReadFailed {
        /// Sensor channel name
        sensor: &'static str,
    },

    /// The transducer answered with NaN or infinity
    #[error("{sensor} returned a non-finite value")]
    NotANumber {
        /// Sensor channel name
        sensor: &'static str,
    },

    /// Divider voltage at or below zero, resistance is undefined
    #[error("divider voltage {voltage} V cannot be converted to resistance")]
    DividerVoltage {
        /// Measured voltage at the ADC pin
        voltage: f32,
    },
}

/// A field lies outside its configured closed interval.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[error("{field} = {value} outside [{min}, {max}]")]
pub struct RangeViolation {
    /// Offending field
    pub field: SensorField,
    /// Measured value
    pub value: f32,
    /// Lower bound of the configured interval
    pub min: f32,
    /// Upper bound of the configured interval
    pub max: f32,
}

/// One entry of a validation report.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Violation {
    /// A sensor channel failed during acquisition
    #[error("acquisition: {0}")]
    Acquisition(AcquisitionError),

    /// A field carries no usable value (NaN or infinity)
    #[error("{field} missing")]
    Missing {
        /// Field without a value
        field: SensorField,
    },

    /// A field is outside its envelope
    #[error("{0}")]
    Range(RangeViolation),
}

/// Degenerate configuration or calibration that would make scores meaningless.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigurationError {
    /// Baseline resistance is zero, negative or not finite
    #[error("baseline r0 must be positive and finite, got {r0}")]
    NonPositiveBaseline {
        /// Rejected baseline
        r0: f32,
    },

    /// Resistance ratio is zero, negative or not finite
    #[error("resistance ratio {ratio} is not a positive finite number")]
    DegenerateRatio {
        /// Rejected ratio
        ratio: f32,
    },

    /// Median window size outside `1..=max`
    #[error("median window of {count} samples outside 1..={max}")]
    InvalidSampleCount {
        /// Requested or supplied sample count
        count: usize,
        /// Largest supported window
        max: usize,
    },

    /// EMA factor outside `(0, 1]`
    #[error("EMA smoothing factor {alpha} outside (0, 1]")]
    InvalidSmoothingFactor {
        /// Rejected factor
        alpha: f32,
    },

    /// Configured interval has `min > max` or non-finite bounds
    #[error("valid range for {field} is inverted or non-finite")]
    InvalidRange {
        /// Field whose interval is broken
        field: SensorField,
    },

    /// Ambient value handed to compensation is not finite
    #[error("ambient {quantity} is not finite")]
    NonFiniteAmbient {
        /// `"temperature"` or `"humidity"`
        quantity: &'static str,
    },

    /// Payload signing enabled without a device key
    #[error("payload signing enabled without a device key")]
    MissingDeviceKey,
}

/// Building, signing or verifying a payload failed.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PayloadError {
    /// Only valid readings are serialized
    #[error("reading is marked invalid")]
    InvalidReading,

    /// Serializer rejected the document
    #[error("payload serialization failed")]
    Serialize,

    /// Key rejected by the MAC implementation
    #[error("signing key rejected")]
    InvalidKey,

    /// Document could not be parsed back
    #[error("payload is malformed")]
    Malformed,

    /// Document carries no signature field
    #[error("payload carries no signature")]
    MissingSignature,

    /// Signature does not match the unsigned serialization
    #[error("payload signature mismatch")]
    SignatureMismatch,
}

/// A single transmission attempt failed.
///
/// Generic over the transport's own error type so connector details reach the
/// logs without the core depending on any client library.
#[derive(Debug, Clone, PartialEq)]
pub enum DeliveryError<E> {
    /// The reading could not be turned into a payload
    Payload(PayloadError),
    /// The transport reported failure or timed out
    Transport(E),
}

impl<E: fmt::Display> fmt::Display for DeliveryError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Payload(err) => write!(f, "payload: {}", err),
            Self::Transport(err) => write!(f, "transport: {}", err),
        }
    }
}

#[cfg(feature = "std")]
impl<E: fmt::Debug + fmt::Display> std::error::Error for DeliveryError<E> {}

impl<E> From<PayloadError> for DeliveryError<E> {
    fn from(err: PayloadError) -> Self {
        Self::Payload(err)
    }
}
