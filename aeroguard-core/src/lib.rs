//! Core signal pipeline for AeroGuard air-quality nodes
//!
//! Turns raw transducer readings into calibrated indoor-air-quality signals and
//! gets them to a remote collector over an unreliable link.
//!
//! Key constraints:
//! - Runs on the node's single control loop (no threads, no locks)
//! - No heap allocation in the sampling path
//! - Invalid readings never leave the device and never enter the offline buffer
//!
//! Data flows leaf-first through the modules:
//!
//! ```text
//! RawSampler → SignalConditioner → QualityScorer → ReadingValidator
//!            → PayloadBuilder → DeliveryManager → OfflineBuffer / flush
//! ```
//!
//! [`session::NodeSession`] owns the mutable state (baseline, buffer, counters)
//! and the injected collaborators, and drives one complete cycle at a time.
//!
//! ```no_run
//! use aeroguard_core::{QualityScorer, SignalConditioner, CalibrationBaseline};
//!
//! let baseline = CalibrationBaseline::new(10.0)?;
//! let conditioner = SignalConditioner::new(5)?;
//! let signal = conditioner.condition(&[10.1, 10.3, 9.9, 10.2, 10.0], &baseline, 25.0, 40.0)?;
//! let score = QualityScorer::default().score(&signal)?;
//! assert!(score.iaq > 78.0 && score.iaq < 79.0);
//! # Ok::<(), aeroguard_core::ConfigurationError>(())
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

extern crate alloc;

#[macro_use]
mod logging;

pub mod baseline;
pub mod buffer;
pub mod config;
pub mod constants;
pub mod delivery;
pub mod errors;
pub mod payload;
pub mod reading;
pub mod sampler;
pub mod scoring;
pub mod session;
pub mod signal;
pub mod time;
pub mod traits;
pub mod validators;

// Public API
pub use baseline::CalibrationBaseline;
pub use buffer::OfflineBuffer;
pub use config::{FieldRange, NodeConfig, ValidRanges};
pub use delivery::{DeliveryManager, DeliveryOutcome, DeliveryState, FlushReport};
pub use errors::{
    AcquisitionError, ConfigurationError, DeliveryError, PayloadError, RangeViolation, Violation,
};
pub use payload::{PayloadBuilder, PayloadSigner, RuntimeMeta, SignedPayload};
pub use reading::{Measurements, Reading, SensorField};
pub use sampler::{RawSample, RawSampler};
pub use scoring::{IaqCategory, QualityScore, QualityScorer};
pub use session::{Collaborators, CycleOutcome, CycleReport, NodeSession, SampledReading};
pub use signal::{ConditionedSignal, EmaFilter, SignalConditioner};
pub use traits::{BaselineProvider, RuntimeInfo, TransducerSource, Transport};
pub use validators::{ReadingValidator, ValidationReport};

/// Crate version, used as the default firmware version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_exists() {
        assert!(!VERSION.is_empty());
    }
}
