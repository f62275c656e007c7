//! Constants for AeroGuard Core
//!
//! Centralized numeric values for the measurement pipeline. Everything the
//! reference node configuration uses as a default lives here, with units in
//! the name.
//!
//! ## Organization
//!
//! - **Sensors**: valid physical envelopes and transducer wiring defaults
//! - **Model**: empirical compensation and scoring coefficients
//! - **Time**: sampling cadence, warmup and pacing delays
//! - **Buffers**: fixed capacities for stack-allocated containers

/// Valid physical envelopes and transducer wiring defaults.
pub mod sensors;

/// Empirical compensation and air-quality model coefficients.
pub mod model;

/// Sampling cadence, warmup and pacing intervals.
pub mod time;

/// Fixed capacities for stack-allocated containers.
pub mod buffers;

pub use sensors::{
    IAQ_MIN, IAQ_MAX, CO2_EQUIV_MIN_PPM, CO2_EQUIV_MAX_PPM,
    TEMP_MIN_C, TEMP_MAX_C, HUMIDITY_MIN_PCT, HUMIDITY_MAX_PCT,
    PRESSURE_MIN_HPA, PRESSURE_MAX_HPA, SEA_LEVEL_PRESSURE_HPA,
};

pub use model::{CO2_FIT_A, CO2_FIT_B, DEFAULT_EMA_ALPHA, SMOOTHED_EMA_ALPHA};

pub use time::{
    MS_PER_SECOND, DEFAULT_SAMPLE_DELAY_MS, DEFAULT_SAMPLING_INTERVAL_MS,
    DEFAULT_WARMUP_MS, DEFAULT_FLUSH_DELAY_MS,
};

pub use buffers::{DEFAULT_MEDIAN_SAMPLES, MAX_MEDIAN_SAMPLES, OFFLINE_BUFFER_CAPACITY};
