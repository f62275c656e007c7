//! Empirical Air-Quality Model Coefficients
//!
//! The gas transducer is not calibrated for absolute concentration. These
//! coefficients describe a fixed heuristic: they rank air from clean to
//! contaminated, they do not measure it.

// ===== AMBIENT COMPENSATION =====

/// Fractional resistance drift per °C away from the reference temperature.
pub const TEMP_COMPENSATION_PER_C: f32 = 0.02;

/// Temperature at which the temperature factor is exactly 1.
pub const TEMP_COMPENSATION_REFERENCE_C: f32 = 20.0;

/// Fractional resistance drift per %RH away from the reference humidity.
pub const HUMIDITY_COMPENSATION_PER_PCT: f32 = 0.01;

/// Humidity at which the humidity factor is exactly 1.
pub const HUMIDITY_COMPENSATION_REFERENCE_PCT: f32 = 33.0;

// ===== IAQ MAPPING =====

/// IAQ score reported for clean air (compensated ratio of 1).
pub const IAQ_CLEAN_AIR_SCORE: f32 = 50.0;

/// IAQ points per unit drop of the compensated ratio below 1.
pub const IAQ_RATIO_GAIN: f32 = 200.0;

/// Scores above this are reported as FAIR.
pub const IAQ_FAIR_THRESHOLD: f32 = 100.0;

/// Scores above this are reported as POOR.
pub const IAQ_POOR_THRESHOLD: f32 = 150.0;

// ===== CO2-EQUIVALENT POWER LAW =====

/// Scale `a` of `ppm = a * ratio^b`.
pub const CO2_FIT_A: f32 = 116.602_068;

/// Exponent `b` of `ppm = a * ratio^b`.
pub const CO2_FIT_B: f32 = -2.769_034_9;

// ===== SMOOTHING =====

/// Default exponential moving average factor for the IAQ score.
///
/// `1.0` disables smoothing, so the transmitted score is the plain
/// clamped IAQ unless a deployment opts in.
pub const DEFAULT_EMA_ALPHA: f32 = 1.0;

/// Smoothing factor for deployments that opt in to a steadier IAQ score.
pub const SMOOTHED_EMA_ALPHA: f32 = 0.3;
