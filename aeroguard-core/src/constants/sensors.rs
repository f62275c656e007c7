//! Sensor Envelopes and Transducer Wiring
//!
//! Closed intervals a reading must fall inside before it is transmitted, plus
//! the electrical defaults for the metal-oxide gas transducer's load divider.

// ===== SCORE ENVELOPES =====

/// Lowest reportable IAQ score.
///
/// The scorer clamps into `[IAQ_MIN, IAQ_MAX]`; very clean air (ratio well
/// above 1) saturates here.
pub const IAQ_MIN: f32 = 10.0;

/// Highest reportable IAQ score.
///
/// Heavy contamination (ratio ≪ 1) saturates here.
pub const IAQ_MAX: f32 = 500.0;

/// Lower clamp of the CO2-equivalent estimate in ppm.
///
/// Roughly outdoor background. The estimate is heuristic, never a calibrated
/// absolute concentration.
pub const CO2_EQUIV_MIN_PPM: f32 = 300.0;

/// Upper clamp of the CO2-equivalent estimate in ppm.
pub const CO2_EQUIV_MAX_PPM: f32 = 5000.0;

// ===== AMBIENT ENVELOPES =====

/// Minimum accepted air temperature in °C.
///
/// Operating limit of the DHT22-class climate sensor.
pub const TEMP_MIN_C: f32 = -40.0;

/// Maximum accepted air temperature in °C.
pub const TEMP_MAX_C: f32 = 80.0;

/// Minimum accepted relative humidity in %.
pub const HUMIDITY_MIN_PCT: f32 = 0.0;

/// Maximum accepted relative humidity in %.
pub const HUMIDITY_MAX_PCT: f32 = 100.0;

/// Minimum accepted barometric pressure in hPa.
///
/// Below the lowest sea-level storm pressure on record, still above what a
/// node at ~2000 m would see.
pub const PRESSURE_MIN_HPA: f32 = 800.0;

/// Maximum accepted barometric pressure in hPa.
pub const PRESSURE_MAX_HPA: f32 = 1100.0;

/// ISA standard sea-level pressure in hPa, reference for altitude.
pub const SEA_LEVEL_PRESSURE_HPA: f32 = 1013.25;

// ===== GAS TRANSDUCER =====

/// Default clean-air baseline resistance R0 in kΩ.
///
/// Factory-ish value for an MQ135 behind a 10 kΩ load. Every unit should be
/// recalibrated in fresh air after burn-in.
pub const DEFAULT_BASELINE_R0: f32 = 76.63;

/// Load resistor in series with the sensing element, kΩ.
pub const DEFAULT_LOAD_RESISTANCE_KOHM: f32 = 10.0;

/// Heater/divider supply voltage.
pub const DIVIDER_SUPPLY_V: f32 = 5.0;

/// ADC reference voltage (ESP32, 11 dB attenuation).
pub const ADC_REFERENCE_V: f32 = 3.3;

/// Full-scale count of a 12-bit ADC.
pub const ADC_FULL_SCALE: f32 = 4095.0;
