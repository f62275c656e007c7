//! Temperature and humidity compensation
//!
//! Metal-oxide sensing layers read lower resistance when warm or damp, which
//! looks like pollution. Dividing the ratio by the product of two linear drift
//! factors brings readings back to the reference conditions (20 °C, 33 %RH):
//!
//! ```text
//! temp_factor = 1 + 0.02 × (T − 20)
//! hum_factor  = 1 + 0.01 × (H − 33)
//! compensated = ratio / (temp_factor × hum_factor)
//! ```
//!
//! The model is linear and only meant for indoor conditions. Far outside them
//! (e.g. −40 °C) the temperature factor goes non-positive; the scorer rejects
//! the resulting ratio instead of scoring it.

use crate::constants::model::{
    HUMIDITY_COMPENSATION_PER_PCT, HUMIDITY_COMPENSATION_REFERENCE_PCT,
    TEMP_COMPENSATION_PER_C, TEMP_COMPENSATION_REFERENCE_C,
};
use crate::errors::ConfigurationError;

/// Drift factors for one set of ambient conditions.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Compensation {
    /// Temperature drift factor
    pub temp_factor: f32,
    /// Humidity drift factor
    pub hum_factor: f32,
}

impl Compensation {
    /// Factors at the reference conditions, both exactly 1.
    pub const NEUTRAL: Self = Self { temp_factor: 1.0, hum_factor: 1.0 };

    /// Factors for the given ambient temperature (°C) and humidity (%).
    pub fn for_ambient(temperature_c: f32, humidity_pct: f32) -> Result<Self, ConfigurationError> {
        if !temperature_c.is_finite() {
            return Err(ConfigurationError::NonFiniteAmbient { quantity: "temperature" });
        }
        if !humidity_pct.is_finite() {
            return Err(ConfigurationError::NonFiniteAmbient { quantity: "humidity" });
        }

        Ok(Self {
            temp_factor: 1.0
                + TEMP_COMPENSATION_PER_C * (temperature_c - TEMP_COMPENSATION_REFERENCE_C),
            hum_factor: 1.0
                + HUMIDITY_COMPENSATION_PER_PCT * (humidity_pct - HUMIDITY_COMPENSATION_REFERENCE_PCT),
        })
    }

    /// Compensated ratio. Not guarded; see module docs.
    pub fn apply(&self, ratio: f32) -> f32 {
        ratio / (self.temp_factor * self.hum_factor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_conditions_are_neutral() {
        let comp = Compensation::for_ambient(20.0, 33.0).unwrap();
        assert_eq!(comp, Compensation::NEUTRAL);
        assert_eq!(comp.apply(0.8), 0.8);
    }

    #[test]
    fn warm_damp_air_raises_ratio() {
        let comp = Compensation::for_ambient(25.0, 40.0).unwrap();
        assert!((comp.temp_factor - 1.1).abs() < 1e-6);
        assert!((comp.hum_factor - 1.07).abs() < 1e-6);
        assert!((comp.apply(1.01) - 0.858_11).abs() < 1e-4);
    }

    #[test]
    fn non_finite_ambient_is_rejected() {
        assert_eq!(
            Compensation::for_ambient(f32::NAN, 40.0),
            Err(ConfigurationError::NonFiniteAmbient { quantity: "temperature" })
        );
        assert_eq!(
            Compensation::for_ambient(21.0, f32::INFINITY),
            Err(ConfigurationError::NonFiniteAmbient { quantity: "humidity" })
        );
    }
}
