//! Clean-air calibration baseline
//!
//! R0 is the gas-sensor resistance in known-clean air. Every sample is
//! normalized against it, so a broken R0 poisons every score. The invariant
//! `r0 > 0` (and finite) is enforced on every write.

use crate::{
    constants::sensors::DEFAULT_BASELINE_R0,
    errors::ConfigurationError,
    traits::BaselineProvider,
};

/// Process-wide baseline, owned by the node session.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalibrationBaseline {
    r0: f32,
}

impl CalibrationBaseline {
    /// Baseline from static configuration.
    pub fn new(r0: f32) -> Result<Self, ConfigurationError> {
        check_r0(r0)?;
        Ok(Self { r0 })
    }

    /// Current R0
    pub fn r0(&self) -> f32 {
        self.r0
    }

    /// Swap in a freshly calibrated R0, returning the old one.
    ///
    /// On error the stored value is untouched.
    pub fn replace(&mut self, r0: f32) -> Result<f32, ConfigurationError> {
        check_r0(r0)?;
        let previous = core::mem::replace(&mut self.r0, r0);
        log_info!("Baseline R0 replaced: {} -> {}", previous, r0);
        Ok(previous)
    }
}

impl Default for CalibrationBaseline {
    fn default() -> Self {
        Self { r0: DEFAULT_BASELINE_R0 }
    }
}

impl BaselineProvider for CalibrationBaseline {
    fn get_r0(&self) -> f32 {
        self.r0
    }

    fn replace_r0(&mut self, r0: f32) -> Result<f32, ConfigurationError> {
        self.replace(r0)
    }
}

/// Reject zero, negative and non-finite baselines.
pub(crate) fn check_r0(r0: f32) -> Result<(), ConfigurationError> {
    if r0.is_finite() && r0 > 0.0 {
        Ok(())
    } else {
        Err(ConfigurationError::NonPositiveBaseline { r0 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_degenerate_baselines() {
        for r0 in [0.0, -3.0, f32::NAN, f32::INFINITY] {
            assert!(CalibrationBaseline::new(r0).is_err(), "accepted r0 = {}", r0);
        }
    }

    #[test]
    fn replace_keeps_old_value_on_error() {
        let mut baseline = CalibrationBaseline::new(10.0).unwrap();

        assert_eq!(baseline.replace(12.5), Ok(10.0));
        assert_eq!(baseline.r0(), 12.5);

        assert!(baseline.replace(0.0).is_err());
        assert_eq!(baseline.get_r0(), 12.5);
    }

    #[test]
    fn default_is_reference_r0() {
        assert_eq!(CalibrationBaseline::default().r0(), DEFAULT_BASELINE_R0);
    }
}
