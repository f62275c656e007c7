//! Air-quality scoring
//!
//! Maps the conditioned gas signal onto two bounded, human-facing numbers:
//!
//! ```text
//! iaq = clamp(50 + (1 − compensated_ratio) × 200, IAQ_MIN, IAQ_MAX)
//! ppm = clamp(116.6020682 × ratio^−2.769034857, 300, 5000)
//! ```
//!
//! Both are heuristics fitted to an uncalibrated metal-oxide transducer. They
//! rank air from clean to contaminated; they carry no statistical confidence
//! and are not absolute concentrations.
//!
//! The CO2-equivalent is computed from the uncompensated ratio, matching the
//! fit it was derived from. A ratio at or below zero (or non-finite) is a
//! [`ConfigurationError::DegenerateRatio`]: the power law would return NaN or
//! infinity, and clamping that would hide a broken calibration.

use core::fmt;

use crate::{
    config::FieldRange,
    constants::{
        model::{
            CO2_FIT_A, CO2_FIT_B, IAQ_CLEAN_AIR_SCORE, IAQ_FAIR_THRESHOLD, IAQ_POOR_THRESHOLD,
            IAQ_RATIO_GAIN,
        },
        sensors::{CO2_EQUIV_MAX_PPM, CO2_EQUIV_MIN_PPM, IAQ_MAX, IAQ_MIN},
    },
    errors::ConfigurationError,
    signal::ConditionedSignal,
};

/// Coarse IAQ band, as shown on the node's display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IaqCategory {
    /// Score ≤ 100
    Good,
    /// 100 < score ≤ 150
    Fair,
    /// Score > 150
    Poor,
}

impl IaqCategory {
    /// Band for an IAQ score.
    pub fn from_score(iaq: f32) -> Self {
        if iaq <= IAQ_FAIR_THRESHOLD {
            IaqCategory::Good
        } else if iaq <= IAQ_POOR_THRESHOLD {
            IaqCategory::Fair
        } else {
            IaqCategory::Poor
        }
    }

    /// Upper-case label
    pub const fn as_str(&self) -> &'static str {
        match self {
            IaqCategory::Good => "GOOD",
            IaqCategory::Fair => "FAIR",
            IaqCategory::Poor => "POOR",
        }
    }
}

impl fmt::Display for IaqCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scorer output for one conditioned signal.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct QualityScore {
    /// Clamped IAQ score
    pub iaq: f32,
    /// Clamped CO2-equivalent estimate, ppm
    pub co2_ppm: f32,
    /// Band of `iaq`
    pub category: IaqCategory,
}

/// Fixed empirical model with configurable output clamps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualityScorer {
    iaq: FieldRange,
    co2: FieldRange,
}

impl QualityScorer {
    /// Scorer clamping into the given envelopes.
    pub fn new(iaq: FieldRange, co2: FieldRange) -> Result<Self, ConfigurationError> {
        use crate::reading::SensorField;

        if !iaq.is_well_formed() {
            return Err(ConfigurationError::InvalidRange { field: SensorField::IaqScore });
        }
        if !co2.is_well_formed() {
            return Err(ConfigurationError::InvalidRange { field: SensorField::Co2Equivalent });
        }
        Ok(Self { iaq, co2 })
    }

    /// IAQ score for a compensated ratio.
    ///
    /// Non-increasing in the ratio and always inside the IAQ envelope.
    pub fn iaq(&self, compensated_ratio: f32) -> Result<f32, ConfigurationError> {
        check_ratio(compensated_ratio)?;
        let raw = IAQ_CLEAN_AIR_SCORE + (1.0 - compensated_ratio) * IAQ_RATIO_GAIN;
        Ok(self.iaq.clamp(raw))
    }

    /// CO2-equivalent estimate in ppm for an uncompensated ratio.
    pub fn co2_equivalent(&self, ratio: f32) -> Result<f32, ConfigurationError> {
        check_ratio(ratio)?;
        let raw = CO2_FIT_A * libm::powf(ratio, CO2_FIT_B);
        // powf overflows to +inf for tiny ratios; clamp maps that to the ceiling
        Ok(self.co2.clamp(raw))
    }

    /// Score a conditioned signal.
    pub fn score(&self, signal: &ConditionedSignal) -> Result<QualityScore, ConfigurationError> {
        let iaq = self.iaq(signal.compensated_ratio)?;
        let co2_ppm = self.co2_equivalent(signal.ratio)?;

        Ok(QualityScore {
            iaq,
            co2_ppm,
            category: IaqCategory::from_score(iaq),
        })
    }
}

impl Default for QualityScorer {
    fn default() -> Self {
        Self {
            iaq: FieldRange::new(IAQ_MIN, IAQ_MAX),
            co2: FieldRange::new(CO2_EQUIV_MIN_PPM, CO2_EQUIV_MAX_PPM),
        }
    }
}

fn check_ratio(ratio: f32) -> Result<(), ConfigurationError> {
    if ratio.is_finite() && ratio > 0.0 {
        Ok(())
    } else {
        Err(ConfigurationError::DegenerateRatio { ratio })
    }
}
