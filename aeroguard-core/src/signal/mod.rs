//! Signal conditioning for the gas transducer
//!
//! ## Overview
//!
//! A metal-oxide gas sensor reports a resistance that depends on three things
//! at once: the gases present, the air temperature and the humidity. Only the
//! first is interesting. Conditioning isolates it in three steps:
//!
//! 1. **Median** of a short burst of samples, rejecting switching spikes
//! 2. **Normalization** against the clean-air baseline: `ratio = median / r0`
//! 3. **Compensation** for temperature and humidity drift
//!
//! The output is the dimensionless *compensated ratio*: about 1 in clean air,
//! falling as reducing gases accumulate.
//!
//! ## Preconditions
//!
//! A baseline `r0 <= 0` cannot normalize anything. It is rejected with
//! [`ConfigurationError::NonPositiveBaseline`] before the window is touched,
//! rather than producing a clamped score from garbage.
//!
//! ```rust
//! use aeroguard_core::{SignalConditioner, CalibrationBaseline};
//!
//! let conditioner = SignalConditioner::new(5)?;
//! let baseline = CalibrationBaseline::new(10.0)?;
//! let signal = conditioner.condition(&[10.1, 10.3, 9.9, 10.2, 10.0], &baseline, 25.0, 40.0)?;
//!
//! assert_eq!(signal.median, 10.1);
//! assert!((signal.compensated_ratio - 0.858).abs() < 1e-3);
//! # Ok::<(), aeroguard_core::ConfigurationError>(())
//! ```

mod compensation;
mod ema;
mod median;

pub use compensation::Compensation;
pub use ema::EmaFilter;
pub use median::{median_filter, SampleWindow};

use crate::{
    baseline::check_r0,
    constants::buffers::MAX_MEDIAN_SAMPLES,
    errors::ConfigurationError,
    traits::BaselineProvider,
};

/// Intermediate values of one conditioning pass.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConditionedSignal {
    /// Median resistance of the burst
    pub median: f32,
    /// `median / r0`, uncompensated
    pub ratio: f32,
    /// Drift factors applied
    pub compensation: Compensation,
    /// Ratio corrected back to reference conditions
    pub compensated_ratio: f32,
}

/// Median filtering, baseline normalization and ambient compensation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalConditioner {
    sample_count: usize,
}

impl SignalConditioner {
    /// Conditioner expecting bursts of `sample_count` samples.
    pub fn new(sample_count: usize) -> Result<Self, ConfigurationError> {
        check_sample_count(sample_count)?;
        Ok(Self { sample_count })
    }

    /// Configured burst length
    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    /// Fail early if the baseline cannot normalize a sample.
    pub fn ensure_baseline<B: BaselineProvider>(&self, baseline: &B) -> Result<f32, ConfigurationError> {
        let r0 = baseline.get_r0();
        check_r0(r0)?;
        Ok(r0)
    }

    /// Condition one burst of gas samples taken at the given ambient conditions.
    ///
    /// The burst must hold exactly the configured number of samples.
    pub fn condition<B: BaselineProvider>(
        &self,
        samples: &[f32],
        baseline: &B,
        temperature_c: f32,
        humidity_pct: f32,
    ) -> Result<ConditionedSignal, ConfigurationError> {
        let r0 = self.ensure_baseline(baseline)?;

        if samples.len() != self.sample_count {
            return Err(ConfigurationError::InvalidSampleCount {
                count: samples.len(),
                max: MAX_MEDIAN_SAMPLES,
            });
        }

        let median = median_filter(samples).ok_or(ConfigurationError::InvalidSampleCount {
            count: samples.len(),
            max: MAX_MEDIAN_SAMPLES,
        })?;

        let ratio = median / r0;
        let compensation = Compensation::for_ambient(temperature_c, humidity_pct)?;
        let compensated_ratio = compensation.apply(ratio);

        log_debug!(
            "Conditioned gas signal: median={} ratio={} compensated={}",
            median, ratio, compensated_ratio
        );

        Ok(ConditionedSignal {
            median,
            ratio,
            compensation,
            compensated_ratio,
        })
    }
}

impl Default for SignalConditioner {
    fn default() -> Self {
        Self {
            sample_count: crate::constants::buffers::DEFAULT_MEDIAN_SAMPLES,
        }
    }
}

/// Window sizes the stack buffer can hold.
pub(crate) fn check_sample_count(count: usize) -> Result<(), ConfigurationError> {
    if count == 0 || count > MAX_MEDIAN_SAMPLES {
        Err(ConfigurationError::InvalidSampleCount {
            count,
            max: MAX_MEDIAN_SAMPLES,
        })
    } else {
        Ok(())
    }
}
