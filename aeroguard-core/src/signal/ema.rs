//! Exponential moving average
//!
//! `next = alpha * sample + (1 - alpha) * previous`, seeded by the first
//! sample. Optionally steadies the IAQ score across sampling cycles; with
//! `alpha = 1.0` every sample passes through unchanged.

use crate::errors::ConfigurationError;

/// Single-pole smoothing filter.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EmaFilter {
    alpha: f32,
    state: Option<f32>,
}

impl EmaFilter {
    /// Filter with weight `alpha` in `(0, 1]` on the newest sample.
    pub fn new(alpha: f32) -> Result<Self, ConfigurationError> {
        if !(alpha > 0.0 && alpha <= 1.0) {
            return Err(ConfigurationError::InvalidSmoothingFactor { alpha });
        }
        Ok(Self { alpha, state: None })
    }

    /// Smoothing weight
    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Last committed value
    pub fn value(&self) -> Option<f32> {
        self.state
    }

    /// What the filter would output for `sample`, without committing it.
    pub fn preview(&self, sample: f32) -> f32 {
        match self.state {
            Some(previous) => self.alpha * sample + (1.0 - self.alpha) * previous,
            None => sample,
        }
    }

    /// Store a previewed value as the new state.
    pub fn commit(&mut self, value: f32) {
        self.state = Some(value);
    }

    /// Preview and commit in one step.
    pub fn update(&mut self, sample: f32) -> f32 {
        let next = self.preview(sample);
        self.commit(next);
        next
    }

    /// Forget the history; the next sample seeds the filter again.
    pub fn reset(&mut self) {
        self.state = None;
    }
}
