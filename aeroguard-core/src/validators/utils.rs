//! Shared validation helpers
//!
//! Pure functions, no allocation. They report problems as values and leave
//! the decision of what a problem means to the caller.

use crate::{config::FieldRange, errors::RangeViolation, reading::SensorField};

/// Check that `value` lies inside `range`.
///
/// NaN fails the check like any other out-of-range value; callers that want
/// to tell missing from out-of-range test [`Validatable::is_valid`] first.
pub fn check_range(field: SensorField, value: f32, range: FieldRange) -> Result<(), RangeViolation> {
    if range.contains(value) {
        Ok(())
    } else {
        Err(RangeViolation {
            field,
            value,
            min: range.min,
            max: range.max,
        })
    }
}

/// Values that can carry a "no measurement" marker.
pub trait Validatable {
    /// Whether the value is a usable measurement
    fn is_valid(&self) -> bool;
}

impl Validatable for f32 {
    fn is_valid(&self) -> bool {
        self.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_are_inclusive() {
        let range = FieldRange::new(-40.0, 80.0);
        assert!(check_range(SensorField::Temperature, -40.0, range).is_ok());
        assert!(check_range(SensorField::Temperature, 80.0, range).is_ok());

        let err = check_range(SensorField::Temperature, 80.5, range).unwrap_err();
        assert_eq!(err.field, SensorField::Temperature);
        assert_eq!(err.value, 80.5);
        assert_eq!((err.min, err.max), (-40.0, 80.0));
    }

    #[test]
    fn validatable_floats() {
        assert!(21.5f32.is_valid());
        assert!(!f32::NAN.is_valid());
        assert!(!f32::INFINITY.is_valid());
    }
}
