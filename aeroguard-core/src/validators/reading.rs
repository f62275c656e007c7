use heapless::Vec;

use crate::{
    config::ValidRanges,
    constants::buffers::MAX_VIOLATIONS,
    errors::{AcquisitionError, Violation},
    reading::{Measurements, Reading, SensorField},
    time::Timestamp,
};

use super::utils::{check_range, Validatable};

/// Every violation found in one reading.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    violations: Vec<Violation, MAX_VIOLATIONS>,
    truncated: usize,
}

impl ValidationReport {
    /// No violations recorded
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty() && self.truncated == 0
    }

    /// Recorded violations, in evaluation order
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Violations that did not fit in the report
    pub fn truncated(&self) -> usize {
        self.truncated
    }

    /// Total violations found, including truncated ones
    pub fn violation_count(&self) -> usize {
        self.violations.len() + self.truncated
    }

    fn record(&mut self, violation: Violation) {
        if self.violations.push(violation).is_err() {
            self.truncated += 1;
        }
    }

    /// Write the rejection with all its violations to the log.
    pub fn log_rejection(&self) {
        if self.is_valid() {
            return;
        }
        log_warn!("Reading rejected ({} violations)", self.violation_count());
        for violation in self.violations.iter() {
            log_warn!("  {}", violation);
        }
        if self.truncated > 0 {
            log_warn!("  ... {} more", self.truncated);
        }
    }
}

/// Range gate applied to every reading before it can leave the node.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ReadingValidator {
    ranges: ValidRanges,
}

impl ReadingValidator {
    /// Validator for the given envelopes
    pub fn new(ranges: ValidRanges) -> Self {
        Self { ranges }
    }

    /// Configured envelopes
    pub fn ranges(&self) -> &ValidRanges {
        &self.ranges
    }

    /// Evaluate every field and every acquisition failure.
    pub fn validate(
        &self,
        measurements: &Measurements,
        acquisition: &[AcquisitionError],
    ) -> ValidationReport {
        let mut report = ValidationReport::default();

        for error in acquisition {
            report.record(Violation::Acquisition(*error));
        }

        for field in SensorField::ALL {
            let value = measurements.get(field);
            if !value.is_valid() {
                report.record(Violation::Missing { field });
                continue;
            }
            if let Some(range) = self.ranges.for_field(field) {
                if let Err(violation) = check_range(field, value, range) {
                    report.record(Violation::Range(violation));
                }
            }
        }

        report
    }

    /// Validate and seal the result into an immutable [`Reading`].
    pub fn seal(
        &self,
        measurements: Measurements,
        timestamp: Timestamp,
        acquisition: &[AcquisitionError],
    ) -> (Reading, ValidationReport) {
        let report = self.validate(&measurements, acquisition);
        report.log_rejection();
        (Reading::new(measurements, timestamp, report.is_valid()), report)
    }
}
