//! Reading Validation
//!
//! ## Overview
//!
//! A reading is accepted as a whole or not at all. It is valid iff:
//!
//! 1. every acquisition channel answered with a finite value, and
//! 2. every range-checked field lies inside its configured closed interval.
//!
//! ## Exhaustive Diagnosis
//!
//! Validation never stops at the first problem. Every field is evaluated and
//! every violation lands in the [`ValidationReport`], so one log line shows
//! all anomalies of a misbehaving sensor board at once:
//!
//! ```text
//! Reading rejected (3 violations):
//!   acquisition: temp_humidity read failed
//!   temperature missing
//!   humidity missing
//! ```
//!
//! ## Policy
//!
//! Invalid readings are never transmitted and never buffered. Under a
//! sustained sensor failure this drops data silently (apart from the log),
//! in exchange for keeping known-bad samples out of the history.
//!
//! ```rust
//! use aeroguard_core::{Measurements, ReadingValidator, ValidRanges};
//!
//! let validator = ReadingValidator::new(ValidRanges::default());
//! let report = validator.validate(&Measurements::MISSING, &[]);
//! assert!(!report.is_valid());
//! assert_eq!(report.violations().len(), 7);
//! ```

mod reading;
pub mod utils;

pub use reading::{ReadingValidator, ValidationReport};
pub use utils::{check_range, Validatable};
