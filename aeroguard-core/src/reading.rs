//! Reading data model
//!
//! A [`Reading`] is the immutable value that flows from validation to delivery.
//! It is built once per sampling cycle, its validity is decided at
//! construction, and nothing downstream can change either.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::time::Timestamp;

/// Physical quantities carried by a reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorField {
    /// Median gas-sensor resistance, transducer units
    GasResistance,
    /// Indoor-air-quality score
    IaqScore,
    /// CO2-equivalent estimate, ppm
    Co2Equivalent,
    /// Air temperature, °C
    Temperature,
    /// Relative humidity, %
    Humidity,
    /// Barometric pressure, hPa
    Pressure,
    /// Altitude derived from pressure, m
    Altitude,
}

impl SensorField {
    /// Every field, in wire order.
    pub const ALL: [SensorField; 7] = [
        SensorField::GasResistance,
        SensorField::IaqScore,
        SensorField::Co2Equivalent,
        SensorField::Temperature,
        SensorField::Humidity,
        SensorField::Pressure,
        SensorField::Altitude,
    ];

    /// Key used for this field in the payload's `sensors` object.
    pub const fn wire_name(&self) -> &'static str {
        match self {
            SensorField::GasResistance => "mq135_raw",
            SensorField::IaqScore => "iaq_score",
            SensorField::Co2Equivalent => "co2_equiv",
            SensorField::Temperature => "temperature",
            SensorField::Humidity => "humidity",
            SensorField::Pressure => "pressure_hpa",
            SensorField::Altitude => "altitude_m",
        }
    }
}

impl fmt::Display for SensorField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// The numeric field set of one sampling cycle.
///
/// Fields whose acquisition failed hold `f32::NAN`; the validator reports them
/// as missing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Measurements {
    /// Median gas-sensor resistance
    pub gas_resistance_raw: f32,
    /// IAQ score
    pub iaq_score: f32,
    /// CO2-equivalent estimate in ppm
    pub co2_equivalent_ppm: f32,
    /// Air temperature in °C
    pub temperature_c: f32,
    /// Relative humidity in %
    pub humidity_pct: f32,
    /// Barometric pressure in hPa
    pub pressure_hpa: f32,
    /// Altitude in m
    pub altitude_m: f32,
}

impl Measurements {
    /// A field set where nothing was acquired.
    pub const MISSING: Self = Self {
        gas_resistance_raw: f32::NAN,
        iaq_score: f32::NAN,
        co2_equivalent_ppm: f32::NAN,
        temperature_c: f32::NAN,
        humidity_pct: f32::NAN,
        pressure_hpa: f32::NAN,
        altitude_m: f32::NAN,
    };

    /// Value of a single field.
    pub fn get(&self, field: SensorField) -> f32 {
        match field {
            SensorField::GasResistance => self.gas_resistance_raw,
            SensorField::IaqScore => self.iaq_score,
            SensorField::Co2Equivalent => self.co2_equivalent_ppm,
            SensorField::Temperature => self.temperature_c,
            SensorField::Humidity => self.humidity_pct,
            SensorField::Pressure => self.pressure_hpa,
            SensorField::Altitude => self.altitude_m,
        }
    }
}

/// One sampling cycle's result, sealed with its acceptance flag.
///
/// Once `valid` is false the reading is excluded from transmission and from
/// the offline buffer.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Reading {
    measurements: Measurements,
    timestamp: Timestamp,
    valid: bool,
}

impl Reading {
    /// Seal a field set. Normally called through
    /// [`ReadingValidator::seal`](crate::validators::ReadingValidator::seal).
    pub const fn new(measurements: Measurements, timestamp: Timestamp, valid: bool) -> Self {
        Self { measurements, timestamp, valid }
    }

    /// Whether the reading passed validation
    pub const fn is_valid(&self) -> bool {
        self.valid
    }

    /// Acquisition time, seconds since the Unix epoch
    pub const fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    /// Full field set
    pub const fn measurements(&self) -> &Measurements {
        &self.measurements
    }

    /// Median gas-sensor resistance
    pub const fn gas_resistance_raw(&self) -> f32 {
        self.measurements.gas_resistance_raw
    }

    /// IAQ score
    pub const fn iaq_score(&self) -> f32 {
        self.measurements.iaq_score
    }

    /// CO2-equivalent estimate in ppm
    pub const fn co2_equivalent_ppm(&self) -> f32 {
        self.measurements.co2_equivalent_ppm
    }

    /// Air temperature in °C
    pub const fn temperature_c(&self) -> f32 {
        self.measurements.temperature_c
    }

    /// Relative humidity in %
    pub const fn humidity_pct(&self) -> f32 {
        self.measurements.humidity_pct
    }

    /// Barometric pressure in hPa
    pub const fn pressure_hpa(&self) -> f32 {
        self.measurements.pressure_hpa
    }

    /// Altitude in m
    pub const fn altitude_m(&self) -> f32 {
        self.measurements.altitude_m
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_lookup_matches_struct() {
        let m = Measurements {
            gas_resistance_raw: 1.0,
            iaq_score: 2.0,
            co2_equivalent_ppm: 3.0,
            temperature_c: 4.0,
            humidity_pct: 5.0,
            pressure_hpa: 6.0,
            altitude_m: 7.0,
        };

        for (i, field) in SensorField::ALL.iter().enumerate() {
            assert_eq!(m.get(*field), (i + 1) as f32);
        }
    }

    #[test]
    fn missing_set_is_all_nan() {
        assert!(SensorField::ALL.iter().all(|f| Measurements::MISSING.get(*f).is_nan()));
    }

    #[test]
    fn wire_names() {
        assert_eq!(SensorField::GasResistance.wire_name(), "mq135_raw");
        assert_eq!(SensorField::Co2Equivalent.wire_name(), "co2_equiv");
        assert_eq!(SensorField::Pressure.wire_name(), "pressure_hpa");
    }
}
