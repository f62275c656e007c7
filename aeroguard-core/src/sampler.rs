//! Raw acquisition
//!
//! The sampler has no logic beyond bounds-checked reads: it pulls one burst of
//! gas samples plus one climate and one pressure reading from the
//! [`TransducerSource`], turns non-finite answers into [`AcquisitionError`]s,
//! and hands everything on untouched.
//!
//! Gas samples are taken back to back with a fixed pause between them, so the
//! worst-case burst latency is `(N − 1) × sample_delay_ms` plus the reads.

use embedded_hal::delay::DelayNs;
use heapless::Vec;

use crate::{
    constants::{
        buffers::DEFAULT_MEDIAN_SAMPLES,
        sensors::{
            ADC_FULL_SCALE, ADC_REFERENCE_V, DEFAULT_LOAD_RESISTANCE_KOHM, DIVIDER_SUPPLY_V,
        },
        time::DEFAULT_SAMPLE_DELAY_MS,
    },
    errors::{AcquisitionError, ConfigurationError},
    signal::{check_sample_count, SampleWindow},
    traits::TransducerSource,
};

/// Everything one acquisition pass produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSample {
    /// Gas resistance burst
    pub gas: Result<SampleWindow, AcquisitionError>,
    /// Temperature (°C) and relative humidity (%)
    pub climate: Result<(f32, f32), AcquisitionError>,
    /// Pressure, hPa
    pub pressure: Result<f32, AcquisitionError>,
}

impl RawSample {
    /// Failures of this pass, one per failed channel.
    pub fn acquisition_errors(&self) -> Vec<AcquisitionError, 3> {
        let mut errors = Vec::new();
        for err in [
            self.gas.as_ref().err(),
            self.climate.as_ref().err(),
            self.pressure.as_ref().err(),
        ]
        .into_iter()
        .flatten()
        {
            // capacity matches the channel count
            let _ = errors.push(*err);
        }
        errors
    }
}

/// Bounds-checked reader for one sampling cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawSampler {
    sample_count: usize,
    sample_delay_ms: u32,
}

impl RawSampler {
    /// Sampler taking bursts of `sample_count` gas samples, `sample_delay_ms` apart.
    pub fn new(sample_count: usize, sample_delay_ms: u32) -> Result<Self, ConfigurationError> {
        check_sample_count(sample_count)?;
        Ok(Self { sample_count, sample_delay_ms })
    }

    /// Gas samples per burst
    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    /// Pause between gas samples, ms
    pub fn sample_delay_ms(&self) -> u32 {
        self.sample_delay_ms
    }

    /// Acquire one full sample set.
    ///
    /// Never fails as a whole; each channel carries its own result. A single
    /// failed gas sample fails the burst and ends it early.
    pub fn acquire<S, D>(&self, source: &mut S, delay: &mut D) -> RawSample
    where
        S: TransducerSource + ?Sized,
        D: DelayNs + ?Sized,
    {
        let gas = self.acquire_gas(source, delay);
        let climate = source.read_temp_humidity().and_then(|(t, h)| {
            if t.is_finite() && h.is_finite() {
                Ok((t, h))
            } else {
                Err(AcquisitionError::NotANumber { sensor: "temp_humidity" })
            }
        });
        let pressure = source
            .read_pressure()
            .and_then(|p| finite(p, "pressure"));

        RawSample { gas, climate, pressure }
    }

    fn acquire_gas<S, D>(&self, source: &mut S, delay: &mut D) -> Result<SampleWindow, AcquisitionError>
    where
        S: TransducerSource + ?Sized,
        D: DelayNs + ?Sized,
    {
        let mut window = SampleWindow::new();

        for i in 0..self.sample_count {
            if i > 0 {
                delay.delay_ms(self.sample_delay_ms);
            }
            let value = source.read_raw_gas().and_then(|v| finite(v, "gas"))?;
            // sample_count is bounded by the window capacity at construction
            window
                .push(value)
                .map_err(|_| AcquisitionError::ReadFailed { sensor: "gas" })?;
        }

        Ok(window)
    }
}

impl Default for RawSampler {
    fn default() -> Self {
        Self {
            sample_count: DEFAULT_MEDIAN_SAMPLES,
            sample_delay_ms: DEFAULT_SAMPLE_DELAY_MS,
        }
    }
}

fn finite(value: f32, sensor: &'static str) -> Result<f32, AcquisitionError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(AcquisitionError::NotANumber { sensor })
    }
}

/// Load-resistor divider in front of the gas sensor.
///
/// ```text
///  V_supply ── Rs (sensor) ──┬── R_load ── GND
///                            └── ADC
/// Rs = V_supply × R_load / V_out − R_load
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadDivider {
    /// Divider supply voltage, V
    pub supply_v: f32,
    /// Load resistance, kΩ
    pub load_kohm: f32,
}

impl LoadDivider {
    /// Sensor resistance (kΩ) for the voltage across the load resistor.
    pub fn resistance(&self, voltage: f32) -> Result<f32, AcquisitionError> {
        if !(voltage.is_finite() && voltage > 0.0) {
            return Err(AcquisitionError::DividerVoltage { voltage });
        }
        Ok(self.supply_v * self.load_kohm / voltage - self.load_kohm)
    }
}

impl Default for LoadDivider {
    fn default() -> Self {
        Self {
            supply_v: DIVIDER_SUPPLY_V,
            load_kohm: DEFAULT_LOAD_RESISTANCE_KOHM,
        }
    }
}

/// ADC channel wired to a [`LoadDivider`].
///
/// Firmware `TransducerSource` implementations use this to turn raw counts
/// into the resistance `read_raw_gas` returns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdcGasChannel {
    /// Divider on the analog input
    pub divider: LoadDivider,
    /// ADC reference voltage, V
    pub reference_v: f32,
    /// Count at the reference voltage
    pub full_scale: f32,
}

impl AdcGasChannel {
    /// Pin voltage for a raw count
    pub fn voltage(&self, counts: u16) -> f32 {
        f32::from(counts) / self.full_scale * self.reference_v
    }

    /// Sensor resistance in kΩ for a raw count
    pub fn resistance(&self, counts: u16) -> Result<f32, AcquisitionError> {
        self.divider.resistance(self.voltage(counts))
    }
}

impl Default for AdcGasChannel {
    fn default() -> Self {
        Self {
            divider: LoadDivider::default(),
            reference_v: ADC_REFERENCE_V,
            full_scale: ADC_FULL_SCALE,
        }
    }
}

/// Altitude in metres from the international barometric formula.
///
/// `h = 44330 × (1 − (P / P0)^(1/5.255))`
pub fn pressure_to_altitude(pressure_hpa: f32, sea_level_hpa: f32) -> f32 {
    44_330.0 * (1.0 - libm::powf(pressure_hpa / sea_level_hpa, 1.0 / 5.255))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Bench {
        gas: [f32; 5],
        next: usize,
        climate: Result<(f32, f32), AcquisitionError>,
        pressure: f32,
    }

    impl TransducerSource for Bench {
        fn read_raw_gas(&mut self) -> Result<f32, AcquisitionError> {
            let value = self.gas[self.next % self.gas.len()];
            self.next += 1;
            Ok(value)
        }

        fn read_temp_humidity(&mut self) -> Result<(f32, f32), AcquisitionError> {
            self.climate
        }

        fn read_pressure(&mut self) -> Result<f32, AcquisitionError> {
            Ok(self.pressure)
        }
    }

    #[derive(Default)]
    struct CountingDelay {
        total_ms: u64,
        calls: usize,
    }

    impl DelayNs for CountingDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.total_ms += u64::from(ns) / 1_000_000;
            self.calls += 1;
        }

        fn delay_ms(&mut self, ms: u32) {
            self.total_ms += u64::from(ms);
            self.calls += 1;
        }
    }

    fn bench() -> Bench {
        Bench {
            gas: [10.1, 10.3, 9.9, 10.2, 10.0],
            next: 0,
            climate: Ok((25.0, 40.0)),
            pressure: 1013.25,
        }
    }

    #[test]
    fn burst_is_paced_between_samples() {
        let sampler = RawSampler::new(5, 100).unwrap();
        let mut delay = CountingDelay::default();

        let sample = sampler.acquire(&mut bench(), &mut delay);

        assert_eq!(sample.gas.as_ref().unwrap().as_slice(), &[10.1, 10.3, 9.9, 10.2, 10.0]);
        assert_eq!(delay.calls, 4);
        assert_eq!(delay.total_ms, 400);
        assert!(sample.acquisition_errors().is_empty());
    }

    #[test]
    fn nan_gas_fails_burst() {
        let mut source = bench();
        source.gas[2] = f32::NAN;

        let sample = RawSampler::default().acquire(&mut source, &mut CountingDelay::default());
        assert_eq!(sample.gas, Err(AcquisitionError::NotANumber { sensor: "gas" }));
        assert_eq!(source.next, 3);
    }

    #[test]
    fn climate_failures_are_reported() {
        let mut source = bench();
        source.climate = Ok((f32::NAN, 40.0));
        let sample = RawSampler::default().acquire(&mut source, &mut CountingDelay::default());
        assert_eq!(
            sample.acquisition_errors().as_slice(),
            &[AcquisitionError::NotANumber { sensor: "temp_humidity" }]
        );

        source.climate = Err(AcquisitionError::ReadFailed { sensor: "dht22" });
        let sample = RawSampler::default().acquire(&mut source, &mut CountingDelay::default());
        assert_eq!(sample.climate, Err(AcquisitionError::ReadFailed { sensor: "dht22" }));
    }

    #[test]
    fn adc_counts_to_resistance() {
        let channel = AdcGasChannel::default();
        // 2048 counts ≈ 1.650 V → 5 × 10 / 1.650 − 10 ≈ 20.30 kΩ
        let rs = channel.resistance(2048).unwrap();
        assert!((rs - 20.30).abs() < 0.01, "rs = {}", rs);

        assert_eq!(
            channel.resistance(0),
            Err(AcquisitionError::DividerVoltage { voltage: 0.0 })
        );
    }

    #[test]
    fn altitude_from_pressure() {
        assert!(pressure_to_altitude(1013.25, 1013.25).abs() < 1e-3);
        let h = pressure_to_altitude(899.0, 1013.25);
        assert!((h - 998.0).abs() < 5.0, "h = {}", h);
    }
}
