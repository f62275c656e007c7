//! Node session
//!
//! One object owns everything a node mutates (baseline, EMA state, offline
//! buffer, counters) together with the injected collaborators, and runs the
//! pipeline one complete cycle at a time:
//!
//! ```text
//! acquire → condition → score → validate ─┬─ valid ──→ deliver / buffer
//!                                         └─ invalid → log, drop
//! ```
//!
//! A cycle always runs to completion. The only way out early is a
//! [`ConfigurationError`], which means the numbers would be meaningless and
//! nothing is transmitted.
//!
//! The session does not own the control loop. Firmware calls
//! [`NodeSession::poll`] from its main loop with a monotonic millisecond
//! counter; a cycle runs whenever the sampling interval has elapsed.

use embedded_hal::delay::DelayNs;

use crate::{
    baseline::CalibrationBaseline,
    config::NodeConfig,
    constants::{
        buffers::OFFLINE_BUFFER_CAPACITY,
        model::{HUMIDITY_COMPENSATION_REFERENCE_PCT, TEMP_COMPENSATION_REFERENCE_C},
        time::WARMUP_STEP_MS,
    },
    delivery::{DeliveryManager, DeliveryOutcome, FlushReport},
    errors::{ConfigurationError, PayloadError},
    payload::PayloadBuilder,
    reading::{Measurements, Reading},
    sampler::{pressure_to_altitude, RawSampler},
    scoring::{IaqCategory, QualityScorer},
    signal::{EmaFilter, SignalConditioner},
    time::{TimeSource, Timestamp},
    traits::{BaselineProvider, RuntimeInfo, TransducerSource, Transport},
    validators::{ReadingValidator, ValidationReport},
};

/// External collaborators of a node.
#[derive(Debug)]
pub struct Collaborators<S, T, C, R, D> {
    /// Transducer access
    pub source: S,
    /// Uplink
    pub transport: T,
    /// Wall clock for reading timestamps
    pub clock: C,
    /// Runtime metadata for payloads
    pub runtime: R,
    /// Blocking delay for sample pacing, warmup and flush pacing
    pub delay: D,
}

/// How a cycle ended.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// Sent; the offline buffer was flushed afterwards
    Delivered(FlushReport),
    /// Send failed; the reading was buffered
    Buffered {
        /// Failures in a row, this one included
        consecutive_failures: u32,
        /// Timestamp of the reading evicted to make room, if any
        evicted: Option<Timestamp>,
    },
    /// Validation failed; nothing was sent or buffered
    Rejected(ValidationReport),
    /// Valid reading that could not be serialized; dropped
    Unencodable(PayloadError),
}

/// Result of one sampling cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    /// The sealed reading
    pub reading: Reading,
    /// IAQ band, when an IAQ score was computed
    pub category: Option<IaqCategory>,
    /// What happened to the reading
    pub outcome: CycleOutcome,
}

/// A sealed reading and its diagnostics, before delivery.
#[derive(Debug, Clone, PartialEq)]
pub struct SampledReading {
    /// The sealed reading
    pub reading: Reading,
    /// Validation diagnostics
    pub report: ValidationReport,
    /// IAQ band, when an IAQ score was computed
    pub category: Option<IaqCategory>,
}

/// Session state and collaborators of one node.
pub struct NodeSession<S, T, C, R, D, const N: usize = OFFLINE_BUFFER_CAPACITY> {
    config: NodeConfig,
    sampler: RawSampler,
    conditioner: SignalConditioner,
    scorer: QualityScorer,
    validator: ReadingValidator,
    ema: EmaFilter,
    baseline: CalibrationBaseline,
    delivery: DeliveryManager<N>,
    parts: Collaborators<S, T, C, R, D>,
    warmed_up: bool,
    last_cycle_ms: Option<u64>,
}

impl<S, T, C, R, D, const N: usize> NodeSession<S, T, C, R, D, N>
where
    S: TransducerSource,
    T: Transport,
    C: TimeSource,
    R: RuntimeInfo,
    D: DelayNs,
{
    /// Validate the configuration and assemble the pipeline.
    pub fn new(config: NodeConfig, parts: Collaborators<S, T, C, R, D>) -> Result<Self, ConfigurationError> {
        config.validate()?;

        let ranges = config.ranges;
        let session = Self {
            sampler: RawSampler::new(config.median_samples, config.sample_delay_ms)?,
            conditioner: SignalConditioner::new(config.median_samples)?,
            scorer: QualityScorer::new(ranges.iaq, ranges.co2_equiv)?,
            validator: ReadingValidator::new(ranges),
            ema: EmaFilter::new(config.ema_alpha)?,
            baseline: CalibrationBaseline::new(config.baseline_r0)?,
            delivery: DeliveryManager::new(PayloadBuilder::from_config(&config)?, config.flush_delay_ms),
            parts,
            warmed_up: false,
            last_cycle_ms: None,
            config,
        };

        log_info!(
            "Node {} ready (r0 = {}, {} samples/window, buffer {})",
            session.config.device_id,
            session.baseline.r0(),
            session.config.median_samples,
            N
        );
        Ok(session)
    }

    /// Preheat the gas transducer, blocking in bounded steps.
    pub fn warm_up(&mut self) {
        let mut remaining = self.config.warmup_ms;
        log_info!("Warming up gas sensor for {} ms", remaining);

        while remaining > 0 {
            let step = remaining.min(WARMUP_STEP_MS);
            self.parts.delay.delay_ms(step);
            remaining -= step;
        }

        self.warmed_up = true;
        log_info!("Warmup complete");
    }

    /// Whether [`warm_up`](Self::warm_up) has completed
    pub fn is_warmed_up(&self) -> bool {
        self.warmed_up
    }

    /// Acquire, condition, score and seal one reading without delivering it.
    ///
    /// Acquisition failures and out-of-range values produce an invalid
    /// reading. A degenerate baseline or ratio is an error.
    pub fn sample(&mut self) -> Result<SampledReading, ConfigurationError> {
        if !self.warmed_up {
            log_warn!("Sampling before warmup completed");
        }

        self.conditioner.ensure_baseline(&self.baseline)?;

        let raw = self.sampler.acquire(&mut self.parts.source, &mut self.parts.delay);

        let (temperature_c, humidity_pct) = raw.climate.unwrap_or((f32::NAN, f32::NAN));
        let (comp_t, comp_h) = match raw.climate {
            Ok(climate) => climate,
            Err(_) => (TEMP_COMPENSATION_REFERENCE_C, HUMIDITY_COMPENSATION_REFERENCE_PCT),
        };

        let mut measurements = Measurements {
            temperature_c,
            humidity_pct,
            ..Measurements::MISSING
        };

        let mut smoothed_iaq = None;
        if let Ok(window) = &raw.gas {
            let signal = self.conditioner.condition(window, &self.baseline, comp_t, comp_h)?;
            let score = self.scorer.score(&signal)?;
            let iaq = self.ema.preview(score.iaq);

            measurements.gas_resistance_raw = signal.median;
            measurements.iaq_score = iaq;
            measurements.co2_equivalent_ppm = score.co2_ppm;
            smoothed_iaq = Some(iaq);
        }

        if let Ok(pressure) = raw.pressure {
            measurements.pressure_hpa = pressure;
            measurements.altitude_m = pressure_to_altitude(pressure, self.config.sea_level_pressure_hpa);
        }

        let timestamp = self.parts.clock.now_epoch_seconds();
        let (reading, report) = self
            .validator
            .seal(measurements, timestamp, &raw.acquisition_errors());

        // only accepted readings feed the smoothing history
        if let (true, Some(iaq)) = (reading.is_valid(), smoothed_iaq) {
            self.ema.commit(iaq);
        }

        Ok(SampledReading {
            reading,
            report,
            category: smoothed_iaq.map(IaqCategory::from_score),
        })
    }

    /// Run one complete cycle: sample, then deliver or drop.
    pub fn run_cycle(&mut self) -> Result<CycleReport, ConfigurationError> {
        let SampledReading { reading, report, category } = self.sample()?;

        let outcome = if !reading.is_valid() {
            log_warn!("Reading {} invalid, transmission skipped", reading.timestamp());
            CycleOutcome::Rejected(report)
        } else {
            match self.delivery.deliver(
                &reading,
                &mut self.parts.transport,
                &self.parts.runtime,
                &mut self.parts.delay,
            ) {
                Ok(DeliveryOutcome::Delivered(flush)) => CycleOutcome::Delivered(flush),
                Ok(DeliveryOutcome::Buffered { consecutive_failures, evicted }) => {
                    CycleOutcome::Buffered { consecutive_failures, evicted }
                }
                Err(err) => CycleOutcome::Unencodable(err),
            }
        };

        if let Some(_category) = category {
            log_info!(
                "IAQ {} ({}), CO2eq {} ppm",
                reading.iaq_score(),
                _category,
                reading.co2_equivalent_ppm()
            );
        }

        Ok(CycleReport { reading, category, outcome })
    }

    /// Run a cycle if the sampling interval has elapsed since the last one.
    ///
    /// `now_ms` is a monotonic millisecond counter. The first call always
    /// runs a cycle.
    pub fn poll(&mut self, now_ms: u64) -> Result<Option<CycleReport>, ConfigurationError> {
        let due = match self.last_cycle_ms {
            None => true,
            Some(last) => now_ms.saturating_sub(last) >= self.config.sampling_interval_ms,
        };
        if !due {
            return Ok(None);
        }

        self.last_cycle_ms = Some(now_ms);
        self.run_cycle().map(Some)
    }

    /// Current calibration baseline
    pub fn baseline(&self) -> &CalibrationBaseline {
        &self.baseline
    }

    /// Install a freshly calibrated R0, returning the previous one.
    pub fn replace_baseline(&mut self, r0: f32) -> Result<f32, ConfigurationError> {
        self.baseline.replace_r0(r0)
    }

    /// Delivery state, counters and offline buffer
    pub fn delivery(&self) -> &DeliveryManager<N> {
        &self.delivery
    }

    /// Active configuration
    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    /// IAQ smoothing filter
    pub fn ema(&self) -> &EmaFilter {
        &self.ema
    }

    /// Injected collaborators
    pub fn collaborators(&self) -> &Collaborators<S, T, C, R, D> {
        &self.parts
    }

    /// Transducer source, e.g. to reconfigure a scripted bench
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.parts.source
    }

    /// Uplink
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.parts.transport
    }

    /// Clock
    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.parts.clock
    }

    /// Tear down, handing the collaborators back.
    pub fn into_parts(self) -> Collaborators<S, T, C, R, D> {
        self.parts
    }
}
