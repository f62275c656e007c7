//! Delivery State Machine
//!
//! ## States
//!
//! ```text
//!          deliver()
//!   IDLE ───────────→ SENDING ──ok──→ DELIVERED ──→ flush offline buffer
//!                        │
//!                        └──err──→ FAILED ──→ push reading into buffer
//! ```
//!
//! - **DELIVERED** resets the consecutive-failure counter, then drains the
//!   offline buffer oldest-first with a fixed pause before each record.
//! - **FAILED** increments the counter and buffers the reading, evicting the
//!   oldest entry when the buffer is full.
//!
//! ## Flush Semantics
//!
//! Only entries present when the flush starts are attempted. An entry leaves
//! the buffer once its send succeeds; the first transport failure ends the
//! flush and everything not yet sent stays buffered in its original order for
//! the next cycle. Nothing in here retries on its own: retry timing is the
//! sampling cadence of the caller's control loop.

use embedded_hal::delay::DelayNs;

use crate::{
    buffer::OfflineBuffer,
    constants::{buffers::OFFLINE_BUFFER_CAPACITY, time::DEFAULT_FLUSH_DELAY_MS},
    errors::{DeliveryError, PayloadError},
    payload::{PayloadBuilder, RuntimeMeta},
    reading::Reading,
    time::Timestamp,
    traits::{RuntimeInfo, Transport},
};

/// Where the last delivery attempt ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeliveryState {
    /// Nothing attempted yet
    #[default]
    Idle,
    /// Transport call in progress
    Sending,
    /// Last reading reached the collector
    Delivered,
    /// Last reading was buffered for retry
    Failed,
}

/// Result of draining the offline buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FlushReport {
    /// Entries a send was attempted for
    pub attempted: usize,
    /// Entries delivered and removed
    pub flushed: usize,
    /// Entries removed because they could not be encoded
    pub dropped: usize,
    /// Entries still buffered afterwards
    pub remaining: usize,
}

impl FlushReport {
    /// Every entry present at flush start left the buffer.
    pub fn is_complete(&self) -> bool {
        self.remaining == 0
    }
}

/// What `deliver` did with a reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeliveryOutcome {
    /// Sent; the buffer was flushed afterwards
    Delivered(FlushReport),
    /// Send failed; the reading now waits in the buffer
    Buffered {
        /// Failures in a row, this one included
        consecutive_failures: u32,
        /// Timestamp of the reading evicted to make room, if any
        evicted: Option<Timestamp>,
    },
}

/// Lifetime counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeliveryStats {
    /// Readings sent on first attempt
    pub delivered: u32,
    /// First attempts that failed
    pub failed: u32,
    /// Buffered readings sent during a flush
    pub flushed: u32,
    /// Buffered readings lost to overflow
    pub evicted: u32,
    /// Buffered readings dropped as unencodable
    pub dropped: u32,
    /// Flushes stopped by a transport failure
    pub flush_interrupted: u32,
}

/// Sends readings, buffers the ones that fail, drains the buffer on success.
#[derive(Debug)]
pub struct DeliveryManager<const N: usize = OFFLINE_BUFFER_CAPACITY> {
    builder: PayloadBuilder,
    buffer: OfflineBuffer<Reading, N>,
    state: DeliveryState,
    consecutive_failures: u32,
    flush_delay_ms: u32,
    stats: DeliveryStats,
}

impl<const N: usize> DeliveryManager<N> {
    /// Manager with an empty buffer.
    pub fn new(builder: PayloadBuilder, flush_delay_ms: u32) -> Self {
        Self {
            builder,
            buffer: OfflineBuffer::new(),
            state: DeliveryState::Idle,
            consecutive_failures: 0,
            flush_delay_ms,
            stats: DeliveryStats::default(),
        }
    }

    /// Manager pacing flushes at the default inter-record delay.
    pub fn with_default_pacing(builder: PayloadBuilder) -> Self {
        Self::new(builder, DEFAULT_FLUSH_DELAY_MS)
    }

    /// State after the last attempt
    pub fn state(&self) -> DeliveryState {
        self.state
    }

    /// Failed first attempts since the last success
    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Readings waiting for retry
    pub fn buffer(&self) -> &OfflineBuffer<Reading, N> {
        &self.buffer
    }

    /// Lifetime counters
    pub fn stats(&self) -> &DeliveryStats {
        &self.stats
    }

    /// Payload builder in use
    pub fn builder(&self) -> &PayloadBuilder {
        &self.builder
    }

    /// Deliver one reading.
    ///
    /// Invalid readings are refused with [`PayloadError::InvalidReading`] and
    /// never buffered. A reading that cannot be encoded is refused the same
    /// way. Transport failures are not errors here: they end in
    /// [`DeliveryOutcome::Buffered`].
    pub fn deliver<T, R, D>(
        &mut self,
        reading: &Reading,
        transport: &mut T,
        runtime: &R,
        delay: &mut D,
    ) -> Result<DeliveryOutcome, PayloadError>
    where
        T: Transport + ?Sized,
        R: RuntimeInfo + ?Sized,
        D: DelayNs + ?Sized,
    {
        if !reading.is_valid() {
            return Err(PayloadError::InvalidReading);
        }

        self.state = DeliveryState::Sending;
        match self.transmit(reading, transport, runtime) {
            Ok(()) => {
                self.state = DeliveryState::Delivered;
                self.consecutive_failures = 0;
                self.stats.delivered = self.stats.delivered.saturating_add(1);
                log_info!("Reading {} delivered", reading.timestamp());

                let report = self.flush(transport, runtime, delay);
                Ok(DeliveryOutcome::Delivered(report))
            }
            Err(DeliveryError::Payload(err)) => {
                self.state = DeliveryState::Idle;
                log_warn!("Reading {} not encodable: {}", reading.timestamp(), err);
                Err(err)
            }
            Err(DeliveryError::Transport(_err)) => {
                self.state = DeliveryState::Failed;
                self.consecutive_failures = self.consecutive_failures.saturating_add(1);
                self.stats.failed = self.stats.failed.saturating_add(1);
                log_warn!(
                    "Transmission failed ({} in a row): {}",
                    self.consecutive_failures, _err
                );

                let evicted = self.store(*reading);
                Ok(DeliveryOutcome::Buffered {
                    consecutive_failures: self.consecutive_failures,
                    evicted,
                })
            }
        }
    }

    /// Drain the buffer oldest-first, stopping at the first transport failure.
    pub fn flush<T, R, D>(&mut self, transport: &mut T, runtime: &R, delay: &mut D) -> FlushReport
    where
        T: Transport + ?Sized,
        R: RuntimeInfo + ?Sized,
        D: DelayNs + ?Sized,
    {
        let mut report = FlushReport::default();
        let pending = self.buffer.len();
        if pending == 0 {
            return report;
        }

        log_info!("Flushing {} buffered readings", pending);

        for _ in 0..pending {
            let Some(reading) = self.buffer.front().copied() else {
                break;
            };

            delay.delay_ms(self.flush_delay_ms);
            report.attempted += 1;

            match self.transmit(&reading, transport, runtime) {
                Ok(()) => {
                    self.buffer.pop_front();
                    report.flushed += 1;
                    self.stats.flushed = self.stats.flushed.saturating_add(1);
                    log_debug!("Flushed buffered reading {}", reading.timestamp());
                }
                Err(DeliveryError::Payload(_err)) => {
                    self.buffer.pop_front();
                    report.dropped += 1;
                    self.stats.dropped = self.stats.dropped.saturating_add(1);
                    log_warn!("Dropped buffered reading {}: {}", reading.timestamp(), _err);
                }
                Err(DeliveryError::Transport(_err)) => {
                    self.stats.flush_interrupted = self.stats.flush_interrupted.saturating_add(1);
                    log_warn!("Flush stopped: {}", _err);
                    break;
                }
            }
        }

        report.remaining = self.buffer.len();
        log_info!(
            "Flush done: {} sent, {} remaining",
            report.flushed, report.remaining
        );
        report
    }

    fn transmit<T, R>(
        &self,
        reading: &Reading,
        transport: &mut T,
        runtime: &R,
    ) -> Result<(), DeliveryError<T::Error>>
    where
        T: Transport + ?Sized,
        R: RuntimeInfo + ?Sized,
    {
        let payload = self.builder.build(reading, RuntimeMeta::capture(runtime))?;
        transport.send(&payload).map_err(DeliveryError::Transport)
    }

    fn store(&mut self, reading: Reading) -> Option<Timestamp> {
        let evicted = self.buffer.push(reading).map(|old| old.timestamp());
        match evicted {
            Some(_ts) => {
                self.stats.evicted = self.stats.evicted.saturating_add(1);
                log_warn!("Offline buffer full, evicted reading {}", _ts);
            }
            None => {
                log_info!("Buffered reading ({}/{})", self.buffer.len(), N);
            }
        }
        evicted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reading::Measurements;
    use alloc::vec::Vec;

    struct Link {
        up: bool,
        fail_after: Option<usize>,
        sent: Vec<Vec<u8>>,
    }

    impl Link {
        fn new(up: bool) -> Self {
            Self { up, fail_after: None, sent: Vec::new() }
        }
    }

    impl Transport for Link {
        type Error = &'static str;

        fn send(&mut self, payload: &[u8]) -> Result<(), Self::Error> {
            if !self.up || self.fail_after.is_some_and(|n| self.sent.len() >= n) {
                return Err("link down");
            }
            self.sent.push(payload.to_vec());
            Ok(())
        }

        fn is_connected(&self) -> bool {
            self.up
        }
    }

    struct StubRuntime;

    impl RuntimeInfo for StubRuntime {
        fn uptime_ms(&self) -> u64 {
            1
        }
        fn rssi(&self) -> i32 {
            -70
        }
        fn free_heap(&self) -> u32 {
            4096
        }
    }

    #[derive(Default)]
    struct Pacing(u32);

    impl DelayNs for Pacing {
        fn delay_ns(&mut self, _ns: u32) {}

        fn delay_ms(&mut self, ms: u32) {
            self.0 += ms;
        }
    }

    fn reading(ts: Timestamp) -> Reading {
        Reading::new(
            Measurements {
                gas_resistance_raw: 10.0,
                iaq_score: 60.0,
                co2_equivalent_ppm: 400.0,
                temperature_c: 21.0,
                humidity_pct: 45.0,
                pressure_hpa: 1000.0,
                altitude_m: 110.0,
            },
            ts,
            true,
        )
    }

    fn manager<const N: usize>() -> DeliveryManager<N> {
        DeliveryManager::new(PayloadBuilder::new("node", "1.0.0", None), 500)
    }

    fn buffered_timestamps<const N: usize>(m: &DeliveryManager<N>) -> Vec<Timestamp> {
        m.buffer().iter().map(Reading::timestamp).collect()
    }

    #[test]
    fn failures_fill_buffer_and_count() {
        let mut m = manager::<2>();
        let mut link = Link::new(false);

        for ts in 1..=3 {
            m.deliver(&reading(ts), &mut link, &StubRuntime, &mut Pacing::default()).unwrap();
        }

        assert_eq!(m.state(), DeliveryState::Failed);
        assert_eq!(m.consecutive_failures(), 3);
        assert_eq!(buffered_timestamps(&m), [2, 3]);
        assert_eq!(m.stats().evicted, 1);
    }

    #[test]
    fn success_resets_counter_and_flushes_in_order() {
        let mut m = manager::<4>();
        let mut link = Link::new(false);
        for ts in 1..=3 {
            m.deliver(&reading(ts), &mut link, &StubRuntime, &mut Pacing::default()).unwrap();
        }

        link.up = true;
        let mut pacing = Pacing::default();
        let outcome = m.deliver(&reading(4), &mut link, &StubRuntime, &mut pacing).unwrap();

        assert_eq!(
            outcome,
            DeliveryOutcome::Delivered(FlushReport { attempted: 3, flushed: 3, dropped: 0, remaining: 0 })
        );
        assert_eq!(m.consecutive_failures(), 0);
        assert!(m.buffer().is_empty());
        assert_eq!(pacing.0, 1500);

        // current reading first, then the backlog oldest-first
        let order: Vec<u64> = link
            .sent
            .iter()
            .map(|p| serde_json::from_slice::<serde_json::Value>(p).unwrap()["timestamp"].as_u64().unwrap())
            .collect();
        assert_eq!(order, [4, 1, 2, 3]);
    }

    #[test]
    fn partial_flush_keeps_unsent_entries() {
        let mut m = manager::<4>();
        let mut link = Link::new(false);
        for ts in 1..=3 {
            m.deliver(&reading(ts), &mut link, &StubRuntime, &mut Pacing::default()).unwrap();
        }

        link.up = true;
        link.fail_after = Some(2);
        let outcome = m.deliver(&reading(4), &mut link, &StubRuntime, &mut Pacing::default()).unwrap();

        assert_eq!(
            outcome,
            DeliveryOutcome::Delivered(FlushReport { attempted: 2, flushed: 1, dropped: 0, remaining: 2 })
        );
        assert_eq!(buffered_timestamps(&m), [2, 3]);
        assert_eq!(m.stats().flush_interrupted, 1);
    }

    #[test]
    fn invalid_reading_is_never_buffered() {
        let mut m = manager::<4>();
        let mut link = Link::new(false);
        let bad = Reading::new(Measurements::MISSING, 9, false);

        assert_eq!(
            m.deliver(&bad, &mut link, &StubRuntime, &mut Pacing::default()),
            Err(PayloadError::InvalidReading)
        );
        assert!(m.buffer().is_empty());
        assert_eq!(m.state(), DeliveryState::Idle);
    }

    #[test]
    fn empty_flush_is_noop() {
        let mut m = manager::<4>();
        let mut pacing = Pacing::default();
        let report = m.flush(&mut Link::new(true), &StubRuntime, &mut pacing);
        assert_eq!(report, FlushReport::default());
        assert!(report.is_complete());
        assert_eq!(pacing.0, 0);
    }
}
