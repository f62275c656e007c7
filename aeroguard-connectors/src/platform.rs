//! Host-side collaborators for running a node on a full OS

use std::{thread, time::Duration, time::Instant};

use aeroguard_core::RuntimeInfo;
use embedded_hal::delay::DelayNs;

/// Blocking delay backed by [`std::thread::sleep`].
#[derive(Debug, Default, Clone, Copy)]
pub struct StdDelay;

impl DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        thread::sleep(Duration::from_nanos(u64::from(ns)));
    }

    fn delay_ms(&mut self, ms: u32) {
        thread::sleep(Duration::from_millis(u64::from(ms)));
    }
}

/// Runtime metadata for a host process.
///
/// Uptime counts from construction. Hosts have no radio and no meaningful
/// heap ceiling, so RSSI and free heap are whatever the caller set.
#[derive(Debug, Clone, Copy)]
pub struct HostRuntime {
    started: Instant,
    rssi: i32,
    free_heap: u32,
}

impl HostRuntime {
    /// Start the uptime clock now.
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            rssi: 0,
            free_heap: 0,
        }
    }

    /// Report a fixed RSSI, dBm
    pub fn with_rssi(mut self, rssi: i32) -> Self {
        self.rssi = rssi;
        self
    }

    /// Report a fixed free-heap figure, bytes
    pub fn with_free_heap(mut self, free_heap: u32) -> Self {
        self.free_heap = free_heap;
        self
    }
}

impl Default for HostRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl RuntimeInfo for HostRuntime {
    fn uptime_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }

    fn rssi(&self) -> i32 {
        self.rssi
    }

    fn free_heap(&self) -> u32 {
        self.free_heap
    }
}
