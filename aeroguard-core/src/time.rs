//! Time management for the node
//!
//! Readings are stamped with wall-clock seconds from an injected clock:
//! - System clock (host builds)
//! - NTP-synced RTC (firmware, implemented outside this crate)
//! - Fixed clock (tests)

/// Timestamp in seconds since the Unix epoch
pub type Timestamp = u64;

/// Source of wall-clock time for reading timestamps
pub trait TimeSource {
    /// Current time in whole seconds since the Unix epoch
    fn now_epoch_seconds(&self) -> Timestamp;
}

/// System time source (requires std)
#[cfg(feature = "std")]
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTime;

#[cfg(feature = "std")]
impl TimeSource for SystemTime {
    fn now_epoch_seconds(&self) -> Timestamp {
        use std::time::{SystemTime as StdSystemTime, UNIX_EPOCH};

        StdSystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }
}

/// Fixed time source for testing
#[derive(Debug, Clone)]
pub struct FixedTime {
    timestamp: Timestamp,
}

impl FixedTime {
    /// Clock frozen at `timestamp`
    pub fn new(timestamp: Timestamp) -> Self {
        Self { timestamp }
    }

    /// Jump to an absolute time
    pub fn set(&mut self, timestamp: Timestamp) {
        self.timestamp = timestamp;
    }

    /// Move forward by `seconds`
    pub fn advance(&mut self, seconds: u64) {
        self.timestamp = self.timestamp.saturating_add(seconds);
    }
}

impl TimeSource for FixedTime {
    fn now_epoch_seconds(&self) -> Timestamp {
        self.timestamp
    }
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn now_epoch_seconds(&self) -> Timestamp {
        (**self).now_epoch_seconds()
    }
}
