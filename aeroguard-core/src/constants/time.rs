//! Timing Constants
//!
//! All values in milliseconds unless the name says otherwise.

/// Milliseconds per second.
pub const MS_PER_SECOND: u64 = 1000;

/// Pause between consecutive gas samples of one median window.
///
/// Bounds worst-case acquisition latency at `(samples - 1) * delay`.
pub const DEFAULT_SAMPLE_DELAY_MS: u32 = 100;

/// Interval between sampling cycles.
pub const DEFAULT_SAMPLING_INTERVAL_MS: u64 = 60_000;

/// Heater preheat on cold boot before readings stabilize.
pub const DEFAULT_WARMUP_MS: u32 = 180_000;

/// Granularity of the warmup wait, one heartbeat per step.
pub const WARMUP_STEP_MS: u32 = 500;

/// Delay between buffered records while flushing.
pub const DEFAULT_FLUSH_DELAY_MS: u32 = 500;
