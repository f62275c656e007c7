//! Buffer Sizes
//!
//! Fixed capacities so every container on the sampling path lives on the
//! stack.

/// Gas samples per median window in the reference configuration.
pub const DEFAULT_MEDIAN_SAMPLES: usize = 5;

/// Upper bound on the median window.
///
/// Sizes the stack array the filter sorts in. The sort is quadratic, which is
/// fine at this size.
pub const MAX_MEDIAN_SAMPLES: usize = 16;

/// Undelivered readings retained while the link is down.
///
/// 50 readings at the default one-minute cadence cover ~50 minutes of outage.
pub const OFFLINE_BUFFER_CAPACITY: usize = 50;

/// Diagnostics slots in one validation report.
///
/// One per measured field plus one per acquisition channel, with headroom.
pub const MAX_VIOLATIONS: usize = 12;
