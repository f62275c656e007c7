//! Collaborator interfaces
//!
//! The core never touches hardware or sockets. Everything it needs from the
//! outside world comes through these traits, so firmware, host builds and
//! tests plug in their own implementations.
//!
//! Timing goes through [`embedded_hal::delay::DelayNs`] and wall-clock time
//! through [`TimeSource`](crate::time::TimeSource).

use core::fmt;

use crate::errors::{AcquisitionError, ConfigurationError};

/// Raw transducer access.
///
/// A failed read must come back as `Err`, never as a sentinel value that could
/// pass for an extreme reading.
pub trait TransducerSource {
    /// Gas-sensor resistance, transducer units (kΩ for the reference divider)
    fn read_raw_gas(&mut self) -> Result<f32, AcquisitionError>;

    /// Air temperature in °C and relative humidity in %
    fn read_temp_humidity(&mut self) -> Result<(f32, f32), AcquisitionError>;

    /// Barometric pressure in hPa
    fn read_pressure(&mut self) -> Result<f32, AcquisitionError>;
}

/// Holder of the clean-air baseline resistance.
pub trait BaselineProvider {
    /// Current baseline R0
    fn get_r0(&self) -> f32;

    /// Replace R0 in one step, as done by a fresh-air calibration run.
    ///
    /// Returns the previous value.
    fn replace_r0(&mut self, r0: f32) -> Result<f32, ConfigurationError>;
}

/// Outbound link to the collector.
///
/// Implementations enforce their own bounded timeout; `send` must return
/// rather than block indefinitely.
pub trait Transport {
    /// Transport-specific failure detail
    type Error: fmt::Debug + fmt::Display;

    /// Deliver one serialized payload
    fn send(&mut self, payload: &[u8]) -> Result<(), Self::Error>;

    /// Whether the link currently looks usable
    fn is_connected(&self) -> bool;
}

/// Runtime metadata attached to every payload.
pub trait RuntimeInfo {
    /// Milliseconds since boot
    fn uptime_ms(&self) -> u64;

    /// Received signal strength of the uplink in dBm
    fn rssi(&self) -> i32;

    /// Free heap in bytes
    fn free_heap(&self) -> u32;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    type Error = T::Error;

    fn send(&mut self, payload: &[u8]) -> Result<(), Self::Error> {
        (**self).send(payload)
    }

    fn is_connected(&self) -> bool {
        (**self).is_connected()
    }
}

impl<R: RuntimeInfo + ?Sized> RuntimeInfo for &R {
    fn uptime_ms(&self) -> u64 {
        (**self).uptime_ms()
    }

    fn rssi(&self) -> i32 {
        (**self).rssi()
    }

    fn free_heap(&self) -> u32 {
        (**self).free_heap()
    }
}
