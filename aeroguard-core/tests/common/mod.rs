//! Scripted collaborators for integration tests
//!
//! Every collaborator is deterministic: the bench replays fixed transducer
//! values, the link records what it was asked to send, and delays only count.

#![allow(dead_code)]

use aeroguard_core::{
    errors::AcquisitionError,
    session::{Collaborators, NodeSession},
    time::FixedTime,
    NodeConfig, RuntimeInfo, TransducerSource, Transport,
};
use embedded_hal::delay::DelayNs;

pub const DEVICE_KEY: &str = "integration-test-key";
pub const START_TIME: u64 = 1_700_000_000;

/// Burst from the reference scenario
pub const REFERENCE_BURST: [f32; 5] = [10.1, 10.3, 9.9, 10.2, 10.0];

/// Transducer bench replaying a fixed gas burst and ambient conditions
pub struct ScriptedBench {
    pub gas: Vec<f32>,
    pub next_gas: usize,
    pub climate: Result<(f32, f32), AcquisitionError>,
    pub pressure: Result<f32, AcquisitionError>,
}

impl ScriptedBench {
    pub fn reference() -> Self {
        Self {
            gas: REFERENCE_BURST.to_vec(),
            next_gas: 0,
            climate: Ok((25.0, 40.0)),
            pressure: Ok(1013.25),
        }
    }
}

impl TransducerSource for ScriptedBench {
    fn read_raw_gas(&mut self) -> Result<f32, AcquisitionError> {
        let value = self.gas[self.next_gas % self.gas.len()];
        self.next_gas += 1;
        Ok(value)
    }

    fn read_temp_humidity(&mut self) -> Result<(f32, f32), AcquisitionError> {
        self.climate
    }

    fn read_pressure(&mut self) -> Result<f32, AcquisitionError> {
        self.pressure
    }
}

/// Transport that records payloads and fails on demand
#[derive(Default)]
pub struct RecordingLink {
    pub down: bool,
    /// Fail every send once this many payloads have gone through
    pub fail_after: Option<usize>,
    pub sent: Vec<Vec<u8>>,
    pub attempts: usize,
}

impl Transport for RecordingLink {
    type Error = String;

    fn send(&mut self, payload: &[u8]) -> Result<(), Self::Error> {
        self.attempts += 1;
        if self.down {
            return Err("connection refused".to_string());
        }
        if let Some(limit) = self.fail_after {
            if self.sent.len() >= limit {
                return Err("timed out".to_string());
            }
        }
        self.sent.push(payload.to_vec());
        Ok(())
    }

    fn is_connected(&self) -> bool {
        !self.down
    }
}

impl RecordingLink {
    /// Timestamps of the delivered payloads, in send order
    pub fn sent_timestamps(&self) -> Vec<u64> {
        self.sent
            .iter()
            .map(|p| {
                let doc: serde_json::Value = serde_json::from_slice(p).expect("payload is JSON");
                doc["timestamp"].as_u64().expect("timestamp is an integer")
            })
            .collect()
    }
}

pub struct StaticRuntime;

impl RuntimeInfo for StaticRuntime {
    fn uptime_ms(&self) -> u64 {
        3_600_000
    }

    fn rssi(&self) -> i32 {
        -58
    }

    fn free_heap(&self) -> u32 {
        201_344
    }
}

/// Delay that only accumulates the requested time
#[derive(Default)]
pub struct CountingDelay {
    pub total_ms: u64,
    pub calls: usize,
}

impl DelayNs for CountingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ms += u64::from(ns / 1_000_000);
        self.calls += 1;
    }

    fn delay_ms(&mut self, ms: u32) {
        self.total_ms += u64::from(ms);
        self.calls += 1;
    }
}

pub type TestSession<const N: usize> =
    NodeSession<ScriptedBench, RecordingLink, FixedTime, StaticRuntime, CountingDelay, N>;

/// Reference configuration with r0 = 10 and a provisioned key
pub fn test_config() -> NodeConfig {
    NodeConfig {
        device_id: "AERO-TEST-01".into(),
        firmware_version: "1.0.0".into(),
        device_key: DEVICE_KEY.into(),
        baseline_r0: 10.0,
        ..NodeConfig::default()
    }
}

pub fn session_with<const N: usize>(config: NodeConfig, bench: ScriptedBench) -> TestSession<N> {
    NodeSession::new(
        config,
        Collaborators {
            source: bench,
            transport: RecordingLink::default(),
            clock: FixedTime::new(START_TIME),
            runtime: StaticRuntime,
            delay: CountingDelay::default(),
        },
    )
    .expect("test configuration is valid")
}

pub fn reference_session<const N: usize>() -> TestSession<N> {
    session_with(test_config(), ScriptedBench::reference())
}
