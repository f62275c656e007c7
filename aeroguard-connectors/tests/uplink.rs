//! Node sessions running over real host transports

use std::{
    io::{Read, Write},
    net::TcpListener,
    thread,
};

use aeroguard_connectors::{connect, AnyTransport, DeploymentConfig, HostRuntime, StdDelay};
use aeroguard_core::{
    errors::AcquisitionError,
    payload::verify_signed_payload,
    session::{Collaborators, CycleOutcome, NodeSession},
    time::FixedTime,
    FlushReport, TransducerSource, Transport,
};

const DEVICE_KEY: &str = "uplink-test-key";

struct SteadyBench;

impl TransducerSource for SteadyBench {
    fn read_raw_gas(&mut self) -> Result<f32, AcquisitionError> {
        Ok(10.0)
    }

    fn read_temp_humidity(&mut self) -> Result<(f32, f32), AcquisitionError> {
        Ok((25.0, 40.0))
    }

    fn read_pressure(&mut self) -> Result<f32, AcquisitionError> {
        Ok(1013.25)
    }
}

type HostSession = NodeSession<SteadyBench, AnyTransport, FixedTime, HostRuntime, StdDelay, 4>;

fn deployment(endpoint: &str) -> DeploymentConfig {
    DeploymentConfig::from_json(&format!(
        r#"{{
            "node": {{
                "device_id": "AERO-HOST-01",
                "device_key": "{DEVICE_KEY}",
                "baseline_r0": 10.0,
                "sample_delay_ms": 0,
                "flush_delay_ms": 0
            }},
            "transport": {{ "kind": "http", "endpoint": "{endpoint}", "api_key": "abc", "timeout_ms": 2000 }}
        }}"#
    ))
    .unwrap()
}

fn host_session(deployment: DeploymentConfig) -> HostSession {
    let transport = connect(&deployment.transport).unwrap();
    NodeSession::new(
        deployment.node,
        Collaborators {
            source: SteadyBench,
            transport,
            clock: FixedTime::new(1_700_000_000),
            runtime: HostRuntime::new().with_rssi(-50),
            delay: StdDelay,
        },
    )
    .unwrap()
}

/// Accept one request, answer `201 Created`, hand back (head, body).
fn one_shot_collector() -> (String, thread::JoinHandle<(String, Vec<u8>)>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let endpoint = format!("http://{}/readings", listener.local_addr().unwrap());

    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut request = Vec::new();
        let mut chunk = [0u8; 1024];

        let head_end = loop {
            let n = stream.read(&mut chunk).unwrap();
            assert!(n > 0, "client closed before sending headers");
            request.extend_from_slice(&chunk[..n]);
            if let Some(pos) = request.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos + 4;
            }
        };

        let head = String::from_utf8_lossy(&request[..head_end]).to_lowercase();
        let content_length: usize = head
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .map(|v| v.trim().parse().unwrap())
            .unwrap_or(0);

        while request.len() < head_end + content_length {
            let n = stream.read(&mut chunk).unwrap();
            assert!(n > 0, "client closed mid-body");
            request.extend_from_slice(&chunk[..n]);
        }

        stream
            .write_all(b"HTTP/1.1 201 Created\r\nContent-Length: 0\r\nConnection: close\r\n\r\n")
            .unwrap();

        (head, request[head_end..head_end + content_length].to_vec())
    });

    (endpoint, handle)
}

#[test]
fn reading_reaches_http_collector() {
    let (endpoint, collector) = one_shot_collector();
    let mut session = host_session(deployment(&endpoint));

    let report = session.run_cycle().unwrap();
    assert_eq!(report.outcome, CycleOutcome::Delivered(FlushReport::default()));
    assert!(session.collaborators().transport.is_connected());

    let (head, body) = collector.join().unwrap();
    assert!(head.starts_with("post /readings"));
    assert!(head.contains("content-type: application/json"));
    assert!(head.contains("x-api-key: abc"));

    let document = verify_signed_payload(&body, DEVICE_KEY.as_bytes()).unwrap();
    assert_eq!(document.device_id, "AERO-HOST-01");
    assert_eq!(document.timestamp, 1_700_000_000);
    assert_eq!(document.meta.rssi, -50);
}

#[test]
fn unreachable_collector_buffers_reading() {
    let mut session = host_session(deployment("http://127.0.0.1:1/readings"));

    let report = session.run_cycle().unwrap();

    assert_eq!(
        report.outcome,
        CycleOutcome::Buffered { consecutive_failures: 1, evicted: None }
    );
    assert_eq!(session.delivery().buffer().len(), 1);
    assert!(!session.collaborators().transport.is_connected());
}

#[test]
fn transport_kind_comes_from_configuration() {
    let http = connect(&deployment("https://collector.local/readings").transport).unwrap();
    assert_eq!(http.kind(), "http");

    let mqtt = DeploymentConfig::from_json(
        r#"{ "node": { "signing_enabled": false }, "transport": { "kind": "mqtt", "host": "broker.lan" } }"#,
    )
    .unwrap();
    assert_eq!(connect(&mqtt.transport).unwrap().kind(), "mqtt");
}
