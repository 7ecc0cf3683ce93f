//! End-to-end request handling without hardware
//!
//! Raw request bytes go through the request reader, the router and the
//! response encoder, exactly as the firmware HTTP task wires them.

use deflect_core::feedback::{ProximityClass, ProximityClassifier};
use deflect_core::geometry::travel;
use deflect_core::state::{Channel, SharedTelemetryState};
use deflect_core::service::Router;
use deflect_protocol::{RecvError, RequestReader, Transport};
use embassy_futures::block_on;

/// Delivers one request in fixed-size pieces
struct Client<'a> {
    data: &'a [u8],
    piece: usize,
}

impl Transport for Client<'_> {
    async fn recv(&mut self, buf: &mut [u8]) -> Result<usize, RecvError> {
        let n = self.data.len().min(buf.len()).min(self.piece);
        buf[..n].copy_from_slice(&self.data[..n]);
        self.data = &self.data[n..];
        Ok(n)
    }
}

fn exchange(router: &Router<'_>, request: &str) -> String {
    let mut client = Client {
        data: request.as_bytes(),
        piece: 7,
    };
    let read = block_on(RequestReader::default().read(&mut client));
    let response = router.respond(read).expect("connection closed");

    let mut out = [0u8; 1024];
    let len = response.encode(&mut out).unwrap();
    String::from_utf8(out[..len].to_vec()).unwrap()
}

fn post(path: &str, body: &str) -> String {
    format!(
        "POST {} HTTP/1.1\r\nHost: 192.168.4.1\r\nContent-Length: {}\r\n\r\n{}",
        path,
        body.len(),
        body
    )
}

const GET_SENSORS: &str = "GET /sensors HTTP/1.1\r\nHost: 192.168.4.1\r\n\r\n";

fn body(response: &str) -> &str {
    response.split("\r\n\r\n").nth(1).unwrap_or("")
}

/// Pull a numeric field out of the telemetry JSON
fn field(response: &str, key: &str) -> f32 {
    let pattern = format!("\"{}\":", key);
    let json = body(response);
    let start = json.find(&pattern).unwrap() + pattern.len();
    let rest = &json[start..];
    let end = rest.find([',', '}']).unwrap();
    rest[..end].parse().unwrap()
}

#[test]
fn test_sensor2_then_sensors() {
    let state = SharedTelemetryState::new(50);
    let router = Router::new(&state).unwrap();

    let ack = exchange(&router, &post("/sensor2", "{\"angle\":10.0,\"voltage\":3700}"));
    assert!(ack.starts_with("HTTP/1.1 200 OK\r\n"));
    assert_eq!(body(&ack), "{\"targetAngle\":0.00,\"targetActive\":0}");

    let report = exchange(&router, GET_SENSORS);
    assert!(report.contains("Cache-Control: no-store\r\n"));
    assert!((field(&report, "angle2") - 10.0).abs() < 0.05);
    assert!((field(&report, "travel2") - 8.72).abs() < 0.05);
    assert!(report.contains("\"voltage2\":3700.00,"));
    assert_eq!(field(&report, "targetEnabled"), 0.0);
}

#[test]
fn test_target_angle_then_sensors() {
    let state = SharedTelemetryState::default();
    let router = Router::new(&state).unwrap();

    let ok = exchange(&router, &post("/target_angle", "{\"targetAngle\":15}"));
    assert_eq!(body(&ok), "{\"status\":\"ok\"}");

    let report = exchange(&router, GET_SENSORS);
    assert!(body(&report).contains("\"targetAngle\":15.00"));
    assert!(body(&report).contains("\"targetEnabled\":1"));
    assert_eq!(field(&report, "targetDiff"), 15.0);
}

#[test]
fn test_malformed_bodies_leave_state_unchanged() {
    let state = SharedTelemetryState::default();
    let router = Router::new(&state).unwrap();
    exchange(&router, &post("/sensor2", "{\"angle\":2.0,\"voltage\":3600}"));
    exchange(&router, &post("/target_angle", "{\"targetAngle\":4}"));

    let rejected = exchange(&router, &post("/sensor2", "{\"angle\":\"bad\"}"));
    assert!(rejected.starts_with("HTTP/1.1 400 Bad Request\r\n"));
    let rejected = exchange(&router, &post("/target_angle", "{\"angle\":\"bad\"}"));
    assert!(rejected.starts_with("HTTP/1.1 400 Bad Request\r\n"));

    assert_eq!(state.raw_angle(Channel::Secondary), 2.0);
    assert_eq!(state.remote_voltage_mv(), 3600.0);
    assert_eq!(state.target().angle_deg, 4.0);
}

#[test]
fn test_oversized_target_body_rejected() {
    let state = SharedTelemetryState::default();
    let router = Router::new(&state).unwrap();
    let padded = format!("{{\"targetAngle\":15{}}}", " ".repeat(80));

    let response = exchange(&router, &post("/target_angle", &padded));

    assert!(response.starts_with("HTTP/1.1 400 Bad Request\r\n"));
    assert_eq!(body(&response), "Payload too large");
    assert!(!state.target().active);
}

#[test]
fn test_reset_zeroes_reported_values() {
    let state = SharedTelemetryState::new(50);
    let router = Router::new(&state).unwrap();
    let primary = state.primary_writer().unwrap();
    primary.write_sample(6.0, travel(6.0, 50));
    exchange(&router, &post("/sensor2", "{\"angle\":-3.0,\"voltage\":3600}"));

    let ok = exchange(&router, &post("/reset", ""));
    assert_eq!(body(&ok), "{\"status\":\"ok\"}");

    let report = exchange(&router, GET_SENSORS);
    for key in ["angle1", "angle2", "travel1", "travel2"] {
        assert_eq!(field(&report, key), 0.0, "{} not zeroed", key);
    }
}

#[test]
fn test_chord_form_changes_conversion() {
    let state = SharedTelemetryState::new(50);
    let router = Router::new(&state).unwrap();

    let changed = exchange(&router, &post("/chord", "chordValue=100"));
    assert!(changed.contains("Content-Type: text/plain"));
    assert_eq!(body(&changed), "Changing chord from 50 mm to 100 mm\n");

    let rejected = exchange(&router, &post("/chord", "chordValue=-1"));
    assert_eq!(body(&rejected), "ERROR : chord must be a positive value\n");
    assert_eq!(state.chord_mm(), 100);

    exchange(&router, &post("/sensor2", "{\"angle\":10.0,\"voltage\":3700}"));
    let report = exchange(&router, GET_SENSORS);
    assert!((field(&report, "travel2") - 17.43).abs() < 0.05);
}

#[test]
fn test_unknown_and_wrong_method() {
    let state = SharedTelemetryState::default();
    let router = Router::new(&state).unwrap();

    let missing = exchange(&router, "GET /runtime_stats HTTP/1.1\r\n\r\n");
    assert!(missing.starts_with("HTTP/1.1 404 Not Found\r\n"));

    let wrong = exchange(&router, "GET /reset HTTP/1.1\r\n\r\n");
    assert!(wrong.starts_with("HTTP/1.1 405 Method Not Allowed\r\n"));
}

#[test]
fn test_classifier_follows_network_target() {
    let state = SharedTelemetryState::default();
    let router = Router::new(&state).unwrap();
    let primary = state.primary_writer().unwrap();
    primary.write_sample(14.6, 0.0);

    assert_eq!(ProximityClassifier::classify(&state), ProximityClass::Off);

    exchange(&router, &post("/target_angle", "{\"targetAngle\":15}"));
    // Tracking waits for the primary sensor
    assert_eq!(ProximityClassifier::classify(&state), ProximityClass::Off);

    primary.set_ready(true);
    assert_eq!(ProximityClassifier::classify(&state), ProximityClass::Blue);
}
