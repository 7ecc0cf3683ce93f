//! Endpoint routing, request payloads and response bodies
//!
//! Requests (client → device):
//! - `GET /sensors`: telemetry snapshot
//! - `POST /sensor2`: remote node reading, `{"angle":f,"voltage":f}`
//! - `POST /target_angle`: operator target, `{"targetAngle":f}`
//! - `POST /reset`: zero both channels
//! - `POST /chord`: chord length, `chordValue=<mm>`
//!
//! Responses are encoded into fixed-size buffers and never truncated.

use core::fmt::Write;

use heapless::String;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::http::{encode_response, ContentType, EncodeError, Method, Status};

/// Capacity of any response body (the telemetry report is the largest)
pub const BODY_CAPACITY: usize = 512;

/// Capacity of the `/sensor2` acknowledgement
pub const ACK_CAPACITY: usize = 96;

/// Largest body accepted by any endpoint
pub const MAX_BODY_SIZE: usize = 63;

/// Form key carrying the chord length
pub const CHORD_FORM_KEY: &str = "chordValue";

/// Errors that reject a request before it reaches the telemetry state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RequestError {
    /// No endpoint at this path
    NotFound,
    /// Endpoint exists but not for this method
    MethodNotAllowed,
    /// Body is not parseable as the expected structure
    MalformedPayload,
    /// Required key absent or not a number
    MissingField(&'static str),
    /// Declared body exceeds the endpoint limit
    PayloadTooLarge,
}

impl RequestError {
    pub fn status(self) -> Status {
        match self {
            RequestError::NotFound => Status::NotFound,
            RequestError::MethodNotAllowed => Status::MethodNotAllowed,
            RequestError::MalformedPayload
            | RequestError::MissingField(_)
            | RequestError::PayloadTooLarge => Status::BadRequest,
        }
    }

    /// Plain-text body sent with the rejection
    pub fn message(self) -> &'static str {
        match self {
            RequestError::NotFound => "Nothing matches the given URI",
            RequestError::MethodNotAllowed => "Method not allowed for this URI",
            RequestError::MalformedPayload => "Invalid JSON",
            RequestError::MissingField("angle") => "angle missing",
            RequestError::MissingField("voltage") => "voltage missing",
            RequestError::MissingField("targetAngle") => "targetAngle missing",
            RequestError::MissingField(_) => "Required field missing",
            RequestError::PayloadTooLarge => "Payload too large",
        }
    }
}

/// Known endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Route {
    Sensors,
    Sensor2,
    TargetAngle,
    Reset,
    Chord,
}

impl Route {
    /// Resolve a method and path to an endpoint
    pub fn resolve(method: Method, path: &str) -> Result<Self, RequestError> {
        let (route, expected) = match path {
            "/sensors" => (Route::Sensors, Method::Get),
            "/sensor2" => (Route::Sensor2, Method::Post),
            "/target_angle" => (Route::TargetAngle, Method::Post),
            "/reset" => (Route::Reset, Method::Post),
            "/chord" => (Route::Chord, Method::Post),
            _ => return Err(RequestError::NotFound),
        };
        if method != expected {
            return Err(RequestError::MethodNotAllowed);
        }
        Ok(route)
    }

    /// Maximum body length this endpoint reads (0 = body ignored)
    pub fn max_body_len(self) -> usize {
        match self {
            Route::Sensors | Route::Reset => 0,
            Route::Sensor2 | Route::TargetAngle => MAX_BODY_SIZE,
            Route::Chord => 49,
        }
    }
}

/// Reading pushed by the remote sensor node
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SecondaryReading {
    pub angle_deg: f32,
    pub voltage_mv: f32,
}

/// Operator-set target angle
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TargetRequest {
    pub angle_deg: f32,
}

/// Chord length update
///
/// Invalid values are not a protocol error: the endpoint answers with an
/// error text and keeps the previous chord length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChordUpdate {
    Length(u16),
    Invalid,
}

impl ChordUpdate {
    /// Parse `chordValue=<mm>` (or a bare number)
    pub fn parse(body: &[u8]) -> Self {
        let Ok(text) = core::str::from_utf8(body) else {
            return ChordUpdate::Invalid;
        };
        let text = text.trim_matches(|c: char| c.is_whitespace() || c == '\0');

        let value = if text.contains('=') {
            text.split('&')
                .filter_map(|pair| pair.split_once('='))
                .find(|(key, _)| key.trim() == CHORD_FORM_KEY)
                .map(|(_, value)| value)
        } else {
            Some(text)
        };

        match value.map(|v| v.trim().parse::<u16>()) {
            Some(Ok(mm)) if mm > 0 => ChordUpdate::Length(mm),
            _ => ChordUpdate::Invalid,
        }
    }
}

/// A validated request
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Request {
    Sensors,
    Sensor2(SecondaryReading),
    TargetAngle(TargetRequest),
    Reset,
    Chord(ChordUpdate),
}

impl Request {
    /// Decode the body of a resolved route
    ///
    /// Validation is complete before a `Request` exists, so handlers can
    /// write every field of a request or none of them.
    pub fn decode(route: Route, body: &[u8]) -> Result<Self, RequestError> {
        match route {
            Route::Sensors => Ok(Request::Sensors),
            Route::Reset => Ok(Request::Reset),
            Route::Chord => Ok(Request::Chord(ChordUpdate::parse(body))),
            Route::Sensor2 => {
                let payload: Sensor2Payload = decode_object(body)?;
                Ok(Request::Sensor2(SecondaryReading {
                    angle_deg: payload.angle.ok_or(RequestError::MissingField("angle"))?,
                    voltage_mv: payload
                        .voltage
                        .ok_or(RequestError::MissingField("voltage"))?,
                }))
            }
            Route::TargetAngle => {
                let payload: TargetAnglePayload = decode_object(body)?;
                let angle_deg = payload
                    .target_angle
                    .ok_or(RequestError::MissingField("targetAngle"))?;
                Ok(Request::TargetAngle(TargetRequest { angle_deg }))
            }
        }
    }
}

/// `POST /sensor2` body
#[derive(Deserialize)]
struct Sensor2Payload {
    #[serde(default, deserialize_with = "finite_number")]
    angle: Option<f32>,
    #[serde(default, deserialize_with = "finite_number")]
    voltage: Option<f32>,
}

/// `POST /target_angle` body
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TargetAnglePayload {
    #[serde(default, deserialize_with = "finite_number")]
    target_angle: Option<f32>,
}

/// Any JSON value; only finite numbers count as present
fn finite_number<'de, D>(deserializer: D) -> Result<Option<f32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value
        .as_f64()
        .map(|number| number as f32)
        .filter(|number| number.is_finite()))
}

fn decode_object<'a, T: Deserialize<'a>>(body: &'a [u8]) -> Result<T, RequestError> {
    // Fixed-size client buffers arrive NUL padded
    let end = body.iter().position(|&b| b == 0).unwrap_or(body.len());
    let body = &body[..end];

    // Structs also deserialize from JSON arrays; bodies must be objects
    match body.iter().find(|b| !b.is_ascii_whitespace()) {
        Some(b'{') => serde_json::from_slice(body).map_err(|_| RequestError::MalformedPayload),
        _ => Err(RequestError::MalformedPayload),
    }
}

/// Derived telemetry served by `GET /sensors`
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TelemetryReport {
    /// Relative travel of the primary channel (mm)
    pub travel1: f32,
    /// Relative travel of the secondary channel (mm)
    pub travel2: f32,
    /// Relative angle of the primary channel (degrees)
    pub angle1: f32,
    /// Relative angle of the secondary channel (degrees)
    pub angle2: f32,
    /// Local battery (V)
    pub voltage1: f32,
    /// Remote battery, as pushed by the node (mV)
    pub voltage2: f32,
    pub target_angle: f32,
    /// |angle1 - target_angle| when tracking, else 0
    pub target_diff: f32,
    pub target_enabled: bool,
}

impl TelemetryReport {
    /// Encode as JSON into a buffer of `N` bytes
    pub fn encode<const N: usize>(&self) -> Result<String<N>, EncodeError> {
        let mut out = String::new();
        write!(
            out,
            "{{\"travel1\":{:.1},\"travel2\":{:.1},\"angle1\":{:.1},\"angle2\":{:.1},\
             \"voltage1\":{:.2},\"voltage2\":{:.2},\"targetAngle\":{:.2},\"targetDiff\":{:.2},\
             \"targetEnabled\":{}}}",
            self.travel1,
            self.travel2,
            self.angle1,
            self.angle2,
            self.voltage1,
            self.voltage2,
            self.target_angle,
            self.target_diff,
            self.target_enabled as u8,
        )
        .map_err(|_| EncodeError::Overflow)?;
        Ok(out)
    }
}

/// Acknowledgement of `POST /sensor2`, mirrors target tracking to the remote node
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TargetAck {
    pub target_angle: f32,
    pub target_active: bool,
}

impl TargetAck {
    const FALLBACK: &'static str = "{\"targetAngle\":0.0,\"targetActive\":0}";

    pub fn encode(&self) -> String<ACK_CAPACITY> {
        let mut out = String::new();
        let written = write!(
            out,
            "{{\"targetAngle\":{:.2},\"targetActive\":{}}}",
            self.target_angle, self.target_active as u8
        );
        if written.is_err() {
            out.clear();
            // FALLBACK is shorter than ACK_CAPACITY
            let _ = out.push_str(Self::FALLBACK);
        }
        out
    }
}

/// A response ready to be written to the connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: Status,
    pub content_type: ContentType,
    pub no_store: bool,
    pub body: String<BODY_CAPACITY>,
}

impl Response {
    fn new(status: Status, content_type: ContentType, body: &str) -> Self {
        let mut text = String::new();
        // Callers only pass bodies bounded well below BODY_CAPACITY
        let _ = text.push_str(body);
        Self {
            status,
            content_type,
            no_store: false,
            body: text,
        }
    }

    pub fn json(status: Status, body: &str) -> Self {
        Self::new(status, ContentType::Json, body)
    }

    pub fn text(status: Status, body: &str) -> Self {
        Self::new(status, ContentType::Text, body)
    }

    /// `{"status":"ok"}`
    pub fn status_ok() -> Self {
        Self::json(Status::Ok, "{\"status\":\"ok\"}")
    }

    pub fn rejected(error: RequestError) -> Self {
        Self::text(error.status(), error.message())
    }

    pub fn timed_out() -> Self {
        Self::text(Status::RequestTimeout, "Request timeout")
    }

    /// Telemetry snapshot; an oversized report is a server error, never truncated
    pub fn telemetry(report: &TelemetryReport) -> Self {
        Self::telemetry_within::<BODY_CAPACITY>(report)
    }

    /// Telemetry snapshot encoded into at most `N` bytes
    pub fn telemetry_within<const N: usize>(report: &TelemetryReport) -> Self {
        let mut body = String::new();
        let encoded = report
            .encode::<N>()
            .and_then(|json| body.push_str(&json).map_err(|_| EncodeError::Overflow));

        match encoded {
            Ok(()) => Self {
                status: Status::Ok,
                content_type: ContentType::Json,
                no_store: true,
                body,
            },
            Err(EncodeError::Overflow) => {
                Self::text(Status::InternalServerError, "JSON truncated")
            }
        }
    }

    pub fn target_ack(ack: &TargetAck) -> Self {
        Self::json(Status::Ok, ack.encode().as_str())
    }

    /// Encode status line, headers and body into `out`
    pub fn encode(&self, out: &mut [u8]) -> Result<usize, EncodeError> {
        encode_response(
            self.status,
            self.content_type,
            self.no_store,
            self.body.as_bytes(),
            out,
        )
    }
}
