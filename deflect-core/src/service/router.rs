//! Request dispatch
//!
//! Owns every request-driven writer role, so at most one router exists per
//! telemetry state. Decoding and validation happen in the protocol crate;
//! by the time a [`Request`] reaches the router, it can be applied whole.

use deflect_protocol::{Inbound, ReadError, Request, Response, Status};

use crate::state::{ClaimError, SharedTelemetryState};

use super::{
    CalibrationService, ChordService, SecondarySensorIngestor, TargetConfigService,
    TelemetryQueryService,
};

pub struct Router<'a> {
    query: TelemetryQueryService<'a>,
    ingest: SecondarySensorIngestor<'a>,
    target: TargetConfigService<'a>,
    calibration: CalibrationService<'a>,
    chord: ChordService<'a>,
}

impl<'a> Router<'a> {
    /// Claim the secondary, target, calibration and chord writers
    pub fn new(state: &'a SharedTelemetryState) -> Result<Self, ClaimError> {
        Ok(Self {
            query: TelemetryQueryService::new(state),
            ingest: SecondarySensorIngestor::new(state.secondary_writer()?),
            target: TargetConfigService::new(state.target_writer()?),
            calibration: CalibrationService::new(state.calibration_writer()?),
            chord: ChordService::new(state.chord_writer()?),
        })
    }

    /// Apply a validated request
    pub fn handle(&self, request: Request) -> Response {
        match request {
            Request::Sensors => Response::telemetry(&self.query.snapshot()),
            Request::Sensor2(reading) => Response::target_ack(&self.ingest.ingest(reading)),
            Request::TargetAngle(target) => {
                self.target.set_target(target);
                Response::status_ok()
            }
            Request::Reset => {
                self.calibration.reset();
                Response::status_ok()
            }
            Request::Chord(update) => {
                let outcome = self.chord.apply(update);
                Response::text(Status::Ok, outcome.message().as_str())
            }
        }
    }

    /// Turn the outcome of reading a connection into a response
    ///
    /// Returns `None` when the peer is gone and there is nobody to answer.
    pub fn respond(&self, read: Result<Inbound, ReadError>) -> Option<Response> {
        match read {
            Ok(Inbound {
                request: Ok(request),
                ..
            }) => Some(self.handle(request)),
            Ok(Inbound {
                request: Err(error),
                ..
            }) => Some(Response::rejected(error)),
            Err(ReadError::Head(_)) => {
                Some(Response::text(Status::BadRequest, "Malformed request"))
            }
            Err(ReadError::Stalled) => Some(Response::timed_out()),
            Err(ReadError::Closed) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deflect_protocol::{ChordUpdate, HeadError, RequestError, TargetRequest};

    #[test]
    fn test_router_claims_request_roles_once() {
        let state = SharedTelemetryState::default();
        let _router = Router::new(&state).unwrap();

        assert!(Router::new(&state).is_err());
        // Producer roles stay available
        assert!(state.primary_writer().is_ok());
        assert!(state.battery_writer().is_ok());
    }

    #[test]
    fn test_target_then_sensors() {
        let state = SharedTelemetryState::default();
        let router = Router::new(&state).unwrap();

        let ok = router.handle(Request::TargetAngle(TargetRequest { angle_deg: 15.0 }));
        assert_eq!(ok.body.as_str(), "{\"status\":\"ok\"}");

        let report = router.handle(Request::Sensors);
        assert_eq!(report.status, Status::Ok);
        assert!(report.no_store);
        assert!(report.body.contains("\"targetAngle\":15.00"));
        assert!(report.body.contains("\"targetEnabled\":1"));
    }

    #[test]
    fn test_chord_answers_text() {
        let state = SharedTelemetryState::default();
        let router = Router::new(&state).unwrap();

        let response = router.handle(Request::Chord(ChordUpdate::Invalid));

        assert_eq!(response.status, Status::Ok);
        assert_eq!(
            response.body.as_str(),
            "ERROR : chord must be a positive value\n"
        );
    }

    #[test]
    fn test_respond_maps_read_failures() {
        let state = SharedTelemetryState::default();
        let router = Router::new(&state).unwrap();

        let timed_out = router.respond(Err(ReadError::Stalled)).unwrap();
        assert_eq!(timed_out.status, Status::RequestTimeout);

        let bad = router
            .respond(Err(ReadError::Head(HeadError::InvalidRequestLine)))
            .unwrap();
        assert_eq!(bad.status, Status::BadRequest);

        assert_eq!(router.respond(Err(ReadError::Closed)), None);
    }

    #[test]
    fn test_respond_rejects_request_errors() {
        let state = SharedTelemetryState::default();
        let router = Router::new(&state).unwrap();
        let head = deflect_protocol::RequestHead::parse(b"GET /nope HTTP/1.1\r\n\r\n").unwrap();

        let response = router
            .respond(Ok(Inbound {
                head,
                request: Err(RequestError::NotFound),
            }))
            .unwrap();

        assert_eq!(response.status, Status::NotFound);
        assert_eq!(response.body.as_str(), "Nothing matches the given URI");
    }
}
