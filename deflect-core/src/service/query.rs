//! Telemetry snapshot
//!
//! Derived values are recomputed from the raw fields on every call; nothing
//! is cached. Fields are read one at a time and may straddle producer
//! updates.

use deflect_protocol::TelemetryReport;

use crate::state::{Channel, SharedTelemetryState};

pub struct TelemetryQueryService<'a> {
    state: &'a SharedTelemetryState,
}

impl<'a> TelemetryQueryService<'a> {
    pub fn new(state: &'a SharedTelemetryState) -> Self {
        Self { state }
    }

    pub fn snapshot(&self) -> TelemetryReport {
        let state = self.state;
        let angle1 = state.relative_angle(Channel::Primary);
        let target = state.target();
        let target_diff = if target.active {
            libm::fabsf(angle1 - target.angle_deg)
        } else {
            0.0
        };

        TelemetryReport {
            travel1: state.relative_travel(Channel::Primary),
            travel2: state.relative_travel(Channel::Secondary),
            angle1,
            angle2: state.relative_angle(Channel::Secondary),
            voltage1: state.local_voltage_mv() / 1000.0,
            // The remote node's value is served as pushed
            voltage2: state.remote_voltage_mv(),
            target_angle: target.angle_deg,
            target_diff,
            target_enabled: target.active,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_before_any_target() {
        let state = SharedTelemetryState::default();
        state.primary_writer().unwrap().write_sample(3.0, 2.6);

        let report = TelemetryQueryService::new(&state).snapshot();

        assert!(!report.target_enabled);
        assert_eq!(report.target_diff, 0.0);
        assert_eq!(report.angle1, 3.0);
    }

    #[test]
    fn test_target_diff_is_absolute_relative_deviation() {
        let state = SharedTelemetryState::default();
        state.primary_writer().unwrap().write_sample(9.0, 0.0);
        state
            .calibration_writer()
            .unwrap()
            .write_offsets(Channel::Primary, 1.0, 0.0);
        state.target_writer().unwrap().publish(10.5);

        let report = TelemetryQueryService::new(&state).snapshot();

        assert!(report.target_enabled);
        assert_eq!(report.angle1, 8.0);
        assert_eq!(report.target_diff, 2.5);
        assert_eq!(report.target_angle, 10.5);
    }

    #[test]
    fn test_local_voltage_in_volts_remote_as_pushed() {
        let state = SharedTelemetryState::default();
        state.battery_writer().unwrap().write_voltage_mv(3850.0);
        state.secondary_writer().unwrap().write_voltage_mv(4100.0);

        let report = TelemetryQueryService::new(&state).snapshot();

        assert_eq!(report.voltage1, 3.85);
        assert_eq!(report.voltage2, 4100.0);
    }
}
