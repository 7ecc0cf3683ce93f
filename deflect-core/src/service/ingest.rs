//! Secondary sensor ingestion
//!
//! The remote node pushes its angle and battery voltage with
//! `POST /sensor2`. A reading is only written once both fields validated,
//! and the acknowledgement carries the target so the node can mirror it.

use deflect_protocol::{SecondaryReading, TargetAck};

use crate::geometry::travel;
use crate::state::SecondaryWriter;

pub struct SecondarySensorIngestor<'a> {
    writer: SecondaryWriter<'a>,
}

impl<'a> SecondarySensorIngestor<'a> {
    pub fn new(writer: SecondaryWriter<'a>) -> Self {
        Self { writer }
    }

    /// Write a validated reading into the secondary channel
    pub fn ingest(&self, reading: SecondaryReading) -> TargetAck {
        let state = self.writer.state();
        let travel_mm = travel(reading.angle_deg, state.chord_mm());

        self.writer.write_sample(reading.angle_deg, travel_mm);
        self.writer.write_voltage_mv(reading.voltage_mv);

        let target = state.target();
        TargetAck {
            target_angle: target.angle_deg,
            target_active: target.active,
        }
    }
}
