//! Primary channel sampler
//!
//! Converts each local angle sample to travel with the current chord
//! length and writes both into the primary channel. The channel is flagged
//! ready once the sensor has produced `warmup_samples` good samples in a
//! row; until then the classifier keeps the indicator off.

use crate::geometry::travel;
use crate::state::PrimaryWriter;
use crate::traits::{AngleSensor, SensorError};

/// Result of one primary sample
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PrimarySample {
    pub angle_deg: f32,
    pub travel_mm: f32,
    /// The channel became ready with this sample
    pub became_ready: bool,
}

/// Samples the local angle sensor into the shared state
pub struct PrimarySampler<'a, S> {
    sensor: S,
    writer: PrimaryWriter<'a>,
    warmup_samples: u16,
    streak: u16,
    ready: bool,
}

impl<'a, S: AngleSensor> PrimarySampler<'a, S> {
    pub fn new(sensor: S, writer: PrimaryWriter<'a>, warmup_samples: u16) -> Self {
        Self {
            sensor,
            writer,
            warmup_samples,
            streak: 0,
            ready: false,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Take one sample and publish it
    pub async fn sample(&mut self) -> Result<PrimarySample, SensorError> {
        let angle_deg = match self.sensor.read_angle().await {
            Ok(angle) if angle.is_finite() => angle,
            Ok(_) => return Err(self.fail(SensorError::OutOfRange)),
            Err(e) => return Err(self.fail(e)),
        };

        let chord_mm = self.writer.state().chord_mm();
        let travel_mm = travel(angle_deg, chord_mm);
        self.writer.write_sample(angle_deg, travel_mm);

        let mut became_ready = false;
        if !self.ready {
            self.streak = self.streak.saturating_add(1);
            if self.streak >= self.warmup_samples {
                self.ready = true;
                self.writer.set_ready(true);
                became_ready = true;
            }
        }

        Ok(PrimarySample {
            angle_deg,
            travel_mm,
            became_ready,
        })
    }

    fn fail(&mut self, error: SensorError) -> SensorError {
        // A ready channel stays ready across glitches
        if !self.ready {
            self.streak = 0;
        }
        error
    }
}
