//! Battery producer
//!
//! One write of the local battery voltage per sampling period. The period
//! is long (tens of seconds) so readers must tolerate stale voltages.

use crate::state::BatteryWriter;
use crate::traits::{SensorError, VoltageSensor};

/// Samples the local battery into the shared state
pub struct BatteryProducer<'a, S> {
    sensor: S,
    writer: BatteryWriter<'a>,
}

impl<'a, S: VoltageSensor> BatteryProducer<'a, S> {
    pub fn new(sensor: S, writer: BatteryWriter<'a>) -> Self {
        Self { sensor, writer }
    }

    /// Take one sample and publish it
    ///
    /// A failed read leaves the previous voltage in place.
    pub async fn sample(&mut self) -> Result<f32, SensorError> {
        let millivolts = self.sensor.read_millivolts().await?;
        if !millivolts.is_finite() || millivolts < 0.0 {
            return Err(SensorError::OutOfRange);
        }
        self.writer.write_voltage_mv(millivolts);
        Ok(millivolts)
    }
}
