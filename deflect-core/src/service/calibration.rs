//! Zero calibration
//!
//! Backs `POST /reset`: each channel's current raw reading becomes its new
//! zero. The raw values are read without synchronizing with the producers,
//! so a sample landing mid-reset only shifts the baseline.

use crate::state::{CalibrationWriter, Channel};

pub struct CalibrationService<'a> {
    writer: CalibrationWriter<'a>,
}

impl<'a> CalibrationService<'a> {
    pub fn new(writer: CalibrationWriter<'a>) -> Self {
        Self { writer }
    }

    /// Re-baseline both channels against their current raw values
    pub fn reset(&self) {
        let state = self.writer.state();
        for channel in Channel::ALL {
            self.writer
                .write_offsets(channel, state.raw_angle(channel), state.raw_travel(channel));
        }
    }
}
