//! Battery voltage through a resistor divider
//!
//! The battery feeds an ADC pin through a divider (two equal resistors on
//! the reference board, hence the default ratio of 2). Several raw
//! conversions are averaged per sample to smooth ADC noise.

use deflect_core::config::BatteryConfig;
use deflect_core::traits::{SensorError, VoltageSensor};

/// ADC reading trait for platform abstraction
#[allow(async_fn_in_trait)]
pub trait AdcReader {
    /// Read one raw conversion
    #[allow(clippy::result_unit_err)]
    async fn read(&mut self) -> Result<u16, ()>;
}

/// Divider-scaled battery voltage sensor
pub struct DividerVoltageSensor<ADC> {
    adc: ADC,
    samples: u16,
    divider_ratio: f32,
    vref_mv: u32,
    adc_max: u16,
}

impl<ADC> DividerVoltageSensor<ADC> {
    pub fn new(adc: ADC, config: &BatteryConfig) -> Self {
        Self {
            adc,
            samples: config.samples.max(1),
            divider_ratio: config.divider_ratio,
            vref_mv: config.vref_mv,
            adc_max: config.adc_max.max(1),
        }
    }

    /// Battery voltage (mV) for an averaged raw reading
    pub fn raw_to_millivolts(&self, raw: u16) -> f32 {
        raw as f32 * self.vref_mv as f32 / self.adc_max as f32 * self.divider_ratio
    }
}

impl<ADC: AdcReader> VoltageSensor for DividerVoltageSensor<ADC> {
    async fn read_millivolts(&mut self) -> Result<f32, SensorError> {
        let mut sum: u32 = 0;
        for _ in 0..self.samples {
            sum += u32::from(self.adc.read().await.map_err(|_| SensorError::Bus)?);
        }
        let average = sum / u32::from(self.samples);

        if average > u32::from(self.adc_max) {
            return Err(SensorError::OutOfRange);
        }
        Ok(self.raw_to_millivolts(average as u16))
    }
}
