//! Target indicator task
//!
//! Drives the RGB light from the proximity classifier. The light is three
//! PWM channels: red and green share one slice, blue uses a second.

use defmt::*;
use embassy_rp::pwm::{Config as PwmConfig, Pwm};
use embassy_time::Timer;

use deflect_core::config::SamplingConfig;
use deflect_core::feedback::ProximityClassifier;
use deflect_core::state::SharedTelemetryState;
use deflect_drivers::indicator::{PixelWriter, Rgb, RgbIndicator};

/// PWM counter wrap value
pub const PWM_TOP: u16 = 0x8000;

/// RGB light on two PWM slices
pub struct PwmPixel {
    red_green: Pwm<'static>,
    blue: Pwm<'static>,
    red_green_config: PwmConfig,
    blue_config: PwmConfig,
}

impl PwmPixel {
    /// Wrap slices created with [`PwmPixel::slice_config`]
    pub fn new(red_green: Pwm<'static>, blue: Pwm<'static>) -> Self {
        Self {
            red_green,
            blue,
            red_green_config: Self::slice_config(),
            blue_config: Self::slice_config(),
        }
    }

    /// Slice configuration with the light dark
    pub fn slice_config() -> PwmConfig {
        let mut config = PwmConfig::default();
        config.top = PWM_TOP;
        config.compare_a = 0;
        config.compare_b = 0;
        config
    }
}

impl PixelWriter for PwmPixel {
    fn write(&mut self, color: Rgb) -> Result<(), ()> {
        let [red, green, blue] = color.compare_values(PWM_TOP);

        self.red_green_config.compare_a = red;
        self.red_green_config.compare_b = green;
        self.blue_config.compare_a = blue;

        self.red_green.set_config(&self.red_green_config);
        self.blue.set_config(&self.blue_config);
        Ok(())
    }
}

/// Indicator task
///
/// Ticks fast while tracking a target and slower while the light is off.
#[embassy_executor::task]
pub async fn indicator_task(
    mut indicator: RgbIndicator<PwmPixel>,
    state: &'static SharedTelemetryState,
    sampling: SamplingConfig,
) {
    info!("Indicator task started");

    let mut classifier = ProximityClassifier::new();

    loop {
        match classifier.tick(state, &mut indicator).await {
            Ok(Some(class)) => debug!("Indicator -> {}", class),
            Ok(None) => {}
            Err(e) => warn!("Indicator write failed: {:?}", e),
        }

        Timer::after_millis(classifier.next_tick_ms(&sampling) as u64).await;
    }
}
