//! Primary measurement task
//!
//! Samples the local MPU-6050 at a fixed rate and publishes angle and
//! travel through the primary writer.

use defmt::*;
use embassy_rp::i2c::{Async, I2c};
use embassy_rp::peripherals::I2C0;
use embassy_time::{Duration, Ticker, Timer};

use deflect_core::config::SamplingConfig;
use deflect_core::sampling::PrimarySampler;
use deflect_core::state::SharedTelemetryState;
use deflect_drivers::imu::Mpu6050;

/// The IMU on the primary control surface
pub type PrimaryImu = Mpu6050<I2c<'static, I2C0, Async>>;

/// Delay between IMU bring-up attempts
const INIT_RETRY_MS: u64 = 1000;

/// Measurement task
#[embassy_executor::task]
pub async fn measure_task(
    mut imu: PrimaryImu,
    state: &'static SharedTelemetryState,
    sampling: SamplingConfig,
) {
    info!("Measure task started");

    let writer = match state.primary_writer() {
        Ok(writer) => writer,
        Err(e) => {
            error!("Measure task cannot claim the primary writer: {:?}", e);
            return;
        }
    };

    while let Err(e) = imu.init().await {
        error!("IMU init failed: {:?}, retrying", e);
        Timer::after_millis(INIT_RETRY_MS).await;
    }
    info!("IMU initialized");

    let mut sampler = PrimarySampler::new(imu, writer, sampling.warmup_samples);
    let mut ticker = Ticker::every(Duration::from_millis(sampling.primary_period_ms as u64));
    let mut failing = false;

    loop {
        ticker.next().await;

        match sampler.sample().await {
            Ok(sample) => {
                if failing {
                    info!("IMU readings recovered");
                    failing = false;
                }
                if sample.became_ready {
                    info!("Primary channel ready");
                }
                trace!(
                    "Primary: {} deg, {} mm",
                    sample.angle_deg,
                    sample.travel_mm
                );
            }
            Err(e) => {
                // Log the first failure of a streak only
                if !failing {
                    error!("IMU read failed: {:?}", e);
                    failing = true;
                }
            }
        }
    }
}
