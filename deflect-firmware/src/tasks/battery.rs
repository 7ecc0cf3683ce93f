//! Battery sampling task
//!
//! Reads the local battery through the divider on an ADC pin every
//! `battery_period_s` seconds.

use defmt::*;
use embassy_rp::adc::{Adc, Async, Channel};
use embassy_time::{Duration, Ticker};

use deflect_core::sampling::BatteryProducer;
use deflect_core::state::SharedTelemetryState;
use deflect_drivers::battery::{AdcReader, DividerVoltageSensor};

/// RP2040 ADC with the battery channel
pub struct BatteryAdc {
    adc: Adc<'static, Async>,
    channel: Channel<'static>,
}

impl BatteryAdc {
    pub fn new(adc: Adc<'static, Async>, channel: Channel<'static>) -> Self {
        Self { adc, channel }
    }
}

impl AdcReader for BatteryAdc {
    async fn read(&mut self) -> Result<u16, ()> {
        self.adc.read(&mut self.channel).await.map_err(|_| ())
    }
}

/// Battery task
#[embassy_executor::task]
pub async fn battery_task(
    sensor: DividerVoltageSensor<BatteryAdc>,
    state: &'static SharedTelemetryState,
    period_s: u32,
) {
    info!("Battery task started");

    let writer = match state.battery_writer() {
        Ok(writer) => writer,
        Err(e) => {
            error!("Battery task cannot claim the battery writer: {:?}", e);
            return;
        }
    };

    let mut producer = BatteryProducer::new(sensor, writer);
    let mut ticker = Ticker::every(Duration::from_secs(period_s as u64));

    loop {
        match producer.sample().await {
            Ok(millivolts) => info!("Battery: {} mV", millivolts),
            Err(e) => error!("Battery read failed: {:?}", e),
        }
        ticker.next().await;
    }
}
