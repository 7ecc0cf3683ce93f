//! Deflect - Control Surface Deflection Monitor Firmware
//!
//! Main firmware binary for the Raspberry Pi Pico W. Measures the local
//! control surface with an MPU-6050, accepts readings from a remote node
//! over a Wi-Fi access point, and serves the combined telemetry over HTTP.
//!
//! Wiring:
//! - MPU-6050: I2C0, SDA on GP4, SCL on GP5
//! - Battery divider: GP26 (ADC0)
//! - RGB light: red GP16, green GP17, blue GP18
//! - Status LED: onboard (through the radio)

#![no_std]
#![no_main]

extern crate alloc;

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::adc::{Adc, Channel, Config as AdcConfig, InterruptHandler as AdcInterruptHandler};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::Pull;
use embassy_rp::i2c::{Config as I2cConfig, I2c, InterruptHandler as I2cInterruptHandler};
use embassy_rp::peripherals::{I2C0, PIO0};
use embassy_rp::pio::InterruptHandler as PioInterruptHandler;
use embassy_rp::pwm::Pwm;
use embedded_alloc::LlffHeap as Heap;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use deflect_core::state::SharedTelemetryState;
use deflect_drivers::battery::DividerVoltageSensor;
use deflect_drivers::imu::{Mpu6050, TiltAxis, MPU6050_ADDRESS};
use deflect_drivers::indicator::RgbIndicator;

use crate::tasks::{BatteryAdc, PwmPixel, RadioResources};

// Heap allocator for JSON request bodies
#[global_allocator]
static HEAP: Heap = Heap::empty();

// Heap size: 16KB
const HEAP_SIZE: usize = 16 * 1024;

mod channels;
mod config;
mod tasks;

bind_interrupts!(pub struct Irqs {
    PIO0_IRQ_0 => PioInterruptHandler<PIO0>;
    I2C0_IRQ => I2cInterruptHandler<I2C0>;
    ADC_IRQ_FIFO => AdcInterruptHandler;
});

/// Telemetry shared by every task (chord length comes from the config)
static TELEMETRY: StaticCell<SharedTelemetryState> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Deflect firmware starting...");

    init_heap();

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = config::load_config();
    info!(
        "Chord {} mm, primary every {} ms, battery every {} s",
        config.chord.default_mm,
        config.sampling.primary_period_ms,
        config.sampling.battery_period_s
    );

    let state: &'static SharedTelemetryState =
        TELEMETRY.init(SharedTelemetryState::new(config.chord.default_mm));

    // Primary IMU
    let i2c = I2c::new_async(p.I2C0, p.PIN_5, p.PIN_4, Irqs, I2cConfig::default());
    let imu = Mpu6050::new(i2c, MPU6050_ADDRESS, TiltAxis::X);

    // Battery divider
    let adc = Adc::new(p.ADC, Irqs, AdcConfig::default());
    let battery_channel = Channel::new_pin(p.PIN_26, Pull::None);
    let battery_adc = BatteryAdc::new(adc, battery_channel);
    let battery = DividerVoltageSensor::new(battery_adc, &config.battery);

    // RGB light
    let red_green = Pwm::new_output_ab(p.PWM_SLICE0, p.PIN_16, p.PIN_17, PwmPixel::slice_config());
    let blue = Pwm::new_output_a(p.PWM_SLICE1, p.PIN_18, PwmPixel::slice_config());
    let indicator = RgbIndicator::new(PwmPixel::new(red_green, blue));

    // Radio and network stack
    let radio = RadioResources {
        pwr: p.PIN_23,
        dio: p.PIN_24,
        cs: p.PIN_25,
        clk: p.PIN_29,
        pio: p.PIO0,
        dma: p.DMA_CH0,
    };
    let (control, stack) = tasks::init_radio(spawner, radio).await;
    info!("Radio initialized");

    // Spawn tasks
    spawner
        .spawn(tasks::measure_task(imu, state, config.sampling))
        .unwrap();
    spawner
        .spawn(tasks::battery_task(battery, state, config.sampling.battery_period_s))
        .unwrap();
    spawner
        .spawn(tasks::indicator_task(indicator, state, config.sampling))
        .unwrap();
    spawner
        .spawn(tasks::http_server_task(stack, config.network.clone(), state))
        .unwrap();
    spawner
        .spawn(tasks::access_point_task(control, stack, config.network, state))
        .unwrap();

    info!("All tasks spawned, firmware running");
}

/// Initialize the heap allocator
fn init_heap() {
    use core::mem::MaybeUninit;
    static mut HEAP_MEM: [MaybeUninit<u8>; HEAP_SIZE] = [MaybeUninit::uninit(); HEAP_SIZE];
    #[allow(static_mut_refs)]
    unsafe {
        HEAP.init(HEAP_MEM.as_ptr() as usize, HEAP_SIZE)
    }
}
