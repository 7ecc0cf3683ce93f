//! Wi-Fi access point
//!
//! Brings up the CYW43439 as an access point with a static address and
//! turns link changes into HTTP server start/stop requests through
//! [`ServerLifecycle`]. The radio `Control` stays owned by the access point
//! task, which also drives the onboard LED (wired to the radio's GPIO 0) as
//! the status heartbeat.

use cyw43::aligned_bytes;
use cyw43_pio::{PioSpi, DEFAULT_CLOCK_DIVIDER};
use defmt::*;
use embassy_executor::Spawner;
use embassy_net::{
    Config as NetConfig, Ipv4Address, Ipv4Cidr, Stack, StackResources, StaticConfigV4,
};
use embassy_rp::gpio::{Level, Output};
use embassy_rp::peripherals::{DMA_CH0, PIN_23, PIN_24, PIN_25, PIN_29, PIO0};
use embassy_rp::pio::Pio;
use embassy_rp::Peri;
use embassy_time::{Instant, Timer};
use static_cell::StaticCell;

use deflect_core::config::NetworkConfig;
use deflect_core::feedback::Heartbeat;
use deflect_core::state::{LinkEvent, ServerLifecycle, ServerState, SharedTelemetryState};

use crate::channels::SERVER_ACTION;
use crate::Irqs;

/// Access point address; stations use static addresses in the same /24
pub const AP_ADDRESS: [u8; 4] = [192, 168, 4, 1];

/// Radio GPIO driving the onboard LED
const STATUS_LED_GPIO: u8 = 0;

/// Sockets available to the network stack
const SOCKET_COUNT: usize = 4;

type RadioSpi = PioSpi<'static, PIO0, 0, DMA_CH0>;

/// Radio pins and peripherals
pub struct RadioResources {
    pub pwr: Peri<'static, PIN_23>,
    pub dio: Peri<'static, PIN_24>,
    pub cs: Peri<'static, PIN_25>,
    pub clk: Peri<'static, PIN_29>,
    pub pio: Peri<'static, PIO0>,
    pub dma: Peri<'static, DMA_CH0>,
}

/// Power up the radio and create the network stack
///
/// Spawns the radio and network runners; returns the radio control handle
/// and the stack.
pub async fn init_radio(
    spawner: Spawner,
    radio: RadioResources,
) -> (cyw43::Control<'static>, Stack<'static>) {
    let fw = aligned_bytes!("../../cyw43-firmware/43439A0.bin");
    let clm = include_bytes!("../../cyw43-firmware/43439A0_clm.bin");
    let nvram = aligned_bytes!("../../cyw43-firmware/nvram_rp2040.bin");

    let pwr = Output::new(radio.pwr, Level::Low);
    let cs = Output::new(radio.cs, Level::High);
    let mut pio = Pio::new(radio.pio, Irqs);
    let spi = PioSpi::new(
        &mut pio.common,
        pio.sm0,
        DEFAULT_CLOCK_DIVIDER,
        pio.irq0,
        cs,
        radio.dio,
        radio.clk,
        radio.dma,
    );

    static STATE: StaticCell<cyw43::State> = StaticCell::new();
    let state = STATE.init(cyw43::State::new());
    let (net_device, mut control, runner) = cyw43::new(state, pwr, spi, fw, nvram).await;
    spawner.spawn(radio_task(runner)).unwrap();

    control.init(clm).await;
    control
        .set_power_management(cyw43::PowerManagementMode::None)
        .await;

    let mac = control.address().await;
    debug!(
        "Radio MAC address: {:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
        mac[0], mac[1], mac[2], mac[3], mac[4], mac[5]
    );

    let [a, b, c, d] = AP_ADDRESS;
    let net_config = NetConfig::ipv4_static(StaticConfigV4 {
        address: Ipv4Cidr::new(Ipv4Address::new(a, b, c, d), 24),
        gateway: None,
        dns_servers: Default::default(),
    });

    static RESOURCES: StaticCell<StackResources<SOCKET_COUNT>> = StaticCell::new();
    let (stack, runner) = embassy_net::new(
        net_device,
        net_config,
        RESOURCES.init(StackResources::new()),
        stack_seed(mac),
    );
    spawner.spawn(net_task(runner)).unwrap();

    (control, stack)
}

/// Seed for the stack's sequence numbers
fn stack_seed(mac: [u8; 6]) -> u64 {
    let mut bytes = [0u8; 8];
    bytes[..6].copy_from_slice(&mac);
    u64::from_le_bytes(bytes) ^ Instant::now().as_ticks().rotate_left(17)
}

#[embassy_executor::task]
async fn radio_task(
    runner: cyw43::Runner<'static, cyw43::SpiBus<Output<'static>, RadioSpi>>,
) -> ! {
    runner.run().await
}

#[embassy_executor::task]
async fn net_task(mut runner: embassy_net::Runner<'static, cyw43::NetDriver<'static>>) -> ! {
    runner.run().await
}

/// Access point task
///
/// Starts the access point, then loops at the heartbeat rate: toggles the
/// status LED and reports link changes to the HTTP server.
#[embassy_executor::task]
pub async fn access_point_task(
    mut control: cyw43::Control<'static>,
    stack: Stack<'static>,
    network: NetworkConfig,
    state: &'static SharedTelemetryState,
) -> ! {
    info!("Access point task started");

    let ssid = network.ssid.as_str();
    if network.is_open() {
        info!("Starting open access point '{}' on channel {}", ssid, network.channel);
        control.start_ap_open(ssid, network.channel).await;
    } else {
        info!("Starting WPA2 access point '{}' on channel {}", ssid, network.channel);
        control
            .start_ap_wpa2(ssid, network.password.as_str(), network.channel)
            .await;
    }

    let mut lifecycle = ServerLifecycle::new();
    let mut heartbeat = Heartbeat::new();

    loop {
        control.gpio_set(STATUS_LED_GPIO, heartbeat.toggle()).await;

        if let Some(event) = link_event(lifecycle.state(), stack.is_link_up()) {
            if let Some(action) = lifecycle.handle(event) {
                info!("Link event {} -> server {}", event, action);
                SERVER_ACTION.signal(action);
            }
        }

        let half_period = Heartbeat::half_period_ms(state.primary_ready());
        Timer::after_millis(half_period as u64).await;
    }
}

/// Link edge relevant to the current server state
fn link_event(server: ServerState, link_up: bool) -> Option<LinkEvent> {
    match (server, link_up) {
        (ServerState::Stopped, true) => Some(LinkEvent::ApStarted),
        (ServerState::Running, false) => Some(LinkEvent::ApStopped),
        _ => None,
    }
}
