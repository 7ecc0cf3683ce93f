//! Configuration type definitions
//!
//! These types describe the device configuration. The firmware embeds a
//! `device.toml` and parses it with [`parse_config`](super::parse_config)
//! at boot; every field has a default so a partial file is valid.

use heapless::String;

use crate::geometry::DEFAULT_CHORD_MM;

/// Maximum SSID length (802.11)
pub const MAX_SSID_LEN: usize = 32;

/// Maximum WPA2 passphrase length
pub const MAX_PASSWORD_LEN: usize = 64;

/// Access point name used when none is configured
pub const DEFAULT_SSID: &str = "DEFLECT";

/// Chord length settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChordSettings {
    /// Chord length in effect at boot (mm)
    pub default_mm: u16,
}

impl Default for ChordSettings {
    fn default() -> Self {
        Self {
            default_mm: DEFAULT_CHORD_MM,
        }
    }
}

/// Producer and consumer cadence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SamplingConfig {
    /// Local angle sensor sampling period (ms)
    pub primary_period_ms: u32,
    /// Consecutive good samples before the primary channel counts as ready
    pub warmup_samples: u16,
    /// Battery sampling period (s)
    pub battery_period_s: u32,
    /// Classifier tick while tracking a target (ms)
    pub classifier_period_ms: u32,
    /// Classifier tick while the indicator is off (ms)
    pub classifier_idle_period_ms: u32,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            primary_period_ms: 20,
            warmup_samples: 50,
            battery_period_s: 30,
            classifier_period_ms: 50,
            classifier_idle_period_ms: 100,
        }
    }
}

/// Access point and HTTP server settings
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NetworkConfig {
    pub ssid: String<MAX_SSID_LEN>,
    /// WPA2 passphrase; empty for an open network
    pub password: String<MAX_PASSWORD_LEN>,
    /// Wi-Fi channel (1-13)
    pub channel: u8,
    /// HTTP port
    pub port: u16,
    /// Per-receive timeout (ms)
    pub recv_timeout_ms: u32,
    /// Timed-out receives tolerated per request
    pub recv_max_retries: u8,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        let mut ssid = String::new();
        // DEFAULT_SSID is shorter than MAX_SSID_LEN
        let _ = ssid.push_str(DEFAULT_SSID);
        Self {
            ssid,
            password: String::new(),
            channel: 6,
            port: 80,
            recv_timeout_ms: 5000,
            recv_max_retries: 5,
        }
    }
}

impl NetworkConfig {
    /// Whether the access point runs without encryption
    pub fn is_open(&self) -> bool {
        self.password.is_empty()
    }
}

/// Battery measurement settings
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BatteryConfig {
    /// ADC reads averaged per sample
    pub samples: u16,
    /// Resistor divider ratio between battery and ADC pin
    pub divider_ratio: f32,
    /// ADC reference voltage (mV)
    pub vref_mv: u32,
    /// Full-scale ADC reading
    pub adc_max: u16,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            samples: 64,
            divider_ratio: 2.0,
            vref_mv: 3300,
            adc_max: 4095,
        }
    }
}

/// Complete device configuration
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceConfig {
    pub chord: ChordSettings,
    pub sampling: SamplingConfig,
    pub network: NetworkConfig,
    pub battery: BatteryConfig,
}
