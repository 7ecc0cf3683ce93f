//! Configuration loading
//!
//! The device configuration is embedded at build time (`device.toml`,
//! validated by build.rs) and parsed at boot by the no_std parser in
//! `deflect_core::config`.

use defmt::*;

use deflect_core::config::{parse_config, DeviceConfig};

/// Embedded configuration (compiled into firmware)
/// Edit device.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../../device.toml");

/// Parse the embedded configuration, falling back to built-in defaults
pub fn load_config() -> DeviceConfig {
    match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => {
            info!("Parsed embedded configuration successfully");
            config
        }
        Err(e) => {
            // build.rs validates the same file, so only a parser/validator
            // disagreement ends up here
            error!("Failed to parse embedded config: {:?}", e);
            error!("Using default configuration");
            DeviceConfig::default()
        }
    }
}
