//! Parser for `device.toml`
//!
//! Handles only the TOML subset the device configuration uses:
//! - `[section]` headers (`chord`, `sampling`, `network`, `battery`)
//! - `key = value` pairs with string, integer, float and boolean values
//! - Comments (`# ...`), including trailing comments
//!
//! Keys that are not present keep their default. Unknown sections and keys
//! are errors so a typo never silently falls back to a default.

use heapless::String;

use super::types::{DeviceConfig, MAX_PASSWORD_LEN, MAX_SSID_LEN};

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Unknown or malformed section header
    InvalidSection,
    /// Key not valid in its section
    UnknownKey,
    /// Value has the wrong type or does not fit
    InvalidValue,
    /// Value parsed but is outside its allowed range
    OutOfRange,
}

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Chord,
    Sampling,
    Network,
    Battery,
}

/// Parse TOML configuration into a [`DeviceConfig`]
pub fn parse_config(input: &str) -> Result<DeviceConfig, ParseError> {
    let mut config = DeviceConfig::default();
    let mut section = Section::Root;

    for line in input.lines() {
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') {
            let header = strip_comment(line)
                .strip_prefix('[')
                .and_then(|rest| rest.strip_suffix(']'))
                .ok_or(ParseError::InvalidSection)?;
            section = parse_section_header(header)?;
            continue;
        }

        let (key, value) = parse_key_value(line).ok_or(ParseError::InvalidValue)?;
        apply_value(section, key, value, &mut config)?;
    }

    validate(&config)?;
    Ok(config)
}

fn parse_section_header(header: &str) -> Result<Section, ParseError> {
    match header.trim() {
        "chord" => Ok(Section::Chord),
        "sampling" => Ok(Section::Sampling),
        "network" => Ok(Section::Network),
        "battery" => Ok(Section::Battery),
        _ => Err(ParseError::InvalidSection),
    }
}

/// Cut at the first `#` outside a string
fn strip_comment(text: &str) -> &str {
    let mut in_string = false;
    for (pos, c) in text.char_indices() {
        match c {
            '"' => in_string = !in_string,
            '#' if !in_string => return text[..pos].trim(),
            _ => {}
        }
    }
    text
}

fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    let value = strip_comment(value.trim());

    if key.is_empty() || value.is_empty() {
        return None;
    }
    Some((key, value))
}

fn parse_string<const N: usize>(value: &str) -> Result<String<N>, ParseError> {
    let inner = value
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .ok_or(ParseError::InvalidValue)?;
    let mut out = String::new();
    out.push_str(inner).map_err(|_| ParseError::InvalidValue)?;
    Ok(out)
}

fn parse_int<T: core::str::FromStr>(value: &str) -> Result<T, ParseError> {
    value.parse().map_err(|_| ParseError::InvalidValue)
}

fn parse_float(value: &str) -> Result<f32, ParseError> {
    let parsed: f32 = value.parse().map_err(|_| ParseError::InvalidValue)?;
    if !parsed.is_finite() {
        return Err(ParseError::InvalidValue);
    }
    Ok(parsed)
}

fn apply_value(
    section: Section,
    key: &str,
    value: &str,
    config: &mut DeviceConfig,
) -> Result<(), ParseError> {
    match section {
        Section::Root => return Err(ParseError::UnknownKey),
        Section::Chord => match key {
            "default_mm" => config.chord.default_mm = parse_int(value)?,
            _ => return Err(ParseError::UnknownKey),
        },
        Section::Sampling => {
            let sampling = &mut config.sampling;
            match key {
                "primary_period_ms" => sampling.primary_period_ms = parse_int(value)?,
                "warmup_samples" => sampling.warmup_samples = parse_int(value)?,
                "battery_period_s" => sampling.battery_period_s = parse_int(value)?,
                "classifier_period_ms" => sampling.classifier_period_ms = parse_int(value)?,
                "classifier_idle_period_ms" => {
                    sampling.classifier_idle_period_ms = parse_int(value)?
                }
                _ => return Err(ParseError::UnknownKey),
            }
        }
        Section::Network => {
            let network = &mut config.network;
            match key {
                "ssid" => network.ssid = parse_string::<MAX_SSID_LEN>(value)?,
                "password" => network.password = parse_string::<MAX_PASSWORD_LEN>(value)?,
                "channel" => network.channel = parse_int(value)?,
                "port" => network.port = parse_int(value)?,
                "recv_timeout_ms" => network.recv_timeout_ms = parse_int(value)?,
                "recv_max_retries" => network.recv_max_retries = parse_int(value)?,
                _ => return Err(ParseError::UnknownKey),
            }
        }
        Section::Battery => {
            let battery = &mut config.battery;
            match key {
                "samples" => battery.samples = parse_int(value)?,
                "divider_ratio" => battery.divider_ratio = parse_float(value)?,
                "vref_mv" => battery.vref_mv = parse_int(value)?,
                "adc_max" => battery.adc_max = parse_int(value)?,
                _ => return Err(ParseError::UnknownKey),
            }
        }
    }
    Ok(())
}

fn validate(config: &DeviceConfig) -> Result<(), ParseError> {
    let sampling = &config.sampling;
    let network = &config.network;
    let battery = &config.battery;

    let in_range = config.chord.default_mm > 0
        && sampling.primary_period_ms > 0
        && sampling.battery_period_s > 0
        && sampling.classifier_period_ms > 0
        && sampling.classifier_idle_period_ms > 0
        && !network.ssid.is_empty()
        && (1..=13).contains(&network.channel)
        && network.port > 0
        && network.recv_timeout_ms > 0
        && network.recv_max_retries > 0
        && (network.password.is_empty() || network.password.len() >= 8)
        && battery.samples > 0
        && battery.divider_ratio > 0.0
        && battery.vref_mv > 0
        && battery.adc_max > 0;

    if in_range {
        Ok(())
    } else {
        Err(ParseError::OutOfRange)
    }
}
