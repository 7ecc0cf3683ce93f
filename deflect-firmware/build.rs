//! Build script for deflect-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates device.toml at compile time
//! - Checks that the CYW43439 firmware blobs are present

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Radio firmware files embedded by the Wi-Fi task
const RADIO_BLOBS: &[&str] = &[
    "cyw43-firmware/43439A0.bin",
    "cyw43-firmware/43439A0_clm.bin",
    "cyw43-firmware/nvram_rp2040.bin",
];

fn main() {
    setup_linker();
    validate_config();
    check_radio_blobs();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate device.toml configuration at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=device.toml");

    let config_path = Path::new("device.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: device.toml not found!                                   ║\n\
            ║                                                                  ║\n\
            ║  The firmware embeds a device.toml configuration file.           ║\n\
            ║  Please create one in the deflect-firmware directory.            ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read device.toml                               ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in device.toml                       ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = Vec::new();
    validate_sections(&config, &mut errors);
    validate_chord(&config, &mut errors);
    validate_sampling(&config, &mut errors);
    validate_network(&config, &mut errors);
    validate_battery(&config, &mut errors);

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid device.toml                                      ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    println!("cargo:warning=device.toml validated successfully");
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Allowed keys per section
fn known_keys(section: &str) -> Option<&'static [&'static str]> {
    match section {
        "chord" => Some(&["default_mm"]),
        "sampling" => Some(&[
            "primary_period_ms",
            "warmup_samples",
            "battery_period_s",
            "classifier_period_ms",
            "classifier_idle_period_ms",
        ]),
        "network" => Some(&[
            "ssid",
            "password",
            "channel",
            "port",
            "recv_timeout_ms",
            "recv_max_retries",
        ]),
        "battery" => Some(&["samples", "divider_ratio", "vref_mv", "adc_max"]),
        _ => None,
    }
}

/// Reject unknown sections, unknown keys and top-level values
fn validate_sections(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(root) = config.as_table() else {
        return;
    };

    for (name, value) in root {
        let Some(keys) = known_keys(name) else {
            errors.push(format!("unknown section [{}]", name));
            continue;
        };
        let Some(table) = value.as_table() else {
            errors.push(format!("[{}] must be a table", name));
            continue;
        };
        for key in table.keys() {
            if !keys.contains(&key.as_str()) {
                errors.push(format!("[{}] unknown key '{}'", name, key));
            }
        }
    }
}

/// Check an optional integer lies in `min..=max`
fn check_range(
    config: &toml::Value,
    section: &str,
    key: &str,
    min: i64,
    max: i64,
    errors: &mut Vec<String>,
) {
    let Some(value) = config.get(section).and_then(|s| s.get(key)) else {
        return;
    };
    match value.as_integer() {
        Some(n) if (min..=max).contains(&n) => {}
        Some(_) => errors.push(format!("[{}] {} must be {}-{}", section, key, min, max)),
        None => errors.push(format!("[{}] {} must be an integer", section, key)),
    }
}

fn validate_chord(config: &toml::Value, errors: &mut Vec<String>) {
    check_range(config, "chord", "default_mm", 1, u16::MAX as i64, errors);
}

fn validate_sampling(config: &toml::Value, errors: &mut Vec<String>) {
    let u32_max = u32::MAX as i64;
    check_range(config, "sampling", "primary_period_ms", 1, u32_max, errors);
    check_range(config, "sampling", "warmup_samples", 0, u16::MAX as i64, errors);
    check_range(config, "sampling", "battery_period_s", 1, u32_max, errors);
    check_range(config, "sampling", "classifier_period_ms", 1, u32_max, errors);
    check_range(config, "sampling", "classifier_idle_period_ms", 1, u32_max, errors);
}

fn validate_network(config: &toml::Value, errors: &mut Vec<String>) {
    let network = config.get("network");
    let text = |key: &str| network.and_then(|n| n.get(key)).and_then(|v| v.as_str());

    match text("ssid") {
        Some(ssid) if ssid.is_empty() || ssid.len() > 32 => {
            errors.push("[network] ssid must be 1-32 bytes".to_string())
        }
        _ => {}
    }
    match text("password") {
        Some(password) if !password.is_empty() && !(8..=64).contains(&password.len()) => {
            errors.push("[network] password must be empty or 8-64 bytes".to_string())
        }
        _ => {}
    }

    check_range(config, "network", "channel", 1, 13, errors);
    check_range(config, "network", "port", 1, u16::MAX as i64, errors);
    check_range(config, "network", "recv_timeout_ms", 1, u32::MAX as i64, errors);
    check_range(config, "network", "recv_max_retries", 1, u8::MAX as i64, errors);
}

fn validate_battery(config: &toml::Value, errors: &mut Vec<String>) {
    check_range(config, "battery", "samples", 1, u16::MAX as i64, errors);
    check_range(config, "battery", "vref_mv", 1, u32::MAX as i64, errors);
    check_range(config, "battery", "adc_max", 1, u16::MAX as i64, errors);

    // divider_ratio may be written as 2 or 2.0
    let ratio = config
        .get("battery")
        .and_then(|b| b.get("divider_ratio"))
        .map(|v| v.as_float().or_else(|| v.as_integer().map(|n| n as f64)));
    if let Some(ratio) = ratio {
        match ratio {
            Some(r) if r > 0.0 => {}
            _ => errors.push("[battery] divider_ratio must be a positive number".to_string()),
        }
    }
}

/// The Wi-Fi task embeds the radio firmware with include_bytes!
fn check_radio_blobs() {
    let missing: Vec<&str> = RADIO_BLOBS
        .iter()
        .copied()
        .filter(|blob| {
            println!("cargo:rerun-if-changed={}", blob);
            !Path::new(blob).exists()
        })
        .collect();

    if !missing.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: CYW43439 firmware missing                                ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ║                                                                  ║\n\
            ║  Copy the blobs from the embassy repository (cyw43-firmware/).   ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            missing
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }
}
