//! Build script for lever-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates lever.toml at compile time
//! - Generates the `LEVER_CONFIG` constant from it

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use lever_core::config::LeverConfig;

fn main() {
    setup_linker();
    let config = validate_config();
    generate_config(&config);
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate lever.toml and build the configuration it describes
fn validate_config() -> LeverConfig {
    println!("cargo:rerun-if-changed=lever.toml");

    let config_path = Path::new("lever.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: lever.toml not found!                                    ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires a lever.toml configuration file.          ║\n\
            ║  Please create one in the lever-firmware directory.              ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read lever.toml                                ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let value: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in lever.toml                        ║\n\
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
    let config = read_config(&value, &mut errors);

    if errors.is_empty() {
        if let Err(e) = config.validate() {
            errors.push(format!("configuration rejected: {:?}", e));
        }
    }

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid lever configuration                              ║\n\
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

    println!("cargo:warning=lever.toml validated successfully");
    config
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

/// Read every known key, falling back to the defaults for omitted ones
fn read_config(value: &toml::Value, errors: &mut Vec<String>) -> LeverConfig {
    let defaults = LeverConfig::DEFAULT;

    let device_id = match value.get("device").and_then(|d| d.get("id")) {
        Some(toml::Value::String(id)) => leak(id.clone()),
        Some(_) => {
            errors.push("[device] id must be a string".to_string());
            defaults.device_id
        }
        None => defaults.device_id,
    };

    let mut int = |section: &str, key: &str, default: u32, max: u32| -> u32 {
        match value.get(section).and_then(|s| s.get(key)) {
            Some(toml::Value::Integer(v)) if (0..=max as i64).contains(v) => *v as u32,
            Some(toml::Value::Integer(_)) => {
                errors.push(format!("[{}] {} must be 0-{}", section, key, max));
                default
            }
            Some(_) => {
                errors.push(format!("[{}] {} must be an integer", section, key));
                default
            }
            None => default,
        }
    };

    LeverConfig {
        device_id,
        tick_interval_ms: int("timing", "tick_interval_ms", defaults.tick_interval_ms, 60_000),
        report_interval_ms: int(
            "timing",
            "report_interval_ms",
            defaults.report_interval_ms,
            600_000,
        ),
        stuck_sample_count: int(
            "faults",
            "stuck_sample_count",
            defaults.stuck_sample_count as u32,
            u16::MAX as u32,
        ) as u16,
        button_stuck_ms: int("faults", "button_stuck_ms", defaults.button_stuck_ms, 3_600_000),
        comm_timeout_ms: int("faults", "comm_timeout_ms", defaults.comm_timeout_ms, 3_600_000),
        calibration_offset: int(
            "storage",
            "calibration_offset",
            defaults.calibration_offset as u32,
            u16::MAX as u32,
        ) as u16,
    }
}

fn leak(s: String) -> &'static str {
    Box::leak(s.into_boxed_str())
}

/// Write the validated configuration as a Rust constant
fn generate_config(config: &LeverConfig) {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let mut f = File::create(out_dir.join("lever_config.rs")).unwrap();

    writeln!(
        f,
        "/// Configuration compiled from lever.toml\n\
         pub const LEVER_CONFIG: LeverConfig = LeverConfig {{\n    \
             device_id: {:?},\n    \
             tick_interval_ms: {},\n    \
             report_interval_ms: {},\n    \
             stuck_sample_count: {},\n    \
             button_stuck_ms: {},\n    \
             comm_timeout_ms: {},\n    \
             calibration_offset: {},\n\
         }};",
        config.device_id,
        config.tick_interval_ms,
        config.report_interval_ms,
        config.stuck_sample_count,
        config.button_stuck_ms,
        config.comm_timeout_ms,
        config.calibration_offset,
    )
    .unwrap();
}
