//! Build script for thermorelay-host
//!
//! Validates the bundled thermorelay.toml at compile time so a broken
//! example config never ships. Full semantic validation (pins, divider,
//! calibration domain) runs again at startup.

use std::fs;
use std::path::Path;

const CONFIG: &str = "thermorelay.toml";

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed={}", CONFIG);

    let content = match fs::read_to_string(CONFIG) {
        Ok(content) => content,
        Err(e) => fail(&format!("Failed to read {}", CONFIG), &[e.to_string()]),
    };

    let config: toml::Value = match toml::from_str(&content) {
        Ok(value) => value,
        Err(e) => fail(
            &format!("Invalid TOML syntax in {}", CONFIG),
            &e.to_string().lines().map(str::to_string).collect::<Vec<_>>(),
        ),
    };

    let mut errors = Vec::new();
    validate_sections(&config, &mut errors);
    validate_calibration(&config, &mut errors);
    validate_loops(&config, &mut errors);

    if !errors.is_empty() {
        fail(&format!("Invalid configuration in {}", CONFIG), &errors);
    }
}

/// Abort the build with a boxed error report
fn fail(title: &str, lines: &[String]) -> ! {
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<57}║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title,
        lines
            .iter()
            .map(|line| {
                let truncated = if line.chars().count() > 62 {
                    format!("{}...", line.chars().take(59).collect::<String>())
                } else {
                    line.clone()
                };
                format!("║  • {:<62} ║", truncated)
            })
            .collect::<Vec<_>>()
            .join("\n")
    );
}

fn validate_sections(config: &toml::Value, errors: &mut Vec<String>) {
    for section in ["board", "calibration", "control"] {
        if !matches!(config.get(section), Some(toml::Value::Table(_))) {
            errors.push(format!("Missing [{}] section", section));
        }
    }
    match config.get("loops") {
        Some(toml::Value::Array(loops)) if !loops.is_empty() => {}
        _ => errors.push("Missing [[loops]] - at least one loop is required".into()),
    }
}

/// The calibration table must sit next to the config
fn validate_calibration(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(table) = config
        .get("calibration")
        .and_then(|c| c.get("table"))
        .and_then(|t| t.as_str())
    else {
        errors.push("[calibration] missing 'table'".into());
        return;
    };

    println!("cargo:rerun-if-changed={}", table);
    if !Path::new(table).exists() {
        errors.push(format!("[calibration] table '{}' not found", table));
    }
}

fn validate_loops(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(loops) = config.get("loops").and_then(|l| l.as_array()) else {
        return;
    };

    for (i, l) in loops.iter().enumerate() {
        for field in [
            "mode",
            "threshold_c",
            "sensor_pin",
            "actuator_pin",
            "polarity",
            "topology",
            "series_ohms",
            "window",
        ] {
            if l.get(field).is_none() {
                errors.push(format!("[[loops]] #{} missing '{}'", i + 1, field));
            }
        }

        check_choice(l, i, "mode", &["heating", "cooling"], errors);
        check_choice(l, i, "polarity", &["active_high", "active_low"], errors);
        check_choice(l, i, "topology", &["sensor_top", "sensor_bottom"], errors);
    }
}

fn check_choice(l: &toml::Value, i: usize, field: &str, allowed: &[&str], errors: &mut Vec<String>) {
    if let Some(value) = l.get(field).and_then(|v| v.as_str()) {
        if !allowed.contains(&value) {
            errors.push(format!(
                "[[loops]] #{} {} must be one of: {}",
                i + 1,
                field,
                allowed.join(", ")
            ));
        }
    }
}
