//! End-to-end tests for `ifc-colorize config` commands.

use std::fs;
use tempfile::TempDir;

mod fixtures;
use fixtures::*;

// ============================================================================
// Show Command Tests
// ============================================================================

#[test]
fn test_config_show_defaults() {
    let config = TempDir::new().unwrap();

    let output = isolated_command(&["config", "show"], config.path())
        .output()
        .expect("Failed to execute command");

    assert_eq!(
        output.status.code(),
        Some(0),
        "Show config should succeed. stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Workbook:       (not set)"));
    assert!(stdout.contains("Sheet:          ModelView"));
    assert!(stdout.contains("Property set:   Mechanical"));
    assert!(stdout.contains("Representation: Body"));
}

#[test]
fn test_config_show_json_format() {
    let config = TempDir::new().unwrap();

    let output = isolated_command(&["config", "show", "--json"], config.path())
        .output()
        .expect("Failed to execute command");
    assert_eq!(output.status.code(), Some(0));

    let result: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("Should parse JSON output");

    assert!(result["source"].is_object(), "Should have source object");
    assert_eq!(result["source"]["sheet"], "ModelView");
    assert_eq!(result["classification"]["property_set"], "Mechanical");
    assert_eq!(result["classification"]["property"], "System Type");
    assert_eq!(result["filter"]["name_pattern"], r"\b\d{7}\b");
    assert_eq!(result["geometry"]["representation_identifier"], "Body");
    assert_eq!(result["style"]["transparency"], 0.0);
}

// ============================================================================
// Init Command Tests
// ============================================================================

#[test]
fn test_config_init_writes_file() {
    let config = TempDir::new().unwrap();

    let output = isolated_command(&["config", "init"], config.path())
        .output()
        .expect("Failed to execute command");
    assert_eq!(output.status.code(), Some(0));

    let path = config.path().join("config.toml");
    let contents = fs::read_to_string(&path).expect("Config file should exist");
    assert!(contents.contains("[classification]"));
    assert!(contents.contains("property_set = \"Mechanical\""));
}

#[test]
fn test_config_init_refuses_overwrite() {
    let config = TempDir::new().unwrap();

    let first = isolated_command(&["config", "init"], config.path())
        .output()
        .expect("Failed to execute command");
    assert_eq!(first.status.code(), Some(0));

    let second = isolated_command(&["config", "init"], config.path())
        .output()
        .expect("Failed to execute command");
    assert_eq!(second.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&second.stderr).contains("--force"));

    let forced = isolated_command(&["config", "init", "--force"], config.path())
        .output()
        .expect("Failed to execute command");
    assert_eq!(forced.status.code(), Some(0));
}

// ============================================================================
// Set Command Tests
// ============================================================================

#[test]
fn test_config_set_persists_values() {
    let config = TempDir::new().unwrap();

    let output = isolated_command(
        &[
            "config",
            "set",
            "--sheet",
            "Legend",
            "--property",
            "System Name",
            "--transparency",
            "0.25",
        ],
        config.path(),
    )
    .output()
    .expect("Failed to execute command");

    assert_eq!(
        output.status.code(),
        Some(0),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Configuration updated successfully."));
    assert!(stdout.contains("source.sheet = Legend"));

    let output = isolated_command(&["config", "show", "--json"], config.path())
        .output()
        .expect("Failed to execute command");
    let result: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(result["source"]["sheet"], "Legend");
    assert_eq!(result["classification"]["property"], "System Name");
    assert_eq!(result["classification"]["property_set"], "Mechanical");
    assert_eq!(result["style"]["transparency"], 0.25);
}

#[test]
fn test_config_set_requires_a_value() {
    let config = TempDir::new().unwrap();

    let output = isolated_command(&["config", "set"], config.path())
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("No configuration values"));
}

#[test]
fn test_config_set_rejects_invalid_pattern() {
    let config = TempDir::new().unwrap();

    let output = isolated_command(
        &["config", "set", "--name-pattern", "(unclosed"],
        config.path(),
    )
    .output()
    .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(1));
    assert!(
        !config.path().join("config.toml").exists(),
        "Invalid settings must not be saved"
    );
}

#[test]
fn test_explicit_config_file() {
    let config = TempDir::new().unwrap();
    let custom = config.path().join("project.toml");
    let custom_arg = arg(&custom);

    let output = isolated_command(
        &["--config", custom_arg, "config", "set", "--sheet", "Custom"],
        config.path(),
    )
    .output()
    .expect("Failed to execute command");
    assert_eq!(output.status.code(), Some(0));
    assert!(custom.exists());
    assert!(!config.path().join("config.toml").exists());

    let output = isolated_command(&["config", "show", "--config", custom_arg, "--json"], config.path())
        .output()
        .expect("Failed to execute command");
    let result: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(result["source"]["sheet"], "Custom");
}

#[test]
fn test_broken_config_file_is_reported() {
    let config = TempDir::new().unwrap();
    write_temp_file(config.path(), "config.toml", "[style]\ntransparency = \"opaque\"\n");

    let output = isolated_command(&["config", "show"], config.path())
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).starts_with("Error:"));
}
