use super::*;
use std::fs;

// ── Default values ───────────────────────────────────────────────

#[test]
fn default_registry_path_is_lights_config_json() {
    let cfg = Settings::default();
    assert_eq!(cfg.registry_path, "lights_config.json");
    assert_eq!(cfg.registry_path(), PathBuf::from(REGISTRY_FILE));
}

#[test]
fn default_network_tuning() {
    let cfg = Settings::default();
    assert_eq!(cfg.timeout_ms, 1000);
    assert_eq!(cfg.attempts, 2);
}

#[test]
fn default_verbose_is_false() {
    assert!(!Settings::default().verbose);
}

// ── TOML parsing ─────────────────────────────────────────────────

#[test]
fn parse_empty_toml_gives_defaults() {
    let cfg: Settings = toml::from_str("").unwrap();
    assert_eq!(cfg, Settings::default());
}

#[test]
fn parse_partial_toml_keeps_other_defaults() {
    let cfg: Settings = toml::from_str("timeout_ms = 250").unwrap();
    assert_eq!(cfg.timeout_ms, 250);
    assert_eq!(cfg.attempts, 2);
    assert_eq!(cfg.registry_path, "lights_config.json");
}

#[test]
fn parse_toml_wrong_type_for_field_fails() {
    let result = toml::from_str::<Settings>("attempts = \"three\"");
    assert!(result.is_err());
}

// ── to_toml_commented ────────────────────────────────────────────

#[test]
fn to_toml_commented_contains_section_headers() {
    let text = Settings::default().to_toml_commented();
    assert!(text.contains("Registry"));
    assert!(text.contains("Network"));
    assert!(text.contains("Debug"));
}

#[test]
fn to_toml_commented_roundtrip_preserves_values() {
    let original = Settings {
        registry_path: "/srv/lights/registry.json".to_string(),
        timeout_ms: 300,
        attempts: 5,
        verbose: true,
    };
    let parsed: Settings = toml::from_str(&original.to_toml_commented()).unwrap();
    assert_eq!(parsed, original);
}

#[test]
fn to_toml_commented_with_quotes_and_backslashes_is_valid() {
    let original = Settings {
        registry_path: r#"C:\lights\"home".json"#.to_string(),
        ..Settings::default()
    };
    let parsed: Settings = toml::from_str(&original.to_toml_commented()).unwrap();
    assert_eq!(parsed.registry_path, original.registry_path);
}

// ── File I/O with temp directories ───────────────────────────────

#[test]
fn load_from_missing_file_gives_defaults() {
    let tmp = tempfile::tempdir().unwrap();
    let cfg = Settings::load_from(&tmp.path().join("nope.toml"));
    assert_eq!(cfg, Settings::default());
}

#[test]
fn load_from_malformed_file_gives_defaults() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("lightdeck.toml");
    fs::write(&path, "this is = = not toml").unwrap();
    assert_eq!(Settings::load_from(&path), Settings::default());
}

#[test]
fn write_and_read_roundtrip() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("nested").join("lightdeck.toml");
    let cfg = Settings {
        timeout_ms: 75,
        attempts: 1,
        ..Settings::default()
    };
    cfg.write_to(&path).unwrap();
    assert!(path.exists());
    assert_eq!(Settings::load_from(&path), cfg);
}

// ── escape_toml_string ───────────────────────────────────────────

#[test]
fn escape_toml_string_plain_text_unchanged() {
    assert_eq!(
        escape_toml_string("lights_config.json"),
        "lights_config.json"
    );
}

#[test]
fn escape_toml_string_escapes_specials() {
    assert_eq!(escape_toml_string("a\\b\"c\nd\te"), "a\\\\b\\\"c\\nd\\te");
}
