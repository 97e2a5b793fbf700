//! Integration tests for loading configuration files and resolving the
//! profiles the timer needs.

use indoc::indoc;
use std::io::Write;

use pomobulb_core::payload::dp;
use pomobulb_core::{Config, ConfigError, DpsValue, PhasePayloads};

const YAML: &str = indoc! {r#"
    smart_bulbs:
      - name: Desk Lamp
        device_id: bf0123456789abcdef
        address: 192.168.1.40
        local_key: "0123456789abcdef"
        version: 3.3
    pomodoros:
      - name: Classic
        duration: 25
        short_break: 5
        long_break: 15
        cycles_before_long_break: 4
    themes:
      - name: Tomato
        work:
          color: [255, 0, 0]
          saturation: 500
          brightness: 700
        short_break:
          color: [0, 0, 0]
        long_break:
          color: [255, 255, 255]
          brightness: 300
          temperature: 0
"#};

const JSON: &str = r#"{
  "smart_bulbs": [
    {"name": "Desk Lamp", "device_id": "bf0123456789abcdef", "address": "192.168.1.40",
     "local_key": "0123456789abcdef", "version": 3.3}
  ],
  "pomodoros": [
    {"name": "Classic", "duration": 25, "short_break": 5, "long_break": 15,
     "cycles_before_long_break": 4}
  ],
  "themes": [
    {"name": "Tomato",
     "work": {"color": [255, 0, 0], "saturation": 500, "brightness": 700},
     "short_break": {"color": [0, 0, 0]},
     "long_break": {"color": [255, 255, 255], "brightness": 300, "temperature": 0}}
  ]
}"#;

const TOML: &str = indoc! {r#"
    [[smart_bulbs]]
    name = "Desk Lamp"
    device_id = "bf0123456789abcdef"
    address = "192.168.1.40"
    local_key = "0123456789abcdef"
    version = 3.3

    [[pomodoros]]
    name = "Classic"
    duration = 25
    short_break = 5
    long_break = 15
    cycles_before_long_break = 4

    [[themes]]
    name = "Tomato"

    [themes.work]
    color = [255, 0, 0]
    saturation = 500
    brightness = 700

    [themes.short_break]
    color = [0, 0, 0]

    [themes.long_break]
    color = [255, 255, 255]
    brightness = 300
    temperature = 0
"#};

fn write_config(suffix: &str, content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn yaml_json_and_toml_load_the_same_config() {
    let yaml = Config::load(write_config(".yaml", YAML).path()).unwrap();
    let json = Config::load(write_config(".json", JSON).path()).unwrap();
    let toml = Config::load(write_config(".toml", TOML).path()).unwrap();
    assert_eq!(yaml, json);
    assert_eq!(yaml, toml);
}

#[test]
fn resolved_theme_encodes_every_phase() {
    let config = Config::load(write_config(".yml", YAML).path()).unwrap();
    let theme = config.theme(Some("tomato")).unwrap();
    let payloads = PhasePayloads::from_theme(theme).unwrap();

    assert_eq!(
        payloads.work.get(dp::COLOUR),
        Some(&DpsValue::Str("000001f402bc".into()))
    );
    assert_eq!(payloads.short_break.get(dp::POWER), Some(&DpsValue::Bool(false)));
    assert_eq!(payloads.short_break.len(), 1);
    assert_eq!(
        serde_json::to_string(&payloads.long_break).unwrap(),
        r#"{"20":true,"21":"white","22":300,"23":0}"#
    );
}

#[test]
fn malformed_raw_override_fails_resolution() {
    let yaml = YAML.replace(
        "      temperature: 0\n",
        "      temperature: 0\n      raw: '{\"20\": [true]}'\n",
    );
    let config = Config::load(write_config(".yaml", &yaml).path()).unwrap();
    let theme = config.theme(None).unwrap();
    let err = PhasePayloads::from_theme(theme).unwrap_err();
    assert!(matches!(
        err,
        ConfigError::InvalidRawPayload { ref key, .. } if key == "themes.Tomato.long_break.raw"
    ));
}

#[test]
fn unknown_names_report_what_was_asked_for() {
    let config = Config::load(write_config(".yaml", YAML).path()).unwrap();
    let err = config.pomodoro(Some("Marathon")).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Pomodoro configuration with name 'Marathon' not found"
    );
    let err = config.smart_bulb(Some("Kitchen")).unwrap_err();
    assert_eq!(err.to_string(), "Smart bulb with name 'Kitchen' not found");
}

#[test]
fn bulb_name_lookup_ignores_case() {
    let config = Config::load(write_config(".yaml", YAML).path()).unwrap();
    assert_eq!(
        config.smart_bulb(Some("desk LAMP")).unwrap().device_id,
        "bf0123456789abcdef"
    );
}

#[test]
fn missing_file_is_a_load_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Config::load(&dir.path().join("absent.yaml")).unwrap_err();
    assert!(matches!(err, ConfigError::LoadFailed { .. }));
}

#[test]
fn wrong_shape_is_a_parse_error() {
    let file = write_config(".yaml", "pomodoros: 5\n");
    assert!(matches!(
        Config::load(file.path()),
        Err(ConfigError::ParseFailed(_))
    ));
}
