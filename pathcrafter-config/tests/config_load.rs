use pathcrafter_common::observability::LogFormat;
use pathcrafter_common::{LlmSettings, Provider, DEFAULT_GEMINI_MODEL};
use pathcrafter_config::{load_config, save_settings, PathcrafterConfigLoader};
use serial_test::serial;
use std::{fs, path::PathBuf};
use tempfile::TempDir;

/// Helper to write a YAML file in a temp dir and return its path.
fn write_yaml(tmp: &TempDir, name: &str, yaml: &str) -> PathBuf {
    let p = tmp.path().join(name);
    fs::write(&p, yaml).expect("write yaml");
    p
}

#[test]
#[serial]
fn file_values_are_loaded_and_placeholders_expanded() {
    let tmp = TempDir::new().unwrap();
    let file_yaml = r#"
llm:
  chatgpt_model: "gpt-4.1-mini"
  gemini_model: ""
  openai_api_key: "${PATHCRAFTER_TEST_OPENAI_KEY}"
  gemini_api_key: "${PATHCRAFTER_TEST_GEMINI_KEY}"
poedb:
  politeness_delay_ms: 250
logging:
  format: json
  stderr: true
  dir: "~/pathcrafter-logs"
"#;
    let p = write_yaml(&tmp, "pathcrafter.yaml", file_yaml);

    temp_env::with_vars(
        [
            ("PATHCRAFTER_TEST_OPENAI_KEY", Some("sk-from-env")),
            ("PATHCRAFTER_TEST_GEMINI_KEY", None),
        ],
        || {
            let (config, used) = load_config(Some(&p)).expect("load config");
            assert_eq!(used, p);
            assert_eq!(config.llm.chatgpt_model, "gpt-4.1-mini");
            assert_eq!(config.llm.gemini_model, DEFAULT_GEMINI_MODEL);
            assert_eq!(config.llm.openai_api_key.as_deref(), Some("sk-from-env"));
            assert_eq!(config.llm.missing_api_keys(), vec![Provider::Gemini]);
            assert_eq!(config.poedb.politeness_delay_ms, 250);
            assert_eq!(config.poedb.timeout_secs, 10);
            assert_eq!(config.logging.format, LogFormat::Json);
            assert!(config.logging.stderr);
            assert_eq!(
                config.logging.dir.as_deref(),
                Some(std::path::Path::new("~/pathcrafter-logs"))
            );
            assert_eq!(config.logging.filter, "info");
        },
    );
}

#[test]
#[serial]
fn environment_overrides_file() {
    let tmp = TempDir::new().unwrap();
    let p = write_yaml(&tmp, "pathcrafter.yaml", "poedb:\n  timeout_secs: 30\n");

    temp_env::with_vars(
        [
            ("PATHCRAFTER__POEDB__TIMEOUT_SECS", Some("5")),
            ("PATHCRAFTER__LLM__GEMINI_MODEL", Some("gemini-1.5-pro")),
        ],
        || {
            let config = PathcrafterConfigLoader::new()
                .with_file(&p)
                .load()
                .expect("load config");
            assert_eq!(config.poedb.timeout_secs, 5);
            assert_eq!(config.llm.gemini_model, "gemini-1.5-pro");
        },
    );
}

#[test]
#[serial]
fn missing_explicit_file_is_an_error() {
    let tmp = TempDir::new().unwrap();
    assert!(load_config(Some(&tmp.path().join("absent.yaml"))).is_err());
}

#[test]
#[serial]
fn missing_optional_file_yields_defaults() {
    let tmp = TempDir::new().unwrap();
    let config = PathcrafterConfigLoader::new()
        .with_optional_file(tmp.path().join("absent.yaml"))
        .load()
        .expect("defaults");
    assert_eq!(config.llm, LlmSettings::default());
}

#[test]
#[serial]
fn save_settings_keeps_other_sections() {
    let tmp = TempDir::new().unwrap();
    let p = write_yaml(
        &tmp,
        "pathcrafter.yaml",
        "llm:\n  openai_api_key: \"${OPENAI_API_KEY}\"\n  chatgpt_model: old\npoedb:\n  timeout_secs: 20\n",
    );

    let settings = LlmSettings {
        chatgpt_model: "gpt-4o".into(),
        gemini_model: "  ".into(),
        ..LlmSettings::default()
    };
    save_settings(&p, &settings).expect("save");

    let text = fs::read_to_string(&p).unwrap();
    assert!(text.contains("${OPENAI_API_KEY}"));

    let config = PathcrafterConfigLoader::new().with_file(&p).load().unwrap();
    assert_eq!(config.llm.chatgpt_model, "gpt-4o");
    assert_eq!(config.llm.gemini_model, DEFAULT_GEMINI_MODEL);
    assert_eq!(config.poedb.timeout_secs, 20);
}

#[test]
#[serial]
fn save_settings_creates_missing_file() {
    let tmp = TempDir::new().unwrap();
    let p = tmp.path().join("nested").join("pathcrafter.yaml");
    save_settings(&p, &LlmSettings::default()).expect("save");

    let config = PathcrafterConfigLoader::new().with_file(&p).load().unwrap();
    assert_eq!(config.llm, LlmSettings::default());
}
