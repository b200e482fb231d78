use std::sync::OnceLock;

use pathcrafter_common::observability::{LogConfig, LogFormat, LoggingSettings};

static INIT_PATH: OnceLock<std::path::PathBuf> = OnceLock::new();

pub fn init_test_tracing() {
    let _ = INIT_PATH.get_or_init(|| {
        let settings = LoggingSettings {
            format: if std::env::var("PATHCRAFTER_LOG_FORMAT")
                .map(|raw| raw.trim().eq_ignore_ascii_case("json"))
                .unwrap_or(false)
            {
                LogFormat::Json
            } else {
                LogFormat::Text
            },
            stderr: true,
            filter: "debug".to_string(),
            dir: Some(std::env::temp_dir().join("pathcrafter-llm-tests")),
        };
        let config = LogConfig::from_settings("pathcrafter-llm-tests", &settings);

        pathcrafter_common::observability::init_logging(config).unwrap_or_default()
    });
}
