use std::sync::OnceLock;

use pathcrafter_common::observability::{LogConfig, LoggingSettings};
use pathcrafter_poedb::PoedbSettings;
use std::time::Duration;

static INIT_PATH: OnceLock<std::path::PathBuf> = OnceLock::new();

#[allow(dead_code)]
pub fn init_test_tracing() {
    let _ = INIT_PATH.get_or_init(|| {
        let settings = LoggingSettings {
            stderr: true,
            filter: "debug".to_string(),
            dir: Some(std::env::temp_dir().join("pathcrafter-tests")),
            ..LoggingSettings::default()
        };
        let config = LogConfig::from_settings("pathcrafter-tests", &settings);
        pathcrafter_common::observability::init_logging(config).unwrap_or_default()
    });
}

#[allow(dead_code)]
pub fn fixture(name: &str) -> String {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name);
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("fixture {}: {e}", path.display()))
}

/// Settings pointed at a mock server, with no politeness delay.
#[allow(dead_code)]
pub fn mock_settings(server_uri: &str) -> PoedbSettings {
    PoedbSettings {
        base_url: format!("{server_uri}/kr/"),
        politeness_delay: Duration::ZERO,
        timeout: Duration::from_secs(2),
        ..PoedbSettings::default()
    }
}
