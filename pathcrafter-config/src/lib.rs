//! Loader for Pathcrafter settings with YAML + environment overlays.
//!
//! Sources, lowest precedence first:
//!
//! 1. built-in defaults (every field is optional)
//! 2. a YAML file, usually `pathcrafter.yaml`
//! 3. `PATHCRAFTER__`-prefixed environment variables, `__` between levels
//!    (`PATHCRAFTER__LLM__GEMINI_MODEL=gemini-1.5-pro`)
//!
//! After merging, `${VAR}` placeholders in string values are expanded from
//! the process environment. A secret that still reads `${...}` afterwards
//! is treated as unset.
use config::{Config, ConfigError, Environment, File};
use pathcrafter_common::LlmSettings;
pub use pathcrafter_common::observability::LoggingSettings;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

/// File name looked up in the working directory and the user config dir.
pub const CONFIG_FILE_NAME: &str = "pathcrafter.yaml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathcrafterConfig {
    pub llm: LlmSettings,
    pub poedb: PoedbSection,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoedbSection {
    pub base_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    pub politeness_delay_ms: u64,
}

impl Default for PoedbSection {
    fn default() -> Self {
        Self {
            base_url: "https://poedb.tw/kr/".into(),
            user_agent: "PathcrafterAI/0.1 (+https://github.com/ShovelMaker/poeplanner; non-commercial build planner)".into(),
            timeout_secs: 10,
            politeness_delay_ms: 1500,
        }
    }
}

impl PoedbSection {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn politeness_delay(&self) -> Duration {
        Duration::from_millis(self.politeness_delay_ms)
    }
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

fn drop_unexpanded(secret: &mut Option<String>) {
    if secret.as_deref().is_some_and(|s| s.contains("${")) {
        *secret = None;
    }
}

/// Builder hides the `config` crate wiring (YAML + env overrides).
pub struct PathcrafterConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
    files: Vec<(PathBuf, bool)>,
    inline: Vec<String>,
}

impl Default for PathcrafterConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl PathcrafterConfigLoader {
    /// Start with defaults plus `PATHCRAFTER__` environment overrides.
    ///
    /// ```
    /// use pathcrafter_config::PathcrafterConfigLoader;
    ///
    /// let config = PathcrafterConfigLoader::new()
    ///     .with_yaml_str("poedb:\n  timeout_secs: 3")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.poedb.timeout_secs, 3);
    /// assert_eq!(config.poedb.politeness_delay_ms, 1500);
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
            files: Vec::new(),
            inline: Vec::new(),
        }
    }

    /// Attach a YAML file that must exist.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.files.push((path.as_ref().to_path_buf(), true));
        self
    }

    /// Attach a YAML file that is skipped when missing.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.files.push((path.as_ref().to_path_buf(), false));
        self
    }

    /// Allow tests/CLI to merge inline YAML snippets.
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.inline.push(yaml.to_string());
        self
    }

    /// Merge all sources, expand `${VAR}` placeholders and deserialize.
    ///
    /// ```
    /// use pathcrafter_config::PathcrafterConfigLoader;
    ///
    /// unsafe { std::env::set_var("DOC_GEMINI_KEY", "injected-from-env"); }
    ///
    /// let config = PathcrafterConfigLoader::new()
    ///     .with_yaml_str(r#"
    /// llm:
    ///   gemini_api_key: "${DOC_GEMINI_KEY}"
    ///   openai_api_key: "${DOC_MISSING_KEY}"
    /// "#)
    ///     .load()
    ///     .expect("valid configuration");
    ///
    /// assert_eq!(config.llm.gemini_api_key.as_deref(), Some("injected-from-env"));
    /// assert_eq!(config.llm.openai_api_key, None);
    ///
    /// unsafe { std::env::remove_var("DOC_GEMINI_KEY"); }
    /// ```
    pub fn load(self) -> Result<PathcrafterConfig, ConfigError> {
        let mut builder = self.builder;
        for (path, required) in &self.files {
            builder = builder.add_source(
                File::from(path.as_path())
                    .format(config::FileFormat::Yaml)
                    .required(*required),
            );
        }
        for yaml in &self.inline {
            builder = builder.add_source(File::from_str(yaml, config::FileFormat::Yaml));
        }
        builder = builder.add_source(
            Environment::with_prefix("PATHCRAFTER")
                .separator("__")
                .try_parsing(true),
        );
        let cfg = builder.build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let mut typed: PathcrafterConfig =
            serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))?;

        drop_unexpanded(&mut typed.llm.openai_api_key);
        drop_unexpanded(&mut typed.llm.gemini_api_key);
        typed.llm = typed.llm.with_default_models();
        Ok(typed)
    }
}

/// Candidate config files in lookup order: explicit path, working
/// directory, then the per-user config directory.
pub fn config_search_paths(explicit: Option<&Path>) -> Vec<PathBuf> {
    if let Some(path) = explicit {
        return vec![path.to_path_buf()];
    }
    let mut paths = vec![PathBuf::from(CONFIG_FILE_NAME)];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("pathcrafter").join(CONFIG_FILE_NAME));
    }
    paths
}

/// Load from `explicit` (required) or the first existing default location.
pub fn load_config(explicit: Option<&Path>) -> Result<(PathcrafterConfig, PathBuf), ConfigError> {
    let candidates = config_search_paths(explicit);
    let chosen = match explicit {
        Some(path) => path.to_path_buf(),
        None => candidates
            .iter()
            .find(|p| p.is_file())
            .cloned()
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME)),
    };
    let loader = if explicit.is_some() {
        PathcrafterConfigLoader::new().with_file(&chosen)
    } else {
        PathcrafterConfigLoader::new().with_optional_file(&chosen)
    };
    Ok((loader.load()?, chosen))
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("cannot access settings file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("settings file {path} is not valid YAML: {source}")]
    Yaml {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("settings file {0} does not hold a mapping at the top level")]
    NotAMapping(PathBuf),
}

/// Persist the model ids into `path`, keeping every other key as it was.
///
/// Blank ids are written as the defaults. The file is created if missing.
pub fn save_settings(path: &Path, llm: &LlmSettings) -> Result<(), SettingsError> {
    use serde_yaml::{Mapping, Value as Yaml};

    let mut root = match std::fs::read_to_string(path) {
        Ok(text) if !text.trim().is_empty() => serde_yaml::from_str::<Yaml>(&text).map_err(|source| {
            SettingsError::Yaml {
                path: path.to_path_buf(),
                source,
            }
        })?,
        Ok(_) => Yaml::Mapping(Mapping::new()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Yaml::Mapping(Mapping::new()),
        Err(source) => {
            return Err(SettingsError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let Yaml::Mapping(map) = &mut root else {
        return Err(SettingsError::NotAMapping(path.to_path_buf()));
    };
    let llm_key = Yaml::String("llm".into());
    if !matches!(map.get(&llm_key), Some(Yaml::Mapping(_))) {
        map.insert(llm_key.clone(), Yaml::Mapping(Mapping::new()));
    }
    let Some(Yaml::Mapping(section)) = map.get_mut(&llm_key) else {
        return Err(SettingsError::NotAMapping(path.to_path_buf()));
    };

    let normalized = llm.clone().with_default_models();
    section.insert(
        Yaml::String("chatgpt_model".into()),
        Yaml::String(normalized.chatgpt_model),
    );
    section.insert(
        Yaml::String("gemini_model".into()),
        Yaml::String(normalized.gemini_model),
    );

    let text = serde_yaml::to_string(&root).map_err(|source| SettingsError::Yaml {
        path: path.to_path_buf(),
        source,
    })?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| SettingsError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    std::fs::write(path, text).map_err(|source| SettingsError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn expands_simple_string() {
        temp_env::with_var("FOO", Some("bar"), || {
            let mut v = json!("prefix-${FOO}-suffix");
            expand_env_in_value(&mut v);
            assert_eq!(v, json!("prefix-bar-suffix"));
        });
    }

    #[test]
    fn expands_nested_sections() {
        temp_env::with_vars([("OPENAI_KEY_T", Some("sk-1")), ("GEM_KEY_T", Some("g-1"))], || {
            let mut v = json!({
                "llm": { "openai_api_key": "${OPENAI_KEY_T}", "gemini_api_key": "$GEM_KEY_T" },
                "poedb": { "timeout_secs": 10 },
                "list": ["${GEM_KEY_T}", null]
            });
            expand_env_in_value(&mut v);
            assert_eq!(v["llm"]["openai_api_key"], json!("sk-1"));
            assert_eq!(v["llm"]["gemini_api_key"], json!("g-1"));
            assert_eq!(v["poedb"]["timeout_secs"], json!(10));
            assert_eq!(v["list"], json!(["g-1", null]));
        });
    }

    #[test]
    fn expands_recursively_across_env_values() {
        temp_env::with_vars(
            [
                ("BAZ", Some("qux")),
                ("BAR", Some("mid-${BAZ}")),
                ("FOO", Some("start-${BAR}-end")),
            ],
            || {
                let mut v = json!("X=${FOO}");
                expand_env_in_value(&mut v);
                assert_eq!(v, json!("X=start-mid-qux-end"));
            },
        );
    }

    #[test]
    fn stops_on_cycles() {
        temp_env::with_vars([("A", Some("${B}")), ("B", Some("${A}"))], || {
            let mut v = json!("x=${A}-y");
            expand_env_in_value(&mut v);
            let s = v.as_str().unwrap();
            assert!(s.starts_with("x=") && s.ends_with("-y"));
            assert!(s.contains("${"));
        });
    }

    #[test]
    fn unexpanded_secrets_become_unset() {
        let mut key = Some("${NOT_SET_ANYWHERE}".to_string());
        drop_unexpanded(&mut key);
        assert_eq!(key, None);

        let mut key = Some("sk-real".to_string());
        drop_unexpanded(&mut key);
        assert_eq!(key.as_deref(), Some("sk-real"));
    }

    #[test]
    fn defaults_match_documented_values() {
        let cfg = PathcrafterConfig::default();
        assert_eq!(cfg.poedb.timeout(), Duration::from_secs(10));
        assert_eq!(cfg.poedb.politeness_delay(), Duration::from_millis(1500));
        assert_eq!(cfg.logging.filter, "info");
        assert_eq!(cfg.llm.chatgpt_model, pathcrafter_common::DEFAULT_CHATGPT_MODEL);
    }

    #[test]
    fn explicit_path_is_the_only_candidate() {
        let paths = config_search_paths(Some(Path::new("/tmp/x.yaml")));
        assert_eq!(paths, vec![PathBuf::from("/tmp/x.yaml")]);
        assert_eq!(config_search_paths(None)[0], PathBuf::from(CONFIG_FILE_NAME));
    }
}
