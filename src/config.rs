//! Configuration for eventmail.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (OPENAI_API_KEY, TAVILY_API_KEY, ...)
//! 2. Config file (.eventmail/config.yaml)
//! 3. Defaults
//!
//! Config file discovery:
//! - An explicit path (`--config`) wins
//! - Otherwise searches current directory and parents for .eventmail/config.yaml
//! - Finally falls back to the user config dir (~/.config/eventmail/config.yaml)
//!
//! API keys are only ever read from the environment.
//!
//! Settings are loaded once at startup and passed to constructors as an
//! immutable value.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid value for {name}: {value:?}")]
    InvalidEnv { name: &'static str, value: String },
}

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub assistant: AssistantSection,
    #[serde(default)]
    pub openai: OpenAiSection,
    #[serde(default)]
    pub search: SearchSection,
    #[serde(default)]
    pub reply: ReplySection,
    #[serde(default)]
    pub log_level: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssistantSection {
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OpenAiSection {
    pub model: Option<String>,
    pub timeout_seconds: Option<f64>,
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchSection {
    pub max_results: Option<usize>,
    pub timeout_seconds: Option<f64>,
    pub tavily_base_url: Option<String>,
    pub duckduckgo_base_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReplySection {
    pub max_items: Option<usize>,
    pub min_items: Option<usize>,
}

pub const DEFAULT_LOCATION: &str = "Surat";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_TAVILY_BASE_URL: &str = "https://api.tavily.com";
pub const DEFAULT_DUCKDUCKGO_BASE_URL: &str = "https://html.duckduckgo.com/html";

/// Generation backend settings
#[derive(Debug, Clone)]
pub struct OpenAiSettings {
    pub api_key: Option<String>,
    pub model: String,
    pub timeout: Duration,
    pub base_url: String,
}

/// Search backend settings
#[derive(Debug, Clone)]
pub struct SearchSettings {
    pub tavily_api_key: Option<String>,
    pub max_results: usize,
    pub timeout: Duration,
    pub tavily_base_url: String,
    pub duckduckgo_base_url: String,
}

/// Reply shaping bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplySettings {
    /// Maximum sources returned to the caller
    pub max_items: usize,
    /// Minimum bullet items requested from the generator
    pub min_items: usize,
}

impl Default for ReplySettings {
    fn default() -> Self {
        Self {
            max_items: 4,
            min_items: 2,
        }
    }
}

/// Resolved, immutable process configuration
#[derive(Debug, Clone)]
pub struct Settings {
    /// Location name used in hints, search topics and canned replies
    pub location: String,
    pub openai: OpenAiSettings,
    pub search: SearchSettings,
    pub reply: ReplySettings,
    pub log_level: String,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            location: DEFAULT_LOCATION.to_string(),
            openai: OpenAiSettings {
                api_key: None,
                model: DEFAULT_OPENAI_MODEL.to_string(),
                timeout: Duration::from_secs(30),
                base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            },
            search: SearchSettings {
                tavily_api_key: None,
                max_results: 6,
                timeout: Duration::from_secs(15),
                tavily_base_url: DEFAULT_TAVILY_BASE_URL.to_string(),
                duckduckgo_base_url: DEFAULT_DUCKDUCKGO_BASE_URL.to_string(),
            },
            reply: ReplySettings::default(),
            log_level: "info".to_string(),
            config_file: None,
        }
    }
}

impl Settings {
    /// Load settings from the process environment and the discovered (or
    /// explicit) config file.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let config_path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => find_config_file(),
        };

        let file = match config_path {
            Some(ref path) => Some(load_config_file(path)?),
            None => None,
        };

        let mut settings = Self::resolve(file, |name| std::env::var(name).ok())?;
        settings.config_file = config_path;
        Ok(settings)
    }

    /// Layer defaults, an optional config file and an environment lookup.
    pub fn resolve<F>(file: Option<ConfigFile>, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = |name: &str| env(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let file = file.unwrap_or_default();
        let defaults = Self::default();

        let location = env("EVENTMAIL_LOCATION")
            .or(file.assistant.location)
            .unwrap_or(defaults.location);

        let openai = OpenAiSettings {
            api_key: env("OPENAI_API_KEY"),
            model: env("OPENAI_MODEL")
                .or(file.openai.model)
                .unwrap_or(defaults.openai.model),
            timeout: match env("OPENAI_TIMEOUT_S") {
                Some(raw) => parse_seconds("OPENAI_TIMEOUT_S", &raw)?,
                None => file
                    .openai
                    .timeout_seconds
                    .and_then(seconds)
                    .unwrap_or(defaults.openai.timeout),
            },
            base_url: env("OPENAI_BASE_URL")
                .or(file.openai.base_url)
                .unwrap_or(defaults.openai.base_url),
        };

        let search = SearchSettings {
            tavily_api_key: env("TAVILY_API_KEY"),
            max_results: match env("SEARCH_MAX_RESULTS") {
                Some(raw) => parse_count("SEARCH_MAX_RESULTS", &raw)?,
                None => file
                    .search
                    .max_results
                    .unwrap_or(defaults.search.max_results),
            },
            timeout: match env("SEARCH_TIMEOUT_S") {
                Some(raw) => parse_seconds("SEARCH_TIMEOUT_S", &raw)?,
                None => file
                    .search
                    .timeout_seconds
                    .and_then(seconds)
                    .unwrap_or(defaults.search.timeout),
            },
            tavily_base_url: file
                .search
                .tavily_base_url
                .unwrap_or(defaults.search.tavily_base_url),
            duckduckgo_base_url: file
                .search
                .duckduckgo_base_url
                .unwrap_or(defaults.search.duckduckgo_base_url),
        };

        let reply = ReplySettings {
            max_items: match env("MAX_REPLY_ITEMS") {
                Some(raw) => parse_count("MAX_REPLY_ITEMS", &raw)?,
                None => file.reply.max_items.unwrap_or(defaults.reply.max_items),
            },
            min_items: match env("MIN_REPLY_ITEMS") {
                Some(raw) => parse_count("MIN_REPLY_ITEMS", &raw)?,
                None => file.reply.min_items.unwrap_or(defaults.reply.min_items),
            },
        };

        let log_level = env("LOG_LEVEL")
            .or(file.log_level)
            .unwrap_or(defaults.log_level)
            .to_lowercase();

        Ok(Self {
            location,
            openai,
            search,
            reply,
            log_level,
            config_file: None,
        })
    }

    /// Display-safe view of the settings (keys shown as set/unset)
    pub fn redacted(&self) -> RedactedSettings {
        let flag = |key: &Option<String>| if key.is_some() { "set" } else { "unset" };
        RedactedSettings {
            config_file: self.config_file.as_ref().map(|p| p.display().to_string()),
            location: self.location.clone(),
            openai_api_key: flag(&self.openai.api_key),
            openai_model: self.openai.model.clone(),
            openai_timeout_seconds: self.openai.timeout.as_secs_f64(),
            openai_base_url: self.openai.base_url.clone(),
            tavily_api_key: flag(&self.search.tavily_api_key),
            search_max_results: self.search.max_results,
            search_timeout_seconds: self.search.timeout.as_secs_f64(),
            max_reply_items: self.reply.max_items,
            min_reply_items: self.reply.min_items,
            log_level: self.log_level.clone(),
        }
    }
}

/// Serializable settings view with secrets removed
#[derive(Debug, Clone, Serialize)]
pub struct RedactedSettings {
    pub config_file: Option<String>,
    pub location: String,
    pub openai_api_key: &'static str,
    pub openai_model: String,
    pub openai_timeout_seconds: f64,
    pub openai_base_url: String,
    pub tavily_api_key: &'static str,
    pub search_max_results: usize,
    pub search_timeout_seconds: f64,
    pub max_reply_items: usize,
    pub min_reply_items: usize,
    pub log_level: String,
}

fn seconds(value: f64) -> Option<Duration> {
    (value.is_finite() && value > 0.0).then(|| Duration::from_secs_f64(value))
}

fn parse_seconds(name: &'static str, raw: &str) -> Result<Duration, ConfigError> {
    raw.parse::<f64>()
        .ok()
        .and_then(seconds)
        .ok_or_else(|| ConfigError::InvalidEnv {
            name,
            value: raw.to_string(),
        })
}

fn parse_count(name: &'static str, raw: &str) -> Result<usize, ConfigError> {
    raw.parse::<usize>().map_err(|_| ConfigError::InvalidEnv {
        name,
        value: raw.to_string(),
    })
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    if let Ok(cwd) = std::env::current_dir() {
        if let Some(found) = find_config_file_from(&cwd) {
            return Some(found);
        }
    }

    let user_config = dirs::config_dir()?.join("eventmail").join("config.yaml");
    user_config.exists().then_some(user_config)
}

fn find_config_file_from(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        let config_path = current.join(".eventmail").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::TempDir;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_without_file_or_env() {
        let settings = Settings::resolve(None, env_from(&[])).unwrap();

        assert_eq!(settings.location, "Surat");
        assert_eq!(settings.openai.model, "gpt-4o-mini");
        assert_eq!(settings.openai.timeout, Duration::from_secs(30));
        assert!(settings.openai.api_key.is_none());
        assert!(settings.search.tavily_api_key.is_none());
        assert_eq!(settings.search.max_results, 6);
        assert_eq!(settings.reply, ReplySettings { max_items: 4, min_items: 2 });
        assert_eq!(settings.log_level, "info");
    }

    #[test]
    fn test_config_file_parsing() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join(".eventmail");
        std::fs::create_dir_all(&dir).unwrap();

        let config_path = dir.join("config.yaml");
        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(
            file,
            r#"
version: "1"
assistant:
  location: Pune
openai:
  model: gpt-4o
  timeout_seconds: 12.5
search:
  max_results: 8
reply:
  max_items: 3
"#
        )
        .unwrap();

        let config = load_config_file(&config_path).unwrap();
        let settings = Settings::resolve(Some(config), env_from(&[])).unwrap();

        assert_eq!(settings.location, "Pune");
        assert_eq!(settings.openai.model, "gpt-4o");
        assert_eq!(settings.openai.timeout, Duration::from_secs_f64(12.5));
        assert_eq!(settings.search.max_results, 8);
        assert_eq!(settings.reply.max_items, 3);
        assert_eq!(settings.reply.min_items, 2);
    }

    #[test]
    fn test_env_overrides_file() {
        let file = ConfigFile {
            openai: OpenAiSection {
                model: Some("from-file".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        let env = env_from(&[
            ("OPENAI_MODEL", "from-env"),
            ("OPENAI_API_KEY", "sk-test"),
            ("TAVILY_API_KEY", "  "),
            ("MAX_REPLY_ITEMS", "2"),
        ]);

        let settings = Settings::resolve(Some(file), env).unwrap();
        assert_eq!(settings.openai.model, "from-env");
        assert_eq!(settings.openai.api_key.as_deref(), Some("sk-test"));
        // Blank values count as unset
        assert!(settings.search.tavily_api_key.is_none());
        assert_eq!(settings.reply.max_items, 2);
    }

    #[test]
    fn test_invalid_env_number_is_error() {
        let err = Settings::resolve(None, env_from(&[("SEARCH_MAX_RESULTS", "lots")])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidEnv { name: "SEARCH_MAX_RESULTS", .. }
        ));

        let err = Settings::resolve(None, env_from(&[("OPENAI_TIMEOUT_S", "-1")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { name: "OPENAI_TIMEOUT_S", .. }));
    }

    #[test]
    fn test_find_config_file_in_parent() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join(".eventmail");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("config.yaml"), "version: \"1\"\n").unwrap();

        let nested = temp.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        let found = find_config_file_from(&nested).unwrap();
        assert_eq!(found, dir.join("config.yaml"));
    }

    #[test]
    fn test_redacted_hides_keys() {
        let settings = Settings::resolve(
            None,
            env_from(&[("OPENAI_API_KEY", "sk-secret"), ("TAVILY_API_KEY", "tvly-secret")]),
        )
        .unwrap();

        let rendered = serde_json::to_string(&settings.redacted()).unwrap();
        assert!(!rendered.contains("sk-secret"));
        assert!(!rendered.contains("tvly-secret"));
        assert!(rendered.contains("\"openai_api_key\":\"set\""));
    }
}
