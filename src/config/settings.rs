use super::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_BACKEND_URL: &str = "OPENWEBUIHOSTURL";
pub const ENV_BACKEND_TOKEN: &str = "OPENWEBUIAPITOKEN";
pub const ENV_BACKEND_MODEL: &str = "OPENWEBUIMODELNAME";
pub const ENV_REGISTRY_URL: &str = "DVSAAPIURL";
pub const ENV_PLATE_READER_URL: &str = "OPENALPRAPIURL";
pub const ENV_LOG_PATH: &str = "CHATRELAY_LOG_PATH";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub polling: PollingConfig,
    #[serde(default)]
    pub environment: EnvironmentConfig,
    #[serde(default)]
    pub completion: CompletionConfig,
    #[serde(default)]
    pub registry: ToolEndpointConfig,
    #[serde(default)]
    pub plate_reader: ToolEndpointConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub log_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendConfig {
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub model: String,
    #[serde(default = "default_backend_timeout_seconds")]
    pub request_timeout_seconds: u64,
    #[serde(default = "default_tools")]
    pub tools: Vec<String>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            token: String::new(),
            model: String::new(),
            request_timeout_seconds: default_backend_timeout_seconds(),
            tools: default_tools(),
        }
    }
}

impl BackendConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
pub struct PollingConfig {
    #[serde(default = "default_poll_interval_ms")]
    pub interval_ms: u64,
    #[serde(default = "default_poll_max_attempts")]
    pub max_attempts: u32,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_poll_interval_ms(),
            max_attempts: default_poll_max_attempts(),
        }
    }
}

impl PollingConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// Values forwarded to the backend as prompt template variables.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct EnvironmentConfig {
    #[serde(default)]
    pub user_name: String,
    #[serde(default = "default_user_language")]
    pub user_language: String,
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            user_name: String::new(),
            user_language: default_user_language(),
            timezone: default_timezone(),
        }
    }
}

impl EnvironmentConfig {
    pub fn resolve_timezone(&self) -> Result<chrono_tz::Tz, ConfigError> {
        self.timezone.trim().parse::<chrono_tz::Tz>().map_err(|_| {
            ConfigError::Settings(format!(
                "environment.timezone `{}` is not a known IANA timezone",
                self.timezone
            ))
        })
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
pub struct CompletionConfig {
    #[serde(default = "default_true")]
    pub title_generation: bool,
    #[serde(default)]
    pub tags_generation: bool,
    #[serde(default)]
    pub follow_up_generation: bool,
    #[serde(default)]
    pub code_interpreter: bool,
    #[serde(default)]
    pub web_search: bool,
    #[serde(default)]
    pub image_generation: bool,
    #[serde(default)]
    pub memory: bool,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            title_generation: true,
            tags_generation: false,
            follow_up_generation: false,
            code_interpreter: false,
            web_search: false,
            image_generation: false,
            memory: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ToolEndpointConfig {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_tool_timeout_seconds")]
    pub timeout_seconds: u64,
    #[serde(default = "default_connect_timeout_seconds")]
    pub connect_timeout_seconds: u64,
}

impl Default for ToolEndpointConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_seconds: default_tool_timeout_seconds(),
            connect_timeout_seconds: default_connect_timeout_seconds(),
        }
    }
}

impl ToolEndpointConfig {
    pub fn configured_base_url(&self) -> Option<&str> {
        self.base_url
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_backend_timeout_seconds() -> u64 {
    60
}

fn default_tool_timeout_seconds() -> u64 {
    30
}

fn default_connect_timeout_seconds() -> u64 {
    5
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_poll_max_attempts() -> u32 {
    15
}

fn default_tools() -> Vec<String> {
    vec!["DVSA Lookup".to_string()]
}

fn default_user_language() -> String {
    "en-US".to_string()
}

fn default_timezone() -> String {
    "Europe/London".to_string()
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

impl Settings {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Defaults with environment values applied; used when no file is given.
    pub fn from_env() -> Self {
        let mut settings = Self::default();
        settings.apply_env_overrides();
        settings
    }

    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Non-empty values returned by `lookup` replace the file values.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(value) = read(ENV_BACKEND_URL) {
            self.backend.base_url = value;
        }
        if let Some(value) = read(ENV_BACKEND_TOKEN) {
            self.backend.token = value;
        }
        if let Some(value) = read(ENV_BACKEND_MODEL) {
            self.backend.model = value;
        }
        if let Some(value) = read(ENV_REGISTRY_URL) {
            self.registry.base_url = Some(value);
        }
        if let Some(value) = read(ENV_PLATE_READER_URL) {
            self.plate_reader.base_url = Some(value);
        }
        if let Some(value) = read(ENV_LOG_PATH) {
            self.log_path = Some(PathBuf::from(value));
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let base_url = self.backend.base_url.trim();
        if base_url.is_empty() {
            return Err(ConfigError::Settings(format!(
                "backend.base_url must be set (or {ENV_BACKEND_URL})"
            )));
        }
        if !has_http_scheme(base_url) {
            return Err(ConfigError::Settings(format!(
                "backend.base_url `{base_url}` must start with http:// or https://"
            )));
        }
        if self.backend.token.trim().is_empty() {
            return Err(ConfigError::Settings(format!(
                "backend.token must be set (or {ENV_BACKEND_TOKEN})"
            )));
        }
        if self.backend.model.trim().is_empty() {
            return Err(ConfigError::Settings(format!(
                "backend.model must be set (or {ENV_BACKEND_MODEL})"
            )));
        }
        if self.backend.request_timeout_seconds == 0 {
            return Err(ConfigError::Settings(
                "backend.request_timeout_seconds must be greater than zero".to_string(),
            ));
        }
        if self.polling.max_attempts == 0 {
            return Err(ConfigError::Settings(
                "polling.max_attempts must be greater than zero".to_string(),
            ));
        }
        for (name, tool) in [("registry", &self.registry), ("plate_reader", &self.plate_reader)] {
            if let Some(url) = tool.configured_base_url() {
                if !has_http_scheme(url) {
                    return Err(ConfigError::Settings(format!(
                        "{name}.base_url `{url}` must start with http:// or https://"
                    )));
                }
            }
            if tool.timeout_seconds == 0 {
                return Err(ConfigError::Settings(format!(
                    "{name}.timeout_seconds must be greater than zero"
                )));
            }
        }
        self.environment.resolve_timezone()?;
        Ok(())
    }
}

fn has_http_scheme(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}
