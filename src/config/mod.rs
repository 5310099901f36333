pub mod error;
pub mod load;
pub mod settings;

pub use error::ConfigError;
pub use load::{load_settings, resolve_config_path, CONFIG_PATH_ENV};
pub use settings::{
    BackendConfig, CompletionConfig, EnvironmentConfig, PollingConfig, ServerConfig, Settings,
    ToolEndpointConfig, ENV_BACKEND_MODEL, ENV_BACKEND_TOKEN, ENV_BACKEND_URL, ENV_LOG_PATH,
    ENV_PLATE_READER_URL, ENV_REGISTRY_URL,
};
