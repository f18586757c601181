use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use crate::models::TravelMode;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub routing: RoutingSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub filtering: FilteringSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
        }
    }
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }

/// Routing provider connection and retry behaviour
#[derive(Debug, Clone, Deserialize)]
pub struct RoutingSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_true")]
    pub retry_over_query_limit: bool,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
    #[serde(default = "default_retry_timeout_secs")]
    pub retry_timeout_secs: u64,
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
    #[serde(default)]
    pub travel_mode: TravelMode,
}

impl Default for RoutingSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: String::new(),
            timeout_secs: default_timeout_secs(),
            retry_over_query_limit: true,
            max_retries: default_max_retries(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            retry_timeout_secs: default_retry_timeout_secs(),
            max_concurrency: default_max_concurrency(),
            travel_mode: TravelMode::default(),
        }
    }
}

fn default_base_url() -> String { "https://maps.googleapis.com".to_string() }
fn default_timeout_secs() -> u64 { 30 }
fn default_true() -> bool { true }
fn default_max_retries() -> u32 { 5 }
fn default_retry_base_delay_ms() -> u64 { 200 }
fn default_retry_timeout_secs() -> u64 { 60 }
fn default_max_concurrency() -> usize { 1 }

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_cache_capacity")]
    pub capacity: u64,
    #[serde(default = "default_cache_ttl_secs")]
    pub ttl_secs: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            capacity: default_cache_capacity(),
            ttl_secs: default_cache_ttl_secs(),
        }
    }
}

fn default_cache_capacity() -> u64 { 10_000 }
fn default_cache_ttl_secs() -> u64 { 3600 }

#[derive(Debug, Clone, Deserialize)]
pub struct FilteringSettings {
    #[serde(default = "default_excluded_categories")]
    pub excluded_categories: Vec<String>,
}

impl Default for FilteringSettings {
    fn default() -> Self {
        Self {
            excluded_categories: default_excluded_categories(),
        }
    }
}

fn default_excluded_categories() -> Vec<String> {
    vec![crate::core::filters::MEDICINAL_ONLY_CATEGORY.to_string()]
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with NEARMATCH_)
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., NEARMATCH__ROUTING__API_KEY -> routing.api_key
            .add_source(
                Environment::with_prefix("NEARMATCH")
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("filtering.excluded_categories")
                    .try_parsing(true),
            )
            .build()?;

        settings = substitute_env_vars(settings)?;

        settings.try_deserialize()
    }
}

/// Apply well-known credential variables on top of the loaded config
///
/// `NEARMATCH_ROUTING__API_KEY` wins over `GOOGLE_MAPS_API_KEY`.
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    apply_credential_override(settings, |name| std::env::var(name).ok())
}

fn apply_credential_override<F>(settings: Config, lookup: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let api_key = lookup("NEARMATCH_ROUTING__API_KEY").or_else(|| lookup("GOOGLE_MAPS_API_KEY"));

    let mut builder = Config::builder().add_source(settings);

    if let Some(api_key) = api_key {
        builder = builder.set_override("routing.api_key", api_key)?;
    }

    builder.build()
}
