//! Application configuration

use std::path::Path;

use serde::Deserialize;

use crate::domain::{DomainError, PriorityOrder, ResolverConfig};

/// Directory searched for `default` and `local` configuration files
pub const DEFAULT_CONFIG_DIR: &str = "config";

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub resolver: ResolverSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Resolver behaviour, handed to `ControlValueResolver` at construction
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ResolverSettings {
    #[serde(default)]
    pub priority_order: PriorityOrder,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl From<&ResolverSettings> for ResolverConfig {
    fn from(settings: &ResolverSettings) -> Self {
        ResolverConfig::default().with_priority_order(settings.priority_order)
    }
}

impl AppConfig {
    /// Loads `config/default`, `config/local`, then `APP__*` environment variables
    pub fn load() -> Result<Self, DomainError> {
        Self::load_from(Path::new(DEFAULT_CONFIG_DIR))
    }

    /// Same as [`AppConfig::load`] with the two files read from `dir`
    ///
    /// Missing files are skipped, but a source that fails to parse or
    /// deserialize is an error.
    pub fn load_from(dir: &Path) -> Result<Self, DomainError> {
        Self::builder(dir)
            .build()
            .and_then(|built| built.try_deserialize())
            .map_err(|e| {
                DomainError::configuration(format!(
                    "Failed to load configuration from {}: {}",
                    dir.display(),
                    e
                ))
            })
    }

    fn builder(dir: &Path) -> config::ConfigBuilder<config::builder::DefaultState> {
        let file = |name: &str| {
            config::File::with_name(&dir.join(name).to_string_lossy()).required(false)
        };

        config::Config::builder()
            .add_source(file("default"))
            .add_source(file("local"))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
    }

    pub fn resolver_config(&self) -> ResolverConfig {
        ResolverConfig::from(&self.resolver)
    }
}
