//! Configuration management for the OCCI backend layer
//!
//! Supports configuration via:
//! - Environment variables (primary)
//! - Optional TOML config file (secondary)
//!
//! Environment variables take precedence over config file values.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

use crate::errors::{BackendError, Result};

/// Cloud provider served by the backend adapters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    /// OpenNebula
    Opennebula,
    /// Azure classic (fixture-backed)
    Azure,
    /// Azure Resource Manager
    Msazure,
}

impl ProviderType {
    /// Name used as the fixture cache key prefix
    pub fn name(&self) -> &'static str {
        match self {
            ProviderType::Opennebula => "opennebula",
            ProviderType::Azure => "azure",
            ProviderType::Msazure => "msazure",
        }
    }
}

impl FromStr for ProviderType {
    type Err = BackendError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "opennebula" | "one" => Ok(ProviderType::Opennebula),
            "azure" => Ok(ProviderType::Azure),
            "msazure" | "arm" | "azure_arm" => Ok(ProviderType::Msazure),
            _ => Err(BackendError::Config(format!("Unknown provider type: {}", s))),
        }
    }
}

/// Backend adapter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Provider type (opennebula, azure, msazure)
    #[serde(rename = "type")]
    pub provider: ProviderType,

    /// Directory holding `<kind>.json` fixture files
    #[serde(default)]
    pub fixtures_dir: Option<PathBuf>,

    /// Scheme prefix for provider-specific mixins
    /// (defaults to `http://occi.<hostname>`)
    #[serde(default)]
    pub backend_scheme: Option<String>,

    /// Azure-specific: AAD tenant
    #[serde(default)]
    pub tenant_id: Option<String>,

    /// Azure-specific: service principal client id
    #[serde(default)]
    pub client_id: Option<String>,

    /// Azure-specific: service principal secret
    #[serde(default, skip_serializing)]
    pub client_secret: Option<String>,

    /// Azure-specific: subscription the management clients are bound to
    #[serde(default)]
    pub subscription_id: Option<String>,

    /// Azure-specific: deployment region (default: westus)
    #[serde(default = "default_location")]
    pub location: String,

    /// Azure-specific: management endpoint
    #[serde(default = "default_management_endpoint")]
    pub management_endpoint: String,
}

fn default_location() -> String {
    "westus".to_string()
}

fn default_management_endpoint() -> String {
    "https://management.azure.com".to_string()
}

/// Properties of the OCCI server the backends run under
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerProperties {
    /// Public hostname
    #[serde(default)]
    pub hostname: Option<String>,
}

/// Fixture cache configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Redis URL; a process-local cache is used when unset
    #[serde(default)]
    pub url: Option<String>,
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Backend adapter configuration
    pub backend: BackendConfig,

    /// Server properties
    #[serde(default)]
    pub server: ServerProperties,

    /// Fixture cache configuration
    #[serde(default)]
    pub cache: CacheConfig,

    /// Log level (default: info)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl BackendConfig {
    /// Scheme used for provider-specific mixins
    pub fn backend_scheme(&self, server: &ServerProperties) -> String {
        match &self.backend_scheme {
            Some(scheme) if !scheme.is_empty() => scheme.trim_end_matches('/').to_string(),
            _ => format!(
                "http://occi.{}",
                server.hostname.as_deref().unwrap_or("localhost")
            ),
        }
    }

    /// Whether the configured provider serves data from the fixture store
    pub fn uses_fixtures(&self) -> bool {
        self.fixtures_dir.is_some() && self.provider != ProviderType::Opennebula
    }
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - OCCI_BACKEND_TYPE: opennebula|azure|msazure
    /// - OCCI_FIXTURES_DIR: fixtures directory
    /// - OCCI_BACKEND_SCHEME: scheme for provider mixins (optional)
    /// - OCCI_AZURE_TENANT_ID / OCCI_AZURE_CLIENT_ID / OCCI_AZURE_CLIENT_SECRET
    /// - OCCI_AZURE_SUBSCRIPTION_ID: subscription for ARM clients
    /// - OCCI_AZURE_LOCATION: deployment region (default: westus)
    /// - OCCI_AZURE_MANAGEMENT_ENDPOINT: ARM endpoint override
    /// - OCCI_SERVER_HOSTNAME: server hostname
    /// - OCCI_CACHE_URL: redis URL (optional)
    /// - OCCI_LOG_LEVEL: log level (default: info)
    /// - OCCI_CONFIG_FILE: optional path to TOML config file
    pub fn from_env() -> Result<Self> {
        let config_file = std::env::var("OCCI_CONFIG_FILE").ok();
        let mut config = if let Some(path) = &config_file {
            Self::from_file(path)?
        } else {
            Self::default()
        };

        if let Ok(provider) = std::env::var("OCCI_BACKEND_TYPE") {
            config.backend.provider = ProviderType::from_str(&provider)?;
        }

        if let Ok(dir) = std::env::var("OCCI_FIXTURES_DIR") {
            config.backend.fixtures_dir = Some(PathBuf::from(dir));
        }

        if let Ok(scheme) = std::env::var("OCCI_BACKEND_SCHEME") {
            config.backend.backend_scheme = Some(scheme);
        }

        if let Ok(tenant) = std::env::var("OCCI_AZURE_TENANT_ID") {
            config.backend.tenant_id = Some(tenant);
        }

        if let Ok(client) = std::env::var("OCCI_AZURE_CLIENT_ID") {
            config.backend.client_id = Some(client);
        }

        if let Ok(secret) = std::env::var("OCCI_AZURE_CLIENT_SECRET") {
            config.backend.client_secret = Some(secret);
        }

        if let Ok(subscription) = std::env::var("OCCI_AZURE_SUBSCRIPTION_ID") {
            config.backend.subscription_id = Some(subscription);
        }

        if let Ok(location) = std::env::var("OCCI_AZURE_LOCATION") {
            config.backend.location = location;
        }

        if let Ok(endpoint) = std::env::var("OCCI_AZURE_MANAGEMENT_ENDPOINT") {
            config.backend.management_endpoint = endpoint;
        }

        if let Ok(hostname) = std::env::var("OCCI_SERVER_HOSTNAME") {
            config.server.hostname = Some(hostname);
        }

        if let Ok(url) = std::env::var("OCCI_CACHE_URL") {
            config.cache.url = Some(url);
        }

        if let Ok(level) = std::env::var("OCCI_LOG_LEVEL") {
            config.log_level = level;
        }

        Ok(config)
    }

    /// Load configuration from TOML file
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| BackendError::Config(format!("Invalid config file {}: {}", path, e)))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: BackendConfig {
                provider: ProviderType::Azure,
                fixtures_dir: None,
                backend_scheme: None,
                tenant_id: None,
                client_id: None,
                client_secret: None,
                subscription_id: None,
                location: default_location(),
                management_endpoint: default_management_endpoint(),
            },
            server: ServerProperties::default(),
            cache: CacheConfig::default(),
            log_level: default_log_level(),
        }
    }
}
