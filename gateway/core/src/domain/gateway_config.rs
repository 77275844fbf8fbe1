// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Gateway Configuration Types
//
// Defines the configuration schema for a gateway instance:
// - Kubernetes-style manifest format (apiVersion/kind/metadata/spec)
// - HTTP listener settings
// - Provider credentials and endpoints
// - Default and fallback provider selection
// - Logging and metrics settings

use crate::domain::llm::ProviderKind;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

pub const API_VERSION: &str = "gateway/v1";
pub const KIND: &str = "GatewayConfig";

/// Routes served by the gateway itself; the metrics endpoint may not reuse them
pub const RESERVED_PATHS: [&str; 8] = [
    "/llm/generate",
    "/llm/providers",
    "/llm/models",
    "/health",
    "/health/detailed",
    "/embed",
    "/embed/batch",
    "/embed/health",
];

/// Top-level Kubernetes-style gateway configuration manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// API version (must be "gateway/v1")
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    /// Resource kind (must be "GatewayConfig")
    pub kind: String,

    pub metadata: ManifestMetadata,

    #[serde(default)]
    pub spec: GatewayConfigSpec,
}

/// Manifest metadata (Kubernetes-style)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestMetadata {
    /// Human-readable instance name
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfigSpec {
    #[serde(default)]
    pub server: ServerConfig,

    /// Provider configurations; absent providers are not served
    #[serde(default = "default_providers")]
    pub providers: Vec<ProviderConfig>,

    #[serde(default)]
    pub selection: ProviderSelection,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Network bind address (e.g. "0.0.0.0" or "127.0.0.1")
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// HTTP API port
    #[serde(default = "default_api_port")]
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Provider name ("google" or "openai")
    pub name: String,

    /// Whether this provider is active
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// API key (supports "env:VAR_NAME"; defaults to the provider's standard variable)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Override of the vendor base URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

impl ProviderConfig {
    pub fn new(kind: ProviderKind) -> Self {
        Self {
            name: kind.as_str().to_string(),
            enabled: true,
            api_key: None,
            endpoint: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderSelection {
    /// Provider used when a request leaves `provider` unset (google when absent)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_provider: Option<String>,

    /// Provider tried once if the requested provider fails
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_provider: Option<String>,

    /// Fallback only happens when this is set explicitly
    #[serde(default)]
    pub fallback_enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (e.g., "info", "debug", "trace")
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format ("json" or "text")
    #[serde(default = "default_log_format")]
    pub format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Enable metrics exposition
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Metrics path (e.g., "/metrics")
    #[serde(default = "default_metrics_path")]
    pub path: String,
}

// Default value functions
fn default_true() -> bool {
    true
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_api_port() -> u16 {
    8000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

fn default_providers() -> Vec<ProviderConfig> {
    ProviderKind::ALL.into_iter().map(ProviderConfig::new).collect()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_api_port(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: default_metrics_path(),
        }
    }
}

impl Default for GatewayConfigSpec {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            providers: default_providers(),
            selection: ProviderSelection::default(),
            logging: LoggingConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        let hostname = hostname::get()
            .ok()
            .and_then(|h| h.into_string().ok())
            .unwrap_or_else(|| "llm-gateway".to_string());

        Self {
            api_version: API_VERSION.to_string(),
            kind: KIND.to_string(),
            metadata: ManifestMetadata {
                name: hostname,
                version: Some("1.0.0".to_string()),
                labels: None,
            },
            spec: GatewayConfigSpec::default(),
        }
    }
}

impl GatewayConfig {
    /// Load configuration from YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to YAML file
    pub fn to_yaml_file(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Parse configuration from YAML string
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Candidate configuration paths in precedence order (after an explicit --config)
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Ok(path) = std::env::var("GATEWAY_CONFIG_PATH") {
            paths.push(PathBuf::from(path));
        }
        paths.push(PathBuf::from("./gateway-config.yaml"));
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".llm-gateway").join("config.yaml"));
        }
        #[cfg(unix)]
        paths.push(PathBuf::from("/etc/llm-gateway/config.yaml"));
        #[cfg(windows)]
        paths.push(PathBuf::from("C:\\ProgramData\\LlmGateway\\config.yaml"));
        paths
    }

    /// Discover configuration file using precedence order
    /// 1. GATEWAY_CONFIG_PATH environment variable
    /// 2. ./gateway-config.yaml (working directory)
    /// 3. ~/.llm-gateway/config.yaml (user home)
    /// 4. /etc/llm-gateway/config.yaml (system)
    pub fn discover_config() -> Option<PathBuf> {
        Self::search_paths().into_iter().find(|p| p.exists())
    }

    /// Load configuration with discovery, fallback to default
    pub fn load_or_default(cli_path: Option<PathBuf>) -> anyhow::Result<Self> {
        // Explicit CLI path fails if missing/invalid
        if let Some(path) = cli_path {
            tracing::info!("Loading configuration from explicit path: {:?}", path);
            let mut config = Self::from_yaml_file(&path)
                .map_err(|e| anyhow::anyhow!("Failed to load config at {:?}: {}", path, e))?;
            config.apply_env_overrides();
            return Ok(config);
        }

        if let Some(config_path) = Self::discover_config() {
            tracing::info!("Loading configuration from discovered path: {:?}", config_path);
            let mut config = Self::from_yaml_file(config_path)?;
            config.apply_env_overrides();
            Ok(config)
        } else {
            tracing::warn!("No configuration file found in standard locations. Using defaults.");
            let mut config = Self::default();
            config.apply_env_overrides();
            Ok(config)
        }
    }

    /// Apply environment variable overrides to configuration
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary variable source
    pub fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup("GATEWAY_FALLBACK_PROVIDER") {
            if val.trim().is_empty() {
                tracing::info!("Environment override: fallback provider cleared");
                self.spec.selection.fallback_provider = None;
                self.spec.selection.fallback_enabled = false;
            } else {
                tracing::info!("Environment override: GATEWAY_FALLBACK_PROVIDER={}", val);
                self.spec.selection.fallback_provider = Some(val.trim().to_string());
                self.spec.selection.fallback_enabled = true;
            }
        }

        if let Some(val) = lookup("GATEWAY_FALLBACK_ENABLED") {
            match val.to_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => self.spec.selection.fallback_enabled = true,
                "false" | "0" | "no" | "off" => self.spec.selection.fallback_enabled = false,
                _ => tracing::warn!(
                    "Invalid value for GATEWAY_FALLBACK_ENABLED: '{}'. Expected true/false. Ignoring.",
                    val
                ),
            }
        }

        if let Some(val) = lookup("GATEWAY_BIND_ADDRESS") {
            tracing::info!("Environment override: GATEWAY_BIND_ADDRESS={}", val);
            self.spec.server.bind_address = val;
        }

        if let Some(val) = lookup("GATEWAY_PORT") {
            match val.parse::<u16>() {
                Ok(port) => self.spec.server.port = port,
                Err(_) => tracing::warn!("Invalid value for GATEWAY_PORT: '{}'. Ignoring.", val),
            }
        }

        if let Some(val) = lookup("GATEWAY_LOG_FORMAT") {
            self.spec.logging.format = val.to_lowercase();
        }
    }

    /// Configuration entry for a provider, if listed
    pub fn provider(&self, kind: ProviderKind) -> Option<&ProviderConfig> {
        self.spec
            .providers
            .iter()
            .find(|p| p.name.parse::<ProviderKind>().ok() == Some(kind))
    }

    /// Provider serving requests that name none
    pub fn default_provider(&self) -> ProviderKind {
        self.spec
            .selection
            .default_provider
            .as_deref()
            .and_then(|name| name.parse().ok())
            .unwrap_or(ProviderKind::Google)
    }

    /// Fallback provider, only when fallback is explicitly enabled
    pub fn fallback(&self) -> Option<ProviderKind> {
        if !self.spec.selection.fallback_enabled {
            return None;
        }
        self.spec
            .selection
            .fallback_provider
            .as_deref()
            .and_then(|name| name.parse().ok())
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.api_version != API_VERSION {
            anyhow::bail!(
                "Invalid apiVersion: '{}'. Must be '{}'",
                self.api_version,
                API_VERSION
            );
        }

        if self.kind != KIND {
            anyhow::bail!("Invalid kind: '{}'. Must be '{}'", self.kind, KIND);
        }

        if self.metadata.name.is_empty() {
            anyhow::bail!("metadata.name cannot be empty");
        }

        let mut seen = HashSet::new();
        for provider in &self.spec.providers {
            let kind: ProviderKind = provider
                .name
                .parse()
                .map_err(|e| anyhow::anyhow!("spec.providers: {}", e))?;
            if !seen.insert(kind) {
                anyhow::bail!("Provider '{}' is configured more than once", kind);
            }
            if let Some(endpoint) = &provider.endpoint {
                if endpoint.trim().is_empty() {
                    anyhow::bail!("Provider endpoint cannot be empty for: {}", provider.name);
                }
            }
        }

        let selection = &self.spec.selection;
        if let Some(default_provider) = &selection.default_provider {
            let kind: ProviderKind = default_provider
                .parse()
                .map_err(|e| anyhow::anyhow!("spec.selection.default_provider: {}", e))?;
            if self.provider(kind).is_none() {
                anyhow::bail!("Default provider '{}' not found in providers", default_provider);
            }
        }

        if let Some(fallback_provider) = &selection.fallback_provider {
            let kind: ProviderKind = fallback_provider
                .parse()
                .map_err(|e| anyhow::anyhow!("spec.selection.fallback_provider: {}", e))?;
            if self.provider(kind).is_none() {
                anyhow::bail!("Fallback provider '{}' not found in providers", fallback_provider);
            }
        } else if selection.fallback_enabled {
            anyhow::bail!("spec.selection.fallback_enabled requires fallback_provider");
        }

        match self.spec.logging.format.as_str() {
            "text" | "json" => {}
            other => anyhow::bail!("Invalid logging format: '{}'. Must be 'text' or 'json'", other),
        }

        if self.spec.metrics.enabled {
            let path = self.spec.metrics.path.as_str();
            if !path.starts_with('/') {
                anyhow::bail!("metrics.path must start with '/'");
            }
            if RESERVED_PATHS.contains(&path.trim_end_matches('/')) {
                anyhow::bail!("metrics.path '{}' collides with a gateway route", path);
            }
        }

        Ok(())
    }
}
