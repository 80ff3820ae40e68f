//! Configuration loading and management.
//!
//! This module loads the bridge configuration from TOML, YAML, or JSON files,
//! discovers `ocr-bridge.toml` in the directory hierarchy, and applies
//! `OCR_BRIDGE_*` environment overrides. Every field has a default, and the
//! defaults reproduce the fixed setup the service has always shipped with:
//! loopback on port 5000, English recognition, GPU execution.

use crate::{BridgeError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Name of the file searched for by [`BridgeConfig::discover`].
pub const CONFIG_FILE_NAME: &str = "ocr-bridge.toml";

/// Main bridge configuration.
///
/// # Example
///
/// ```rust
/// use ocr_bridge::core::config::BridgeConfig;
///
/// let config = BridgeConfig::default();
/// assert_eq!(config.server.port, 5000);
/// assert_eq!(config.engine.language, "en");
///
/// // let config = BridgeConfig::from_file("ocr-bridge.toml")?;
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// OCR engine settings
    #[serde(default)]
    pub engine: EngineConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host or IP address to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind to
    #[serde(default = "default_port")]
    pub port: u16,

    /// Explicit CORS origins (empty = any origin)
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Maximum accepted request body size in bytes.
    ///
    /// Images travel base64-encoded inside JSON, so this has to be well above
    /// the size of the largest raw image clients send.
    #[serde(default = "default_max_request_body_bytes")]
    pub max_request_body_bytes: usize,
}

/// OCR engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Recognition language passed to the engine (PaddleOCR codes, e.g. "en", "ch")
    #[serde(default = "default_language")]
    pub language: String,

    /// Execution device
    #[serde(default)]
    pub device: Device,
}

/// Execution device for inference.
///
/// Serialized the way PaddleOCR spells it: `"cpu"`, `"gpu"`, or `"gpu:N"`
/// for a specific card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Device {
    Cpu,
    Gpu(Option<u32>),
}

impl Default for Device {
    fn default() -> Self {
        Device::Gpu(None)
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Device::Cpu => write!(f, "cpu"),
            Device::Gpu(None) => write!(f, "gpu"),
            Device::Gpu(Some(index)) => write!(f, "gpu:{}", index),
        }
    }
}

impl FromStr for Device {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "cpu" => Ok(Device::Cpu),
            "gpu" => Ok(Device::Gpu(None)),
            other => match other.strip_prefix("gpu:") {
                Some(index) => index
                    .parse::<u32>()
                    .map(|i| Device::Gpu(Some(i)))
                    .map_err(|_| BridgeError::validation(format!("Invalid GPU index in device '{}'", s))),
                None => Err(BridgeError::validation(format!(
                    "Unknown device '{}', expected 'cpu', 'gpu' or 'gpu:N'",
                    s
                ))),
            },
        }
    }
}

impl TryFrom<String> for Device {
    type Error = BridgeError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Device> for String {
    fn from(device: Device) -> Self {
        device.to_string()
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_max_request_body_bytes() -> usize {
    100 * 1024 * 1024
}

fn default_language() -> String {
    "en".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
            max_request_body_bytes: default_max_request_body_bytes(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            device: Device::default(),
        }
    }
}

impl BridgeConfig {
    /// Load configuration from a file, picking the format from its extension.
    ///
    /// Supported extensions: `.toml`, `.yaml`, `.yml`, `.json`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        match extension.as_deref() {
            Some("toml") => Self::from_toml_file(path),
            Some("yaml") | Some("yml") => Self::from_yaml_file(path),
            Some("json") => Self::from_json_file(path),
            _ => Err(BridgeError::validation(format!(
                "Unsupported config file format: {} (expected .toml, .yaml, .yml or .json)",
                path.display()
            ))),
        }
    }

    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;

        toml::from_str(&content)
            .map_err(|e| BridgeError::validation(format!("Invalid TOML in {}: {}", path.as_ref().display(), e)))
    }

    /// Load configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;

        serde_yaml_ng::from_str(&content)
            .map_err(|e| BridgeError::validation(format!("Invalid YAML in {}: {}", path.as_ref().display(), e)))
    }

    /// Load configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;

        serde_json::from_str(&content)
            .map_err(|e| BridgeError::validation(format!("Invalid JSON in {}: {}", path.as_ref().display(), e)))
    }

    /// Discover a configuration file in the current or parent directories.
    ///
    /// # Returns
    ///
    /// - `Some(config)` if an `ocr-bridge.toml` was found
    /// - `None` if no config file exists up to the filesystem root
    pub fn discover() -> Result<Option<Self>> {
        let current = std::env::current_dir().map_err(BridgeError::Io)?;
        Self::discover_from(&current)
    }

    /// Same as [`BridgeConfig::discover`] but starting from an explicit directory.
    pub fn discover_from(start: &Path) -> Result<Option<Self>> {
        for dir in start.ancestors() {
            let candidate = dir.join(CONFIG_FILE_NAME);
            if candidate.is_file() {
                tracing::debug!("Discovered config file at {}", candidate.display());
                return Ok(Some(Self::from_toml_file(candidate)?));
            }
        }

        Ok(None)
    }

    /// Apply `OCR_BRIDGE_*` environment variable overrides in place.
    ///
    /// Values that fail to parse are logged and ignored, leaving the previous
    /// value untouched.
    ///
    /// ```bash
    /// export OCR_BRIDGE_HOST=0.0.0.0
    /// export OCR_BRIDGE_PORT=8080
    /// export OCR_BRIDGE_CORS_ORIGINS="chrome-extension://abcdef,https://app.example.com"
    /// export OCR_BRIDGE_MAX_REQUEST_BODY_BYTES=52428800
    /// export OCR_BRIDGE_LANGUAGE=en
    /// export OCR_BRIDGE_DEVICE=gpu:0
    /// ```
    pub fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("OCR_BRIDGE_HOST") {
            if host.trim().is_empty() {
                tracing::warn!("OCR_BRIDGE_HOST is set but empty, keeping '{}'", self.server.host);
            } else {
                self.server.host = host.trim().to_string();
            }
        }

        if let Ok(value) = std::env::var("OCR_BRIDGE_PORT") {
            match value.trim().parse::<u16>() {
                Ok(port) if port > 0 => self.server.port = port,
                _ => tracing::warn!("Failed to parse OCR_BRIDGE_PORT='{}', must be a port in 1-65535", value),
            }
        }

        if let Ok(value) = std::env::var("OCR_BRIDGE_CORS_ORIGINS") {
            self.server.cors_origins = value
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }

        if let Ok(value) = std::env::var("OCR_BRIDGE_MAX_REQUEST_BODY_BYTES") {
            match value.trim().parse::<usize>() {
                Ok(bytes) if bytes > 0 => self.server.max_request_body_bytes = bytes,
                _ => tracing::warn!(
                    "Failed to parse OCR_BRIDGE_MAX_REQUEST_BODY_BYTES='{}', must be a positive integer",
                    value
                ),
            }
        }

        if let Ok(language) = std::env::var("OCR_BRIDGE_LANGUAGE") {
            if !language.trim().is_empty() {
                self.engine.language = language.trim().to_string();
            }
        }

        if let Ok(value) = std::env::var("OCR_BRIDGE_DEVICE") {
            match value.parse::<Device>() {
                Ok(device) => self.engine.device = device,
                Err(e) => tracing::warn!("Ignoring OCR_BRIDGE_DEVICE: {}", e),
            }
        }
    }

    /// Check that the configuration can actually be used to start a server.
    pub fn validate(&self) -> Result<()> {
        if self.server.host.trim().is_empty() {
            return Err(BridgeError::validation("server.host cannot be empty"));
        }
        if self.server.port == 0 {
            return Err(BridgeError::validation("server.port must be non-zero"));
        }
        if self.server.max_request_body_bytes == 0 {
            return Err(BridgeError::validation("server.max_request_body_bytes must be non-zero"));
        }
        if self.engine.language.trim().is_empty() {
            return Err(BridgeError::validation("engine.language cannot be empty"));
        }
        Ok(())
    }

    /// Serialize the configuration as TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| BridgeError::serialization_with_source("Failed to serialize config as TOML", e))
    }
}

fn read_config(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| BridgeError::validation(format!("Failed to read config file {}: {}", path.display(), e)))
}
