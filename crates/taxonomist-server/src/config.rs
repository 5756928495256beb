//! Configuration file parsing for the server.
//!
//! Loads the bind address, upload limit, tokenizer location and the
//! extractor and classifier sections from a TOML file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use taxonomist_extractor::ExtractorConfig;
use taxonomist_llm::ProviderConfig;
use thiserror::Error;

/// Server configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Failed to write TOML
    #[error("Failed to serialize config TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// A field holds an unusable value
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Default upload limit: 50 MiB
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Server configuration loaded from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0")
    pub bind_address: String,

    /// Bind port (e.g., 5000)
    pub bind_port: u16,

    /// Largest accepted request body, in bytes
    pub max_upload_bytes: usize,

    /// Local Hugging Face `tokenizer.json`; takes precedence over `tokenizer_model`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokenizer_path: Option<PathBuf>,

    /// Hub model whose tokenizer is fetched at startup
    ///
    /// Defaults to `llm.model` for the Hugging Face backend. The mock backend
    /// and an Ollama backend without one count text per character.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokenizer_model: Option<String>,

    /// Chunking and prompt settings
    pub extractor: ExtractorConfig,

    /// Classifier backend
    pub llm: ProviderConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            bind_port: 5000,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            tokenizer_path: None,
            tokenizer_model: None,
            extractor: ExtractorConfig::default(),
            llm: ProviderConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: ServerConfig = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to a TOML string
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Validate every section
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bind_address.trim().is_empty() {
            return Err(ConfigError::Invalid("bind_address must not be empty".to_string()));
        }
        if matches!(&self.tokenizer_model, Some(model) if model.trim().is_empty()) {
            return Err(ConfigError::Invalid(
                "tokenizer_model must not be empty".to_string(),
            ));
        }
        if self.max_upload_bytes == 0 {
            return Err(ConfigError::Invalid(
                "max_upload_bytes must be greater than 0".to_string(),
            ));
        }
        self.extractor
            .validate()
            .map_err(|e| ConfigError::Invalid(format!("extractor: {}", e)))?;
        self.llm
            .validate()
            .map_err(|e| ConfigError::Invalid(format!("llm: {}", e)))?;
        Ok(())
    }

    /// Get the full bind address (address:port)
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.bind_port)
    }
}
