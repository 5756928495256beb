//! Configuration for the Extractor

use serde::{Deserialize, Serialize};

/// Configuration for the taxonomy pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Maximum tokens per chunk sent to the model
    pub max_chunk_tokens: usize,

    /// Accepted filename extensions, compared case-insensitively
    pub document_extensions: Vec<String>,

    /// Kind of document named in the prompt (e.g. "patent")
    pub document_domain: String,
}

impl ExtractorConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_chunk_tokens == 0 {
            return Err("max_chunk_tokens must be greater than 0".to_string());
        }
        if self.document_extensions.is_empty() {
            return Err("document_extensions must not be empty".to_string());
        }
        if self.document_domain.trim().is_empty() {
            return Err("document_domain must not be empty".to_string());
        }
        Ok(())
    }

    /// Whether a filename carries one of the accepted extensions
    pub fn accepts_filename(&self, filename: &str) -> bool {
        let filename = filename.to_lowercase();
        self.document_extensions.iter().any(|extension| {
            let extension = extension.trim_start_matches('.').to_lowercase();
            filename
                .strip_suffix(extension.as_str())
                .is_some_and(|stem| stem.ends_with('.'))
        })
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

impl Default for ExtractorConfig {
    /// Chunks sized for a 7B instruction model's context
    fn default() -> Self {
        Self {
            max_chunk_tokens: 2000,
            document_extensions: vec!["pdf".to_string()],
            document_domain: "patent".to_string(),
        }
    }
}
